//! Currency and VAT settings supplied to a cart
use super::error::ValidationError;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    currency: String, // e.g. "EUR", free-form
    vat_rate: f64,    // 21.0 for 21%
}

impl Config {
    pub fn new(currency: impl Into<String>, vat_rate: f64) -> Result<Self, ValidationError> {
        if !(0.0..=100.0).contains(&vat_rate) {
            return Err(ValidationError::VatRateOutOfRange(vat_rate));
        }

        Ok(Self {
            currency: currency.into(),
            vat_rate,
        })
    }
    pub fn currency(&self) -> &str {
        &self.currency
    }
    pub fn vat_rate(&self) -> f64 {
        self.vat_rate
    }
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Config {{ Currency: {}, VAT Rate: {:.2}% }}",
            self.currency, self.vat_rate
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_rates_within_bounds() {
        for rate in [0.0, 21.0, 100.0] {
            let config = Config::new("EUR", rate).unwrap();
            assert_eq!(config.vat_rate(), rate);
            assert_eq!(config.currency(), "EUR");
        }
    }

    #[test]
    fn rejects_rates_outside_bounds() {
        assert_eq!(
            Config::new("EUR", -0.5),
            Err(ValidationError::VatRateOutOfRange(-0.5))
        );
        assert!(Config::new("EUR", 100.01).is_err());
        assert!(Config::new("EUR", f64::NAN).is_err());
    }

    #[test]
    fn display_format() {
        let config = Config::new("USD", 8.25).unwrap();
        assert_eq!(config.to_string(), "Config { Currency: USD, VAT Rate: 8.25% }");
    }
}
