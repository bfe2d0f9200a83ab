//! Price reductions applied to the cart subtotal
use super::error::DiscountError;

/// A percentage off the total, always within `0..=100`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PercentageDiscount {
    percentage: f64,
}

impl PercentageDiscount {
    /// Fails without producing a value when `percentage` is outside `0..=100`.
    pub fn new(percentage: f64) -> Result<Self, DiscountError> {
        if percentage.is_nan() {
            return Err(DiscountError::NotANumber);
        }
        if percentage < 0.0 {
            return Err(DiscountError::Negative(percentage));
        }
        if percentage > 100.0 {
            return Err(DiscountError::Excessive(percentage));
        }

        Ok(Self { percentage })
    }

    pub fn percentage(&self) -> f64 {
        self.percentage
    }

    /// Subtracts `percentage` percent of `total_price` from it, floored at zero.
    ///
    /// Computed as `total - total * p / 100`, which can differ from `total * (1 - p / 100)`
    /// in the last bits of the result.
    pub fn apply(&self, total_price: f64) -> f64 {
        let discount_amount = total_price * (self.percentage / 100.0);
        (total_price - discount_amount).max(0.0)
    }
}

/// The discount a cart can carry. One variant today.
#[derive(Debug, Clone, PartialEq)]
pub enum Discount {
    Percentage(PercentageDiscount),
}

impl Discount {
    pub fn percentage(percentage: f64) -> Result<Self, DiscountError> {
        PercentageDiscount::new(percentage).map(Discount::Percentage)
    }

    /// Total price in, discounted total price out. Never below zero.
    pub fn apply(&self, total_price: f64) -> f64 {
        match self {
            Discount::Percentage(discount) => discount.apply(total_price),
        }
    }
}

impl From<PercentageDiscount> for Discount {
    fn from(value: PercentageDiscount) -> Self {
        Discount::Percentage(value)
    }
}
