//! Error types for the cart, its line items and the storage contract
use std::fmt;

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ValidationError {
    #[error("Price must be greater than zero, got {0}")]
    NonPositivePrice(f64),
    #[error("Quantity must not be negative, got {0}")]
    NegativeQuantity(i64),
    #[error("Quantity of {article_number} overflows when adding {added} to {existing}")]
    QuantityOverflow {
        article_number: String,
        existing: i64,
        added: i64,
    },
    #[error("VAT rate must be between 0 and 100, got {0}")]
    VatRateOutOfRange(f64),
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum DiscountError {
    #[error("[InvalidDiscount] Negative discount detected ({0}). Not applying discount.")]
    Negative(f64),
    #[error("[InvalidDiscount] Discount percentage cannot be greater than 100 ({0}). Not applying discount.")]
    Excessive(f64),
    #[error("[InvalidDiscount] Discount percentage is not a number. Not applying discount.")]
    NotANumber,
}

/// The storage call that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageOperation {
    Save,
    Load,
    Clear,
    Delete,
}

impl StorageOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageOperation::Save => "save",
            StorageOperation::Load => "load",
            StorageOperation::Clear => "clear",
            StorageOperation::Delete => "delete",
        }
    }
}

impl fmt::Display for StorageOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

type BoxedCause = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(thiserror::Error, Debug)]
#[error("{message}")]
pub struct StorageError {
    message: String,
    operation: Option<StorageOperation>,
    #[source]
    source: Option<BoxedCause>,
}

impl StorageError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            operation: None,
            source: None,
        }
    }
    pub fn with_operation(mut self, operation: StorageOperation) -> Self {
        self.operation = Some(operation);
        self
    }
    pub fn with_source(mut self, source: impl Into<BoxedCause>) -> Self {
        self.source = Some(source.into());
        self
    }
    pub fn message(&self) -> &str {
        &self.message
    }
    pub fn operation(&self) -> Option<StorageOperation> {
        self.operation
    }
}

#[derive(thiserror::Error, Debug)]
pub enum CartError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Product with article number {0} not found.")]
    ProductNotFound(String),
    #[error(transparent)]
    Storage(#[from] StorageError),
    // listener failures keep their anyhow context chain
    #[error(transparent)]
    Listener(anyhow::Error),
}

impl CartError {
    /// Article number carried by a not-found error.
    pub fn article_number(&self) -> Option<&str> {
        match self {
            CartError::ProductNotFound(article_number) => Some(article_number),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn storage_error_keeps_operation_and_cause() {
        let cause = std::io::Error::other("disk full");
        let err = StorageError::new("failed to write cart snapshot")
            .with_operation(StorageOperation::Save)
            .with_source(cause);

        assert_eq!(err.operation(), Some(StorageOperation::Save));
        assert_eq!(err.to_string(), "failed to write cart snapshot");
        assert_eq!(err.source().unwrap().to_string(), "disk full");
    }

    #[test]
    fn storage_error_without_context() {
        let err = StorageError::new("boom");

        assert!(err.operation().is_none());
        assert!(err.source().is_none());
    }

    #[test]
    fn discount_messages_name_the_violated_bound() {
        assert!(DiscountError::Negative(-10.0).to_string().contains("Negative discount"));
        assert!(DiscountError::Excessive(150.0).to_string().contains("greater than 100"));
    }

    #[test]
    fn not_found_carries_article_number() {
        let err = CartError::ProductNotFound("999".into());

        assert_eq!(err.article_number(), Some("999"));
        assert_eq!(err.to_string(), "Product with article number 999 not found.");
    }
}
