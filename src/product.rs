//! Line item values held by the cart
use super::error::ValidationError;
use std::fmt;

#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum ProductCategory {
    #[n(0)]
    Electronics,
    #[n(1)]
    Furniture,
    #[n(2)]
    Groceries,
    #[n(3)]
    HomeAppliances,
}

impl ProductCategory {
    pub const ALL: [ProductCategory; 4] = [
        ProductCategory::Electronics,
        ProductCategory::Furniture,
        ProductCategory::Groceries,
        ProductCategory::HomeAppliances,
    ];

    /// Lowercase label of the category
    pub fn value(&self) -> &'static str {
        match self {
            ProductCategory::Electronics => "electronics",
            ProductCategory::Furniture => "furniture",
            ProductCategory::Groceries => "groceries",
            ProductCategory::HomeAppliances => "homeappliances",
        }
    }
}

// Immutable once built. Quantity changes go through `with_quantity`.
// Decoding goes through `ProductRecord` so a decoded product is always validated.
#[derive(minicbor::Encode, Debug, Clone, PartialEq)]
pub struct Product {
    #[n(0)]
    article_number: String, // identity key within a cart
    #[n(1)]
    description: String,
    #[n(2)]
    price: f64,
    #[n(3)]
    category: ProductCategory,
    #[n(4)]
    quantity: i64,
}

// Same field layout as `Product`, without the invariants.
#[derive(minicbor::Encode, minicbor::Decode)]
struct ProductRecord {
    #[n(0)]
    article_number: String,
    #[n(1)]
    description: String,
    #[n(2)]
    price: f64,
    #[n(3)]
    category: ProductCategory,
    #[n(4)]
    quantity: i64,
}

impl<'b, C> minicbor::Decode<'b, C> for Product {
    fn decode(d: &mut minicbor::Decoder<'b>, ctx: &mut C) -> Result<Self, minicbor::decode::Error> {
        let record: ProductRecord = minicbor::Decode::decode(d, ctx)?;

        Product::with_initial_quantity(
            record.article_number,
            record.description,
            record.price,
            record.category,
            record.quantity,
        )
        .map_err(|err| minicbor::decode::Error::message(err.to_string()))
    }
}

impl Product {
    /// Builds a product with a quantity of one.
    pub fn new(
        article_number: impl Into<String>,
        description: impl Into<String>,
        price: f64,
        category: ProductCategory,
    ) -> Result<Self, ValidationError> {
        Self::with_initial_quantity(article_number, description, price, category, 1)
    }

    pub fn with_initial_quantity(
        article_number: impl Into<String>,
        description: impl Into<String>,
        price: f64,
        category: ProductCategory,
        quantity: i64,
    ) -> Result<Self, ValidationError> {
        let product = Self {
            article_number: article_number.into(),
            description: description.into(),
            price,
            category,
            quantity,
        };
        product.validate()?;

        Ok(product)
    }

    /// Checks the price and quantity invariants. Decoded snapshots go through here too.
    pub fn validate(&self) -> Result<(), ValidationError> {
        // NaN fails the comparison, infinity is not a price
        if !(self.price > 0.0) || !self.price.is_finite() {
            return Err(ValidationError::NonPositivePrice(self.price));
        }
        if self.quantity < 0 {
            return Err(ValidationError::NegativeQuantity(self.quantity));
        }
        Ok(())
    }

    /// Returns a copy carrying `quantity`, the receiver is left untouched.
    pub fn with_quantity(&self, quantity: i64) -> Result<Self, ValidationError> {
        if quantity < 0 {
            return Err(ValidationError::NegativeQuantity(quantity));
        }

        Ok(Self {
            quantity,
            ..self.clone()
        })
    }

    pub fn article_number(&self) -> &str {
        &self.article_number
    }
    pub fn description(&self) -> &str {
        &self.description
    }
    pub fn price(&self) -> f64 {
        self.price
    }
    pub fn category(&self) -> ProductCategory {
        self.category
    }
    pub fn quantity(&self) -> i64 {
        self.quantity
    }

    pub fn line_total(&self) -> f64 {
        self.price * self.quantity as f64
    }

    /// Category label with its first letter capitalised, e.g. "Electronics"
    pub fn category_name(&self) -> String {
        let mut chars = self.category.value().chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}

impl fmt::Display for Product {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Product {{ Article Number: {}, Description: {}, Price: {:.2}, Quantity: {}, Category: {} }}",
            self.article_number,
            self.description,
            self.price,
            self.quantity,
            self.category.value()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn laptop() -> Product {
        Product::with_initial_quantity("001", "Laptop", 1500.0, ProductCategory::Electronics, 2)
            .unwrap()
    }

    #[test]
    fn accessors_return_supplied_values() {
        let product = laptop();

        assert_eq!(product.article_number(), "001");
        assert_eq!(product.description(), "Laptop");
        assert_eq!(product.price(), 1500.0);
        assert_eq!(product.category(), ProductCategory::Electronics);
        assert_eq!(product.quantity(), 2);
    }

    #[test]
    fn default_quantity_is_one() {
        let product = Product::new("002", "Chair", 80.0, ProductCategory::Furniture).unwrap();
        assert_eq!(product.quantity(), 1);
    }

    #[test]
    fn rejects_non_positive_and_non_finite_prices() {
        for price in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let result = Product::new("003", "Bread", price, ProductCategory::Groceries);
            assert!(matches!(result, Err(ValidationError::NonPositivePrice(_))));
        }
    }

    #[test]
    fn rejects_negative_quantity() {
        let result =
            Product::with_initial_quantity("003", "Bread", 2.5, ProductCategory::Groceries, -1);
        assert_eq!(result, Err(ValidationError::NegativeQuantity(-1)));
    }

    #[test]
    fn zero_quantity_is_allowed() {
        let product =
            Product::with_initial_quantity("003", "Bread", 2.5, ProductCategory::Groceries, 0);
        assert!(product.is_ok());
    }

    #[test]
    fn with_quantity_leaves_original_untouched() {
        let original = laptop();
        let derived = original.with_quantity(7).unwrap();

        assert_eq!(original.quantity(), 2);
        assert_eq!(derived.quantity(), 7);
        assert_eq!(derived.article_number(), original.article_number());
        assert_eq!(derived.price(), original.price());
        assert_eq!(derived.category(), original.category());
        assert_eq!(derived.description(), original.description());
    }

    #[test]
    fn with_quantity_rejects_negative() {
        assert_eq!(
            laptop().with_quantity(-3),
            Err(ValidationError::NegativeQuantity(-3))
        );
    }

    #[test]
    fn category_name_is_capitalised() {
        let product =
            Product::new("004", "Coffee Maker", 120.0, ProductCategory::HomeAppliances).unwrap();

        assert_eq!(laptop().category_name(), "Electronics");
        assert_eq!(product.category_name(), "Homeappliances");
    }

    #[test]
    fn display_format() {
        assert_eq!(
            laptop().to_string(),
            "Product { Article Number: 001, Description: Laptop, Price: 1500.00, Quantity: 2, Category: electronics }"
        );
    }

    #[test]
    fn decoding_rejects_invalid_products() {
        let record = ProductRecord {
            article_number: "001".into(),
            description: "Laptop".into(),
            price: -5.0,
            category: ProductCategory::Electronics,
            quantity: -3,
        };
        let encoding = minicbor::to_vec(&record).unwrap();

        assert!(minicbor::decode::<Product>(&encoding).is_err());
    }

    #[test]
    fn decoding_rejects_negative_quantity() {
        let record = ProductRecord {
            article_number: "001".into(),
            description: "Laptop".into(),
            price: 5.0,
            category: ProductCategory::Electronics,
            quantity: -3,
        };
        let encoding = minicbor::to_vec(&record).unwrap();

        assert!(minicbor::decode::<Product>(&encoding).is_err());
    }

    #[test]
    fn product_encoding() {
        let original = laptop();

        let encoding = minicbor::to_vec(&original).unwrap();
        let decode: Product = minicbor::decode(&encoding).unwrap();

        assert_eq!(original, decode);
    }
}
