//! Shopping cart domain model: line items, a single active discount, VAT totals,
//! pluggable snapshot storage and synchronous change listeners.

pub mod cart;
pub mod config;
pub mod discount;
pub mod error;
pub mod product;
pub mod session;
pub mod sled_storage;
pub mod storage;
pub mod utils;

pub use cart::{Cart, CartEvent, Listener};
pub use config::Config;
pub use discount::{Discount, PercentageDiscount};
pub use error::{CartError, DiscountError, StorageError, StorageOperation, ValidationError};
pub use product::{Product, ProductCategory};
pub use session::SessionStorage;
pub use sled_storage::SledStorage;
pub use storage::Storage;
