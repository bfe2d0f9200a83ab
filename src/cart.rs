//! The cart aggregate: line items, the active discount, persistence and notification
use super::config::Config;
use super::discount::Discount;
use super::error::{CartError, ValidationError};
use super::product::Product;
use super::storage::{Storage, ensure_unique_article_numbers};
use anyhow::Context;
use std::fmt;
use std::sync::Arc;

/// A state change announced to listeners after it has been persisted.
#[derive(Debug, Clone, PartialEq)]
pub enum CartEvent {
    /// Carries the product as it was passed in, not the merged line item.
    ProductAdded(Product),
    ProductRemoved(String), // article number
    ProductUpdated(Product),
    CartCleared,
    DiscountSet(Discount),
}

impl CartEvent {
    pub const PRODUCT_ADDED: &'static str = "product.added";
    pub const PRODUCT_REMOVED: &'static str = "product.removed";
    pub const PRODUCT_UPDATED: &'static str = "product.updated";
    pub const CART_CLEARED: &'static str = "cart.cleared";
    pub const DISCOUNT_SET: &'static str = "discount.set";

    pub fn tag(&self) -> &'static str {
        match self {
            CartEvent::ProductAdded(_) => Self::PRODUCT_ADDED,
            CartEvent::ProductRemoved(_) => Self::PRODUCT_REMOVED,
            CartEvent::ProductUpdated(_) => Self::PRODUCT_UPDATED,
            CartEvent::CartCleared => Self::CART_CLEARED,
            CartEvent::DiscountSet(_) => Self::DISCOUNT_SET,
        }
    }
}

/// Called synchronously with the event tag and the event. An error aborts the
/// remaining listeners and is returned from the cart operation.
pub type Listener = Box<dyn FnMut(&str, &CartEvent) -> anyhow::Result<()>>;

pub struct Cart {
    products: Vec<Product>, // insertion order, unique article numbers
    listeners: Vec<Listener>,
    discount: Option<Discount>,
    config: Arc<Config>,
    storage: Arc<dyn Storage>,
}

impl Cart {
    pub fn new(config: Arc<Config>, storage: Arc<dyn Storage>) -> Self {
        Self {
            products: Vec::new(),
            listeners: Vec::new(),
            discount: None,
            config,
            storage,
        }
    }

    pub fn add_listener<F>(&mut self, listener: F)
    where
        F: FnMut(&str, &CartEvent) -> anyhow::Result<()> + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    /// Replaces the in-memory line items with the persisted snapshot. Listeners are not notified.
    ///
    /// A snapshot repeating an article number is rejected and the cart is left as it was.
    pub fn load(&mut self) -> Result<(), CartError> {
        let products = self.storage.load()?;
        ensure_unique_article_numbers(&products)?;
        self.products = products;
        tracing::debug!(count = self.products.len(), "Loaded cart");

        Ok(())
    }

    /// Adds a product, merging quantities when the article number is already present.
    ///
    /// On a merge only the incoming quantity counts, the existing line item keeps its
    /// description, price and category.
    pub fn add_product(&mut self, product: Product) -> Result<(), CartError> {
        match self.position(product.article_number()) {
            Some(index) => {
                let existing = &self.products[index];
                let quantity = existing
                    .quantity()
                    .checked_add(product.quantity())
                    .ok_or_else(|| ValidationError::QuantityOverflow {
                        article_number: existing.article_number().to_string(),
                        existing: existing.quantity(),
                        added: product.quantity(),
                    })?;
                self.products[index] = existing.with_quantity(quantity)?;
                tracing::debug!(article_number = %product.article_number(), quantity, "Merged product into cart");
            }
            None => {
                tracing::debug!(article_number = %product.article_number(), quantity = product.quantity(), "Added product to cart");
                self.products.push(product.clone());
            }
        }

        self.save_and_dispatch(CartEvent::ProductAdded(product))
    }

    pub fn remove_product(&mut self, article_number: &str) -> Result<(), CartError> {
        let index = self.require(article_number)?;
        self.products.remove(index);
        tracing::debug!(article_number = %article_number, "Removed product from cart");

        self.save_and_dispatch(CartEvent::ProductRemoved(article_number.to_string()))
    }

    pub fn update_quantity(&mut self, article_number: &str, quantity: i64) -> Result<(), CartError> {
        let index = self.require(article_number)?;
        let updated = self.products[index].with_quantity(quantity)?;
        self.products[index] = updated.clone();
        tracing::debug!(article_number = %article_number, quantity, "Updated product quantity");

        self.save_and_dispatch(CartEvent::ProductUpdated(updated))
    }

    pub fn clear_cart(&mut self) -> Result<(), CartError> {
        self.products.clear();
        tracing::debug!("Cleared cart");

        self.save_and_dispatch(CartEvent::CartCleared)
    }

    /// Replaces the active discount. Discounts are not part of the persisted snapshot.
    pub fn set_discount(&mut self, discount: impl Into<Discount>) -> Result<(), CartError> {
        let discount = discount.into();
        self.discount = Some(discount.clone());
        tracing::debug!(discount = ?discount, "Set cart discount");

        self.dispatch(CartEvent::DiscountSet(discount))
    }

    /// Sum of price * quantity over all line items, with the active discount applied once.
    pub fn calculate_total_price_without_vat(&self) -> f64 {
        let subtotal: f64 = self.products.iter().map(Product::line_total).sum();

        match &self.discount {
            Some(discount) => discount.apply(subtotal),
            None => subtotal,
        }
    }

    pub fn calculate_total_price_with_vat(&self) -> f64 {
        self.calculate_total_price_without_vat() * (1.0 + self.config.vat_rate() / 100.0)
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }
    pub fn product(&self, article_number: &str) -> Option<&Product> {
        self.products
            .iter()
            .find(|product| product.article_number() == article_number)
    }
    pub fn len(&self) -> usize {
        self.products.len()
    }
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
    pub fn discount(&self) -> Option<&Discount> {
        self.discount.as_ref()
    }
    pub fn config(&self) -> &Config {
        &self.config
    }

    fn position(&self, article_number: &str) -> Option<usize> {
        self.products
            .iter()
            .position(|product| product.article_number() == article_number)
    }

    fn require(&self, article_number: &str) -> Result<usize, CartError> {
        self.position(article_number)
            .ok_or_else(|| CartError::ProductNotFound(article_number.to_string()))
    }

    // Storage must reflect the change before any listener runs.
    // A failed save leaves the in-memory change in place.
    fn save_and_dispatch(&mut self, event: CartEvent) -> Result<(), CartError> {
        self.storage.save(&self.products)?;
        self.dispatch(event)
    }

    fn dispatch(&mut self, event: CartEvent) -> Result<(), CartError> {
        let tag = event.tag();
        for listener in self.listeners.iter_mut() {
            listener(tag, &event)
                .with_context(|| format!("listener failed while handling {tag}"))
                .map_err(CartError::Listener)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Cart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cart")
            .field("products", &self.products)
            .field("discount", &self.discount)
            .field("config", &self.config)
            .field("listeners", &self.listeners.len())
            .finish_non_exhaustive()
    }
}
