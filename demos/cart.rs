//! Walks a session-backed cart through adds, updates, removal, discounts and a clear.
//!
//! Run with `RUST_LOG=shopping_cart=debug cargo run --example cart` to see the storage traffic.

use shopping_cart::{
    Cart, CartError, CartEvent, Config, Discount, PercentageDiscount, Product, ProductCategory,
    SessionStorage,
};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let storage = Arc::new(SessionStorage::new()?);
    let config = Arc::new(Config::new("EUR", 21.0)?);

    let mut cart = Cart::new(config.clone(), storage.clone());
    register_listeners(&mut cart);
    cart.load()?;

    println!("Session {}", storage.session_id());
    println!("{config}\n");

    cart.add_product(Product::with_initial_quantity(
        "001",
        "Laptop",
        1500.0,
        ProductCategory::Electronics,
        2,
    )?)?;
    cart.add_product(Product::with_initial_quantity(
        "002",
        "Smartphone",
        800.0,
        ProductCategory::Electronics,
        1,
    )?)?;
    cart.add_product(Product::with_initial_quantity(
        "003",
        "Coffee Maker",
        120.0,
        ProductCategory::HomeAppliances,
        3,
    )?)?;
    display_cart(&cart);

    println!("\nUpdating quantity of product '002' to 5...");
    report_missing(cart.update_quantity("002", 5))?;
    display_cart(&cart);

    println!("\nRemoving product '003'...");
    report_missing(cart.remove_product("003"))?;
    display_cart(&cart);

    println!("\nApplying 10% discount...");
    match PercentageDiscount::new(10.0) {
        Ok(discount) => cart.set_discount(discount)?,
        Err(err) => println!("{err}"),
    }
    display_totals(&cart);

    println!("\nApplying negative (-10%) discount...");
    match PercentageDiscount::new(-10.0) {
        Ok(discount) => cart.set_discount(discount)?,
        Err(err) => println!("{err}"),
    }
    display_totals(&cart);

    println!("\nClearing the cart...");
    cart.clear_cart()?;
    if cart.is_empty() {
        println!("Cart is empty.");
    } else {
        display_cart(&cart);
    }

    Ok(())
}

fn report_missing(result: Result<(), CartError>) -> anyhow::Result<()> {
    match result {
        Err(err @ CartError::ProductNotFound(_)) => {
            println!("Product not found: {err}");
            Ok(())
        }
        other => Ok(other?),
    }
}

fn display_cart(cart: &Cart) {
    let currency = cart.config().currency();
    for product in cart.products() {
        println!(
            "{}: {} [{}] ({} units) - {} {currency} (Total: {} {currency})",
            product.article_number(),
            product.description(),
            product.category_name(),
            product.quantity(),
            product.price(),
            product.line_total(),
        );
    }
    display_totals(cart);
}

fn display_totals(cart: &Cart) {
    let currency = cart.config().currency();
    println!(
        "Total price (no VAT): {:.2} {currency}",
        cart.calculate_total_price_without_vat()
    );
    println!(
        "Total price (with VAT {}%): {:.2} {currency}",
        cart.config().vat_rate(),
        cart.calculate_total_price_with_vat()
    );
}

fn register_listeners(cart: &mut Cart) {
    cart.add_listener(|tag, event| {
        match event {
            CartEvent::ProductAdded(product) => println!(
                "Listener [{tag}]: {} ({} units at {} each)",
                product.description(),
                product.quantity(),
                product.price()
            ),
            CartEvent::ProductRemoved(article_number) => {
                println!("Listener [{tag}]: article number {article_number}")
            }
            CartEvent::ProductUpdated(product) => println!(
                "Listener [{tag}]: {} (new quantity: {})",
                product.description(),
                product.quantity()
            ),
            CartEvent::CartCleared => println!("Listener [{tag}]: the cart has been cleared"),
            CartEvent::DiscountSet(Discount::Percentage(discount)) => println!(
                "Listener [{tag}]: a discount of {}% has been applied",
                discount.percentage()
            ),
        }
        Ok(())
    });
}
