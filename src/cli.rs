use std::fmt::Write as _;

use clap::{Parser, Subcommand};

use crate::{
    catalog,
    error::AppError,
    models::{Product, ProductId, Receipt},
    services::{cart_service::CartManager, reminder_service::ReminderState},
    state::AppState,
};

#[derive(Parser)]
#[command(name = "arturo-cart")]
#[command(about = "Shopping cart for the Arturo storefront", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// List catalog products.
    Products {
        /// Case-insensitive match on name or description.
        #[arg(short, long)]
        query: Option<String>,
        #[arg(short, long)]
        category: Option<String>,
    },

    /// Show the cart, its total and when the reminder is due.
    Show,

    /// Add units of a product to the cart.
    Add {
        id: ProductId,
        #[arg(short = 'n', long, default_value_t = 1)]
        quantity: u32,
    },

    /// Set the quantity of a product already in the cart.
    Set { id: ProductId, quantity: u32 },

    /// Remove a product from the cart.
    Remove { id: ProductId },

    /// Empty the cart.
    Clear,

    /// Simulated payment: print a receipt and empty the cart.
    Checkout,

    /// Stay running until the pending reminder fires or Ctrl-C.
    Watch,
}

pub async fn run(command: Command, state: &mut AppState) -> anyhow::Result<()> {
    let cart = &mut state.cart;
    match command {
        Command::Products { query, category } => {
            let products = match (query.as_deref(), category.as_deref()) {
                (Some(query), Some(category)) => catalog::search(query)
                    .into_iter()
                    .filter(|p| p.category.eq_ignore_ascii_case(category.trim()))
                    .collect(),
                (Some(query), None) => catalog::search(query),
                (None, Some(category)) => catalog::by_category(category),
                (None, None) => catalog::all(),
            };
            print!("{}", render_products(&products));
        }
        Command::Show => print!("{}", render_cart(cart)),
        Command::Add { id, quantity } => {
            if quantity == 0 {
                return Err(AppError::BadRequest("quantity must be greater than 0".into()).into());
            }
            let product = catalog::find(id).ok_or(AppError::NotFound)?;
            cart.add_line(&product, i64::from(quantity));
            println!("{} ({quantity}) added to the cart.", product.name);
            print!("{}", render_cart(cart));
        }
        Command::Set { id, quantity } => {
            cart.set_quantity(id, quantity)?;
            print!("{}", render_cart(cart));
        }
        Command::Remove { id } => {
            cart.remove_line(id);
            print!("{}", render_cart(cart));
        }
        Command::Clear => {
            cart.clear();
            print!("{}", render_cart(cart));
        }
        Command::Checkout => {
            let receipt = cart.checkout()?;
            print!("{}", render_receipt(&receipt));
        }
        Command::Watch => watch(cart).await?,
    }
    Ok(())
}

async fn watch(cart: &CartManager) -> anyhow::Result<()> {
    let ReminderState::Armed { deadline } = cart.reminder_state() else {
        println!("No reminder pending.");
        return Ok(());
    };
    println!("Waiting for the cart reminder due {}. Press Ctrl-C to stop.", deadline.to_rfc2822());

    let mut ticker = tokio::time::interval(std::time::Duration::from_secs(1));
    loop {
        tokio::select! {
            result = tokio::signal::ctrl_c() => {
                result?;
                tracing::info!("watch interrupted");
                return Ok(());
            }
            _ = ticker.tick() => {
                if cart.reminder_state() == ReminderState::Idle {
                    return Ok(());
                }
            }
        }
    }
}

pub fn render_products(products: &[Product]) -> String {
    let mut out = String::new();
    if products.is_empty() {
        out.push_str("No products match.\n");
        return out;
    }
    for product in products {
        let _ = writeln!(
            out,
            "{:>3}  {:<14} {:<11} ${:>8.2}",
            product.id, product.name, product.category, product.price
        );
    }
    out
}

pub fn render_cart(cart: &CartManager) -> String {
    let mut out = String::new();
    if cart.is_empty() {
        out.push_str("Your cart is empty.\n");
        return out;
    }
    for line in cart.lines() {
        let _ = writeln!(
            out,
            "{:>3}  {:<14} x{:<3} ${:>8.2}",
            line.id,
            line.name,
            line.quantity,
            line.subtotal()
        );
    }
    let _ = writeln!(out, "Total: ${:.2}", cart.total());
    if let Some(deadline) = cart.reminder_deadline() {
        let _ = writeln!(out, "Reminder due: {}", deadline.format("%Y-%m-%d %H:%M UTC"));
    }
    out
}

pub fn render_receipt(receipt: &Receipt) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Order {}", receipt.reference);
    for line in &receipt.lines {
        let _ = writeln!(out, "  {} x {}  ${:.2}", line.name, line.quantity, line.subtotal());
    }
    let _ = writeln!(out, "Total: ${:.2}", receipt.total);
    out
}
