use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type ProductId = u32;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub price: f64,
    pub category: String,
    pub image: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    pub id: ProductId,
    pub name: String,
    pub price: f64,
    pub category: String,
    pub image: String,
    pub description: String,
    pub quantity: u32,
}

impl CartLine {
    pub fn from_product(product: &Product, quantity: u32) -> Self {
        Self {
            id: product.id,
            name: product.name.clone(),
            price: product.price,
            category: product.category.clone(),
            image: product.image.clone(),
            description: product.description.clone(),
            quantity,
        }
    }

    pub fn price_cents(&self) -> i64 {
        to_cents(self.price)
    }

    pub fn subtotal_cents(&self) -> i64 {
        self.price_cents() * i64::from(self.quantity)
    }

    pub fn subtotal(&self) -> f64 {
        from_cents(self.subtotal_cents())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Receipt {
    pub reference: String,
    pub lines: Vec<CartLine>,
    pub total_cents: i64,
    pub total: f64,
    pub placed_at: DateTime<Utc>,
}

pub fn to_cents(amount: f64) -> i64 {
    (amount * 100.0).round() as i64
}

pub fn from_cents(cents: i64) -> f64 {
    cents as f64 / 100.0
}
