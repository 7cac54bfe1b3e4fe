//! Product Aggregate

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};
use crate::domain::value_objects::ProductId;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    #[validate(custom = "non_negative")]
    pub price: Decimal,
    #[serde(default)]
    #[validate(custom = "non_negative")]
    pub original_price: Decimal,
    #[serde(default)] pub description: String,
    #[serde(default)] pub category: String,
    #[serde(default)] pub image: String,
    #[serde(default)]
    #[validate(range(min = 0.0, max = 5.0))]
    pub rating: f32,
    #[serde(default)] pub reviews: u32,
    #[serde(default)] pub features: Vec<String>,
    #[serde(default = "in_stock_default")] pub in_stock: bool,
    #[serde(default)]
    #[validate(range(max = 100))]
    pub discount: u8,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub hidden_on_home: bool,
}

impl Product {
    pub fn is_visible_on_home(&self) -> bool { !self.hidden_on_home }

    pub fn snapshot(&self) -> ProductSnapshot {
        ProductSnapshot { id: self.id, name: self.name.clone(), price: self.price, image: self.image.clone() }
    }
}

/// Fields captured when a product enters the cart. Later catalog edits do not reach it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSnapshot {
    pub id: ProductId,
    pub name: String,
    pub price: Decimal,
    #[serde(default)] pub image: String,
}

/// A product as entered in the admin panel, before it has an id.
#[derive(Clone, Debug, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct ProductDraft {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    #[validate(custom = "non_negative")]
    pub price: Decimal,
    pub original_price: Option<Decimal>,
    pub description: String,
    pub category: String,
    pub image: String,
    #[validate(range(min = 0.0, max = 5.0))]
    pub rating: f32,
    pub reviews: u32,
    pub features: Vec<String>,
    pub in_stock: bool,
    #[validate(range(max = 100))]
    pub discount: u8,
    pub hidden_on_home: bool,
}

impl Default for ProductDraft {
    fn default() -> Self {
        Self {
            name: String::new(), price: Decimal::ZERO, original_price: None, description: String::new(),
            category: String::new(), image: String::new(), rating: 0.0, reviews: 0, features: vec![],
            in_stock: true, discount: 0, hidden_on_home: false,
        }
    }
}

impl ProductDraft {
    pub fn new(name: impl Into<String>, price: Decimal) -> Self {
        Self { name: name.into(), price, ..Self::default() }
    }

    pub fn into_product(self, id: ProductId) -> Product {
        Product {
            id,
            name: self.name.trim().to_string(),
            price: self.price,
            original_price: self.original_price.unwrap_or(self.price),
            description: self.description,
            category: self.category,
            image: self.image,
            rating: self.rating,
            reviews: self.reviews,
            features: self.features,
            in_stock: self.in_stock,
            discount: self.discount,
            hidden_on_home: self.hidden_on_home,
        }
    }
}

/// Partial update. `None` leaves the field as it is.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPatch {
    pub name: Option<String>,
    pub price: Option<Decimal>,
    pub original_price: Option<Decimal>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub image: Option<String>,
    pub rating: Option<f32>,
    pub reviews: Option<u32>,
    pub features: Option<Vec<String>>,
    pub in_stock: Option<bool>,
    pub discount: Option<u8>,
    pub hidden_on_home: Option<bool>,
}

impl ProductPatch {
    pub fn hide_on_home(hidden: bool) -> Self { Self { hidden_on_home: Some(hidden), ..Self::default() } }

    pub fn apply(self, product: &mut Product) {
        if let Some(v) = self.name { product.name = v; }
        if let Some(v) = self.price { product.price = v; }
        if let Some(v) = self.original_price { product.original_price = v; }
        if let Some(v) = self.description { product.description = v; }
        if let Some(v) = self.category { product.category = v; }
        if let Some(v) = self.image { product.image = v; }
        if let Some(v) = self.rating { product.rating = v; }
        if let Some(v) = self.reviews { product.reviews = v; }
        if let Some(v) = self.features { product.features = v; }
        if let Some(v) = self.in_stock { product.in_stock = v; }
        if let Some(v) = self.discount { product.discount = v; }
        if let Some(v) = self.hidden_on_home { product.hidden_on_home = v; }
    }
}

fn in_stock_default() -> bool { true }

fn non_negative(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(ValidationError::new("negative_amount"));
    }
    Ok(())
}
