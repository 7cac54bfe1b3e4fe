//! Base catalog the storefront ships with.

use rust_decimal::Decimal;
use crate::domain::aggregates::Product;

fn item(
    id: u64,
    name: &str,
    price: i64,
    original_price: i64,
    category: &str,
    rating: f32,
    reviews: u32,
    features: &[&str],
    discount: u8,
) -> Product {
    Product {
        id,
        name: name.to_string(),
        price: Decimal::new(price, 2),
        original_price: Decimal::new(original_price, 2),
        description: format!("{name} from our signature collection."),
        category: category.to_string(),
        image: format!("/images/products/{id}.jpg"),
        rating,
        reviews,
        features: features.iter().map(|f| f.to_string()).collect(),
        in_stock: true,
        discount,
        hidden_on_home: false,
    }
}

pub fn base_catalog() -> Vec<Product> {
    vec![
        item(1, "Classic Leather Tote", 8999, 11999, "bags", 4.8, 124, &["Full-grain leather", "Inner zip pocket", "Magnetic closure"], 25),
        item(2, "Silk Wrap Scarf", 3499, 4499, "accessories", 4.6, 87, &["100% mulberry silk", "Hand-rolled edges"], 22),
        item(3, "Minimalist Gold Watch", 14999, 19999, "watches", 4.9, 203, &["Sapphire glass", "Water resistant 5 ATM", "Two-year warranty"], 25),
        item(4, "Canvas Weekender Bag", 6499, 6499, "bags", 4.4, 56, &["Waxed canvas", "Detachable strap"], 0),
        item(5, "Pearl Drop Earrings", 2999, 3999, "jewelry", 4.7, 142, &["Freshwater pearls", "Hypoallergenic posts"], 25),
        item(6, "Woven Straw Hat", 2499, 2999, "accessories", 4.3, 41, &["Packable brim", "Cotton sweatband"], 17),
    ]
}

/// Highest id among the seed products. Anything above belongs to the admin overlay.
pub fn seed_max(seed: &[Product]) -> u64 {
    seed.iter().map(|p| p.id).max().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use validator::Validate;

    #[test]
    fn test_base_catalog_is_valid() {
        let seed = base_catalog();
        let ids: HashSet<u64> = seed.iter().map(|p| p.id).collect();
        assert_eq!(ids.len(), seed.len());
        assert!(seed.iter().all(|p| p.validate().is_ok()));
        assert_eq!(seed_max(&seed), 6);
    }
}
