//! Shopping assistant.
//!
//! A fixed keyword responder over the catalog. It never leaves the process and
//! holds no conversation state.

use rust_decimal::Decimal;

use crate::domain::aggregates::Product;

const GREETINGS: &[&str] = &["hi", "hello", "hey", "good morning", "good evening"];
const BUDGET_WORDS: &[&str] = &["cheap", "cheapest", "budget", "affordable", "lowest"];
const PREMIUM_WORDS: &[&str] = &["best", "top rated", "popular", "recommend"];
const SHIPPING_WORDS: &[&str] = &["shipping", "delivery", "deliver", "ship"];
const PAYMENT_WORDS: &[&str] = &["pay", "payment", "transfer", "cash"];
const RETURN_WORDS: &[&str] = &["return", "refund", "exchange"];

pub fn respond(message: &str, catalog: &[Product]) -> String {
    let query = message.trim().to_lowercase();
    if query.is_empty() {
        return "Ask me about our products, prices, delivery or payment.".to_string();
    }

    if let Some(product) = catalog.iter().find(|p| query.contains(&p.name.to_lowercase())) {
        return describe(product);
    }
    if contains_any(&query, BUDGET_WORDS) {
        return match cheapest(catalog) {
            Some(p) => format!("Our most affordable pick right now is the {} at {}.", p.name, price(p.price)),
            None => "The catalog is empty right now.".to_string(),
        };
    }
    if contains_any(&query, PREMIUM_WORDS) {
        return match catalog.iter().filter(|p| p.in_stock).max_by(|a, b| a.rating.total_cmp(&b.rating)) {
            Some(p) => format!("Customers love the {}: rated {:.1} from {} reviews.", p.name, p.rating, p.reviews),
            None => "Nothing is in stock right now, please check back soon.".to_string(),
        };
    }

    let in_category: Vec<&Product> = catalog
        .iter()
        .filter(|p| !p.category.is_empty() && mentions_category(&query, &p.category))
        .collect();
    if !in_category.is_empty() {
        let names: Vec<String> = in_category.iter().map(|p| format!("{} ({})", p.name, price(p.price))).collect();
        return format!("In {} we have: {}.", in_category[0].category, names.join(", "));
    }

    if contains_any(&query, SHIPPING_WORDS) {
        return "We deliver nationwide. Orders are dispatched within 2 business days.".to_string();
    }
    if contains_any(&query, PAYMENT_WORDS) {
        return "You can pay on delivery, by bank transfer or with mobile money. Upload your receipt at checkout for transfers.".to_string();
    }
    if contains_any(&query, RETURN_WORDS) {
        return "Unused items can be returned within 7 days of delivery.".to_string();
    }
    if GREETINGS.iter().any(|g| query == *g || query.starts_with(&format!("{g} "))) {
        return "Hello! Looking for something special today?".to_string();
    }

    "I'm not sure about that one. Try asking about a product, a category, delivery or payment.".to_string()
}

fn describe(product: &Product) -> String {
    let stock = if product.in_stock { "in stock" } else { "currently out of stock" };
    let mut reply = format!("The {} costs {} and is {}.", product.name, price(product.price), stock);
    if product.discount > 0 {
        reply.push_str(&format!(" That's {}% off the usual {}.", product.discount, price(product.original_price)));
    }
    reply
}

fn cheapest(catalog: &[Product]) -> Option<&Product> {
    catalog.iter().filter(|p| p.in_stock).min_by_key(|p| p.price)
}

fn mentions_category(query: &str, category: &str) -> bool {
    let category = category.to_lowercase();
    let singular = category.strip_suffix('s').unwrap_or(&category);
    query.split(|c: char| !c.is_alphanumeric()).any(|word| word == category || word == singular)
}

fn contains_any(query: &str, words: &[&str]) -> bool { words.iter().any(|w| query.contains(w)) }

fn price(amount: Decimal) -> String { format!("${:.2}", amount) }
