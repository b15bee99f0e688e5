//! Test helpers para estate-server.

#![allow(dead_code, unused_imports)]

pub mod assertions;
pub mod client;

pub use assertions::*;
pub use client::{TestClient, TestResponse, client};

use serde_json::{Value, json};

/// A valid listing payload.
pub fn draft(title: &str, state: &str, city: &str, price: f64) -> Value {
    json!({
        "title": title,
        "description": format!("{title} near the park"),
        "type": "Apartment",
        "listingType": "Sale",
        "furnished": "Semi",
        "listedBy": "Owner",
        "state": state,
        "city": city,
        "location": format!("{city} center"),
        "price": price,
        "areaSqFt": 1100.0,
        "bedrooms": 2,
        "bathrooms": 1,
        "rating": 4.2,
        "isVerified": true,
        "isAvailable": true,
        "availableFrom": "2026-03-01",
        "amenities": ["gym"],
        "tags": ["new"]
    })
}
