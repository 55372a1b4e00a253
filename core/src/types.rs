//! Domain records served by the router.
//!
//! # Design
//! The reference server defines its own `Cat` independently; the
//! differential tests catch any schema drift between the two.

use serde::{Deserialize, Serialize};

/// A cat record. Serializes as `{"name":…,"age":…}` in field order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Cat {
    pub name: String,
    pub age: u32,
}

impl Cat {
    pub fn new(name: &str, age: u32) -> Self {
        Self {
            name: name.to_string(),
            age,
        }
    }
}

/// The records every fresh context is seeded with.
pub fn sample_cats() -> Vec<Cat> {
    vec![Cat::new("Sardine", 7), Cat::new("Olive", 4)]
}
