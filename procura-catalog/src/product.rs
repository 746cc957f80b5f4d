use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A product customers can request. Pricing does not live here: every
/// price belongs to a supplier link, since the same product can be
/// sourced from several suppliers at different cost.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Product {
    pub fn new(name: String, description: Option<String>, category: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            description,
            category,
            created_at: Utc::now(),
        }
    }
}
