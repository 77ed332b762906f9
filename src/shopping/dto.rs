use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::repo_types::ShoppingListEntry;

/// One ingredient as the model reports it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngredientLine {
    pub nombre: String,
    #[serde(default)]
    pub cantidad: String,
}

/// Ingredient merged across every dish of the week.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregatedItem {
    pub nombre: String,
    pub cantidad: String,
    pub dishes: Vec<String>,
    pub entry_ids: Vec<Uuid>,
    pub checked: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShoppingSummary {
    pub items: Vec<AggregatedItem>,
    /// Dishes whose ingredients could not be fetched.
    pub unavailable: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ShoppingListResponse {
    pub meal_plan_id: Uuid,
    pub summary: ShoppingSummary,
    pub entries: Vec<ShoppingListEntry>,
}

#[derive(Debug, Deserialize)]
pub struct CheckRequest {
    pub checked: bool,
}
