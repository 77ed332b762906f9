use serde::Serialize;
use time::Date;
use uuid::Uuid;

use crate::menu::model::{Day, Slot};

/// Ingredient name stored when a dish's ingredients could not be fetched.
pub const UNAVAILABLE: &str = "No disponible";

/// One ingredient of one dish of a plan.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShoppingListEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub meal_plan_id: Uuid,
    pub week: Date,
    pub day: Day,
    pub meal_type: Slot,
    pub dish: String,
    pub ingredient: String,
    pub quantity: String,
    pub checked: bool,
}

impl ShoppingListEntry {
    pub fn is_unavailable(&self) -> bool {
        self.ingredient == UNAVAILABLE
    }
}
