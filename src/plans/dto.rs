use serde::{Deserialize, Serialize};

use super::repo_types::MealPlan;
use crate::menu::services::MenuOrigin;

#[derive(Debug, Default, Deserialize)]
pub struct CreatePlanRequest {
    /// Any date of the wanted week, `YYYY-MM-DD`. Defaults to this week.
    pub week_start: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct WeekQuery {
    pub week: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CreatedPlanResponse {
    pub plan: MealPlan,
    pub menu: MenuOrigin,
    /// Dishes stored with a `No disponible` shopping row.
    pub unavailable: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct AlternativeRequest {
    pub day: String,
    pub meal_type: String,
}

#[derive(Debug, Serialize)]
pub struct AlternativeResponse {
    pub plan: MealPlan,
    pub dish: String,
    pub ingredients_unavailable: bool,
}
