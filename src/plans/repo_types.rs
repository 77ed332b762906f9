use serde::Serialize;
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use crate::menu::model::WeeklyMenu;

/// A user's menu for one week. At most one per (user, week_start).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MealPlan {
    pub id: Uuid,
    pub user_id: Uuid,
    pub week_start: Date, // always a Monday
    pub title: String,
    pub meals: WeeklyMenu,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}
