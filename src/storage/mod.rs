use async_trait::async_trait;
use thiserror::Error;
use time::Date;
use uuid::Uuid;

use crate::menu::model::{Day, Slot};
use crate::plans::repo_types::MealPlan;
use crate::profiles::dto::Profile;
use crate::shopping::repo_types::ShoppingListEntry;

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("stored row is invalid: {0}")]
    Corrupt(String),
}

/// Persistence for profiles, plans and shopping-list rows.
#[async_trait]
pub trait PlanStore: Send + Sync {
    async fn get_profile(&self, user_id: Uuid) -> Result<Option<Profile>, StoreError>;
    async fn upsert_profile(&self, profile: &Profile) -> Result<(), StoreError>;

    /// Deletes any plan of the same user and week (with its shopping rows),
    /// then inserts `plan`.
    async fn replace_plan(&self, plan: &MealPlan) -> Result<(), StoreError>;
    async fn find_plan(&self, user_id: Uuid, week_start: Date)
        -> Result<Option<MealPlan>, StoreError>;
    async fn get_plan(&self, user_id: Uuid, plan_id: Uuid) -> Result<Option<MealPlan>, StoreError>;
    /// Returns false when no plan of that user had this id.
    async fn delete_plan(&self, user_id: Uuid, plan_id: Uuid) -> Result<bool, StoreError>;

    async fn insert_entries(&self, entries: &[ShoppingListEntry]) -> Result<(), StoreError>;
    async fn list_entries(&self, user_id: Uuid, plan_id: Uuid)
        -> Result<Vec<ShoppingListEntry>, StoreError>;
    /// Writes `plan.meals` and swaps the shopping rows of (`day`, `slot`)
    /// for `entries`, all or nothing.
    async fn replace_slot(
        &self,
        plan: &MealPlan,
        day: Day,
        slot: Slot,
        entries: &[ShoppingListEntry],
    ) -> Result<(), StoreError>;
    /// Returns false when no entry of that user had this id.
    async fn set_entry_checked(
        &self,
        user_id: Uuid,
        entry_id: Uuid,
        checked: bool,
    ) -> Result<bool, StoreError>;
}
