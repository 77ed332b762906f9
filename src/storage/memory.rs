use std::sync::Mutex;

use async_trait::async_trait;
use time::Date;
use uuid::Uuid;

use super::{PlanStore, StoreError};
use crate::menu::model::{Day, Slot};
use crate::plans::repo_types::MealPlan;
use crate::profiles::dto::Profile;
use crate::shopping::repo_types::ShoppingListEntry;

#[derive(Default)]
struct Tables {
    profiles: Vec<Profile>,
    plans: Vec<MealPlan>,
    entries: Vec<ShoppingListEntry>,
}

/// Process-local store used when no database is configured, and in tests.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn with<R>(&self, f: impl FnOnce(&mut Tables) -> R) -> R {
        let mut guard = match self.tables.lock() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        };
        f(&mut guard)
    }
}

#[async_trait]
impl PlanStore for MemoryStore {
    async fn get_profile(&self, user_id: Uuid) -> Result<Option<Profile>, StoreError> {
        Ok(self.with(|t| t.profiles.iter().find(|p| p.id == user_id).cloned()))
    }

    async fn upsert_profile(&self, profile: &Profile) -> Result<(), StoreError> {
        self.with(|t| {
            t.profiles.retain(|p| p.id != profile.id);
            t.profiles.push(profile.clone());
        });
        Ok(())
    }

    async fn replace_plan(&self, plan: &MealPlan) -> Result<(), StoreError> {
        self.with(|t| {
            let stale: Vec<Uuid> = t
                .plans
                .iter()
                .filter(|p| p.user_id == plan.user_id && p.week_start == plan.week_start)
                .map(|p| p.id)
                .collect();
            t.plans.retain(|p| !stale.contains(&p.id));
            t.entries.retain(|e| !stale.contains(&e.meal_plan_id));
            t.plans.push(plan.clone());
        });
        Ok(())
    }

    async fn find_plan(
        &self,
        user_id: Uuid,
        week_start: Date,
    ) -> Result<Option<MealPlan>, StoreError> {
        Ok(self.with(|t| {
            t.plans
                .iter()
                .find(|p| p.user_id == user_id && p.week_start == week_start)
                .cloned()
        }))
    }

    async fn get_plan(&self, user_id: Uuid, plan_id: Uuid) -> Result<Option<MealPlan>, StoreError> {
        Ok(self.with(|t| {
            t.plans
                .iter()
                .find(|p| p.user_id == user_id && p.id == plan_id)
                .cloned()
        }))
    }

    async fn delete_plan(&self, user_id: Uuid, plan_id: Uuid) -> Result<bool, StoreError> {
        Ok(self.with(|t| {
            let before = t.plans.len();
            t.plans.retain(|p| !(p.user_id == user_id && p.id == plan_id));
            let removed = t.plans.len() != before;
            if removed {
                t.entries.retain(|e| e.meal_plan_id != plan_id);
            }
            removed
        }))
    }

    async fn insert_entries(&self, entries: &[ShoppingListEntry]) -> Result<(), StoreError> {
        self.with(|t| t.entries.extend_from_slice(entries));
        Ok(())
    }

    async fn list_entries(
        &self,
        user_id: Uuid,
        plan_id: Uuid,
    ) -> Result<Vec<ShoppingListEntry>, StoreError> {
        Ok(self.with(|t| {
            t.entries
                .iter()
                .filter(|e| e.user_id == user_id && e.meal_plan_id == plan_id)
                .cloned()
                .collect()
        }))
    }

    async fn replace_slot(
        &self,
        plan: &MealPlan,
        day: Day,
        slot: Slot,
        entries: &[ShoppingListEntry],
    ) -> Result<(), StoreError> {
        self.with(|t| {
            if let Some(p) = t
                .plans
                .iter_mut()
                .find(|p| p.id == plan.id && p.user_id == plan.user_id)
            {
                p.meals = plan.meals.clone();
            }
            t.entries
                .retain(|e| !(e.meal_plan_id == plan.id && e.day == day && e.meal_type == slot));
            t.entries.extend_from_slice(entries);
        });
        Ok(())
    }

    async fn set_entry_checked(
        &self,
        user_id: Uuid,
        entry_id: Uuid,
        checked: bool,
    ) -> Result<bool, StoreError> {
        Ok(self.with(|t| {
            match t
                .entries
                .iter_mut()
                .find(|e| e.user_id == user_id && e.id == entry_id)
            {
                Some(e) => {
                    e.checked = checked;
                    true
                }
                None => false,
            }
        }))
    }
}
