use async_trait::async_trait;
use sqlx::{types::Json, FromRow, PgPool, Postgres, Transaction};
use time::{Date, OffsetDateTime};
use tracing::debug;
use uuid::Uuid;

use super::{PlanStore, StoreError};
use crate::menu::model::{Day, Slot, WeeklyMenu};
use crate::plans::repo_types::MealPlan;
use crate::profiles::dto::Profile;
use crate::shopping::repo_types::ShoppingListEntry;

#[derive(Clone)]
pub struct PgStore {
    db: PgPool,
}

impl PgStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[derive(Debug, FromRow)]
struct PlanRow {
    id: Uuid,
    user_id: Uuid,
    week_start: Date,
    title: String,
    meals: Json<WeeklyMenu>,
    created_at: OffsetDateTime,
}

impl From<PlanRow> for MealPlan {
    fn from(r: PlanRow) -> Self {
        Self {
            id: r.id,
            user_id: r.user_id,
            week_start: r.week_start,
            title: r.title,
            meals: r.meals.0,
            created_at: r.created_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct EntryRow {
    id: Uuid,
    user_id: Uuid,
    meal_plan_id: Uuid,
    week: Date,
    day: String,
    meal_type: String,
    dish: String,
    ingredient: String,
    quantity: String,
    checked: bool,
}

impl TryFrom<EntryRow> for ShoppingListEntry {
    type Error = StoreError;

    fn try_from(r: EntryRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: r.id,
            user_id: r.user_id,
            meal_plan_id: r.meal_plan_id,
            week: r.week,
            day: Day::parse(&r.day).map_err(|e| StoreError::Corrupt(e.to_string()))?,
            meal_type: Slot::parse(&r.meal_type).map_err(|e| StoreError::Corrupt(e.to_string()))?,
            dish: r.dish,
            ingredient: r.ingredient,
            quantity: r.quantity,
            checked: r.checked,
        })
    }
}

const PLAN_COLUMNS: &str = "id, user_id, week_start, title, meals, created_at";

#[async_trait]
impl PlanStore for PgStore {
    async fn get_profile(&self, user_id: Uuid) -> Result<Option<Profile>, StoreError> {
        let profile = sqlx::query_as::<_, Profile>(
            r#"
            SELECT id, display_name, goal, intolerances, weight, height
            FROM profiles
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?;
        Ok(profile)
    }

    async fn upsert_profile(&self, profile: &Profile) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO profiles (id, display_name, goal, intolerances, weight, height)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (id) DO UPDATE
               SET display_name = EXCLUDED.display_name,
                   goal = EXCLUDED.goal,
                   intolerances = EXCLUDED.intolerances,
                   weight = EXCLUDED.weight,
                   height = EXCLUDED.height
            "#,
        )
        .bind(profile.id)
        .bind(&profile.display_name)
        .bind(&profile.goal)
        .bind(&profile.intolerances)
        .bind(profile.weight)
        .bind(profile.height)
        .execute(&self.db)
        .await?;
        Ok(())
    }

    async fn replace_plan(&self, plan: &MealPlan) -> Result<(), StoreError> {
        let mut tx = self.db.begin().await?;

        // shopping_list rows go with the plan (ON DELETE CASCADE)
        let deleted = sqlx::query("DELETE FROM meal_plans WHERE user_id = $1 AND week_start = $2")
            .bind(plan.user_id)
            .bind(plan.week_start)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        sqlx::query(
            r#"
            INSERT INTO meal_plans (id, user_id, week_start, title, meals, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(plan.id)
        .bind(plan.user_id)
        .bind(plan.week_start)
        .bind(&plan.title)
        .bind(Json(&plan.meals))
        .bind(plan.created_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        debug!(plan_id = %plan.id, replaced = deleted, "plan stored");
        Ok(())
    }

    async fn find_plan(
        &self,
        user_id: Uuid,
        week_start: Date,
    ) -> Result<Option<MealPlan>, StoreError> {
        let row = sqlx::query_as::<_, PlanRow>(&format!(
            "SELECT {PLAN_COLUMNS} FROM meal_plans WHERE user_id = $1 AND week_start = $2 \
             ORDER BY created_at DESC LIMIT 1"
        ))
        .bind(user_id)
        .bind(week_start)
        .fetch_optional(&self.db)
        .await?;
        Ok(row.map(MealPlan::from))
    }

    async fn get_plan(&self, user_id: Uuid, plan_id: Uuid) -> Result<Option<MealPlan>, StoreError> {
        let row = sqlx::query_as::<_, PlanRow>(&format!(
            "SELECT {PLAN_COLUMNS} FROM meal_plans WHERE id = $1 AND user_id = $2"
        ))
        .bind(plan_id)
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?;
        Ok(row.map(MealPlan::from))
    }

    async fn delete_plan(&self, user_id: Uuid, plan_id: Uuid) -> Result<bool, StoreError> {
        let affected = sqlx::query("DELETE FROM meal_plans WHERE id = $1 AND user_id = $2")
            .bind(plan_id)
            .bind(user_id)
            .execute(&self.db)
            .await?
            .rows_affected();
        Ok(affected > 0)
    }

    async fn insert_entries(&self, entries: &[ShoppingListEntry]) -> Result<(), StoreError> {
        let mut tx = self.db.begin().await?;
        for e in entries {
            insert_entry_tx(&mut tx, e).await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn list_entries(
        &self,
        user_id: Uuid,
        plan_id: Uuid,
    ) -> Result<Vec<ShoppingListEntry>, StoreError> {
        let rows = sqlx::query_as::<_, EntryRow>(
            r#"
            SELECT id, user_id, meal_plan_id, week, day, meal_type, dish, ingredient, quantity, checked
              FROM shopping_list
             WHERE user_id = $1 AND meal_plan_id = $2
             ORDER BY dish, ingredient
            "#,
        )
        .bind(user_id)
        .bind(plan_id)
        .fetch_all(&self.db)
        .await?;
        rows.into_iter().map(ShoppingListEntry::try_from).collect()
    }

    async fn replace_slot(
        &self,
        plan: &MealPlan,
        day: Day,
        slot: Slot,
        entries: &[ShoppingListEntry],
    ) -> Result<(), StoreError> {
        let mut tx = self.db.begin().await?;

        sqlx::query("UPDATE meal_plans SET meals = $1 WHERE id = $2 AND user_id = $3")
            .bind(Json(&plan.meals))
            .bind(plan.id)
            .bind(plan.user_id)
            .execute(&mut *tx)
            .await?;

        let removed = sqlx::query(
            "DELETE FROM shopping_list WHERE meal_plan_id = $1 AND day = $2 AND meal_type = $3",
        )
        .bind(plan.id)
        .bind(day.key())
        .bind(slot.label())
        .execute(&mut *tx)
        .await?
        .rows_affected();

        for e in entries {
            insert_entry_tx(&mut tx, e).await?;
        }

        tx.commit().await?;
        debug!(plan_id = %plan.id, %day, %slot, removed, added = entries.len(), "slot replaced");
        Ok(())
    }

    async fn set_entry_checked(
        &self,
        user_id: Uuid,
        entry_id: Uuid,
        checked: bool,
    ) -> Result<bool, StoreError> {
        let affected = sqlx::query("UPDATE shopping_list SET checked = $1 WHERE id = $2 AND user_id = $3")
            .bind(checked)
            .bind(entry_id)
            .bind(user_id)
            .execute(&self.db)
            .await?
            .rows_affected();
        Ok(affected > 0)
    }
}

async fn insert_entry_tx(
    tx: &mut Transaction<'_, Postgres>,
    e: &ShoppingListEntry,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO shopping_list
            (id, user_id, meal_plan_id, week, day, meal_type, dish, ingredient, quantity, checked)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        "#,
    )
    .bind(e.id)
    .bind(e.user_id)
    .bind(e.meal_plan_id)
    .bind(e.week)
    .bind(e.day.key())
    .bind(e.meal_type.label())
    .bind(&e.dish)
    .bind(&e.ingredient)
    .bind(&e.quantity)
    .bind(e.checked)
    .execute(&mut **tx)
    .await?;
    Ok(())
}
