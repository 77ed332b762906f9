use std::fmt;

use time::{macros::format_description, Date, Duration, OffsetDateTime};
use tracing::{info, instrument};
use uuid::Uuid;

use super::dto::{AlternativeResponse, CreatedPlanResponse};
use super::repo_types::MealPlan;
use crate::error::{AppError, AppResult};
use crate::llm::client::LlmError;
use crate::menu::model::{Day, Slot};
use crate::menu::services::{generate_weekly_menu, suggest_alternative, MenuError};
use crate::profiles::services::require_profile;
use crate::shopping::services::{build_entries, ingredients_or_sentinel, slot_entries};
use crate::state::AppState;

/// Steps of plan creation, in order. Candidate validation is part of
/// `GeneratingMenu`; the generator logs each rejected candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanStage {
    Idle,
    GeneratingMenu,
    Normalizing,
    Persisting,
    FetchingIngredients,
    Done,
}

impl fmt::Display for PlanStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PlanStage::Idle => "idle",
            PlanStage::GeneratingMenu => "generating_menu",
            PlanStage::Normalizing => "normalizing",
            PlanStage::Persisting => "persisting",
            PlanStage::FetchingIngredients => "fetching_ingredients",
            PlanStage::Done => "done",
        };
        f.write_str(name)
    }
}

struct StageLog {
    user_id: Uuid,
    stage: PlanStage,
}

impl StageLog {
    fn new(user_id: Uuid) -> Self {
        Self {
            user_id,
            stage: PlanStage::Idle,
        }
    }

    fn enter(&mut self, next: PlanStage) {
        info!(user_id = %self.user_id, from = %self.stage, to = %next, "plan stage");
        self.stage = next;
    }
}

pub fn monday_of(date: Date) -> Date {
    date - Duration::days(i64::from(date.weekday().number_days_from_monday()))
}

/// Monday of the week named by `raw` (any `YYYY-MM-DD` date in it), or of
/// the current week when absent.
pub fn resolve_week(raw: Option<&str>) -> AppResult<Date> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(monday_of(OffsetDateTime::now_utc().date())),
        Some(s) => Date::parse(s, format_description!("[year]-[month]-[day]"))
            .map(monday_of)
            .map_err(|_| AppError::BadRequest(format!("Fecha no válida: {s}"))),
    }
}

pub fn plan_title(week_start: Date) -> String {
    format!(
        "Menú semana del {:02}/{:02}/{}",
        week_start.day(),
        u8::from(week_start.month()),
        week_start.year()
    )
}

/// Generates and stores the week's menu for `user_id`, then its shopping
/// list. An existing plan for the same week is replaced.
#[instrument(skip(state))]
pub async fn create_plan(
    state: &AppState,
    user_id: Uuid,
    week_start: Date,
) -> AppResult<CreatedPlanResponse> {
    let mut stage = StageLog::new(user_id);
    let profile = require_profile(state.store.as_ref(), user_id).await?;

    // each candidate is validated inside the generator's retry loop
    stage.enter(PlanStage::GeneratingMenu);
    let generated = generate_weekly_menu(
        state.llm.as_ref(),
        &profile,
        state.config.menu_max_attempts,
    )
    .await;

    stage.enter(PlanStage::Normalizing);
    let meals = generated.normalize(&profile.intolerances);

    stage.enter(PlanStage::Persisting);
    let plan = MealPlan {
        id: Uuid::new_v4(),
        user_id,
        week_start,
        title: plan_title(week_start),
        meals,
        created_at: OffsetDateTime::now_utc(),
    };
    state.store.replace_plan(&plan).await?;

    stage.enter(PlanStage::FetchingIngredients);
    let build = build_entries(
        state.llm.as_ref(),
        &plan,
        state.config.ingredient_max_attempts,
    )
    .await;
    state.store.insert_entries(&build.entries).await?;

    stage.enter(PlanStage::Done);
    Ok(CreatedPlanResponse {
        plan,
        menu: generated.origin,
        unavailable: build.unavailable,
    })
}

const ALTERNATIVE_FAILED: &str = "No se pudo generar un plato alternativo";

fn alternative_error(e: MenuError) -> AppError {
    match e {
        MenuError::Llm(e) => AppError::upstream(ALTERNATIVE_FAILED, e),
        MenuError::Extract(e) => AppError::Unparseable(e),
        other => AppError::upstream(ALTERNATIVE_FAILED, LlmError::Upstream(other.to_string())),
    }
}

/// Replaces the dish at (`day`, `slot`) and that slot's shopping rows.
/// Nothing is written until the new dish and its ingredients are known.
#[instrument(skip(state))]
pub async fn replace_dish(
    state: &AppState,
    user_id: Uuid,
    plan_id: Uuid,
    day: Day,
    slot: Slot,
) -> AppResult<AlternativeResponse> {
    let mut plan = state
        .store
        .get_plan(user_id, plan_id)
        .await?
        .ok_or(AppError::NotFound("Menú no encontrado"))?;
    let profile = require_profile(state.store.as_ref(), user_id).await?;

    let dish = suggest_alternative(
        state.llm.as_ref(),
        &profile,
        &plan.meals,
        day,
        slot,
        state.config.menu_max_attempts,
    )
    .await
    .map_err(alternative_error)?;

    let (lines, unavailable) = ingredients_or_sentinel(
        state.llm.as_ref(),
        &dish,
        state.config.ingredient_max_attempts,
    )
    .await;

    plan.meals.set(day, slot, dish.clone());
    let entries = slot_entries(&plan, day, slot, &dish, &lines);
    state.store.replace_slot(&plan, day, slot, &entries).await?;

    info!(%plan_id, %day, %slot, %dish, "dish replaced");
    Ok(AlternativeResponse {
        plan,
        dish,
        ingredients_unavailable: unavailable,
    })
}
