use std::collections::BTreeMap;

use serde_json::Value;
use thiserror::Error;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::dto::{AggregatedItem, IngredientLine, ShoppingSummary};
use super::quantity::Quantity;
use super::repo_types::{ShoppingListEntry, UNAVAILABLE};
use super::unify::{grouping_key, is_ignored, unify_name};
use crate::llm::client::{LlmClient, LlmError};
use crate::llm::extract::{extract_json_array, extract_json_object, ExtractError};
use crate::llm::prompts;
use crate::menu::model::{Day, Slot};
use crate::plans::repo_types::MealPlan;
use crate::retry::{retry_validated, RetryOutcome};
use crate::text::fold;

#[derive(Debug, Error)]
pub enum IngredientError {
    #[error(transparent)]
    Llm(#[from] LlmError),
    #[error(transparent)]
    Extract(#[from] ExtractError),
    #[error("no ingredients listed")]
    Empty,
}

fn value_to_text(v: &Value) -> String {
    match v {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    }
}

/// Items may be `{nombre, cantidad}` objects or plain names; nameless
/// items are dropped.
pub fn ingredient_lines(items: &[Value]) -> Vec<IngredientLine> {
    items
        .iter()
        .filter_map(|item| match item {
            Value::String(name) => Some(IngredientLine {
                nombre: name.trim().to_string(),
                cantidad: String::new(),
            }),
            Value::Object(obj) => Some(IngredientLine {
                nombre: obj.get("nombre").map(value_to_text).unwrap_or_default(),
                cantidad: obj.get("cantidad").map(value_to_text).unwrap_or_default(),
            }),
            _ => None,
        })
        .filter(|l| !l.nombre.is_empty())
        .collect()
}

/// Reads an ingredient list from model output. Accepts a bare array or an
/// object with an `ingredientes` array.
pub fn parse_ingredients(text: &str) -> Result<Vec<IngredientLine>, IngredientError> {
    let items = match extract_json_array(text) {
        Ok(items) => items,
        Err(array_err) => match extract_json_object(text) {
            Ok(Value::Object(mut obj)) => match obj.remove("ingredientes") {
                Some(Value::Array(items)) => items,
                _ => return Err(array_err.into()),
            },
            _ => return Err(array_err.into()),
        },
    };

    let lines = ingredient_lines(&items);
    if lines.is_empty() {
        return Err(IngredientError::Empty);
    }
    Ok(lines)
}

/// Asks the model for one dish's ingredients, retrying immediately up to
/// `max_attempts` times.
#[instrument(skip(llm))]
pub async fn fetch_ingredients(
    llm: &dyn LlmClient,
    dish: &str,
    max_attempts: u32,
) -> RetryOutcome<Vec<IngredientLine>, IngredientError> {
    let prompt = prompts::dish_ingredients(dish);
    retry_validated(
        max_attempts,
        |_, _| {
            let prompt = &prompt;
            async move {
                let text = llm.generate(prompt).await?;
                parse_ingredients(&text)
            }
        },
        |_| Ok(()),
        |_| None,
    )
    .await
}

/// Rows built for a plan, plus the dishes that fell back to the sentinel.
#[derive(Debug, Default)]
pub struct ShoppingBuild {
    pub entries: Vec<ShoppingListEntry>,
    pub unavailable: Vec<String>,
}

/// Ingredients of `dish`, or the single `No disponible` line when the
/// model never produced a usable list. The flag is true in the latter case.
pub async fn ingredients_or_sentinel(
    llm: &dyn LlmClient,
    dish: &str,
    max_attempts: u32,
) -> (Vec<IngredientLine>, bool) {
    match fetch_ingredients(llm, dish, max_attempts).await.into_value() {
        Ok(lines) => (lines, false),
        Err(e) => {
            warn!(%dish, error = %e, "ingredients unavailable");
            let sentinel = IngredientLine {
                nombre: UNAVAILABLE.to_string(),
                cantidad: String::new(),
            };
            (vec![sentinel], true)
        }
    }
}

/// Shopping rows for one slot of `plan`. Pantry items are skipped and
/// names unified; the sentinel line is kept as is.
pub fn slot_entries(
    plan: &MealPlan,
    day: Day,
    slot: Slot,
    dish: &str,
    lines: &[IngredientLine],
) -> Vec<ShoppingListEntry> {
    lines
        .iter()
        .filter(|line| line.nombre == UNAVAILABLE || !is_ignored(&line.nombre))
        .map(|line| ShoppingListEntry {
            id: Uuid::new_v4(),
            user_id: plan.user_id,
            meal_plan_id: plan.id,
            week: plan.week_start,
            day,
            meal_type: slot,
            dish: dish.to_string(),
            ingredient: if line.nombre == UNAVAILABLE {
                UNAVAILABLE.to_string()
            } else {
                unify_name(&line.nombre)
            },
            quantity: line.cantidad.trim().to_string(),
            checked: false,
        })
        .collect()
}

/// Fetches ingredients for every distinct dish of `plan`, one dish at a
/// time, and turns them into shopping rows for every slot that serves it.
/// A dish that exhausts its attempts gets a single `No disponible` row per
/// slot instead of disappearing from the list.
#[instrument(skip(llm, plan), fields(plan_id = %plan.id))]
pub async fn build_entries(
    llm: &dyn LlmClient,
    plan: &MealPlan,
    max_attempts: u32,
) -> ShoppingBuild {
    let mut build = ShoppingBuild::default();

    for dish in plan.meals.distinct_dishes() {
        let (lines, unavailable) = ingredients_or_sentinel(llm, &dish, max_attempts).await;
        if unavailable {
            build.unavailable.push(dish.clone());
        }

        let key = fold(&dish);
        for (day, slot, served) in plan.meals.entries().filter(|(_, _, d)| fold(d) == key) {
            build
                .entries
                .extend(slot_entries(plan, day, slot, served, &lines));
        }
    }

    info!(
        entries = build.entries.len(),
        unavailable = build.unavailable.len(),
        "shopping list built"
    );
    build
}

/// Merges rows by unified ingredient name and sums their quantities.
pub fn aggregate(entries: &[ShoppingListEntry]) -> ShoppingSummary {
    let mut groups: BTreeMap<String, (AggregatedItem, Quantity)> = BTreeMap::new();
    let mut unavailable: Vec<String> = Vec::new();

    for entry in entries {
        if entry.is_unavailable() {
            if !unavailable.iter().any(|d| fold(d) == fold(&entry.dish)) {
                unavailable.push(entry.dish.clone());
            }
            continue;
        }
        if is_ignored(&entry.ingredient) {
            continue;
        }
        let (item, quantity) = groups
            .entry(grouping_key(&entry.ingredient))
            .or_insert_with(|| {
                (
                    AggregatedItem {
                        nombre: unify_name(&entry.ingredient),
                        cantidad: String::new(),
                        dishes: Vec::new(),
                        entry_ids: Vec::new(),
                        checked: true,
                    },
                    Quantity::default(),
                )
            });
        quantity.add(&Quantity::parse(&entry.quantity));
        if !item.dishes.contains(&entry.dish) {
            item.dishes.push(entry.dish.clone());
        }
        item.entry_ids.push(entry.id);
        item.checked &= entry.checked;
    }

    let items = groups
        .into_values()
        .map(|(mut item, quantity)| {
            item.cantidad = quantity.to_string();
            item
        })
        .collect();

    ShoppingSummary { items, unavailable }
}
