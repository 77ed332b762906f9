use serde_json::Value;
use tracing::{info, instrument, warn};

use super::dto::Recipe;
use crate::llm::client::LlmClient;
use crate::llm::extract::extract_json_object;
use crate::llm::prompts;
use crate::shopping::dto::IngredientLine;
use crate::shopping::services::ingredient_lines;
use crate::text::{fold, strip_diacritics};

const STOPWORDS: &[&str] = &[
    "de", "con", "al", "a", "la", "el", "y", "en", "del", "los", "las",
];

fn without_stopwords(name: &str) -> String {
    name.split_whitespace()
        .filter(|w| !STOPWORDS.contains(&fold(w).as_str()))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Spellings of a dish name to try in order: as given, without accents,
/// without stopwords, and without both. Duplicates and blanks are dropped.
pub fn name_variants(name: &str) -> Vec<String> {
    let original = name.split_whitespace().collect::<Vec<_>>().join(" ");
    let plain = strip_diacritics(&original);
    let candidates = [
        without_stopwords(&original),
        without_stopwords(&plain),
    ];

    let mut variants: Vec<String> = Vec::new();
    for candidate in [original, plain].into_iter().chain(candidates) {
        if !candidate.is_empty() && !variants.contains(&candidate) {
            variants.push(candidate);
        }
    }
    variants
}

fn parse_recipe(text: &str, requested: &str) -> Option<Recipe> {
    let value = extract_json_object(text).ok()?;
    let ingredientes = match value.get("ingredientes") {
        Some(Value::Array(items)) => ingredient_lines(items),
        _ => Vec::new(),
    };
    let pasos: Vec<String> = match value.get("pasos") {
        Some(Value::Array(steps)) => steps
            .iter()
            .filter_map(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect(),
        _ => Vec::new(),
    };
    if ingredientes.is_empty() || pasos.is_empty() {
        return None;
    }
    Some(Recipe {
        nombre: requested.to_string(),
        ingredientes,
        pasos,
    })
}

/// Recipe served when no name variant produced a usable answer.
pub fn generic_recipe(name: &str) -> Recipe {
    let line = |nombre: &str, cantidad: &str| IngredientLine {
        nombre: nombre.to_string(),
        cantidad: cantidad.to_string(),
    };
    Recipe {
        nombre: name.to_string(),
        ingredientes: vec![
            line("Ingrediente principal", "200 g"),
            line("Verduras de temporada", "150 g"),
            line("Aceite de oliva", "1 cda"),
            line("Sal", "al gusto"),
        ],
        pasos: vec![
            "Lava y corta los ingredientes.".to_string(),
            "Cocina el ingrediente principal a fuego medio con el aceite.".to_string(),
            "Añade las verduras y cocina hasta que estén tiernas.".to_string(),
            "Ajusta de sal y sirve caliente.".to_string(),
        ],
    }
}

/// Asks the model for each name variant in turn. Never fails: the generic
/// recipe is returned when every variant is exhausted.
#[instrument(skip(llm))]
pub async fn recipe_detail(llm: &dyn LlmClient, name: &str) -> Recipe {
    for variant in name_variants(name) {
        match llm.generate(&prompts::recipe_detail(&variant)).await {
            Ok(text) => match parse_recipe(&text, name) {
                Some(recipe) => {
                    info!(%variant, "recipe found");
                    return recipe;
                }
                None => warn!(%variant, "recipe answer unusable"),
            },
            Err(e) => warn!(%variant, error = %e, "recipe request failed"),
        }
    }
    warn!("serving generic recipe");
    generic_recipe(name)
}
