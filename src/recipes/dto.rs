use serde::{Deserialize, Serialize};

use crate::shopping::dto::IngredientLine;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    pub nombre: String,
    pub ingredientes: Vec<IngredientLine>,
    pub pasos: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct RecipeRequest {
    #[serde(default)]
    pub nombre: String,
}

#[derive(Debug, Deserialize)]
pub struct DishRequest {
    #[serde(default)]
    pub plato: String,
}

#[derive(Debug, Serialize)]
pub struct DishIngredientsResponse {
    pub ingredientes: Vec<IngredientLine>,
}
