use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::text::fold;

/// Dietary profile of a user. `id` is the auth user id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Profile {
    pub id: Uuid,
    pub display_name: String,
    pub goal: String,
    pub intolerances: Vec<String>, // free text, e.g. "Gluten"
    pub weight: Option<f64>,       // kg
    pub height: Option<f64>,       // cm
}

/// Body of `PUT /api/profile`.
#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub display_name: String,
    pub goal: String,
    #[serde(default)]
    pub intolerances: Vec<String>,
    pub weight: Option<f64>,
    pub height: Option<f64>,
}

impl UpdateProfileRequest {
    /// Returns a user-facing message for the first invalid field.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.goal.trim().is_empty() {
            return Err("El objetivo es obligatorio");
        }
        if self.weight.is_some_and(|w| !(w > 0.0 && w < 500.0)) {
            return Err("El peso no es válido");
        }
        if self.height.is_some_and(|h| !(h > 0.0 && h < 300.0)) {
            return Err("La altura no es válida");
        }
        Ok(())
    }

    pub fn into_profile(self, id: Uuid) -> Profile {
        let mut intolerances: Vec<String> = Vec::new();
        for raw in self.intolerances {
            let name = raw.trim();
            if !name.is_empty() && !intolerances.iter().any(|i| fold(i) == fold(name)) {
                intolerances.push(name.to_string());
            }
        }
        Profile {
            id,
            display_name: self.display_name.trim().to_string(),
            goal: self.goal.trim().to_string(),
            intolerances,
            weight: self.weight,
            height: self.height,
        }
    }
}
