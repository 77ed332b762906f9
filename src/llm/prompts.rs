use crate::menu::model::{Day, Slot};
use crate::profiles::dto::Profile;

/// Marker the proxy uses to tell single-dish prompts from full-week ones.
pub const ALTERNATIVE_MARKER: &str = "plato alternativo";

pub fn is_alternative_prompt(prompt: &str) -> bool {
    prompt.to_lowercase().contains(ALTERNATIVE_MARKER)
}

fn intolerance_clause(intolerances: &[String]) -> String {
    let names: Vec<&str> = intolerances
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect();
    if names.is_empty() {
        "El usuario no tiene intolerancias declaradas.".to_string()
    } else {
        format!(
            "El usuario es intolerante a: {}. Ningún plato puede contener esos alimentos; \
             si un plato es apto, indícalo con \"sin <alimento>\".",
            names.join(", ")
        )
    }
}

fn body_clause(profile: &Profile) -> String {
    match (profile.weight, profile.height) {
        (Some(w), Some(h)) => format!("Pesa {w} kg y mide {h} cm."),
        (Some(w), None) => format!("Pesa {w} kg."),
        (None, Some(h)) => format!("Mide {h} cm."),
        (None, None) => String::new(),
    }
}

/// Full-week prompt. The model must answer with a JSON object keyed by day.
pub fn weekly_menu(profile: &Profile, previous_failure: Option<&str>) -> String {
    let days: Vec<&str> = Day::ALL.iter().map(|d| d.key()).collect();
    let slots: Vec<&str> = Slot::ALL.iter().map(|s| s.label()).collect();
    let example_day = Slot::ALL
        .iter()
        .map(|s| format!("\"{}\": \"...\"", s.label()))
        .collect::<Vec<_>>()
        .join(", ");

    let mut prompt = format!(
        "Eres un nutricionista. Crea un menú semanal en español para una persona cuyo objetivo es \
         \"{goal}\". {body}\n{intolerances}\n\
         Reglas:\n\
         - Incluye los 7 días: {days}.\n\
         - Cada día tiene exactamente estas 5 comidas: {slots}.\n\
         - No repitas ningún plato en toda la semana.\n\
         - Usa nombres de platos concretos y breves.\n\
         Responde SOLO con un objeto JSON, sin texto adicional, con esta forma:\n\
         {{\"lunes\": {{{example_day}}}, ...}}",
        goal = profile.goal.trim(),
        body = body_clause(profile),
        intolerances = intolerance_clause(&profile.intolerances),
        days = days.join(", "),
        slots = slots.join(", "),
    );
    if let Some(reason) = previous_failure {
        prompt.push_str(&format!(
            "\nTu respuesta anterior no era válida ({reason}). Corrígelo."
        ));
    }
    prompt
}

/// Single-dish replacement prompt. The model must answer with a bare name.
pub fn alternative_dish(
    profile: &Profile,
    dish: &str,
    day: Day,
    slot: Slot,
    week_dishes: &[String],
) -> String {
    format!(
        "Sugiere un {marker} para sustituir \"{dish}\" en el {slot} del {day}. \
         Objetivo del usuario: \"{goal}\". {intolerances}\n\
         No puede ser ninguno de estos platos de la semana: {week}.\n\
         Responde SOLO con el nombre del plato, sin comillas ni explicaciones.",
        marker = ALTERNATIVE_MARKER,
        slot = slot.label().to_lowercase(),
        goal = profile.goal.trim(),
        intolerances = intolerance_clause(&profile.intolerances),
        week = week_dishes.join("; "),
    )
}

/// Ingredient list for one dish, one serving.
pub fn dish_ingredients(dish: &str) -> String {
    format!(
        "Indica los ingredientes para preparar una ración de \"{dish}\". \
         Responde SOLO con un array JSON de objetos con las claves \"nombre\" y \"cantidad\", \
         por ejemplo: [{{\"nombre\": \"Arroz\", \"cantidad\": \"80 g\"}}, \
         {{\"nombre\": \"Huevos\", \"cantidad\": \"2 un\"}}]. \
         Usa g, ml o un como unidades siempre que sea posible."
    )
}

/// Full recipe for a dish name.
pub fn recipe_detail(name: &str) -> String {
    format!(
        "Dame la receta de \"{name}\" para una persona. Responde SOLO con un objeto JSON con la \
         forma {{\"nombre\": \"...\", \"ingredientes\": [{{\"nombre\": \"...\", \"cantidad\": \"...\"}}], \
         \"pasos\": [\"...\"]}}."
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn profile(intolerances: &[&str]) -> Profile {
        Profile {
            id: Uuid::new_v4(),
            display_name: "Ana".into(),
            goal: "Perder peso".into(),
            intolerances: intolerances.iter().map(|s| s.to_string()).collect(),
            weight: Some(70.0),
            height: None,
        }
    }

    #[test]
    fn weekly_prompt_embeds_profile() {
        let p = weekly_menu(&profile(&["Gluten", " "]), None);
        assert!(p.contains("\"Perder peso\""));
        assert!(p.contains("intolerante a: Gluten."));
        assert!(p.contains("Pesa 70 kg."));
        assert!(p.contains("miércoles"));
        assert!(p.contains("\"Snack mañana\": \"...\""));
        assert!(!p.contains("respuesta anterior"));
        assert!(!is_alternative_prompt(&p));
    }

    #[test]
    fn retry_prompt_mentions_previous_failure() {
        let p = weekly_menu(&profile(&[]), Some("dish \"Pan\" contains \"Gluten\""));
        assert!(p.contains("no tiene intolerancias"));
        assert!(p.contains("respuesta anterior no era válida"));
    }

    #[test]
    fn alternative_prompt_carries_marker() {
        let p = alternative_dish(
            &profile(&[]),
            "Lentejas",
            Day::Martes,
            Slot::Comida,
            &["Lentejas".into(), "Sopa".into()],
        );
        assert!(is_alternative_prompt(&p));
        assert!(p.contains("comida del martes"));
        assert!(p.contains("Lentejas; Sopa"));
    }
}
