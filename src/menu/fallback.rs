use super::model::{DiaComidas, Slot, WeeklyMenu};
use crate::text::{fold, mentions_unqualified};

pub const DEFAULT_SNACK: &str = "Fruta fresca";

const MORNING_SNACKS: [&str; 6] = [
    "Yogur natural con nueces",
    "Tostada integral con tomate",
    "Manzana con crema de cacahuete",
    "Puñado de almendras",
    "Plátano",
    "Palitos de zanahoria con hummus",
];

const AFTERNOON_SNACKS: [&str; 6] = [
    "Queso fresco con membrillo",
    "Batido de frutas con leche",
    "Hummus con palitos de apio",
    "Galletas de avena",
    "Pera",
    "Mandarinas",
];

/// Foods implied by a declared intolerance beyond its own name.
const RELATED_FOODS: &[(&str, &[&str])] = &[
    (
        "gluten",
        &["trigo", "pan", "tostada", "galleta", "avena", "pasta", "cebada", "centeno"],
    ),
    (
        "lactosa",
        &["leche", "yogur", "queso", "nata", "mantequilla", "batido"],
    ),
    (
        "lacteos",
        &["leche", "yogur", "queso", "nata", "mantequilla", "batido"],
    ),
    (
        "frutos secos",
        &["nuez", "nueces", "almendra", "avellana", "cacahuete", "pistacho", "anacardo"],
    ),
    ("huevo", &["huevo", "tortilla", "mayonesa"]),
    ("marisco", &["gamba", "langostino", "mejillon", "calamar", "almeja"]),
    ("pescado", &["merluza", "salmon", "atun", "bacalao", "sardina"]),
    ("soja", &["soja", "tofu", "edamame"]),
];

/// Folded keywords to avoid for the given intolerances.
pub fn intolerance_keywords(intolerances: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for raw in intolerances {
        let key = fold(raw);
        if key.is_empty() {
            continue;
        }
        if let Some((_, related)) = RELATED_FOODS.iter().find(|(name, _)| *name == key) {
            out.extend(related.iter().map(|s| s.to_string()));
        }
        out.push(key);
    }
    out.sort();
    out.dedup();
    out
}

/// First snack for `slot` that mentions none of the intolerance keywords.
pub fn pick_snack(slot: Slot, intolerances: &[String]) -> String {
    let candidates: &[&str] = match slot {
        Slot::SnackTarde => &AFTERNOON_SNACKS,
        _ => &MORNING_SNACKS,
    };
    let keywords = intolerance_keywords(intolerances);
    candidates
        .iter()
        .find(|snack| {
            let folded = fold(snack);
            !keywords.iter().any(|k| mentions_unqualified(&folded, k))
        })
        .map(|s| s.to_string())
        .unwrap_or_else(|| DEFAULT_SNACK.to_string())
}

fn dia(desayuno: &str, snack_manana: &str, comida: &str, snack_tarde: &str, cena: &str) -> DiaComidas {
    DiaComidas {
        desayuno: desayuno.into(),
        snack_manana: snack_manana.into(),
        comida: comida.into(),
        snack_tarde: snack_tarde.into(),
        cena: cena.into(),
    }
}

/// Static week served when generation fails and used to fill gaps.
pub fn example_menu() -> WeeklyMenu {
    WeeklyMenu::from_days([
        dia(
            "Avena con fruta y canela",
            "Yogur natural con nueces",
            "Lentejas estofadas con verduras",
            "Manzana",
            "Merluza al horno con calabacín",
        ),
        dia(
            "Tostada integral con aguacate",
            "Plátano",
            "Pollo al curry con arroz basmati",
            "Queso fresco con membrillo",
            "Crema de calabaza y tortilla francesa",
        ),
        dia(
            "Batido de frutos rojos",
            "Puñado de almendras",
            "Garbanzos con espinacas",
            "Pera",
            "Salmón a la plancha con ensalada",
        ),
        dia(
            "Yogur con granola casera",
            "Mandarinas",
            "Pasta integral con verduras salteadas",
            "Hummus con palitos de zanahoria",
            "Revuelto de champiñones",
        ),
        dia(
            "Pan integral con tomate y aceite",
            "Kiwi",
            "Paella de verduras",
            "Galletas de avena",
            "Sopa de pescado",
        ),
        dia(
            "Tortitas de avena y plátano",
            "Uvas",
            "Ternera guisada con patatas",
            "Batido de frutas con leche",
            "Ensalada caprese",
        ),
        dia(
            "Huevos revueltos con espárragos",
            "Fresas",
            "Arroz con pollo y verduras",
            "Macedonia de frutas",
            "Pizza casera de verduras",
        ),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn example_menu_has_no_repeated_dishes() {
        let menu = example_menu();
        assert_eq!(menu.distinct_dishes().len(), 35);
    }

    #[test]
    fn snack_skips_candidates_with_intolerance_keywords() {
        assert_eq!(pick_snack(Slot::SnackManana, &[]), "Yogur natural con nueces");
        assert_eq!(
            pick_snack(Slot::SnackManana, &["Lactosa".into()]),
            "Tostada integral con tomate"
        );
        assert_eq!(
            pick_snack(Slot::SnackManana, &["lactosa".into(), "Gluten".into()]),
            "Manzana con crema de cacahuete"
        );
        assert_eq!(
            pick_snack(Slot::SnackTarde, &["lácteos".into()]),
            "Hummus con palitos de apio"
        );
    }

    #[test]
    fn snack_falls_back_when_everything_is_excluded() {
        let all: Vec<String> = MORNING_SNACKS.iter().map(|s| s.to_string()).collect();
        assert_eq!(pick_snack(Slot::SnackManana, &all), DEFAULT_SNACK);
    }

    #[test]
    fn keywords_include_related_foods() {
        let k = intolerance_keywords(&["Frutos secos".into()]);
        assert!(k.contains(&"frutos secos".to_string()));
        assert!(k.contains(&"almendra".to_string()));
    }
}
