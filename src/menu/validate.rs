use std::collections::{HashMap, HashSet};

use serde_json::Value;
use thiserror::Error;

use super::model::{Day, Slot};
use super::normalize::find_slot;
use crate::text::{fold, mentions_unqualified};

pub const MEALS_PER_DAY: usize = Slot::ALL.len();

/// Why a generated candidate was not accepted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MenuRejection {
    #[error("menu is not a JSON object")]
    NotAnObject,
    #[error("expected 7 days, found {0}")]
    DayCount(usize),
    #[error("unrecognised day key {0:?}")]
    UnknownDay(String),
    #[error("day {0} appears more than once")]
    DuplicateDay(Day),
    #[error("{day} fills {found} of the {} meal slots", MEALS_PER_DAY)]
    MissingMeals { day: Day, found: usize },
    #[error("dish {0:?} is repeated")]
    RepeatedDish(String),
    #[error("dish {dish:?} contains {intolerance:?}")]
    Intolerance { dish: String, intolerance: String },
}

/// Accepts a candidate week only if it is complete, varied and free of the
/// user's intolerances. Checks run in a fixed order and the first failure wins.
pub fn validate_menu(candidate: &Value, intolerances: &[String]) -> Result<(), MenuRejection> {
    let days = candidate.as_object().ok_or(MenuRejection::NotAnObject)?;
    if days.len() != Day::ALL.len() {
        return Err(MenuRejection::DayCount(days.len()));
    }

    let mut seen_days = HashSet::new();
    let mut dishes: Vec<(Day, String)> = Vec::new();
    for (key, meals) in days {
        let day = Day::parse(key).map_err(|_| MenuRejection::UnknownDay(key.clone()))?;
        if !seen_days.insert(day) {
            return Err(MenuRejection::DuplicateDay(day));
        }
        // only slots normalization would keep count; unknown keys are ignored
        let day_dishes: Vec<String> = match meals.as_object() {
            Some(m) => Slot::ALL
                .into_iter()
                .filter_map(|slot| find_slot(m, slot))
                .collect(),
            None => Vec::new(),
        };
        if day_dishes.len() < MEALS_PER_DAY {
            return Err(MenuRejection::MissingMeals {
                day,
                found: day_dishes.len(),
            });
        }
        dishes.extend(day_dishes.into_iter().map(|d| (day, d)));
    }

    let mut by_key: HashMap<String, &str> = HashMap::new();
    for (_, dish) in &dishes {
        if by_key.insert(dish.to_lowercase(), dish).is_some() {
            return Err(MenuRejection::RepeatedDish(dish.clone()));
        }
    }

    check_intolerances(dishes.iter().map(|(_, d)| d.as_str()), intolerances)
}

/// Fails on the first dish that mentions an intolerance without a "sin" qualifier.
pub fn check_intolerances<'a>(
    dishes: impl IntoIterator<Item = &'a str>,
    intolerances: &[String],
) -> Result<(), MenuRejection> {
    let banned: Vec<(String, &String)> = intolerances
        .iter()
        .map(|i| (fold(i), i))
        .filter(|(k, _)| !k.is_empty())
        .collect();
    for dish in dishes {
        let folded = fold(dish);
        if let Some((_, original)) = banned
            .iter()
            .find(|(key, _)| mentions_unqualified(&folded, key))
        {
            return Err(MenuRejection::Intolerance {
                dish: dish.to_string(),
                intolerance: (*original).clone(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::menu::fallback::example_menu;
    use serde_json::json;

    fn sample() -> Value {
        example_menu().to_value()
    }

    #[test]
    fn example_menu_passes() {
        assert_eq!(validate_menu(&sample(), &[]), Ok(()));
    }

    #[test]
    fn rejects_non_objects() {
        assert_eq!(validate_menu(&json!([1, 2]), &[]), Err(MenuRejection::NotAnObject));
    }

    #[test]
    fn rejects_wrong_day_count() {
        let mut menu = sample();
        menu.as_object_mut().unwrap().remove("domingo");
        assert_eq!(validate_menu(&menu, &[]), Err(MenuRejection::DayCount(6)));
    }

    #[test]
    fn rejects_unknown_and_duplicate_days() {
        let mut menu = sample();
        let obj = menu.as_object_mut().unwrap();
        let domingo = obj.remove("domingo").unwrap();
        obj.insert("sunday".into(), domingo.clone());
        assert_eq!(
            validate_menu(&menu, &[]),
            Err(MenuRejection::UnknownDay("sunday".into()))
        );

        let obj = menu.as_object_mut().unwrap();
        obj.remove("sunday");
        obj.insert("LUNES".into(), domingo);
        assert!(matches!(
            validate_menu(&menu, &[]),
            Err(MenuRejection::DuplicateDay(Day::Lunes))
        ));
    }

    #[test]
    fn rejects_days_with_too_few_meals() {
        let mut menu = sample();
        menu["martes"] = json!({"Desayuno": "Café", "Comida": "Sopa", "Cena": "  "});
        assert_eq!(
            validate_menu(&menu, &[]),
            Err(MenuRejection::MissingMeals {
                day: Day::Martes,
                found: 2
            })
        );
    }

    #[test]
    fn unrecognised_slot_keys_do_not_count() {
        let mut menu = sample();
        let jueves = menu["jueves"].as_object_mut().unwrap();
        let snack = jueves.remove("Snack mañana").unwrap();
        jueves.insert("Tentempié".into(), snack);
        assert_eq!(
            validate_menu(&menu, &[]),
            Err(MenuRejection::MissingMeals {
                day: Day::Jueves,
                found: 4
            })
        );

        // two keys for the same slot still leave one slot empty
        let jueves = menu["jueves"].as_object_mut().unwrap();
        jueves.remove("Tentempié");
        jueves.insert("Almuerzo".into(), json!("Arroz con pollo"));
        assert!(matches!(
            validate_menu(&menu, &[]),
            Err(MenuRejection::MissingMeals { found: 4, .. })
        ));
    }

    #[test]
    fn accepts_long_snack_names() {
        let mut menu = sample();
        for day in Day::ALL {
            let meals = menu[day.key()].as_object_mut().unwrap();
            let morning = meals.remove("Snack mañana").unwrap();
            let afternoon = meals.remove("Snack tarde").unwrap();
            meals.insert("Snack de la mañana".into(), morning);
            meals.insert("Snack de la tarde".into(), afternoon);
        }
        assert_eq!(validate_menu(&menu, &[]), Ok(()));
    }

    #[test]
    fn rejects_repeated_dish_case_insensitively() {
        let mut menu = sample();
        menu["domingo"]["Cena"] = json!("LENTEJAS ESTOFADAS CON VERDURAS");
        assert!(matches!(
            validate_menu(&menu, &[]),
            Err(MenuRejection::RepeatedDish(_))
        ));
    }

    #[test]
    fn rejects_unqualified_intolerance() {
        let mut menu = sample();
        menu["jueves"]["Comida"] = json!("Pasta con gluten y tomate");
        assert_eq!(
            validate_menu(&menu, &["Gluten".into()]),
            Err(MenuRejection::Intolerance {
                dish: "Pasta con gluten y tomate".into(),
                intolerance: "Gluten".into()
            })
        );
    }

    #[test]
    fn accepts_sin_qualified_intolerance() {
        let mut menu = sample();
        menu["jueves"]["Comida"] = json!("Pasta sin gluten con verduras");
        assert_eq!(validate_menu(&menu, &["gluten".into()]), Ok(()));
    }

    #[test]
    fn intolerance_match_ignores_accents() {
        let err = check_intolerances(["Yogur con LÁCTEOS"], &["lacteos".into()]).unwrap_err();
        assert!(matches!(err, MenuRejection::Intolerance { .. }));
    }
}
