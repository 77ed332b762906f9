use serde_json::{Map, Value};
use tracing::debug;

use super::fallback::{example_menu, pick_snack};
use super::model::{Day, DiaComidas, Slot, WeeklyMenu};

/// Produces a complete 7×5 week from whatever the model returned. Day and
/// slot keys are matched ignoring case and accents; unknown keys are dropped
/// and missing or blank slots are filled from the example menu (main meals)
/// or [`pick_snack`] (snacks).
pub fn normalize_menu(source: &Value, intolerances: &[String]) -> WeeklyMenu {
    let example = example_menu();
    let empty = Map::new();
    let source_days = source.as_object().unwrap_or(&empty);

    let days: [DiaComidas; 7] = std::array::from_fn(|i| {
        let day = Day::ALL[i];
        let meals = find_day(source_days, day);
        let mut dia = DiaComidas {
            desayuno: String::new(),
            snack_manana: String::new(),
            comida: String::new(),
            snack_tarde: String::new(),
            cena: String::new(),
        };
        for slot in Slot::ALL {
            let dish = meals
                .and_then(|m| find_slot(m, slot))
                .unwrap_or_else(|| {
                    debug!(%day, %slot, "filling missing slot");
                    fill(&example, day, slot, intolerances)
                });
            dia.set(slot, dish);
        }
        dia
    });

    WeeklyMenu::from_days(days)
}

fn find_day(days: &Map<String, Value>, day: Day) -> Option<&Map<String, Value>> {
    days.iter()
        .filter(|(key, _)| Day::parse(key).ok() == Some(day))
        .find_map(|(_, v)| v.as_object())
}

/// First non-blank dish whose key names `slot`. Validation counts slots
/// through this too, so both agree on what a day contains.
pub(super) fn find_slot(meals: &Map<String, Value>, slot: Slot) -> Option<String> {
    meals
        .iter()
        .filter(|(key, _)| Slot::parse(key).ok() == Some(slot))
        .filter_map(|(_, v)| v.as_str())
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

fn fill(example: &WeeklyMenu, day: Day, slot: Slot, intolerances: &[String]) -> String {
    if slot.is_snack() {
        return pick_snack(slot, intolerances);
    }
    example
        .dish(day, slot)
        .map(str::to_string)
        .unwrap_or_else(|| pick_snack(slot, intolerances))
}
