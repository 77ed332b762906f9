use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::text::fold;

/// The seven canonical days, Monday first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Day {
    #[serde(rename = "lunes")]
    Lunes,
    #[serde(rename = "martes")]
    Martes,
    #[serde(rename = "miércoles", alias = "miercoles")]
    Miercoles,
    #[serde(rename = "jueves")]
    Jueves,
    #[serde(rename = "viernes")]
    Viernes,
    #[serde(rename = "sábado", alias = "sabado")]
    Sabado,
    #[serde(rename = "domingo")]
    Domingo,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown day name: {0:?}")]
pub struct UnknownDay(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown meal slot: {0:?}")]
pub struct UnknownSlot(pub String);

impl Day {
    pub const ALL: [Day; 7] = [
        Day::Lunes,
        Day::Martes,
        Day::Miercoles,
        Day::Jueves,
        Day::Viernes,
        Day::Sabado,
        Day::Domingo,
    ];

    /// Lowercase key used in stored plans.
    pub fn key(self) -> &'static str {
        match self {
            Day::Lunes => "lunes",
            Day::Martes => "martes",
            Day::Miercoles => "miércoles",
            Day::Jueves => "jueves",
            Day::Viernes => "viernes",
            Day::Sabado => "sábado",
            Day::Domingo => "domingo",
        }
    }

    /// Case- and accent-insensitive lookup, e.g. `"MIERCOLES"` or `" Sábado"`.
    pub fn parse(text: &str) -> Result<Day, UnknownDay> {
        let folded = fold(text);
        Day::ALL
            .into_iter()
            .find(|d| fold(d.key()) == folded)
            .ok_or_else(|| UnknownDay(text.to_string()))
    }
}

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// The five meal slots of a day, in the order they are eaten.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Slot {
    #[serde(rename = "Desayuno")]
    Desayuno,
    #[serde(rename = "Snack mañana")]
    SnackManana,
    #[serde(rename = "Comida")]
    Comida,
    #[serde(rename = "Snack tarde")]
    SnackTarde,
    #[serde(rename = "Cena")]
    Cena,
}

impl Slot {
    pub const ALL: [Slot; 5] = [
        Slot::Desayuno,
        Slot::SnackManana,
        Slot::Comida,
        Slot::SnackTarde,
        Slot::Cena,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Slot::Desayuno => "Desayuno",
            Slot::SnackManana => "Snack mañana",
            Slot::Comida => "Comida",
            Slot::SnackTarde => "Snack tarde",
            Slot::Cena => "Cena",
        }
    }

    pub fn is_snack(self) -> bool {
        matches!(self, Slot::SnackManana | Slot::SnackTarde)
    }

    pub fn parse(text: &str) -> Result<Slot, UnknownSlot> {
        let folded = fold(text);
        let slot = match folded.as_str() {
            "desayuno" => Slot::Desayuno,
            "snack manana"
            | "snack de manana"
            | "snack de la manana"
            | "snack media manana"
            | "snack de media manana"
            | "media manana"
            | "snack_manana" => Slot::SnackManana,
            "comida" | "almuerzo" => Slot::Comida,
            "snack tarde" | "snack de tarde" | "snack de la tarde" | "merienda" | "snack_tarde" => {
                Slot::SnackTarde
            }
            "cena" => Slot::Cena,
            _ => return Err(UnknownSlot(text.to_string())),
        };
        Ok(slot)
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One day of the plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiaComidas {
    #[serde(rename = "Desayuno")]
    pub desayuno: String,
    #[serde(rename = "Snack mañana")]
    pub snack_manana: String,
    #[serde(rename = "Comida")]
    pub comida: String,
    #[serde(rename = "Snack tarde")]
    pub snack_tarde: String,
    #[serde(rename = "Cena")]
    pub cena: String,
}

impl DiaComidas {
    pub fn get(&self, slot: Slot) -> &str {
        match slot {
            Slot::Desayuno => &self.desayuno,
            Slot::SnackManana => &self.snack_manana,
            Slot::Comida => &self.comida,
            Slot::SnackTarde => &self.snack_tarde,
            Slot::Cena => &self.cena,
        }
    }

    pub fn set(&mut self, slot: Slot, dish: String) {
        let target = match slot {
            Slot::Desayuno => &mut self.desayuno,
            Slot::SnackManana => &mut self.snack_manana,
            Slot::Comida => &mut self.comida,
            Slot::SnackTarde => &mut self.snack_tarde,
            Slot::Cena => &mut self.cena,
        };
        *target = dish;
    }

    pub fn iter(&self) -> impl Iterator<Item = (Slot, &str)> + '_ {
        Slot::ALL.into_iter().map(move |s| (s, self.get(s)))
    }
}

/// A complete week. Built by normalization, so every day is present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeeklyMenu(BTreeMap<Day, DiaComidas>);

impl WeeklyMenu {
    /// Builds a menu from one entry per canonical day.
    pub fn from_days(days: [DiaComidas; 7]) -> Self {
        Self(Day::ALL.into_iter().zip(days).collect())
    }

    pub fn day(&self, day: Day) -> Option<&DiaComidas> {
        self.0.get(&day)
    }

    pub fn set(&mut self, day: Day, slot: Slot, dish: String) {
        if let Some(d) = self.0.get_mut(&day) {
            d.set(slot, dish);
        }
    }

    pub fn dish(&self, day: Day, slot: Slot) -> Option<&str> {
        self.day(day).map(|d| d.get(slot))
    }

    pub fn days(&self) -> impl Iterator<Item = (Day, &DiaComidas)> + '_ {
        self.0.iter().map(|(d, c)| (*d, c))
    }

    /// Every (day, slot, dish) in calendar order.
    pub fn entries(&self) -> impl Iterator<Item = (Day, Slot, &str)> + '_ {
        self.days()
            .flat_map(|(day, comidas)| comidas.iter().map(move |(slot, dish)| (day, slot, dish)))
    }

    /// Distinct dishes in first-appearance order, compared case-insensitively.
    pub fn distinct_dishes(&self) -> Vec<String> {
        let mut seen = std::collections::HashSet::new();
        self.entries()
            .filter(|(_, _, dish)| seen.insert(fold(dish)))
            .map(|(_, _, dish)| dish.to_string())
            .collect()
    }

    pub fn to_value(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}
