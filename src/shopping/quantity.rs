use std::fmt;

use lazy_static::lazy_static;
use regex::Regex;

use crate::text::fold;

lazy_static! {
    static ref AMOUNT_RE: Regex =
        Regex::new(r"^(?P<num>\d+\s+\d+/\d+|\d+/\d+|\d+(?:[.,]\d+)?)\s*(?P<rest>.*)$").unwrap();
}

#[derive(Debug, Clone, PartialEq)]
enum Amount {
    Measured { value: f64, unit: &'static str },
    Other { value: f64, unit: String },
    Text(String),
}

/// A shopping quantity: a list of same-unit sums plus any free text that
/// could not be read as a number. Different units are never converted.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Quantity {
    parts: Vec<Amount>,
}

fn parse_number(num: &str) -> Option<f64> {
    let num = num.trim();
    if let Some((whole, frac)) = num.split_once(char::is_whitespace) {
        return Some(parse_number(whole)? + parse_number(frac)?);
    }
    if let Some((n, d)) = num.split_once('/') {
        let n: f64 = n.trim().parse().ok()?;
        let d: f64 = d.trim().parse().ok()?;
        return (d != 0.0).then(|| n / d);
    }
    num.replace(',', ".").parse().ok()
}

fn word_number(word: &str) -> Option<f64> {
    match word {
        "un" | "una" | "uno" => Some(1.0),
        "medio" | "media" => Some(0.5),
        "dos" => Some(2.0),
        "tres" => Some(3.0),
        _ => None,
    }
}

/// Normalized unit token; `None` means the unit is not one we know.
pub fn normalize_unit(raw: &str) -> Option<&'static str> {
    let unit = raw.trim().trim_end_matches('.');
    let token = match unit {
        "" | "u" | "un" | "ud" | "uds" | "unidad" | "unidades" | "pieza" | "piezas" => "un",
        "g" | "gr" | "grs" | "gramo" | "gramos" => "g",
        "kg" | "kilo" | "kilos" | "kilogramo" | "kilogramos" => "kg",
        "ml" | "mililitro" | "mililitros" => "ml",
        "cl" => "cl",
        "l" | "litro" | "litros" => "l",
        "cda" | "cdas" | "cucharada" | "cucharadas" => "cda",
        "cdta" | "cdtas" | "cdita" | "cucharadita" | "cucharaditas" => "cdta",
        "taza" | "tazas" => "taza",
        "vaso" | "vasos" => "vaso",
        "diente" | "dientes" => "diente",
        "loncha" | "lonchas" => "loncha",
        "rebanada" | "rebanadas" => "rebanada",
        "lata" | "latas" => "lata",
        "pizca" | "pizcas" => "pizca",
        "punado" | "punados" => "puñado",
        _ => return None,
    };
    Some(token)
}

fn amount(value: f64, unit_word: &str) -> Amount {
    match normalize_unit(unit_word) {
        Some(unit) => Amount::Measured { value, unit },
        None => Amount::Other {
            value,
            unit: unit_word.to_string(),
        },
    }
}

fn parse_amount(raw: &str) -> Option<Amount> {
    let folded = fold(raw);
    if folded.is_empty() {
        return None;
    }
    if let Some(caps) = AMOUNT_RE.captures(&folded) {
        if let Some(value) = caps.name("num").and_then(|m| parse_number(m.as_str())) {
            let unit_word = caps
                .name("rest")
                .and_then(|m| m.as_str().split_whitespace().next())
                .unwrap_or("");
            return Some(amount(value, unit_word));
        }
    }
    let mut words = folded.split_whitespace();
    if let (Some(value), Some(unit_word)) = (words.next().and_then(word_number), words.next()) {
        return Some(amount(value, unit_word));
    }
    Some(Amount::Text(raw.trim().to_string()))
}

fn format_value(v: f64) -> String {
    if (v - v.round()).abs() < 1e-9 {
        format!("{}", v.round() as i64)
    } else {
        let s = format!("{v:.2}");
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

impl Quantity {
    pub fn parse(raw: &str) -> Self {
        Self {
            parts: parse_amount(raw).into_iter().collect(),
        }
    }

    /// Adds `other` in place: same units are summed, anything else appended.
    pub fn add(&mut self, other: &Quantity) {
        for part in &other.parts {
            let existing = self.parts.iter_mut().find(|p| match (p, part) {
                (Amount::Measured { unit: a, .. }, Amount::Measured { unit: b, .. }) => a == b,
                (Amount::Other { unit: a, .. }, Amount::Other { unit: b, .. }) => a == b,
                (Amount::Text(a), Amount::Text(b)) => fold(a) == fold(b),
                _ => false,
            });
            match (existing, part) {
                (Some(Amount::Measured { value, .. }), Amount::Measured { value: add, .. })
                | (Some(Amount::Other { value, .. }), Amount::Other { value: add, .. }) => {
                    *value += add;
                }
                (Some(Amount::Text(_)), Amount::Text(_)) => {}
                _ => self.parts.push(part.clone()),
            }
        }
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self
            .parts
            .iter()
            .map(|p| match p {
                Amount::Measured { value, unit } => format!("{} {}", format_value(*value), unit),
                Amount::Other { value, unit } => format!("{} {}", format_value(*value), unit),
                Amount::Text(t) => t.clone(),
            })
            .collect();
        f.write_str(&rendered.join(" + "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sum_quantities(a: &str, b: &str) -> String {
        let mut q = Quantity::parse(a);
        q.add(&Quantity::parse(b));
        q.to_string()
    }

    #[test]
    fn same_units_are_summed() {
        assert_eq!(sum_quantities("100 g", "50 g"), "150 g");
        assert_eq!(sum_quantities("100g", "50 gramos"), "150 g");
        assert_eq!(sum_quantities("2", "1 unidad"), "3 un");
        assert_eq!(sum_quantities("1/2 taza", "1 taza"), "1.5 taza");
        assert_eq!(sum_quantities("1 1/2 cucharadas", "1 cda"), "2.5 cda");
        assert_eq!(sum_quantities("0,25 l", "0.5 litros"), "0.75 l");
        assert_eq!(sum_quantities("una pizca", "1 pizca"), "2 pizca");
    }

    #[test]
    fn mismatched_units_are_concatenated() {
        assert_eq!(sum_quantities("100 g", "2 un"), "100 g + 2 un");
        assert_eq!(sum_quantities("1,5 kg", "500 g"), "1.5 kg + 500 g");
    }

    #[test]
    fn free_text_is_kept_once() {
        assert_eq!(sum_quantities("al gusto", "50 g"), "al gusto + 50 g");
        assert_eq!(sum_quantities("Al gusto", "al gusto"), "Al gusto");
        assert_eq!(sum_quantities("", "30 ml"), "30 ml");
        assert_eq!(sum_quantities("", ""), "");
    }

    #[test]
    fn unknown_units_sum_with_themselves() {
        assert_eq!(sum_quantities("2 sobres", "1 sobres"), "3 sobres");
    }

    #[test]
    fn chaining_many_quantities() {
        let mut q = Quantity::default();
        for raw in ["80 g", "2 un", "20 g", "1 un"] {
            q.add(&Quantity::parse(raw));
        }
        assert_eq!(q.to_string(), "100 g + 3 un");
    }
}
