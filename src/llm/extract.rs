//! Recovering structured data from free-form model output.
//!
//! Models wrap JSON in markdown fences, add prose before or after it, or
//! answer a "just the name" question with quotes and a label. Extraction is
//! best-effort: when several JSON-looking fragments appear the first opening
//! bracket and the last closing bracket win.

use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    #[error("no parseable JSON {expected} in model output")]
    ParseFailure { expected: &'static str },
    #[error("model output was empty")]
    Empty,
}

lazy_static! {
    static ref FENCE_RE: Regex = Regex::new(r"(?s)```[A-Za-z]*\s*(.*?)```").unwrap();
    static ref OBJECT_RE: Regex = Regex::new(r"(?s)\{.*\}").unwrap();
    static ref ARRAY_RE: Regex = Regex::new(r"(?s)\[.*\]").unwrap();
    static ref LABEL_RE: Regex =
        Regex::new(r"(?i)^(plato( alternativo)?|alternativa|respuesta|nombre)\s*:\s*").unwrap();
}

/// Contents of the first fenced block, or the trimmed text when there is none.
pub fn strip_code_fences(text: &str) -> &str {
    FENCE_RE
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
        .unwrap_or(text)
        .trim()
}

fn extract_with(
    text: &str,
    re: &Regex,
    accept: fn(&Value) -> bool,
    expected: &'static str,
) -> Result<Value, ExtractError> {
    let body = strip_code_fences(text);
    if body.is_empty() {
        return Err(ExtractError::Empty);
    }
    if let Ok(v) = serde_json::from_str::<Value>(body) {
        if accept(&v) {
            return Ok(v);
        }
    }
    // Fences may be absent or broken; look at the whole original text.
    re.find(body)
        .or_else(|| re.find(text))
        .and_then(|m| serde_json::from_str::<Value>(m.as_str()).ok())
        .filter(accept)
        .ok_or(ExtractError::ParseFailure { expected })
}

/// Recovers a JSON object from model output.
pub fn extract_json_object(text: &str) -> Result<Value, ExtractError> {
    extract_with(text, &OBJECT_RE, Value::is_object, "object")
}

/// Recovers a JSON array from model output.
pub fn extract_json_array(text: &str) -> Result<Vec<Value>, ExtractError> {
    match extract_with(text, &ARRAY_RE, Value::is_array, "array")? {
        Value::Array(items) => Ok(items),
        _ => Err(ExtractError::ParseFailure { expected: "array" }),
    }
}

/// Cleans a one-line answer such as a dish name: drops fences, labels,
/// quotes, markdown emphasis and trailing punctuation, keeping the first
/// non-empty line.
pub fn clean_plain_text(text: &str) -> String {
    let body = strip_code_fences(text);
    let line = body
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .unwrap_or("");
    let line = line.trim_start_matches(['-', '*', '•', '#', ' ']);
    let line = LABEL_RE.replace(line, "");
    let unquoted = line.trim_matches(|c: char| {
        matches!(c, '"' | '\'' | '*' | '`' | '«' | '»' | '“' | '”') || c.is_whitespace()
    });
    unquoted.trim_end_matches(['.', '!', ';']).trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_fenced_json() {
        let text = "Aquí tienes tu menú:\n```json\n{\"lunes\": {\"Cena\": \"Sopa\"}}\n```\n¡Que aproveche!";
        assert_eq!(
            extract_json_object(text).unwrap(),
            json!({"lunes": {"Cena": "Sopa"}})
        );
    }

    #[test]
    fn parses_plain_json() {
        assert_eq!(extract_json_object(" {\"a\": 1} ").unwrap(), json!({"a": 1}));
    }

    #[test]
    fn finds_object_inside_prose() {
        let text = "Claro. El menú es {\"martes\": {\"Comida\": \"Arroz\"}} y nada más.";
        assert_eq!(
            extract_json_object(text).unwrap(),
            json!({"martes": {"Comida": "Arroz"}})
        );
    }

    #[test]
    fn unlabelled_fence_is_stripped() {
        let text = "```\n[{\"nombre\": \"Huevos\", \"cantidad\": \"2 un\"}]\n```";
        let items = extract_json_array(text).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["nombre"], "Huevos");
    }

    #[test]
    fn array_inside_prose() {
        let text = "Ingredientes: [\"a\", \"b\"] (aprox.)";
        assert_eq!(extract_json_array(text).unwrap(), vec![json!("a"), json!("b")]);
    }

    #[test]
    fn wrong_shape_is_a_failure() {
        assert_eq!(
            extract_json_object("[1, 2, 3]"),
            Err(ExtractError::ParseFailure { expected: "object" })
        );
    }

    #[test]
    fn malformed_json_is_a_failure() {
        assert!(matches!(
            extract_json_object("{\"lunes\": {\"Cena\": }"),
            Err(ExtractError::ParseFailure { .. })
        ));
        assert_eq!(extract_json_object("   "), Err(ExtractError::Empty));
    }

    #[test]
    fn two_objects_in_prose_are_not_recovered() {
        // The greedy span covers both objects, which is not valid JSON.
        let text = "Opción A: {\"a\": 1} u opción B: {\"b\": 2}";
        assert!(extract_json_object(text).is_err());
    }

    #[test]
    fn cleans_dish_names() {
        assert_eq!(clean_plain_text("\"Crema de calabacín.\""), "Crema de calabacín");
        assert_eq!(
            clean_plain_text("**Plato alternativo:** Pisto manchego\n\nEs sano."),
            "Pisto manchego"
        );
        assert_eq!(clean_plain_text("```\nSalmón al horno\n```"), "Salmón al horno");
        assert_eq!(clean_plain_text("- Ensalada de quinoa"), "Ensalada de quinoa");
    }
}
