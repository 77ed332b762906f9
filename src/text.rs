/// Replace accented latin letters with their base letter.
pub fn strip_diacritics(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            'á' | 'à' | 'ä' | 'â' => 'a',
            'é' | 'è' | 'ë' | 'ê' => 'e',
            'í' | 'ì' | 'ï' | 'î' => 'i',
            'ó' | 'ò' | 'ö' | 'ô' => 'o',
            'ú' | 'ù' | 'ü' | 'û' => 'u',
            'Á' | 'À' | 'Ä' | 'Â' => 'A',
            'É' | 'È' | 'Ë' | 'Ê' => 'E',
            'Í' | 'Ì' | 'Ï' | 'Î' => 'I',
            'Ó' | 'Ò' | 'Ö' | 'Ô' => 'O',
            'Ú' | 'Ù' | 'Ü' | 'Û' => 'U',
            'ñ' => 'n',
            'Ñ' => 'N',
            'ç' => 'c',
            'Ç' => 'C',
            other => other,
        })
        .collect()
}

/// Comparison key: trimmed, lowercase, no diacritics, inner whitespace collapsed.
pub fn fold(s: &str) -> String {
    strip_diacritics(s)
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// True when `needle` occurs in `haystack` (both already folded) at least
/// once without being introduced by "sin".
pub fn mentions_unqualified(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return false;
    }
    haystack.match_indices(needle).any(|(idx, _)| {
        let before = haystack[..idx].trim_end();
        let qualified = before == "sin" || before.ends_with(" sin");
        !qualified
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fold_strips_case_accents_and_spacing() {
        assert_eq!(fold("  Miércoles "), "miercoles");
        assert_eq!(fold("Snack   MAÑANA"), "snack manana");
    }

    #[test]
    fn sin_qualifier_allows_mention() {
        assert!(!mentions_unqualified("pan sin gluten con tomate", "gluten"));
        assert!(mentions_unqualified("pasta con gluten", "gluten"));
        assert!(mentions_unqualified(
            "pan sin gluten y galletas de gluten",
            "gluten"
        ));
        assert!(!mentions_unqualified("ensalada verde", "gluten"));
    }

    #[test]
    fn sin_must_be_a_whole_word() {
        // "cocinsin" is not the word "sin"
        assert!(mentions_unqualified("cocinsin gluten", "gluten"));
    }
}
