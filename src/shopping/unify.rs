use lazy_static::lazy_static;
use regex::Regex;

use crate::text::fold;

lazy_static! {
    /// Ordered (pattern, canonical name) pairs, matched against folded names.
    static ref NAME_RULES: Vec<(Regex, &'static str)> = [
        (r"^aceite( de)? oliva\b", "Aceite de oliva"),
        (r"^aove$", "Aceite de oliva"),
        (r"^aceite( de)? girasol\b", "Aceite de girasol"),
        (r"^huevos?\b", "Huevos"),
        (r"^claras? de huevo\b", "Claras de huevo"),
        (r"^tomates?( cherry| pera| maduros?| rojos?)?$", "Tomate"),
        (r"^tomate triturado\b", "Tomate triturado"),
        (r"^cebollas?( blancas?| moradas?| rojas?| dulces?)?$", "Cebolla"),
        (r"^(dientes? de )?ajos?$", "Ajo"),
        (r"^patatas?( nuevas?| medianas?| grandes?)?$", "Patata"),
        (r"^zanahorias?$", "Zanahoria"),
        (r"^pechugas? de pollo\b", "Pechuga de pollo"),
        (r"^(filetes? de )?pollo$", "Pollo"),
        (r"^leche( entera| desnatada| semidesnatada)?$", "Leche"),
        (r"^yogur(es|t)?( naturale?s?)?( desnatados?)?$", "Yogur natural"),
        (r"^arroz( blanco| integral| redondo| basmati| largo)?$", "Arroz"),
        (r"^limon(es)?$", "Limón"),
        (r"^(copos de )?avena\b", "Avena"),
        (r"^platanos?$", "Plátano"),
        (r"^espinacas?( frescas?| baby)?$", "Espinacas"),
        (r"^calabacin(es)?$", "Calabacín"),
        (r"^pimientos? rojos?$", "Pimiento rojo"),
        (r"^pimientos? verdes?$", "Pimiento verde"),
        (r"^queso fresco\b", "Queso fresco"),
        (r"^pan integral\b", "Pan integral"),
        (r"^lentejas?\b", "Lentejas"),
        (r"^garbanzos?\b", "Garbanzos"),
    ]
    .into_iter()
    .map(|(pattern, name)| (Regex::new(pattern).unwrap(), name))
    .collect();

    /// Pantry items never added to the list.
    static ref IGNORED: Regex = Regex::new(
        r"^(sal|sal fina|sal gruesa|agua|pimienta( negra| blanca)?|sal y pimienta|especias?|oregano|comino|pimenton( dulce| picante)?|canela|perejil( seco)?|laurel|hierbas provenzales|vinagre|caldo de pollo)( al gusto)?$"
    )
    .unwrap();
}

/// Canonical display name for an ingredient. Unmapped names are returned trimmed.
pub fn unify_name(raw: &str) -> String {
    let key = fold(raw);
    NAME_RULES
        .iter()
        .find(|(re, _)| re.is_match(&key))
        .map(|(_, name)| name.to_string())
        .unwrap_or_else(|| raw.split_whitespace().collect::<Vec<_>>().join(" "))
}

/// Grouping key: the folded canonical name.
pub fn grouping_key(raw: &str) -> String {
    fold(&unify_name(raw))
}

pub fn is_ignored(raw: &str) -> bool {
    let key = fold(&raw.replace(['(', ')'], " "));
    key.is_empty() || IGNORED.is_match(&key)
}
