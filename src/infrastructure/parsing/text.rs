//! Text patterns shared by strategies and the normalizer

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::ElementRef;

/// Relative category path: `/almacen`, `/frutas-y-verduras`
pub static CATEGORY_PATH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^/[a-z-]+").expect("category path regex is valid"));

/// "Mostrar 20 más" toggles under long facet lists
pub static SHOW_MORE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)mostrar\s+\d+\s+m[aá]s").expect("show-more regex is valid")
});

/// Currency signs, or a number followed by a weight/volume/size unit
pub static PRICE_OR_UNIT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(?:US\$|\$|€)|\d+(?:[.,]\d+)?\s*(?:kg|kgs|g|gr|grs|mg|l|lt|lts|ml|cc|cm|mm|mts|m|oz|lb|un|u)\b",
    )
    .expect("price/unit regex is valid")
});

/// Quoted name-like fields inside inline scripts
pub static SCRIPT_NAME_FIELD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#""(?:name|facetName|label)"\s*:\s*"([^"\\]{2,49})""#)
        .expect("script name field regex is valid")
});

/// Everything outside letters, digits, whitespace and hyphen
static DISALLOWED_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\p{L}\p{N}\s-]").expect("cleaning regex is valid"));

/// Collapse whitespace runs into single spaces and trim
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Visible text of an element, whitespace collapsed
pub fn element_text(element: &ElementRef<'_>) -> String {
    collapse_whitespace(&element.text().collect::<Vec<_>>().join(" "))
}

/// Canonical text form used for identity and output
pub fn clean_text(text: &str) -> String {
    collapse_whitespace(&DISALLOWED_CHARS.replace_all(text, ""))
}

pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Digits and separators only
pub fn is_purely_numeric(text: &str) -> bool {
    let mut saw_digit = false;
    for c in text.chars() {
        if c.is_ascii_digit() {
            saw_digit = true;
        } else if !(c.is_whitespace() || matches!(c, '.' | ',' | '-' | '%')) {
            return false;
        }
    }
    saw_digit
}

pub fn looks_like_price_or_unit(text: &str) -> bool {
    PRICE_OR_UNIT.is_match(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("  Marca  ", "Marca")]
    #[case("Elaboración!!", "Elaboración")]
    #[case("Sub-Category", "Sub-Category")]
    #[case("Tipo\n\t de   envase", "Tipo de envase")]
    #[case("Precio ($)", "Precio")]
    #[case("Tamaño: 1/2", "Tamaño 12")]
    #[case("***", "")]
    fn test_clean_text(#[case] raw: &str, #[case] cleaned: &str) {
        assert_eq!(clean_text(raw), cleaned);
    }

    #[rstest]
    #[case("$ 1.500", true)]
    #[case("US$ 20", true)]
    #[case("500 g", true)]
    #[case("1,5 L", true)]
    #[case("Pack x 6 un", true)]
    #[case("Marca", false)]
    #[case("Gaseosas", false)]
    fn test_price_or_unit(#[case] text: &str, #[case] matches: bool) {
        assert_eq!(looks_like_price_or_unit(text), matches);
    }

    #[rstest]
    #[case("123", true)]
    #[case("1.500,00", true)]
    #[case("25%", true)]
    #[case("3 cuotas", false)]
    #[case("", false)]
    fn test_purely_numeric(#[case] text: &str, #[case] numeric: bool) {
        assert_eq!(is_purely_numeric(text), numeric);
    }

    #[test]
    fn test_show_more_pattern() {
        assert!(SHOW_MORE.is_match("Marca Mostrar 20 más"));
        assert!(SHOW_MORE.is_match("mostrar 5 mas"));
        assert!(!SHOW_MORE.is_match("Mostrar más"));
    }

    #[test]
    fn test_script_name_fields() {
        let script = r#"{"facetName":"Marca","values":[{"name":"Coca-Cola"}],"label":"Envase"}"#;
        let names: Vec<_> = SCRIPT_NAME_FIELD
            .captures_iter(script)
            .map(|c| c[1].to_string())
            .collect();
        assert_eq!(names, vec!["Marca", "Coca-Cola", "Envase"]);
    }
}
