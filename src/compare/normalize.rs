use regex::Regex;
use std::sync::OnceLock;

use crate::excel::CellValue;

/// Plain decimal literal: optional sign, digits with optional fraction, optional exponent
fn decimal_literal() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[+-]?(\d+\.?\d*|\.\d+)([eE][+-]?\d+)?$")
            .expect("decimal literal pattern is valid")
    })
}

/// Canonical text of a number: shortest round-trip form, so `5.0` prints as `5`.
///
/// Negative zero prints as `0`. NaN has no canonical text and maps to empty.
pub fn canonical_number(n: f64) -> String {
    if n.is_nan() {
        return String::new();
    }
    if n == 0.0 {
        return "0".to_string();
    }
    n.to_string()
}

/// Text form a cell is compared by.
///
/// Two cells are equal iff their normalized forms are identical. Numbers and
/// numeric-looking text share one canonical form; other text is trimmed.
pub fn normalize(value: &CellValue) -> String {
    match value {
        CellValue::Empty => String::new(),
        CellValue::Number(n) => canonical_number(*n),
        CellValue::String(s) => normalize_text(s),
        CellValue::Boolean(b) => {
            if *b {
                "TRUE".to_string()
            } else {
                "FALSE".to_string()
            }
        }
        CellValue::DateTime(dt) => dt.trim().to_string(),
        CellValue::Error(e) => e.trim().to_string(),
    }
}

fn normalize_text(s: &str) -> String {
    let trimmed = s.trim();
    if decimal_literal().is_match(trimmed) {
        if let Ok(n) = trimmed.parse::<f64>() {
            if n.is_finite() {
                return canonical_number(n);
            }
        }
    }
    trimmed.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> CellValue {
        CellValue::String(s.to_string())
    }

    #[test]
    fn test_number_forms_agree() {
        assert_eq!(normalize(&CellValue::Number(5.0)), "5");
        assert_eq!(normalize(&text("5.0")), "5");
        assert_eq!(normalize(&text(" 5 ")), "5");
        assert_eq!(normalize(&text("+5.00")), "5");
        assert_eq!(normalize(&text("5e0")), "5");
        assert_eq!(normalize(&CellValue::Number(2.5)), "2.5");
        assert_eq!(normalize(&CellValue::Number(-0.0)), "0");
    }

    #[test]
    fn test_missing_forms_are_empty() {
        assert_eq!(normalize(&CellValue::Empty), "");
        assert_eq!(normalize(&CellValue::Number(f64::NAN)), "");
        assert_eq!(normalize(&text("")), "");
        assert_eq!(normalize(&text("   ")), "");
    }

    #[test]
    fn test_text_is_trimmed_not_folded() {
        assert_eq!(normalize(&text("  Green  Tea ")), "Green  Tea");
        assert_ne!(normalize(&text("tea")), normalize(&text("Tea")));
    }

    #[test]
    fn test_non_decimal_text_stays_text() {
        assert_eq!(normalize(&text("NaN")), "NaN");
        assert_eq!(normalize(&text("inf")), "inf");
        assert_eq!(normalize(&text("0x10")), "0x10");
        assert_eq!(normalize(&text("1,000")), "1,000");
        assert_eq!(normalize(&text("5 kg")), "5 kg");
    }

    #[test]
    fn test_other_variants() {
        assert_eq!(normalize(&CellValue::Boolean(true)), "TRUE");
        assert_eq!(normalize(&CellValue::Boolean(false)), "FALSE");
        assert_eq!(
            normalize(&CellValue::DateTime("2024-01-01T00:00:00".into())),
            "2024-01-01T00:00:00"
        );
        assert_eq!(normalize(&CellValue::Error("#DIV/0!".into())), "#DIV/0!");
    }

    #[test]
    fn test_no_epsilon() {
        assert_ne!(
            normalize(&CellValue::Number(0.1 + 0.2)),
            normalize(&CellValue::Number(0.3))
        );
    }

    #[test]
    fn test_idempotent() {
        let samples = vec![
            CellValue::Empty,
            CellValue::Number(5.0),
            CellValue::Number(1e21),
            CellValue::Number(-1.25e-7),
            CellValue::Number(0.1 + 0.2),
            CellValue::Number(f64::NAN),
            CellValue::Number(f64::INFINITY),
            CellValue::Boolean(false),
            text(" 5.0 "),
            text(" Tea "),
            text("007"),
            text("NaN"),
        ];

        for sample in samples {
            let once = normalize(&sample);
            let twice = normalize(&CellValue::String(once.clone()));
            assert_eq!(once, twice, "normalize not idempotent for {:?}", sample);
        }
    }
}
