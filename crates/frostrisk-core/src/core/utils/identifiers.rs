/// Normalizes a dam identifier for registry matching.
///
/// Identifiers are trimmed, and integral numeric identifiers exported as floats (`"123.0"`)
/// collapse to their integer form so both tables agree on the key.
pub fn normalize_identifier(raw: &str) -> String {
    let trimmed = raw.trim();
    if let Ok(value) = trimmed.parse::<f64>() {
        if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
            return format!("{}", value as i64);
        }
    }
    trimmed.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn float_encoded_integers_collapse() {
        assert_eq!(normalize_identifier("123.0"), "123");
        assert_eq!(normalize_identifier(" 42 "), "42");
    }

    #[test]
    fn non_numeric_identifiers_are_only_trimmed() {
        assert_eq!(normalize_identifier("  NVE-77a "), "NVE-77a");
        assert_eq!(normalize_identifier("12.5"), "12.5");
    }
}
