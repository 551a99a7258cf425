//! Spreadsheet formula defusing.
//!
//! Spreadsheet apps evaluate a cell that starts with `=`, `+`, `-` or `@`
//! as a formula, even behind leading blanks. Prefixing such values with an
//! apostrophe makes the app show them as text.

/// Characters that make a spreadsheet cell a formula.
const FORMULA_TRIGGERS: [char; 4] = ['=', '+', '-', '@'];

/// Blanks skipped before looking for a trigger.
const LEADING_BLANKS: [char; 6] = [' ', '\t', '\n', '\r', '\0', '\x0B'];

/// Prefix `value` with `'` if, ignoring leading blanks, it starts with a
/// formula trigger. The original value, blanks included, is kept after
/// the prefix. Any other value is returned unchanged.
#[must_use]
pub fn defuse_formula(value: String) -> String {
    let start = value.trim_start_matches(LEADING_BLANKS);
    if start.starts_with(FORMULA_TRIGGERS) {
        format!("'{value}")
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defuse(value: &str) -> String {
        defuse_formula(value.to_owned())
    }

    #[test]
    fn prefixes_every_trigger() {
        assert_eq!(defuse("=SUM(A1)"), "'=SUM(A1)");
        assert_eq!(defuse("+34 600 000 000"), "'+34 600 000 000");
        assert_eq!(defuse("-1"), "'-1");
        assert_eq!(defuse("@cmd"), "'@cmd");
    }

    #[test]
    fn looks_past_leading_blanks_but_keeps_them() {
        assert_eq!(defuse("  =1+1"), "'  =1+1");
        assert_eq!(defuse("\t@x"), "'\t@x");
    }

    #[test]
    fn leaves_safe_values_alone() {
        for value in ["Ana", "ana@example.com", "a=b", "", "   ", "'=already"] {
            assert_eq!(defuse(value), value);
        }
    }

    #[test]
    fn only_the_first_character_matters() {
        assert_eq!(defuse("1-2"), "1-2");
        assert_eq!(defuse("-"), "'-");
    }
}
