//! Contact form submissions.
//!
//! [`ContactForm`] is the raw, untrusted request body. [`Submission`] is
//! the sanitized version, and [`Submission::into_row`] produces the
//! defused, single-line [`ContactRow`] that goes to storage.

use serde::Deserialize;
use teramorph_storage::ContactRow;

use crate::defuse::defuse_formula;
use crate::email;
use crate::sanitize::{
    EMAIL_MAX_CHARS, MESSAGE_MAX_CHARS, NAME_MAX_CHARS, clean_line, clean_multiline, flatten_lines,
};

/// Raw form fields as posted by the landing page. Absent fields are `None`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactForm {
    #[serde(default)]
    pub csrf: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ContactForm {
    /// Set a field by its form name. Unknown names are ignored.
    ///
    /// Used when decoding multipart bodies field by field. A repeated field
    /// keeps the last value.
    pub fn set(&mut self, name: &str, value: String) {
        let slot = match name {
            "csrf" => &mut self.csrf,
            "firstName" => &mut self.first_name,
            "lastName" => &mut self.last_name,
            "email" => &mut self.email,
            "message" => &mut self.message,
            _ => return,
        };
        *slot = Some(value);
    }
}

/// A sanitized submission, ready to be stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub first_name: String,
    pub last_name: String,
    /// Empty when the posted address was not well-formed.
    pub email: String,
    /// May contain `\n`, never three in a row.
    pub message: String,
}

impl Submission {
    /// Sanitize every field of `form`. Never fails: bad input shrinks to
    /// empty strings instead.
    #[must_use]
    pub fn from_form(form: &ContactForm) -> Self {
        let field = |value: &Option<String>| value.as_deref().unwrap_or_default().to_owned();

        Self {
            first_name: clean_line(&field(&form.first_name), NAME_MAX_CHARS),
            last_name: clean_line(&field(&form.last_name), NAME_MAX_CHARS),
            email: email::accept_or_blank(clean_line(&field(&form.email), EMAIL_MAX_CHARS)),
            message: clean_multiline(&field(&form.message), MESSAGE_MAX_CHARS),
        }
    }

    /// Whether the posted email survived validation.
    #[must_use]
    pub fn has_email(&self) -> bool {
        !self.email.is_empty()
    }

    /// Build the stored row: `timestamp`, then each field defused, with the
    /// message flattened to one line first.
    #[must_use]
    pub fn into_row(self, timestamp: String) -> ContactRow {
        ContactRow::new([
            timestamp,
            defuse_formula(self.first_name),
            defuse_formula(self.last_name),
            defuse_formula(self.email),
            defuse_formula(flatten_lines(&self.message)),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(first: &str, last: &str, email: &str, message: &str) -> ContactForm {
        ContactForm {
            csrf: Some("t".to_owned()),
            first_name: Some(first.to_owned()),
            last_name: Some(last.to_owned()),
            email: Some(email.to_owned()),
            message: Some(message.to_owned()),
        }
    }

    #[test]
    fn deserializes_camel_case_names() {
        let form: ContactForm = serde_json::from_value(serde_json::json!({
            "csrf": "abc",
            "firstName": "Ana",
            "lastName": "López",
            "email": "ana@example.com",
            "message": "hola"
        }))
        .unwrap();

        assert_eq!(form.csrf.as_deref(), Some("abc"));
        assert_eq!(form.first_name.as_deref(), Some("Ana"));
        assert_eq!(form.last_name.as_deref(), Some("López"));
    }

    #[test]
    fn missing_fields_deserialize_as_none() {
        let form: ContactForm = serde_json::from_value(serde_json::json!({})).unwrap();
        assert!(form.csrf.is_none());
        assert!(form.message.is_none());
    }

    #[test]
    fn set_maps_form_names() {
        let mut form = ContactForm::default();
        form.set("firstName", "Ana".to_owned());
        form.set("message", "hola".to_owned());
        form.set("unexpected", "ignored".to_owned());

        assert_eq!(form.first_name.as_deref(), Some("Ana"));
        assert_eq!(form.message.as_deref(), Some("hola"));
        assert!(form.email.is_none());
    }

    #[test]
    fn missing_fields_become_empty() {
        let submission = Submission::from_form(&ContactForm::default());
        assert_eq!(submission.first_name, "");
        assert_eq!(submission.email, "");
        assert_eq!(submission.message, "");
    }

    #[test]
    fn invalid_email_is_blanked() {
        let submission = Submission::from_form(&form("Ana", "", "not-an-email", "hi"));
        assert_eq!(submission.email, "");
        assert!(!submission.has_email());
        assert_eq!(submission.first_name, "Ana");
    }

    #[test]
    fn email_is_cleaned_before_validation() {
        let submission = Submission::from_form(&form("", "", "  ana@example.com\x00 ", ""));
        assert_eq!(submission.email, "ana@example.com");
    }

    #[test]
    fn row_has_five_fields_in_order() {
        let row = Submission::from_form(&form("Ana", "López", "ana@example.com", "hola"))
            .into_row("2025-01-01 00:00:00".to_owned());

        assert_eq!(
            row.fields(),
            &[
                "2025-01-01 00:00:00".to_owned(),
                "Ana".to_owned(),
                "López".to_owned(),
                "ana@example.com".to_owned(),
                "hola".to_owned(),
            ]
        );
    }

    #[test]
    fn row_defuses_formula_fields() {
        let row = Submission::from_form(&form("=SUM(A1)", "+1", "ana@example.com", "@cmd"))
            .into_row(String::new());

        assert_eq!(row.fields()[1], "'=SUM(A1)");
        assert_eq!(row.fields()[2], "'+1");
        assert_eq!(row.fields()[3], "ana@example.com");
        assert_eq!(row.fields()[4], "'@cmd");
    }

    #[test]
    fn row_flattens_message() {
        let row = Submission::from_form(&form("", "", "", "line1\nline2\n\n\n\nline3"))
            .into_row(String::new());

        assert_eq!(row.fields()[4], "line1 | line2 |  | line3");
        assert!(!row.fields().iter().any(|f| f.contains('\n')));
    }

    #[test]
    fn flattened_message_starting_with_dash_is_defused() {
        let row = Submission::from_form(&form("", "", "", "-first\nsecond")).into_row(String::new());
        assert_eq!(row.fields()[4], "'-first | second");
    }
}
