//! Field validation for content records.
//!
//! Rules collect every failure per field so a single 422 response can list
//! them all. Merging helpers implement the partial-update semantics shared by
//! every resource: absent fields keep the stored value, an empty string clears
//! an optional text field.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer};

use crate::error::{Error, FieldErrors, Result};

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email pattern is valid")
});

/// Maximum length of short text fields (titles, names, subjects).
pub const SHORT_TEXT: usize = 255;

/// Maximum length of URL and path fields.
pub const URL_TEXT: usize = 2048;

/// Collects validation failures keyed by field.
#[derive(Debug, Default)]
pub struct Validator {
    errors: FieldErrors,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: &str, message: impl Into<String>) -> &mut Self {
        self.errors
            .entry(field.to_string())
            .or_default()
            .push(message.into());
        self
    }

    pub fn required(&mut self, field: &str, value: &str) -> &mut Self {
        if value.trim().is_empty() {
            self.push(field, format!("The {} field is required.", label(field)));
        }
        self
    }

    pub fn max_chars(&mut self, field: &str, value: Option<&str>, max: usize) -> &mut Self {
        if let Some(value) = value {
            if value.chars().count() > max {
                self.push(
                    field,
                    format!(
                        "The {} may not be greater than {} characters.",
                        label(field),
                        max
                    ),
                );
            }
        }
        self
    }

    pub fn email(&mut self, field: &str, value: Option<&str>) -> &mut Self {
        if let Some(value) = value.filter(|v| !v.is_empty()) {
            if !EMAIL_RE.is_match(value) {
                self.push(
                    field,
                    format!("The {} must be a valid email address.", label(field)),
                );
            }
        }
        self
    }

    /// Absolute http(s) URL.
    pub fn url(&mut self, field: &str, value: Option<&str>) -> &mut Self {
        if let Some(value) = value.filter(|v| !v.is_empty()) {
            let valid = url::Url::parse(value)
                .map(|u| matches!(u.scheme(), "http" | "https") && u.host().is_some())
                .unwrap_or(false);
            if !valid {
                self.push(field, format!("The {} format is invalid.", label(field)));
            }
        }
        self
    }

    /// Calendar date in `YYYY-MM-DD` form.
    pub fn date(&mut self, field: &str, value: Option<&str>) -> &mut Self {
        if let Some(value) = value {
            if parse_date(value).is_none() {
                self.push(field, format!("The {} is not a valid date.", label(field)));
            }
        }
        self
    }

    /// Both dates valid and `end` not before `start`. Invalid dates are
    /// reported by [`Validator::date`], not here.
    pub fn date_order(
        &mut self,
        start_field: &str,
        start: Option<&str>,
        end_field: &str,
        end: Option<&str>,
    ) -> &mut Self {
        if let (Some(start), Some(end)) = (start.and_then(parse_date), end.and_then(parse_date)) {
            if end < start {
                self.push(
                    end_field,
                    format!(
                        "The {} must be a date after or equal to {}.",
                        label(end_field),
                        label(start_field)
                    ),
                );
            }
        }
        self
    }

    pub fn min_f64(&mut self, field: &str, value: Option<f64>, min: f64) -> &mut Self {
        if let Some(value) = value {
            if !value.is_finite() || value < min {
                self.push(field, format!("The {} must be at least {}.", label(field), min));
            }
        }
        self
    }

    pub fn min_i64(&mut self, field: &str, value: Option<i64>, min: i64) -> &mut Self {
        if let Some(value) = value {
            if value < min {
                self.push(field, format!("The {} must be at least {}.", label(field), min));
            }
        }
        self
    }

    pub fn one_of(&mut self, field: &str, value: &str, allowed: &[&str]) -> &mut Self {
        if !allowed.contains(&value) {
            self.push(
                field,
                format!(
                    "The selected {} is invalid. Allowed: {}.",
                    label(field),
                    allowed.join(", ")
                ),
            );
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// `Err(Error::Validation)` when any rule failed.
    pub fn finish(self) -> Result<()> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(Error::Validation(self.errors))
        }
    }
}

fn label(field: &str) -> String {
    field.replace('_', " ")
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}

/// Replace a required text field when a value was sent.
pub fn patch_text(target: &mut String, incoming: Option<String>) {
    if let Some(value) = incoming {
        *target = value.trim().to_string();
    }
}

/// Replace an optional text field; an empty string clears it.
pub fn patch_opt_text(target: &mut Option<String>, incoming: Option<String>) {
    if let Some(value) = incoming {
        let value = value.trim();
        *target = if value.is_empty() {
            None
        } else {
            Some(value.to_string())
        };
    }
}

/// Replace a plain value when one was sent.
pub fn patch<T>(target: &mut T, incoming: Option<T>) {
    if let Some(value) = incoming {
        *target = value;
    }
}

/// Replace an optional value when one was sent.
pub fn patch_opt<T>(target: &mut Option<T>, incoming: Option<T>) {
    if incoming.is_some() {
        *target = incoming;
    }
}

/// Query-string boolean: `true/false`, `1/0`, `yes/no`, `on/off`.
/// A blank value means no filter.
pub fn query_flag<'de, D>(deserializer: D) -> std::result::Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw.as_deref().map(|v| v.trim().to_ascii_lowercase()).as_deref() {
        None | Some("") => Ok(None),
        Some("true" | "1" | "yes" | "on") => Ok(Some(true)),
        Some("false" | "0" | "no" | "off") => Ok(Some(false)),
        Some(other) => Err(serde::de::Error::custom(format!(
            "invalid boolean value: {}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn fields(result: Result<()>) -> FieldErrors {
        match result {
            Err(Error::Validation(fields)) => fields,
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_required_rejects_blank() {
        let mut v = Validator::new();
        v.required("title", "   ").required("description", "ok");
        let errors = fields(v.finish());
        assert_eq!(errors["title"], vec!["The title field is required."]);
        assert!(!errors.contains_key("description"));
    }

    #[rstest]
    #[case("someone@example.org", true)]
    #[case("first.last+tag@charity.co.uk", true)]
    #[case("no-at-sign.org", false)]
    #[case("two@@signs.org", false)]
    #[case("spaces in@example.org", false)]
    fn test_email_rule(#[case] email: &str, #[case] valid: bool) {
        let mut v = Validator::new();
        v.email("email", Some(email));
        assert_eq!(v.is_empty(), valid, "{}", email);
    }

    #[rstest]
    #[case("https://example.org", true)]
    #[case("http://sponsor.example.com/about", true)]
    #[case("ftp://example.org", false)]
    #[case("example.org", false)]
    #[case("/storage/logo.png", false)]
    fn test_url_rule(#[case] url: &str, #[case] valid: bool) {
        let mut v = Validator::new();
        v.url("website_url", Some(url));
        assert_eq!(v.is_empty(), valid, "{}", url);
    }

    #[test]
    fn test_date_rules() {
        let mut v = Validator::new();
        v.date("start_date", Some("2024-02-30"));
        let errors = fields(v.finish());
        assert_eq!(errors["start_date"], vec!["The start date is not a valid date."]);

        let mut v = Validator::new();
        v.date_order("start_date", Some("2024-05-01"), "end_date", Some("2024-04-30"));
        let errors = fields(v.finish());
        assert!(errors["end_date"][0].contains("after or equal to start date"));

        let mut v = Validator::new();
        v.date_order("start_date", Some("2024-05-01"), "end_date", Some("2024-05-01"));
        assert!(v.is_empty());
    }

    #[test]
    fn test_max_chars_counts_characters() {
        let mut v = Validator::new();
        v.max_chars("title", Some(&"é".repeat(255)), SHORT_TEXT);
        assert!(v.is_empty());
        v.max_chars("title", Some(&"a".repeat(256)), SHORT_TEXT);
        assert!(!v.is_empty());
    }

    #[test]
    fn test_one_of_and_minimums() {
        let mut v = Validator::new();
        v.one_of("status", "archived", &["draft", "active"])
            .min_f64("goal_amount", Some(-1.0), 0.0)
            .min_i64("beneficiaries", Some(0), 0);
        let errors = fields(v.finish());
        assert_eq!(errors.len(), 2);
        assert!(errors["status"][0].starts_with("The selected status is invalid."));
    }

    #[test]
    fn test_patch_helpers() {
        let mut title = "Old".to_string();
        patch_text(&mut title, None);
        assert_eq!(title, "Old");
        patch_text(&mut title, Some("  New  ".into()));
        assert_eq!(title, "New");

        let mut image = Some("/storage/a.png".to_string());
        patch_opt_text(&mut image, None);
        assert_eq!(image.as_deref(), Some("/storage/a.png"));
        patch_opt_text(&mut image, Some(String::new()));
        assert_eq!(image, None);

        let mut budget = Some(10.0);
        patch_opt(&mut budget, None);
        assert_eq!(budget, Some(10.0));
    }

    #[derive(Debug, serde::Deserialize)]
    struct Flags {
        #[serde(default, deserialize_with = "query_flag")]
        active: Option<bool>,
    }

    #[rstest]
    #[case("active=1", Some(true))]
    #[case("active=TRUE", Some(true))]
    #[case("active=0", Some(false))]
    #[case("active=", None)]
    #[case("", None)]
    fn test_query_flag(#[case] query: &str, #[case] expected: Option<bool>) {
        let flags: Flags = serde_json::from_value(query_to_json(query)).unwrap();
        assert_eq!(flags.active, expected);
    }

    fn query_to_json(query: &str) -> serde_json::Value {
        let map: serde_json::Map<String, serde_json::Value> = query
            .split('&')
            .filter_map(|pair| pair.split_once('='))
            .map(|(k, v)| (k.to_string(), serde_json::Value::String(v.to_string())))
            .collect();
        serde_json::Value::Object(map)
    }
}
