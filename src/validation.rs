//! Field validation for command payloads.
//!
//! A [`Validator`] is a list of `(field, rule)` pairs. Validation is pure
//! and never stops at the first failure: every rule is evaluated and every
//! failure is collected, so callers see the full problem list at once.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;

use crate::record::{FieldValue, Fields};

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$")
            .unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
    })
}

fn is_blank(value: &FieldValue) -> bool {
    value.as_text().is_some_and(|s| s.trim().is_empty())
}

/// A single validation rule applied to one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rule {
    /// Field must be present and, for text, non-empty after trimming
    Required,
    /// Text must not contain control characters
    Printable,
    /// Trimmed text must have at least this many characters
    MinLength(usize),
    /// Trimmed text must have at most this many characters
    MaxLength(usize),
    /// Integer must lie in the inclusive range
    Range {
        /// Lowest accepted value
        min: i64,
        /// Highest accepted value
        max: i64,
    },
    /// Text must look like an email address
    Email,
    /// File name must end in one of these extensions (case-insensitive, without dot)
    Extension(Vec<String>),
}

impl Rule {
    /// Builds an [`Extension`](Rule::Extension) rule from a list of extensions.
    ///
    /// Leading dots are stripped and entries are lowercased.
    pub fn extensions<I, S>(allowed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Rule::Extension(
            allowed
                .into_iter()
                .map(|e| e.as_ref().trim_start_matches('.').to_ascii_lowercase())
                .collect(),
        )
    }

    /// Checks a present value, returning the failure message (without field name).
    fn check(&self, value: &FieldValue) -> Option<String> {
        match self {
            // Absent and blank values never reach here.
            Rule::Required => None,
            Rule::Printable => value
                .as_text()
                .filter(|s| s.chars().any(|c| c.is_control()))
                .map(|_| "contains control characters".to_string()),
            Rule::MinLength(min) => value
                .as_text()
                .filter(|s| s.trim().chars().count() < *min)
                .map(|_| format!("must be at least {} characters", min)),
            Rule::MaxLength(max) => value
                .as_text()
                .filter(|s| s.trim().chars().count() > *max)
                .map(|_| format!("must be at most {} characters", max)),
            Rule::Range { min, max } => match value.as_integer() {
                Some(n) if n < *min || n > *max => {
                    Some(format!("must be between {} and {}", min, max))
                }
                Some(_) => None,
                None => Some("must be a number".to_string()),
            },
            Rule::Email => value
                .as_text()
                .filter(|s| !email_regex().is_match(s.trim()))
                .map(|_| "is not a valid email address".to_string()),
            Rule::Extension(allowed) => value.as_text().and_then(|s| {
                let name = s.trim().to_ascii_lowercase();
                let accepted = name
                    .rsplit_once('.')
                    .is_some_and(|(stem, ext)| !stem.is_empty() && allowed.iter().any(|a| a == ext));
                (!accepted).then(|| format!("must have one of the extensions: {}", allowed.join(", ")))
            }),
        }
    }
}

/// Result of one validation pass.
///
/// Immutable once built; `errors` keeps the order in which rules were declared.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationResult {
    errors: Vec<String>,
}

impl ValidationResult {
    /// Returns `true` if no rule failed.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Returns the failure messages in evaluation order.
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// Returns `true` if some error message starts with `field`.
    pub fn mentions(&self, field: &str) -> bool {
        self.errors.iter().any(|e| e.starts_with(field))
    }

    /// Joins all messages with `"; "`.
    pub fn joined(&self) -> String {
        self.errors.join("; ")
    }
}

impl fmt::Display for ValidationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            write!(f, "valid")
        } else {
            write!(f, "{}", self.joined())
        }
    }
}

/// Declarative set of field rules.
///
/// # Examples
///
/// ```
/// use usecase_core::{Fields, FieldValue, Rule, Validator};
///
/// let validator = Validator::new()
///     .rule("vote", Rule::Required)
///     .rule("vote", Rule::Range { min: 1, max: 5 })
///     .rule("comment", Rule::Required);
///
/// let mut input = Fields::new();
/// input.insert("vote".into(), FieldValue::Integer(9));
///
/// let result = validator.validate(&input);
/// assert!(!result.is_valid());
/// assert_eq!(result.errors().len(), 2);
/// assert!(result.mentions("vote"));
/// assert!(result.mentions("comment"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Validator {
    rules: Vec<(String, Rule)>,
}

impl Validator {
    /// Creates a validator without rules.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a rule for `field`, ignoring an identical pair already present.
    pub fn rule(mut self, field: impl Into<String>, rule: Rule) -> Self {
        let field = field.into();
        if !self.rules.iter().any(|(f, r)| *f == field && *r == rule) {
            self.rules.push((field, rule));
        }
        self
    }

    /// Returns the number of declared rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns `true` if no rule is declared.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Evaluates every rule against `input`.
    ///
    /// An absent or blank field fails only its `Required` rule; the
    /// remaining rules apply to present values.
    pub fn validate(&self, input: &Fields) -> ValidationResult {
        let errors = self
            .rules
            .iter()
            .filter_map(|(field, rule)| {
                let value = input.get(field).filter(|v| !is_blank(v));
                let failure = match value {
                    Some(value) => rule.check(value),
                    None if *rule == Rule::Required => Some("is required".to_string()),
                    None => None,
                };
                failure.map(|msg| format!("{} {}", field, msg))
            })
            .collect();
        ValidationResult { errors }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn fields(pairs: &[(&str, FieldValue)]) -> Fields {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    fn text(s: &str) -> FieldValue {
        FieldValue::from(s)
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[case("\t\n")]
    fn required_rejects_blank_text(#[case] input: &str) {
        let result = Validator::new()
            .rule("name", Rule::Required)
            .validate(&fields(&[("name", text(input))]));

        assert!(!result.is_valid());
        assert_eq!(result.errors(), ["name is required"]);
    }

    #[test]
    fn required_rejects_missing_field() {
        let result = Validator::new()
            .rule("name", Rule::Required)
            .validate(&Fields::new());

        assert!(result.mentions("name"));
    }

    #[rstest]
    #[case(0, false)]
    #[case(1, true)]
    #[case(3, true)]
    #[case(5, true)]
    #[case(6, false)]
    #[case(-4, false)]
    fn range_is_inclusive(#[case] vote: i64, #[case] valid: bool) {
        let result = Validator::new()
            .rule("vote", Rule::Range { min: 1, max: 5 })
            .validate(&fields(&[("vote", FieldValue::Integer(vote))]));

        assert_eq!(result.is_valid(), valid);
    }

    #[test]
    fn range_rejects_non_numbers() {
        let result = Validator::new()
            .rule("vote", Rule::Range { min: 1, max: 5 })
            .validate(&fields(&[("vote", text("five"))]));

        assert_eq!(result.errors(), ["vote must be a number"]);
    }

    #[rstest]
    #[case("photo.jpg", true)]
    #[case("PHOTO.JPEG", true)]
    #[case("banner.Png", true)]
    #[case("anim.gif", true)]
    #[case("photo.txt", false)]
    #[case("jpg", false)]
    #[case(".png", false)]
    #[case("archive.png.zip", false)]
    fn extension_whitelist_is_case_insensitive(#[case] name: &str, #[case] valid: bool) {
        let result = Validator::new()
            .rule("image", Rule::extensions([".jpg", "jpeg", "PNG", "gif"]))
            .validate(&fields(&[("image", text(name))]));

        assert_eq!(result.is_valid(), valid, "{name}");
    }

    #[rstest]
    #[case("ada@example.com", true)]
    #[case("  ada.l+tag@mail.example.org ", true)]
    #[case("ada@example", false)]
    #[case("ada.example.com", false)]
    #[case("@example.com", false)]
    fn email_format(#[case] email: &str, #[case] valid: bool) {
        let result = Validator::new()
            .rule("email", Rule::Email)
            .validate(&fields(&[("email", text(email))]));

        assert_eq!(result.is_valid(), valid, "{email}");
    }

    #[test]
    fn lengths_count_trimmed_characters() {
        let validator = Validator::new()
            .rule("password", Rule::MinLength(8))
            .rule("title", Rule::MaxLength(3));

        let result = validator.validate(&fields(&[
            ("password", text("  short  ")),
            ("title", text(" àbc ")),
        ]));

        assert_eq!(result.errors(), ["password must be at least 8 characters"]);
    }

    #[test]
    fn blank_field_reports_only_required() {
        let result = Validator::new()
            .rule("password", Rule::Required)
            .rule("password", Rule::MinLength(8))
            .validate(&fields(&[("password", text("   "))]));

        assert_eq!(result.errors(), ["password is required"]);
    }

    #[test]
    fn printable_rejects_control_characters() {
        let result = Validator::new()
            .rule("comment", Rule::Printable)
            .validate(&fields(&[("comment", text("nice\u{0007}place"))]));

        assert!(result.mentions("comment"));
    }

    #[test]
    fn all_failures_are_accumulated_in_declaration_order() {
        let validator = Validator::new()
            .rule("email", Rule::Required)
            .rule("email", Rule::Email)
            .rule("password", Rule::Required)
            .rule("password", Rule::MinLength(8))
            .rule("vote", Rule::Range { min: 1, max: 5 });

        let result = validator.validate(&fields(&[
            ("email", text("nope")),
            ("password", text("abc")),
            ("vote", FieldValue::Integer(0)),
        ]));

        assert_eq!(
            result.errors(),
            [
                "email is not a valid email address",
                "password must be at least 8 characters",
                "vote must be between 1 and 5",
            ]
        );
        assert_eq!(
            result.joined(),
            "email is not a valid email address; password must be at least 8 characters; vote must be between 1 and 5"
        );
    }

    #[test]
    fn missing_optional_field_is_not_checked() {
        let result = Validator::new()
            .rule("comment", Rule::MaxLength(10))
            .validate(&Fields::new());

        assert!(result.is_valid());
        assert_eq!(result.to_string(), "valid");
    }

    #[test]
    fn identical_rules_are_deduplicated() {
        let validator = Validator::new()
            .rule("name", Rule::Required)
            .rule("name", Rule::Required)
            .rule("surname", Rule::Required);

        assert_eq!(validator.len(), 2);
    }
}
