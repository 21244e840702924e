//! Field Validators
//!
//! Pure checks mapping a raw field value to an ok/message result, plus
//! form-level validation that runs each field's chain in order,
//! short-circuits at the first failure per field, and annotates every
//! failing field before returning.

use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;

/// Outcome of a single check
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidationResult {
    /// Whether the value passed
    pub ok: bool,
    /// Human-readable reason when it did not
    pub message: String,
}

impl ValidationResult {
    /// A passing result
    pub fn pass() -> Self {
        Self {
            ok: true,
            message: String::new(),
        }
    }

    /// A failing result with a reason
    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            message: message.into(),
        }
    }
}

/// One validation rule applicable to a raw field value
#[derive(Clone, Debug, PartialEq)]
pub enum Check {
    /// Value must be non-blank after trimming
    Required,
    /// Value must parse as a number within the inclusive bounds;
    /// either bound is optional
    Numeric {
        /// Inclusive lower bound
        min: Option<f64>,
        /// Inclusive upper bound
        max: Option<f64>,
    },
    /// Value must parse as an ISO date (`YYYY-MM-DD`)
    Date,
    /// Value must look like an email address
    Email,
    /// Value must be at least this many characters long
    MinLength(usize),
}

impl Check {
    /// Apply this rule to a raw value
    pub fn apply(&self, value: &str) -> ValidationResult {
        match self {
            Self::Required => required(value),
            Self::Numeric { min, max } => numeric(value, *min, *max),
            Self::Date => date(value),
            Self::Email => email(value),
            Self::MinLength(len) => min_length(value, *len),
        }
    }
}

/// Non-blank after trimming.
pub fn required(value: &str) -> ValidationResult {
    if value.trim().is_empty() {
        ValidationResult::fail("Поле обязательно для заполнения")
    } else {
        ValidationResult::pass()
    }
}

/// Parses as a number and falls within the inclusive `[min, max]` range.
pub fn numeric(value: &str, min: Option<f64>, max: Option<f64>) -> ValidationResult {
    let Ok(number) = value.trim().parse::<f64>() else {
        return ValidationResult::fail("Введите число");
    };
    if !number.is_finite() {
        return ValidationResult::fail("Введите число");
    }
    if let Some(min) = min {
        if number < min {
            return ValidationResult::fail(format!("Значение не меньше {min}"));
        }
    }
    if let Some(max) = max {
        if number > max {
            return ValidationResult::fail(format!("Значение не больше {max}"));
        }
    }
    ValidationResult::pass()
}

/// Parses as an ISO date.
pub fn date(value: &str) -> ValidationResult {
    match NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d") {
        Ok(_) => ValidationResult::pass(),
        Err(_) => ValidationResult::fail("Введите дату в формате ГГГГ-ММ-ДД"),
    }
}

/// Matches the fixed email pattern.
pub fn email(value: &str) -> ValidationResult {
    static EMAIL_RE: OnceLock<Regex> = OnceLock::new();
    let re = EMAIL_RE
        .get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email pattern"));
    if re.is_match(value.trim()) {
        ValidationResult::pass()
    } else {
        ValidationResult::fail("Введите корректный email")
    }
}

/// At least `len` characters long.
pub fn min_length(value: &str, len: usize) -> ValidationResult {
    if value.chars().count() < len {
        ValidationResult::fail(format!("Минимум {len} символов"))
    } else {
        ValidationResult::pass()
    }
}

/// A failed field with its first failing message
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldError {
    /// Field identifier as passed to [`validate_form`]
    pub field: String,
    /// First failing message of the field's chain
    pub message: String,
}

/// Aggregated outcome of validating a whole form
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FormReport {
    /// Every failing field, in form order
    pub errors: Vec<FieldError>,
}

impl FormReport {
    /// True when every field passed
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    /// The message for one field, when it failed
    pub fn error_for(&self, field: &str) -> Option<&str> {
        self.errors
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }
}

/// Run each field's chain in order, short-circuiting per field at the
/// first failure; every failing field is annotated before returning.
pub fn validate_form(fields: &[(&str, &str, &[Check])]) -> FormReport {
    let mut report = FormReport::default();
    for (field, value, checks) in fields {
        for check in *checks {
            let result = check.apply(value);
            if !result.ok {
                report.errors.push(FieldError {
                    field: (*field).to_string(),
                    message: result.message,
                });
                break;
            }
        }
    }
    report
}
