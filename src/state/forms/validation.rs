//! Validation rule sets
//!
//! Each catalog form supplies its own rules; the core only asks for a
//! pass/fail and a message per field.

use chrono::NaiveDate;
use indexmap::IndexMap;

use super::parse_number;

/// A single check applied to the canonical text of a field.
///
/// Everything except `Required` passes on an empty value.
#[derive(Debug, Clone, PartialEq)]
pub enum Rule {
    Required,
    Numeric,
    NonNegative,
    IsoDate,
    MaxLength(usize),
    ExactLength(usize),
    OneOf(Vec<String>),
}

impl Rule {
    pub fn check(&self, value: &str) -> Result<(), String> {
        let value = value.trim();
        if value.is_empty() {
            return match self {
                Rule::Required => Err("This field is required".to_string()),
                _ => Ok(()),
            };
        }
        match self {
            Rule::Required => Ok(()),
            Rule::Numeric => parse_number(value)
                .map(|_| ())
                .ok_or_else(|| "Must be a number".to_string()),
            Rule::NonNegative => match parse_number(value) {
                Some(n) if n >= 0.0 => Ok(()),
                Some(_) => Err("Must not be negative".to_string()),
                None => Err("Must be a number".to_string()),
            },
            Rule::IsoDate => NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .map(|_| ())
                .map_err(|_| "Use the format YYYY-MM-DD".to_string()),
            Rule::MaxLength(max) => {
                if value.chars().count() <= *max {
                    Ok(())
                } else {
                    Err(format!("At most {max} characters"))
                }
            }
            Rule::ExactLength(len) => {
                if value.chars().count() == *len {
                    Ok(())
                } else {
                    Err(format!("Must be exactly {len} characters"))
                }
            }
            Rule::OneOf(options) => {
                if options.iter().any(|o| o.eq_ignore_ascii_case(value)) {
                    Ok(())
                } else {
                    Err(format!("Expected one of: {}", options.join(", ")))
                }
            }
        }
    }
}

/// Rules keyed by field name (`invoice_no`) or table column (`lines.quantity`)
#[derive(Debug, Clone, Default)]
pub struct ValidationRules {
    rules: IndexMap<String, Vec<Rule>>,
}

impl ValidationRules {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style rule registration
    pub fn rule(mut self, key: &str, rule: Rule) -> Self {
        self.rules.entry(key.to_string()).or_default().push(rule);
        self
    }

    /// First failing message for `key`, if any
    pub fn check(&self, key: &str, value: &str) -> Option<String> {
        self.rules
            .get(key)?
            .iter()
            .find_map(|rule| rule.check(value).err())
    }

    /// Whether `key` carries a `Required` rule
    pub fn is_required(&self, key: &str) -> bool {
        self.rules
            .get(key)
            .is_some_and(|rules| rules.contains(&Rule::Required))
    }
}
