//! Variants - named build options of a recipe.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The value of a variant, either a toggle or one of a set of choices.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VariantValue {
    Bool(bool),
    Str(String),
}

impl VariantValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            VariantValue::Bool(b) => Some(*b),
            VariantValue::Str(_) => None,
        }
    }

    /// The value rendered as text, as it is stored in a spec.
    pub fn as_text(&self) -> String {
        match self {
            VariantValue::Bool(b) => b.to_string(),
            VariantValue::Str(s) => s.clone(),
        }
    }
}

impl From<bool> for VariantValue {
    fn from(value: bool) -> Self {
        VariantValue::Bool(value)
    }
}

impl From<&str> for VariantValue {
    fn from(value: &str) -> Self {
        VariantValue::Str(value.to_string())
    }
}

impl fmt::Display for VariantValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_text())
    }
}

/// A declared variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variant {
    pub name: String,
    pub default: VariantValue,
    pub description: String,
    /// Allowed values for a multi-valued variant. `None` for toggles.
    pub values: Option<Vec<String>>,
}

impl Variant {
    /// Declare a boolean variant.
    pub fn toggle(name: impl Into<String>, default: bool, description: impl Into<String>) -> Self {
        Variant {
            name: name.into(),
            default: VariantValue::Bool(default),
            description: description.into(),
            values: None,
        }
    }

    /// Declare a variant that takes one of `values`.
    pub fn choice(
        name: impl Into<String>,
        default: &str,
        values: &[&str],
        description: impl Into<String>,
    ) -> Self {
        Variant {
            name: name.into(),
            default: VariantValue::Str(default.to_string()),
            description: description.into(),
            values: Some(values.iter().map(|v| v.to_string()).collect()),
        }
    }

    /// Check whether `value` is acceptable for this variant.
    pub fn accepts(&self, value: &VariantValue) -> bool {
        match (&self.values, value) {
            (None, VariantValue::Bool(_)) => true,
            (None, VariantValue::Str(_)) => false,
            (Some(values), VariantValue::Str(s)) => values.iter().any(|v| v == s),
            (Some(_), VariantValue::Bool(_)) => false,
        }
    }

    /// Spec-style rendering of the default (`~geant4`, `+foo`, `cxxstd=17`).
    pub fn default_spec(&self) -> String {
        match &self.default {
            VariantValue::Bool(true) => format!("+{}", self.name),
            VariantValue::Bool(false) => format!("~{}", self.name),
            VariantValue::Str(s) => format!("{}={}", self.name, s),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_accepts_only_bools() {
        let v = Variant::toggle("geant4", false, "Enable simulation");
        assert!(v.accepts(&VariantValue::Bool(true)));
        assert!(!v.accepts(&VariantValue::from("yes")));
        assert_eq!(v.default_spec(), "~geant4");
    }

    #[test]
    fn test_choice_accepts_listed_values() {
        let v = Variant::choice("cxxstd", "17", &["11", "14", "17"], "C++ standard");
        assert!(v.accepts(&VariantValue::from("14")));
        assert!(!v.accepts(&VariantValue::from("20")));
        assert!(!v.accepts(&VariantValue::Bool(true)));
        assert_eq!(v.default_spec(), "cxxstd=17");
    }

    #[test]
    fn test_untagged_deserialize() {
        let b: VariantValue = serde_json::from_str("true").unwrap();
        assert_eq!(b, VariantValue::Bool(true));

        let s: VariantValue = serde_json::from_str("\"11\"").unwrap();
        assert_eq!(s, VariantValue::from("11"));
    }
}
