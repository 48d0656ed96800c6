use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Category label used when a contractor is created without one.
pub const DEFAULT_CATEGORY: &str = "General";

/// A business partner that scanned codes are attributed to.
///
/// Identity is the numeric `id`, assigned by the directory that owns the
/// record. Names are unique case-insensitively within one directory.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Contractor {
    pub id: i64,
    pub name: String,
    #[serde(default = "default_category")]
    pub category: String,
    pub created_at: DateTime<Utc>,
}

fn default_category() -> String {
    DEFAULT_CATEGORY.to_string()
}

impl Contractor {
    pub fn new(id: i64, name: impl Into<String>, category: Option<&str>) -> Self {
        let category = match category {
            Some(c) if !c.trim().is_empty() => c.trim().to_string(),
            _ => DEFAULT_CATEGORY.to_string(),
        };
        Self {
            id,
            name: name.into(),
            category,
            created_at: Utc::now(),
        }
    }

    /// Case-insensitive name comparison used for uniqueness checks.
    pub fn name_matches(&self, other: &str) -> bool {
        self.name.trim().to_lowercase() == other.trim().to_lowercase()
    }
}

impl fmt::Display for Contractor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} {} [{}]", self.id, self.name, self.category)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_with_category() {
        let c = Contractor::new(1, "Acme Logistics", Some("Carrier"));
        assert_eq!(c.id, 1);
        assert_eq!(c.name, "Acme Logistics");
        assert_eq!(c.category, "Carrier");
    }

    #[test]
    fn test_new_without_category_uses_fallback() {
        let c = Contractor::new(2, "Acme", None);
        assert_eq!(c.category, DEFAULT_CATEGORY);

        let blank = Contractor::new(3, "Acme", Some("   "));
        assert_eq!(blank.category, DEFAULT_CATEGORY);
    }

    #[test]
    fn test_name_matches_case_insensitive() {
        let c = Contractor::new(1, "Acme", None);
        assert!(c.name_matches("acme"));
        assert!(c.name_matches("  ACME "));
        assert!(!c.name_matches("acme2"));
    }

    #[test]
    fn test_json_field_names_are_camel_case() {
        let c = Contractor::new(7, "Acme", Some("Carrier"));
        let json = serde_json::to_string(&c).unwrap();
        assert!(json.contains("\"createdAt\""));

        let parsed: Contractor = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, c);
    }

    #[test]
    fn test_missing_category_defaults_on_deserialize() {
        let json = r#"{"id":1,"name":"Acme","createdAt":"2024-01-01T00:00:00Z"}"#;
        let parsed: Contractor = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.category, DEFAULT_CATEGORY);
    }
}
