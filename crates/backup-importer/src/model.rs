//! Model bindings and the mass-assignment guard.
//!
//! The guard is a per-call option, not global state: every persist call
//! says explicitly whether guarded columns are dropped or written through.

use serde::{Deserialize, Serialize};

use crate::core::value::Record;

/// Guard mode applied to a single persist call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GuardMode {
    /// Drop guarded columns before persisting.
    #[default]
    Enforce,

    /// Persist the record as-is.
    Bypass,
}

/// Binding of an importer to its target model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelBinding {
    /// Full model path, e.g. `app::models::Customer`.
    pub entity: String,

    /// Columns dropped from records persisted under [`GuardMode::Enforce`].
    pub guarded: Vec<String>,
}

impl ModelBinding {
    /// Bind to a model path with the default guarded set (`id`).
    pub fn new(entity: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            guarded: vec!["id".to_string()],
        }
    }

    /// Replace the guarded column set.
    #[must_use]
    pub fn with_guarded(mut self, guarded: Vec<String>) -> Self {
        self.guarded = guarded;
        self
    }

    /// Apply the guard to a record about to be persisted.
    #[must_use]
    pub fn fill(&self, record: Record, guard: GuardMode) -> Record {
        match guard {
            GuardMode::Bypass => record,
            GuardMode::Enforce => record.without_columns(&self.guarded),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::value::Value;

    fn customer_record() -> Record {
        Record::new()
            .with("id", 7i64)
            .with("name", "Ada")
            .with("email", "ada@example.com")
    }

    #[test]
    fn test_enforce_drops_guarded_columns() {
        let binding = ModelBinding::new("app::models::Customer");
        let filled = binding.fill(customer_record(), GuardMode::Enforce);

        assert_eq!(filled.get("id"), None);
        assert_eq!(filled.get("name"), Some(&Value::Text("Ada".to_string())));
        assert_eq!(filled.len(), 2);
    }

    #[test]
    fn test_bypass_keeps_everything() {
        let binding = ModelBinding::new("app::models::Customer");
        let filled = binding.fill(customer_record(), GuardMode::Bypass);

        assert_eq!(filled.get("id"), Some(&Value::I64(7)));
        assert_eq!(filled.len(), 3);
    }

    #[test]
    fn test_custom_guarded_set() {
        let binding = ModelBinding::new("app::models::Customer")
            .with_guarded(vec!["email".to_string(), "id".to_string()]);
        let filled = binding.fill(customer_record(), GuardMode::Enforce);

        assert_eq!(filled.len(), 1);
        assert_eq!(filled.columns(), &["name".to_string()]);
    }

    #[test]
    fn test_empty_guarded_set_enforce_is_noop() {
        let binding = ModelBinding::new("app::models::Customer").with_guarded(Vec::new());
        let filled = binding.fill(customer_record(), GuardMode::Enforce);
        assert_eq!(filled.len(), 3);
    }
}
