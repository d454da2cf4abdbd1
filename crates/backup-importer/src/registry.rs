//! Startup-time importer registry and discovery.
//!
//! Applications register every importer once at startup; the configured
//! `import.importers` list is then resolved against the registry before a
//! run starts. No filesystem scanning, no name-to-type guessing at run
//! time.

use tracing::debug;

use crate::config::DEFAULT_MODEL_NAMESPACE;
use crate::core::naming;
use crate::error::{ImportError, Result};
use crate::importer::{Importer, ImporterContext};
use crate::model::ModelBinding;

/// Factory producing a boxed importer from its run context.
pub type ImporterFactory = Box<dyn Fn(ImporterContext) -> Box<dyn Importer> + Send + Sync>;

/// Hook mapping an entity stem to a model path, consulted first during
/// resolution. Returning `None` falls through to the configured namespace.
pub type ModelHook = Box<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Registration of one importer.
pub struct ImporterSpec {
    name: String,
    factory: ImporterFactory,
    model: Option<String>,
    source_table: Option<String>,
    ignore_model: bool,
}

impl ImporterSpec {
    /// Register `factory` under `name`.
    ///
    /// The name is the importer's identifier everywhere: config lists,
    /// progress messages, and error attribution.
    pub fn new<F>(name: impl Into<String>, factory: F) -> Self
    where
        F: Fn(ImporterContext) -> Box<dyn Importer> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            factory: Box::new(factory),
            model: None,
            source_table: None,
            ignore_model: false,
        }
    }

    /// Bind to an explicit model path instead of deriving one.
    #[must_use]
    pub fn with_model(mut self, path: impl Into<String>) -> Self {
        self.model = Some(path.into());
        self
    }

    /// Read from an explicit source table instead of deriving one.
    #[must_use]
    pub fn with_source_table(mut self, table: impl Into<String>) -> Self {
        self.source_table = Some(table.into());
        self
    }

    /// Opt out of guard toggling in the default `init`/`cleanup`.
    #[must_use]
    pub fn with_ignore_model(mut self) -> Self {
        self.ignore_model = true;
        self
    }

    /// Registered identifier.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Explicit model path, if registered with one.
    pub fn explicit_model(&self) -> Option<&str> {
        self.model.as_deref()
    }

    /// Explicit source table, if registered with one.
    pub fn explicit_source_table(&self) -> Option<&str> {
        self.source_table.as_deref()
    }

    /// Whether this importer opted out of guard toggling.
    pub fn ignores_model(&self) -> bool {
        self.ignore_model
    }

    /// Build the importer for one run.
    pub fn instantiate(&self, ctx: ImporterContext) -> Box<dyn Importer> {
        (self.factory)(ctx)
    }
}

impl std::fmt::Debug for ImporterSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImporterSpec")
            .field("name", &self.name)
            .field("model", &self.model)
            .field("source_table", &self.source_table)
            .field("ignore_model", &self.ignore_model)
            .finish_non_exhaustive()
    }
}

/// Registry of every importer the application ships.
#[derive(Default)]
pub struct ImporterRegistry {
    specs: Vec<ImporterSpec>,
    model_hook: Option<ModelHook>,
}

impl ImporterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an importer. Identifiers must be unique.
    pub fn register(&mut self, spec: ImporterSpec) -> Result<()> {
        if self.specs.iter().any(|s| s.name == spec.name) {
            return Err(ImportError::Config(format!(
                "importer '{}' is already registered",
                spec.name
            )));
        }
        debug!("Registered importer {}", spec.name);
        self.specs.push(spec);
        Ok(())
    }

    /// Install the model resolution hook.
    pub fn set_model_hook<F>(&mut self, hook: F)
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        self.model_hook = Some(Box::new(hook));
    }

    /// Registered identifiers, in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.specs.iter().map(|s| s.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// Look up a registration by identifier.
    pub fn get(&self, name: &str) -> Option<&ImporterSpec> {
        self.specs.iter().find(|s| s.name == name)
    }

    /// Resolve the configured selection into registrations to run.
    ///
    /// The single-element list `["*"]` selects every registered importer in
    /// registration order. Any other list is taken verbatim: order
    /// preserved, duplicates kept, and an unknown identifier fails the
    /// whole selection before anything runs.
    pub fn discover(&self, selection: &[String]) -> Result<Vec<&ImporterSpec>> {
        if selection.len() == 1 && selection[0] == "*" {
            return Ok(self.specs.iter().collect());
        }

        let mut found = Vec::with_capacity(selection.len());
        for name in selection {
            let spec = self.get(name).ok_or_else(|| {
                ImportError::Discovery(format!(
                    "importer '{}' is not registered (registered: {})",
                    name,
                    self.names().join(", ")
                ))
            })?;
            found.push(spec);
        }
        Ok(found)
    }

    /// Resolve the model binding for a registration.
    ///
    /// Priority: explicit model on the registration, then the model hook,
    /// then `model_namespace` from config, then the default application
    /// namespace. The stem is the identifier minus one `Importer` suffix;
    /// an empty stem cannot be resolved.
    pub fn resolve_binding(
        &self,
        spec: &ImporterSpec,
        model_namespace: Option<&str>,
    ) -> Result<ModelBinding> {
        if let Some(explicit) = &spec.model {
            return Ok(ModelBinding::new(explicit.clone()));
        }

        let stem = naming::entity_stem(&spec.name);
        if stem.is_empty() {
            return Err(ImportError::Resolution(format!(
                "could not determine model for importer '{}'; register it with an explicit model to fix",
                spec.name
            )));
        }

        if let Some(hook) = &self.model_hook {
            if let Some(path) = hook(stem) {
                return Ok(ModelBinding::new(path));
            }
        }

        let namespace = model_namespace.unwrap_or(DEFAULT_MODEL_NAMESPACE);
        Ok(ModelBinding::new(format!("{}::{}", namespace, stem)))
    }

    /// Resolve the source table for a registration: explicit table if
    /// given, else the pluralized snake_case stem.
    pub fn resolve_source_table(&self, spec: &ImporterSpec) -> String {
        match &spec.source_table {
            Some(table) => table.clone(),
            None => naming::source_table_for(&spec.name),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::traits::{BackupSource, TargetWriter};
    use crate::drivers::MemoryDatabase;
    use std::sync::Arc;

    struct NullImporter {
        ctx: ImporterContext,
    }

    #[async_trait::async_trait]
    impl Importer for NullImporter {
        fn context(&self) -> &ImporterContext {
            &self.ctx
        }

        fn context_mut(&mut self) -> &mut ImporterContext {
            &mut self.ctx
        }

        async fn import(&mut self) -> Result<u64> {
            Ok(0)
        }
    }

    fn null_spec(name: &str) -> ImporterSpec {
        ImporterSpec::new(name, |ctx| Box::new(NullImporter { ctx }))
    }

    fn registry_with(names: &[&str]) -> ImporterRegistry {
        let mut registry = ImporterRegistry::new();
        for name in names {
            registry.register(null_spec(name)).unwrap();
        }
        registry
    }

    fn selection(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_duplicate_registration_is_rejected() {
        let mut registry = registry_with(&["UserImporter"]);
        let err = registry.register(null_spec("UserImporter")).unwrap_err();
        assert!(err.to_string().contains("already registered"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_wildcard_discovers_all_in_registration_order() {
        let registry = registry_with(&["UserImporter", "CustomerImporter", "OrderImporter"]);
        let specs = registry.discover(&selection(&["*"])).unwrap();
        let names: Vec<_> = specs.iter().map(|s| s.name()).collect();
        assert_eq!(
            names,
            vec!["UserImporter", "CustomerImporter", "OrderImporter"]
        );
    }

    #[test]
    fn test_explicit_selection_is_verbatim_with_duplicates() {
        let registry = registry_with(&["UserImporter", "CustomerImporter"]);
        let specs = registry
            .discover(&selection(&[
                "CustomerImporter",
                "UserImporter",
                "CustomerImporter",
            ]))
            .unwrap();
        let names: Vec<_> = specs.iter().map(|s| s.name()).collect();
        assert_eq!(
            names,
            vec!["CustomerImporter", "UserImporter", "CustomerImporter"]
        );
    }

    #[test]
    fn test_unknown_importer_fails_discovery() {
        let registry = registry_with(&["UserImporter"]);
        let err = registry
            .discover(&selection(&["UserImporter", "GhostImporter"]))
            .unwrap_err();
        assert!(matches!(err, ImportError::Discovery(_)));
        assert!(err.to_string().contains("GhostImporter"));
    }

    #[test]
    fn test_wildcard_among_names_is_a_literal() {
        // "*" is only a sentinel as the whole selection.
        let registry = registry_with(&["UserImporter"]);
        let err = registry
            .discover(&selection(&["UserImporter", "*"]))
            .unwrap_err();
        assert!(matches!(err, ImportError::Discovery(_)));
    }

    #[test]
    fn test_empty_selection_discovers_nothing() {
        let registry = registry_with(&["UserImporter"]);
        let specs = registry.discover(&[]).unwrap();
        assert!(specs.is_empty());
    }

    #[test]
    fn test_binding_uses_configured_namespace() {
        let registry = registry_with(&["CustomerImporter"]);
        let spec = registry.get("CustomerImporter").unwrap();
        let binding = registry.resolve_binding(spec, Some("app::models")).unwrap();
        assert_eq!(binding.entity, "app::models::Customer");
    }

    #[test]
    fn test_binding_falls_back_to_default_namespace() {
        let registry = registry_with(&["CustomerImporter"]);
        let spec = registry.get("CustomerImporter").unwrap();
        let binding = registry.resolve_binding(spec, None).unwrap();
        assert_eq!(binding.entity, "app::models::Customer");
    }

    #[test]
    fn test_explicit_model_wins_over_everything() {
        let mut registry = ImporterRegistry::new();
        registry
            .register(null_spec("CustomerImporter").with_model("crm::Customer"))
            .unwrap();
        registry.set_model_hook(|stem| Some(format!("hooked::{}", stem)));

        let spec = registry.get("CustomerImporter").unwrap();
        let binding = registry.resolve_binding(spec, Some("app::models")).unwrap();
        assert_eq!(binding.entity, "crm::Customer");
    }

    #[test]
    fn test_model_hook_wins_over_namespace() {
        let mut registry = registry_with(&["CustomerImporter"]);
        registry.set_model_hook(|stem| Some(format!("legacy::{}", stem)));

        let spec = registry.get("CustomerImporter").unwrap();
        let binding = registry.resolve_binding(spec, Some("app::models")).unwrap();
        assert_eq!(binding.entity, "legacy::Customer");
    }

    #[test]
    fn test_hook_returning_none_falls_through() {
        let mut registry = registry_with(&["CustomerImporter"]);
        registry.set_model_hook(|_| None);

        let spec = registry.get("CustomerImporter").unwrap();
        let binding = registry.resolve_binding(spec, Some("app::models")).unwrap();
        assert_eq!(binding.entity, "app::models::Customer");
    }

    #[test]
    fn test_empty_stem_is_a_resolution_error() {
        let registry = registry_with(&["Importer"]);
        let spec = registry.get("Importer").unwrap();
        let err = registry.resolve_binding(spec, None).unwrap_err();
        assert!(matches!(err, ImportError::Resolution(_)));
        assert!(err.to_string().contains("'Importer'"));
    }

    #[test]
    fn test_source_table_derivation_and_override() {
        let mut registry = registry_with(&["CustomerImporter", "CategoryImporter"]);
        registry
            .register(null_spec("LegacyImporter").with_source_table("old_stuff"))
            .unwrap();

        let customer = registry.get("CustomerImporter").unwrap();
        assert_eq!(registry.resolve_source_table(customer), "customers");

        let category = registry.get("CategoryImporter").unwrap();
        assert_eq!(registry.resolve_source_table(category), "categories");

        let legacy = registry.get("LegacyImporter").unwrap();
        assert_eq!(registry.resolve_source_table(legacy), "old_stuff");
    }

    #[test]
    fn test_instantiate_builds_an_importer() {
        let registry = registry_with(&["UserImporter"]);
        let spec = registry.get("UserImporter").unwrap();

        let db = MemoryDatabase::new();
        let source: Arc<dyn BackupSource> = Arc::new(db.clone());
        let target: Arc<dyn TargetWriter> = Arc::new(db);
        let ctx = ImporterContext::new("UserImporter", source, target, None, "users", false);

        let importer = spec.instantiate(ctx);
        assert_eq!(importer.context().name(), "UserImporter");
    }
}
