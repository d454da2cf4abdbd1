//! Importer registrations for this binary.
//!
//! Every importer the `run` command can execute is registered here at
//! startup. Add one spec per importer; the spec name is the identifier
//! used in the `import.importers` config list. New skeletons come from
//! `backup-importer new <Name>`.

use async_trait::async_trait;
use backup_importer::{Importer, ImporterContext, ImporterRegistry, ImporterSpec, Result};

/// Imports `users` rows into the application's user model.
pub struct UserImporter {
    ctx: ImporterContext,
}

#[async_trait]
impl Importer for UserImporter {
    fn context(&self) -> &ImporterContext {
        &self.ctx
    }

    fn context_mut(&mut self) -> &mut ImporterContext {
        &mut self.ctx
    }

    async fn import(&mut self) -> Result<u64> {
        self.simple_import().await
    }
}

/// Register every importer this binary ships.
pub fn register_all(registry: &mut ImporterRegistry) -> Result<()> {
    registry.register(ImporterSpec::new("UserImporter", |ctx| {
        Box::new(UserImporter { ctx })
    }))?;
    Ok(())
}
