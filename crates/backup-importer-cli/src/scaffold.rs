//! Importer source file scaffolding for the `new` command.
//!
//! The registration namespace decides where the file lands: the leading
//! `app` segment stands for the crate root, so `app::backup::importers`
//! maps to `src/backup/importers/`.

use std::fs;
use std::path::{Path, PathBuf};

use backup_importer::naming;
use backup_importer::{ImportError, Result};

const TEMPLATE: &str = r#"use async_trait::async_trait;
use backup_importer::{Importer, ImporterContext, Result};

pub struct {{name}} {
    ctx: ImporterContext,
}

impl {{name}} {
    pub fn new(ctx: ImporterContext) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl Importer for {{name}} {
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
"#;

/// Write a new importer skeleton under `root`.
///
/// The `Importer` suffix is appended when missing. Refuses to overwrite
/// an existing file.
pub fn write(root: &Path, namespace: &str, name: &str) -> Result<PathBuf> {
    let name = normalize_name(name)?;
    let dir = root.join(namespace_dir(namespace));
    let path = dir.join(format!("{}.rs", naming::snake_case(&name)));

    if path.exists() {
        return Err(ImportError::Config(format!(
            "importer file already exists: {}",
            path.display()
        )));
    }

    fs::create_dir_all(&dir)?;
    fs::write(&path, render(&name))?;
    Ok(path)
}

fn render(name: &str) -> String {
    TEMPLATE.replace("{{name}}", name)
}

fn namespace_dir(namespace: &str) -> PathBuf {
    let mut segments = namespace.split("::").filter(|s| !s.is_empty()).peekable();
    if segments.peek() == Some(&"app") {
        segments.next();
    }
    let mut dir = PathBuf::from("src");
    for segment in segments {
        dir.push(segment);
    }
    dir
}

fn normalize_name(name: &str) -> Result<String> {
    let mut chars = name.chars();
    let valid = matches!(chars.next(), Some(c) if c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
    if !valid {
        return Err(ImportError::Config(format!(
            "'{}' is not a valid importer name; use an identifier like CustomerImporter",
            name
        )));
    }
    // A bare suffix names no entity, so nothing could ever resolve for it.
    if name == "Importer" {
        return Err(ImportError::Config(
            "'Importer' alone names no entity; pick a name like CustomerImporter".to_string(),
        ));
    }

    if name.ends_with("Importer") {
        Ok(name.to_string())
    } else {
        Ok(format!("{}Importer", name))
    }
}
