//! Writing the registry into a package manifest.
//!
//! Only the scripts table is touched: the document is read whole, the table
//! at the requested dotted path is replaced by the registry contents, and
//! the document is written back with every other key intact.

use crate::entrypoint::Registry;
use anyhow::{bail, Context, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use toml::{Table, Value};
use tracing::info;

/// Where entry points are recorded unless told otherwise
pub const DEFAULT_TABLE: &str = "package.metadata.entrypoints";

/// A TOML manifest loaded for editing
#[derive(Debug, Clone)]
pub struct ManifestDocument {
    path: PathBuf,
    document: Table,
}

impl ManifestDocument {
    /// Read and parse the manifest at `path`
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read manifest {}", path.display()))?;
        let document = content
            .parse::<Table>()
            .with_context(|| format!("Failed to parse manifest {}", path.display()))?;
        Ok(Self {
            path: path.to_path_buf(),
            document,
        })
    }

    /// Path the document was loaded from and will be saved to
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The whole document
    pub fn document(&self) -> &Table {
        &self.document
    }

    /// Current scripts at `table_path`; empty if the table does not exist
    pub fn scripts(&self, table_path: &str) -> Result<BTreeMap<String, String>> {
        let mut current = &self.document;
        for segment in segments(table_path)? {
            match current.get(segment) {
                None => return Ok(BTreeMap::new()),
                Some(Value::Table(table)) => current = table,
                Some(_) => bail!("`{}` in `{}` is not a table", segment, table_path),
            }
        }

        current
            .iter()
            .map(|(name, value)| match value {
                Value::String(reference) => Ok((name.clone(), reference.clone())),
                other => bail!(
                    "script `{}` in `{}` is not a string: {}",
                    name,
                    table_path,
                    other
                ),
            })
            .collect()
    }

    /// Replace the table at `table_path` with the registry contents,
    /// creating intermediate tables as needed
    pub fn replace_scripts(&mut self, table_path: &str, registry: &Registry) -> Result<()> {
        let segments = segments(table_path)?;
        let (last, parents) = segments
            .split_last()
            .context("table path has no segments")?;

        let mut current = &mut self.document;
        for segment in parents {
            let entry = current
                .entry(segment.to_string())
                .or_insert_with(|| Value::Table(Table::new()));
            current = match entry {
                Value::Table(table) => table,
                _ => bail!("`{}` in `{}` is not a table", segment, table_path),
            };
        }
        if let Some(existing) = current.get(*last) {
            if !existing.is_table() {
                bail!("`{}` in `{}` is not a table", last, table_path);
            }
        }

        let scripts: Table = registry
            .iter()
            .map(|(name, reference)| (name.to_string(), Value::String(reference.to_string())))
            .collect();
        current.insert(last.to_string(), Value::Table(scripts));
        Ok(())
    }

    /// Write the document back to where it was loaded from
    pub fn save(&self) -> Result<()> {
        let content = toml::to_string(&self.document).context("Failed to serialize manifest")?;
        std::fs::write(&self.path, content)
            .with_context(|| format!("Failed to write manifest {}", self.path.display()))?;
        info!(path = %self.path.display(), "manifest updated");
        Ok(())
    }
}

fn segments(table_path: &str) -> Result<Vec<&str>> {
    let segments: Vec<&str> = table_path.split('.').collect();
    if segments.iter().any(|s| s.is_empty()) {
        bail!("invalid table path `{}`", table_path);
    }
    Ok(segments)
}

/// Load `path`, replace the scripts table with `registry` and save
pub fn update_manifest(path: impl AsRef<Path>, table_path: &str, registry: &Registry) -> Result<()> {
    let mut manifest = ManifestDocument::load(path)?;
    manifest.replace_scripts(table_path, registry)?;
    manifest.save()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    const MANIFEST: &str = r#"[package]
name = "demo"
version = "0.1.0"

[package.metadata.entrypoints]
stale = "old:gone.invoke"

[dependencies]
serde = "1.0"
"#;

    fn manifest_file(content: &str) -> NamedTempFile {
        let file = NamedTempFile::new().unwrap();
        std::fs::write(file.path(), content).unwrap();
        file
    }

    #[test]
    fn test_replace_only_scripts_table() {
        let file = manifest_file(MANIFEST);
        let mut manifest = ManifestDocument::load(file.path()).unwrap();
        assert_eq!(manifest.scripts(DEFAULT_TABLE).unwrap().len(), 1);

        let registry: Registry = [("example", "demos:example.invoke")].into_iter().collect();
        manifest.replace_scripts(DEFAULT_TABLE, &registry).unwrap();
        manifest.save().unwrap();

        let reloaded = ManifestDocument::load(file.path()).unwrap();
        let scripts = reloaded.scripts(DEFAULT_TABLE).unwrap();
        assert_eq!(scripts.len(), 1);
        assert_eq!(scripts["example"], "demos:example.invoke");
        assert_eq!(reloaded.document()["package"]["name"].as_str(), Some("demo"));
        assert_eq!(reloaded.document()["dependencies"]["serde"].as_str(), Some("1.0"));
    }

    #[test]
    fn test_intermediate_tables_created() {
        let file = manifest_file("[package]\nname = \"demo\"\n");
        let mut manifest = ManifestDocument::load(file.path()).unwrap();
        assert!(manifest.scripts("tool.entrypoints.scripts").unwrap().is_empty());

        let registry: Registry = [("a", "m:a.invoke")].into_iter().collect();
        manifest
            .replace_scripts("tool.entrypoints.scripts", &registry)
            .unwrap();
        assert_eq!(
            manifest.scripts("tool.entrypoints.scripts").unwrap()["a"],
            "m:a.invoke"
        );
    }

    #[test]
    fn test_non_table_in_the_way() {
        let file = manifest_file("[package]\nname = \"demo\"\nmetadata = 3\n");
        let mut manifest = ManifestDocument::load(file.path()).unwrap();
        assert!(manifest
            .replace_scripts(DEFAULT_TABLE, &Registry::new())
            .is_err());
        assert!(manifest.scripts(DEFAULT_TABLE).is_err());
        assert!(manifest.replace_scripts("package..x", &Registry::new()).is_err());
    }

    #[test]
    fn test_load_errors_carry_path() {
        let err = ManifestDocument::load("/nonexistent/Cargo.toml").unwrap_err();
        assert!(format!("{:#}", err).contains("/nonexistent/Cargo.toml"));
    }
}
