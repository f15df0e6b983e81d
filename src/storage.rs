use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// String key/value store persisted as one JSON object on disk.
///
/// Mirrors the browser's local storage: values are opaque strings and the
/// whole map is rewritten on every `set`.
#[derive(Debug, Clone)]
pub struct LocalStore {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl LocalStore {
    /// Open the store at `path`. A missing file is an empty store; an
    /// unreadable one is logged and treated as empty.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let values = match load_map(&path) {
            Ok(values) => values,
            Err(e) => {
                tracing::error!("failed to read local store {}: {e:#}", path.display());
                BTreeMap::new()
            }
        };
        Self { path, values }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn set(&mut self, key: &str, value: String) -> Result<()> {
        self.values.insert(key.to_string(), value);
        self.flush()
    }

    pub fn remove(&mut self, key: &str) -> Result<()> {
        if self.values.remove(key).is_some() {
            self.flush()?;
        }
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("create store folder {}", dir.display()))?;
        }
        let json = serde_json::to_string_pretty(&self.values)?;
        std::fs::write(&self.path, json)
            .with_context(|| format!("write local store {}", self.path.display()))?;
        Ok(())
    }
}

fn load_map(path: &Path) -> Result<BTreeMap<String, String>> {
    let content = std::fs::read_to_string(path).unwrap_or_default();
    if content.trim().is_empty() {
        return Ok(BTreeMap::new());
    }
    Ok(serde_json::from_str(&content)?)
}
