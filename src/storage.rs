use crate::model::MarkedDates;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde_json::{Map, Value};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

pub const MARKED_DATES_KEY: &str = "markedDates";
const PROJECT_DIR: &str = ".markcal";
const STORE_FILE: &str = "store.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreScope {
    Explicit,
    Project,
    Global,
}

impl StoreScope {
    pub fn label(&self) -> &'static str {
        match self {
            StoreScope::Explicit => "explicit",
            StoreScope::Project => "project",
            StoreScope::Global => "global",
        }
    }
}

#[derive(Debug, Clone)]
pub struct StoreLocation {
    pub path: PathBuf,
    pub scope: StoreScope,
}

/// Where marked dates are read from at startup and written to on save.
pub trait MarkStore {
    /// Missing or unreadable state yields an empty set.
    fn load_marked(&self) -> MarkedDates;
    fn save_marked(&mut self, marked: &MarkedDates) -> Result<()>;
}

/// A JSON document of string keys, used as a small durable key-value store.
#[derive(Debug, Clone)]
pub struct JsonStore {
    location: StoreLocation,
}

impl JsonStore {
    pub fn new(location: StoreLocation) -> Self {
        JsonStore { location }
    }

    pub fn location(&self) -> &StoreLocation {
        &self.location
    }

    pub fn get(&self, key: &str) -> Result<Option<Value>> {
        let mut document = self.read_document()?;
        Ok(document.remove(key))
    }

    /// Replaces the value under `key`, keeping every other key in the file.
    pub fn set(&self, key: &str, value: Value) -> Result<()> {
        let mut document = match self.read_document() {
            Ok(doc) => doc,
            Err(err) => {
                log::warn!("overwriting unreadable store: {:#}", err);
                Map::new()
            }
        };
        document.insert(key.to_string(), value);
        self.write_document(&document)
    }

    fn read_document(&self) -> Result<Map<String, Value>> {
        let path = &self.location.path;
        if !path.exists() {
            return Ok(Map::new());
        }
        let data = fs::read_to_string(path).with_context(|| format!("reading {:?}", path))?;
        if data.trim().is_empty() {
            return Ok(Map::new());
        }
        let document: Map<String, Value> =
            serde_json::from_str(&data).with_context(|| format!("parsing {:?}", path))?;
        Ok(document)
    }

    fn write_document(&self, document: &Map<String, Value>) -> Result<()> {
        let path = &self.location.path;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).with_context(|| format!("creating {:?}", parent))?;
            }
        }
        let serialized = serde_json::to_string_pretty(document).context("serializing store")?;
        fs::write(path, serialized).with_context(|| format!("writing {:?}", path))?;
        Ok(())
    }
}

impl MarkStore for JsonStore {
    fn load_marked(&self) -> MarkedDates {
        match self.get(MARKED_DATES_KEY) {
            Ok(Some(value)) => MarkedDates::from_json(&value),
            Ok(None) => MarkedDates::new(),
            Err(err) => {
                log::warn!("ignoring stored marks: {:#}", err);
                MarkedDates::new()
            }
        }
    }

    fn save_marked(&mut self, marked: &MarkedDates) -> Result<()> {
        self.set(MARKED_DATES_KEY, marked.to_json())
    }
}

pub fn init_project_store() -> Result<StoreLocation> {
    let cwd = env::current_dir()?;
    let dir = cwd.join(PROJECT_DIR);
    fs::create_dir_all(&dir).context("failed to create .markcal directory")?;
    let location = StoreLocation {
        path: dir.join(STORE_FILE),
        scope: StoreScope::Project,
    };
    if !location.path.exists() {
        JsonStore::new(location.clone()).save_marked(&MarkedDates::new())?;
    }
    Ok(location)
}

/// Resolves the store file: an explicit path wins, then the nearest
/// `.markcal/store.json` above `start`, then the per-user data directory.
pub fn locate_store(start: &Path, explicit: Option<&Path>) -> Result<StoreLocation> {
    if let Some(path) = explicit {
        return Ok(StoreLocation {
            path: path.to_path_buf(),
            scope: StoreScope::Explicit,
        });
    }
    if let Some(project_path) = find_project_store(start) {
        return Ok(StoreLocation {
            path: project_path,
            scope: StoreScope::Project,
        });
    }
    Ok(StoreLocation {
        path: global_store_path()?,
        scope: StoreScope::Global,
    })
}

fn find_project_store(start: &Path) -> Option<PathBuf> {
    let mut dir = Some(start);
    while let Some(current) = dir {
        let candidate = current.join(PROJECT_DIR).join(STORE_FILE);
        if candidate.exists() {
            return Some(candidate);
        }
        dir = current.parent();
    }
    None
}

fn global_store_path() -> Result<PathBuf> {
    let dirs = ProjectDirs::from("", "", "markcal").context("locating data directory")?;
    Ok(dirs.data_dir().join(STORE_FILE))
}

/// In-memory store for controller tests.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct MemoryStore {
    pub saved: Option<MarkedDates>,
    pub saves: usize,
    pub fail: bool,
}

#[cfg(test)]
impl MarkStore for MemoryStore {
    fn load_marked(&self) -> MarkedDates {
        self.saved.clone().unwrap_or_default()
    }

    fn save_marked(&mut self, marked: &MarkedDates) -> Result<()> {
        if self.fail {
            anyhow::bail!("disk full");
        }
        self.saved = Some(marked.clone());
        self.saves += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DateKey;
    use serde_json::json;

    fn store_in(dir: &Path) -> JsonStore {
        JsonStore::new(StoreLocation {
            path: dir.join("nested").join(STORE_FILE),
            scope: StoreScope::Explicit,
        })
    }

    #[test]
    fn missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());
        assert!(store.load_marked().is_empty());
        assert!(!store.location().path.exists());
    }

    #[test]
    fn unparseable_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());
        fs::create_dir_all(store.location().path.parent().unwrap()).unwrap();
        fs::write(&store.location().path, "{not json").unwrap();
        assert!(store.load_marked().is_empty());
    }

    #[test]
    fn save_then_load_returns_same_set() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = store_in(dir.path());
        let marked = ["2025-03-15", "2025-12-25"]
            .iter()
            .map(|s| s.parse::<DateKey>().unwrap())
            .collect::<MarkedDates>();
        store.save_marked(&marked).unwrap();

        let raw: Value =
            serde_json::from_str(&fs::read_to_string(&store.location().path).unwrap()).unwrap();
        assert_eq!(
            raw,
            json!({"markedDates": {"2025-03-15": true, "2025-12-25": true}})
        );
        assert_eq!(store.load_marked(), marked);
    }

    #[test]
    fn save_overwrites_marks_and_keeps_other_keys() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = store_in(dir.path());
        store.set("theme", json!("dark")).unwrap();
        store
            .set(MARKED_DATES_KEY, json!({"2024-01-01": true}))
            .unwrap();

        store.save_marked(&MarkedDates::new()).unwrap();

        assert_eq!(store.get("theme").unwrap(), Some(json!("dark")));
        assert_eq!(store.get(MARKED_DATES_KEY).unwrap(), Some(json!({})));
        assert!(store.load_marked().is_empty());
    }

    #[test]
    fn locate_prefers_explicit_then_nearest_project() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        let project_store = root.join(PROJECT_DIR).join(STORE_FILE);
        fs::create_dir_all(project_store.parent().unwrap()).unwrap();
        fs::write(&project_store, "{}").unwrap();
        let nested = root.join("a").join("b");
        fs::create_dir_all(&nested).unwrap();

        let found = locate_store(&nested, None).unwrap();
        assert_eq!(found.scope, StoreScope::Project);
        assert_eq!(found.path, project_store);

        let explicit = root.join("elsewhere.json");
        let found = locate_store(&nested, Some(&explicit)).unwrap();
        assert_eq!(found.scope, StoreScope::Explicit);
        assert_eq!(found.path, explicit);
    }
}
