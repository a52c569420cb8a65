pub mod content;
pub mod query;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

// --- Types ---

/// One of the five Well-Architected assessment categories.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PillarRecord {
    pub id: String,
    pub name: String,
    /// URL-safe route identifier. Dashboard tiles link through this, so
    /// fallback slugs must match the route slugs exactly.
    pub slug: String,
    pub description: String,
    /// Symbolic icon name; rendering is a frontend concern.
    pub icon: String,
    /// Symbolic color name; rendering is a frontend concern.
    pub color: String,
    /// Display rank. Not guaranteed unique.
    pub order: u32,
    /// Compliance percentage 0-100, absent until an assessment has run.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<u8>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, schemars::JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum ControlStatus {
    Compliant,
    Partial,
    ActionRequired,
}

/// A named best-practice check within a pillar. Checklists are
/// compile-time content per pillar, not store-backed, and are never
/// reconciled with `PillarRecord`.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ControlItem {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub status: ControlStatus,
    pub icon: &'static str,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, schemars::JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, schemars::JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationStatus {
    Pending,
    InProgress,
    Completed,
    Dismissed,
}

/// A prioritized improvement suggestion tied to a pillar control.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub id: String,
    pub pillar_id: String,
    pub control_id: String,
    pub title: String,
    pub description: String,
    pub priority: Level,
    pub effort: Level,
    pub impact: Level,
    pub status: RecommendationStatus,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, schemars::JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum AssessmentStatus {
    InProgress,
    Completed,
}

/// A user-owned questionnaire run against one pillar.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Assessment {
    pub id: String,
    pub pillar_id: String,
    pub user_id: String,
    #[serde(default)]
    pub responses: Vec<Value>,
    pub status: AssessmentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<u8>,
    pub created_at: String,
    pub updated_at: String,
}

// --- Storage ---

/// Resolve the default data directory (~/.waflens/).
pub fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".waflens")
}

/// File-backed document store: one directory per collection, one JSON file
/// per document. Opened once at startup and shared by reference; there is
/// no global handle.
#[derive(Debug, Clone)]
pub struct Store {
    root: PathBuf,
}

impl Store {
    pub fn open(root: impl Into<PathBuf>) -> Store {
        Store { root: root.into() }
    }

    pub fn open_default() -> Store {
        Store::open(default_data_dir())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn collection_dir(&self, collection: &str) -> PathBuf {
        self.root.join(collection)
    }

    fn doc_path(&self, collection: &str, id: &str) -> PathBuf {
        self.collection_dir(collection).join(format!("{}.json", id))
    }

    /// List every document in a collection, sorted by id, with the
    /// store-assigned id (the file stem) merged into the fields. A missing
    /// collection directory reads as empty, not as an error.
    pub fn list(&self, collection: &str) -> Result<Vec<Value>, String> {
        let dir = self.collection_dir(collection);
        if !dir.exists() {
            return Ok(vec![]);
        }
        let mut ids: Vec<String> = fs::read_dir(&dir)
            .map_err(|e| e.to_string())?
            .filter_map(|entry| {
                let entry = entry.ok()?;
                let name = entry.file_name().to_string_lossy().to_string();
                if name.starts_with('.') {
                    return None;
                }
                name.strip_suffix(".json").map(|n| n.to_string())
            })
            .collect();
        ids.sort();

        let mut docs = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(doc) = self.read(collection, &id)? {
                docs.push(doc);
            }
        }
        Ok(docs)
    }

    /// Read one document, id merged into the fields. None when absent.
    pub fn read(&self, collection: &str, id: &str) -> Result<Option<Value>, String> {
        let path = self.doc_path(collection, id);
        if !path.exists() {
            return Ok(None);
        }
        let raw = fs::read_to_string(&path).map_err(|e| e.to_string())?;
        let mut doc: Value = serde_json::from_str(&raw).map_err(|e| e.to_string())?;
        if let Some(obj) = doc.as_object_mut() {
            obj.insert("id".to_string(), Value::String(id.to_string()));
        }
        Ok(Some(doc))
    }

    /// Write a document. Atomic (temp file + rename) so a directory watcher
    /// sees a single rename event instead of truncate + write. The "id"
    /// field is the file stem and is stripped from the persisted body.
    pub fn write(&self, collection: &str, id: &str, fields: &Value) -> Result<(), String> {
        let dir = self.collection_dir(collection);
        fs::create_dir_all(&dir).map_err(|e| e.to_string())?;
        let mut body = fields.clone();
        if let Some(obj) = body.as_object_mut() {
            obj.remove("id");
        }
        let json = serde_json::to_string_pretty(&body).map_err(|e| e.to_string())?;
        let tmp = dir.join(format!(".{}.json.tmp", id));
        let path = self.doc_path(collection, id);
        fs::write(&tmp, json).map_err(|e| e.to_string())?;
        fs::rename(&tmp, &path).map_err(|e| e.to_string())
    }

    /// Insert a document under a generated id and return it.
    pub fn insert(&self, collection: &str, fields: &Value) -> Result<String, String> {
        let id = self.next_doc_id(collection)?;
        self.write(collection, &id, fields)?;
        Ok(id)
    }

    pub fn delete(&self, collection: &str, id: &str) -> Result<(), String> {
        let path = self.doc_path(collection, id);
        if path.exists() {
            fs::remove_file(&path).map_err(|e| e.to_string())
        } else {
            Ok(())
        }
    }

    /// Generate the next document id by scanning existing ids.
    /// "doc-{N}" with N incrementing; explicitly-named documents (seeded
    /// pillars) don't participate.
    fn next_doc_id(&self, collection: &str) -> Result<String, String> {
        let max = self
            .list(collection)?
            .iter()
            .filter_map(|d| d.get("id").and_then(|v| v.as_str()))
            .filter_map(|id| id.strip_prefix("doc-").and_then(|n| n.parse::<u64>().ok()))
            .max()
            .unwrap_or(0);
        Ok(format!("doc-{}", max + 1))
    }

    // --- AI Settings ---

    fn settings_path(&self) -> PathBuf {
        self.root.join("settings.json")
    }

    pub fn read_settings(&self) -> AiSettings {
        let path = self.settings_path();
        if !path.exists() {
            return AiSettings::default();
        }
        fs::read_to_string(&path)
            .ok()
            .and_then(|s| serde_json::from_str(&s).ok())
            .unwrap_or_default()
    }

    pub fn write_settings(&self, settings: &AiSettings) -> Result<(), String> {
        fs::create_dir_all(&self.root).map_err(|e| e.to_string())?;
        let json = serde_json::to_string_pretty(settings).map_err(|e| e.to_string())?;
        fs::write(self.settings_path(), json).map_err(|e| e.to_string())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct AiSettings {
    pub provider: String,
    pub api_key: String,
    pub model: String,
}

pub fn ai_configured(settings: &AiSettings) -> bool {
    !settings.provider.is_empty()
        && !settings.model.is_empty()
        && (settings.provider == "ollama" || !settings.api_key.is_empty())
}

/// Seed the pillars collection with the built-in five-pillar set. Runs once
/// against an empty collection and is a no-op otherwise, so the client-side
/// fallback only ever covers a store that was never bootstrapped.
/// Returns whether anything was written.
pub fn seed_pillars(store: &Store) -> Result<bool, String> {
    if !store.list(content::PILLARS_COLLECTION)?.is_empty() {
        return Ok(false);
    }
    for pillar in content::default_pillars() {
        let fields = serde_json::to_value(&pillar).map_err(|e| e.to_string())?;
        store.write(content::PILLARS_COLLECTION, &pillar.id, &fields)?;
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn temp_store() -> (tempfile::TempDir, Store) {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::open(dir.path());
        (dir, store)
    }

    #[test]
    fn missing_collection_reads_empty() {
        let (_dir, store) = temp_store();
        assert_eq!(store.list("pillars").unwrap(), Vec::<Value>::new());
    }

    #[test]
    fn list_attaches_store_ids() {
        let (_dir, store) = temp_store();
        store
            .write("pillars", "security", &json!({"name": "Security"}))
            .unwrap();
        store
            .write("pillars", "cost", &json!({"name": "Cost Optimization"}))
            .unwrap();

        let docs = store.list("pillars").unwrap();
        assert_eq!(docs.len(), 2);
        // sorted by id
        assert_eq!(docs[0]["id"], "cost");
        assert_eq!(docs[0]["name"], "Cost Optimization");
        assert_eq!(docs[1]["id"], "security");
    }

    #[test]
    fn write_strips_id_from_persisted_body() {
        let (_dir, store) = temp_store();
        store
            .write("pillars", "security", &json!({"id": "bogus", "name": "Security"}))
            .unwrap();
        let raw = std::fs::read_to_string(store.collection_dir("pillars").join("security.json"))
            .unwrap();
        assert!(!raw.contains("bogus"));
        let doc = store.read("pillars", "security").unwrap().unwrap();
        assert_eq!(doc["id"], "security");
    }

    #[test]
    fn insert_generates_monotonic_ids() {
        let (_dir, store) = temp_store();
        let a = store.insert("assessments", &json!({"pillarId": "security"})).unwrap();
        let b = store.insert("assessments", &json!({"pillarId": "cost"})).unwrap();
        assert_eq!(a, "doc-1");
        assert_eq!(b, "doc-2");
    }

    #[test]
    fn delete_is_idempotent() {
        let (_dir, store) = temp_store();
        store.write("pillars", "security", &json!({})).unwrap();
        store.delete("pillars", "security").unwrap();
        store.delete("pillars", "security").unwrap();
        assert!(store.read("pillars", "security").unwrap().is_none());
    }

    #[test]
    fn seed_fills_empty_store_once() {
        let (_dir, store) = temp_store();
        assert!(seed_pillars(&store).unwrap());
        let docs = store.list(content::PILLARS_COLLECTION).unwrap();
        assert_eq!(docs.len(), 5);
        // second run is a no-op
        assert!(!seed_pillars(&store).unwrap());
        assert_eq!(store.list(content::PILLARS_COLLECTION).unwrap().len(), 5);
    }

    #[test]
    fn settings_roundtrip_and_configured() {
        let (_dir, store) = temp_store();
        assert!(!ai_configured(&store.read_settings()));

        let settings = AiSettings {
            provider: "google".to_string(),
            api_key: "k".to_string(),
            model: "gemini-2.0-flash".to_string(),
        };
        store.write_settings(&settings).unwrap();
        let read = store.read_settings();
        assert_eq!(read.provider, "google");
        assert!(ai_configured(&read));

        // ollama is the only provider usable without a key
        let ollama = AiSettings {
            provider: "ollama".to_string(),
            api_key: String::new(),
            model: "llama3".to_string(),
        };
        assert!(ai_configured(&ollama));
    }

    #[test]
    fn pillar_record_serializes_camel_case() {
        let pillar = &content::default_pillars()[0];
        let value = serde_json::to_value(pillar).unwrap();
        assert!(value.get("slug").is_some());
        assert!(value.get("icon").is_some());
        // score is absent, not null
        assert!(value.get("score").is_none());
    }
}
