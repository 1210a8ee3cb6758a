//! Profile persistence interface and an in-memory catalog.

use std::collections::BTreeMap;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use stance_core::{Profile, Result};

/// Keyed storage for named profiles
pub trait ProfileStore: Send + Sync {
    /// Names of every stored profile, sorted
    fn list(&self) -> Result<Vec<String>>;

    /// Load a profile; `Ok(None)` when no profile has that name
    fn load(&self, name: &str) -> Result<Option<Profile>>;

    /// Insert or overwrite a profile
    fn save(&self, name: &str, profile: &Profile) -> Result<()>;
}

/// Serialized form of a whole catalog
#[derive(Debug, Default, Serialize, Deserialize)]
struct CatalogDocument {
    #[serde(default)]
    profiles: BTreeMap<String, Profile>,
}

/// Thread-safe in-memory profile catalog.
///
/// Never touches the filesystem; hosts persist the document returned by
/// [`InMemoryProfileStore::to_json`] however they see fit.
#[derive(Default)]
pub struct InMemoryProfileStore {
    profiles: RwLock<BTreeMap<String, Profile>>,
}

impl InMemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restore a catalog from `{"profiles": {name: Profile}}`
    pub fn from_json(json: &str) -> Result<Self> {
        let document: CatalogDocument = serde_json::from_str(json)?;
        Ok(Self {
            profiles: RwLock::new(document.profiles),
        })
    }

    pub fn to_json(&self) -> Result<String> {
        let document = CatalogDocument {
            profiles: self.profiles.read().clone(),
        };
        Ok(serde_json::to_string_pretty(&document)?)
    }

    pub fn len(&self) -> usize {
        self.profiles.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.read().is_empty()
    }
}

impl ProfileStore for InMemoryProfileStore {
    fn list(&self) -> Result<Vec<String>> {
        Ok(self.profiles.read().keys().cloned().collect())
    }

    fn load(&self, name: &str) -> Result<Option<Profile>> {
        Ok(self.profiles.read().get(name).cloned())
    }

    fn save(&self, name: &str, profile: &Profile) -> Result<()> {
        self.profiles.write().insert(name.to_string(), profile.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stance_core::{AngleName, AngleStats, Orientation, Pattern};

    fn calibrated_profile() -> Profile {
        let mut pattern = Pattern::empty();
        pattern.calibrated = true;
        pattern.sample_count = 120;
        pattern.set_stats(AngleName::Arm, Some(AngleStats::new(42, 2.5)));
        pattern.set_stats(AngleName::Knee, Some(AngleStats::new(160, 1.1)));

        let mut profile = Profile::new();
        profile.set_pattern(Orientation::LeftProfile, pattern);
        profile
    }

    #[test]
    fn test_save_load_list() {
        let store = InMemoryProfileStore::new();
        assert!(store.is_empty());
        assert_eq!(store.load("rapier").unwrap(), None);

        store.save("sabre", &Profile::new()).unwrap();
        store.save("epee", &calibrated_profile()).unwrap();

        assert_eq!(store.list().unwrap(), vec!["epee".to_string(), "sabre".to_string()]);
        let loaded = store.load("epee").unwrap().unwrap();
        assert!(loaded.is_calibrated(Orientation::LeftProfile));
    }

    #[test]
    fn test_save_overwrites() {
        let store = InMemoryProfileStore::new();
        store.save("epee", &calibrated_profile()).unwrap();
        store.save("epee", &Profile::new()).unwrap();

        assert_eq!(store.len(), 1);
        assert!(!store.load("epee").unwrap().unwrap().is_calibrated(Orientation::LeftProfile));
    }

    #[test]
    fn test_catalog_document() {
        let store = InMemoryProfileStore::new();
        store.save("epee", &calibrated_profile()).unwrap();

        let json = store.to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["profiles"]["epee"]["LEFT_PROFILE"]["arm"], 42);
        assert!(value["profiles"]["epee"]["LEFT_PROFILE"]["head"].is_null());

        let restored = InMemoryProfileStore::from_json(&json).unwrap();
        assert_eq!(restored.load("epee").unwrap(), Some(calibrated_profile()));
    }

    #[test]
    fn test_empty_and_invalid_documents() {
        let store = InMemoryProfileStore::from_json("{}").unwrap();
        assert!(store.is_empty());

        assert!(matches!(
            InMemoryProfileStore::from_json("{\"profiles\": 3}"),
            Err(stance_core::Error::Serialization(_))
        ));
    }
}
