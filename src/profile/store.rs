//! Profile store: base profile, CV history and the working session

use crate::error::{FastCvError, Result};
use crate::profile::storage::KeyValueStorage;
use crate::profile::types::{CVRecord, ResumeProfile, Session};
use log::{debug, info, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;

pub const PROFILE_KEY: &str = "fastcv_base_profile";
pub const HISTORY_KEY: &str = "fastcv_history";
pub const SESSION_KEY: &str = "fastcv_session";

/// Minimum Jaro-Winkler similarity for a fuzzy history match
const SEARCH_THRESHOLD: f64 = 0.75;

pub struct ProfileStore<S: KeyValueStorage> {
    storage: S,
}

impl<S: KeyValueStorage> ProfileStore<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn into_inner(self) -> S {
        self.storage
    }

    pub fn load_profile(&self) -> Result<Option<ResumeProfile>> {
        self.read_json(PROFILE_KEY)
    }

    pub fn save_profile(&mut self, profile: &ResumeProfile) -> Result<()> {
        info!("Saving base profile for {}", profile.display_name());
        self.write_json(PROFILE_KEY, profile)
    }

    pub fn clear_profile(&mut self) -> Result<()> {
        self.storage.remove(PROFILE_KEY)
    }

    /// All records, newest first
    pub fn history(&self) -> Result<Vec<CVRecord>> {
        Ok(self.read_json(HISTORY_KEY)?.unwrap_or_default())
    }

    pub fn add_record(&mut self, target_job: &str, profile: &ResumeProfile) -> Result<CVRecord> {
        let mut records = self.history_for_update()?;
        let record = CVRecord {
            id: next_record_id(&records),
            target_job: target_job.trim().to_string(),
            date: chrono::Local::now().format("%-m/%-d/%Y").to_string(),
            profile: profile.clone(),
        };
        records.insert(0, record.clone());
        self.write_json(HISTORY_KEY, &records)?;
        info!("Saved record {} for '{}'", record.id, record.target_job);
        Ok(record)
    }

    pub fn get_record(&self, id: &str) -> Result<CVRecord> {
        self.history()?
            .into_iter()
            .find(|record| record.id == id)
            .ok_or_else(|| FastCvError::RecordNotFound(id.to_string()))
    }

    /// Remove one record; returns whether it existed
    pub fn delete_record(&mut self, id: &str) -> Result<bool> {
        Ok(self.delete_records(&[id.to_string()])? == 1)
    }

    /// Bulk delete; returns how many records were removed
    pub fn delete_records(&mut self, ids: &[String]) -> Result<usize> {
        let mut records = self.history_for_update()?;
        let before = records.len();
        records.retain(|record| !ids.contains(&record.id));
        let removed = before - records.len();
        if removed > 0 {
            self.write_json(HISTORY_KEY, &records)?;
        }
        debug!("Deleted {} of {} requested records", removed, ids.len());
        Ok(removed)
    }

    pub fn clear_history(&mut self) -> Result<usize> {
        let count = self.history()?.len();
        self.storage.remove(HISTORY_KEY)?;
        Ok(count)
    }

    /// Copy a record under a fresh id; the source is left untouched
    pub fn duplicate_record(&mut self, id: &str) -> Result<CVRecord> {
        let source = self.get_record(id)?;
        let label = format!("{} (Copy)", source.target_job);
        self.add_record(&label, &source.profile)
    }

    /// Records whose target job resembles `query`, best match first
    pub fn search_history(&self, query: &str) -> Result<Vec<CVRecord>> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return self.history();
        }

        let mut scored: Vec<(f64, CVRecord)> = self
            .history()?
            .into_iter()
            .filter_map(|record| {
                let title = record.target_job.to_lowercase();
                let score = if title.contains(&query) {
                    1.0
                } else {
                    strsim::jaro_winkler(&title, &query)
                };
                (score >= SEARCH_THRESHOLD).then_some((score, record))
            })
            .collect();

        // Stable sort keeps newest-first order among equal scores
        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
        Ok(scored.into_iter().map(|(_, record)| record).collect())
    }

    pub fn load_session(&self) -> Result<Option<Session>> {
        self.read_json(SESSION_KEY)
    }

    pub fn save_session(&mut self, session: &Session) -> Result<()> {
        self.write_json(SESSION_KEY, session)
    }

    pub fn clear_session(&mut self) -> Result<()> {
        self.storage.remove(SESSION_KEY)
    }

    fn read_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let Some(raw) = self.storage.get(key)? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                warn!("Failed to load saved {}: {}", key, e);
                Ok(None)
            }
        }
    }

    /// History about to be rewritten. Unlike `history`, a stored value that
    /// does not parse is an error so it is never replaced by a shorter list.
    fn history_for_update(&self) -> Result<Vec<CVRecord>> {
        let Some(raw) = self.storage.get(HISTORY_KEY)? else {
            return Ok(Vec::new());
        };
        serde_json::from_str(&raw).map_err(|e| {
            FastCvError::Storage(format!(
                "saved history is unreadable ({}); clear it before saving new records",
                e
            ))
        })
    }

    fn write_json<T: Serialize>(&mut self, key: &str, value: &T) -> Result<()> {
        let json = serde_json::to_string(value)?;
        self.storage.set(key, &json)
    }
}

/// Millisecond timestamp, bumped past the newest existing id when the clock
/// has not moved on
fn next_record_id(records: &[CVRecord]) -> String {
    let now = chrono::Utc::now().timestamp_millis().max(0) as u64;
    let newest = records
        .iter()
        .filter_map(|record| record.id.parse::<u64>().ok())
        .max();
    match newest {
        Some(newest) if newest >= now => (newest + 1).to_string(),
        _ => now.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::storage::MemoryStorage;
    use crate::profile::types::Experience;

    fn sample_profile(name: &str) -> ResumeProfile {
        ResumeProfile {
            full_name: name.to_string(),
            summary: "Builds things".to_string(),
            skills: vec!["Rust".into(), "SQL".into()],
            experience: vec![Experience {
                company: "Acme".into(),
                role: "Engineer".into(),
                description: vec!["Shipped".into()],
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    #[test]
    fn test_profile_roundtrip() {
        let mut store = ProfileStore::new(MemoryStorage::new());
        assert!(store.load_profile().unwrap().is_none());

        let profile = sample_profile("Ada");
        store.save_profile(&profile).unwrap();
        assert_eq!(store.load_profile().unwrap(), Some(profile));

        store.clear_profile().unwrap();
        assert!(store.load_profile().unwrap().is_none());
    }

    #[test]
    fn test_corrupt_profile_is_treated_as_absent() {
        let mut storage = MemoryStorage::new();
        storage.set(PROFILE_KEY, "{not json").unwrap();
        let store = ProfileStore::new(storage);
        assert!(store.load_profile().unwrap().is_none());
    }

    #[test]
    fn test_records_are_newest_first_with_unique_ids() {
        let mut store = ProfileStore::new(MemoryStorage::new());
        let first = store.add_record("Backend Engineer", &sample_profile("A")).unwrap();
        let second = store.add_record("Data Engineer", &sample_profile("B")).unwrap();
        let third = store.add_record("SRE", &sample_profile("C")).unwrap();

        let history = store.history().unwrap();
        let ids: Vec<&str> = history.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec![third.id.as_str(), second.id.as_str(), first.id.as_str()]);
        assert_ne!(first.id, second.id);
        assert_ne!(second.id, third.id);
    }

    #[test]
    fn test_delete_removes_exactly_one() {
        let mut store = ProfileStore::new(MemoryStorage::new());
        let a = store.add_record("A", &sample_profile("A")).unwrap();
        let b = store.add_record("B", &sample_profile("B")).unwrap();
        let c = store.add_record("C", &sample_profile("C")).unwrap();

        assert!(store.delete_record(&b.id).unwrap());
        let remaining = store.history().unwrap();
        assert_eq!(remaining, vec![c.clone(), a.clone()]);

        assert!(!store.delete_record(&b.id).unwrap());
        assert_eq!(store.history().unwrap().len(), 2);
    }

    #[test]
    fn test_bulk_delete_and_clear() {
        let mut store = ProfileStore::new(MemoryStorage::new());
        let a = store.add_record("A", &sample_profile("A")).unwrap();
        let b = store.add_record("B", &sample_profile("B")).unwrap();
        store.add_record("C", &sample_profile("C")).unwrap();

        let removed = store
            .delete_records(&[a.id.clone(), b.id.clone(), "missing".to_string()])
            .unwrap();
        assert_eq!(removed, 2);
        assert_eq!(store.history().unwrap().len(), 1);

        assert_eq!(store.clear_history().unwrap(), 1);
        assert!(store.history().unwrap().is_empty());
    }

    #[test]
    fn test_duplicate_gets_new_id_and_same_profile() {
        let mut store = ProfileStore::new(MemoryStorage::new());
        let source = store.add_record("Designer", &sample_profile("Ada")).unwrap();
        let copy = store.duplicate_record(&source.id).unwrap();

        assert_ne!(copy.id, source.id);
        assert_eq!(copy.profile, source.profile);
        assert_eq!(copy.target_job, "Designer (Copy)");
        assert_eq!(store.get_record(&source.id).unwrap(), source);
        assert_eq!(store.history().unwrap().len(), 2);
    }

    #[test]
    fn test_duplicate_missing_record() {
        let mut store = ProfileStore::new(MemoryStorage::new());
        let err = store.duplicate_record("42").unwrap_err();
        assert!(matches!(err, FastCvError::RecordNotFound(id) if id == "42"));
    }

    #[test]
    fn test_search_history() {
        let mut store = ProfileStore::new(MemoryStorage::new());
        store.add_record("Senior Frontend Developer", &sample_profile("A")).unwrap();
        store.add_record("Data Scientist", &sample_profile("B")).unwrap();
        store.add_record("Frontend Developr", &sample_profile("C")).unwrap();

        let hits = store.search_history("frontend developer").unwrap();
        let titles: Vec<&str> = hits.iter().map(|r| r.target_job.as_str()).collect();
        assert_eq!(titles[0], "Senior Frontend Developer");
        assert!(titles.contains(&"Frontend Developr"));
        assert!(!titles.contains(&"Data Scientist"));
    }

    #[test]
    fn test_next_id_bumps_past_future_ids() {
        let future = CVRecord {
            id: "99999999999999".into(),
            target_job: String::new(),
            date: String::new(),
            profile: ResumeProfile::default(),
        };
        assert_eq!(next_record_id(&[future]), "100000000000000");
    }

    #[test]
    fn test_unreadable_history_is_not_overwritten() {
        let mut storage = MemoryStorage::new();
        let stored = r#"[{"id":"1","targetJob":"Kept","date":"1/2/2024","profile":{"fullName":"A"}},{"id":"2"}]"#;
        storage.set(HISTORY_KEY, stored).unwrap();
        let mut store = ProfileStore::new(storage);

        assert!(store.history().unwrap().is_empty());
        let err = store.add_record("New", &sample_profile("B")).unwrap_err();
        assert!(matches!(err, FastCvError::Storage(_)));
        assert!(matches!(
            store.delete_records(&["1".to_string()]),
            Err(FastCvError::Storage(_))
        ));
        assert_eq!(store.storage().get(HISTORY_KEY).unwrap().as_deref(), Some(stored));

        assert_eq!(store.clear_history().unwrap(), 0);
        store.add_record("New", &sample_profile("B")).unwrap();
        assert_eq!(store.history().unwrap().len(), 1);
    }
}
