use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use reconcile::{ApplyResult, Change, Handle, Outcome, Record, ResourceId, ResourceKind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::commands::Target;
use crate::config::expand_path;

// ============================================================================
// State Structures
// ============================================================================

/// Everything brocade remembers between runs
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct BrocadeState {
    /// Last time the state was updated
    pub last_updated: DateTime<Utc>,

    /// Tracked objects keyed by `kind.name`
    #[serde(default)]
    pub resources: BTreeMap<String, ResourceState>,
}

/// State for one tracked object
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct ResourceState {
    /// Remote object this entry is bound to; empty once it was found deleted
    #[serde(default)]
    pub handle: Handle,

    /// Last time brocade wrote this object
    pub last_applied: Option<DateTime<Utc>>,

    /// Last observed record
    #[serde(default)]
    pub observed: Option<Record>,
}

impl Default for BrocadeState {
    fn default() -> Self {
        Self {
            last_updated: Utc::now(),
            resources: BTreeMap::new(),
        }
    }
}

// ============================================================================
// BrocadeState Implementation
// ============================================================================

impl BrocadeState {
    /// Get the state directory path (~/.local/state/brocade)
    pub fn state_dir() -> Result<PathBuf> {
        let home = dirs::home_dir().context("Could not determine home directory")?;
        Ok(home.join(".local").join("state").join("brocade"))
    }

    /// State file path, honoring an override
    pub fn state_file(custom: Option<&Path>) -> Result<PathBuf> {
        match custom {
            Some(path) => Ok(expand_path(path)),
            None => Ok(Self::state_dir()?.join("state.toml")),
        }
    }

    /// Load state from disk, or return default if file doesn't exist
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("State file does not exist, using default state");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read state file: {}", path.display()))?;

        let state: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse state file: {}", path.display()))?;

        log::debug!("Loaded state from {}", path.display());
        Ok(state)
    }

    /// Stamp `last_updated` and save state to disk
    pub fn save(&mut self, path: &Path) -> Result<()> {
        self.last_updated = Utc::now();

        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create state directory: {}", dir.display()))?;
        }

        let content = toml::to_string_pretty(&self).context("Failed to serialize state to TOML")?;

        fs::write(path, &content)
            .with_context(|| format!("Failed to write state file: {}", path.display()))?;

        log::debug!("Saved state to {}", path.display());
        Ok(())
    }

    // ========================================================================
    // Resource Helpers
    // ========================================================================

    pub fn get(&self, id: &ResourceId) -> Option<&ResourceState> {
        self.resources.get(&id.to_string())
    }

    /// Handle for `id`; untracked if brocade never wrote it
    pub fn handle(&self, id: &ResourceId) -> Handle {
        self.get(id).map(|r| r.handle.clone()).unwrap_or_default()
    }

    pub fn forget(&mut self, id: &ResourceId) -> Option<ResourceState> {
        self.resources.remove(&id.to_string())
    }

    /// Entries matching `target` whose key parses as a resource id
    pub fn entries(&self, target: Option<&Target>) -> Vec<(ResourceId, &ResourceState)> {
        self.resources
            .iter()
            .filter_map(|(key, entry)| match key.parse::<ResourceId>() {
                Ok(id) => Some((id, entry)),
                Err(e) => {
                    log::warn!("Ignoring state entry '{key}': {e}");
                    None
                }
            })
            .filter(|(id, _)| target.is_none_or(|t| t.matches(id)))
            .collect()
    }

    /// Tracked entries (with a live handle) matching `target`
    pub fn tracked(&self, target: Option<&Target>) -> Vec<(ResourceId, Handle)> {
        self.entries(target)
            .into_iter()
            .filter(|(_, entry)| entry.handle.is_tracked())
            .map(|(id, entry)| (id, entry.handle.clone()))
            .collect()
    }

    /// Record a refreshed observation
    pub fn observe(&mut self, id: &ResourceId, handle: Handle, observed: Option<Record>) {
        let key = id.to_string();
        if handle.is_tracked() {
            let entry = self.resources.entry(key).or_default();
            entry.handle = handle;
            if observed.is_some() {
                entry.observed = observed;
            }
        } else if let Some(entry) = self.resources.get_mut(&key) {
            // Deleted out-of-band
            entry.handle = Handle::default();
            entry.observed = None;
        }
    }

    /// Fold one executor outcome into the state
    pub fn record(&mut self, outcome: &Outcome) {
        match &outcome.result {
            ApplyResult::Removed => {
                self.forget(&outcome.id);
            }
            // Pruned, but already deleted elsewhere
            ApplyResult::NoChange
                if matches!(outcome.change, Some(Change::InSync)) && outcome.observed.is_none() =>
            {
                self.forget(&outcome.id);
            }
            ApplyResult::Failed { .. } if outcome.change.is_none() => {}
            result => {
                self.observe(&outcome.id, outcome.handle.clone(), outcome.observed.clone());
                if result.is_change()
                    && let Some(entry) = self.resources.get_mut(&outcome.id.to_string())
                {
                    entry.last_applied = Some(Utc::now());
                }
            }
        }
    }

    /// Number of tracked entries per kind
    pub fn counts(&self) -> BTreeMap<ResourceKind, usize> {
        let mut counts = BTreeMap::new();
        for (id, _) in self.entries(None) {
            *counts.entry(id.kind).or_insert(0) += 1;
        }
        counts
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use reconcile::Value;
    use tempfile::TempDir;

    fn pool(name: &str) -> ResourceId {
        ResourceId::new(ResourceKind::Pool, name)
    }

    fn outcome(id: ResourceId, handle: Handle, result: ApplyResult) -> Outcome {
        Outcome {
            observed: handle.id().map(Record::named),
            id,
            handle,
            change: Some(Change::Create),
            result,
        }
    }

    #[test]
    fn test_default_state() {
        let state = BrocadeState::default();
        assert!(state.resources.is_empty());
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("state.toml");

        let mut state = BrocadeState::default();
        state.observe(
            &pool("web"),
            Handle::tracking("web"),
            Some(
                Record::named("web")
                    .with("nodes", Value::set(["10.0.0.1:80"]))
                    .with("dns_autoscale_port", 80)
                    .with("tcp_nagle", true),
            ),
        );
        state.save(&path).unwrap();

        let loaded = BrocadeState::load(&path).unwrap();
        assert_eq!(loaded.resources, state.resources);
        assert_eq!(loaded.handle(&pool("web")).id(), Some("web"));
    }

    #[test]
    fn test_load_missing_file_is_default() {
        let dir = TempDir::new().unwrap();
        let state = BrocadeState::load(&dir.path().join("none.toml")).unwrap();
        assert!(state.resources.is_empty());
    }

    #[test]
    fn test_load_invalid_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.toml");
        fs::write(&path, "not = [valid").unwrap();
        assert!(BrocadeState::load(&path).is_err());
    }

    #[test]
    fn test_record_created_sets_last_applied() {
        let mut state = BrocadeState::default();
        state.record(&outcome(pool("web"), Handle::tracking("web"), ApplyResult::Created));

        let entry = state.get(&pool("web")).unwrap();
        assert!(entry.last_applied.is_some());
        assert!(entry.observed.is_some());
    }

    #[test]
    fn test_record_no_change_keeps_last_applied_empty() {
        let mut state = BrocadeState::default();
        state.record(&outcome(pool("web"), Handle::tracking("web"), ApplyResult::NoChange));
        assert!(state.get(&pool("web")).unwrap().last_applied.is_none());
    }

    #[test]
    fn test_record_tombstone_clears_handle() {
        let mut state = BrocadeState::default();
        state.record(&outcome(pool("web"), Handle::tracking("web"), ApplyResult::Created));
        state.record(&outcome(pool("web"), Handle::default(), ApplyResult::NoChange));

        let entry = state.get(&pool("web")).unwrap();
        assert!(!entry.handle.is_tracked());
        assert!(entry.observed.is_none());
        assert!(state.tracked(None).is_empty());
    }

    #[test]
    fn test_record_untracked_dry_run_adds_nothing() {
        let mut state = BrocadeState::default();
        state.record(&outcome(
            pool("web"),
            Handle::default(),
            ApplyResult::Skipped {
                reason: "dry run".into(),
            },
        ));
        assert!(state.resources.is_empty());
    }

    #[test]
    fn test_record_removed_forgets() {
        let mut state = BrocadeState::default();
        state.record(&outcome(pool("web"), Handle::tracking("web"), ApplyResult::Created));
        state.record(&outcome(pool("web"), Handle::tracking("web"), ApplyResult::Removed));
        assert!(state.get(&pool("web")).is_none());
    }

    #[test]
    fn test_record_prune_of_deleted_object_forgets() {
        let mut state = BrocadeState::default();
        state.record(&outcome(pool("web"), Handle::tracking("web"), ApplyResult::Created));

        let mut gone = outcome(pool("web"), Handle::default(), ApplyResult::NoChange);
        gone.change = Some(Change::InSync);
        state.record(&gone);

        assert!(state.get(&pool("web")).is_none());
    }

    #[test]
    fn test_record_refresh_failure_leaves_entry() {
        let mut state = BrocadeState::default();
        state.record(&outcome(pool("web"), Handle::tracking("web"), ApplyResult::Created));
        let before = state.get(&pool("web")).cloned();

        let mut failed = outcome(
            pool("web"),
            Handle::tracking("web"),
            ApplyResult::Failed {
                error: "HTTP 503".into(),
            },
        );
        failed.change = None;
        failed.observed = None;
        state.record(&failed);

        assert_eq!(state.get(&pool("web")).cloned(), before);
    }

    #[test]
    fn test_entries_filter_by_target() {
        let mut state = BrocadeState::default();
        state.observe(&pool("a"), Handle::tracking("a"), None);
        state.observe(
            &ResourceId::new(ResourceKind::TrafficIpGroup, "vip"),
            Handle::tracking("vip"),
            None,
        );
        state
            .resources
            .insert("bogus".into(), ResourceState::default());

        let target: Target = "pool".parse().unwrap();
        assert_eq!(state.entries(Some(&target)).len(), 1);
        assert_eq!(state.entries(None).len(), 2);
        assert_eq!(state.counts().get(&ResourceKind::Pool), Some(&1));
    }
}
