pub mod apply;
pub mod destroy;
pub mod diff;
pub mod refresh;
pub mod show;

use anyhow::{Context as _, Result};
use reconcile::{ResourceId, ResourceKind, Task};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use stingray::HttpClient;

use crate::Context;
use crate::config::Settings;
use crate::manifest::Manifest;
use crate::state::BrocadeState;

// ============================================================================
// Targets
// ============================================================================

/// Command filter: every object of a kind, or one object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Kind(ResourceKind),
    Resource(ResourceId),
}

impl Target {
    pub fn matches(&self, id: &ResourceId) -> bool {
        match self {
            Self::Kind(kind) => id.kind == *kind,
            Self::Resource(target) => id == target,
        }
    }
}

impl FromStr for Target {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.contains('.') {
            s.parse().map(Self::Resource)
        } else {
            s.parse().map(Self::Kind)
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Kind(kind) => write!(f, "{kind}"),
            Self::Resource(id) => write!(f, "{id}"),
        }
    }
}

// ============================================================================
// Confirmation
// ============================================================================

/// Asks the user before anything is written or deleted.
pub trait Confirm {
    fn confirm(&self, prompt: &str, default: bool) -> Result<bool>;
}

/// Prompts on the terminal.
pub struct Interactive;

impl Confirm for Interactive {
    fn confirm(&self, prompt: &str, default: bool) -> Result<bool> {
        let confirmed = dialoguer::Confirm::new()
            .with_prompt(prompt)
            .default(default)
            .interact()?;
        Ok(confirmed)
    }
}

/// Answers yes without asking (`--yes`).
pub struct AutoConfirm;

impl Confirm for AutoConfirm {
    fn confirm(&self, _prompt: &str, _default: bool) -> Result<bool> {
        Ok(true)
    }
}

/// Pick the confirmer for a `--yes` flag.
pub fn confirmer(yes: bool) -> Box<dyn Confirm> {
    if yes {
        Box::new(AutoConfirm)
    } else {
        Box::new(Interactive)
    }
}

// ============================================================================
// Shared Helpers
// ============================================================================

/// Build the REST client from settings and overrides.
pub fn connect(ctx: &Context) -> Result<HttpClient> {
    let config = Settings::load(ctx.config.as_deref())?.resolve(&ctx.connection)?;
    log::debug!("Connecting to {}", config.server_url);
    HttpClient::new(&config).context("Failed to create REST client")
}

/// State file path for this invocation.
pub fn state_path(ctx: &Context) -> Result<PathBuf> {
    BrocadeState::state_file(ctx.state.as_deref())
}

/// Tasks for the manifest objects matching `target`.
///
/// Tracked objects missing from the manifest become removals when `prune` is
/// set; otherwise they are returned as orphans.
pub fn manifest_tasks(
    manifest: &Manifest,
    state: &BrocadeState,
    target: Option<&Target>,
    prune: bool,
) -> (Vec<Task>, Vec<ResourceId>) {
    let mut tasks: Vec<Task> = manifest
        .resources()
        .filter(|(id, _)| target.is_none_or(|t| t.matches(id)))
        .map(|(id, desired)| Task::converge(id.clone(), state.handle(id), desired.clone()))
        .collect();

    let mut orphans = Vec::new();
    for (id, handle) in state.tracked(target) {
        if manifest.contains(&id) {
            continue;
        }
        if prune {
            tasks.push(Task::remove(id, handle));
        } else {
            orphans.push(id);
        }
    }

    (tasks, orphans)
}

#[cfg(test)]
pub(crate) mod testing {
    use serde_json::json;
    use std::fs;
    use std::path::{Path, PathBuf};
    use stingray::MockClient;

    use super::Confirm;
    use crate::Context;

    /// Mock traffic manager that fills in node state like a real one.
    pub fn server() -> MockClient {
        let mock = MockClient::new();
        mock.on_store(|collection, body| {
            if collection != "pools" {
                return;
            }
            if let Some(nodes) = body
                .pointer_mut("/properties/basic/nodes_table")
                .and_then(|v| v.as_array_mut())
            {
                for node in nodes {
                    node["state"] = json!("active");
                    node["weight"] = json!(1);
                }
            }
        });
        mock
    }

    pub fn context() -> Context {
        Context {
            quiet: true,
            ..Default::default()
        }
    }

    pub fn write_manifest(dir: &Path, content: &str) -> PathBuf {
        let path = dir.join("brocade.toml");
        fs::write(&path, content).unwrap();
        path
    }

    pub struct AutoDecline;

    impl Confirm for AutoDecline {
        fn confirm(&self, _prompt: &str, _default: bool) -> anyhow::Result<bool> {
            Ok(false)
        }
    }
}
