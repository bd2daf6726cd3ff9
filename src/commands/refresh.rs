//! `brocade refresh` - re-read tracked objects into the state file

use anyhow::{Result, bail};
use colored::Colorize;
use rayon::prelude::*;
use reconcile::{Handle, Reconciler, Record, ResourceId};
use std::path::Path;
use stingray::Client;

use crate::Context;
use crate::cli::RefreshArgs;
use crate::state::BrocadeState;
use crate::ui;

/// Totals of one refresh run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RefreshSummary {
    pub refreshed: usize,
    pub gone: usize,
    pub failed: usize,
}

pub fn run(ctx: &Context, args: &RefreshArgs) -> Result<()> {
    let client = super::connect(ctx)?;
    let state_path = super::state_path(ctx)?;
    execute(ctx, &client, &state_path, args)?;
    Ok(())
}

pub fn execute<C: Client>(
    ctx: &Context,
    client: &C,
    state_path: &Path,
    args: &RefreshArgs,
) -> Result<RefreshSummary> {
    let mut state = BrocadeState::load(state_path)?;
    let tracked = state.tracked(args.target.as_ref());
    if tracked.is_empty() {
        ui::info("No tracked objects to refresh");
        return Ok(RefreshSummary::default());
    }

    log::info!("Refreshing {} objects", tracked.len());
    let reconciler = Reconciler::new(client);
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(args.jobs.max(1))
        .build()?;

    let results: Vec<(ResourceId, Handle, reconcile::Result<Option<Record>>)> =
        pool.install(|| {
            tracked
                .into_par_iter()
                .map(|(id, mut handle)| {
                    let observed = id.kind.read(&reconciler, &mut handle);
                    (id, handle, observed)
                })
                .collect()
        });

    let mut summary = RefreshSummary::default();
    for (id, handle, observed) in results {
        match observed {
            Ok(Some(record)) => {
                summary.refreshed += 1;
                if !ctx.quiet {
                    println!("  {} {}", "✓".green(), id);
                }
                state.observe(&id, handle, Some(record));
            }
            Ok(None) => {
                summary.gone += 1;
                ui::warn(&format!("{id} no longer exists on the traffic manager"));
                state.observe(&id, handle, None);
            }
            Err(e) => {
                summary.failed += 1;
                ui::error(&format!("{id}: {e}"));
                if let Some(remote) = e.remote() {
                    ui::dim(remote.category().advice());
                }
            }
        }
    }

    state.save(state_path)?;

    if !ctx.quiet {
        println!();
        ui::success(&format!(
            "Refreshed {} objects ({} gone, {} failed)",
            summary.refreshed, summary.gone, summary.failed
        ));
    }

    if summary.failed > 0 {
        bail!("{} objects could not be refreshed", summary.failed);
    }
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::{context, server};
    use reconcile::{ResourceKind, Value};
    use stingray::{MockClient, Operation, Pool};
    use tempfile::TempDir;

    fn web() -> ResourceId {
        ResourceId::new(ResourceKind::Pool, "web")
    }

    fn args() -> RefreshArgs {
        RefreshArgs {
            target: None,
            jobs: 2,
        }
    }

    /// Create `pool.web` and track it with no observed record.
    fn tracked_pool(mock: &MockClient, state_path: &Path) {
        let mut handle = Handle::default();
        Reconciler::new(mock)
            .create::<Pool>(
                &mut handle,
                &Record::named("web").with("nodes", Value::set(["10.0.0.1:80"])),
            )
            .unwrap();

        let mut state = BrocadeState::default();
        state.observe(&web(), handle, None);
        state.save(state_path).unwrap();
    }

    #[test]
    fn test_refresh_fills_observed() {
        let dir = TempDir::new().unwrap();
        let state_path = dir.path().join("state.toml");
        let mock = server();
        tracked_pool(&mock, &state_path);

        let summary = execute(&context(), &mock, &state_path, &args()).unwrap();
        assert_eq!(summary.refreshed, 1);

        let state = BrocadeState::load(&state_path).unwrap();
        let observed = state.get(&web()).unwrap().observed.clone().unwrap();
        assert_eq!(observed.get_set("nodes").unwrap().len(), 1);
        assert_eq!(observed.get_int("dns_autoscale_port"), Some(80));
    }

    #[test]
    fn test_refresh_clears_deleted_objects() {
        let dir = TempDir::new().unwrap();
        let state_path = dir.path().join("state.toml");
        let mock = server();
        tracked_pool(&mock, &state_path);
        assert!(mock.remove("pools", "web").is_some());

        let summary = execute(&context(), &mock, &state_path, &args()).unwrap();
        assert_eq!(summary.gone, 1);

        let state = BrocadeState::load(&state_path).unwrap();
        assert!(!state.get(&web()).unwrap().handle.is_tracked());
        assert!(state.tracked(None).is_empty());
    }

    #[test]
    fn test_refresh_failure_keeps_handle() {
        let dir = TempDir::new().unwrap();
        let state_path = dir.path().join("state.toml");
        let mock = server();
        tracked_pool(&mock, &state_path);
        mock.fail_with_status(Operation::Get, 503);

        assert!(execute(&context(), &mock, &state_path, &args()).is_err());

        let state = BrocadeState::load(&state_path).unwrap();
        assert_eq!(state.handle(&web()).id(), Some("web"));
    }

    #[test]
    fn test_refresh_nothing_tracked() {
        let dir = TempDir::new().unwrap();
        let summary = execute(
            &context(),
            &MockClient::new(),
            &dir.path().join("state.toml"),
            &args(),
        )
        .unwrap();
        assert_eq!(summary, RefreshSummary::default());
    }
}
