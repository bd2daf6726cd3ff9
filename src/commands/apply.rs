//! `brocade apply` - make the traffic manager match the manifest

use anyhow::{Result, bail};
use reconcile::{ApplyResult, ExecuteOptions, ExecuteSummary, PlannedTask};
use std::path::Path;
use stingray::Client;

use super::Confirm;
use crate::Context;
use crate::cli::ApplyArgs;
use crate::engine;
use crate::manifest::Manifest;
use crate::progress::BarProgress;
use crate::state::BrocadeState;
use crate::ui;

pub fn run(ctx: &Context, args: &ApplyArgs) -> Result<()> {
    let client = super::connect(ctx)?;
    let state_path = super::state_path(ctx)?;
    let confirm = super::confirmer(args.yes);
    execute(ctx, &client, &state_path, args, confirm.as_ref())?;
    Ok(())
}

/// Plan, confirm and apply; returns the run's totals.
pub fn execute<C: Client>(
    ctx: &Context,
    client: &C,
    state_path: &Path,
    args: &ApplyArgs,
    confirm: &dyn Confirm,
) -> Result<ExecuteSummary> {
    let manifest = Manifest::load(&args.manifest)?;
    let mut state = BrocadeState::load(state_path)?;
    if manifest.is_empty() {
        ui::warn(&format!("{} declares no resources", args.manifest.display()));
    }

    let (tasks, orphans) =
        super::manifest_tasks(&manifest, &state, args.target.as_ref(), args.prune);
    if tasks.is_empty() {
        ui::info("Nothing to reconcile");
        return Ok(ExecuteSummary::default());
    }

    if !ctx.quiet {
        ui::header(if args.dry_run {
            "Brocade Apply (dry run)"
        } else {
            "Brocade Apply"
        });
    }

    let planned = reconcile::plan(client, tasks, args.jobs)?;
    if !ctx.quiet {
        engine::display_plan(&planned, ctx.verbose > 0);
        engine::display_orphans(&orphans);
    }

    let proceed = should_apply(&planned, args.dry_run, confirm)?;
    let opts = ExecuteOptions {
        dry_run: !proceed,
        jobs: args.jobs,
    };

    let mut progress = BarProgress::new(ctx.quiet);
    let report = reconcile::apply(client, planned, &opts, &mut progress)?;

    for outcome in &report.outcomes {
        if let ApplyResult::Failed { error } = &outcome.result {
            ui::error(&format!("{}: {}", outcome.id, error));
        }
        state.record(outcome);
    }

    if !args.dry_run {
        state.save(state_path)?;
    }

    if !ctx.quiet && proceed {
        ui::summary(&report.summary);
    }

    if report.summary.failed > 0 {
        bail!("{} resources failed to apply", report.summary.failed);
    }
    Ok(report.summary)
}

fn should_apply(planned: &[PlannedTask], dry_run: bool, confirm: &dyn Confirm) -> Result<bool> {
    let pending = planned.iter().filter(|p| p.needs_apply()).count();
    if pending == 0 || dry_run {
        return Ok(false);
    }

    println!();
    if confirm.confirm(&format!("Apply {pending} changes?"), true)? {
        Ok(true)
    } else {
        ui::info("Aborted");
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::AutoConfirm;
    use crate::commands::testing::{AutoDecline, context, server, write_manifest};
    use reconcile::{ResourceId, ResourceKind};
    use std::path::PathBuf;
    use stingray::{MockClient, Operation, Pool, TrafficIpGroup};
    use tempfile::TempDir;

    const MANIFEST: &str = r#"
[pool.web]
nodes = ["10.0.0.1:80", "10.0.0.2:80"]
monitors = ["ping"]

[traffic_ip_group.vip]
ipaddresses = ["10.1.1.1"]
machines = ["tm1"]
"#;

    fn args(manifest: PathBuf) -> ApplyArgs {
        ApplyArgs {
            manifest,
            target: None,
            dry_run: false,
            jobs: 2,
            prune: false,
            yes: true,
        }
    }

    fn setup(content: &str) -> (TempDir, MockClient, PathBuf, ApplyArgs) {
        let dir = TempDir::new().unwrap();
        let manifest = write_manifest(dir.path(), content);
        let state_path = dir.path().join("state.toml");
        (dir, server(), state_path, args(manifest))
    }

    fn web() -> ResourceId {
        ResourceId::new(ResourceKind::Pool, "web")
    }

    #[test]
    fn test_apply_creates_and_tracks() {
        let (_dir, mock, state_path, args) = setup(MANIFEST);

        let summary = execute(&context(), &mock, &state_path, &args, &AutoConfirm).unwrap();
        assert_eq!(summary.created, 2);
        assert!(mock.contains::<Pool>("web"));
        assert!(mock.contains::<TrafficIpGroup>("vip"));

        let state = BrocadeState::load(&state_path).unwrap();
        let entry = state.get(&web()).unwrap();
        assert_eq!(entry.handle.id(), Some("web"));
        assert!(entry.last_applied.is_some());
        assert_eq!(
            entry.observed.as_ref().and_then(|r| r.get_set("nodes")).map(|s| s.len()),
            Some(2)
        );
    }

    #[test]
    fn test_second_apply_is_no_change() {
        let (_dir, mock, state_path, args) = setup(MANIFEST);
        execute(&context(), &mock, &state_path, &args, &AutoConfirm).unwrap();
        let writes = mock.writes().len();

        let summary = execute(&context(), &mock, &state_path, &args, &AutoConfirm).unwrap();
        assert_eq!(summary.no_change, 2);
        assert_eq!(summary.total_changes(), 0);
        assert_eq!(mock.writes().len(), writes);
    }

    #[test]
    fn test_manifest_edit_modifies() {
        let (dir, mock, state_path, args) = setup(MANIFEST);
        execute(&context(), &mock, &state_path, &args, &AutoConfirm).unwrap();

        write_manifest(
            dir.path(),
            "[pool.web]\nnodes = [\"10.0.0.1:80\"]\nmonitors = [\"ping\"]\n",
        );
        let summary = execute(&context(), &mock, &state_path, &args, &AutoConfirm).unwrap();
        assert_eq!(summary.modified, 1);

        let state = BrocadeState::load(&state_path).unwrap();
        let nodes = state.get(&web()).unwrap().observed.as_ref().unwrap();
        assert_eq!(nodes.get_set("nodes").unwrap().len(), 1);
        // Not in the manifest any more, but not pruned either
        assert!(mock.contains::<TrafficIpGroup>("vip"));
    }

    #[test]
    fn test_dry_run_writes_nothing() {
        let (_dir, mock, state_path, mut args) = setup(MANIFEST);
        args.dry_run = true;

        let summary = execute(&context(), &mock, &state_path, &args, &AutoConfirm).unwrap();
        assert_eq!(summary.skipped, 2);
        assert!(mock.writes().is_empty());
        assert!(!state_path.exists());
    }

    #[test]
    fn test_declined_confirmation_writes_nothing() {
        let (_dir, mock, state_path, args) = setup(MANIFEST);

        let summary = execute(&context(), &mock, &state_path, &args, &AutoDecline).unwrap();
        assert_eq!(summary.skipped, 2);
        assert!(mock.writes().is_empty());
    }

    #[test]
    fn test_target_limits_apply() {
        let (_dir, mock, state_path, mut args) = setup(MANIFEST);
        args.target = Some("traffic_ip_group".parse().unwrap());

        let summary = execute(&context(), &mock, &state_path, &args, &AutoConfirm).unwrap();
        assert_eq!(summary.created, 1);
        assert!(!mock.contains::<Pool>("web"));
    }

    #[test]
    fn test_prune_deletes_orphans() {
        let (dir, mock, state_path, mut args) = setup(MANIFEST);
        execute(&context(), &mock, &state_path, &args, &AutoConfirm).unwrap();

        write_manifest(dir.path(), "[pool.web]\nnodes = [\"10.0.0.1:80\"]\n");
        args.prune = true;
        let summary = execute(&context(), &mock, &state_path, &args, &AutoConfirm).unwrap();
        assert_eq!(summary.removed, 1);
        assert!(!mock.contains::<TrafficIpGroup>("vip"));

        let state = BrocadeState::load(&state_path).unwrap();
        assert!(
            state
                .get(&ResourceId::new(ResourceKind::TrafficIpGroup, "vip"))
                .is_none()
        );
    }

    #[test]
    fn test_prune_of_deleted_object_drops_entry() {
        let (dir, mock, state_path, mut args) = setup(MANIFEST);
        execute(&context(), &mock, &state_path, &args, &AutoConfirm).unwrap();
        assert!(mock.remove("traffic_ip_groups", "vip").is_some());

        write_manifest(
            dir.path(),
            "[pool.web]\nnodes = [\"10.0.0.1:80\", \"10.0.0.2:80\"]\nmonitors = [\"ping\"]\n",
        );
        args.prune = true;
        let summary = execute(&context(), &mock, &state_path, &args, &AutoConfirm).unwrap();
        assert_eq!(summary.no_change, 2);
        assert_eq!(summary.removed, 0);

        let state = BrocadeState::load(&state_path).unwrap();
        let vip = ResourceId::new(ResourceKind::TrafficIpGroup, "vip");
        assert!(state.get(&vip).is_none());
        assert!(state.get(&web()).is_some());
    }

    #[test]
    fn test_out_of_band_delete_is_recreated() {
        let (_dir, mock, state_path, args) = setup(MANIFEST);
        execute(&context(), &mock, &state_path, &args, &AutoConfirm).unwrap();
        assert!(mock.remove("pools", "web").is_some());

        let summary = execute(&context(), &mock, &state_path, &args, &AutoConfirm).unwrap();
        assert_eq!(summary.created, 1);
        assert_eq!(summary.no_change, 1);
        assert!(mock.contains::<Pool>("web"));
    }

    #[test]
    fn test_write_failure_fails_run() {
        let (_dir, mock, state_path, args) = setup(MANIFEST);
        mock.fail_with_status(Operation::Set, 500);

        let err = execute(&context(), &mock, &state_path, &args, &AutoConfirm).unwrap_err();
        assert!(err.to_string().contains("2 resources failed"));

        let state = BrocadeState::load(&state_path).unwrap();
        assert!(state.resources.is_empty());
    }

    #[test]
    fn test_invalid_manifest() {
        let (_dir, mock, state_path, args) = setup("[pool.web]\ncolour = \"blue\"\n");
        assert!(execute(&context(), &mock, &state_path, &args, &AutoConfirm).is_err());
        assert!(mock.writes().is_empty());
    }
}
