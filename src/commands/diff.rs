//! `brocade diff` - show what apply would change

use anyhow::Result;
use reconcile::DiffSummary;
use std::path::Path;
use stingray::Client;

use crate::Context;
use crate::cli::DiffArgs;
use crate::engine;
use crate::manifest::Manifest;
use crate::state::BrocadeState;
use crate::ui;

pub fn run(ctx: &Context, args: &DiffArgs) -> Result<()> {
    let client = super::connect(ctx)?;
    let state_path = super::state_path(ctx)?;
    execute(ctx, &client, &state_path, args)?;
    Ok(())
}

/// Plan against the live objects without writing anything.
pub fn execute<C: Client>(
    ctx: &Context,
    client: &C,
    state_path: &Path,
    args: &DiffArgs,
) -> Result<DiffSummary> {
    let manifest = Manifest::load(&args.manifest)?;
    let state = BrocadeState::load(state_path)?;

    let (tasks, orphans) = super::manifest_tasks(&manifest, &state, args.target.as_ref(), false);
    if tasks.is_empty() {
        ui::info("Nothing to compare");
        return Ok(DiffSummary::default());
    }

    let planned = reconcile::plan(client, tasks, args.jobs)?;
    if ctx.quiet {
        return Ok(engine::differ::summarize(&planned));
    }

    ui::header("Brocade Diff");
    let summary = engine::display_plan(&planned, ctx.verbose > 0);
    engine::display_orphans(&orphans);
    Ok(summary)
}
