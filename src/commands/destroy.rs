//! `brocade destroy` - delete one object and forget it

use anyhow::{Context as _, Result};
use reconcile::Reconciler;
use std::path::Path;
use stingray::Client;

use super::Confirm;
use crate::Context;
use crate::cli::DestroyArgs;
use crate::state::BrocadeState;
use crate::ui;

pub fn run(ctx: &Context, args: &DestroyArgs) -> Result<()> {
    let client = super::connect(ctx)?;
    let state_path = super::state_path(ctx)?;
    let confirm = super::confirmer(args.yes);
    execute(ctx, &client, &state_path, args, confirm.as_ref())?;
    Ok(())
}

/// Delete `args.target`; returns whether anything was deleted.
pub fn execute<C: Client>(
    ctx: &Context,
    client: &C,
    state_path: &Path,
    args: &DestroyArgs,
    confirm: &dyn Confirm,
) -> Result<bool> {
    let id = &args.target;
    let mut state = BrocadeState::load(state_path)?;

    if !state.handle(id).is_tracked() {
        ui::warn(&format!("{id} is not tracked by brocade"));
    }

    if !confirm.confirm(&format!("Delete {id} from the traffic manager?"), false)? {
        ui::info("Aborted");
        return Ok(false);
    }

    id.kind
        .delete(&Reconciler::new(client), &id.name)
        .with_context(|| format!("Failed to delete {id}"))?;

    state.forget(id);
    state.save(state_path)?;

    if !ctx.quiet {
        ui::success(&format!("Deleted {id}"));
    }
    Ok(true)
}
