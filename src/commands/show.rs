//! `brocade show` - list tracked objects and their observed values

use anyhow::Result;
use colored::Colorize;
use reconcile::{FieldState, NAME_FIELD, Record, ResourceId, ResourceKind, Value};
use std::collections::BTreeMap;

use crate::Context;
use crate::cli::ShowArgs;
use crate::state::{BrocadeState, ResourceState};
use crate::ui;

pub fn run(ctx: &Context, args: &ShowArgs) -> Result<()> {
    let state = BrocadeState::load(&super::state_path(ctx)?)?;

    if args.json {
        println!("{}", to_json(&state, args)?);
        return Ok(());
    }

    let entries = state.entries(args.target.as_ref());
    if entries.is_empty() {
        ui::info("No tracked objects");
        return Ok(());
    }

    ui::header("Tracked Objects");
    ui::kv("Last updated", &state.last_updated.to_rfc3339());

    let mut current_kind = None;
    for (id, entry) in &entries {
        if current_kind != Some(id.kind) {
            ui::section(kind_title(id.kind));
            current_kind = Some(id.kind);
        }
        show_entry(id, entry, args.all);
    }

    println!();
    let counts: Vec<String> = state
        .counts()
        .iter()
        .map(|(kind, n)| format!("{n} {kind}"))
        .collect();
    ui::dim(&format!("Tracked: {}", counts.join(", ")));
    Ok(())
}

fn show_entry(id: &ResourceId, entry: &ResourceState, all: bool) {
    if !entry.handle.is_tracked() {
        println!(
            "  {} {} {}",
            "✗".red(),
            id.name.bold(),
            "(deleted outside brocade)".dimmed()
        );
        return;
    }

    let applied = entry
        .last_applied
        .map_or_else(|| "never applied".to_string(), |t| format!("applied {}", t.to_rfc3339()));
    println!("  {} {} {}", "●".green(), id.name.bold(), applied.dimmed());

    let Some(observed) = &entry.observed else {
        ui::dim("not refreshed yet");
        return;
    };

    let (fields, hidden) = visible_fields(id.kind, observed, all);
    for (field, value, state) in fields {
        ui::field(field, value, state);
    }
    if hidden > 0 {
        ui::dim(&format!("{hidden} fields at their default (use --all to list)"));
    }
}

/// Fields worth printing, and how many default-valued ones were hidden.
fn visible_fields(
    kind: ResourceKind,
    record: &Record,
    all: bool,
) -> (Vec<(&str, &Value, FieldState)>, usize) {
    let mut visible = Vec::new();
    let mut hidden = 0;

    for (field, value) in record.iter() {
        if field == NAME_FIELD {
            continue;
        }
        let state = kind.classify(record, field).unwrap_or(FieldState::Custom);
        if state == FieldState::Custom || all {
            visible.push((field, value, state));
        } else {
            hidden += 1;
        }
    }

    (visible, hidden)
}

fn to_json(state: &BrocadeState, args: &ShowArgs) -> Result<String> {
    let entries: BTreeMap<String, &ResourceState> = state
        .entries(args.target.as_ref())
        .into_iter()
        .map(|(id, entry)| (id.to_string(), entry))
        .collect();
    Ok(serde_json::to_string_pretty(&entries)?)
}

fn kind_title(kind: ResourceKind) -> &'static str {
    match kind {
        ResourceKind::Pool => "Pools",
        ResourceKind::TrafficIpGroup => "Traffic IP Groups",
    }
}
