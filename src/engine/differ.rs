//! Plan display - brocade-specific UI

use colored::Colorize;
use reconcile::{Change, DiffSummary, FieldDrift, PlannedTask, ResourceId, ResourceKind};
use std::collections::BTreeMap;

/// Display the planned changes in a user-friendly format.
///
/// Objects already in sync are only listed when `verbose` is set.
pub fn display_plan(planned: &[PlannedTask], verbose: bool) -> DiffSummary {
    let summary = summarize(planned);
    let failed = planned.iter().filter(|p| p.change.is_err()).count();

    if !summary.has_changes() && failed == 0 {
        println!();
        println!("  {} No changes needed", "✓".green());
        return summary;
    }

    let mut by_kind: BTreeMap<ResourceKind, Vec<&PlannedTask>> = BTreeMap::new();
    for p in planned {
        if !verbose && matches!(p.change, Ok(Change::InSync)) {
            continue;
        }
        by_kind.entry(p.task.id.kind).or_default().push(p);
    }

    println!();
    println!(
        "┌─ {} ─────────────────────────────────────────┐",
        "Reconcile Plan".bold()
    );
    println!("│");

    for (kind, tasks) in &by_kind {
        println!("│ {}", kind_title(*kind).bold());

        for p in tasks {
            let name = &p.task.id.name;
            match &p.change {
                Ok(Change::Create) => {
                    println!("│   {} {:<30} {}", "+".green(), name, "(absent)".dimmed());
                }
                Ok(Change::Update(drifts)) => {
                    let desc = format!("({} fields)", drifts.len());
                    println!("│   {} {:<30} {}", "~".yellow(), name, desc.dimmed());
                    for drift in drifts {
                        println!("│       {}", drift_line(drift).dimmed());
                    }
                }
                Ok(Change::Remove) => {
                    println!("│   {} {:<30} {}", "-".red(), name, "(will delete)".dimmed());
                }
                Ok(Change::InSync) => {
                    println!("│   {} {:<30} {}", "=".dimmed(), name, "(in sync)".dimmed());
                }
                Err(error) => {
                    println!("│   {} {:<30} {}", "!".red(), name, error.red());
                }
            }
        }
        println!("│");
    }

    println!("├─────────────────────────────────────────────────────┤");
    println!(
        "│ Summary: {} to add, {} to change, {} to delete, {} in sync",
        summary.additions.to_string().green(),
        summary.modifications.to_string().yellow(),
        summary.removals.to_string().red(),
        summary.in_sync
    );
    if failed > 0 {
        println!("│          {} could not be read", failed.to_string().red());
    }
    println!("└─────────────────────────────────────────────────────┘");

    summary
}

/// Warn about tracked objects that left the manifest
pub fn display_orphans(orphans: &[ResourceId]) {
    if orphans.is_empty() {
        return;
    }
    println!();
    println!(
        "  {} {} tracked objects are not in the manifest (use --prune to delete):",
        "⚠".yellow(),
        orphans.len()
    );
    for id in orphans {
        println!("    • {id}");
    }
}

/// Count planned changes; failed refreshes are left out.
pub fn summarize(planned: &[PlannedTask]) -> DiffSummary {
    let mut summary = DiffSummary::default();
    for change in planned.iter().filter_map(|p| p.change.as_ref().ok()) {
        summary.add(change);
    }
    summary
}

fn kind_title(kind: ResourceKind) -> &'static str {
    match kind {
        ResourceKind::Pool => "Pools",
        ResourceKind::TrafficIpGroup => "Traffic IP groups",
    }
}

fn drift_line(drift: &FieldDrift) -> String {
    let observed = drift
        .observed
        .as_ref()
        .map_or_else(|| "(unset)".to_string(), ToString::to_string);
    format!("{}: {} → {}", drift.field, observed, drift.desired)
}

#[cfg(test)]
mod tests {
    use super::*;
    use reconcile::{Handle, Record, Task, Value};

    fn planned(name: &str, change: Result<Change, String>) -> PlannedTask {
        let id = ResourceId::new(ResourceKind::Pool, name);
        PlannedTask {
            task: Task::converge(id, Handle::default(), Record::named(name)),
            observed: None,
            change,
        }
    }

    #[test]
    fn test_summarize_skips_failures() {
        let plan = vec![
            planned("a", Ok(Change::Create)),
            planned("b", Ok(Change::InSync)),
            planned("c", Ok(Change::Update(Vec::new()))),
            planned("d", Err("HTTP 500".into())),
        ];
        let summary = summarize(&plan);
        assert_eq!(summary.additions, 1);
        assert_eq!(summary.modifications, 1);
        assert_eq!(summary.in_sync, 1);
        assert_eq!(summary.total(), 2);
    }

    #[test]
    fn test_drift_line() {
        let drift = FieldDrift {
            field: "dns_autoscale_port".into(),
            desired: Value::Int(8080),
            observed: Some(Value::Int(80)),
        };
        assert_eq!(drift_line(&drift), "dns_autoscale_port: 80 → 8080");

        let unset = FieldDrift {
            field: "monitors".into(),
            desired: Value::set(["ping"]),
            observed: None,
        };
        assert_eq!(drift_line(&unset), "monitors: (unset) → [\"ping\"]");
    }
}
