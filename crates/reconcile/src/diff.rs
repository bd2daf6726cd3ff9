//! Drift between desired and observed records

use crate::mapping::FieldTable;
use crate::record::{Record, Value};
use serde::{Deserialize, Serialize};
use stingray::ConfigResource;

/// One field whose observed value differs from the desired one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDrift {
    pub field: String,
    pub desired: Value,
    /// `None` when the observed record lacks the field.
    pub observed: Option<Value>,
}

/// Compare a desired record against an observed one.
///
/// The desired record is first filled with the table's defaults, so a field
/// left out of the desired record drifts when the remote value is not the
/// default. Sets compare as sets. Fields the desired record does not cover
/// are ignored.
pub fn drift<R: ConfigResource>(
    table: &FieldTable<R>,
    desired: &Record,
    observed: &Record,
) -> Vec<FieldDrift> {
    table
        .with_defaults(desired)
        .iter()
        .filter_map(|(field, want)| {
            let have = observed.get(field);
            (have != Some(want)).then(|| FieldDrift {
                field: field.to_string(),
                desired: want.clone(),
                observed: have.cloned(),
            })
        })
        .collect()
}

/// What reconciling one instance would do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change {
    /// Untracked, or deleted out-of-band: create it.
    Create,
    /// Exists with drifted fields.
    Update(Vec<FieldDrift>),
    /// Tracked but no longer wanted: delete it.
    Remove,
    /// Exists and matches.
    InSync,
}

impl Change {
    /// Classify an instance from its refreshed observed record.
    pub fn plan(
        observed: Option<&Record>,
        drift: impl FnOnce(&Record) -> Vec<FieldDrift>,
    ) -> Self {
        match observed {
            None => Self::Create,
            Some(observed) => {
                let drifts = drift(observed);
                if drifts.is_empty() {
                    Self::InSync
                } else {
                    Self::Update(drifts)
                }
            }
        }
    }

    pub fn is_change(&self) -> bool {
        !matches!(self, Self::InSync)
    }
}

/// Counts of planned changes.
#[derive(Debug, Clone, Default)]
pub struct DiffSummary {
    pub additions: usize,
    pub modifications: usize,
    pub removals: usize,
    pub in_sync: usize,
}

impl DiffSummary {
    pub fn add(&mut self, change: &Change) {
        match change {
            Change::Create => self.additions += 1,
            Change::Update(_) => self.modifications += 1,
            Change::Remove => self.removals += 1,
            Change::InSync => self.in_sync += 1,
        }
    }

    /// Total number of changes
    pub fn total(&self) -> usize {
        self.additions + self.modifications + self.removals
    }

    pub fn has_changes(&self) -> bool {
        self.total() > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kinds::Kind;
    use stingray::{Pool, TrafficIpGroup};

    #[test]
    fn test_no_drift_when_observed_matches_defaults() {
        let desired = Record::named("vip");
        let observed = TrafficIpGroup::table().with_defaults(&desired);
        assert!(drift(TrafficIpGroup::table(), &desired, &observed).is_empty());
    }

    #[test]
    fn test_drift_reports_changed_field() {
        let desired =
            Record::named("web").with("nodes", Value::set(["10.0.0.1:80", "10.0.0.2:80"]));
        let observed = Pool::table()
            .with_defaults(&Record::named("web").with("nodes", Value::set(["10.0.0.1:80"])));

        let drifts = drift(Pool::table(), &desired, &observed);
        assert_eq!(drifts.len(), 1);
        assert_eq!(drifts[0].field, "nodes");
        assert_eq!(drifts[0].observed, Some(Value::set(["10.0.0.1:80"])));
    }

    #[test]
    fn test_omitted_field_drifts_back_to_default() {
        let desired = Record::named("vip");
        let observed = TrafficIpGroup::table()
            .with_defaults(&Record::named("vip").with("note", "hand edited"));

        let drifts = drift(TrafficIpGroup::table(), &desired, &observed);
        assert_eq!(drifts.len(), 1);
        assert_eq!(drifts[0].desired, Value::from(""));
    }

    #[test]
    fn test_missing_observed_field_is_drift() {
        let desired = Record::named("vip");
        let drifts = drift(TrafficIpGroup::table(), &desired, &Record::named("vip"));
        assert_eq!(drifts.len(), 12);
        assert!(drifts.iter().all(|d| d.observed.is_none()));
    }

    #[test]
    fn test_change_plan() {
        assert_eq!(Change::plan(None, |_| vec![]), Change::Create);

        let observed = Record::named("web");
        assert_eq!(Change::plan(Some(&observed), |_| vec![]), Change::InSync);

        let change = Change::plan(Some(&observed), |_| {
            vec![FieldDrift {
                field: "note".into(),
                desired: Value::from("x"),
                observed: None,
            }]
        });
        assert!(change.is_change());

        let mut summary = DiffSummary::default();
        summary.add(&change);
        summary.add(&Change::Create);
        summary.add(&Change::InSync);
        summary.add(&Change::Remove);
        assert_eq!(summary.total(), 3);
        assert_eq!(summary.removals, 1);
        assert_eq!(summary.in_sync, 1);
        assert!(summary.has_changes());
    }
}
