//! Resource kinds and their field tables.
//!
//! Each remote type implements [`Kind`] by pointing at a static
//! [`FieldTable`]. [`ResourceKind`] names the kinds at runtime so callers can
//! hold mixed batches and dispatch without generics.

mod pool;
mod traffic_ip_group;

use crate::diff::{FieldDrift, drift};
use crate::error::Result;
use crate::field::FieldState;
use crate::mapping::FieldTable;
use crate::pipeline::{Handle, Reconciler};
use crate::record::Record;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use stingray::{Client, ConfigResource, Pool, TrafficIpGroup};

/// A remote type with a field mapping table.
pub trait Kind: ConfigResource + 'static {
    fn table() -> &'static FieldTable<Self>;
}

/// Runtime name for a supported kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Pool,
    TrafficIpGroup,
}

impl ResourceKind {
    pub const ALL: [Self; 2] = [Self::Pool, Self::TrafficIpGroup];

    /// Label used in targets, state keys and messages.
    pub fn label(self) -> &'static str {
        match self {
            Self::Pool => Pool::KIND,
            Self::TrafficIpGroup => TrafficIpGroup::KIND,
        }
    }

    pub fn field_names(self) -> Vec<&'static str> {
        match self {
            Self::Pool => Pool::table().fields().iter().map(|f| f.name).collect(),
            Self::TrafficIpGroup => TrafficIpGroup::table()
                .fields()
                .iter()
                .map(|f| f.name)
                .collect(),
        }
    }

    pub fn validate(self, record: &Record) -> Result<()> {
        match self {
            Self::Pool => Pool::table().validate(record),
            Self::TrafficIpGroup => TrafficIpGroup::table().validate(record),
        }
    }

    pub fn with_defaults(self, record: &Record) -> Record {
        match self {
            Self::Pool => Pool::table().with_defaults(record),
            Self::TrafficIpGroup => TrafficIpGroup::table().with_defaults(record),
        }
    }

    pub fn classify(self, record: &Record, field: &str) -> Result<FieldState> {
        match self {
            Self::Pool => Pool::table().classify(record, field),
            Self::TrafficIpGroup => TrafficIpGroup::table().classify(record, field),
        }
    }

    pub fn drift(self, desired: &Record, observed: &Record) -> Vec<FieldDrift> {
        match self {
            Self::Pool => drift(Pool::table(), desired, observed),
            Self::TrafficIpGroup => drift(TrafficIpGroup::table(), desired, observed),
        }
    }

    pub fn create<C: Client>(
        self,
        reconciler: &Reconciler<'_, C>,
        handle: &mut Handle,
        desired: &Record,
    ) -> Result<Option<Record>> {
        match self {
            Self::Pool => reconciler.create::<Pool>(handle, desired),
            Self::TrafficIpGroup => reconciler.create::<TrafficIpGroup>(handle, desired),
        }
    }

    pub fn update<C: Client>(
        self,
        reconciler: &Reconciler<'_, C>,
        handle: &mut Handle,
        desired: &Record,
    ) -> Result<Option<Record>> {
        match self {
            Self::Pool => reconciler.update::<Pool>(handle, desired),
            Self::TrafficIpGroup => reconciler.update::<TrafficIpGroup>(handle, desired),
        }
    }

    pub fn read<C: Client>(
        self,
        reconciler: &Reconciler<'_, C>,
        handle: &mut Handle,
    ) -> Result<Option<Record>> {
        match self {
            Self::Pool => reconciler.read::<Pool>(handle),
            Self::TrafficIpGroup => reconciler.read::<TrafficIpGroup>(handle),
        }
    }

    pub fn delete<C: Client>(self, reconciler: &Reconciler<'_, C>, name: &str) -> Result<()> {
        match self {
            Self::Pool => reconciler.delete::<Pool>(name),
            Self::TrafficIpGroup => reconciler.delete::<TrafficIpGroup>(name),
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ResourceKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.label() == s)
            .ok_or_else(|| {
                format!(
                    "unknown resource kind '{s}' (expected one of: {})",
                    Self::ALL.map(Self::label).join(", ")
                )
            })
    }
}

/// A `kind.name` address of one resource instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceId {
    pub kind: ResourceKind,
    pub name: String,
}

impl ResourceId {
    pub fn new(kind: ResourceKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
        }
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.kind, self.name)
    }
}

impl FromStr for ResourceId {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let (kind, name) = s
            .split_once('.')
            .ok_or_else(|| format!("invalid target '{s}': expected <kind>.<name>"))?;
        if name.is_empty() {
            return Err(format!("invalid target '{s}': name is empty"));
        }
        Ok(Self::new(kind.parse()?, name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Value;

    #[test]
    fn test_kind_labels_round_trip() {
        for kind in ResourceKind::ALL {
            assert_eq!(kind.label().parse::<ResourceKind>().unwrap(), kind);
        }
        assert_eq!(ResourceKind::TrafficIpGroup.to_string(), "traffic_ip_group");
    }

    #[test]
    fn test_unknown_kind() {
        let err = "virtual_server".parse::<ResourceKind>().unwrap_err();
        assert!(err.contains("pool, traffic_ip_group"));
    }

    #[test]
    fn test_resource_id_parse() {
        let id: ResourceId = "pool.web.example".parse().unwrap();
        assert_eq!(id.kind, ResourceKind::Pool);
        assert_eq!(id.name, "web.example");
        assert_eq!(id.to_string(), "pool.web.example");

        assert!("pool".parse::<ResourceId>().is_err());
        assert!("pool.".parse::<ResourceId>().is_err());
        assert!("vs.web".parse::<ResourceId>().is_err());
    }

    #[test]
    fn test_dispatch_validate() {
        let record = Record::named("vip").with("mode", "ec2elastic");
        assert!(ResourceKind::TrafficIpGroup.validate(&record).is_ok());
        assert!(ResourceKind::Pool.validate(&record).is_err());
    }

    #[test]
    fn test_field_names() {
        let names = ResourceKind::Pool.field_names();
        assert!(names.contains(&"nodes"));
        assert!(!names.contains(&"name"));
        assert_eq!(ResourceKind::TrafficIpGroup.field_names().len(), 12);
    }

    #[test]
    fn test_dispatch_with_defaults() {
        let full = ResourceKind::TrafficIpGroup.with_defaults(&Record::named("vip"));
        assert_eq!(full.get("slaves"), Some(&Value::empty_set()));
        assert_eq!(full.get_str("mode"), Some("singlehosted"));
    }
}
