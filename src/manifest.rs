//! Desired-state manifest.
//!
//! ```toml
//! [pool.web]
//! nodes = ["10.0.0.1:80", "10.0.0.2:80"]
//! monitors = ["ping"]
//!
//! [traffic_ip_group.vip]
//! ipaddresses = ["10.1.1.1"]
//! machines = ["tm1", "tm2"]
//! ```
//!
//! Every record is validated against its kind's field table at load time.

use anyhow::{Context, Result, bail};
use reconcile::{NAME_FIELD, Record, ResourceId, ResourceKind, Value};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Desired records keyed by `kind.name`.
#[derive(Debug, Clone, Default)]
pub struct Manifest {
    resources: BTreeMap<ResourceId, Record>,
}

impl Manifest {
    /// Load and validate a manifest file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read manifest: {}", path.display()))?;
        let manifest = Self::parse(&content)
            .with_context(|| format!("Invalid manifest: {}", path.display()))?;
        log::debug!(
            "Loaded {} resources from {}",
            manifest.len(),
            path.display()
        );
        Ok(manifest)
    }

    /// Parse and validate manifest TOML
    pub fn parse(content: &str) -> Result<Self> {
        let root: toml::Table = toml::from_str(content).context("Failed to parse TOML")?;
        let mut resources = BTreeMap::new();

        for (kind_key, instances) in root {
            let kind: ResourceKind = kind_key.parse().map_err(anyhow::Error::msg)?;
            let toml::Value::Table(instances) = instances else {
                bail!("[{kind}] must be a table of named resources");
            };

            for (name, fields) in instances {
                let id = ResourceId::new(kind, name);
                let toml::Value::Table(fields) = fields else {
                    bail!("{id} must be a table");
                };
                let record = to_record(&id, fields)?;
                kind.validate(&record).with_context(|| format!("Invalid {id}"))?;
                resources.insert(id, record);
            }
        }

        Ok(Self { resources })
    }

    pub fn resources(&self) -> impl Iterator<Item = (&ResourceId, &Record)> {
        self.resources.iter()
    }

    pub fn contains(&self, id: &ResourceId) -> bool {
        self.resources.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}

fn to_record(id: &ResourceId, fields: toml::Table) -> Result<Record> {
    let mut record = Record::named(id.name.as_str());
    for (field, value) in fields {
        if field == NAME_FIELD {
            bail!("{id}: '{NAME_FIELD}' comes from the table key and cannot be set");
        }
        let value = to_value(&value).with_context(|| format!("{id}: field '{field}'"))?;
        record.insert(field, value);
    }
    Ok(record)
}

fn to_value(value: &toml::Value) -> Result<Value> {
    match value {
        toml::Value::String(s) => Ok(Value::from(s.as_str())),
        toml::Value::Integer(i) => Ok(Value::Int(*i)),
        toml::Value::Boolean(b) => Ok(Value::Bool(*b)),
        toml::Value::Array(items) => items
            .iter()
            .map(|item| match item {
                toml::Value::String(s) => Ok(s.clone()),
                other => bail!("set members must be strings, got {}", other.type_str()),
            })
            .collect::<Result<_>>()
            .map(Value::Set),
        other => bail!("unsupported value type {}", other.type_str()),
    }
}
