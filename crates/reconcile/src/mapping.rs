//! Field mapper - one engine driven by a declarative table per kind.
//!
//! A [`FieldTable`] lists every field of a resource kind: the record field
//! name, the remote attribute it lives in, its type, its default and its
//! write policy. The same engine translates desired records into remote
//! documents and remote documents back into observed records.
//!
//! ```ignore
//! let table = FieldTable::<Pool>::new()
//!     .string("note", "", lens!(Pool: basic.note))
//!     .int("dns_autoscale_port", 80, lens!(Pool: dns_autoscale.port))
//!     .set("monitors", lens!(Pool: basic.monitors));
//! ```

use crate::collection::{build_node_table, project_nodes, to_ordered_list, to_set};
use crate::error::{Error, Result};
use crate::field::{self, FieldState};
use crate::record::{FieldType, NAME_FIELD, Record, Value};
use stingray::{ConfigResource, NodeRecord};

/// Accessors for one optional attribute inside a remote document.
pub struct Lens<R, T> {
    /// `group.attribute` inside `properties`.
    pub path: &'static str,
    pub get: fn(&R) -> &Option<T>,
    pub get_mut: fn(&mut R) -> &mut Option<T>,
}

/// Build a [`Lens`] for `properties.<group>.<attribute>` of a resource type.
macro_rules! lens {
    ($ty:ident : $group:ident . $attr:ident) => {
        $crate::mapping::Lens {
            path: concat!(stringify!($group), ".", stringify!($attr)),
            get: |r: &$ty| &r.properties.$group.$attr,
            get_mut: |r: &mut $ty| &mut r.properties.$group.$attr,
        }
    };
}
pub(crate) use lens;

/// How a remote attribute is typed, and so how values are converted.
pub enum Binding<R> {
    String(Lens<R, String>),
    Int(Lens<R, i64>),
    Bool(Lens<R, bool>),
    /// Ordered string list on the wire, set in records.
    List(Lens<R, Vec<String>>),
    /// Pool node table on the wire, set of addresses in records.
    Nodes(Lens<R, Vec<NodeRecord>>),
}

/// Value written when the desired record leaves a field out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldDefault {
    Str(&'static str),
    Int(i64),
    Bool(bool),
    EmptySet,
}

impl FieldDefault {
    pub fn value(self) -> Value {
        match self {
            Self::Str(s) => Value::from(s),
            Self::Int(i) => Value::Int(i),
            Self::Bool(b) => Value::Bool(b),
            Self::EmptySet => Value::empty_set(),
        }
    }
}

/// When a field is included in the remote document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WritePolicy {
    /// Always sent, with the default when the record omits it.
    Always,
    /// Sent only when the record mentions it.
    WhenPresent,
}

/// One row of a field table.
pub struct FieldSpec<R> {
    pub name: &'static str,
    pub default: FieldDefault,
    pub policy: WritePolicy,
    pub binding: Binding<R>,
}

impl<R> FieldSpec<R> {
    /// Record-side type of the field.
    pub fn field_type(&self) -> FieldType {
        match self.binding {
            Binding::String(_) => FieldType::String,
            Binding::Int(_) => FieldType::Int,
            Binding::Bool(_) => FieldType::Bool,
            Binding::List(_) | Binding::Nodes(_) => FieldType::Set,
        }
    }

    /// Remote attribute path, e.g. `basic.nodes_table`.
    pub fn path(&self) -> &'static str {
        match &self.binding {
            Binding::String(l) => l.path,
            Binding::Int(l) => l.path,
            Binding::Bool(l) => l.path,
            Binding::List(l) => l.path,
            Binding::Nodes(l) => l.path,
        }
    }

    fn write(&self, kind: &'static str, remote: &mut R, value: Value, is_set: bool) -> Result<()> {
        match (&self.binding, value) {
            (Binding::String(l), Value::String(s)) => {
                *(l.get_mut)(remote) = field::encode(s, is_set);
            }
            (Binding::Int(l), Value::Int(i)) => *(l.get_mut)(remote) = field::encode(i, is_set),
            (Binding::Bool(l), Value::Bool(b)) => *(l.get_mut)(remote) = field::encode(b, is_set),
            (Binding::List(l), Value::Set(s)) => {
                *(l.get_mut)(remote) = field::encode(to_ordered_list(&s), is_set);
            }
            (Binding::Nodes(l), Value::Set(s)) => {
                *(l.get_mut)(remote) = field::encode(build_node_table(&s), is_set);
            }
            (_, other) => {
                return Err(Error::TypeMismatch {
                    kind,
                    field: self.name.to_string(),
                    expected: self.field_type().name(),
                    found: other.field_type().name(),
                });
            }
        }
        Ok(())
    }

    fn is_present(&self, remote: &R) -> bool {
        match &self.binding {
            Binding::String(l) => (l.get)(remote).is_some(),
            Binding::Int(l) => (l.get)(remote).is_some(),
            Binding::Bool(l) => (l.get)(remote).is_some(),
            Binding::List(l) => (l.get)(remote).is_some(),
            Binding::Nodes(l) => (l.get)(remote).is_some(),
        }
    }

    fn read(&self, kind: &'static str, name: &str, remote: &R) -> Result<Value> {
        let missing = || Error::MissingField {
            kind,
            name: name.to_string(),
            field: self.name,
        };
        let value = match &self.binding {
            Binding::String(l) => Value::String(field::decode((l.get)(remote), missing)?),
            Binding::Int(l) => Value::Int(field::decode((l.get)(remote), missing)?),
            Binding::Bool(l) => Value::Bool(field::decode((l.get)(remote), missing)?),
            Binding::List(l) => Value::Set(to_set(field::decode((l.get)(remote), missing)?)),
            Binding::Nodes(l) => {
                Value::Set(project_nodes(&field::decode((l.get)(remote), missing)?))
            }
        };
        Ok(value)
    }
}

/// Field mapping table for one resource kind.
pub struct FieldTable<R> {
    kind: &'static str,
    fields: Vec<FieldSpec<R>>,
}

impl<R: ConfigResource> FieldTable<R> {
    /// Empty table for `R`.
    pub fn new() -> Self {
        Self {
            kind: R::KIND,
            fields: Vec::new(),
        }
    }

    fn push(mut self, name: &'static str, default: FieldDefault, binding: Binding<R>) -> Self {
        debug_assert!(
            self.fields.iter().all(|f| f.name != name),
            "duplicate field {name}"
        );
        self.fields.push(FieldSpec {
            name,
            default,
            policy: WritePolicy::Always,
            binding,
        });
        self
    }

    pub fn string(self, name: &'static str, default: &'static str, lens: Lens<R, String>) -> Self {
        self.push(name, FieldDefault::Str(default), Binding::String(lens))
    }

    pub fn int(self, name: &'static str, default: i64, lens: Lens<R, i64>) -> Self {
        self.push(name, FieldDefault::Int(default), Binding::Int(lens))
    }

    pub fn bool(self, name: &'static str, default: bool, lens: Lens<R, bool>) -> Self {
        self.push(name, FieldDefault::Bool(default), Binding::Bool(lens))
    }

    /// A string set stored as a list; defaults to empty.
    pub fn set(self, name: &'static str, lens: Lens<R, Vec<String>>) -> Self {
        self.push(name, FieldDefault::EmptySet, Binding::List(lens))
    }

    /// A node address set stored as a node table; defaults to empty.
    pub fn nodes(self, name: &'static str, lens: Lens<R, Vec<NodeRecord>>) -> Self {
        self.push(name, FieldDefault::EmptySet, Binding::Nodes(lens))
    }

    /// Switch the most recently added field to [`WritePolicy::WhenPresent`].
    pub fn when_present(mut self) -> Self {
        if let Some(last) = self.fields.last_mut() {
            last.policy = WritePolicy::WhenPresent;
        }
        self
    }

    pub fn kind(&self) -> &'static str {
        self.kind
    }

    pub fn fields(&self) -> &[FieldSpec<R>] {
        &self.fields
    }

    /// Look up a field by name.
    pub fn field(&self, name: &str) -> Result<&FieldSpec<R>> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .ok_or_else(|| Error::UnknownField {
                kind: self.kind,
                field: name.to_string(),
            })
    }

    /// Check every record field against the table.
    ///
    /// Unknown names and wrong value types are rejected. Missing fields are
    /// fine; they take their default or are left out, per write policy.
    pub fn validate(&self, record: &Record) -> Result<()> {
        for (name, value) in record.iter() {
            let expected = if name == NAME_FIELD {
                FieldType::String
            } else {
                self.field(name)?.field_type()
            };
            if value.field_type() != expected {
                return Err(Error::TypeMismatch {
                    kind: self.kind,
                    field: name.to_string(),
                    expected: expected.name(),
                    found: value.field_type().name(),
                });
            }
        }
        Ok(())
    }

    /// The record with every always-written field filled in.
    pub fn with_defaults(&self, record: &Record) -> Record {
        let mut full = record.clone();
        for spec in &self.fields {
            if spec.policy == WritePolicy::Always && !full.contains(spec.name) {
                full.insert(spec.name, spec.default.value());
            }
        }
        full
    }

    /// Build the remote document for a desired record.
    pub fn to_remote(&self, desired: &Record) -> Result<R> {
        self.validate(desired)?;
        let name = desired
            .name()
            .filter(|n| !n.is_empty())
            .ok_or(Error::MissingName { kind: self.kind })?;

        let mut remote = R::named(name);
        for spec in &self.fields {
            let given = desired.get(spec.name);
            let is_set = given.is_some() || spec.policy == WritePolicy::Always;
            let value = given.cloned().unwrap_or_else(|| spec.default.value());
            spec.write(self.kind, &mut remote, value, is_set)?;
        }
        Ok(remote)
    }

    /// Project a remote document into a fully populated record.
    ///
    /// Every always-written field must be present in the response; fields
    /// written only when present are left out if the server omits them.
    pub fn to_observed(&self, remote: &R) -> Result<Record> {
        let mut record = Record::named(remote.name());
        for spec in &self.fields {
            if spec.policy == WritePolicy::WhenPresent && !spec.is_present(remote) {
                continue;
            }
            record.insert(spec.name, spec.read(self.kind, remote.name(), remote)?);
        }
        Ok(record)
    }

    /// Whether a record holds the default, a custom value, or nothing.
    pub fn classify(&self, record: &Record, name: &str) -> Result<FieldState> {
        let spec = self.field(name)?;
        Ok(field::classify(record.get(name), &spec.default.value()))
    }
}

impl<R: ConfigResource> Default for FieldTable<R> {
    fn default() -> Self {
        Self::new()
    }
}
