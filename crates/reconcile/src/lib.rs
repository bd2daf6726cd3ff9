//! # Reconcile
//!
//! Declarative reconciliation of Brocade vTM configuration objects.
//!
//! A caller declares each object as a desired [`Record`]. The crate converts
//! it to the traffic manager's document shape, writes it, reads it back and
//! projects the response into an observed record, tracking which object an
//! instance is bound to through a [`Handle`].
//!
//! ## Core Concepts
//!
//! - **Record**: flat field map for desired and observed state
//! - **FieldTable**: per-kind mapping between record fields and remote
//!   attributes, with defaults and write policy
//! - **Reconciler**: create-or-update, read and delete for one instance
//! - **Executor**: refreshes, plans and applies a batch in parallel
//!
//! ## Example
//!
//! ```
//! use reconcile::{Handle, Reconciler, Record, Value};
//! use stingray::{MockClient, Pool};
//!
//! let client = MockClient::new();
//! let reconciler = Reconciler::new(&client);
//! let mut handle = Handle::default();
//!
//! let desired = Record::named("web").with("monitors", Value::set(["ping"]));
//! let observed = reconciler.create::<Pool>(&mut handle, &desired)?;
//!
//! assert_eq!(handle.id(), Some("web"));
//! assert_eq!(observed.unwrap().get_int("dns_autoscale_port"), Some(80));
//! # Ok::<(), reconcile::Error>(())
//! ```
//!
//! ## Provider Traits
//!
//! - [`stingray::Client`]: the REST capability, real or mocked
//! - [`ProgressCallback`]: receives batch progress updates

pub mod collection;
pub mod context;
pub mod diff;
pub mod error;
pub mod executor;
pub mod field;
pub mod kinds;
pub mod mapping;
pub mod pipeline;
pub mod record;
pub mod types;

// Re-export main types at crate root
pub use context::{NoProgress, ProgressCallback};
pub use diff::{Change, DiffSummary, FieldDrift, drift};
pub use error::{Error, Result};
pub use executor::{ExecuteReport, Outcome, PlannedTask, Task, apply, execute, plan};
pub use field::FieldState;
pub use kinds::{Kind, ResourceId, ResourceKind};
pub use mapping::{FieldDefault, FieldSpec, FieldTable, WritePolicy};
pub use pipeline::{Handle, Reconciler};
pub use record::{FieldType, NAME_FIELD, Record, Value};
pub use types::{ApplyResult, ExecuteOptions, ExecuteSummary};
