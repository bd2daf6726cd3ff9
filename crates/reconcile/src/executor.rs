//! Batch executor - reconciles many independent instances with parallelism

use crate::context::ProgressCallback;
use crate::diff::Change;
use crate::error::Result;
use crate::kinds::ResourceId;
use crate::pipeline::{Handle, Reconciler};
use crate::record::Record;
use crate::types::{ApplyResult, ExecuteOptions, ExecuteSummary};
use log::debug;
use rayon::prelude::*;
use stingray::Client;

/// One instance to reconcile.
#[derive(Debug, Clone)]
pub struct Task {
    pub id: ResourceId,
    pub handle: Handle,
    /// `None` deletes the tracked object.
    pub desired: Option<Record>,
}

impl Task {
    /// Converge the object towards `desired`.
    pub fn converge(id: ResourceId, handle: Handle, desired: Record) -> Self {
        Self {
            id,
            handle,
            desired: Some(desired),
        }
    }

    /// Delete the object behind `handle`.
    pub fn remove(id: ResourceId, handle: Handle) -> Self {
        Self {
            id,
            handle,
            desired: None,
        }
    }
}

/// What happened to one instance.
#[derive(Debug, Clone)]
pub struct Outcome {
    pub id: ResourceId,
    /// Handle after the run; cleared if the object turned out to be gone.
    pub handle: Handle,
    /// Latest observed record, `None` if absent or not known.
    pub observed: Option<Record>,
    /// Planned change, `None` if the refresh failed.
    pub change: Option<Change>,
    pub result: ApplyResult,
}

/// Outcomes in task order, with their totals.
#[derive(Debug, Clone, Default)]
pub struct ExecuteReport {
    pub outcomes: Vec<Outcome>,
    pub summary: ExecuteSummary,
}

/// A refreshed task with its planned change.
#[derive(Debug, Clone)]
pub struct PlannedTask {
    /// The task, with its handle cleared if the object turned out to be gone.
    pub task: Task,
    pub observed: Option<Record>,
    /// The planned change, or the refresh error.
    pub change: std::result::Result<Change, String>,
}

impl PlannedTask {
    /// Whether applying this task would write or delete anything.
    pub fn needs_apply(&self) -> bool {
        self.change.as_ref().is_ok_and(Change::is_change)
    }
}

fn worker_pool(jobs: usize) -> Result<rayon::ThreadPool> {
    Ok(rayon::ThreadPoolBuilder::new()
        .num_threads(jobs.max(1))
        .build()?)
}

/// Refresh, plan and apply a batch of tasks.
///
/// Every task is refreshed first and compared with its desired record.
/// Instances already in sync are reported as [`ApplyResult::NoChange`]; the
/// rest are applied in parallel on `opts.jobs` threads. A failure only fails
/// its own instance.
pub fn execute<C, P>(
    client: &C,
    tasks: Vec<Task>,
    opts: &ExecuteOptions,
    progress: &mut P,
) -> Result<ExecuteReport>
where
    C: Client,
    P: ProgressCallback,
{
    let planned = plan(client, tasks, opts.jobs)?;
    apply(client, planned, opts, progress)
}

/// Refresh every task in parallel and work out its change.
pub fn plan<C: Client>(client: &C, tasks: Vec<Task>, jobs: usize) -> Result<Vec<PlannedTask>> {
    if tasks.is_empty() {
        return Ok(Vec::new());
    }

    let reconciler = Reconciler::new(client);
    let planned: Vec<PlannedTask> = worker_pool(jobs)?.install(|| {
        tasks
            .into_par_iter()
            .map(|task| plan_task(&reconciler, task))
            .collect()
    });

    debug!(
        "{} of {} instances need changes",
        planned.iter().filter(|p| p.needs_apply()).count(),
        planned.len()
    );
    Ok(planned)
}

/// Apply planned tasks in parallel, reporting each applied change.
///
/// With `opts.dry_run` nothing is written and pending changes come back as
/// [`ApplyResult::Skipped`].
pub fn apply<C, P>(
    client: &C,
    planned: Vec<PlannedTask>,
    opts: &ExecuteOptions,
    progress: &mut P,
) -> Result<ExecuteReport>
where
    C: Client,
    P: ProgressCallback,
{
    if planned.is_empty() {
        return Ok(ExecuteReport::default());
    }

    let pending = planned.iter().filter(|p| p.needs_apply()).count();
    progress.on_batch_start(pending);

    let reconciler = Reconciler::new(client);
    let outcomes: Vec<Outcome> = worker_pool(opts.jobs)?.install(|| {
        planned
            .into_par_iter()
            .map(|p| apply_task(&reconciler, p, opts.dry_run))
            .collect()
    });

    let mut summary = ExecuteSummary::default();
    for outcome in &outcomes {
        if outcome.change.as_ref().is_some_and(Change::is_change) {
            progress.on_resource_complete(&outcome.id.to_string(), &outcome.result);
        }
        summary.add_result(&outcome.result);
    }
    progress.on_batch_complete();

    Ok(ExecuteReport { outcomes, summary })
}

/// Refresh one task and work out what it needs.
fn plan_task<C: Client>(reconciler: &Reconciler<'_, C>, mut task: Task) -> PlannedTask {
    let kind = task.id.kind;
    let observed = match kind.read(reconciler, &mut task.handle) {
        Ok(observed) => observed,
        Err(e) => {
            return PlannedTask {
                task,
                observed: None,
                change: Err(e.to_string()),
            };
        }
    };

    let change = match &task.desired {
        Some(desired) => Change::plan(observed.as_ref(), |obs| kind.drift(desired, obs)),
        None if observed.is_some() => Change::Remove,
        None => Change::InSync,
    };

    PlannedTask {
        task,
        observed,
        change: Ok(change),
    }
}

fn apply_task<C: Client>(
    reconciler: &Reconciler<'_, C>,
    planned: PlannedTask,
    dry_run: bool,
) -> Outcome {
    let PlannedTask {
        task,
        observed,
        change,
    } = planned;
    let Task {
        id,
        mut handle,
        desired,
    } = task;

    let change = match change {
        Ok(change) => change,
        Err(error) => {
            return Outcome {
                id,
                handle,
                observed,
                change: None,
                result: ApplyResult::Failed { error },
            };
        }
    };

    if !change.is_change() {
        return Outcome {
            id,
            handle,
            observed,
            change: Some(change),
            result: ApplyResult::NoChange,
        };
    }
    if dry_run {
        return Outcome {
            id,
            handle,
            observed,
            change: Some(change),
            result: ApplyResult::Skipped {
                reason: "dry run".into(),
            },
        };
    }

    let kind = id.kind;
    let applied = match (&change, &desired) {
        (Change::Create, Some(desired)) => kind
            .create(reconciler, &mut handle, desired)
            .map(|obs| (obs, ApplyResult::Created)),
        (Change::Update(_), Some(desired)) => kind
            .update(reconciler, &mut handle, desired)
            .map(|obs| (obs, ApplyResult::Modified)),
        _ => kind
            .delete(reconciler, &id.name)
            .map(|()| (None, ApplyResult::Removed)),
    };

    match applied {
        Ok((observed, result)) => Outcome {
            id,
            handle,
            observed,
            change: Some(change),
            result,
        },
        Err(e) => Outcome {
            id,
            handle,
            observed,
            change: Some(change),
            result: ApplyResult::Failed {
                error: e.to_string(),
            },
        },
    }
}
