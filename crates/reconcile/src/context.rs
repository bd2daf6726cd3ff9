//! Progress reporting hooks
//!
//! The executor reports through this trait so the crate stays free of any
//! terminal UI.

use crate::types::ApplyResult;

/// Progress callback for execution operations
pub trait ProgressCallback: Send {
    /// Called once the batch is planned, with the number of instances to apply
    fn on_batch_start(&mut self, count: usize);

    /// Called when an instance finishes, in batch order
    fn on_resource_complete(&mut self, id: &str, result: &ApplyResult);

    /// Called when a batch completes
    fn on_batch_complete(&mut self);
}

/// No-op progress callback
pub struct NoProgress;

impl ProgressCallback for NoProgress {
    fn on_batch_start(&mut self, _count: usize) {}
    fn on_resource_complete(&mut self, _id: &str, _result: &ApplyResult) {}
    fn on_batch_complete(&mut self) {}
}
