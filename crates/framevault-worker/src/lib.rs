//! Framevault Worker Library
//!
//! Asynchronous frame extraction: the `JobQueue` seam, an in-process bounded
//! queue with a worker pool, an SQS-backed queue for deployments with a
//! remote broker, and the terminal job handler.

pub mod processor;
pub mod queue;
pub mod sqs;

pub use processor::ProcessVideoHandler;
pub use queue::{JobQueue, LocalJobQueue};
pub use sqs::{run_sqs_consumer, SqsJobQueue};
