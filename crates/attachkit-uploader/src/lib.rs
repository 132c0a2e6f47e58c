//! Resumable upload driver.
//!
//! Streams queued items through an [`UploadTransport`] collaborator,
//! strictly one at a time, updating item status and per-item progress as
//! bytes move. A transport failure stops the batch at the failing item;
//! whatever happened, the scope's queue is flushed before the batch call
//! returns.

mod driver;
mod progress;
mod transport;

pub use driver::{BatchError, BatchReport, UploadDriver};
pub use progress::ProgressTracker;
pub use transport::{UploadError, UploadResult, UploadSession, UploadTransport};
