//! Client-side attachment state.
//!
//! Holds the four collections tracked per target (existing attachments,
//! staged removals, the upload queue, and library selections) plus the same
//! four as draft buffers for an entity that has no id yet. All mutation goes
//! through [`AttachmentState`]; UI-facing callers use the per-target
//! [`TargetAttachments`] facade, which fixes its scope once at construction.

mod facade;
mod scope;
mod state;

pub use facade::{shared_state, SharedState, TargetAttachments};
pub use scope::Scope;
pub use state::AttachmentState;
