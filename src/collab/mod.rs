pub mod draft;

pub use draft::{derive_draft_id, ApplyError, DraftState, Role, STATUS_COMPLETED, STATUS_EDITING};
