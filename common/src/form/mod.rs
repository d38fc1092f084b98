//! The device form state machine and its collaborators.
//!
//! `FormController` owns the [`Draft`](crate::model::draft::Draft). UI code
//! translates events into calls on the controller and renders from its
//! accessors; every remote call stays in the UI layer and reports back
//! through the controller so stale completions can be discarded.

pub mod auth;
pub mod controller;
pub mod preview;
pub mod slug;
pub mod store;
pub mod submission;
pub mod validation;

pub use controller::{FormController, RestoreOutcome, SlugCheckTicket, SlugStatus, SubmitEffect};
pub use store::{DraftStore, MemoryStore, StoreError};
pub use validation::{Field, FieldErrors, ValidationPhase};

/// Storage key the draft is written under.
pub const DRAFT_STORAGE_KEY: &str = "deviceEditorFormData";

/// Trailing-edge delay before a slug availability check starts.
pub const SLUG_CHECK_DEBOUNCE_MS: u32 = 500;

/// Default lifetime of a toast notification.
pub const TOAST_DURATION_MS: u32 = 3000;
