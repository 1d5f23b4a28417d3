pub mod controller;
pub mod form;
pub mod gesture;
pub mod notes;
pub mod optimistic;

pub use controller::{AccountsPage, EditorMode, LoadState, Modal};
pub use form::{FormDraft, FormField};
pub use gesture::{GestureOutcome, PullToRefresh};
