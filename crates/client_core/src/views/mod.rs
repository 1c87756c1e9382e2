//! View controllers: each mounts against an entity store, reacts to one interaction and renders text.

pub mod delete;
pub mod detail;
pub mod form;
pub mod list;

pub use delete::DeleteDialog;
pub use detail::DetailView;
pub use form::{FormMode, FormValues, SubmitError, UpdateView};
pub use list::{ListView, PaginationState};
