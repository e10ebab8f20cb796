//! Use cases - User story orchestration.
//!
//! Each module covers one step of turning row edits into a document patch:
//! rows are created, removed and rebound in the UI model, submissions are
//! merged into keyed collections, assembled into a patch and applied through
//! the document store one submission at a time per document.

pub mod assemble;
pub mod merge;
pub mod rows;
pub mod session;
pub mod submit;
pub mod view;

// Re-export main types
pub use assemble::SubmissionAssembler;
pub use merge::{
    KeyedCollectionMerger, MergeError, MergePolicy, MergeReport, MergedCollection,
};
pub use rows::{create_row, delete_row, rebind_row, rebind_table_row, RebindOutcome, RowError};
pub use session::{
    DispatchOutcome, HandlerOutcome, HandlerRegistry, RowAction, RowEvent, SessionError,
    SheetSession,
};
pub use submit::{SubmitError, SubmitResult, SubmitSheet};
pub use view::{prepare_view, SheetConfig, SheetView};
