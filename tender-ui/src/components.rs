pub mod editor;
pub mod search;

pub use editor::ProposalEditorView;
pub use search::SearchView;
