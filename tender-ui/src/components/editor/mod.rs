pub mod assist;
pub mod convert;
pub mod session;
pub mod store;
pub mod styles;
pub mod types;
pub mod view;

pub use view::ProposalEditorView;
