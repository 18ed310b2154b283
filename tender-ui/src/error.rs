//! Client error types
//!
//! `ApiError` covers everything that can go wrong talking to the backend.
//! `EditorError` covers requests rejected locally, before any network call.
//! Both render as the message shown in the UI error slot.

use shared_types::{ProposalId, SectionId};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApiError {
    /// The request never completed (offline, CORS, DNS, aborted).
    #[error("Request failed: {0}")]
    Transport(String),

    /// Non-2xx response. `message` is the backend `detail` or `HTTP {status}`.
    #[error("{message}")]
    Http { status: u16, message: String },

    /// A 2xx response whose body did not match the expected shape.
    #[error("Failed to parse response: {0}")]
    Decode(String),
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EditorError {
    #[error("proposal {0} is not in the loaded list")]
    UnknownProposal(ProposalId),

    #[error("section index {index} out of range for {len} sections")]
    SectionOutOfRange { index: usize, len: usize },

    #[error("no proposal is loaded")]
    NotReady,

    #[error("no section is selected")]
    NoActiveSection,

    #[error("section {0} is already being saved")]
    SaveInProgress(SectionId),

    #[error("an assist request is already running")]
    AssistBusy,

    #[error("a search is already running")]
    QueryBusy,

    #[error("query is empty")]
    EmptyQuery,

    #[error("there is no assist result to insert")]
    NothingToInsert,
}
