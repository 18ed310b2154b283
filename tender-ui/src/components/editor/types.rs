//! Editor data types

/// Where the section store is in its load cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorePhase {
    /// Nothing requested yet
    #[default]
    Empty,
    LoadingList,
    /// Proposal list loaded, no proposal detail yet
    ListReady,
    LoadingDetail,
    /// A proposal and its sections are loaded and editable
    DetailReady,
    /// The last list or detail load failed
    Error,
}

/// Save state for the active section
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SaveState {
    #[default]
    Idle,
    /// Save in progress
    Saving,
    /// Recently saved (show success briefly)
    Saved,
    /// Last save failed with message
    Failed(String),
}

impl SaveState {
    pub fn is_saving(&self) -> bool {
        matches!(self, Self::Saving)
    }
}
