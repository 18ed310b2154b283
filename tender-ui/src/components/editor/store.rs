//! Section store: the loaded proposal, its sections, and the edit buffer.
//!
//! Every backend round trip is split in two. A synchronous `begin_*` call
//! validates, bumps the matching generation counter and hands back a ticket;
//! the caller performs the request and passes the outcome to `complete_*`.
//! A completion whose ticket generation is no longer current is dropped, so a
//! slow response for an earlier selection can never repaint newer state.

use shared_types::{
    Proposal, ProposalDetail, ProposalId, ProposalList, Section, SectionId, SectionStatus,
    SectionUpdate,
};

use super::convert::{self, ContentShape};
use super::types::{SaveState, StorePhase};
use crate::error::{ApiError, EditorError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListTicket {
    generation: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum DetailReason {
    Select,
    AfterSave {
        section_id: SectionId,
        saved_buffer: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailTicket {
    generation: u64,
    proposal_id: ProposalId,
    reason: DetailReason,
}

impl DetailTicket {
    pub fn proposal_id(&self) -> ProposalId {
        self.proposal_id
    }

    pub fn is_refresh(&self) -> bool {
        matches!(self.reason, DetailReason::AfterSave { .. })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SaveTicket {
    generation: u64,
    selection: u64,
    proposal_id: ProposalId,
    section_id: SectionId,
    update: SectionUpdate,
    buffer: String,
}

impl SaveTicket {
    pub fn proposal_id(&self) -> ProposalId {
        self.proposal_id
    }

    pub fn section_id(&self) -> SectionId {
        self.section_id
    }

    pub fn update(&self) -> &SectionUpdate {
        &self.update
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Read-only view of the active section handed to the assist orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionContext<'a> {
    pub proposal_title: &'a str,
    pub section_id: SectionId,
    pub section_title: &'a str,
    pub buffer: &'a str,
}

#[derive(Debug, Clone, Default)]
pub struct SectionStore {
    phase: StorePhase,
    proposals: Vec<Proposal>,
    total: u64,
    selected: Option<ProposalId>,
    detail: Option<ProposalDetail>,
    active_index: usize,
    buffer: String,
    dirty: bool,
    pending_status: Option<SectionStatus>,
    save_state: SaveState,
    error: Option<String>,
    list_generation: u64,
    detail_generation: u64,
    save_generation: u64,
    /// Bumped only when a different proposal load starts.
    selection_generation: u64,
}

impl SectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    // ------------------------------------------------------------------
    // Proposal list
    // ------------------------------------------------------------------

    /// Start (or retry) the top-level list load. Allowed from any phase.
    pub fn begin_list_load(&mut self) -> ListTicket {
        self.list_generation += 1;
        if self.detail.is_none() {
            self.phase = StorePhase::LoadingList;
        }
        self.error = None;
        ListTicket {
            generation: self.list_generation,
        }
    }

    /// Apply a list response. Returns a detail ticket when this load
    /// auto-selected the first proposal.
    pub fn complete_list_load(
        &mut self,
        ticket: ListTicket,
        result: Result<ProposalList, ApiError>,
    ) -> Option<DetailTicket> {
        if ticket.generation != self.list_generation {
            log::debug!("dropping stale proposal list response");
            return None;
        }

        match result {
            Ok(list) => {
                log::info!("loaded {} of {} proposals", list.items.len(), list.total);
                self.proposals = list.items;
                self.total = list.total;

                if self.selected.is_some() {
                    match self.phase {
                        StorePhase::LoadingList => self.phase = StorePhase::ListReady,
                        // A failed switch left the earlier proposal loaded.
                        StorePhase::Error if self.detail.is_some() => {
                            self.phase = StorePhase::DetailReady;
                        }
                        _ => {}
                    }
                    return None;
                }
                self.phase = StorePhase::ListReady;
                let first = self.proposals.first().map(|p| p.id)?;
                Some(self.begin_select(first))
            }
            Err(e) => {
                log::warn!("proposal list load failed: {e}");
                self.error = Some(e.to_string());
                if self.detail.is_none() {
                    self.phase = StorePhase::Error;
                }
                None
            }
        }
    }

    // ------------------------------------------------------------------
    // Proposal detail
    // ------------------------------------------------------------------

    pub fn select_proposal(&mut self, id: ProposalId) -> Result<DetailTicket, EditorError> {
        if !self.proposals.iter().any(|p| p.id == id) {
            return Err(EditorError::UnknownProposal(id));
        }
        Ok(self.begin_select(id))
    }

    fn begin_select(&mut self, id: ProposalId) -> DetailTicket {
        self.detail_generation += 1;
        // A save still in flight belongs to the previous selection.
        self.save_generation += 1;
        self.selection_generation += 1;
        self.selected = Some(id);
        self.phase = StorePhase::LoadingDetail;
        self.save_state = SaveState::Idle;
        self.error = None;
        DetailTicket {
            generation: self.detail_generation,
            proposal_id: id,
            reason: DetailReason::Select,
        }
    }

    /// Apply a detail response. Returns `false` when the response was stale.
    pub fn complete_detail(
        &mut self,
        ticket: DetailTicket,
        result: Result<ProposalDetail, ApiError>,
    ) -> bool {
        if ticket.generation != self.detail_generation {
            log::debug!(
                "dropping stale detail response for proposal {}",
                ticket.proposal_id
            );
            return false;
        }

        let mut detail = match result {
            Ok(detail) => detail,
            Err(e) => {
                match ticket.reason {
                    DetailReason::Select => {
                        log::warn!("proposal {} failed to load: {e}", ticket.proposal_id);
                        self.error = Some(e.to_string());
                        self.phase = StorePhase::Error;
                        // The sidebar keeps pointing at what is actually loaded.
                        self.selected = self.detail.as_ref().map(|d| d.proposal.id);
                    }
                    DetailReason::AfterSave { .. } => {
                        log::warn!("reload after save failed: {e}");
                        self.error = Some(format!("Saved, but reloading the proposal failed: {e}"));
                    }
                }
                return true;
            }
        };
        detail.sort_sections();
        log::info!(
            "proposal {} loaded with {} sections",
            detail.proposal.id,
            detail.sections.len()
        );

        match ticket.reason {
            DetailReason::Select => {
                self.detail = Some(detail);
                self.active_index = 0;
                self.load_active_buffer();
                self.dirty = false;
                self.pending_status = None;
            }
            DetailReason::AfterSave {
                section_id,
                saved_buffer,
            } => {
                let active_id = self.active_section().map(|s| s.id);
                let fallback = self
                    .active_index
                    .min(detail.sections.len().saturating_sub(1));
                self.active_index = active_id
                    .and_then(|id| detail.sections.iter().position(|s| s.id == id))
                    .unwrap_or(fallback);
                self.detail = Some(detail);

                // Only normalize the buffer if the user has not typed since the save.
                if active_id == Some(section_id) && (!self.dirty || self.buffer == saved_buffer) {
                    self.load_active_buffer();
                }
            }
        }
        self.phase = StorePhase::DetailReady;
        true
    }

    // ------------------------------------------------------------------
    // Section navigation and editing
    // ------------------------------------------------------------------

    pub fn set_active_section(&mut self, index: usize) -> Result<(), EditorError> {
        if self.phase != StorePhase::DetailReady {
            return Err(EditorError::NotReady);
        }
        let len = self.sections().len();
        if index >= len {
            return Err(EditorError::SectionOutOfRange { index, len });
        }
        self.active_index = index;
        self.load_active_buffer();
        self.dirty = false;
        self.pending_status = None;
        self.save_state = SaveState::Idle;
        self.save_generation += 1;
        Ok(())
    }

    pub fn edit_buffer(&mut self, text: impl Into<String>) {
        let text = text.into();
        if text == self.buffer {
            return;
        }
        self.buffer = text;
        self.dirty = true;
        if self.save_state == SaveState::Saved {
            self.save_state = SaveState::Idle;
        }
    }

    /// Append text as a new block. Read and write happen in one call, so no
    /// other edit can interleave.
    pub fn append_block(&mut self, text: &str) {
        let next = if self.buffer.is_empty() {
            text.to_string()
        } else {
            format!("{}\n\n{}", self.buffer, text)
        };
        self.edit_buffer(next);
    }

    /// Stage a lifecycle change for the active section; sent with the next save.
    pub fn set_section_status(&mut self, status: SectionStatus) -> Result<(), EditorError> {
        let current = self
            .active_section()
            .map(|s| s.status)
            .ok_or(EditorError::NoActiveSection)?;
        let staged = (status != current).then_some(status);
        if staged != self.pending_status {
            self.pending_status = staged;
            self.dirty = true;
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Save
    // ------------------------------------------------------------------

    pub fn begin_save(&mut self) -> Result<SaveTicket, EditorError> {
        if self.phase != StorePhase::DetailReady {
            return Err(EditorError::NotReady);
        }
        let (proposal_id, section_id) = match (&self.detail, self.active_section()) {
            (Some(detail), Some(section)) => (detail.proposal.id, section.id),
            _ => return Err(EditorError::NoActiveSection),
        };
        if self.save_state.is_saving() {
            return Err(EditorError::SaveInProgress(section_id));
        }

        let update = SectionUpdate {
            content: Some(convert::to_content(&self.buffer)),
            status: self.pending_status,
            ..Default::default()
        };
        self.save_generation += 1;
        self.save_state = SaveState::Saving;
        self.error = None;
        Ok(SaveTicket {
            generation: self.save_generation,
            selection: self.selection_generation,
            proposal_id,
            section_id,
            update,
            buffer: self.buffer.clone(),
        })
    }

    /// Apply a save response. On success returns the ticket for the detail
    /// re-fetch that must follow.
    ///
    /// A save whose section is no longer active still lands in `detail` and
    /// still triggers the re-fetch; only the newer section's buffer, unsaved
    /// flag and save chip are left alone. A save for an earlier proposal
    /// selection is dropped.
    pub fn complete_save(
        &mut self,
        ticket: SaveTicket,
        result: Result<Option<Section>, ApiError>,
    ) -> Option<DetailTicket> {
        if ticket.selection != self.selection_generation {
            log::debug!(
                "dropping save response for section {} of an earlier selection",
                ticket.section_id
            );
            return None;
        }
        let current = ticket.generation == self.save_generation;

        match result {
            Ok(updated) => {
                log::info!("saved section {}", ticket.section_id);
                self.apply_saved_section(&ticket, updated);
                if current {
                    if self.buffer == ticket.buffer {
                        self.dirty = false;
                    }
                    if self.pending_status == ticket.update.status {
                        self.pending_status = None;
                    }
                    self.save_state = SaveState::Saved;
                }

                self.detail_generation += 1;
                Some(DetailTicket {
                    generation: self.detail_generation,
                    proposal_id: ticket.proposal_id,
                    reason: DetailReason::AfterSave {
                        section_id: ticket.section_id,
                        saved_buffer: ticket.buffer,
                    },
                })
            }
            Err(e) => {
                log::warn!("saving section {} failed: {e}", ticket.section_id);
                if current {
                    let message = e.to_string();
                    self.save_state = SaveState::Failed(message.clone());
                    self.error = Some(message);
                } else {
                    let title = self
                        .sections()
                        .iter()
                        .find(|s| s.id == ticket.section_id)
                        .map(|s| s.title.clone())
                        .unwrap_or_else(|| format!("section {}", ticket.section_id));
                    self.error = Some(format!("Saving \"{title}\" failed: {e}"));
                }
                None
            }
        }
    }

    /// Write what the backend accepted into the loaded detail. A 204 carries
    /// no body, so the sent fields stand in for it.
    fn apply_saved_section(&mut self, ticket: &SaveTicket, updated: Option<Section>) {
        let Some(slot) = self
            .detail
            .as_mut()
            .and_then(|d| d.sections.iter_mut().find(|s| s.id == ticket.section_id))
        else {
            return;
        };
        match updated {
            Some(section) => *slot = section,
            None => {
                if let Some(content) = &ticket.update.content {
                    slot.content = content.clone();
                }
                if let Some(status) = ticket.update.status {
                    slot.status = status;
                }
            }
        }
    }

    /// Drop the "Saved" chip unless a newer save has started since.
    pub fn expire_saved_indicator(&mut self, save_generation: u64) {
        if save_generation == self.save_generation && self.save_state == SaveState::Saved {
            self.save_state = SaveState::Idle;
        }
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
        if let SaveState::Failed(_) = self.save_state {
            self.save_state = SaveState::Idle;
        }
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn phase(&self) -> StorePhase {
        self.phase
    }

    pub fn proposals(&self) -> &[Proposal] {
        &self.proposals
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn selected_id(&self) -> Option<ProposalId> {
        self.selected
    }

    pub fn detail(&self) -> Option<&ProposalDetail> {
        self.detail.as_ref()
    }

    pub fn sections(&self) -> &[Section] {
        self.detail
            .as_ref()
            .map(|d| d.sections.as_slice())
            .unwrap_or_default()
    }

    pub fn active_index(&self) -> usize {
        self.active_index
    }

    pub fn active_section(&self) -> Option<&Section> {
        self.sections().get(self.active_index)
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn save_state(&self) -> &SaveState {
        &self.save_state
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn pending_status(&self) -> Option<SectionStatus> {
        self.pending_status
    }

    /// Status the active section will have after the next save.
    pub fn effective_status(&self) -> Option<SectionStatus> {
        self.pending_status
            .or_else(|| self.active_section().map(|s| s.status))
    }

    pub fn is_editable(&self) -> bool {
        self.phase == StorePhase::DetailReady && self.active_section().is_some()
    }

    pub fn section_context(&self) -> Option<SectionContext<'_>> {
        if self.phase != StorePhase::DetailReady {
            return None;
        }
        let detail = self.detail.as_ref()?;
        let section = self.active_section()?;
        Some(SectionContext {
            proposal_title: &detail.proposal.title,
            section_id: section.id,
            section_title: &section.title,
            buffer: &self.buffer,
        })
    }

    fn load_active_buffer(&mut self) {
        let Some(section) = self.active_section() else {
            self.buffer.clear();
            return;
        };
        let shape = convert::classify(&section.content);
        if !shape.is_authoritative() {
            log::warn!(
                "section {} content has {:?} shape; normalizing on read",
                section.id,
                shape
            );
        }
        if shape == ContentShape::Unrecognized {
            log::warn!(
                "section {} buffer is a display fallback; saving overwrites the stored shape",
                section.id
            );
        }
        self.buffer = convert::to_text(&section.content);
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use serde_json::json;
    use shared_types::{ProposalStatus, SectionStatus};

    pub(crate) fn proposal(id: ProposalId, title: &str) -> Proposal {
        Proposal {
            id,
            tender_id: 1,
            title: title.to_string(),
            status: ProposalStatus::Draft,
            version: 1,
            notes: None,
            created_at: None,
            section_count: 0,
        }
    }

    pub(crate) fn section(id: SectionId, order: i32, title: &str, text: &str) -> Section {
        Section {
            id,
            title: title.to_string(),
            content: convert::to_content(text),
            order,
            status: SectionStatus::NotStarted,
            assigned_to: None,
            created_at: None,
            updated_at: None,
        }
    }

    pub(crate) fn detail(id: ProposalId, title: &str, sections: Vec<Section>) -> ProposalDetail {
        ProposalDetail {
            proposal: proposal(id, title),
            sections,
        }
    }

    pub(crate) fn list(ids: &[ProposalId]) -> ProposalList {
        ProposalList {
            items: ids.iter().map(|id| proposal(*id, &format!("Proposal {id}"))).collect(),
            total: ids.len() as u64,
        }
    }

    fn bridge_detail() -> ProposalDetail {
        detail(
            1,
            "Route 42 Bridge",
            vec![
                section(10, 0, "Executive Summary", "We have 20 years of experience."),
                section(11, 1, "Safety", "We comply with X"),
                section(12, 2, "Pricing", ""),
            ],
        )
    }

    /// Store with proposal 1 loaded and section 0 active.
    pub(crate) fn ready_store() -> SectionStore {
        let mut store = SectionStore::new();
        let ticket = store.begin_list_load();
        let auto = store.complete_list_load(ticket, Ok(list(&[1, 2]))).unwrap();
        assert!(store.complete_detail(auto, Ok(bridge_detail())));
        store
    }

    fn http_error(message: &str) -> ApiError {
        ApiError::Http {
            status: 500,
            message: message.to_string(),
        }
    }

    #[test]
    fn mount_loads_list_and_auto_selects_first() {
        let mut store = SectionStore::new();
        assert_eq!(store.phase(), StorePhase::Empty);

        let ticket = store.begin_list_load();
        assert_eq!(store.phase(), StorePhase::LoadingList);

        let auto = store.complete_list_load(ticket, Ok(list(&[5, 6]))).unwrap();
        assert_eq!(auto.proposal_id(), 5);
        assert_eq!(store.phase(), StorePhase::LoadingDetail);
        assert_eq!(store.selected_id(), Some(5));
    }

    #[test]
    fn empty_list_stays_list_ready() {
        let mut store = SectionStore::new();
        let ticket = store.begin_list_load();
        assert!(store.complete_list_load(ticket, Ok(list(&[]))).is_none());
        assert_eq!(store.phase(), StorePhase::ListReady);
        assert!(store.section_context().is_none());
    }

    #[test]
    fn list_failure_is_retryable() {
        let mut store = SectionStore::new();
        let ticket = store.begin_list_load();
        store.complete_list_load(ticket, Err(ApiError::Transport("offline".into())));
        assert_eq!(store.phase(), StorePhase::Error);
        assert_eq!(store.error(), Some("Request failed: offline"));

        let retry = store.begin_list_load();
        assert!(store.error().is_none());
        assert!(store.complete_list_load(retry, Ok(list(&[3]))).is_some());
    }

    #[test]
    fn superseded_list_load_is_dropped() {
        let mut store = SectionStore::new();
        let first = store.begin_list_load();
        let second = store.begin_list_load();
        assert!(store.complete_list_load(second, Ok(list(&[2]))).is_some());
        assert!(store.complete_list_load(first, Ok(list(&[9]))).is_none());
        assert_eq!(store.proposals().len(), 1);
        assert_eq!(store.proposals()[0].id, 2);
    }

    #[test]
    fn detail_derives_buffer_in_section_order() {
        let mut store = SectionStore::new();
        let ticket = store.begin_list_load();
        let auto = store.complete_list_load(ticket, Ok(list(&[1]))).unwrap();
        let mut unordered = bridge_detail();
        unordered.sections.reverse();
        assert!(store.complete_detail(auto, Ok(unordered)));

        assert_eq!(store.phase(), StorePhase::DetailReady);
        assert_eq!(store.active_section().unwrap().title, "Executive Summary");
        assert_eq!(store.buffer(), "We have 20 years of experience.");
        assert!(!store.is_dirty());
    }

    #[test]
    fn selecting_unknown_proposal_is_rejected() {
        let mut store = ready_store();
        assert_eq!(store.select_proposal(99), Err(EditorError::UnknownProposal(99)));
        assert_eq!(store.phase(), StorePhase::DetailReady);
    }

    #[test]
    fn late_detail_for_earlier_selection_is_dropped() {
        let mut store = ready_store();
        let first = store.select_proposal(2).unwrap();
        let second = store.select_proposal(1).unwrap();

        let newer = detail(1, "Route 42 Bridge", vec![section(20, 0, "Scope", "Newest")]);
        assert!(store.complete_detail(second, Ok(newer)));
        let older = detail(2, "Old", vec![section(30, 0, "Stale", "Stale text")]);
        assert!(!store.complete_detail(first, Ok(older)));

        assert_eq!(store.detail().unwrap().proposal.id, 1);
        assert_eq!(store.buffer(), "Newest");
    }

    #[test]
    fn detail_failure_surfaces_error() {
        let mut store = ready_store();
        let ticket = store.select_proposal(2).unwrap();
        assert!(store.complete_detail(ticket, Err(http_error("Proposal not found"))));
        assert_eq!(store.phase(), StorePhase::Error);
        assert_eq!(store.error(), Some("Proposal not found"));
        // Earlier data is kept, and the selection still names it.
        assert_eq!(store.detail().unwrap().proposal.id, 1);
        assert_eq!(store.selected_id(), Some(1));
    }

    #[test]
    fn retry_after_failed_switch_returns_to_loaded_proposal() {
        let mut store = ready_store();
        let ticket = store.select_proposal(2).unwrap();
        store.complete_detail(ticket, Err(http_error("Proposal not found")));

        let retry = store.begin_list_load();
        assert!(store.complete_list_load(retry, Ok(list(&[1, 2]))).is_none());
        assert_eq!(store.phase(), StorePhase::DetailReady);
        assert_eq!(store.selected_id(), Some(1));
        assert_eq!(store.buffer(), "We have 20 years of experience.");
    }

    #[test]
    fn first_detail_failure_clears_selection_so_retry_reselects() {
        let mut store = SectionStore::new();
        let ticket = store.begin_list_load();
        let auto = store.complete_list_load(ticket, Ok(list(&[4, 5]))).unwrap();
        assert!(store.complete_detail(auto, Err(http_error("boom"))));
        assert_eq!(store.phase(), StorePhase::Error);
        assert_eq!(store.selected_id(), None);

        let retry = store.begin_list_load();
        let again = store.complete_list_load(retry, Ok(list(&[4, 5]))).unwrap();
        assert_eq!(again.proposal_id(), 4);
    }

    #[test]
    fn switching_sections_rederives_buffer() {
        let mut store = ready_store();
        store.edit_buffer("unsaved scribble");
        assert!(store.is_dirty());

        store.set_active_section(1).unwrap();
        store.set_active_section(2).unwrap();
        assert_eq!(store.buffer(), "");
        store.set_active_section(1).unwrap();
        assert_eq!(store.buffer(), "We comply with X");
        assert!(!store.is_dirty());
    }

    #[test]
    fn section_index_is_bounds_checked() {
        let mut store = ready_store();
        assert_eq!(
            store.set_active_section(3),
            Err(EditorError::SectionOutOfRange { index: 3, len: 3 })
        );
        assert_eq!(store.active_index(), 0);

        let mut empty = SectionStore::new();
        assert_eq!(empty.set_active_section(0), Err(EditorError::NotReady));
    }

    #[test]
    fn save_sends_canonical_content_and_refetches() {
        let mut store = ready_store();
        store.edit_buffer("First block\n\nSecond block\n\n\n");
        let ticket = store.begin_save().unwrap();
        assert_eq!(ticket.proposal_id(), 1);
        assert_eq!(ticket.section_id(), 10);
        assert_eq!(
            ticket.update().content,
            Some(convert::to_content("First block\n\nSecond block"))
        );
        assert!(ticket.update().status.is_none());
        assert!(store.save_state().is_saving());

        let refresh = store.complete_save(ticket, Ok(None)).unwrap();
        assert!(refresh.is_refresh());
        assert_eq!(store.save_state(), &SaveState::Saved);
        assert!(!store.is_dirty());

        let mut server = bridge_detail();
        server.sections[0].content = convert::to_content("First block\n\nSecond block");
        server.sections[0].status = SectionStatus::InProgress;
        assert!(store.complete_detail(refresh, Ok(server)));
        assert_eq!(store.buffer(), "First block\n\nSecond block");
        assert_eq!(store.active_section().unwrap().status, SectionStatus::InProgress);
    }

    #[test]
    fn saving_twice_without_edits_is_idempotent() {
        let mut store = ready_store();
        store.edit_buffer("Alpha  \n\nBeta");
        let first = store.begin_save().unwrap();
        let first_content = first.update().content.clone();
        let refresh = store.complete_save(first, Ok(None)).unwrap();

        let mut server = bridge_detail();
        server.sections[0].content = first_content.clone().unwrap();
        store.complete_detail(refresh, Ok(server));

        let second = store.begin_save().unwrap();
        assert_eq!(second.update().content, first_content);
    }

    #[test]
    fn failed_save_keeps_buffer_and_unsaved_flag() {
        let mut store = ready_store();
        store.edit_buffer("Draft that must survive");
        let ticket = store.begin_save().unwrap();
        assert!(store
            .complete_save(ticket, Err(http_error("database is locked")))
            .is_none());

        assert_eq!(store.buffer(), "Draft that must survive");
        assert!(store.is_dirty());
        assert_eq!(store.error(), Some("database is locked"));
        assert_eq!(
            store.save_state(),
            &SaveState::Failed("database is locked".to_string())
        );
    }

    #[test]
    fn only_one_save_at_a_time() {
        let mut store = ready_store();
        let _ticket = store.begin_save().unwrap();
        assert_eq!(store.begin_save(), Err(EditorError::SaveInProgress(10)));
    }

    #[test]
    fn save_lands_after_switching_sections() {
        let mut store = ready_store();
        store.edit_buffer("NEW summary text");
        let ticket = store.begin_save().unwrap();
        store.set_active_section(1).unwrap();
        store.edit_buffer("safety edit");

        let refresh = store
            .complete_save(ticket, Ok(None))
            .expect("a successful save is always re-fetched");
        assert!(refresh.is_refresh());
        assert_eq!(store.buffer(), "safety edit");
        assert!(store.is_dirty());
        assert_eq!(store.save_state(), &SaveState::Idle);

        let mut server = bridge_detail();
        server.sections[0].content = convert::to_content("NEW summary text");
        assert!(store.complete_detail(refresh, Ok(server)));
        assert_eq!(store.active_section().unwrap().id, 11);
        assert_eq!(store.buffer(), "safety edit");

        store.set_active_section(0).unwrap();
        assert_eq!(store.buffer(), "NEW summary text");
        assert!(!store.is_dirty());
    }

    #[test]
    fn returning_before_the_refresh_still_shows_saved_text() {
        let mut store = ready_store();
        store.edit_buffer("NEW summary text");
        let ticket = store.begin_save().unwrap();
        store.set_active_section(1).unwrap();
        store.set_active_section(0).unwrap();
        assert_eq!(store.buffer(), "We have 20 years of experience.");

        let refresh = store.complete_save(ticket, Ok(None)).unwrap();
        let mut server = bridge_detail();
        server.sections[0].content = convert::to_content("NEW summary text");
        assert!(store.complete_detail(refresh, Ok(server)));
        assert_eq!(store.buffer(), "NEW summary text");
        assert!(!store.is_dirty());
    }

    #[test]
    fn failed_save_after_switching_sections_reports_without_touching_new_section() {
        let mut store = ready_store();
        store.edit_buffer("summary edit");
        let ticket = store.begin_save().unwrap();
        store.set_active_section(1).unwrap();

        assert!(store
            .complete_save(ticket, Err(http_error("database is locked")))
            .is_none());
        assert_eq!(store.buffer(), "We comply with X");
        assert!(!store.is_dirty());
        assert_eq!(store.save_state(), &SaveState::Idle);
        assert_eq!(
            store.error(),
            Some("Saving \"Executive Summary\" failed: database is locked")
        );
    }

    #[test]
    fn save_for_previous_proposal_is_dropped() {
        let mut store = ready_store();
        store.edit_buffer("summary edit");
        let ticket = store.begin_save().unwrap();
        let select = store.select_proposal(2).unwrap();

        assert!(store.complete_save(ticket, Ok(None)).is_none());
        let other = detail(2, "Harbour Wall", vec![section(40, 0, "Scope", "Harbour scope")]);
        assert!(store.complete_detail(select, Ok(other)));
        assert_eq!(store.buffer(), "Harbour scope");
    }

    #[test]
    fn typing_during_save_survives_the_refresh() {
        let mut store = ready_store();
        store.edit_buffer("v1");
        let ticket = store.begin_save().unwrap();
        store.edit_buffer("v1 plus more");
        let refresh = store.complete_save(ticket, Ok(None)).unwrap();
        assert!(store.is_dirty());

        let mut server = bridge_detail();
        server.sections[0].content = convert::to_content("v1");
        store.complete_detail(refresh, Ok(server));
        assert_eq!(store.buffer(), "v1 plus more");
        assert!(store.is_dirty());
    }

    #[test]
    fn refresh_keeps_active_section_by_id() {
        let mut store = ready_store();
        store.set_active_section(1).unwrap();
        let ticket = store.begin_save().unwrap();
        let refresh = store.complete_save(ticket, Ok(None)).unwrap();

        let mut server = bridge_detail();
        // Backend reordered: Safety moved to the front.
        server.sections[1].order = -1;
        store.complete_detail(refresh, Ok(server));
        assert_eq!(store.active_index(), 0);
        assert_eq!(store.active_section().unwrap().id, 11);
    }

    #[test]
    fn refresh_failure_after_save_keeps_editing() {
        let mut store = ready_store();
        let ticket = store.begin_save().unwrap();
        let refresh = store.complete_save(ticket, Ok(None)).unwrap();
        store.complete_detail(refresh, Err(ApiError::Transport("offline".into())));
        assert_eq!(store.phase(), StorePhase::DetailReady);
        assert!(store.error().unwrap().starts_with("Saved, but reloading"));
    }

    #[test]
    fn status_change_travels_with_save() {
        let mut store = ready_store();
        store.set_section_status(SectionStatus::InReview).unwrap();
        assert!(store.is_dirty());
        assert_eq!(store.effective_status(), Some(SectionStatus::InReview));

        let ticket = store.begin_save().unwrap();
        assert_eq!(ticket.update().status, Some(SectionStatus::InReview));

        let mut returned = bridge_detail().sections[0].clone();
        returned.status = SectionStatus::InReview;
        store.complete_save(ticket, Ok(Some(returned)));
        assert!(store.pending_status().is_none());
        assert_eq!(store.active_section().unwrap().status, SectionStatus::InReview);
    }

    #[test]
    fn staging_the_current_status_is_a_no_op() {
        let mut store = ready_store();
        store.set_section_status(SectionStatus::NotStarted).unwrap();
        assert!(!store.is_dirty());
        assert!(store.pending_status().is_none());
    }

    #[test]
    fn saved_indicator_expires_only_for_latest_save() {
        let mut store = ready_store();
        let first = store.begin_save().unwrap();
        let first_generation = first.generation();
        store.complete_save(first, Ok(None));
        assert_eq!(store.save_state(), &SaveState::Saved);

        let second = store.begin_save().unwrap();
        let second_generation = second.generation();
        store.complete_save(second, Ok(None));
        store.expire_saved_indicator(first_generation);
        assert_eq!(store.save_state(), &SaveState::Saved);
        store.expire_saved_indicator(second_generation);
        assert_eq!(store.save_state(), &SaveState::Idle);
    }

    #[test]
    fn append_block_separates_with_blank_line() {
        let mut store = ready_store();
        store.set_active_section(2).unwrap();
        store.append_block("Generated pricing");
        assert_eq!(store.buffer(), "Generated pricing");
        store.append_block("More");
        assert_eq!(store.buffer(), "Generated pricing\n\nMore");
        assert!(store.is_dirty());
    }

    #[test]
    fn foreign_content_is_normalized_on_read() {
        let mut store = SectionStore::new();
        let ticket = store.begin_list_load();
        let auto = store.complete_list_load(ticket, Ok(list(&[1]))).unwrap();
        let mut foreign = bridge_detail();
        foreign.sections[0].content = json!({
            "type": "doc",
            "content": [{"content": [{"text": "Hello"}]}, {"content": [{"text": "World"}]}]
        });
        store.complete_detail(auto, Ok(foreign));
        assert_eq!(store.buffer(), "Hello\n\nWorld");

        let ticket = store.begin_save().unwrap();
        assert_eq!(
            convert::classify(ticket.update().content.as_ref().unwrap()),
            ContentShape::Canonical
        );
    }
}
