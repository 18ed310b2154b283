//! The editor as one unit: section store plus assist panel.
//!
//! Anything that changes which section is being edited also clears the
//! assist panel, so a result computed for one section is never shown (or
//! inserted) under another.

use shared_types::{ProposalDetail, ProposalId};

use super::assist::{AssistAction, AssistOrchestrator, AssistResult, AssistTicket, AssistTuning};
use super::store::{DetailTicket, SectionStore};
use crate::error::{ApiError, EditorError};

#[derive(Debug, Clone, Default)]
pub struct EditorSession {
    pub store: SectionStore,
    pub assist: AssistOrchestrator,
}

impl EditorSession {
    pub fn new(tuning: AssistTuning) -> Self {
        Self {
            store: SectionStore::new(),
            assist: AssistOrchestrator::new(tuning),
        }
    }

    pub fn select_proposal(&mut self, id: ProposalId) -> Result<DetailTicket, EditorError> {
        let ticket = self.store.select_proposal(id)?;
        self.assist.clear();
        Ok(ticket)
    }

    pub fn complete_detail(
        &mut self,
        ticket: DetailTicket,
        result: Result<ProposalDetail, ApiError>,
    ) -> bool {
        let fresh_selection = !ticket.is_refresh();
        let applied = self.store.complete_detail(ticket, result);
        if applied && fresh_selection {
            self.assist.clear();
        }
        applied
    }

    pub fn set_active_section(&mut self, index: usize) -> Result<(), EditorError> {
        self.store.set_active_section(index)?;
        self.assist.clear();
        Ok(())
    }

    pub fn begin_assist(&mut self, action: AssistAction) -> Result<AssistTicket, EditorError> {
        let ctx = self.store.section_context().ok_or(EditorError::NoActiveSection)?;
        self.assist.begin(action, &ctx)
    }

    pub fn complete_assist(
        &mut self,
        ticket: AssistTicket,
        result: Result<AssistResult, ApiError>,
    ) -> bool {
        self.assist.complete(ticket, result)
    }

    /// Append the assist answer to the buffer and clear the result.
    pub fn insert(&mut self) -> Result<(), EditorError> {
        if !self.store.is_editable() {
            return Err(EditorError::NoActiveSection);
        }
        let answer = self.assist.take_answer().ok_or(EditorError::NothingToInsert)?;
        self.store.append_block(&answer);
        Ok(())
    }
}
