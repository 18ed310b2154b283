//! In-memory backend for driving the state machines in tests.

use std::cell::RefCell;

use async_trait::async_trait;
use shared_types::{
    ComplianceCheckRequest, ComplianceResponse, GenerateSectionRequest, HealthReport, HistoryEntry,
    ProposalDetail, ProposalId, ProposalList, RagQueryRequest, RagResponse, RagSource, Section,
    SectionId, SectionUpdate,
};

use crate::api::TenderBackend;
use crate::error::ApiError;

/// A request as the backend received it.
#[derive(Debug, Clone, PartialEq)]
pub enum Recorded {
    ListProposals(u32),
    GetProposal(ProposalId),
    UpdateSection(ProposalId, SectionId, SectionUpdate),
    Query(RagQueryRequest),
    GenerateSection(GenerateSectionRequest),
    ComplianceCheck(ComplianceCheckRequest),
    History,
    Health,
}

pub struct FakeBackend {
    pub calls: RefCell<Vec<Recorded>>,
    pub list: RefCell<Result<ProposalList, ApiError>>,
    pub detail: RefCell<Result<ProposalDetail, ApiError>>,
    pub update: RefCell<Result<Option<Section>, ApiError>>,
    pub rag: RefCell<Result<RagResponse, ApiError>>,
    pub compliance: RefCell<Result<ComplianceResponse, ApiError>>,
    pub history: RefCell<Result<Vec<HistoryEntry>, ApiError>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self {
            calls: RefCell::new(Vec::new()),
            list: RefCell::new(Ok(ProposalList::default())),
            detail: RefCell::new(Err(ApiError::Http {
                status: 404,
                message: "Proposal not found".to_string(),
            })),
            update: RefCell::new(Ok(None)),
            rag: RefCell::new(Ok(rag_response("generated answer"))),
            compliance: RefCell::new(Ok(ComplianceResponse {
                assessment: serde_json::json!({
                    "status": "partially_addressed",
                    "explanation": "Mentions X but not Y.",
                    "gaps": ["Y is not covered"],
                    "suggestions": ["Describe Y"]
                }),
                sources: vec![serde_json::json!({"text": "ignored"})],
            })),
            history: RefCell::new(Ok(Vec::new())),
        }
    }

    pub fn calls(&self) -> Vec<Recorded> {
        self.calls.borrow().clone()
    }

    fn record(&self, call: Recorded) {
        self.calls.borrow_mut().push(call);
    }
}

pub fn rag_response(answer: &str) -> RagResponse {
    RagResponse {
        answer: answer.to_string(),
        sources: vec![RagSource {
            text: "Delivered the I-95 viaduct two weeks early.".to_string(),
            score: 0.91,
            metadata: [("source".to_string(), serde_json::json!("Past Proposals"))]
                .into_iter()
                .collect(),
        }],
        mode: "qa".to_string(),
    }
}

#[async_trait(?Send)]
impl TenderBackend for FakeBackend {
    async fn list_proposals(&self, limit: u32) -> Result<ProposalList, ApiError> {
        self.record(Recorded::ListProposals(limit));
        self.list.borrow().clone()
    }

    async fn get_proposal(&self, id: ProposalId) -> Result<ProposalDetail, ApiError> {
        self.record(Recorded::GetProposal(id));
        self.detail.borrow().clone()
    }

    async fn update_section(
        &self,
        proposal_id: ProposalId,
        section_id: SectionId,
        update: &SectionUpdate,
    ) -> Result<Option<Section>, ApiError> {
        self.record(Recorded::UpdateSection(proposal_id, section_id, update.clone()));
        self.update.borrow().clone()
    }

    async fn rag_query(&self, request: &RagQueryRequest) -> Result<RagResponse, ApiError> {
        self.record(Recorded::Query(request.clone()));
        self.rag.borrow().clone()
    }

    async fn generate_section(
        &self,
        request: &GenerateSectionRequest,
    ) -> Result<RagResponse, ApiError> {
        self.record(Recorded::GenerateSection(request.clone()));
        self.rag.borrow().clone()
    }

    async fn compliance_check(
        &self,
        request: &ComplianceCheckRequest,
    ) -> Result<ComplianceResponse, ApiError> {
        self.record(Recorded::ComplianceCheck(request.clone()));
        self.compliance.borrow().clone()
    }

    async fn rag_history(&self) -> Result<Vec<HistoryEntry>, ApiError> {
        self.record(Recorded::History);
        self.history.borrow().clone()
    }

    async fn rag_health(&self) -> Result<HealthReport, ApiError> {
        self.record(Recorded::Health);
        Ok(HealthReport::new())
    }
}
