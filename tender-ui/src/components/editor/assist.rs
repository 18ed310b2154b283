//! AI-assist orchestrator for the section editor.
//!
//! The quick actions form a closed set ([`AssistAction`]). Each one maps to
//! exactly one backend call shape through [`build_request`], and
//! [`dispatch`] is the only place that talks to the backend. At most one
//! request is in flight; a second `begin` is refused rather than queued.

use shared_types::{
    ComplianceCheckRequest, ComplianceResponse, GenerateSectionRequest, QueryMode,
    RagQueryRequest, RagResponse, RagSource,
};

use super::store::SectionContext;
use crate::api::TenderBackend;
use crate::config::ClientConfig;
use crate::error::{ApiError, EditorError};

#[derive(Debug, Clone, PartialEq)]
pub enum AssistAction {
    /// Draft the section from scratch. Empty instructions fall back to a default.
    WriteSection { instructions: String },
    ImproveText,
    CheckCompliance,
    FindContent,
    /// Free-text box. An empty query asks about the section title.
    Custom { query: String },
}

impl AssistAction {
    pub fn label(&self) -> &'static str {
        match self {
            Self::WriteSection { .. } => "Write this section",
            Self::ImproveText => "Improve current text",
            Self::CheckCompliance => "Check compliance",
            Self::FindContent => "Find relevant content",
            Self::Custom { .. } => "Ask",
        }
    }
}

/// One backend call, fully derived from an action and the active section.
#[derive(Debug, Clone, PartialEq)]
pub enum AssistRequest {
    GenerateSection(GenerateSectionRequest),
    Query(RagQueryRequest),
    ComplianceCheck(ComplianceCheckRequest),
}

/// Knobs from [`ClientConfig`] that shape assist requests.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AssistTuning {
    pub excerpt_chars: usize,
    pub temperature: Option<f32>,
    pub top_k: Option<u32>,
}

impl Default for AssistTuning {
    fn default() -> Self {
        Self::from(&ClientConfig::default())
    }
}

impl From<&ClientConfig> for AssistTuning {
    fn from(config: &ClientConfig) -> Self {
        Self {
            excerpt_chars: config.improve_excerpt_chars,
            temperature: config.query_temperature,
            top_k: config.query_top_k,
        }
    }
}

pub fn build_request(
    action: &AssistAction,
    ctx: &SectionContext<'_>,
    tuning: &AssistTuning,
) -> AssistRequest {
    let title = ctx.section_title;
    let query = |text: String, mode: QueryMode| {
        let mut request = RagQueryRequest::new(text, mode);
        request.temperature = tuning.temperature;
        request.top_k = tuning.top_k;
        AssistRequest::Query(request)
    };

    match action {
        AssistAction::WriteSection { instructions } => {
            let instructions = match instructions.trim() {
                "" => format!("write a professional {title} section"),
                given => given.to_string(),
            };
            AssistRequest::GenerateSection(GenerateSectionRequest {
                query: format!("{title} for {}", ctx.proposal_title),
                section_title: title.to_string(),
                instructions: Some(instructions),
                requirements: None,
            })
        }
        AssistAction::ImproveText => {
            let excerpt: String = ctx.buffer.chars().take(tuning.excerpt_chars).collect();
            query(
                format!(
                    "Improve the following text for the \"{title}\" section of a tender proposal. \
                     Make it clearer and more persuasive while keeping every factual claim.\
                     \n\n{excerpt}"
                ),
                QueryMode::Qa,
            )
        }
        AssistAction::CheckCompliance => AssistRequest::ComplianceCheck(ComplianceCheckRequest {
            requirement: format!(
                "The \"{title}\" section must fully address the tender requirements for {title}."
            ),
            section_content: ctx.buffer.to_string(),
        }),
        AssistAction::FindContent => query(title.to_string(), QueryMode::Search),
        AssistAction::Custom { query: text } => {
            let text = if text.trim().is_empty() {
                title.to_string()
            } else {
                text.clone()
            };
            query(text, QueryMode::Qa)
        }
    }
}

/// Generated text plus the snippets it was grounded on.
#[derive(Debug, Clone, PartialEq)]
pub struct AssistResult {
    pub answer: String,
    pub sources: Vec<RagSource>,
    pub mode: String,
}

impl From<RagResponse> for AssistResult {
    fn from(mut response: RagResponse) -> Self {
        response.clamp_scores();
        Self {
            answer: response.answer,
            sources: response.sources,
            mode: response.mode,
        }
    }
}

impl AssistResult {
    /// The assessment object is shown as compact JSON, exactly as received;
    /// its sources are dropped.
    fn from_compliance(response: ComplianceResponse) -> Result<Self, ApiError> {
        let answer = serde_json::to_string(&response.assessment)
            .map_err(|e| ApiError::Decode(e.to_string()))?;
        Ok(Self {
            answer,
            sources: Vec::new(),
            mode: QueryMode::Compliance.as_str().to_string(),
        })
    }
}

pub async fn dispatch<B: TenderBackend + ?Sized>(
    backend: &B,
    request: &AssistRequest,
) -> Result<AssistResult, ApiError> {
    match request {
        AssistRequest::GenerateSection(body) => {
            backend.generate_section(body).await.map(AssistResult::from)
        }
        AssistRequest::Query(body) => backend.rag_query(body).await.map(AssistResult::from),
        AssistRequest::ComplianceCheck(body) => {
            let response = backend.compliance_check(body).await?;
            AssistResult::from_compliance(response)
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssistTicket {
    generation: u64,
    action: AssistAction,
    request: AssistRequest,
}

impl AssistTicket {
    pub fn action(&self) -> &AssistAction {
        &self.action
    }

    pub fn request(&self) -> &AssistRequest {
        &self.request
    }
}

#[derive(Debug, Clone, Default)]
pub struct AssistOrchestrator {
    tuning: AssistTuning,
    result: Option<AssistResult>,
    error: Option<String>,
    /// Generation and action of the outstanding request.
    in_flight: Option<(u64, AssistAction)>,
    /// Bumped by every `begin` and `clear`; results from older generations are dropped.
    generation: u64,
}

impl AssistOrchestrator {
    pub fn new(tuning: AssistTuning) -> Self {
        Self {
            tuning,
            ..Default::default()
        }
    }

    pub fn begin(
        &mut self,
        action: AssistAction,
        ctx: &SectionContext<'_>,
    ) -> Result<AssistTicket, EditorError> {
        if self.in_flight.is_some() {
            return Err(EditorError::AssistBusy);
        }
        let request = build_request(&action, ctx, &self.tuning);
        self.generation += 1;
        self.in_flight = Some((self.generation, action.clone()));
        self.error = None;
        log::info!("assist '{}' for section {}", action.label(), ctx.section_id);
        Ok(AssistTicket {
            generation: self.generation,
            action,
            request,
        })
    }

    /// Apply the outcome of `ticket`'s request. Returns `false` if the result
    /// was discarded because the panel was cleared meanwhile.
    pub fn complete(
        &mut self,
        ticket: AssistTicket,
        result: Result<AssistResult, ApiError>,
    ) -> bool {
        if matches!(&self.in_flight, Some((generation, _)) if *generation == ticket.generation) {
            self.in_flight = None;
        }
        if ticket.generation != self.generation {
            log::debug!("dropping assist result for '{}'", ticket.action.label());
            return false;
        }

        match result {
            Ok(result) => {
                self.result = Some(result);
                self.error = None;
            }
            Err(e) => {
                log::warn!("assist '{}' failed: {e}", ticket.action.label());
                self.result = None;
                self.error = Some(e.to_string());
            }
        }
        true
    }

    /// Forget the visible result and error. An outstanding request keeps the
    /// panel busy until it resolves, but its result will be dropped.
    pub fn clear(&mut self) {
        self.result = None;
        self.error = None;
        self.generation += 1;
    }

    /// Hand over the answer for insertion and clear the result slot.
    pub fn take_answer(&mut self) -> Option<String> {
        self.result.take().map(|r| r.answer)
    }

    pub fn result(&self) -> Option<&AssistResult> {
        self.result.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn in_flight(&self) -> Option<&AssistAction> {
        self.in_flight.as_ref().map(|(_, action)| action)
    }
}
