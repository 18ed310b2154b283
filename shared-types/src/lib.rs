//! Shared types between the proposal client and the TenderWriter backend
//!
//! These mirror the JSON bodies of the REST surface:
//! - `/proposals` (proposal + section CRUD)
//! - `/rag/*` (query, section generation, compliance check, history, health)
//!
//! Serializable with serde for JSON over HTTP

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

pub type TenderId = i64;
pub type ProposalId = i64;
pub type SectionId = i64;
pub type UserId = i64;

// ============================================================================
// Proposals
// ============================================================================

/// Proposal lifecycle, owned by the backend
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "../../tender-ui/src/types/generated.ts")]
pub enum ProposalStatus {
    #[default]
    Draft,
    InReview,
    Approved,
    Submitted,
}

impl ProposalStatus {
    pub fn label(self) -> &'static str {
        match self {
            Self::Draft => "Draft",
            Self::InReview => "In review",
            Self::Approved => "Approved",
            Self::Submitted => "Submitted",
        }
    }
}

/// Proposal summary as returned by the list endpoint
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[ts(export, export_to = "../../tender-ui/src/types/generated.ts")]
pub struct Proposal {
    pub id: ProposalId,
    pub tender_id: TenderId,
    pub title: String,
    #[serde(default)]
    pub status: ProposalStatus,
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default, deserialize_with = "lenient_time::deserialize")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub section_count: u32,
}

fn default_version() -> u32 {
    1
}

/// `GET /proposals/{id}`: the proposal with its sections embedded
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[ts(export, export_to = "../../tender-ui/src/types/generated.ts")]
pub struct ProposalDetail {
    #[serde(flatten)]
    pub proposal: Proposal,
    #[serde(default)]
    pub sections: Vec<Section>,
}

impl ProposalDetail {
    /// Sections in navigation order (ascending ordering key, id as tiebreak).
    pub fn sort_sections(&mut self) {
        self.sections.sort_by_key(|s| (s.order, s.id));
    }
}

/// `GET /proposals?limit=N`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default, TS)]
#[ts(export, export_to = "../../tender-ui/src/types/generated.ts")]
pub struct ProposalList {
    pub items: Vec<Proposal>,
    #[serde(default)]
    pub total: u64,
}

// ============================================================================
// Sections
// ============================================================================

/// Section lifecycle. `todo` on the wire is "not started".
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default, TS)]
#[ts(export, export_to = "../../tender-ui/src/types/generated.ts")]
pub enum SectionStatus {
    #[default]
    #[serde(rename = "todo")]
    NotStarted,
    #[serde(rename = "in_progress")]
    InProgress,
    #[serde(rename = "in_review")]
    InReview,
    #[serde(rename = "approved")]
    Approved,
}

impl SectionStatus {
    pub const ALL: [SectionStatus; 4] = [
        SectionStatus::NotStarted,
        SectionStatus::InProgress,
        SectionStatus::InReview,
        SectionStatus::Approved,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::NotStarted => "Not started",
            Self::InProgress => "In progress",
            Self::InReview => "In review",
            Self::Approved => "Approved",
        }
    }

    /// Wire value, also used as a CSS modifier.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NotStarted => "todo",
            Self::InProgress => "in_progress",
            Self::InReview => "in_review",
            Self::Approved => "approved",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.as_str() == value)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[ts(export, export_to = "../../tender-ui/src/types/generated.ts")]
pub struct Section {
    pub id: SectionId,
    pub title: String,
    /// Structured content tree; see the client's document converter.
    #[serde(default)]
    #[ts(type = "unknown")]
    pub content: serde_json::Value,
    #[serde(default)]
    pub order: i32,
    #[serde(default)]
    pub status: SectionStatus,
    #[serde(default)]
    pub assigned_to: Option<UserId>,
    #[serde(default, deserialize_with = "lenient_time::deserialize")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient_time::deserialize")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// `PUT /proposals/{id}/sections/{section_id}`: only present fields are changed
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default, TS)]
#[ts(export, export_to = "../../tender-ui/src/types/generated.ts")]
pub struct SectionUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[ts(type = "unknown")]
    pub content: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<SectionStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<UserId>,
}

// ============================================================================
// RAG
// ============================================================================

/// Pipeline modes accepted by `POST /rag/query`
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "../../tender-ui/src/types/generated.ts")]
pub enum QueryMode {
    /// Retrieve only, no generation
    Search,
    /// General question answering
    #[default]
    Qa,
    WriteSection,
    ExecSummary,
    AnalyzeReqs,
    Compliance,
}

impl QueryMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Search => "search",
            Self::Qa => "qa",
            Self::WriteSection => "write_section",
            Self::ExecSummary => "exec_summary",
            Self::AnalyzeReqs => "analyze_reqs",
            Self::Compliance => "compliance",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[ts(export, export_to = "../../tender-ui/src/types/generated.ts")]
pub struct RagQueryRequest {
    pub query: String,
    pub mode: QueryMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_k: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(type = "Record<string, unknown> | null")]
    pub filters: Option<BTreeMap<String, serde_json::Value>>,
}

impl RagQueryRequest {
    pub fn new(query: impl Into<String>, mode: QueryMode) -> Self {
        Self {
            query: query.into(),
            mode,
            temperature: None,
            top_k: None,
            filters: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[ts(export, export_to = "../../tender-ui/src/types/generated.ts")]
pub struct GenerateSectionRequest {
    pub query: String,
    pub section_title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requirements: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[ts(export, export_to = "../../tender-ui/src/types/generated.ts")]
pub struct ComplianceCheckRequest {
    pub requirement: String,
    pub section_content: String,
}

/// One retrieved snippet backing an answer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[ts(export, export_to = "../../tender-ui/src/types/generated.ts")]
pub struct RagSource {
    pub text: String,
    #[serde(default)]
    pub score: f64,
    #[serde(default)]
    #[ts(type = "Record<string, unknown>")]
    pub metadata: BTreeMap<String, serde_json::Value>,
}

impl RagSource {
    /// Short label from the metadata, when the backend tagged one.
    pub fn origin(&self) -> Option<&str> {
        ["source", "doc", "title", "category"]
            .into_iter()
            .find_map(|key| self.metadata.get(key).and_then(|v| v.as_str()))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[ts(export, export_to = "../../tender-ui/src/types/generated.ts")]
pub struct RagResponse {
    pub answer: String,
    #[serde(default)]
    pub sources: Vec<RagSource>,
    #[serde(default)]
    pub mode: String,
}

impl RagResponse {
    /// Force every relevance score into `[0, 1]`; NaN becomes 0.
    pub fn clamp_scores(&mut self) {
        for source in &mut self.sources {
            source.score = if source.score.is_nan() {
                0.0
            } else {
                source.score.clamp(0.0, 1.0)
            };
        }
    }
}

/// The assessment is whatever object the model produced (usually `status`,
/// `explanation`, `gaps`, `suggestions`), so it is kept untyped.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[ts(export, export_to = "../../tender-ui/src/types/generated.ts")]
pub struct ComplianceResponse {
    #[ts(type = "Record<string, unknown>")]
    pub assessment: serde_json::Value,
    #[serde(default)]
    #[ts(type = "unknown[]")]
    pub sources: Vec<serde_json::Value>,
}

/// A server-recorded past query. The answer travels as `response`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[ts(export, export_to = "../../tender-ui/src/types/generated.ts")]
pub struct HistoryEntry {
    pub id: i64,
    pub query: String,
    #[serde(rename = "response", default)]
    pub answer: String,
    #[serde(default, deserialize_with = "lenient_time::deserialize")]
    pub created_at: Option<DateTime<Utc>>,
}

/// `GET /rag/health`: free-form status/components map
pub type HealthReport = BTreeMap<String, serde_json::Value>;

// ============================================================================
// Errors
// ============================================================================

/// Error body of every non-2xx response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Usually a string; validation failures carry a structured value.
    #[serde(default)]
    pub detail: serde_json::Value,
}

/// Timestamps arrive either as RFC 3339 or as naive ISO datetimes (assumed UTC).
mod lenient_time {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.as_deref().and_then(parse))
    }

    pub(crate) fn parse(raw: &str) -> Option<DateTime<Utc>> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
            return Some(dt.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f")
            .or_else(|_| NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S%.f"))
            .ok()
            .map(|naive| naive.and_utc())
    }
}

// ============================================================================
// Tests
// ============================================================================
