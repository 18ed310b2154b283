//! REST transport for the TenderWriter backend.
//!
//! [`TenderBackend`] is the seam the editor and search state machines are
//! driven through; [`HttpBackend`] is the browser implementation on top of
//! `gloo-net`. Status/body handling lives in plain functions so it can be
//! exercised without a browser.

use async_trait::async_trait;
use gloo_net::http::{Request, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use shared_types::{
    ComplianceCheckRequest, ComplianceResponse, ErrorBody, GenerateSectionRequest, HealthReport,
    HistoryEntry, ProposalDetail, ProposalId, ProposalList, RagQueryRequest, RagResponse, Section,
    SectionId, SectionUpdate,
};

use crate::config::RequestContext;
use crate::error::ApiError;

/// One async method per backend endpoint the client consumes.
#[async_trait(?Send)]
pub trait TenderBackend {
    async fn list_proposals(&self, limit: u32) -> Result<ProposalList, ApiError>;

    async fn get_proposal(&self, id: ProposalId) -> Result<ProposalDetail, ApiError>;

    /// `Ok(None)` when the backend answers 204.
    async fn update_section(
        &self,
        proposal_id: ProposalId,
        section_id: SectionId,
        update: &SectionUpdate,
    ) -> Result<Option<Section>, ApiError>;

    async fn rag_query(&self, request: &RagQueryRequest) -> Result<RagResponse, ApiError>;

    async fn generate_section(
        &self,
        request: &GenerateSectionRequest,
    ) -> Result<RagResponse, ApiError>;

    async fn compliance_check(
        &self,
        request: &ComplianceCheckRequest,
    ) -> Result<ComplianceResponse, ApiError>;

    async fn rag_history(&self) -> Result<Vec<HistoryEntry>, ApiError>;

    async fn rag_health(&self) -> Result<HealthReport, ApiError>;
}

#[derive(Debug, Clone, Copy)]
enum Verb {
    Get,
    Post,
    Put,
}

/// `gloo-net` backend bound to one [`RequestContext`].
#[derive(Debug, Clone)]
pub struct HttpBackend {
    ctx: RequestContext,
}

impl HttpBackend {
    pub fn new(ctx: RequestContext) -> Self {
        Self { ctx }
    }

    fn builder(&self, verb: Verb, path: &str) -> RequestBuilder {
        let url = self.ctx.url(path);
        let builder = match verb {
            Verb::Get => Request::get(&url),
            Verb::Post => Request::post(&url),
            Verb::Put => Request::put(&url),
        }
        .header("Content-Type", "application/json");
        match self.ctx.authorization() {
            Some(value) => builder.header("Authorization", &value),
            None => builder,
        }
    }

    async fn call<B, T>(
        &self,
        verb: Verb,
        path: &str,
        body: Option<&B>,
    ) -> Result<Option<T>, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let builder = self.builder(verb, path);
        let request = match body {
            Some(body) => builder
                .json(body)
                .map_err(|e| ApiError::Transport(format!("failed to serialize request: {e}")))?,
            None => builder
                .build()
                .map_err(|e| ApiError::Transport(e.to_string()))?,
        };

        let response = request
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        decode_response(status, &text)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let decoded = self.call::<(), T>(Verb::Get, path, None).await?;
        require_body(decoded, path)
    }

    async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let decoded = self.call(Verb::Post, path, Some(body)).await?;
        require_body(decoded, path)
    }
}

#[async_trait(?Send)]
impl TenderBackend for HttpBackend {
    async fn list_proposals(&self, limit: u32) -> Result<ProposalList, ApiError> {
        self.get(&format!("/proposals?limit={limit}")).await
    }

    async fn get_proposal(&self, id: ProposalId) -> Result<ProposalDetail, ApiError> {
        self.get(&format!("/proposals/{id}")).await
    }

    async fn update_section(
        &self,
        proposal_id: ProposalId,
        section_id: SectionId,
        update: &SectionUpdate,
    ) -> Result<Option<Section>, ApiError> {
        let path = format!("/proposals/{proposal_id}/sections/{section_id}");
        self.call(Verb::Put, &path, Some(update)).await
    }

    async fn rag_query(&self, request: &RagQueryRequest) -> Result<RagResponse, ApiError> {
        self.post("/rag/query", request).await
    }

    async fn generate_section(
        &self,
        request: &GenerateSectionRequest,
    ) -> Result<RagResponse, ApiError> {
        self.post("/rag/generate-section", request).await
    }

    async fn compliance_check(
        &self,
        request: &ComplianceCheckRequest,
    ) -> Result<ComplianceResponse, ApiError> {
        self.post("/rag/compliance-check", request).await
    }

    async fn rag_history(&self) -> Result<Vec<HistoryEntry>, ApiError> {
        self.get("/rag/history").await
    }

    async fn rag_health(&self) -> Result<HealthReport, ApiError> {
        self.get("/rag/health").await
    }
}

/// Turn a non-2xx response into the single message the UI shows.
pub fn describe_http_error(status: u16, body: &str) -> ApiError {
    let detail = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| match b.detail {
            serde_json::Value::String(s) if !s.trim().is_empty() => Some(s),
            serde_json::Value::Null => None,
            serde_json::Value::String(_) => None,
            other => Some(other.to_string()),
        });

    ApiError::Http {
        status,
        message: detail.unwrap_or_else(|| format!("HTTP {status}")),
    }
}

/// Map status + body to a typed value. 204 and empty bodies decode to `None`.
pub fn decode_response<T: DeserializeOwned>(
    status: u16,
    body: &str,
) -> Result<Option<T>, ApiError> {
    if !(200..300).contains(&status) {
        return Err(describe_http_error(status, body));
    }
    if status == 204 || body.trim().is_empty() {
        return Ok(None);
    }
    serde_json::from_str(body)
        .map(Some)
        .map_err(|e| ApiError::Decode(e.to_string()))
}

fn require_body<T>(decoded: Option<T>, path: &str) -> Result<T, ApiError> {
    decoded.ok_or_else(|| ApiError::Decode(format!("empty response body from {path}")))
}
