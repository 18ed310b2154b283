//! AI Search screen state.

use shared_types::{HealthReport, QueryMode, RagQueryRequest, RagResponse, RagSource};

use super::history::{HistoryCache, HistoryTicket};
use crate::config::ClientConfig;
use crate::error::{ApiError, EditorError};

/// Modes offered on the search screen.
pub const SEARCH_MODES: [QueryMode; 2] = [QueryMode::Qa, QueryMode::Search];

#[derive(Debug, Clone, PartialEq)]
pub struct QueryTicket {
    generation: u64,
    request: RagQueryRequest,
}

impl QueryTicket {
    pub fn request(&self) -> &RagQueryRequest {
        &self.request
    }
}

#[derive(Debug, Clone, Default)]
pub struct SearchSession {
    query: String,
    mode: QueryMode,
    answer: Option<String>,
    sources: Vec<RagSource>,
    error: Option<String>,
    in_flight: Option<u64>,
    generation: u64,
    temperature: Option<f32>,
    top_k: Option<u32>,
    pub history: HistoryCache,
}

impl SearchSession {
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            temperature: config.query_temperature,
            top_k: config.query_top_k,
            ..Default::default()
        }
    }

    pub fn set_query(&mut self, text: impl Into<String>) {
        self.query = text.into();
    }

    pub fn set_mode(&mut self, mode: QueryMode) {
        self.mode = mode;
    }

    pub fn begin_query(&mut self) -> Result<QueryTicket, EditorError> {
        let text = self.query.trim();
        if text.is_empty() {
            return Err(EditorError::EmptyQuery);
        }
        if self.in_flight.is_some() {
            return Err(EditorError::QueryBusy);
        }

        let mut request = RagQueryRequest::new(text, self.mode);
        request.temperature = self.temperature;
        request.top_k = self.top_k;

        self.generation += 1;
        self.in_flight = Some(self.generation);
        self.error = None;
        log::info!("search query issued in {} mode", self.mode.as_str());
        Ok(QueryTicket {
            generation: self.generation,
            request,
        })
    }

    /// Apply a query outcome. A successful query always yields a history
    /// refresh ticket, even when its answer is no longer displayed.
    pub fn complete_query(
        &mut self,
        ticket: QueryTicket,
        result: Result<RagResponse, ApiError>,
    ) -> Option<HistoryTicket> {
        if self.in_flight == Some(ticket.generation) {
            self.in_flight = None;
        }
        let current = ticket.generation == self.generation;

        match result {
            Ok(mut response) => {
                if current {
                    response.clamp_scores();
                    self.answer = Some(response.answer);
                    self.sources = response.sources;
                } else {
                    log::debug!("dropping search result replaced by a history entry");
                }
                Some(self.history.begin_refresh())
            }
            Err(e) => {
                if current {
                    log::warn!("search query failed: {e}");
                    self.answer = None;
                    self.sources.clear();
                    self.error = Some(e.to_string());
                }
                None
            }
        }
    }

    /// Show a past entry without a network round trip. History keeps no
    /// citations, so the source list is emptied.
    pub fn select_history(&mut self, id: i64) -> bool {
        let Some(entry) = self.history.get(id) else {
            return false;
        };
        self.query = entry.query.clone();
        self.answer = Some(entry.answer.clone());
        self.sources.clear();
        self.error = None;
        self.generation += 1;
        true
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn mode(&self) -> QueryMode {
        self.mode
    }

    pub fn answer(&self) -> Option<&str> {
        self.answer.as_deref()
    }

    pub fn sources(&self) -> &[RagSource] {
        &self.sources
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }
}

/// One-line engine status from `GET /rag/health`: flags as up/down, counts as is.
pub fn health_line(report: &HealthReport) -> String {
    if report.is_empty() {
        return "Engine status unavailable".to_string();
    }
    report
        .iter()
        .map(|(key, value)| {
            let name = key.replace('_', " ");
            match value {
                serde_json::Value::Bool(true) => format!("{name}: up"),
                serde_json::Value::Bool(false) => format!("{name}: down"),
                serde_json::Value::String(s) => format!("{name}: {s}"),
                other => format!("{name}: {other}"),
            }
        })
        .collect::<Vec<_>>()
        .join(" · ")
}
