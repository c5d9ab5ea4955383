//! Web research for hypothesis suggestion.
//!
//! Two steps: ask the model for a few search queries, then run a bounded
//! tool-use loop with the provider's web-search tool and keep the final text.
//! Every failure is logged and turned into `None`; research never fails the
//! calling operation.

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::backend::{CompletionRequest, LlmBackend, Message, Tool};
use crate::extraction::extract;
use crate::kind::ReplyShape;

const QUERY_MAX_TOKENS: u32 = 512;
const RESEARCH_MAX_TOKENS: u32 = 2048;
const MAX_QUERIES: usize = 3;

pub struct WebResearcher {
    backend: Arc<dyn LlmBackend>,
    max_iterations: u32,
    timeout: Duration,
}

impl WebResearcher {
    pub fn new(backend: Arc<dyn LlmBackend>, max_iterations: u32, timeout: Duration) -> Self {
        Self {
            backend,
            max_iterations: max_iterations.max(1),
            timeout,
        }
    }

    /// Research summary for `topic`, or `None` when research is unavailable
    /// or fails.
    pub async fn research(&self, topic: &str) -> Option<String> {
        if !self.backend.capabilities().supports_web_search {
            debug!(backend = %self.backend.id(), "Backend has no web search, skipping research");
            return None;
        }

        match tokio::time::timeout(self.timeout, self.run(topic)).await {
            Ok(result) => result,
            Err(_) => {
                warn!(timeout_secs = self.timeout.as_secs(), "Web research timed out");
                None
            }
        }
    }

    async fn run(&self, topic: &str) -> Option<String> {
        let queries = self.queries(topic).await?;
        info!(count = queries.len(), "Running web research");

        let prompt = format!(
            "Search the web for recent evidence relevant to the product context below, \
             using these queries:\n{}\n\nContext:\n{}\n\n\
             Summarize the findings in a few short paragraphs, citing sources by name.",
            queries
                .iter()
                .map(|q| format!("- {}", q))
                .collect::<Vec<_>>()
                .join("\n"),
            topic
        );

        let mut request = CompletionRequest::user(prompt)
            .with_max_tokens(RESEARCH_MAX_TOKENS)
            .with_tool(Tool::WebSearch {
                max_uses: queries.len() as u32,
            });

        for iteration in 1..=self.max_iterations {
            let response = match self.backend.complete(request.clone()).await {
                Ok(response) => response,
                Err(e) => {
                    warn!(iteration, error = %e, "Web research call failed");
                    return None;
                }
            };

            if !response.wants_continuation() {
                let summary = response.content.trim().to_string();
                return (!summary.is_empty()).then_some(summary);
            }

            debug!(iteration, "Continuing web search turn");
            request = request.with_message(Message::assistant_blocks(response.blocks));
        }

        warn!(max_iterations = self.max_iterations, "Web research hit iteration cap");
        None
    }

    async fn queries(&self, topic: &str) -> Option<Vec<String>> {
        let prompt = format!(
            "Propose 2 to 3 web search queries that would surface evidence for or against \
             product hypotheses in this context:\n\n{}\n\n\
             Respond with a JSON array of strings only.",
            topic
        );
        let request = CompletionRequest::user(prompt).with_max_tokens(QUERY_MAX_TOKENS);

        let response = match self.backend.complete(request).await {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "Search query generation failed");
                return None;
            }
        };

        let Some(queries) = extract::<Vec<String>>(&response.content, ReplyShape::Array) else {
            warn!(raw = %response.content, "Failed to parse search queries");
            return None;
        };

        let queries: Vec<String> = queries
            .into_iter()
            .map(|q| q.trim().to_string())
            .filter(|q| !q.is_empty())
            .take(MAX_QUERIES)
            .collect();

        if queries.is_empty() {
            warn!("Model proposed no search queries");
            return None;
        }
        Some(queries)
    }
}
