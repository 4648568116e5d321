use iconseek_core::IconRecord;

use crate::client::IconSearch;
use crate::error::SearchError;
use crate::protocol::SearchResults;

/// Handle for one issued search. Only the newest ticket is accepted back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchTicket {
    generation: u64,
}

/// View state of a results page: the current query, whether a search is in
/// flight, and either the last results or a message to show.
#[derive(Debug, Default)]
pub struct SearchSession {
    query: String,
    generation: u64,
    loading: bool,
    results: Vec<IconRecord>,
    error: Option<String>,
}

impl SearchSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a search for `query`.
    /// Blank queries are ignored: state is untouched and no ticket is issued.
    pub fn begin(&mut self, query: &str) -> Option<SearchTicket> {
        let query = query.trim();
        if query.is_empty() {
            return None;
        }
        self.generation += 1;
        self.query = query.to_string();
        self.loading = true;
        self.error = None;
        Some(SearchTicket {
            generation: self.generation,
        })
    }

    /// Record the outcome of the search behind `ticket`.
    /// Returns false, changing nothing, if a newer search has started since.
    pub fn complete(
        &mut self,
        ticket: SearchTicket,
        outcome: Result<SearchResults, SearchError>,
    ) -> bool {
        if ticket.generation != self.generation {
            tracing::debug!(
                "Discarding stale search response (generation {} < {})",
                ticket.generation,
                self.generation
            );
            return false;
        }
        self.loading = false;
        match outcome {
            Ok(results) => {
                self.results = results.icons;
                self.error = None;
            }
            Err(e) => {
                tracing::warn!("Icon search for {:?} failed: {}", self.query, e);
                self.results.clear();
                self.error = Some(e.user_message());
            }
        }
        true
    }

    /// Begin, run and complete a search against `client`.
    /// Returns false if the query was blank and nothing was issued.
    pub async fn run<S: IconSearch>(&mut self, client: &S, query: &str) -> bool {
        let Some(ticket) = self.begin(query) else {
            return false;
        };
        let outcome = client.search(&self.query).await;
        self.complete(ticket, outcome)
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn results(&self) -> &[IconRecord] {
        &self.results
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}
