use crate::error::Result;
use crate::index::SearchServer;
use crate::ranking::DocumentFilter;
use crate::{Document, DocumentStatus, ExecutionMode, REQUEST_WINDOW};
use std::collections::VecDeque;

#[derive(Debug, Clone)]
struct QueryResult {
    request_number: u64,
    query: String,
    has_results: bool,
    results: Vec<Document>,
}

/// Sliding window over the most recent search requests against one server.
pub struct RequestQueue<'s> {
    server: &'s SearchServer,
    requests: VecDeque<QueryResult>,
    capacity: usize,
    next_request_number: u64,
}

impl<'s> RequestQueue<'s> {
    pub fn new(server: &'s SearchServer) -> Self { Self::with_capacity(server, REQUEST_WINDOW) }

    /// Queue keeping the last `capacity` requests. A capacity of zero is raised to one, so
    /// the latest request is always retrievable.
    pub fn with_capacity(server: &'s SearchServer, capacity: usize) -> Self {
        Self {
            server,
            requests: VecDeque::with_capacity(capacity.min(REQUEST_WINDOW)),
            capacity: capacity.max(1),
            next_request_number: 1,
        }
    }

    pub fn add_find_request(&mut self, raw_query: &str) -> Result<Vec<Document>> {
        self.add_find_request_with(ExecutionMode::Sequential, raw_query, DocumentStatus::Actual)
    }

    pub fn add_find_request_by<F: DocumentFilter>(&mut self, raw_query: &str, filter: F) -> Result<Vec<Document>> {
        self.add_find_request_with(ExecutionMode::Sequential, raw_query, filter)
    }

    /// Run the search and record it. A malformed query is returned as an error and not recorded.
    pub fn add_find_request_with<F: DocumentFilter>(
        &mut self,
        mode: ExecutionMode,
        raw_query: &str,
        filter: F,
    ) -> Result<Vec<Document>> {
        let results = self.server.find_top_documents_with(mode, raw_query, filter)?;
        if self.requests.len() >= self.capacity {
            self.requests.pop_front();
        }
        self.requests.push_back(QueryResult {
            request_number: self.next_request_number,
            query: raw_query.to_string(),
            has_results: !results.is_empty(),
            results: results.clone(),
        });
        self.next_request_number += 1;
        Ok(results)
    }

    pub fn query_size(&self) -> usize { self.requests.len() }

    /// Number the next recorded request will get.
    pub fn next_request_number(&self) -> u64 { self.next_request_number }

    pub fn no_result_requests(&self) -> usize { self.requests.iter().filter(|r| !r.has_results).count() }

    /// Query text and results of a request still inside the window.
    pub fn result_by_request_number(&self, request_number: u64) -> Option<(&str, &[Document])> {
        self.requests
            .iter()
            .find(|r| r.request_number == request_number)
            .map(|r| (r.query.as_str(), r.results.as_slice()))
    }
}
