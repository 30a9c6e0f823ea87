//! Explicit list state held by the presentation layer
//!
//! Replaces a hidden module-level toy cache: the caller owns a
//! [`ToyListState`], feeds it query results tagged with tickets, and reads
//! the displayed toys back out of it.

use crate::core::error::CatalogError;
use crate::core::pipeline;
use crate::core::query::{FilterCriteria, SortCriteria, ToyQuery};
use crate::core::sequence::{QueryTicket, RequestSequencer};
use crate::core::toy::Toy;

/// Current criteria plus the list on display
#[derive(Debug)]
pub struct ToyListState {
    query: ToyQuery,
    toys: Vec<Toy>,
    sequencer: RequestSequencer,
    pending: Option<QueryTicket>,
}

impl ToyListState {
    /// An empty list that has not queried yet
    pub fn new(query: ToyQuery) -> Self {
        Self {
            query,
            toys: Vec::new(),
            sequencer: RequestSequencer::new(),
            pending: None,
        }
    }

    /// Criteria of the most recently issued query
    pub fn query(&self) -> &ToyQuery {
        &self.query
    }

    /// The toys on display
    pub fn toys(&self) -> &[Toy] {
        &self.toys
    }

    /// True while the latest issued query has not resolved
    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    /// Replace the filter and start a new query
    pub fn set_filter(&mut self, filter: FilterCriteria) -> (QueryTicket, ToyQuery) {
        self.query.filter = filter;
        self.begin_query()
    }

    /// Replace the sort and start a new query
    pub fn set_sort(&mut self, sort: SortCriteria) -> (QueryTicket, ToyQuery) {
        self.query.sort = sort;
        self.begin_query()
    }

    /// Move to another page and start a new query
    pub fn set_page(&mut self, page_idx: usize) -> (QueryTicket, ToyQuery) {
        self.query.page_idx = Some(page_idx);
        self.begin_query()
    }

    /// Issue a ticket for the current criteria
    ///
    /// Every earlier ticket becomes stale.
    pub fn begin_query(&mut self) -> (QueryTicket, ToyQuery) {
        let ticket = self.sequencer.issue();
        self.pending = Some(ticket);
        (ticket, self.query.clone())
    }

    /// Apply a query outcome if `ticket` is still the latest
    ///
    /// - stale ticket: dropped, returns `Ok(false)`
    /// - success: replaces the list, returns `Ok(true)`
    /// - failure: the list on display is kept and the error is returned
    pub fn resolve(
        &mut self,
        ticket: QueryTicket,
        result: Result<Vec<Toy>, CatalogError>,
    ) -> Result<bool, CatalogError> {
        if !self.sequencer.is_latest(ticket) {
            tracing::warn!(
                seq = ticket.seq(),
                latest = ?self.sequencer.latest().map(|t| t.seq()),
                "Discarding stale toy query result"
            );
            return Ok(false);
        }
        self.pending = None;
        self.toys = result?;
        Ok(true)
    }

    /// Reflect a saved toy without refetching
    ///
    /// The toy replaces its previous version or is appended, then the current
    /// criteria are re-applied so it lands where a fresh query would put it.
    pub fn apply_saved(&mut self, toy: Toy) {
        match self.toys.iter_mut().find(|t| t.id == toy.id) {
            Some(existing) => *existing = toy,
            None => self.toys.push(toy),
        }
        self.toys = pipeline::run(&self.toys, &self.query);
    }

    /// Drop a removed toy from the list; false when it was not displayed
    pub fn apply_removed(&mut self, id: &str) -> bool {
        let before = self.toys.len();
        self.toys.retain(|t| t.id != id);
        self.toys.len() != before
    }
}

impl Default for ToyListState {
    fn default() -> Self {
        Self::new(ToyQuery::initial())
    }
}
