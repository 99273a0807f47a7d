//! Reviews of the listing being viewed.

use super::{AsyncStatus, Sequencer, Ticket};
use crate::types::{Pagination, Review, ReviewPage};

#[derive(Debug, Clone)]
pub struct ReviewState {
    reviews: Vec<Review>,
    pagination: Option<Pagination>,
    status: AsyncStatus,
    needs_reconcile: bool,
    list_seq: Sequencer,
    create_seq: Sequencer,
    delete_seq: Sequencer,
}

impl Default for ReviewState {
    fn default() -> Self {
        Self {
            reviews: Vec::new(),
            pagination: None,
            status: AsyncStatus::default(),
            needs_reconcile: false,
            list_seq: Sequencer::latest_wins("reviews/list"),
            create_seq: Sequencer::every("reviews/create"),
            delete_seq: Sequencer::every("reviews/delete"),
        }
    }
}

impl ReviewState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reviews(&self) -> &[Review] {
        &self.reviews
    }

    pub fn pagination(&self) -> Option<&Pagination> {
        self.pagination.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        [&self.list_seq, &self.create_seq, &self.delete_seq]
            .iter()
            .any(|seq| seq.in_flight())
    }

    pub fn error(&self) -> Option<&str> {
        self.status.error()
    }

    pub fn needs_reconcile(&self) -> bool {
        self.needs_reconcile
    }

    pub fn begin_fetch(&mut self) -> Ticket {
        self.status.pending();
        self.list_seq.issue()
    }

    pub fn fulfill_fetch(&mut self, ticket: Ticket, page: ReviewPage) -> bool {
        if !self.list_seq.settle(ticket) {
            return false;
        }
        self.reviews = page.reviews;
        self.pagination = Some(page.pagination);
        self.needs_reconcile = false;
        true
    }

    pub fn begin_create(&mut self) -> Ticket {
        self.status.pending();
        self.create_seq.issue()
    }

    pub fn fulfill_create(&mut self, ticket: Ticket, review: Review) -> bool {
        if !self.create_seq.settle(ticket) {
            return false;
        }
        self.reviews.insert(0, review);
        self.needs_reconcile = true;
        true
    }

    pub fn begin_delete(&mut self) -> Ticket {
        self.status.pending();
        self.delete_seq.issue()
    }

    pub fn fulfill_delete(&mut self, ticket: Ticket, review_id: &str) -> bool {
        if !self.delete_seq.settle(ticket) {
            return false;
        }
        self.reviews.retain(|review| review.id != review_id);
        self.needs_reconcile = true;
        true
    }

    pub fn reject(&mut self, ticket: Ticket, message: &str) -> bool {
        let settled = [&mut self.list_seq, &mut self.create_seq, &mut self.delete_seq]
            .into_iter()
            .any(|seq| seq.settle(ticket));
        if !settled {
            return false;
        }
        self.status.rejected(message);
        true
    }

    pub fn clear_error(&mut self) {
        self.status.clear_error();
    }

    pub fn clear(&mut self) {
        self.reviews.clear();
        self.pagination = None;
        self.status = AsyncStatus::default();
        self.needs_reconcile = false;
        self.list_seq.invalidate();
        self.create_seq.invalidate();
        self.delete_seq.invalidate();
    }
}
