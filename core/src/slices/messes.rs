//! Listings, the listing being viewed, and the home carousel.

use super::{append_unique, replace_by_id, AsyncStatus, Sequencer, Ticket};
use crate::types::{HomeSlider, Mess, MessPage, Pagination};

#[derive(Debug, Clone)]
pub struct MessState {
    messes: Vec<Mess>,
    current_mess: Option<Mess>,
    pagination: Option<Pagination>,
    sliders: Vec<HomeSlider>,
    status: AsyncStatus,
    requested_page: u32,
    list_seq: Sequencer,
    detail_seq: Sequencer,
    slider_seq: Sequencer,
}

impl Default for MessState {
    fn default() -> Self {
        Self {
            messes: Vec::new(),
            current_mess: None,
            pagination: None,
            sliders: Vec::new(),
            status: AsyncStatus::default(),
            requested_page: 1,
            list_seq: Sequencer::latest_wins("messes/list"),
            detail_seq: Sequencer::latest_wins("messes/detail"),
            slider_seq: Sequencer::latest_wins("messes/sliders"),
        }
    }
}

impl MessState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messes(&self) -> &[Mess] {
        &self.messes
    }

    pub fn current_mess(&self) -> Option<&Mess> {
        self.current_mess.as_ref()
    }

    pub fn pagination(&self) -> Option<&Pagination> {
        self.pagination.as_ref()
    }

    pub fn has_more(&self) -> bool {
        self.pagination.is_some_and(|p| p.has_more())
    }

    /// Page to request for infinite scroll.
    pub fn next_page(&self) -> u32 {
        self.pagination.map_or(1, |p| p.page + 1)
    }

    pub fn sliders(&self) -> &[HomeSlider] {
        &self.sliders
    }

    pub fn is_loading(&self) -> bool {
        [&self.list_seq, &self.detail_seq, &self.slider_seq]
            .iter()
            .any(|seq| seq.in_flight())
    }

    pub fn error(&self) -> Option<&str> {
        self.status.error()
    }

    // --- list / search -----------------------------------------------------

    /// Listing and search share one channel: a new search supersedes a page
    /// load still in flight.
    pub fn begin_fetch(&mut self, page: u32) -> Ticket {
        self.status.pending();
        self.requested_page = page.max(1);
        self.list_seq.issue()
    }

    /// Page 1 replaces the list; later pages append unseen ids only.
    pub fn fulfill_fetch(&mut self, ticket: Ticket, page: MessPage) -> bool {
        if !self.list_seq.settle(ticket) {
            return false;
        }
        if self.requested_page <= 1 {
            self.messes = page.messes;
        } else {
            append_unique(&mut self.messes, page.messes);
        }
        self.pagination = Some(page.pagination);
        true
    }

    // --- detail ------------------------------------------------------------

    pub fn begin_fetch_one(&mut self) -> Ticket {
        self.status.pending();
        self.detail_seq.issue()
    }

    /// Also patches the same listing in the loaded list, so list and detail
    /// views agree (view count, rating) without a refetch.
    pub fn fulfill_fetch_one(&mut self, ticket: Ticket, mess: Mess) -> bool {
        if !self.detail_seq.settle(ticket) {
            return false;
        }
        replace_by_id(&mut self.messes, &mess);
        self.current_mess = Some(mess);
        true
    }

    pub fn clear_current(&mut self) {
        self.current_mess = None;
    }

    // --- sliders -----------------------------------------------------------

    pub fn begin_fetch_sliders(&mut self) -> Ticket {
        self.status.pending();
        self.slider_seq.issue()
    }

    pub fn fulfill_fetch_sliders(&mut self, ticket: Ticket, sliders: Vec<HomeSlider>) -> bool {
        if !self.slider_seq.settle(ticket) {
            return false;
        }
        self.sliders = sliders;
        true
    }

    // --- shared ------------------------------------------------------------

    pub fn reject(&mut self, ticket: Ticket, message: &str) -> bool {
        let settled = [&mut self.list_seq, &mut self.detail_seq, &mut self.slider_seq]
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
        self.messes.clear();
        self.current_mess = None;
        self.pagination = None;
        self.status = AsyncStatus::default();
        self.requested_page = 1;
        self.list_seq.invalidate();
        self.detail_seq.invalidate();
        self.slider_seq.invalidate();
    }
}
