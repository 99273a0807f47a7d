//! The signed-in user's bookings.
//!
//! Creation and cancellation update the list locally and set
//! `needs_reconcile`; the next full fetch replaces the list with the
//! server's view and clears it.

use super::{replace_by_id, AsyncStatus, Sequencer, Ticket};
use crate::types::{Booking, BookingCounts, BookingList};

#[derive(Debug, Clone)]
pub struct BookingState {
    bookings: Vec<Booking>,
    current_booking: Option<Booking>,
    counts: BookingCounts,
    status: AsyncStatus,
    needs_reconcile: bool,
    list_seq: Sequencer,
    detail_seq: Sequencer,
    create_seq: Sequencer,
    cancel_seq: Sequencer,
}

impl Default for BookingState {
    fn default() -> Self {
        Self {
            bookings: Vec::new(),
            current_booking: None,
            counts: BookingCounts::default(),
            status: AsyncStatus::default(),
            needs_reconcile: false,
            list_seq: Sequencer::latest_wins("bookings/list"),
            detail_seq: Sequencer::latest_wins("bookings/detail"),
            create_seq: Sequencer::every("bookings/create"),
            cancel_seq: Sequencer::every("bookings/cancel"),
        }
    }
}

impl BookingState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bookings(&self) -> &[Booking] {
        &self.bookings
    }

    pub fn current_booking(&self) -> Option<&Booking> {
        self.current_booking.as_ref()
    }

    pub fn counts(&self) -> &BookingCounts {
        &self.counts
    }

    pub fn is_loading(&self) -> bool {
        [&self.list_seq, &self.detail_seq, &self.create_seq, &self.cancel_seq]
            .iter()
            .any(|seq| seq.in_flight())
    }

    pub fn error(&self) -> Option<&str> {
        self.status.error()
    }

    /// Local edits the server has not confirmed through a full fetch yet.
    pub fn needs_reconcile(&self) -> bool {
        self.needs_reconcile
    }

    pub fn begin_fetch(&mut self) -> Ticket {
        self.status.pending();
        self.list_seq.issue()
    }

    pub fn fulfill_fetch(&mut self, ticket: Ticket, list: BookingList) -> bool {
        if !self.list_seq.settle(ticket) {
            return false;
        }
        self.bookings = list.bookings;
        self.counts = list.counts;
        self.needs_reconcile = false;
        true
    }

    pub fn begin_fetch_one(&mut self) -> Ticket {
        self.status.pending();
        self.detail_seq.issue()
    }

    pub fn fulfill_fetch_one(&mut self, ticket: Ticket, booking: Booking) -> bool {
        if !self.detail_seq.settle(ticket) {
            return false;
        }
        replace_by_id(&mut self.bookings, &booking);
        self.current_booking = Some(booking);
        true
    }

    pub fn begin_create(&mut self) -> Ticket {
        self.status.pending();
        self.create_seq.issue()
    }

    /// New bookings go to the front; the counts are stale until reconciled.
    pub fn fulfill_create(&mut self, ticket: Ticket, booking: Booking) -> bool {
        if !self.create_seq.settle(ticket) {
            return false;
        }
        self.bookings.retain(|existing| existing.id != booking.id);
        self.bookings.insert(0, booking.clone());
        self.current_booking = Some(booking);
        self.needs_reconcile = true;
        true
    }

    pub fn begin_cancel(&mut self) -> Ticket {
        self.status.pending();
        self.cancel_seq.issue()
    }

    pub fn fulfill_cancel(&mut self, ticket: Ticket, booking: Booking) -> bool {
        if !self.cancel_seq.settle(ticket) {
            return false;
        }
        replace_by_id(&mut self.bookings, &booking);
        if let Some(current) = self.current_booking.as_mut() {
            if current.id == booking.id {
                *current = booking;
            }
        }
        self.needs_reconcile = true;
        true
    }

    pub fn reject(&mut self, ticket: Ticket, message: &str) -> bool {
        let settled = [
            &mut self.list_seq,
            &mut self.detail_seq,
            &mut self.create_seq,
            &mut self.cancel_seq,
        ]
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

    pub fn clear_current(&mut self) {
        self.current_booking = None;
    }

    pub fn clear(&mut self) {
        self.bookings.clear();
        self.current_booking = None;
        self.counts = BookingCounts::default();
        self.status = AsyncStatus::default();
        self.needs_reconcile = false;
        self.list_seq.invalidate();
        self.detail_seq.invalidate();
        self.create_seq.invalidate();
        self.cancel_seq.invalidate();
    }
}
