//! Per-domain state containers.
//!
//! # Design
//! Every action runs in three phases: `begin_*` marks the slice loading and
//! returns a [`Ticket`]; exactly one of `fulfill_*` / `reject` later settles
//! it. Settling functions return `false` and leave the state untouched when
//! the ticket is stale:
//!
//! - fetch channels are *latest-wins*: only the most recently issued ticket
//!   of the channel may settle, so two quick page loads cannot land out of
//!   order;
//! - mutation channels accept every ticket, since two cancellations of
//!   different bookings are both meaningful;
//! - `clear()` (logout) invalidates every outstanding ticket of the slice.
//!
//! A slice is loading while any of its channels has an unsettled ticket, so
//! two saves in flight keep it loading until both have settled. A superseded
//! latest-wins ticket no longer counts.
//!
//! Slice fields are private. The settling functions are the only way to
//! change them.

pub mod bookings;
pub mod favorites;
pub mod messes;
pub mod reviews;

use std::collections::BTreeSet;

use tracing::debug;

use crate::types::Identified;

pub use bookings::BookingState;
pub use favorites::FavoritesState;
pub use messes::MessState;
pub use reviews::ReviewState;

/// Handle for one in-flight action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    channel: &'static str,
    seq: u64,
    epoch: u64,
}

impl Ticket {
    pub fn channel(&self) -> &'static str {
        self.channel
    }

    pub fn seq(&self) -> u64 {
        self.seq
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ordering {
    LatestWins,
    Every,
}

/// Issues tickets for one action channel and decides whether a ticket may
/// still settle.
#[derive(Debug, Clone)]
pub struct Sequencer {
    channel: &'static str,
    ordering: Ordering,
    latest: u64,
    epoch: u64,
    outstanding: BTreeSet<u64>,
}

impl Sequencer {
    pub fn latest_wins(channel: &'static str) -> Self {
        Self {
            channel,
            ordering: Ordering::LatestWins,
            latest: 0,
            epoch: 0,
            outstanding: BTreeSet::new(),
        }
    }

    pub fn every(channel: &'static str) -> Self {
        Self {
            ordering: Ordering::Every,
            ..Self::latest_wins(channel)
        }
    }

    pub fn issue(&mut self) -> Ticket {
        self.latest += 1;
        if self.ordering == Ordering::LatestWins {
            self.outstanding.clear();
        }
        self.outstanding.insert(self.latest);
        Ticket {
            channel: self.channel,
            seq: self.latest,
            epoch: self.epoch,
        }
    }

    pub fn accepts(&self, ticket: Ticket) -> bool {
        if ticket.channel != self.channel {
            return false;
        }
        let current = ticket.epoch == self.epoch
            && self.outstanding.contains(&ticket.seq)
            && (self.ordering == Ordering::Every || ticket.seq == self.latest);
        if !current {
            debug!(
                channel = ticket.channel,
                seq = ticket.seq,
                latest = self.latest,
                "discarding stale response"
            );
        }
        current
    }

    /// Accept `ticket` and retire it. Each ticket settles at most once.
    pub fn settle(&mut self, ticket: Ticket) -> bool {
        if !self.accepts(ticket) {
            return false;
        }
        self.outstanding.remove(&ticket.seq);
        true
    }

    pub fn in_flight(&self) -> bool {
        !self.outstanding.is_empty()
    }

    /// Outstanding tickets will no longer be accepted.
    pub fn invalidate(&mut self) {
        self.epoch += 1;
        self.outstanding.clear();
    }
}

/// Error flag shared by every slice. Loading is derived from the slice's
/// sequencers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AsyncStatus {
    error: Option<String>,
}

impl AsyncStatus {
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn pending(&mut self) {
        self.error = None;
    }

    pub fn rejected(&mut self, message: &str) {
        self.error = Some(message.to_string());
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }
}

/// Append `incoming` entries whose id is not already in `list`.
pub fn append_unique<T: Identified>(list: &mut Vec<T>, incoming: Vec<T>) {
    for item in incoming {
        if !list.iter().any(|existing| existing.id() == item.id()) {
            list.push(item);
        }
    }
}

/// Replace the entry with the same id, if any. Returns whether one matched.
pub fn replace_by_id<T: Identified + Clone>(list: &mut [T], item: &T) -> bool {
    match list.iter_mut().find(|existing| existing.id() == item.id()) {
        Some(slot) => {
            *slot = item.clone();
            true
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Item(&'static str, u32);

    impl Identified for Item {
        fn id(&self) -> &str {
            self.0
        }
    }

    #[test]
    fn latest_wins_rejects_older_ticket() {
        let mut seq = Sequencer::latest_wins("list");
        let first = seq.issue();
        let second = seq.issue();
        assert!(!seq.accepts(first));
        assert!(seq.accepts(second));
    }

    #[test]
    fn every_accepts_all_tickets_until_invalidated() {
        let mut seq = Sequencer::every("cancel");
        let first = seq.issue();
        let second = seq.issue();
        assert!(seq.accepts(first));
        assert!(seq.accepts(second));
        seq.invalidate();
        assert!(!seq.accepts(first));
        let third = seq.issue();
        assert!(seq.accepts(third));
    }

    #[test]
    fn ticket_from_other_channel_is_rejected() {
        let mut list = Sequencer::latest_wins("list");
        let mut detail = Sequencer::latest_wins("detail");
        let ticket = detail.issue();
        list.issue();
        assert!(!list.accepts(ticket));
    }

    #[test]
    fn append_unique_skips_known_ids() {
        let mut list = vec![Item("a", 1)];
        append_unique(&mut list, vec![Item("a", 2), Item("b", 1), Item("b", 3)]);
        assert_eq!(list, vec![Item("a", 1), Item("b", 1)]);
    }

    #[test]
    fn replace_by_id_patches_in_place() {
        let mut list = vec![Item("a", 1), Item("b", 1)];
        assert!(replace_by_id(&mut list, &Item("b", 9)));
        assert!(!replace_by_id(&mut list, &Item("c", 9)));
        assert_eq!(list, vec![Item("a", 1), Item("b", 9)]);
    }

    #[test]
    fn settle_retires_ticket_once() {
        let mut seq = Sequencer::every("save");
        let first = seq.issue();
        let second = seq.issue();
        assert!(seq.settle(first));
        assert!(seq.in_flight());
        assert!(!seq.settle(first));
        assert!(seq.settle(second));
        assert!(!seq.in_flight());
    }

    #[test]
    fn superseded_ticket_is_not_in_flight() {
        let mut seq = Sequencer::latest_wins("list");
        let old = seq.issue();
        let new = seq.issue();
        assert!(seq.settle(new));
        assert!(!seq.in_flight());
        assert!(!seq.settle(old));
    }

    #[test]
    fn status_phases() {
        let mut status = AsyncStatus::default();
        status.rejected("boom");
        assert_eq!(status.error(), Some("boom"));
        status.pending();
        assert_eq!(status.error(), None);
        status.rejected("again");
        status.clear_error();
        assert_eq!(status.error(), None);
    }
}
