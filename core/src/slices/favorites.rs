//! Saved listings.
//!
//! Entries are keyed by the saved listing's id (`SavedMess::mess_id`), not
//! by the favorite record's own id: removal goes through
//! `DELETE /favorites/{messId}` and screens ask "is this mess saved?".

use super::{AsyncStatus, Sequencer, Ticket};
use crate::types::SavedMess;

#[derive(Debug, Clone)]
pub struct FavoritesState {
    saved: Vec<SavedMess>,
    status: AsyncStatus,
    needs_reconcile: bool,
    list_seq: Sequencer,
    save_seq: Sequencer,
    remove_seq: Sequencer,
}

impl Default for FavoritesState {
    fn default() -> Self {
        Self {
            saved: Vec::new(),
            status: AsyncStatus::default(),
            needs_reconcile: false,
            list_seq: Sequencer::latest_wins("favorites/list"),
            save_seq: Sequencer::every("favorites/save"),
            remove_seq: Sequencer::every("favorites/remove"),
        }
    }
}

impl FavoritesState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn saved(&self) -> &[SavedMess] {
        &self.saved
    }

    pub fn is_saved(&self, mess_id: &str) -> bool {
        self.saved.iter().any(|entry| entry.mess_id() == mess_id)
    }

    pub fn is_loading(&self) -> bool {
        [&self.list_seq, &self.save_seq, &self.remove_seq]
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

    pub fn fulfill_fetch(&mut self, ticket: Ticket, saved: Vec<SavedMess>) -> bool {
        if !self.list_seq.settle(ticket) {
            return false;
        }
        self.saved = saved;
        self.needs_reconcile = false;
        true
    }

    pub fn begin_save(&mut self) -> Ticket {
        self.status.pending();
        self.save_seq.issue()
    }

    pub fn fulfill_save(&mut self, ticket: Ticket, entry: SavedMess) -> bool {
        if !self.save_seq.settle(ticket) {
            return false;
        }
        if !self.is_saved(entry.mess_id()) {
            self.saved.push(entry);
        }
        self.needs_reconcile = true;
        true
    }

    pub fn begin_remove(&mut self) -> Ticket {
        self.status.pending();
        self.remove_seq.issue()
    }

    pub fn fulfill_remove(&mut self, ticket: Ticket, mess_id: &str) -> bool {
        if !self.remove_seq.settle(ticket) {
            return false;
        }
        self.saved.retain(|entry| entry.mess_id() != mess_id);
        self.needs_reconcile = true;
        true
    }

    pub fn reject(&mut self, ticket: Ticket, message: &str) -> bool {
        let settled = [&mut self.list_seq, &mut self.save_seq, &mut self.remove_seq]
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
        self.saved.clear();
        self.status = AsyncStatus::default();
        self.needs_reconcile = false;
        self.list_seq.invalidate();
        self.save_seq.invalidate();
        self.remove_seq.invalidate();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn saved(json: serde_json::Value) -> Vec<SavedMess> {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn remove_filters_by_populated_mess_id() {
        let mut state = FavoritesState::new();
        let t = state.begin_fetch();
        state.fulfill_fetch(
            t,
            saved(serde_json::json!([
                {"_id": "f1", "mess_id": {"_id": "m1"}},
                {"_id": "f2", "mess_id": {"_id": "m2"}}
            ])),
        );

        let t = state.begin_remove();
        assert!(state.fulfill_remove(t, "m1"));
        assert_eq!(state.saved().len(), 1);
        assert_eq!(state.saved()[0].mess_id(), "m2");
        assert!(!state.is_saved("m1"));
    }

    #[test]
    fn remove_works_with_bare_id_relation() {
        let mut state = FavoritesState::new();
        let t = state.begin_fetch();
        state.fulfill_fetch(
            t,
            saved(serde_json::json!([{"_id": "f1", "mess_id": "m1"}, {"_id": "f2", "mess": "m2"}])),
        );
        let t = state.begin_remove();
        state.fulfill_remove(t, "m2");
        assert!(state.is_saved("m1"));
        assert!(!state.is_saved("m2"));
    }

    #[test]
    fn save_is_idempotent_per_mess() {
        let mut state = FavoritesState::new();
        let entry = saved(serde_json::json!([{"_id": "f1", "mess_id": "m1"}])).remove(0);
        let t = state.begin_save();
        state.fulfill_save(t, entry.clone());
        let t = state.begin_save();
        state.fulfill_save(t, entry);
        assert_eq!(state.saved().len(), 1);
        assert!(state.needs_reconcile());
    }

    #[test]
    fn loading_until_every_save_settles() {
        let mut state = FavoritesState::new();
        let entries = saved(serde_json::json!([
            {"_id": "f1", "mess_id": "m1"},
            {"_id": "f2", "mess_id": "m2"}
        ]));
        let first = state.begin_save();
        let second = state.begin_save();

        assert!(state.fulfill_save(first, entries[0].clone()));
        assert!(state.is_loading());
        assert!(!state.fulfill_save(first, entries[0].clone()));
        assert!(state.reject(second, "Mess not found"));
        assert!(!state.is_loading());
        assert_eq!(state.saved().len(), 1);
    }

    #[test]
    fn rejected_save_records_error() {
        let mut state = FavoritesState::new();
        let t = state.begin_save();
        assert!(state.reject(t, "Already saved"));
        assert_eq!(state.error(), Some("Already saved"));
        assert!(!state.is_loading());
    }

    #[test]
    fn clear_drops_everything() {
        let mut state = FavoritesState::new();
        let t = state.begin_fetch();
        state.fulfill_fetch(t, saved(serde_json::json!([{"_id": "f1", "mess_id": "m1"}])));
        let pending = state.begin_remove();
        state.clear();
        assert!(state.saved().is_empty());
        assert!(!state.fulfill_remove(pending, "m1"));
    }
}
