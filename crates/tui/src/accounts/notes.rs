use std::collections::HashMap;

use api_types::account::AccountId;

/// Free-text notes per account.
///
/// Lives only in process memory and is never sent to the server. A note
/// disappears on restart or when its account is deleted.
#[derive(Debug, Default, Clone)]
pub struct NotesStore {
    notes: HashMap<AccountId, String>,
}

impl NotesStore {
    /// Last write wins. A blank note removes the entry.
    pub fn set(&mut self, id: AccountId, note: &str) {
        if note.trim().is_empty() {
            self.notes.remove(&id);
        } else {
            self.notes.insert(id, note.to_string());
        }
    }

    pub fn get(&self, id: AccountId) -> Option<&str> {
        self.notes.get(&id).map(String::as_str)
    }

    pub fn remove(&mut self, id: AccountId) -> Option<String> {
        self.notes.remove(&id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_write_wins() {
        let mut notes = NotesStore::default();
        notes.set(AccountId(1), "first");
        notes.set(AccountId(1), "second");
        assert_eq!(notes.get(AccountId(1)), Some("second"));
        assert_eq!(notes.get(AccountId(2)), None);
    }

    #[test]
    fn blank_note_clears_entry() {
        let mut notes = NotesStore::default();
        notes.set(AccountId(1), "rent");
        notes.set(AccountId(1), "   ");
        assert_eq!(notes.get(AccountId(1)), None);
        assert_eq!(notes.remove(AccountId(1)), None);
    }

    #[test]
    fn remove_returns_previous_note() {
        let mut notes = NotesStore::default();
        notes.set(AccountId(3), "joint account");
        assert_eq!(notes.remove(AccountId(3)).as_deref(), Some("joint account"));
        assert_eq!(notes.remove(AccountId(3)), None);
    }
}
