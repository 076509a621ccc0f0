use tracing::{debug, error, info, warn};

use crate::dream::Dream;
use crate::store::JournalStore;

/// Saved dreams, newest first, mirrored to a [`JournalStore`] after every change.
///
/// Ids are unique within the collection. Storage failures are logged and
/// otherwise ignored: a failed read starts an empty journal and a failed
/// write leaves the in-memory collection authoritative.
#[derive(Debug)]
pub struct Journal {
    dreams: Vec<Dream>,
    store: Box<dyn JournalStore>,
}

impl Journal {
    /// Loads the journal once from `store`.
    pub fn open(store: impl JournalStore + 'static) -> Self {
        let dreams = match store.load() {
            Ok(mut dreams) => {
                let before = dreams.len();
                dedupe(&mut dreams);
                if dreams.len() != before {
                    warn!("Dropped {} duplicate journal entries", before - dreams.len());
                }
                info!("Loaded {} dreams from journal", dreams.len());
                dreams
            }
            Err(e) => {
                warn!("Failed to load dream journal, starting empty: {}", e);
                Vec::new()
            }
        };

        Self {
            dreams,
            store: Box::new(store),
        }
    }

    pub fn dreams(&self) -> &[Dream] {
        &self.dreams
    }

    pub fn len(&self) -> usize {
        self.dreams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dreams.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.dreams.iter().any(|d| d.id == id)
    }

    /// Dream at a 1-based position, newest first.
    pub fn at_position(&self, position: usize) -> Option<&Dream> {
        position.checked_sub(1).and_then(|i| self.dreams.get(i))
    }

    /// Adds `dream` at the front. Returns `false` when its id is already saved.
    pub fn save(&mut self, dream: Dream) -> bool {
        if self.contains(&dream.id) {
            debug!("Dream already in journal, not saving again");
            return false;
        }
        self.dreams.insert(0, dream);
        self.persist();
        true
    }

    /// Removes the dream with `id`. Returns `false` when there is none.
    pub fn delete(&mut self, id: &str) -> bool {
        let before = self.dreams.len();
        self.dreams.retain(|d| d.id != id);
        if self.dreams.len() == before {
            debug!("No dream with the given id, nothing deleted");
            return false;
        }
        self.persist();
        true
    }

    fn persist(&self) {
        if let Err(e) = self.store.save(&self.dreams) {
            error!("Failed to save dream journal: {}", e);
        }
    }
}

fn dedupe(dreams: &mut Vec<Dream>) {
    let mut seen = std::collections::HashSet::new();
    dreams.retain(|d| seen.insert(d.id.clone()));
}
