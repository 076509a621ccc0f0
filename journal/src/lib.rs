// The dreamweaver-journal crate holds the saved-dream collection:
// - the Dream record
// - the persistence seam and its file-backed and in-memory slots
// - the Journal collection with dedupe and delete semantics

mod dream;
mod journal;

pub mod errors;
pub mod store;

pub use dream::{decode_image, DecodedImage, Dream};
pub use errors::{JournalError, JournalResult};
pub use journal::Journal;
pub use store::{FileJournalStore, InMemoryJournalStore, JournalStore};
