// Journaling module

mod store;

pub use store::{JournalEntry, JournalStats, JournalStore};
