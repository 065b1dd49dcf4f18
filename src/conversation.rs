//! Conversation timeline
//!
//! Entries are created once and appended to an ordered log; nothing in the
//! timeline is ever edited or removed.

mod entry;
mod store;

pub use entry::{ConversationEntry, EntryId, Origin, Payload};
pub use store::MessageStore;
