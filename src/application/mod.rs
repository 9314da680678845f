pub mod conversation;

pub use conversation::ConversationService;
