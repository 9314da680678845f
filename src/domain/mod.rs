pub mod conversation;
pub mod errors;
pub mod message;
pub mod order;
pub mod product;
pub mod user;

pub use conversation::{
    Conversation, ConversationParticipant, ConversationPriority, ConversationStatus,
    NewConversation, ParticipantRole, DEFAULT_SUBJECT,
};
pub use errors::DomainError;
pub use message::{
    amount_ceiling, check_amount, Message, MessagePayload, MessageType, OrderRequestDetails,
    OrderRequestState, OrderResponseDetails, PriceRange,
};
pub use order::{Order, OrderItem, OrderPricing, OrderStatus};
pub use product::Product;
pub use user::{ArtisanProfile, Role, User};
