mod conversation_repository;
mod message_repository;
mod order_repository;
mod product_repository;
mod traits;
mod user_repository;

pub use conversation_repository::ConversationRepositoryImpl;
pub use message_repository::MessageRepositoryImpl;
pub use order_repository::OrderRepositoryImpl;
pub use product_repository::ProductRepositoryImpl;
pub use traits::{
    ConversationRepository, MessageRepository, OrderRepository, ProductRepository,
    UserRepository,
};
pub use user_repository::UserRepositoryImpl;
