#[allow(dead_code, unused_imports)]
pub mod conversation_repo;
#[allow(dead_code, unused_imports)]
pub mod message_repo;

#[allow(dead_code, unused_imports)]
pub use conversation_repo::MockConversationRepo;
#[allow(dead_code, unused_imports)]
pub use message_repo::MockMessageRepo;
#[allow(dead_code, unused_imports)]
pub use order_repo::MockOrderRepo;
#[allow(dead_code, unused_imports)]
pub use product_repo::MockProductRepo;
#[allow(dead_code, unused_imports)]
pub use store::{MemoryStore, StoreState};
#[allow(dead_code, unused_imports)]
pub use user_repo::MockUserRepo;
