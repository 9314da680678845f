pub mod common;
pub mod conversation_dto;
pub mod order_dto;

pub use common::*;
pub use conversation_dto::*;
pub use order_dto::*;
