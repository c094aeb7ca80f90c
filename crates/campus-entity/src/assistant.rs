pub mod assistant;
pub mod conversation;
pub mod message;
