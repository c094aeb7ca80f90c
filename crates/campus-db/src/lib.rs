pub mod access_tokens;
pub mod assistant;
pub mod course;
pub mod forum;
pub mod messaging;
pub mod notification;
pub mod user;
pub mod util;

pub use sea_orm;
