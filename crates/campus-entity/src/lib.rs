pub mod access_tokens;
pub mod assistant;
pub mod course;
pub mod forum;
pub mod messaging;
pub mod notification;
pub mod profile;
pub mod user;
