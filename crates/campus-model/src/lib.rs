pub mod assistant;
pub mod course;
pub mod dashboard;
pub mod forum;
pub mod messaging;
pub mod notification;
pub mod status;
pub mod user;
pub mod validation;
