pub mod access;
pub mod assistant;
pub mod dashboard;
pub mod enrollment;
pub mod forum;
pub mod grading;
pub mod messaging;
pub mod status;
