pub mod assignment;
pub mod content;
pub mod course;
pub mod enrollment;
pub mod grade;
pub mod module;
pub mod submission;
