pub mod forum;
pub mod post;
pub mod subscription;
pub mod topic;
