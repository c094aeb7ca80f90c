pub(crate) mod accounts;
pub(crate) mod assistants;
pub(crate) mod courses;
pub(crate) mod dashboard;
pub(crate) mod forums;
pub(crate) mod messages;
pub(crate) mod notifications;
pub(crate) mod status;
