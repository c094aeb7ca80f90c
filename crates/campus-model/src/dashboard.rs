use crate::course::Course;
use crate::course::assignment::{Assignment, Submission};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TaughtCourse {
    #[serde(flatten)]
    pub course: Course,
    pub student_count: u64,
    pub assignment_count: u64,
    pub submission_count: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TeacherDashboard {
    pub courses: Vec<TaughtCourse>,
    pub ungraded_submissions: Vec<Submission>,
    pub upcoming_assignments: Vec<Assignment>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StudentDashboard {
    pub courses: Vec<Course>,
    pub upcoming_assignments: Vec<Assignment>,
    pub recent_submissions: Vec<Submission>,
    pub recent_grades: Vec<Submission>,
    pub missing_assignments: Vec<Assignment>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum DashboardView {
    Teacher(TeacherDashboard),
    Student(StudentDashboard),
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Dashboard {
    #[serde(flatten)]
    pub view: DashboardView,
    pub unread_notifications: u64,
    pub unread_messages: u64,
}
