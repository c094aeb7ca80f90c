//! Permission predicates shared by the HTTP handlers.
//!
//! Course content is visible to the instructor and to students with an active enrollment. Staff get
//! no implicit access to course content, but they moderate every forum.

use campus_db::course::course;
use campus_db::course::enrollment;
use campus_entity::course::course::Model as Course;
use campus_entity::forum::forum::Model as Forum;
use campus_entity::user::Model as User;
use sea_orm::{ConnectionTrait, DbErr};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CourseAccess {
    pub is_instructor: bool,
    pub is_enrolled: bool,
}

impl CourseAccess {
    pub async fn load<C: ConnectionTrait>(conn: &C, course: &Course, user: &User) -> Result<Self, DbErr> {
        let is_instructor = course.instructor_id == user.id;
        let is_enrolled = !is_instructor && enrollment::Query::is_active_student(conn, user.id, course.id).await?;
        Ok(Self {
            is_instructor,
            is_enrolled,
        })
    }

    /// Inactive courses are hidden from everyone but their instructor.
    #[must_use]
    pub fn can_view(&self, course: &Course) -> bool {
        course.is_active || self.is_instructor
    }

    #[must_use]
    pub fn can_read_content(&self) -> bool {
        self.is_instructor || self.is_enrolled
    }

    #[must_use]
    pub fn can_edit(&self) -> bool {
        self.is_instructor
    }
}

/// General forums are open to everyone. Course forums need the instructor or an active enrollment.
pub async fn can_access_forum<C: ConnectionTrait>(conn: &C, forum: &Forum, user: &User) -> Result<bool, DbErr> {
    if user.is_staff() {
        return Ok(true);
    }
    if !forum.is_active {
        return Ok(false);
    }
    let Some(course_id) = forum.course_id else {
        return Ok(true);
    };
    let Some(course) = course::Query::find_by_id(conn, course_id).await? else {
        return Ok(false);
    };
    Ok(CourseAccess::load(conn, &course, user).await?.can_read_content())
}

/// Staff moderate everything, instructors moderate the forum of their course.
pub async fn can_moderate<C: ConnectionTrait>(conn: &C, forum: &Forum, user: &User) -> Result<bool, DbErr> {
    if user.is_staff() {
        return Ok(true);
    }
    let Some(course_id) = forum.course_id else {
        return Ok(false);
    };
    Ok(course::Query::find_by_id(conn, course_id)
        .await?
        .is_some_and(|course| course.instructor_id == user.id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use uuid::Uuid;

    fn course(instructor_id: Uuid, is_active: bool) -> Course {
        let now = Utc::now().fixed_offset();
        Course {
            id: Uuid::new_v4(),
            title: "Networks".to_owned(),
            slug: "networks".to_owned(),
            description: String::new(),
            instructor_id,
            start_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2025, 6, 30).unwrap(),
            is_active,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_course_access_flags() {
        let instructor = CourseAccess {
            is_instructor: true,
            is_enrolled: false,
        };
        let student = CourseAccess {
            is_instructor: false,
            is_enrolled: true,
        };
        let outsider = CourseAccess::default();

        let inactive = course(Uuid::new_v4(), false);
        assert!(instructor.can_view(&inactive));
        assert!(!student.can_view(&inactive));
        assert!(outsider.can_view(&course(Uuid::new_v4(), true)));

        assert!(instructor.can_read_content() && instructor.can_edit());
        assert!(student.can_read_content() && !student.can_edit());
        assert!(!outsider.can_read_content());
    }
}
