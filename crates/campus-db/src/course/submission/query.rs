use campus_entity::course::assignment::{self, Entity as Assignment};
use campus_entity::course::grade::{self, Entity as Grade};
use campus_entity::course::module::Column as ModuleColumn;
use campus_entity::course::submission::{Column, Entity, Model, Relation, SubmissionStatus};
use campus_entity::user;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DbErr, EntityTrait, JoinType, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
    RelationTrait,
};
use std::error::Error;
use uuid::Uuid;

pub struct Query;

impl Query {
    pub async fn find_by_id<C: ConnectionTrait>(conn: &C, id: Uuid) -> Result<Option<Model>, DbErr> {
        Entity::find_by_id(id).one(conn).await
    }

    pub async fn find_for_student<C: ConnectionTrait>(
        conn: &C,
        assignment_id: Uuid,
        student_id: Uuid,
    ) -> Result<Option<(Model, Option<grade::Model>)>, DbErr> {
        Entity::find()
            .find_also_related(Grade)
            .filter(Column::AssignmentId.eq(assignment_id))
            .filter(Column::StudentId.eq(student_id))
            .one(conn)
            .await
    }

    /// All submissions for an assignment with the submitting student and the grade, if any.
    pub async fn list_for_assignment<C: ConnectionTrait>(
        conn: &C,
        assignment_id: Uuid,
    ) -> Result<Vec<(Model, user::Model, Option<grade::Model>)>, DbErr> {
        let submissions = Entity::find()
            .find_also_related(user::Entity)
            .filter(Column::AssignmentId.eq(assignment_id))
            .order_by_asc(Column::SubmittedAt)
            .all(conn)
            .await
            .inspect_err(|error| {
                tracing::error!(error = error as &dyn Error, "error loading submissions");
            })?;
        let grades = Grade::find()
            .filter(grade::Column::SubmissionId.is_in(submissions.iter().map(|(submission, _)| submission.id)))
            .all(conn)
            .await?;

        Ok(submissions
            .into_iter()
            .filter_map(|(submission, student)| {
                let grade = grades.iter().find(|grade| grade.submission_id == submission.id).cloned();
                student.map(|student| (submission, student, grade))
            })
            .collect())
    }

    /// Submissions still waiting for a grade in any of the given courses, oldest first.
    pub async fn list_ungraded_for_courses<C: ConnectionTrait>(
        conn: &C,
        course_ids: Vec<Uuid>,
        limit: u64,
    ) -> Result<Vec<(Model, Option<assignment::Model>)>, DbErr> {
        Entity::find()
            .find_also_related(Assignment)
            .join(JoinType::InnerJoin, assignment::Relation::Module.def())
            .filter(ModuleColumn::CourseId.is_in(course_ids))
            .filter(Column::Status.eq(SubmissionStatus::Submitted))
            .order_by_asc(Column::SubmittedAt)
            .limit(limit)
            .all(conn)
            .await
    }

    pub async fn list_recent_for_student<C: ConnectionTrait>(
        conn: &C,
        student_id: Uuid,
        limit: u64,
    ) -> Result<Vec<(Model, Option<assignment::Model>)>, DbErr> {
        Entity::find()
            .find_also_related(Assignment)
            .filter(Column::StudentId.eq(student_id))
            .order_by_desc(Column::SubmittedAt)
            .limit(limit)
            .all(conn)
            .await
    }

    /// Ids of the assignments the student has handed something in for.
    pub async fn submitted_assignment_ids<C: ConnectionTrait>(conn: &C, student_id: Uuid) -> Result<Vec<Uuid>, DbErr> {
        Entity::find()
            .select_only()
            .column(Column::AssignmentId)
            .filter(Column::StudentId.eq(student_id))
            .into_tuple()
            .all(conn)
            .await
    }

    pub async fn count_for_assignment<C: ConnectionTrait>(conn: &C, assignment_id: Uuid) -> Result<u64, DbErr> {
        Entity::find()
            .filter(Column::AssignmentId.eq(assignment_id))
            .count(conn)
            .await
    }

    pub async fn count_for_course<C: ConnectionTrait>(conn: &C, course_id: Uuid) -> Result<u64, DbErr> {
        Entity::find()
            .join(JoinType::InnerJoin, Relation::Assignment.def())
            .join(JoinType::InnerJoin, assignment::Relation::Module.def())
            .filter(ModuleColumn::CourseId.eq(course_id))
            .count(conn)
            .await
    }
}
