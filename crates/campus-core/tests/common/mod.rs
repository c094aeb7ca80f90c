#![allow(dead_code)]

pub mod voice;

use campus_db::course::{assignment, course, module};
use campus_db::user::{Mutation, NewUser};
use campus_entity::course::assignment::Model as Assignment;
use campus_entity::course::{course::Model as Course, module::Model as Module};
use campus_entity::user::{Model as User, Role};
use chrono::{Duration, NaiveDate, Utc};
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, DbConn, DbErr};

pub async fn setup_schema(db: &DbConn) -> Result<(), DbErr> {
    let migration = match db.get_database_backend() {
        sea_orm::DatabaseBackend::Sqlite => {
            include_str!("../../../campus-server/migrations/sqlite/2025-02-03-101500_create_campus/up.sql")
        }
        sea_orm::DatabaseBackend::Postgres => {
            include_str!("../../../campus-server/migrations/postgres/2025-02-03-101500_create_campus/up.sql")
        }
        #[allow(clippy::unimplemented)]
        sea_orm::DatabaseBackend::MySql => unimplemented!(),
    };

    db.execute_unprepared(migration).await?;
    Ok(())
}

pub async fn connect() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    setup_schema(&db).await.unwrap();
    db
}

pub async fn create_test_user(db: &DatabaseConnection, username: &str, role: Role) -> User {
    let (user, _) = Mutation::create_user(
        db,
        NewUser {
            username: username.to_owned(),
            email: format!("{username}@example.org"),
            first_name: String::new(),
            last_name: String::new(),
            role,
            accept_terms: true,
            accept_privacy: true,
        },
    )
    .await
    .unwrap();
    user
}

pub async fn create_test_course(db: &DatabaseConnection, instructor: &User, slug: &str) -> (Course, Module) {
    let course = course::Mutation::create_course(
        db,
        instructor.id,
        format!("Course {slug}"),
        slug.to_owned(),
        String::new(),
        (
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2030, 12, 31).unwrap(),
        ),
    )
    .await
    .unwrap();
    let module = module::Mutation::create_module(db, course.id, "Week 1".to_owned(), String::new(), 0)
        .await
        .unwrap();
    (course, module)
}

/// An assignment due `days` from now; negative values are past due.
pub async fn create_test_assignment(db: &DatabaseConnection, module: &Module, title: &str, days: i64) -> Assignment {
    let due_date = (Utc::now() + Duration::days(days)).fixed_offset();
    assignment::Mutation::create_assignment(db, module.id, title.to_owned(), String::new(), Some(due_date), 10)
        .await
        .unwrap()
}
