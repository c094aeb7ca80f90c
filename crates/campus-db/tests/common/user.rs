use campus_db::course::{course, module};
use campus_db::user::{Mutation, NewUser};
use campus_entity::course::{course::Model as Course, module::Model as Module};
use campus_entity::user::{Model as User, Role};
use chrono::NaiveDate;
use sea_orm::DatabaseConnection;

#[allow(dead_code)]
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

#[allow(dead_code)]
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
