mod common;

use crate::common::setup_schema;
use crate::common::user::create_test_user;
use campus_db::{access_tokens, user};
use campus_entity::user::{ActiveModel as ActiveUserModel, Role};
use paste::paste;
use sea_orm::ActiveValue::{Set, Unchanged};
use sea_orm::Database;
use test_log::test;

#[test(tokio::test)]
async fn test_create_user_with_profile() {
    let db = &Database::connect("sqlite::memory:").await.unwrap();
    setup_schema(db).await.unwrap();

    let user = create_test_user(db, "ada", Role::Student).await;

    let (found, profile) = user::Query::find_user_with_profile(db, &user.username).await.unwrap().unwrap();
    assert_eq!(found, user);
    let profile = profile.unwrap();
    assert!(profile.accept_terms);
    assert_eq!(profile.bio, None);
}

#[test(tokio::test)]
async fn test_change_user() {
    let db = &Database::connect("sqlite::memory:").await.unwrap();
    setup_schema(db).await.unwrap();
    let user = create_test_user(db, "grace", Role::Teacher).await;

    user::Mutation::update_user(
        db,
        ActiveUserModel {
            id: Unchanged(user.id),
            first_name: Set("Grace".to_owned()),
            ..ActiveUserModel::default()
        },
    )
    .await
    .unwrap();

    let user = user::Query::find_by_username(db, "grace").await.unwrap().unwrap();
    assert_eq!(user.first_name, "Grace");
    assert_eq!(user.display_name(), "Grace");
    assert_eq!(user.role, Role::Teacher);
}

macro_rules! test_set_profile_field {
    ($i:ident, $v:expr_2021) => {
        paste! {
            #[test(tokio::test)]
            async fn [<test_update_profile_ $i>]() {
                let db = &Database::connect("sqlite::memory:").await.unwrap();
                setup_schema(db).await.unwrap();
                let user = create_test_user(db, "linus", Role::Student).await;

                user::Mutation::[<update_profile_ $i>](db, user.id, $v).await.unwrap();

                let profile = user::Query::find_profile(db, user.id).await.unwrap().unwrap();
                assert_eq!(profile.$i, $v);
            }
        }
    };
}

test_set_profile_field!(bio, Some("Likes penguins".to_owned()));
test_set_profile_field!(avatar, Some("avatars/x/me.png".to_owned()));
test_set_profile_field!(title, Some("Dr.".to_owned()));
test_set_profile_field!(department, Some("Computer Science".to_owned()));
test_set_profile_field!(office_hours, Some("Mon 10-12".to_owned()));

#[test(tokio::test)]
async fn test_find_by_token() {
    let db = &Database::connect("sqlite::memory:").await.unwrap();
    setup_schema(db).await.unwrap();
    let user = create_test_user(db, "margaret", Role::Admin).await;

    let token = access_tokens::Mutation::create_access_token(db, user.id).await.unwrap();
    let again = access_tokens::Mutation::create_access_token(db, user.id).await.unwrap();
    assert_eq!(token.access_token, again.access_token, "one token per user");

    let found = user::Query::find_by_token(db, &token.access_token).await.unwrap();
    assert_eq!(found.map(|user| user.id), Some(user.id));
    assert!(user::Query::find_by_token(db, "nope").await.unwrap().is_none());

    access_tokens::Mutation::delete_access_token(db, user.id).await.unwrap();
    assert!(user::Query::find_by_token(db, &token.access_token).await.unwrap().is_none());
}
