use campus_db::notification::Query;
use campus_entity::notification::{self, NotificationType};
use chrono::Utc;
use sea_orm::{DatabaseBackend, DbErr, MockDatabase};
use test_log::test;
use uuid::Uuid;

#[test(tokio::test)]
async fn test_list_notifications() -> Result<(), DbErr> {
    let user_id = Uuid::new_v4();
    let models = [notification::Model {
        id: Uuid::new_v4(),
        user_id,
        notification_type: NotificationType::Course,
        title: "Enrolled".to_owned(),
        message: "You are enrolled".to_owned(),
        created_at: Utc::now().fixed_offset(),
        is_read: false,
        related_link: Some("/courses/rust-101".to_owned()),
        related_message_id: None,
        related_post_id: None,
        related_topic_id: None,
    }];
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([models.clone()])
        .into_connection();

    assert_eq!(Query::list_for_user(&db, user_id, true).await?, Vec::from(models));

    Ok(())
}
