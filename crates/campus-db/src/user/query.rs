use campus_entity::access_tokens::{Column as AccessTokenColumn, Entity as AccessToken};
use campus_entity::profile::{Entity as ProfileEntity, Model as Profile};
use campus_entity::user::{Column, Entity, Model as User};
use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder};
use std::error::Error;
use uuid::Uuid;

pub struct Query;

impl Query {
    pub async fn find_user_by_id<C: ConnectionTrait>(conn: &C, id: Uuid) -> Result<Option<User>, DbErr> {
        Entity::find_by_id(id).one(conn).await.inspect_err(|error| {
            tracing::error!(error = error as &dyn Error, "error loading user");
        })
    }

    pub async fn find_by_username<C: ConnectionTrait>(conn: &C, username: &str) -> Result<Option<User>, DbErr> {
        Entity::find()
            .filter(Column::Username.eq(username))
            .one(conn)
            .await
            .inspect_err(|error| {
                tracing::error!(error = error as &dyn Error, "error loading user by username");
            })
    }

    pub async fn find_users_by_ids<C: ConnectionTrait>(conn: &C, ids: Vec<Uuid>) -> Result<Vec<User>, DbErr> {
        if ids.is_empty() {
            return Ok(vec![]);
        }
        Entity::find()
            .filter(Column::Id.is_in(ids))
            .order_by_asc(Column::Username)
            .all(conn)
            .await
            .inspect_err(|error| {
                tracing::error!(error = error as &dyn Error, "error loading users");
            })
    }

    pub async fn find_by_token<C: ConnectionTrait>(conn: &C, token: &str) -> Result<Option<User>, DbErr> {
        Entity::find()
            .inner_join(AccessToken)
            .filter(AccessTokenColumn::AccessToken.eq(token))
            .filter(Column::IsActive.eq(true))
            .one(conn)
            .await
            .inspect_err(|error| {
                tracing::error!(error = error as &dyn Error, "error finding user by token");
            })
    }

    pub async fn find_profile<C: ConnectionTrait>(conn: &C, user_id: Uuid) -> Result<Option<Profile>, DbErr> {
        ProfileEntity::find_by_id(user_id)
            .one(conn)
            .await
            .inspect_err(|error| {
                tracing::error!(error = error as &dyn Error, "error loading profile");
            })
    }

    pub async fn find_user_with_profile<C: ConnectionTrait>(
        conn: &C,
        username: &str,
    ) -> Result<Option<(User, Option<Profile>)>, DbErr> {
        Entity::find()
            .filter(Column::Username.eq(username))
            .find_also_related(ProfileEntity)
            .one(conn)
            .await
            .inspect_err(|error| {
                tracing::error!(error = error as &dyn Error, "error loading user with profile");
            })
    }
}
