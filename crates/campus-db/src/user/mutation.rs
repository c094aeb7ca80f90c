use crate::util::{FlattenTransactionResultExt, now};
use campus_entity::profile;
use campus_entity::user::{ActiveModel, Entity, Model, Role};
use paste::paste;
use sea_orm::ActiveValue::{Set, Unchanged};
use sea_orm::{ActiveModelTrait, ConnectionTrait, DbErr, EntityTrait, TransactionTrait};
use std::error::Error;
use uuid::Uuid;

pub struct Mutation;

#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    pub accept_terms: bool,
    pub accept_privacy: bool,
}

macro_rules! update_profile_field {
    ($i:ident, $t:ty) => {
        paste! {
            pub async fn [<update_profile_ $i>]<C: ConnectionTrait>(conn: &C, user_id: Uuid, $i: Option<$t>) -> Result<profile::Model, DbErr> {
                let profile = profile::ActiveModel {
                    user_id: Unchanged(user_id),
                    $i: Set($i),
                    updated_at: Set(now()),
                    ..<profile::ActiveModel as std::default::Default>::default()
                };
                profile.update(conn).await
            }
        }
    };
}

impl Mutation {
    /// Creates the user together with its profile.
    pub async fn create_user<C: TransactionTrait>(conn: &C, new_user: NewUser) -> Result<(Model, profile::Model), DbErr> {
        conn.transaction::<_, _, DbErr>(|txn| {
            Box::pin(async move {
                let timestamp = now();
                let user = ActiveModel {
                    id: Set(Uuid::new_v4()),
                    username: Set(new_user.username),
                    email: Set(new_user.email),
                    first_name: Set(new_user.first_name),
                    last_name: Set(new_user.last_name),
                    role: Set(new_user.role),
                    is_active: Set(true),
                    date_joined: Set(timestamp),
                }
                .insert(txn)
                .await?;

                let profile = profile::ActiveModel {
                    user_id: Set(user.id),
                    bio: Set(None),
                    avatar: Set(None),
                    title: Set(None),
                    department: Set(None),
                    office_hours: Set(None),
                    accept_terms: Set(new_user.accept_terms),
                    accept_privacy: Set(new_user.accept_privacy),
                    updated_at: Set(timestamp),
                }
                .insert(txn)
                .await?;
                Ok((user, profile))
            })
        })
        .await
        .flatten_res()
        .inspect_err(|error: &DbErr| tracing::error!(error = error as &dyn Error, "failed to create user"))
    }

    pub async fn update_user<C: ConnectionTrait>(conn: &C, user: ActiveModel) -> Result<Model, DbErr> {
        user.update(conn).await
    }

    pub async fn update_profile<C: ConnectionTrait>(
        conn: &C,
        mut profile: profile::ActiveModel,
    ) -> Result<profile::Model, DbErr> {
        profile.updated_at = Set(now());
        profile.update(conn).await
    }

    update_profile_field!(bio, String);
    update_profile_field!(avatar, String);
    update_profile_field!(title, String);
    update_profile_field!(department, String);
    update_profile_field!(office_hours, String);

    pub async fn delete<C: ConnectionTrait>(conn: &C, user_id: Uuid) -> Result<(), DbErr> {
        let res = Entity::delete_by_id(user_id).exec(conn).await;
        if let Err(error) = res {
            tracing::error!(error = &error as &dyn Error, "failed to delete user");
            return Err(error);
        }
        Ok(())
    }
}
