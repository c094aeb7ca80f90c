use crate::convert::{FromDbModel, FromModel, utc};
use campus_entity::profile::Model as ProfileModel;
use campus_entity::user::{Model as UserModel, Role as RoleModel};
use campus_model::user::{Profile, PublicUser, Role, User};

impl FromDbModel<RoleModel> for Role {
    fn from_db_model(model: RoleModel) -> Self {
        match model {
            RoleModel::Student => Self::Student,
            RoleModel::Teacher => Self::Teacher,
            RoleModel::Admin => Self::Admin,
        }
    }
}

impl FromModel<Role> for RoleModel {
    fn from_model(model: Role) -> Self {
        match model {
            Role::Student => Self::Student,
            Role::Teacher => Self::Teacher,
            Role::Admin => Self::Admin,
        }
    }
}

impl FromDbModel<UserModel> for User {
    fn from_db_model(model: UserModel) -> Self {
        Self {
            id: model.id,
            username: model.username,
            email: model.email,
            first_name: model.first_name,
            last_name: model.last_name,
            role: FromDbModel::from_db_model(model.role),
            date_joined: utc(model.date_joined),
        }
    }
}

impl FromDbModel<&UserModel> for PublicUser {
    fn from_db_model(model: &UserModel) -> Self {
        Self {
            id: model.id,
            username: model.username.clone(),
            display_name: model.display_name(),
            role: FromDbModel::from_db_model(model.role),
        }
    }
}

impl FromDbModel<UserModel> for PublicUser {
    fn from_db_model(model: UserModel) -> Self {
        Self::from_db_model(&model)
    }
}

impl FromDbModel<ProfileModel> for Profile {
    fn from_db_model(model: ProfileModel) -> Self {
        Self {
            bio: model.bio,
            avatar: model.avatar,
            title: model.title,
            department: model.department,
            office_hours: model.office_hours,
            accept_terms: model.accept_terms,
            accept_privacy: model.accept_privacy,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::{IntoDbModel, IntoModel};
    use chrono::Utc;
    use uuid::Uuid;

    #[test]
    fn test_public_user() {
        let user = UserModel {
            id: Uuid::new_v4(),
            username: "grace".to_owned(),
            email: "grace@example.org".to_owned(),
            first_name: "Grace".to_owned(),
            last_name: "Hopper".to_owned(),
            role: RoleModel::Teacher,
            is_active: true,
            date_joined: Utc::now().fixed_offset(),
        };
        let public: PublicUser = (&user).into_model();
        assert_eq!(public.display_name, "Grace Hopper");
        assert_eq!(public.role, Role::Teacher);

        let role: RoleModel = Role::Admin.into_db_model();
        assert_eq!(role, RoleModel::Admin);
    }
}
