use super::entities::{admin, Admin};
use super::remote;
use crate::application::IdentityProvider;
use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::{entity::*, DatabaseConnection};
use shopreview_errors::AppError;
use uuid::Uuid;

/// Moderator lookup against the `admins` table.
#[derive(Clone)]
pub struct AdminRepository {
    db: DatabaseConnection,
}

impl AdminRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl IdentityProvider for AdminRepository {
    async fn is_moderator(&self, user_id: Uuid) -> Result<bool, AppError> {
        let admin = Admin::find_by_id(user_id)
            .one(&self.db)
            .await
            .map_err(remote)?;
        Ok(admin.is_some())
    }

    async fn add_moderator(&self, user_id: Uuid, email: Option<String>) -> Result<(), AppError> {
        let row = admin::ActiveModel {
            user_id: Set(user_id),
            email: Set(email),
            created_at: Set(Utc::now()),
        };

        Admin::insert(row)
            .on_conflict(
                OnConflict::column(admin::Column::UserId)
                    .update_column(admin::Column::Email)
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await
            .map_err(remote)?;
        Ok(())
    }
}
