use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use tracing::error;
use uuid::Uuid;

use crate::{
    domain::{common::entities::app_errors::CoreError, user::ports::UserRepository},
    entity::users::{Column as UserColumn, Entity as UserEntity},
};

#[derive(Debug, Clone)]
pub struct PostgresUserRepository {
    pub db: DatabaseConnection,
}

impl PostgresUserRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

impl UserRepository for PostgresUserRepository {
    async fn find_user_id_by_auth_id(&self, auth_id: Uuid) -> Result<Option<Uuid>, CoreError> {
        let user = UserEntity::find()
            .filter(UserColumn::AuthId.eq(auth_id))
            .one(&self.db)
            .await
            .map_err(|e| {
                error!("Failed to look up user by auth id: {}", e);
                CoreError::DatabaseError(e.to_string())
            })?;

        Ok(user.map(|u| u.id))
    }
}
