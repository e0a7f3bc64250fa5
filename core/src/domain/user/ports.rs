use std::future::Future;

use uuid::Uuid;

use crate::domain::common::entities::app_errors::CoreError;

/// Maps the subject of an authentication token to the application user id.
#[cfg_attr(test, mockall::automock)]
pub trait UserRepository: Send + Sync {
    fn find_user_id_by_auth_id(
        &self,
        auth_id: Uuid,
    ) -> impl Future<Output = Result<Option<Uuid>, CoreError>> + Send;
}
