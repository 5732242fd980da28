use bson::doc;
use mongodb::Database;
use thiserror::Error;

use super::User;

pub static USER_COLLECTION_NAME: &str = "user";

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error(transparent)]
    Database(#[from] mongodb::error::Error),
}

/// Lookup of off-ledger accounts referenced by ledger transactions.
#[rocket::async_trait]
pub trait UserDirectory: Send + Sync {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, DirectoryError>;

    async fn register(&self, user: &User) -> Result<(), DirectoryError>;
}

#[rocket::async_trait]
impl UserDirectory for Database {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, DirectoryError> {
        let user = self
            .collection::<User>(USER_COLLECTION_NAME)
            .find_one(doc! { "username": username.to_lowercase() }, None)
            .await?;
        Ok(user)
    }

    async fn register(&self, user: &User) -> Result<(), DirectoryError> {
        self.collection::<User>(USER_COLLECTION_NAME)
            .insert_one(user, None)
            .await?;
        tracing::info!("registered {} as {}", user.username, user.role);
        Ok(())
    }
}
