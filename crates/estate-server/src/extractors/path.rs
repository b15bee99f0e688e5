use estate_core::{PropertyId, UserId};
use serde::Deserialize;

use crate::error::AppError;

/// Extractor para rutas /properties/{id}
#[derive(Debug, Deserialize)]
pub struct PropertyPath {
    pub id: String,
}

impl PropertyPath {
    pub fn property_id(&self) -> Result<PropertyId, AppError> {
        Ok(PropertyId::parse(&self.id)?)
    }
}

/// Extractor para rutas /users/{user_id}/properties
#[derive(Debug, Deserialize)]
pub struct UserPath {
    pub user_id: String,
}

impl UserPath {
    pub fn owner_id(&self) -> Result<UserId, AppError> {
        Ok(UserId::parse(&self.user_id)?)
    }
}
