//! `FakeUserSchemaService` — an in-memory test double for `UserSchemaService`.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::error::ServiceError;
use crate::schema::{UserSchema, UserSchemaService};

pub struct FakeUserSchemaService {
    schemas: Mutex<HashMap<String, UserSchema>>,
}

impl FakeUserSchemaService {
    pub fn new() -> Self {
        Self {
            schemas: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_schema(self, name: impl Into<String>, schema: UserSchema) -> Self {
        self.schemas.lock().unwrap().insert(name.into(), schema);
        self
    }
}

impl Default for FakeUserSchemaService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserSchemaService for FakeUserSchemaService {
    async fn get_user_schema_by_name(&self, name: &str) -> Result<UserSchema, ServiceError> {
        self.schemas
            .lock()
            .unwrap()
            .get(name)
            .cloned()
            .ok_or_else(|| ServiceError::client("unknown_schema", "user schema not found"))
    }
}
