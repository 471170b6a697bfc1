//! Organization-unit contract consumed by OU-Creation and Auth-Assertion.

use async_trait::async_trait;

use crate::error::ServiceError;

#[derive(Debug, Clone)]
pub struct OrganizationUnit {
    pub id: String,
    pub name: String,
    pub handle: String,
}

#[derive(Debug, Clone)]
pub struct CreateOrganizationUnitRequest {
    pub name: String,
    pub handle: String,
    pub description: Option<String>,
    pub parent_id: Option<String>,
}

/// Known conflict reasons the OU-Creation executor maps to distinct failure
/// messages (§4.10).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OuConflict {
    NameTaken,
    HandleTaken,
}

#[async_trait]
pub trait OuService: Send + Sync {
    async fn create_organization_unit(
        &self,
        req: CreateOrganizationUnitRequest,
    ) -> Result<OrganizationUnit, OuCreationError>;

    async fn get_organization_unit(&self, id: &str) -> Result<OrganizationUnit, ServiceError>;
}

/// OU-Creation's own error shape: a known conflict, or a plain service
/// error. Kept distinct from `ServiceError` because the executor maps
/// `OuConflict` to two different stable failure messages, not one generic
/// client-error description.
#[derive(Debug, Clone)]
pub enum OuCreationError {
    Conflict(OuConflict),
    Service(ServiceError),
}

impl From<ServiceError> for OuCreationError {
    fn from(err: ServiceError) -> Self {
        OuCreationError::Service(err)
    }
}
