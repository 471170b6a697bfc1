//! OU-Creation executor (§4.10).

use std::sync::Arc;

use async_trait::async_trait;
use tracing::instrument;

use flow_collab::{CreateOrganizationUnitRequest, OuConflict, OuCreationError, OuService};
use flow_engine::{
    BaseExecutor, Executor, ExecutorError, ExecutorResponse, Input, InputType, NodeContext,
};

pub const NAME: &str = "OuCreationExecutor";

pub struct OuCreationExecutor {
    base: BaseExecutor,
    ou: Arc<dyn OuService>,
}

impl OuCreationExecutor {
    pub fn new(ou: Arc<dyn OuService>) -> Self {
        Self {
            base: BaseExecutor::new(
                vec![
                    Input::new("name", InputType::String, true),
                    Input::new("handle", InputType::String, true),
                    Input::new("description", InputType::String, false),
                ],
                vec![],
            ),
            ou,
        }
    }
}

#[async_trait]
impl Executor for OuCreationExecutor {
    fn name(&self) -> &str {
        NAME
    }

    #[instrument(skip(self, ctx), fields(flow_id = %ctx.flow_id, node_id = %ctx.current_node_id, executor = NAME))]
    async fn execute(&self, ctx: &NodeContext) -> Result<ExecutorResponse, ExecutorError> {
        let mut resp = ExecutorResponse::new();
        if !self.base.has_required_inputs(ctx, &mut resp) {
            return Ok(ExecutorResponse::user_input_required(resp.inputs));
        }

        let name = ctx.user_input("name").unwrap_or_default().to_string();
        let handle = ctx.user_input("handle").unwrap_or_default().to_string();
        let description = ctx.user_input("description").map(str::to_string);
        let parent_id = ctx.runtime("defaultOUID").map(str::to_string);

        let req = CreateOrganizationUnitRequest {
            name,
            handle,
            description,
            parent_id,
        };

        match self.ou.create_organization_unit(req).await {
            Ok(created) => {
                Ok(ExecutorResponse::complete().with_runtime_data("organizationUnitId", created.id))
            }
            Err(OuCreationError::Conflict(OuConflict::NameTaken)) => {
                Ok(ExecutorResponse::failure("Organization unit name already exists."))
            }
            Err(OuCreationError::Conflict(OuConflict::HandleTaken)) => {
                Ok(ExecutorResponse::failure("Organization unit handle already exists."))
            }
            Err(OuCreationError::Service(e)) if e.is_client() => {
                Ok(ExecutorResponse::failure(e.description().to_string()))
            }
            Err(OuCreationError::Service(e)) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait as _async_trait;
    use flow_collab::{OrganizationUnit, ServiceError};
    use flow_engine::{ApplicationView, AuthenticatedUser, ExecutorStatus, FlowType};
    use std::collections::HashMap;
    use std::sync::Mutex;

    struct FakeOu {
        result: Mutex<Option<Result<OrganizationUnit, OuCreationError>>>,
        seen_parent: Mutex<Option<String>>,
    }

    #[_async_trait]
    impl OuService for FakeOu {
        async fn create_organization_unit(
            &self,
            req: CreateOrganizationUnitRequest,
        ) -> Result<OrganizationUnit, OuCreationError> {
            *self.seen_parent.lock().unwrap() = req.parent_id.clone();
            self.result.lock().unwrap().take().unwrap()
        }

        async fn get_organization_unit(&self, id: &str) -> Result<OrganizationUnit, ServiceError> {
            Ok(OrganizationUnit {
                id: id.to_string(),
                name: "x".to_string(),
                handle: "x".to_string(),
            })
        }
    }

    fn ctx(user_inputs: HashMap<String, String>, runtime_data: HashMap<String, String>) -> NodeContext {
        NodeContext {
            flow_id: "flow-1".into(),
            flow_type: FlowType::Registration,
            app_id: "app-1".into(),
            application: ApplicationView::default(),
            current_node_id: "node-1".into(),
            node_properties: HashMap::new(),
            node_inputs: Vec::new(),
            user_inputs,
            runtime_data,
            authenticated_user: AuthenticatedUser::default(),
            execution_history: HashMap::new(),
            http_context: None,
            executor_mode: None,
        }
    }

    #[tokio::test]
    async fn creates_ou_with_parent_from_runtime_data() {
        let ou = Arc::new(FakeOu {
            result: Mutex::new(Some(Ok(OrganizationUnit {
                id: "ou-new".to_string(),
                name: "Eng".to_string(),
                handle: "eng".to_string(),
            }))),
            seen_parent: Mutex::new(None),
        });
        let executor = OuCreationExecutor::new(ou.clone());

        let mut inputs = HashMap::new();
        inputs.insert("name".to_string(), "Eng".to_string());
        inputs.insert("handle".to_string(), "eng".to_string());
        let mut runtime = HashMap::new();
        runtime.insert("defaultOUID".to_string(), "ou-root".to_string());

        let resp = executor.execute(&ctx(inputs, runtime)).await.unwrap();
        assert_eq!(resp.status, Some(ExecutorStatus::Complete));
        assert_eq!(resp.runtime_data.get("organizationUnitId").unwrap(), "ou-new");
        assert_eq!(ou.seen_parent.lock().unwrap().as_deref(), Some("ou-root"));
    }

    #[tokio::test]
    async fn name_conflict_maps_to_distinct_message() {
        let ou = Arc::new(FakeOu {
            result: Mutex::new(Some(Err(OuCreationError::Conflict(OuConflict::NameTaken)))),
            seen_parent: Mutex::new(None),
        });
        let executor = OuCreationExecutor::new(ou);

        let mut inputs = HashMap::new();
        inputs.insert("name".to_string(), "Eng".to_string());
        inputs.insert("handle".to_string(), "eng".to_string());

        let resp = executor.execute(&ctx(inputs, HashMap::new())).await.unwrap();
        assert_eq!(resp.status, Some(ExecutorStatus::Failure));
        assert_eq!(
            resp.failure_reason.as_deref(),
            Some("Organization unit name already exists.")
        );
    }

    #[tokio::test]
    async fn missing_inputs_prompts() {
        let ou = Arc::new(FakeOu { result: Mutex::new(None), seen_parent: Mutex::new(None) });
        let executor = OuCreationExecutor::new(ou);
        let resp = executor.execute(&ctx(HashMap::new(), HashMap::new())).await.unwrap();
        assert_eq!(resp.status, Some(ExecutorStatus::UserInputRequired));
    }
}
