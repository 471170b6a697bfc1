//! HTTP-Request executor (§4.8): a parameterized outbound call mid-flow.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{instrument, warn};

use flow_collab::{HttpClient, HttpMethod, HttpRequestSpec};
use flow_engine::{Executor, ExecutorError, ExecutorResponse, HttpRequestLimits, NodeContext};

use crate::util::{
    attr_to_value, dot_path, json_to_runtime_string, normalize_property, substitute_in_str,
    substitute_placeholders,
};

pub const NAME: &str = "HttpRequestExecutor";

struct ParsedConfig {
    request: HttpRequestSpec,
    response_mapping: HashMap<String, String>,
    fail_on_error: bool,
    retry_count: u32,
    retry_delay: Duration,
}

pub struct HttpRequestExecutor {
    client: Arc<dyn HttpClient>,
    limits: HttpRequestLimits,
}

impl HttpRequestExecutor {
    pub fn new(client: Arc<dyn HttpClient>) -> Self {
        Self {
            client,
            limits: HttpRequestLimits::default(),
        }
    }

    pub fn with_limits(client: Arc<dyn HttpClient>, limits: HttpRequestLimits) -> Self {
        Self { client, limits }
    }

    fn parse_config(&self, ctx: &NodeContext) -> Result<ParsedConfig, ExecutorError> {
        let mut vars = ctx.user_inputs.clone();
        vars.extend(ctx.runtime_data.clone());

        let raw_url = ctx
            .property("url")
            .and_then(|v| v.as_str())
            .ok_or_else(|| ExecutorError::Configuration("missing url".into()))?;
        let url = substitute_in_str(raw_url, &vars);

        let raw_method = ctx.property("method").and_then(|v| v.as_str()).unwrap_or("GET");
        let method = HttpMethod::parse(raw_method)
            .ok_or_else(|| ExecutorError::Configuration(format!("unsupported method: {raw_method}")))?;

        let headers: HashMap<String, String> = normalize_property(&ctx.node_properties, "headers")
            .and_then(|v| v.as_object().cloned())
            .map(|obj| {
                obj.into_iter()
                    .map(|(k, v)| (k, substitute_in_str(&json_to_runtime_string(&v), &vars)))
                    .collect()
            })
            .unwrap_or_default();

        let body = normalize_property(&ctx.node_properties, "body")
            .map(|v| substitute_placeholders(&v, &vars));

        let timeout_secs = ctx
            .property("timeout")
            .map(attr_to_value)
            .and_then(|v| v.as_u64())
            .unwrap_or_else(|| self.limits.default_timeout.as_secs())
            .min(self.limits.max_timeout.as_secs());

        let response_mapping: HashMap<String, String> =
            normalize_property(&ctx.node_properties, "responseMapping")
                .and_then(|v| v.as_object().cloned())
                .map(|obj| {
                    obj.into_iter()
                        .filter_map(|(k, v)| v.as_str().map(|s| (k, s.to_string())))
                        .collect()
                })
                .unwrap_or_default();

        let error_handling = normalize_property(&ctx.node_properties, "errorHandling");
        let fail_on_error = error_handling
            .as_ref()
            .and_then(|v| v.get("failOnError"))
            .and_then(|v| v.as_bool())
            .unwrap_or(false);
        let retry_count = error_handling
            .as_ref()
            .and_then(|v| v.get("retryCount"))
            .and_then(|v| v.as_u64())
            .unwrap_or(0)
            .min(self.limits.max_retry_count as u64) as u32;
        let retry_delay_ms = error_handling
            .as_ref()
            .and_then(|v| v.get("retryDelay_ms"))
            .and_then(|v| v.as_u64())
            .unwrap_or(0)
            .min(self.limits.max_retry_delay.as_millis() as u64);

        Ok(ParsedConfig {
            request: HttpRequestSpec {
                method,
                url,
                headers,
                body,
                timeout: Duration::from_secs(timeout_secs),
            },
            response_mapping,
            fail_on_error,
            retry_count,
            retry_delay: Duration::from_millis(retry_delay_ms),
        })
    }
}

#[async_trait]
impl Executor for HttpRequestExecutor {
    fn name(&self) -> &str {
        NAME
    }

    #[instrument(skip(self, ctx), fields(flow_id = %ctx.flow_id, node_id = %ctx.current_node_id, executor = NAME))]
    async fn execute(&self, ctx: &NodeContext) -> Result<ExecutorResponse, ExecutorError> {
        let config = self.parse_config(ctx)?;
        let attempts = config.retry_count + 1;
        let mut last_error = String::new();

        for attempt in 0..attempts {
            match self.client.do_request(config.request.clone()).await {
                Ok(response) if response.status < 400 => {
                    let data: serde_json::Value = serde_json::from_str(&response.body)
                        .unwrap_or_else(|_| serde_json::json!({ "raw": response.body }));
                    let wrapped = serde_json::json!({
                        "response": { "data": data, "status": response.status },
                    });

                    let mut resp = ExecutorResponse::complete();
                    for (target_key, source_path) in &config.response_mapping {
                        if let Some(value) = dot_path(&wrapped, source_path) {
                            resp.runtime_data
                                .insert(target_key.clone(), json_to_runtime_string(value));
                        }
                    }
                    return Ok(resp);
                }
                Ok(response) => {
                    last_error = format!("HTTP {}: {}", response.status, response.body);
                }
                Err(e) => {
                    last_error = e.description().to_string();
                }
            }

            if attempt + 1 < attempts {
                tokio::time::sleep(config.retry_delay).await;
            }
        }

        warn!(error = %last_error, url = %config.request.url, "HTTP-Request exhausted retries");
        if config.fail_on_error {
            Ok(ExecutorResponse::failure(last_error))
        } else {
            Ok(ExecutorResponse::complete())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flow_collab::HttpResponse;
    use flow_engine::{ApplicationView, AttrValue, AuthenticatedUser, ExecutorStatus, FlowType};
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    struct FakeClient {
        responses: Mutex<Vec<Result<HttpResponse, flow_collab::ServiceError>>>,
        calls: AtomicU32,
        seen_urls: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl HttpClient for FakeClient {
        async fn do_request(
            &self,
            request: HttpRequestSpec,
        ) -> Result<HttpResponse, flow_collab::ServiceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.seen_urls.lock().unwrap().push(request.url.clone());
            let mut responses = self.responses.lock().unwrap();
            if responses.is_empty() {
                panic!("no more scripted responses");
            }
            responses.remove(0)
        }
    }

    fn ctx_with_props(node_properties: HashMap<String, AttrValue>) -> NodeContext {
        NodeContext {
            flow_id: "flow-1".into(),
            flow_type: FlowType::Authentication,
            app_id: "app-1".into(),
            application: ApplicationView::default(),
            current_node_id: "node-1".into(),
            node_properties,
            node_inputs: Vec::new(),
            user_inputs: HashMap::new(),
            runtime_data: [("userID".to_string(), "u1".to_string())].into_iter().collect(),
            authenticated_user: AuthenticatedUser::default(),
            execution_history: HashMap::new(),
            http_context: None,
            executor_mode: None,
        }
    }

    #[tokio::test]
    async fn substitutes_placeholder_and_maps_response() {
        let client = Arc::new(FakeClient {
            responses: Mutex::new(vec![Ok(HttpResponse {
                status: 200,
                body: r#"{"email":"a@x.com"}"#.to_string(),
            })]),
            calls: AtomicU32::new(0),
            seen_urls: Mutex::new(Vec::new()),
        });
        let executor = HttpRequestExecutor::new(client.clone());

        let mut props = HashMap::new();
        props.insert("url".to_string(), AttrValue::from("https://api.example.com/users/{{userID}}"));
        props.insert(
            "responseMapping".to_string(),
            AttrValue::Object(
                [("email".to_string(), AttrValue::from("response.data.email"))]
                    .into_iter()
                    .collect(),
            ),
        );

        let resp = executor.execute(&ctx_with_props(props)).await.unwrap();
        assert_eq!(resp.status, Some(ExecutorStatus::Complete));
        assert_eq!(resp.runtime_data.get("email").unwrap(), "a@x.com");
        assert_eq!(client.seen_urls.lock().unwrap()[0], "https://api.example.com/users/u1");
    }

    #[tokio::test]
    async fn missing_url_is_configuration_error() {
        let client = Arc::new(FakeClient {
            responses: Mutex::new(Vec::new()),
            calls: AtomicU32::new(0),
            seen_urls: Mutex::new(Vec::new()),
        });
        let executor = HttpRequestExecutor::new(client);
        let err = executor.execute(&ctx_with_props(HashMap::new())).await.unwrap_err();
        assert!(matches!(err, ExecutorError::Configuration(_)));
    }

    #[tokio::test]
    async fn retries_then_fails_with_fail_on_error() {
        let client = Arc::new(FakeClient {
            responses: Mutex::new(vec![
                Ok(HttpResponse { status: 500, body: "boom".to_string() }),
                Ok(HttpResponse { status: 500, body: "boom".to_string() }),
            ]),
            calls: AtomicU32::new(0),
            seen_urls: Mutex::new(Vec::new()),
        });
        let executor = HttpRequestExecutor::new(client.clone());

        let mut props = HashMap::new();
        props.insert("url".to_string(), AttrValue::from("https://api.example.com"));
        props.insert(
            "errorHandling".to_string(),
            AttrValue::Object(
                [
                    ("failOnError".to_string(), AttrValue::Bool(true)),
                    ("retryCount".to_string(), AttrValue::Number(1.into())),
                    ("retryDelay_ms".to_string(), AttrValue::Number(0.into())),
                ]
                .into_iter()
                .collect(),
            ),
        );

        let resp = executor.execute(&ctx_with_props(props)).await.unwrap();
        assert_eq!(resp.status, Some(ExecutorStatus::Failure));
        assert_eq!(client.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn failure_without_fail_on_error_completes() {
        let client = Arc::new(FakeClient {
            responses: Mutex::new(vec![Ok(HttpResponse { status: 503, body: "down".to_string() })]),
            calls: AtomicU32::new(0),
            seen_urls: Mutex::new(Vec::new()),
        });
        let executor = HttpRequestExecutor::new(client);

        let mut props = HashMap::new();
        props.insert("url".to_string(), AttrValue::from("https://api.example.com"));
        let resp = executor.execute(&ctx_with_props(props)).await.unwrap();
        assert_eq!(resp.status, Some(ExecutorStatus::Complete));
    }
}
