//! APICall executor: the only node with a side effect (one outbound HTTP request).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method};
use serde_json::{Map, Value};
use tracing::{debug, instrument};

use super::{NodeExecutor, StepInput};
use crate::error::ExecutorError;
use crate::template::{bare_reference, render};
use crate::types::{NodeConfig, NodeResult, StateMap};

const DEFAULT_RESPONSE_KEY: &str = "apiResponse";

/// Issues the configured request and stores the response under `responseStateKey`.
#[derive(Debug, Clone)]
pub struct ApiCallNode {
  client: Client,
}

impl ApiCallNode {
  /// Executor with its own client; every request is bounded by `timeout`.
  pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
    let client = Client::builder().timeout(timeout).build()?;
    Ok(Self { client })
  }

  pub fn with_client(client: Client) -> Self {
    Self { client }
  }
}

fn parse_method(raw: &str) -> Result<Method, ExecutorError> {
  match raw.to_ascii_uppercase().as_str() {
    "GET" => Ok(Method::GET),
    "POST" => Ok(Method::POST),
    "PUT" => Ok(Method::PUT),
    "PATCH" => Ok(Method::PATCH),
    "DELETE" => Ok(Method::DELETE),
    other => Err(ExecutorError::UnsupportedMethod(other.to_string())),
  }
}

fn build_headers(config: &NodeConfig, state: &StateMap) -> Result<HeaderMap, ExecutorError> {
  let headers = config.section("headers")?;
  let mut map = HeaderMap::new();
  for key in headers.as_map().keys() {
    let value = render(headers.str(key)?.unwrap_or_default(), state);
    let name = HeaderName::from_bytes(key.as_bytes())
      .map_err(|_| ExecutorError::InvalidHeader(key.clone()))?;
    let value =
      HeaderValue::from_str(&value).map_err(|_| ExecutorError::InvalidHeader(key.clone()))?;
    map.insert(name, value);
  }
  Ok(map)
}

/// Copies `bodyMapping`, replacing values of the exact form `{name}` with the state value.
#[instrument(level = "trace", skip(state))]
pub(crate) fn build_body(mapping: &Map<String, Value>, state: &StateMap) -> Map<String, Value> {
  mapping
    .iter()
    .map(|(key, value)| {
      let resolved = value
        .as_str()
        .and_then(bare_reference)
        .and_then(|name| state.get(name))
        .cloned()
        .unwrap_or_else(|| value.clone());
      (key.clone(), resolved)
    })
    .collect()
}

#[async_trait]
impl NodeExecutor for ApiCallNode {
  fn family(&self) -> &'static str {
    "API call"
  }

  async fn run(&self, input: StepInput<'_>) -> Result<NodeResult, ExecutorError> {
    let config = input.config;
    let url = render(config.str("apiUrl")?.unwrap_or_default(), input.state);
    let method = parse_method(&config.str_or("method", "GET")?)?;
    let response_key = config.str_or("responseStateKey", DEFAULT_RESPONSE_KEY)?;
    let headers = build_headers(config, input.state)?;

    let mut request = self.client.request(method.clone(), &url).headers(headers);
    if matches!(method, Method::POST | Method::PUT | Method::PATCH) {
      let mapping = config.object("bodyMapping")?.cloned().unwrap_or_default();
      request = request.json(&build_body(&mapping, input.state));
    }

    debug!(node_id = %input.node_id, %method, %url, "sending request");
    let response = request.send().await?;
    let status = response.status();
    let body = response.text().await?;
    let data = serde_json::from_str::<Value>(&body).unwrap_or_else(|_| Value::String(body.clone()));

    let mut output = StateMap::new();
    output.insert("statusCode".to_string(), Value::from(status.as_u16()));
    output.insert("response".to_string(), data.clone());
    output.insert("url".to_string(), Value::String(url));
    output.insert("method".to_string(), Value::String(method.to_string()));
    let mut updates = StateMap::new();
    updates.insert(response_key, data);

    let mut result = NodeResult::success(output).with_state_updates(updates);
    if !status.is_success() {
      result.success = false;
      result.error_message = Some(format!(
        "API call failed with status {}: {body}",
        status.as_u16()
      ));
    }
    Ok(result)
  }
}
