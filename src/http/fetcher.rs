//! HTTP fetch collaborator
//!
//! Sends derived pagination parameters to a JSON endpoint, either as
//! GraphQL variables or as query string parameters, and maps the response
//! into a batch.

use super::client::{HttpClient, RequestConfig};
use super::mapping::ResponseMapping;
use crate::error::{Error, Result};
use crate::fetch::Fetcher;
use crate::pagination::{FetchParameters, VariableNames};
use crate::types::{JsonObject, JsonValue, PagedResult};
use async_trait::async_trait;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::HashMap;
use std::marker::PhantomData;
use tracing::debug;

/// How a request is shaped on the wire
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RequestShape {
    /// POST `{"query", "variables", "operationName"}`, read `data`
    #[serde(rename = "graphql")]
    GraphQl {
        /// GraphQL document
        query: String,
        /// Optional operation name
        #[serde(default)]
        operation_name: Option<String>,
    },
    /// GET with variables as query string parameters
    QueryParams,
}

impl RequestShape {
    /// GraphQL shape for a query document
    pub fn graphql(query: impl Into<String>) -> Self {
        Self::GraphQl {
            query: query.into(),
            operation_name: None,
        }
    }
}

/// Fetches batches from a JSON HTTP endpoint
pub struct HttpFetcher<T> {
    client: HttpClient,
    url: String,
    shape: RequestShape,
    names: VariableNames,
    variables: JsonObject,
    headers: HashMap<String, String>,
    mapping: ResponseMapping,
    _marker: PhantomData<fn() -> T>,
}

impl<T> HttpFetcher<T> {
    /// Create a fetcher for `url`
    pub fn new(
        client: HttpClient,
        url: impl Into<String>,
        shape: RequestShape,
        mapping: ResponseMapping,
    ) -> Self {
        Self {
            client,
            url: url.into(),
            shape,
            names: VariableNames::default(),
            variables: JsonObject::new(),
            headers: HashMap::new(),
            mapping,
            _marker: PhantomData,
        }
    }

    /// Set the names pagination parameters are sent under
    #[must_use]
    pub fn with_variable_names(mut self, names: VariableNames) -> Self {
        self.names = names;
        self
    }

    /// Add a variable sent with every request
    #[must_use]
    pub fn with_variable(mut self, key: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.variables.insert(key.into(), value.into());
        self
    }

    /// Add a header sent with every request
    #[must_use]
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Target URL
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Static variables merged with the pagination parameters
    ///
    /// Pagination parameters win over static variables of the same name.
    pub fn variables_for(&self, params: &FetchParameters) -> JsonObject {
        let mut vars = self.variables.clone();
        vars.extend(params.to_variables(&self.names));
        vars
    }

    fn build_request(&self, params: &FetchParameters) -> (Method, RequestConfig) {
        let mut config = RequestConfig::new();
        for (key, value) in &self.headers {
            config = config.header(key, value);
        }

        let vars = self.variables_for(params);
        match &self.shape {
            RequestShape::GraphQl {
                query,
                operation_name,
            } => {
                let mut body = json!({ "query": query, "variables": vars });
                if let Some(name) = operation_name {
                    body["operationName"] = JsonValue::from(name.as_str());
                }
                (Method::POST, config.json(body))
            }
            RequestShape::QueryParams => {
                for (key, value) in vars {
                    let value = match value {
                        JsonValue::String(s) => s,
                        other => other.to_string(),
                    };
                    config = config.query(key, value);
                }
                (Method::GET, config)
            }
        }
    }

    /// Select the part of the body the mapping applies to
    fn response_root<'a>(&self, body: &'a JsonValue) -> Result<&'a JsonValue> {
        if !matches!(self.shape, RequestShape::GraphQl { .. }) {
            return Ok(body);
        }

        if let Some(errors) = body.get("errors").and_then(JsonValue::as_array) {
            if !errors.is_empty() {
                let messages = errors
                    .iter()
                    .map(|e| {
                        e.get("message")
                            .and_then(JsonValue::as_str)
                            .map_or_else(|| e.to_string(), str::to_string)
                    })
                    .collect();
                return Err(Error::GraphQl { messages });
            }
        }

        match body.get("data") {
            Some(data) if !data.is_null() => Ok(data),
            _ => Err(Error::fetch("GraphQL response has no data")),
        }
    }
}

#[async_trait]
impl<T> Fetcher<T> for HttpFetcher<T>
where
    T: DeserializeOwned + Send + 'static,
{
    async fn fetch(&self, params: &FetchParameters) -> Result<PagedResult<T>> {
        let (method, config) = self.build_request(params);
        debug!("Fetching {} {} with {:?}", method, self.url, params);

        let body = self.client.request_json(method, &self.url, &config).await?;
        let root = self.response_root(&body)?;
        let batch = self.mapping.extract(root)?;

        debug!(
            "Fetched {} items from {} (cursor={:?})",
            batch.len(),
            self.url,
            batch.cursor
        );
        Ok(batch)
    }
}

impl<T> std::fmt::Debug for HttpFetcher<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpFetcher")
            .field("url", &self.url)
            .field("shape", &self.shape)
            .field("names", &self.names)
            .field("mapping", &self.mapping)
            .finish_non_exhaustive()
    }
}
