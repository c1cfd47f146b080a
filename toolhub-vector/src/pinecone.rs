//! Pinecone REST client.

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use hyper::{Method, Uri};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use tokio::sync::RwLock;
use toolhub_config::VectorSearchSettings;
use tracing::{debug, trace};

use crate::embeddings::{EmbedInputType, EmbeddingVector};
use crate::http_client::{HyperClient, RawResponse, build_https_client, send};
use crate::store::{
    IndexDescription, IndexSpec, IndexStats, VectorMatch, VectorQuery, VectorRecord,
    VectorStoreClient,
};
use crate::{StoreError, StoreResult};

/// API version pinned on every request.
pub const API_VERSION: &str = "2025-01";

const API_KEY_HEADER: &str = "Api-Key";
const API_VERSION_HEADER: &str = "X-Pinecone-API-Version";

/// Client for the hosted index: control-plane calls go to the configured
/// base URL, data-plane calls go to the per-index host, which is resolved
/// once and cached.
pub struct PineconeClient {
    client: HyperClient,
    api_key: String,
    control_plane: String,
    timeout: Duration,
    hosts: RwLock<HashMap<String, String>>,
}

impl fmt::Debug for PineconeClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PineconeClient")
            .field("control_plane", &self.control_plane)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl PineconeClient {
    /// Builds a client from vector search settings.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Configuration`] when the API key is missing or
    /// the control-plane URL is malformed.
    pub fn new(settings: &VectorSearchSettings) -> StoreResult<Self> {
        let api_key = settings
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or_else(|| StoreError::configuration("Pinecone API key is required"))?
            .to_owned();

        let control_plane = sanitize_base_url(&settings.control_plane_url)?;

        Ok(Self {
            client: build_https_client(),
            api_key,
            control_plane,
            timeout: Duration::from_secs(settings.request_timeout_secs.max(1)),
            hosts: RwLock::new(HashMap::new()),
        })
    }

    fn control_uri(&self, path: &str) -> StoreResult<Uri> {
        parse_uri(&format!("{}{path}", self.control_plane))
    }

    async fn data_uri(&self, index: &str, path: &str) -> StoreResult<Uri> {
        let base = self.host_for(index).await?;
        parse_uri(&format!("{base}{path}"))
    }

    async fn host_for(&self, index: &str) -> StoreResult<String> {
        if let Some(host) = self.hosts.read().await.get(index) {
            return Ok(host.clone());
        }
        let description = self.describe_index(index).await?;
        let host = description
            .host
            .filter(|host| !host.is_empty())
            .ok_or_else(|| StoreError::response(0, format!("index `{index}` has no host yet")))?;
        let base = host_base_url(&host);
        debug!(index, host = %base, "resolved index host");
        self.hosts.write().await.insert(index.to_owned(), base.clone());
        Ok(base)
    }

    async fn call(&self, method: Method, uri: Uri, body: Option<Value>) -> StoreResult<RawResponse> {
        trace!(%method, %uri, "pinecone request");
        let body = body
            .map(|value| serde_json::to_vec(&value))
            .transpose()
            .map_err(|err| StoreError::transport(format!("failed to encode request: {err}")))?;
        let headers = [
            (API_KEY_HEADER, self.api_key.as_str()),
            (API_VERSION_HEADER, API_VERSION),
        ];
        send(&self.client, method, uri, &headers, body, self.timeout).await
    }

    async fn call_json<T: DeserializeOwned>(
        &self,
        method: Method,
        uri: Uri,
        body: Option<Value>,
    ) -> StoreResult<T> {
        let response = self.call(method, uri, body).await?;
        decode(&ensure_success(response)?)
    }
}

#[async_trait]
impl VectorStoreClient for PineconeClient {
    async fn list_indexes(&self) -> StoreResult<Vec<IndexDescription>> {
        let uri = self.control_uri("indexes")?;
        let listing: IndexListResponse = self.call_json(Method::GET, uri, None).await?;
        Ok(listing.indexes.into_iter().map(IndexModel::into_description).collect())
    }

    async fn describe_index(&self, name: &str) -> StoreResult<IndexDescription> {
        let uri = self.control_uri(&format!("indexes/{}", percent_encode(name)))?;
        let response = self.call(Method::GET, uri, None).await?;
        if response.status == 404 {
            return Err(StoreError::NotFound(name.to_owned()));
        }
        let model: IndexModel = decode(&ensure_success(response)?)?;
        Ok(model.into_description())
    }

    async fn create_index(&self, spec: &IndexSpec) -> StoreResult<()> {
        let uri = self.control_uri("indexes")?;
        let body = json!({
            "name": spec.name,
            "dimension": spec.dimension,
            "metric": spec.metric,
            "spec": { "serverless": { "cloud": spec.cloud, "region": spec.region } },
        });
        ensure_success(self.call(Method::POST, uri, Some(body)).await?)?;
        Ok(())
    }

    async fn describe_index_stats(&self, index: &str) -> StoreResult<IndexStats> {
        let uri = self.data_uri(index, "describe_index_stats").await?;
        self.call_json(Method::POST, uri, Some(json!({}))).await
    }

    async fn embed(
        &self,
        model: &str,
        texts: &[String],
        input_type: EmbedInputType,
    ) -> StoreResult<Vec<EmbeddingVector>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let uri = self.control_uri("embed")?;
        let body = embed_request(model, texts, input_type);
        let response: EmbedResponse = self.call_json(Method::POST, uri, Some(body)).await?;
        if response.data.len() != texts.len() {
            return Err(StoreError::response(
                0,
                format!(
                    "expected {} embeddings, received {}",
                    texts.len(),
                    response.data.len()
                ),
            ));
        }
        response
            .data
            .into_iter()
            .map(|item| EmbeddingVector::new(item.values))
            .collect()
    }

    async fn upsert(&self, index: &str, namespace: &str, records: Vec<VectorRecord>) -> StoreResult<usize> {
        if records.is_empty() {
            return Ok(0);
        }
        let submitted = records.len();
        let uri = self.data_uri(index, "vectors/upsert").await?;
        let body = json!({ "vectors": records, "namespace": namespace });
        let response: UpsertResponse = self.call_json(Method::POST, uri, Some(body)).await?;
        Ok(response.upserted_count.map_or(submitted, |count| {
            usize::try_from(count).unwrap_or(submitted)
        }))
    }

    async fn delete_all(&self, index: &str, namespace: &str) -> StoreResult<()> {
        let uri = self.data_uri(index, "vectors/delete").await?;
        let body = json!({ "deleteAll": true, "namespace": namespace });
        let response = self.call(Method::POST, uri, Some(body)).await?;
        // Deleting from a namespace that was never written answers 404.
        if response.status == 404 {
            return Ok(());
        }
        ensure_success(response)?;
        Ok(())
    }

    async fn delete(&self, index: &str, namespace: &str, ids: &[String]) -> StoreResult<()> {
        if ids.is_empty() {
            return Ok(());
        }
        let uri = self.data_uri(index, "vectors/delete").await?;
        let body = json!({ "ids": ids, "namespace": namespace });
        ensure_success(self.call(Method::POST, uri, Some(body)).await?)?;
        Ok(())
    }

    async fn query(&self, index: &str, namespace: &str, query: VectorQuery) -> StoreResult<Vec<VectorMatch>> {
        let uri = self.data_uri(index, "query").await?;
        let body = query_request(namespace, &query);
        let response: QueryResponse = self.call_json(Method::POST, uri, Some(body)).await?;
        Ok(response.matches)
    }

    async fn fetch(&self, index: &str, namespace: &str, ids: &[String]) -> StoreResult<Vec<VectorRecord>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let uri = self.data_uri(index, &fetch_path(namespace, ids)).await?;
        let response: FetchResponse = self.call_json(Method::GET, uri, None).await?;
        let mut vectors = response.vectors;
        Ok(ids.iter().filter_map(|id| vectors.remove(id)).collect())
    }
}

#[derive(Debug, Deserialize)]
struct IndexListResponse {
    #[serde(default)]
    indexes: Vec<IndexModel>,
}

#[derive(Debug, Deserialize)]
struct IndexModel {
    name: String,
    #[serde(default)]
    dimension: usize,
    #[serde(default)]
    metric: String,
    #[serde(default)]
    host: Option<String>,
    #[serde(default)]
    status: Option<IndexStatus>,
}

#[derive(Debug, Deserialize)]
struct IndexStatus {
    #[serde(default)]
    ready: bool,
}

impl IndexModel {
    fn into_description(self) -> IndexDescription {
        IndexDescription {
            name: self.name,
            dimension: self.dimension,
            metric: self.metric,
            host: self.host,
            ready: self.status.is_some_and(|status| status.ready),
        }
    }
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    #[serde(default)]
    data: Vec<EmbedItem>,
}

#[derive(Debug, Deserialize)]
struct EmbedItem {
    #[serde(default)]
    values: Vec<f32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpsertResponse {
    #[serde(default)]
    upserted_count: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<VectorMatch>,
}

#[derive(Debug, Deserialize)]
struct FetchResponse {
    #[serde(default)]
    vectors: HashMap<String, VectorRecord>,
}

#[derive(Debug, Serialize)]
struct EmbedInput<'a> {
    text: &'a str,
}

fn embed_request(model: &str, texts: &[String], input_type: EmbedInputType) -> Value {
    let inputs: Vec<EmbedInput<'_>> = texts.iter().map(|text| EmbedInput { text }).collect();
    json!({
        "model": model,
        "parameters": { "input_type": input_type.as_str(), "truncate": "END" },
        "inputs": inputs,
    })
}

fn query_request(namespace: &str, query: &VectorQuery) -> Value {
    let mut body = Map::new();
    body.insert("namespace".into(), Value::from(namespace));
    body.insert("vector".into(), json!(query.vector()));
    body.insert("topK".into(), Value::from(query.top_k()));
    body.insert("includeMetadata".into(), Value::from(query.include_metadata()));
    if let Some(filter) = query.filter() {
        body.insert("filter".into(), filter.to_native());
    }
    Value::Object(body)
}

fn fetch_path(namespace: &str, ids: &[String]) -> String {
    let mut path = String::from("vectors/fetch?");
    for id in ids {
        path.push_str("ids=");
        path.push_str(&percent_encode(id));
        path.push('&');
    }
    path.push_str("namespace=");
    path.push_str(&percent_encode(namespace));
    path
}

fn ensure_success(response: RawResponse) -> StoreResult<RawResponse> {
    if response.is_success() {
        Ok(response)
    } else {
        Err(StoreError::response(response.status, response.text()))
    }
}

fn decode<T: DeserializeOwned>(response: &RawResponse) -> StoreResult<T> {
    serde_json::from_slice(&response.body)
        .map_err(|err| StoreError::response(0, format!("failed to decode response: {err}")))
}

fn parse_uri(raw: &str) -> StoreResult<Uri> {
    raw.parse::<Uri>()
        .map_err(|err| StoreError::configuration(format!("invalid URL `{raw}`: {err}")))
}

fn sanitize_base_url(input: &str) -> StoreResult<String> {
    let mut base = input.trim().to_owned();
    if !(base.starts_with("http://") || base.starts_with("https://")) {
        return Err(StoreError::configuration(
            "control plane URL must start with http:// or https://",
        ));
    }
    if !base.ends_with('/') {
        base.push('/');
    }
    parse_uri(&base)?;
    Ok(base)
}

fn host_base_url(host: &str) -> String {
    let mut base = if host.starts_with("http://") || host.starts_with("https://") {
        host.to_owned()
    } else {
        format!("https://{host}")
    };
    if !base.ends_with('/') {
        base.push('/');
    }
    base
}

/// Percent-encodes everything outside the RFC 3986 unreserved set.
fn percent_encode(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for byte in input.bytes() {
        if byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'_' | b'.' | b'~') {
            out.push(char::from(byte));
        } else {
            out.push_str(&format!("%{byte:02X}"));
        }
    }
    out
}
