//! Shared rustls-backed hyper client and a timed request helper.

use std::sync::Arc;
use std::time::Duration;

use hyper::body::to_bytes;
use hyper::client::HttpConnector;
use hyper::header::{ACCEPT, CONTENT_TYPE};
use hyper::{Body, Client, Method, Request, Uri};
use hyper_rustls::HttpsConnector;
use rustls::{ClientConfig, OwnedTrustAnchor, RootCertStore};
use tokio::time::timeout;
use webpki_roots::TLS_SERVER_ROOTS;

use crate::{StoreError, StoreResult};

pub(crate) type HyperClient = Client<HttpsConnector<HttpConnector>, Body>;

pub(crate) fn build_https_client() -> HyperClient {
    let mut roots = RootCertStore::empty();
    roots.add_trust_anchors(TLS_SERVER_ROOTS.iter().map(|anchor| {
        OwnedTrustAnchor::from_subject_spki_name_constraints(
            anchor.subject,
            anchor.spki,
            anchor.name_constraints,
        )
    }));

    let config = ClientConfig::builder()
        .with_safe_defaults()
        .with_root_certificates(roots)
        .with_no_client_auth();

    let mut http = HttpConnector::new();
    http.enforce_http(false);

    let connector = HttpsConnector::from((http, Arc::new(config)));

    Client::builder().build::<_, Body>(connector)
}

/// Raw response: status code plus the full body.
pub(crate) struct RawResponse {
    pub(crate) status: u16,
    pub(crate) body: Vec<u8>,
}

impl RawResponse {
    pub(crate) fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub(crate) fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Sends a request with a JSON body (when given) and collects the response
/// within `limit`.
pub(crate) async fn send(
    client: &HyperClient,
    method: Method,
    uri: Uri,
    headers: &[(&'static str, &str)],
    body: Option<Vec<u8>>,
    limit: Duration,
) -> StoreResult<RawResponse> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(ACCEPT, "application/json");
    if body.is_some() {
        builder = builder.header(CONTENT_TYPE, "application/json");
    }
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }

    let request = builder
        .body(body.map_or_else(Body::empty, Body::from))
        .map_err(|err| StoreError::transport(format!("failed to build request: {err}")))?;

    let response = timeout(limit, client.request(request))
        .await
        .map_err(|_| StoreError::transport("request timed out"))?
        .map_err(|err| StoreError::transport(format!("request failed: {err}")))?;

    let status = response.status().as_u16();
    let body = to_bytes(response.into_body())
        .await
        .map_err(|err| StoreError::transport(format!("failed to read response: {err}")))?;

    Ok(RawResponse {
        status,
        body: body.to_vec(),
    })
}
