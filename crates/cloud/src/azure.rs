//! Blob REST API client.
//!
//! Implements just enough of the service protocol to upload block blobs:
//! a single `PUT` per blob, authorized either with a Shared Key signature or
//! a SAS token appended to the query string.

use std::time::Duration;

use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use chrono::Utc;
use hmac::{Hmac, Mac};
use reqwest::header::{CONTENT_TYPE, IF_NONE_MATCH};
use reqwest::Url;
use sha2::Sha256;

use crate::blob::BlobStore;
use crate::connection_string::{StorageConnection, StorageCredential};
use crate::error::CloudError;

type HmacSha256 = Hmac<Sha256>;

/// REST API version sent with every request.
pub const API_VERSION: &str = "2021-08-06";

const BLOB_TYPE: &str = "BlockBlob";
const JSON_CONTENT_TYPE: &str = "application/json";
const ERROR_CODE_HEADER: &str = "x-ms-error-code";

/// `x-ms-date` uses the RFC 1123 form.
const DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// Uploads blobs into one container of a storage account.
pub struct AzureBlobStore {
    client: reqwest::Client,
    endpoint: Url,
    credential: StorageCredential,
    container: String,
}

impl AzureBlobStore {
    /// Create a store writing into `container`, with a per-request timeout.
    pub fn new(
        connection: StorageConnection,
        container: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, CloudError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: connection.blob_endpoint,
            credential: connection.credential,
            container: container.into(),
        })
    }

    pub fn container(&self) -> &str {
        &self.container
    }

    /// Absolute URL of the blob at `path`, SAS token included.
    ///
    /// Each `/`-separated segment is percent-encoded on its own so the
    /// separators survive.
    pub fn blob_url(&self, path: &str) -> Result<Url, CloudError> {
        if path.is_empty() {
            return Err(CloudError::InvalidUrl("blob path is empty".into()));
        }

        let mut url = self.endpoint.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| CloudError::InvalidUrl(self.endpoint.to_string()))?;
            segments.pop_if_empty().push(&self.container);
            for segment in path.split('/') {
                segments.push(segment);
            }
        }

        if let StorageCredential::Sas(token) = &self.credential {
            url.set_query(Some(token));
        }
        Ok(url)
    }
}

#[async_trait]
impl BlobStore for AzureBlobStore {
    async fn put(&self, path: &str, body: Vec<u8>, overwrite: bool) -> Result<(), CloudError> {
        let url = self.blob_url(path)?;
        let date = Utc::now().format(DATE_FORMAT).to_string();
        let if_none_match = (!overwrite).then_some("*");

        let mut request = self
            .client
            .put(url.clone())
            .header(CONTENT_TYPE, JSON_CONTENT_TYPE)
            .header("x-ms-blob-type", BLOB_TYPE)
            .header("x-ms-date", &date)
            .header("x-ms-version", API_VERSION);

        if let Some(condition) = if_none_match {
            request = request.header(IF_NONE_MATCH, condition);
        }

        if let StorageCredential::SharedKey { account, key } = &self.credential {
            let to_sign = string_to_sign(&SignedRequest {
                verb: "PUT",
                content_length: body.len(),
                content_type: JSON_CONTENT_TYPE,
                if_none_match,
                ms_headers: &[
                    ("x-ms-blob-type", BLOB_TYPE),
                    ("x-ms-date", date.as_str()),
                    ("x-ms-version", API_VERSION),
                ],
                account,
                path: url.path(),
            });
            request = request.header(
                "Authorization",
                format!("SharedKey {account}:{}", sign(key, &to_sign)),
            );
        }

        let response = request.body(body).send().await?;
        let status = response.status();
        if !status.is_success() {
            let code = response
                .headers()
                .get(ERROR_CODE_HEADER)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);
            return Err(CloudError::HttpStatus {
                status: status.as_u16(),
                code,
            });
        }

        tracing::debug!(container = %self.container, path, status = status.as_u16(), "Blob written");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Shared Key signing
// ---------------------------------------------------------------------------

/// The parts of a request covered by a Shared Key signature.
pub struct SignedRequest<'a> {
    pub verb: &'a str,
    pub content_length: usize,
    pub content_type: &'a str,
    pub if_none_match: Option<&'a str>,
    /// `x-ms-*` headers; sorted by name before signing.
    pub ms_headers: &'a [(&'a str, &'a str)],
    pub account: &'a str,
    /// Encoded URL path, starting with `/`.
    pub path: &'a str,
}

/// Build the canonical string-to-sign for a request without query
/// parameters.
pub fn string_to_sign(req: &SignedRequest<'_>) -> String {
    // A zero length is signed as an empty string.
    let content_length = match req.content_length {
        0 => String::new(),
        n => n.to_string(),
    };

    let standard: [&str; 12] = [
        req.verb,
        "", // Content-Encoding
        "", // Content-Language
        &content_length,
        "", // Content-MD5
        req.content_type,
        "", // Date (x-ms-date is used instead)
        "", // If-Modified-Since
        "", // If-Match
        req.if_none_match.unwrap_or(""),
        "", // If-Unmodified-Since
        "", // Range
    ];

    let mut headers: Vec<(String, &str)> = req
        .ms_headers
        .iter()
        .map(|(name, value)| (name.to_ascii_lowercase(), value.trim()))
        .collect();
    headers.sort_by(|a, b| a.0.cmp(&b.0));

    let mut out = standard.join("\n");
    out.push('\n');
    for (name, value) in headers {
        out.push_str(&name);
        out.push(':');
        out.push_str(value);
        out.push('\n');
    }
    out.push('/');
    out.push_str(req.account);
    out.push_str(req.path);
    out
}

/// Base64 HMAC-SHA256 of `string_to_sign` under the decoded account key.
pub fn sign(key: &[u8], string_to_sign: &str) -> String {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC accepts any key length");
    mac.update(string_to_sign.as_bytes());
    general_purpose::STANDARD.encode(mac.finalize().into_bytes())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::net::SocketAddr;
    use std::sync::{Arc, Mutex};

    use assert_matches::assert_matches;
    use axum::body::Bytes;
    use axum::extract::State;
    use axum::http::{HeaderMap, Method, StatusCode, Uri};
    use axum::response::IntoResponse;
    use axum::Router;

    use super::*;
    use crate::connection_string::{DEV_STORAGE_ACCOUNT, DEV_STORAGE_KEY};

    const TIMEOUT: Duration = Duration::from_secs(5);

    fn store(conn: &str, container: &str) -> AzureBlobStore {
        AzureBlobStore::new(conn.parse().unwrap(), container, TIMEOUT).unwrap()
    }

    #[test]
    fn sign_matches_reference_hmac() {
        assert_eq!(
            sign(b"Jefe", "what do ya want for nothing?"),
            "W9zBRr9gdU5qBCQmCJV1x1oAPwidJzmDnexYuWTsOEM="
        );
    }

    #[test]
    fn string_to_sign_layout_and_signature() {
        let to_sign = string_to_sign(&SignedRequest {
            verb: "PUT",
            content_length: 11,
            content_type: "application/json",
            if_none_match: None,
            ms_headers: &[
                ("x-ms-version", API_VERSION),
                ("x-ms-date", "Sat, 09 Mar 2024 07:05:03 GMT"),
                ("x-ms-blob-type", BLOB_TYPE),
            ],
            account: DEV_STORAGE_ACCOUNT,
            path: "/devstoreaccount1/processed/d1/2024-03-09/07-05-03-000000.json",
        });

        assert_eq!(
            to_sign,
            "PUT\n\n\n11\n\napplication/json\n\n\n\n\n\n\n\
             x-ms-blob-type:BlockBlob\n\
             x-ms-date:Sat, 09 Mar 2024 07:05:03 GMT\n\
             x-ms-version:2021-08-06\n\
             /devstoreaccount1/devstoreaccount1/processed/d1/2024-03-09/07-05-03-000000.json"
        );

        let key = general_purpose::STANDARD.decode(DEV_STORAGE_KEY).unwrap();
        assert_eq!(sign(&key, &to_sign), "lQ1fyTWHabCDS6lXbxaEl+emgX8hFAC4Hi912iuOSYg=");
    }

    #[test]
    fn string_to_sign_covers_conditional_and_empty_body() {
        let to_sign = string_to_sign(&SignedRequest {
            verb: "PUT",
            content_length: 0,
            content_type: "application/json",
            if_none_match: Some("*"),
            ms_headers: &[],
            account: "acct",
            path: "/c/b.json",
        });
        assert_eq!(to_sign, "PUT\n\n\n\n\napplication/json\n\n\n\n*\n\n\n/acct/c/b.json");
    }

    #[test]
    fn blob_url_appends_container_and_encodes_segments() {
        let s = store("AccountName=acct;AccountKey=a2V5", "processed");
        let url = s.blob_url("bed 4/2024-01-01/00-00-00-000000.json").unwrap();
        assert_eq!(
            url.as_str(),
            "https://acct.blob.core.windows.net/processed/bed%204/2024-01-01/00-00-00-000000.json"
        );
    }

    #[test]
    fn blob_url_keeps_endpoint_path_prefix() {
        let s = store("UseDevelopmentStorage=true", "processed");
        let url = s.blob_url("d1/x.json").unwrap();
        assert_eq!(url.path(), "/devstoreaccount1/processed/d1/x.json");
    }

    #[test]
    fn blob_url_carries_sas_token() {
        let s = store(
            "BlobEndpoint=https://acct.blob.core.windows.net;SharedAccessSignature=sv=1&sig=abc",
            "processed",
        );
        let url = s.blob_url("d1/x.json").unwrap();
        assert_eq!(url.query(), Some("sv=1&sig=abc"));
    }

    #[test]
    fn blob_url_rejects_empty_path() {
        let s = store("UseDevelopmentStorage=true", "processed");
        assert_matches!(s.blob_url(""), Err(CloudError::InvalidUrl(_)));
    }

    // -- Against a local HTTP listener --------------------------------------

    #[derive(Debug, Clone)]
    struct Captured {
        method: Method,
        uri: Uri,
        headers: HeaderMap,
        body: Bytes,
    }

    #[derive(Clone)]
    struct Receiver {
        captured: Arc<Mutex<Vec<Captured>>>,
        status: StatusCode,
    }

    async fn capture(
        State(receiver): State<Receiver>,
        method: Method,
        uri: Uri,
        headers: HeaderMap,
        body: Bytes,
    ) -> impl IntoResponse {
        receiver.captured.lock().unwrap().push(Captured {
            method,
            uri,
            headers,
            body,
        });
        let mut response = receiver.status.into_response();
        if !receiver.status.is_success() {
            response
                .headers_mut()
                .insert(ERROR_CODE_HEADER, "BlobAlreadyExists".parse().unwrap());
        }
        response
    }

    async fn spawn_receiver(status: StatusCode) -> (SocketAddr, Arc<Mutex<Vec<Captured>>>) {
        let captured = Arc::new(Mutex::new(Vec::new()));
        let app = Router::new().fallback(capture).with_state(Receiver {
            captured: Arc::clone(&captured),
            status,
        });
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (addr, captured)
    }

    fn local_store(addr: SocketAddr) -> AzureBlobStore {
        store(
            &format!(
                "AccountName={DEV_STORAGE_ACCOUNT};AccountKey={DEV_STORAGE_KEY};\
                 BlobEndpoint=http://{addr}/{DEV_STORAGE_ACCOUNT}"
            ),
            "processed",
        )
    }

    #[tokio::test]
    async fn put_sends_signed_block_blob_request() {
        let (addr, captured) = spawn_receiver(StatusCode::CREATED).await;
        let s = local_store(addr);

        s.put("d1/2024-01-01/00-00-00-000000.json", b"{\"a\": 1}".to_vec(), true)
            .await
            .unwrap();

        let requests = captured.lock().unwrap().clone();
        assert_eq!(requests.len(), 1);
        let req = &requests[0];
        assert_eq!(req.method, Method::PUT);
        assert_eq!(
            req.uri.path(),
            "/devstoreaccount1/processed/d1/2024-01-01/00-00-00-000000.json"
        );
        assert_eq!(req.headers["x-ms-blob-type"], "BlockBlob");
        assert_eq!(req.headers["x-ms-version"], API_VERSION);
        assert_eq!(req.headers["content-type"], "application/json");
        assert!(req.headers.get("if-none-match").is_none());
        assert_eq!(&req.body[..], b"{\"a\": 1}");

        // Re-derive the signature from what actually arrived.
        let date = req.headers["x-ms-date"].to_str().unwrap();
        let to_sign = string_to_sign(&SignedRequest {
            verb: "PUT",
            content_length: req.body.len(),
            content_type: JSON_CONTENT_TYPE,
            if_none_match: None,
            ms_headers: &[
                ("x-ms-blob-type", BLOB_TYPE),
                ("x-ms-date", date),
                ("x-ms-version", API_VERSION),
            ],
            account: DEV_STORAGE_ACCOUNT,
            path: req.uri.path(),
        });
        let key = general_purpose::STANDARD.decode(DEV_STORAGE_KEY).unwrap();
        let expected = format!("SharedKey {DEV_STORAGE_ACCOUNT}:{}", sign(&key, &to_sign));
        assert_eq!(req.headers["authorization"], expected.as_str());
    }

    #[tokio::test]
    async fn put_without_overwrite_is_conditional() {
        let (addr, captured) = spawn_receiver(StatusCode::CREATED).await;
        local_store(addr)
            .put("d1/x.json", b"{}".to_vec(), false)
            .await
            .unwrap();

        let requests = captured.lock().unwrap().clone();
        assert_eq!(requests[0].headers["if-none-match"], "*");
    }

    #[tokio::test]
    async fn put_maps_error_status_and_service_code() {
        let (addr, _captured) = spawn_receiver(StatusCode::CONFLICT).await;
        let result = local_store(addr).put("d1/x.json", b"{}".to_vec(), false).await;

        assert_matches!(
            result,
            Err(CloudError::HttpStatus { status: 409, code: Some(ref code) }) if code == "BlobAlreadyExists"
        );
    }

    #[tokio::test]
    async fn put_reports_transport_failure() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let result = local_store(addr).put("d1/x.json", b"{}".to_vec(), true).await;
        assert_matches!(result, Err(CloudError::Request(_)));
    }
}
