//! Storage account connection string parsing.
//!
//! Accepts the `Key=Value;Key=Value` form issued by the storage service.
//! Keys are matched case-insensitively and values may themselves contain
//! `=` (account keys are base64).

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use base64::{engine::general_purpose, Engine as _};
use reqwest::Url;

use crate::error::CloudError;

/// Account name of the local storage emulator.
pub const DEV_STORAGE_ACCOUNT: &str = "devstoreaccount1";

/// Well-known, public key of the local storage emulator.
pub const DEV_STORAGE_KEY: &str =
    "Eby8vdM02xNOcqFlqUwJPLlmEtlCDXJ1OUzFT50uSRZ6IFsuFq2UVErCz4I6tq/K1SZFPTOtr/KBHBeksoGMGw==";

/// Blob endpoint of the local storage emulator.
pub const DEV_STORAGE_BLOB_ENDPOINT: &str = "http://127.0.0.1:10000/devstoreaccount1";

const DEFAULT_PROTOCOL: &str = "https";
const DEFAULT_ENDPOINT_SUFFIX: &str = "core.windows.net";

/// How requests to the account are authorized.
#[derive(Clone, PartialEq, Eq)]
pub enum StorageCredential {
    /// Account name plus the decoded account key (HMAC signing).
    SharedKey { account: String, key: Vec<u8> },
    /// Pre-signed query string, without the leading `?`.
    Sas(String),
}

impl fmt::Debug for StorageCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageCredential::SharedKey { account, .. } => f
                .debug_struct("SharedKey")
                .field("account", account)
                .field("key", &"<redacted>")
                .finish(),
            StorageCredential::Sas(_) => f.debug_tuple("Sas").field(&"<redacted>").finish(),
        }
    }
}

/// A parsed connection string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageConnection {
    pub blob_endpoint: Url,
    pub credential: StorageCredential,
}

impl FromStr for StorageConnection {
    type Err = CloudError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let pairs = parse_pairs(raw)?;

        if pairs
            .get("usedevelopmentstorage")
            .is_some_and(|v| v.eq_ignore_ascii_case("true"))
        {
            return development_storage();
        }

        let account = pairs.get("accountname").cloned();

        let blob_endpoint = match (pairs.get("blobendpoint"), account.as_deref()) {
            (Some(endpoint), _) => endpoint.clone(),
            (None, Some(account)) => {
                let protocol = pairs
                    .get("defaultendpointsprotocol")
                    .map_or(DEFAULT_PROTOCOL, String::as_str);
                let suffix = pairs
                    .get("endpointsuffix")
                    .map_or(DEFAULT_ENDPOINT_SUFFIX, String::as_str);
                format!("{protocol}://{account}.blob.{suffix}")
            }
            (None, None) => {
                return Err(CloudError::InvalidConnectionString(
                    "either AccountName or BlobEndpoint is required".into(),
                ))
            }
        };
        let blob_endpoint = parse_endpoint(&blob_endpoint)?;

        let credential = match (account, pairs.get("accountkey"), pairs.get("sharedaccesssignature")) {
            (Some(account), Some(key), _) => StorageCredential::SharedKey {
                account,
                key: decode_key(key)?,
            },
            (None, Some(_), _) => {
                return Err(CloudError::InvalidConnectionString(
                    "AccountKey requires AccountName".into(),
                ))
            }
            (_, None, Some(sas)) => StorageCredential::Sas(sas.trim_start_matches('?').to_string()),
            (_, None, None) => {
                return Err(CloudError::InvalidConnectionString(
                    "either AccountKey or SharedAccessSignature is required".into(),
                ))
            }
        };

        Ok(Self {
            blob_endpoint,
            credential,
        })
    }
}

fn parse_pairs(raw: &str) -> Result<HashMap<String, String>, CloudError> {
    let mut pairs = HashMap::new();
    for segment in raw.split(';').map(str::trim).filter(|s| !s.is_empty()) {
        let (key, value) = segment.split_once('=').ok_or_else(|| {
            CloudError::InvalidConnectionString(format!("segment '{segment}' has no '='"))
        })?;
        pairs.insert(key.trim().to_ascii_lowercase(), value.trim().to_string());
    }
    if pairs.is_empty() {
        return Err(CloudError::InvalidConnectionString("empty".into()));
    }
    Ok(pairs)
}

fn development_storage() -> Result<StorageConnection, CloudError> {
    Ok(StorageConnection {
        blob_endpoint: parse_endpoint(DEV_STORAGE_BLOB_ENDPOINT)?,
        credential: StorageCredential::SharedKey {
            account: DEV_STORAGE_ACCOUNT.to_string(),
            key: decode_key(DEV_STORAGE_KEY)?,
        },
    })
}

fn parse_endpoint(endpoint: &str) -> Result<Url, CloudError> {
    let url = Url::parse(endpoint.trim_end_matches('/'))
        .map_err(|e| CloudError::InvalidConnectionString(format!("bad blob endpoint: {e}")))?;
    if url.cannot_be_a_base() {
        return Err(CloudError::InvalidConnectionString(format!(
            "bad blob endpoint: {endpoint}"
        )));
    }
    Ok(url)
}

fn decode_key(key: &str) -> Result<Vec<u8>, CloudError> {
    general_purpose::STANDARD
        .decode(key)
        .map_err(|_| CloudError::InvalidConnectionString("AccountKey is not valid base64".into()))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
