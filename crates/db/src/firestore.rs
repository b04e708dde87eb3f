//! Cloud Firestore backend over the REST v1 API.
//!
//! Each `create` is a single `documents:commit` carrying one write: the new
//! document with an `exists: false` precondition, plus a `REQUEST_TIME`
//! transform for every [`FieldValue::ServerTimestamp`] field.
//!
//! Production requests authenticate with a service account: an OAuth token is
//! minted from the key file and refreshed by `yup-oauth2` before it expires.
//! A fixed bearer token is only meant for the emulator, which accepts `owner`.

use std::collections::HashMap;
use std::future::Future;
use std::path::Path;
use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{header, Client};
use serde::{Deserialize, Serialize};
use yup_oauth2::ServiceAccountAuthenticator;

use crate::{auto_id, DocumentStore, FieldValue, Fields, StoreError};

const DEFAULT_DATABASE: &str = "(default)";
const SCOPES: &[&str] = &[
    "https://www.googleapis.com/auth/cloud-platform",
    "https://www.googleapis.com/auth/datastore",
];

type TokenFuture = Pin<Box<dyn Future<Output = Result<String, StoreError>> + Send>>;
type TokenSource = Box<dyn Fn() -> TokenFuture + Send + Sync>;

enum Credentials {
    None,
    Static(String),
    ServiceAccount(TokenSource),
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
enum Value {
    StringValue(String),
    IntegerValue(String), // Firestore carries integers as strings
    DoubleValue(f64),
    BooleanValue(bool),
    NullValue(()),
    MapValue(MapValue),
    ArrayValue(ArrayValue),
}

#[derive(Serialize, Debug)]
struct MapValue {
    fields: HashMap<String, Value>,
}

#[derive(Serialize, Debug)]
struct ArrayValue {
    values: Vec<Value>,
}

#[derive(Serialize, Debug)]
struct Document {
    name: String,
    fields: HashMap<String, Value>,
}

#[derive(Serialize, Debug)]
struct Precondition {
    exists: bool,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct FieldTransform {
    field_path: String,
    set_to_server_value: &'static str,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct Write {
    update: Document,
    current_document: Precondition,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    update_transforms: Vec<FieldTransform>,
}

#[derive(Serialize, Debug)]
struct CommitRequest {
    writes: Vec<Write>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct CommitResponse {
    #[serde(default)]
    write_results: Vec<serde_json::Value>,
}

#[derive(Deserialize, Debug)]
struct ErrorResponse {
    error: ErrorDetails,
}

#[derive(Deserialize, Debug)]
struct ErrorDetails {
    code: u16,
    message: String,
    #[serde(default)]
    status: Option<String>,
}

/// Firestore-backed [`DocumentStore`].
pub struct FirestoreStore {
    client: Client,
    endpoint: String,
    database: String,
    credentials: Credentials,
}

impl FirestoreStore {
    /// `endpoint` is the REST root, e.g. `https://firestore.googleapis.com/v1`
    /// or `http://localhost:8080/v1` for the emulator. `access_token` is sent
    /// verbatim on every request and never refreshed.
    pub fn new(endpoint: impl Into<String>, project_id: &str, access_token: Option<String>) -> Self {
        Self::with_client(Client::new(), endpoint, project_id, access_token)
    }

    pub fn with_client(
        client: Client,
        endpoint: impl Into<String>,
        project_id: &str,
        access_token: Option<String>,
    ) -> Self {
        let credentials = match access_token {
            Some(token) => Credentials::Static(token),
            None => Credentials::None,
        };
        Self::build(client, endpoint.into(), project_id, credentials)
    }

    /// Authenticate with the service account key at `key_path`. Tokens are
    /// cached and refreshed before expiry. The project id defaults to the
    /// one recorded in the key.
    pub async fn with_service_account(
        endpoint: impl Into<String>,
        project_id: Option<&str>,
        key_path: impl AsRef<Path>,
    ) -> Result<Self, StoreError> {
        let key_path = key_path.as_ref();
        let key = yup_oauth2::read_service_account_key(key_path)
            .await
            .map_err(|e| {
                StoreError::Auth(format!(
                    "failed to read service account key {}: {}",
                    key_path.display(),
                    e
                ))
            })?;

        let project_id = project_id
            .map(str::to_string)
            .or_else(|| key.project_id.clone())
            .ok_or_else(|| {
                StoreError::Auth("no project id configured or present in the key".to_string())
            })?;

        let authenticator = ServiceAccountAuthenticator::builder(key)
            .build()
            .await
            .map_err(|e| StoreError::Auth(format!("failed to build authenticator: {}", e)))?;
        let authenticator = Arc::new(authenticator);

        let source: TokenSource = Box::new(move || {
            let authenticator = Arc::clone(&authenticator);
            Box::pin(async move {
                let token = authenticator
                    .token(SCOPES)
                    .await
                    .map_err(|e| StoreError::Auth(e.to_string()))?;
                token
                    .token()
                    .map(str::to_string)
                    .ok_or_else(|| StoreError::Auth("no access token was issued".to_string()))
            })
        });

        Ok(Self::build(
            Client::new(),
            endpoint.into(),
            &project_id,
            Credentials::ServiceAccount(source),
        ))
    }

    fn build(client: Client, endpoint: String, project_id: &str, credentials: Credentials) -> Self {
        let endpoint = endpoint.trim_end_matches('/').to_string();
        let database = format!("projects/{}/databases/{}", project_id, DEFAULT_DATABASE);

        Self {
            client,
            endpoint,
            database,
            credentials,
        }
    }

    async fn bearer_token(&self) -> Result<Option<String>, StoreError> {
        match &self.credentials {
            Credentials::None => Ok(None),
            Credentials::Static(token) => Ok(Some(token.clone())),
            Credentials::ServiceAccount(source) => source().await.map(Some),
        }
    }

    fn commit_url(&self) -> String {
        format!("{}/{}/documents:commit", self.endpoint, self.database)
    }

    fn document_name(&self, collection: &str, id: &str) -> String {
        format!("{}/documents/{}/{}", self.database, collection, id)
    }
}

#[async_trait]
impl DocumentStore for FirestoreStore {
    async fn create(&self, collection: &str, fields: Fields) -> Result<String, StoreError> {
        let id = auto_id();

        let mut document_fields = HashMap::new();
        let mut transforms = Vec::new();
        for (name, value) in fields {
            match value {
                FieldValue::Value(value) => {
                    document_fields.insert(name, to_firestore_value(value)?);
                }
                FieldValue::ServerTimestamp => transforms.push(FieldTransform {
                    field_path: quote_field_path(&name),
                    set_to_server_value: "REQUEST_TIME",
                }),
            }
        }

        let request = CommitRequest {
            writes: vec![Write {
                update: Document {
                    name: self.document_name(collection, &id),
                    fields: document_fields,
                },
                current_document: Precondition { exists: false },
                update_transforms: transforms,
            }],
        };

        let mut builder = self
            .client
            .post(self.commit_url())
            .header(header::CONTENT_TYPE, "application/json")
            .body(serde_json::to_vec(&request)?);
        if let Some(token) = self.bearer_token().await? {
            builder = builder.bearer_auth(token);
        }

        let response = builder.send().await?;
        if !response.status().is_success() {
            return Err(StoreError::Api(parse_error_response(response).await));
        }

        let result: CommitResponse = response.json().await?;
        tracing::debug!(
            collection,
            id = %id,
            writes = result.write_results.len(),
            "document committed to firestore"
        );

        Ok(id)
    }
}

async fn parse_error_response(response: reqwest::Response) -> String {
    let status = response.status();
    match response.json::<ErrorResponse>().await {
        Ok(body) => match body.error.status {
            Some(kind) => format!("{} ({}, code: {})", body.error.message, kind, body.error.code),
            None => format!("{} (code: {})", body.error.message, body.error.code),
        },
        Err(_) => format!("commit failed: {}", status),
    }
}

fn to_firestore_value(value: serde_json::Value) -> Result<Value, StoreError> {
    use serde::ser::Error;
    use serde_json::Value as Json;

    Ok(match value {
        Json::Null => Value::NullValue(()),
        Json::Bool(b) => Value::BooleanValue(b),
        Json::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::IntegerValue(i.to_string())
            } else if let Some(f) = n.as_f64() {
                Value::DoubleValue(f)
            } else {
                return Err(StoreError::Serialization(serde_json::Error::custom(format!(
                    "unsupported number: {}",
                    n
                ))));
            }
        }
        Json::String(s) => Value::StringValue(s),
        Json::Array(items) => Value::ArrayValue(ArrayValue {
            values: items
                .into_iter()
                .map(to_firestore_value)
                .collect::<Result<_, _>>()?,
        }),
        Json::Object(map) => Value::MapValue(MapValue {
            fields: map
                .into_iter()
                .map(|(k, v)| to_firestore_value(v).map(|v| (k, v)))
                .collect::<Result<_, _>>()?,
        }),
    })
}

/// Field paths that are not simple identifiers must be backquoted.
fn quote_field_path(name: &str) -> String {
    let simple = name
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');

    if simple {
        name.to_string()
    } else {
        format!("`{}`", name.replace('\\', "\\\\").replace('`', "\\`"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::Method::POST;
    use httpmock::MockServer;
    use serde_json::json;

    const COMMIT_PATH: &str = "/v1/projects/kitab/databases/(default)/documents:commit";

    fn book_fields() -> Fields {
        let mut fields = Fields::new();
        fields.insert("title".into(), "Dune".into());
        fields.insert("author".into(), "Herbert".into());
        fields.insert("year".into(), 1965_i64.into());
        fields.insert("timestamp".into(), FieldValue::ServerTimestamp);
        fields
    }

    #[test]
    fn converts_json_to_typed_values() {
        let value = to_firestore_value(json!({"year": 1965, "tags": ["scifi"], "rating": 4.5}))
            .unwrap();
        let rendered = serde_json::to_value(value).unwrap();

        assert_eq!(
            rendered,
            json!({"mapValue": {"fields": {
                "year": {"integerValue": "1965"},
                "tags": {"arrayValue": {"values": [{"stringValue": "scifi"}]}},
                "rating": {"doubleValue": 4.5}
            }}})
        );
    }

    #[test]
    fn quotes_non_identifier_paths() {
        assert_eq!(quote_field_path("timestamp"), "timestamp");
        assert_eq!(quote_field_path("created-at"), "`created-at`");
        assert_eq!(quote_field_path("1st"), "`1st`");
    }

    #[tokio::test]
    async fn create_commits_single_write_with_server_timestamp() {
        let server = MockServer::start_async().await;
        let commit = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path(COMMIT_PATH)
                    .header("authorization", "Bearer token-123")
                    .body_includes("projects/kitab/databases/(default)/documents/books/")
                    .body_includes(r#""title":{"stringValue":"Dune"}"#)
                    .body_includes(r#""year":{"integerValue":"1965"}"#)
                    .body_includes(r#""currentDocument":{"exists":false}"#)
                    .body_includes(
                        r#"{"fieldPath":"timestamp","setToServerValue":"REQUEST_TIME"}"#,
                    );
                then.status(200).json_body(json!({
                    "writeResults": [{"updateTime": "2024-01-01T00:00:00Z"}],
                    "commitTime": "2024-01-01T00:00:00Z"
                }));
            })
            .await;

        let store = FirestoreStore::new(server.url("/v1"), "kitab", Some("token-123".into()));
        let id = store.create("books", book_fields()).await.unwrap();

        commit.assert_async().await;
        assert_eq!(id.len(), 20);
    }

    fn write_service_account_key(token_uri: &str) -> std::path::PathBuf {
        let key = json!({
            "type": "service_account",
            "project_id": "kitab",
            "private_key_id": "test-key",
            "private_key": include_str!("../testdata/service_account.pem"),
            "client_email": "kitab-backend@kitab.iam.gserviceaccount.com",
            "client_id": "1234567890",
            "token_uri": token_uri
        });
        let path = std::env::temp_dir().join(format!("kitab-sa-{}.json", uuid::Uuid::new_v4()));
        std::fs::write(&path, key.to_string()).unwrap();
        path
    }

    #[tokio::test]
    async fn service_account_token_is_minted_and_reused() {
        let server = MockServer::start_async().await;
        let token = server
            .mock_async(|when, then| {
                when.method(POST).path("/token").body_includes("assertion=");
                then.status(200).json_body(json!({
                    "access_token": "ya29.minted",
                    "expires_in": 3600,
                    "token_type": "Bearer"
                }));
            })
            .await;
        let commit = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path(COMMIT_PATH)
                    .header("authorization", "Bearer ya29.minted");
                then.status(200).json_body(json!({"writeResults": [{}]}));
            })
            .await;

        let key_path = write_service_account_key(&server.url("/token"));
        let store = FirestoreStore::with_service_account(server.url("/v1"), None, &key_path)
            .await
            .unwrap();

        store.create("books", book_fields()).await.unwrap();
        store.create("books", book_fields()).await.unwrap();
        std::fs::remove_file(&key_path).unwrap();

        token.assert_hits_async(1).await;
        commit.assert_hits_async(2).await;
    }

    #[tokio::test]
    async fn missing_service_account_key_is_auth_error() {
        let err = FirestoreStore::with_service_account(
            "http://localhost:8080/v1",
            Some("kitab"),
            "/nonexistent/kitab-service-account.json",
        )
        .await
        .err()
        .unwrap();

        assert!(matches!(err, StoreError::Auth(_)));
        assert!(err.to_string().contains("failed to read service account key"));
    }

    #[tokio::test]
    async fn create_surfaces_api_error_message() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path(COMMIT_PATH);
                then.status(403).json_body(json!({
                    "error": {
                        "code": 403,
                        "message": "Missing or insufficient permissions.",
                        "status": "PERMISSION_DENIED"
                    }
                }));
            })
            .await;

        let store = FirestoreStore::new(server.url("/v1"), "kitab", None);
        let err = store.create("books", book_fields()).await.unwrap_err();

        assert_eq!(
            err.to_string(),
            "API error: Missing or insufficient permissions. (PERMISSION_DENIED, code: 403)"
        );
    }
}
