use api_types::{
    account::{Account, AccountId, AccountPayload},
    auth::{LoginRequest, RegisterRequest, TokenResponse},
};
use reqwest::{RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;

use crate::error::{AppError, Result};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// No usable response: transport failure or an unreadable body.
    #[error("network error: {0}")]
    Network(String),
    #[error("{status}: {message}")]
    Http { status: StatusCode, message: String },
}

impl ApiError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Network(_) => None,
            Self::Http { status, .. } => Some(*status),
        }
    }

    /// What the user sees after "Failed to ...: ".
    pub fn status_label(&self) -> String {
        match self.status() {
            Some(status) => status.as_u16().to_string(),
            None => "Network error".to_string(),
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => Self::Http {
                status,
                message: err.to_string(),
            },
            None => Self::Network(err.to_string()),
        }
    }
}

/// Account CRUD against `/api/accounts/`.
#[allow(async_fn_in_trait)]
pub trait AccountsApi {
    async fn list_accounts(&self, token: Option<&str>) -> std::result::Result<Vec<Account>, ApiError>;

    async fn create_account(
        &self,
        token: Option<&str>,
        payload: &AccountPayload,
    ) -> std::result::Result<Account, ApiError>;

    async fn update_account(
        &self,
        token: Option<&str>,
        id: AccountId,
        payload: &AccountPayload,
    ) -> std::result::Result<Account, ApiError>;

    async fn delete_account(&self, token: Option<&str>, id: AccountId)
    -> std::result::Result<(), ApiError>;
}

/// Token issuance; both calls answer with a fresh access/refresh pair.
#[allow(async_fn_in_trait)]
pub trait AuthApi {
    async fn login(&self, payload: &LoginRequest) -> std::result::Result<TokenResponse, ApiError>;

    async fn register(
        &self,
        payload: &RegisterRequest,
    ) -> std::result::Result<TokenResponse, ApiError>;
}

#[derive(Debug, Clone)]
pub struct Client {
    base_url: Url,
    http: reqwest::Client,
}

impl Client {
    pub fn new(base_url: &str) -> Result<Self> {
        // Url::join drops the last path segment unless it ends with '/'
        let normalized = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalized)
            .map_err(|err| AppError::BaseUrl(format!("{base_url}: {err}")))?;
        let http = reqwest::Client::builder().build()?;
        Ok(Self { base_url, http })
    }

    fn url(&self, path: &str) -> std::result::Result<Url, ApiError> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|err| ApiError::Network(format!("invalid url: {err}")))
    }

    fn authorized(req: RequestBuilder, token: Option<&str>) -> RequestBuilder {
        match token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        req: RequestBuilder,
    ) -> std::result::Result<T, ApiError> {
        let res = req.send().await?;
        let status = res.status();
        if status.is_success() {
            return Ok(res.json::<T>().await?);
        }
        Err(error_from_response(status, res).await)
    }

    async fn send_unit(&self, req: RequestBuilder) -> std::result::Result<(), ApiError> {
        let res = req.send().await?;
        let status = res.status();
        if status.is_success() {
            return Ok(());
        }
        Err(error_from_response(status, res).await)
    }
}

impl AccountsApi for Client {
    async fn list_accounts(&self, token: Option<&str>) -> std::result::Result<Vec<Account>, ApiError> {
        let req = Self::authorized(self.http.get(self.url("api/accounts/")?), token);
        tracing::debug!("GET api/accounts/");
        // a `null` body means no accounts
        let accounts: Option<Vec<Account>> = self.send_json(req).await?;
        Ok(accounts.unwrap_or_default())
    }

    async fn create_account(
        &self,
        token: Option<&str>,
        payload: &AccountPayload,
    ) -> std::result::Result<Account, ApiError> {
        let req = Self::authorized(self.http.post(self.url("api/accounts/")?), token).json(payload);
        tracing::debug!("POST api/accounts/");
        self.send_json(req).await
    }

    async fn update_account(
        &self,
        token: Option<&str>,
        id: AccountId,
        payload: &AccountPayload,
    ) -> std::result::Result<Account, ApiError> {
        let path = format!("api/accounts/{id}");
        let req = Self::authorized(self.http.put(self.url(&path)?), token).json(payload);
        tracing::debug!("PUT {path}");
        self.send_json(req).await
    }

    async fn delete_account(
        &self,
        token: Option<&str>,
        id: AccountId,
    ) -> std::result::Result<(), ApiError> {
        let path = format!("api/accounts/{id}");
        let req = Self::authorized(self.http.delete(self.url(&path)?), token);
        tracing::debug!("DELETE {path}");
        self.send_unit(req).await
    }
}

impl AuthApi for Client {
    async fn login(&self, payload: &LoginRequest) -> std::result::Result<TokenResponse, ApiError> {
        let req = self.http.post(self.url("api/login/")?).json(payload);
        self.send_json(req).await
    }

    async fn register(
        &self,
        payload: &RegisterRequest,
    ) -> std::result::Result<TokenResponse, ApiError> {
        let req = self.http.post(self.url("api/register/")?).json(payload);
        self.send_json(req).await
    }
}

async fn error_from_response(status: StatusCode, res: reqwest::Response) -> ApiError {
    let message = match res.json::<serde_json::Value>().await {
        Ok(body) => error_message(&body),
        Err(_) => None,
    }
    .unwrap_or_else(|| {
        status
            .canonical_reason()
            .unwrap_or("server error")
            .to_string()
    });
    ApiError::Http { status, message }
}

/// Pulls a readable message out of a REST framework error body.
///
/// Bodies look like `{"detail": "..."}`, `{"error": "..."}`,
/// `{"non_field_errors": ["..."]}` or `{"field": ["..."]}`.
fn error_message(body: &serde_json::Value) -> Option<String> {
    let object = body.as_object()?;
    for key in ["detail", "error"] {
        if let Some(text) = object.get(key).and_then(first_text) {
            return Some(text);
        }
    }
    if let Some(text) = object.get("non_field_errors").and_then(first_text) {
        return Some(text);
    }
    object
        .iter()
        .find_map(|(field, value)| first_text(value).map(|text| format!("{field}: {text}")))
}

fn first_text(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(text) => Some(text.clone()),
        serde_json::Value::Array(items) => items.iter().find_map(first_text),
        _ => None,
    }
}
