//! Typed client for the remote directory API

use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::credentials::CredentialProvider;
use super::models::{Contact, NewContact, NewOrganization, Organization, Role};
use crate::auth::{LoginRequest, PasswordChange, ProfileUpdate, RegisterRequest, TokenResponse, User};
use crate::config::{ApiConfig, Endpoints};
use crate::error::{Error, Result};

/// HTTP client bound to one API base URL and one credential provider
#[derive(Clone, Debug)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    endpoints: Endpoints,
    credentials: CredentialProvider,
}

impl ApiClient {
    /// Create a client for `config`, authenticating with `credentials`
    pub fn new(config: &ApiConfig, credentials: CredentialProvider) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            http: builder.build()?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            endpoints: config.endpoints.clone(),
            credentials,
        })
    }

    /// The credential provider this client reads from
    pub fn credentials(&self) -> &CredentialProvider {
        &self.credentials
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    fn item_url(&self, collection: &str, id: i64) -> String {
        format!("{}/{}", self.url(collection).trim_end_matches('/'), id)
    }

    /// Attach the installed credential, if any
    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match self.credentials.token() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    // ------------------------------------------------------------------
    // Authentication
    // ------------------------------------------------------------------

    /// Exchange credentials for a bearer token
    pub async fn login(&self, request: &LoginRequest) -> Result<String> {
        let url = self.url(&self.endpoints.login);
        tracing::debug!("POST {}", url);
        let response = self.http.post(&url).json(request).send().await?;
        read_token(check(response).await?).await
    }

    /// Create an account and receive its bearer token
    pub async fn register(&self, request: &RegisterRequest) -> Result<String> {
        let url = self.url(&self.endpoints.register);
        tracing::debug!("POST {}", url);
        let response = self.http.post(&url).json(request).send().await?;
        read_token(check(response).await?).await
    }

    /// Fetch the profile of the installed credential's owner
    pub async fn fetch_profile(&self) -> Result<User> {
        let request = self.authorized(self.http.get(self.url(&self.endpoints.profile)));
        send_json(request).await
    }

    /// Fetch the profile for an explicit token, ignoring the installed credential
    pub async fn fetch_profile_with(&self, token: &str) -> Result<User> {
        let request = self
            .http
            .get(self.url(&self.endpoints.profile))
            .bearer_auth(token);
        send_json(request).await
    }

    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<User> {
        let request = self
            .authorized(self.http.put(self.url(&self.endpoints.profile)))
            .json(update);
        send_json(request).await
    }

    pub async fn change_password(&self, change: &PasswordChange) -> Result<()> {
        let url = format!("{}/password", self.url(&self.endpoints.profile));
        let request = self.authorized(self.http.put(url)).json(change);
        send_empty(request).await
    }

    pub async fn delete_account(&self) -> Result<()> {
        let request = self.authorized(self.http.delete(self.url(&self.endpoints.profile)));
        send_empty(request).await
    }

    // ------------------------------------------------------------------
    // Directory
    // ------------------------------------------------------------------

    pub async fn list_contacts(&self) -> Result<Vec<Contact>> {
        self.get_json(&self.url(&self.endpoints.contacts)).await
    }

    pub async fn get_contact(&self, id: i64) -> Result<Contact> {
        self.get_json(&self.item_url(&self.endpoints.contacts, id)).await
    }

    pub async fn create_contact(&self, contact: &NewContact) -> Result<Contact> {
        self.post_json(&self.url(&self.endpoints.contacts), contact).await
    }

    pub async fn update_contact(&self, id: i64, contact: &NewContact) -> Result<Contact> {
        let request = self
            .authorized(self.http.put(self.item_url(&self.endpoints.contacts, id)))
            .json(contact);
        send_json(request).await
    }

    pub async fn delete_contact(&self, id: i64) -> Result<()> {
        self.delete(&self.item_url(&self.endpoints.contacts, id)).await
    }

    pub async fn list_organizations(&self) -> Result<Vec<Organization>> {
        self.get_json(&self.url(&self.endpoints.organizations)).await
    }

    pub async fn get_organization(&self, id: i64) -> Result<Organization> {
        self.get_json(&self.item_url(&self.endpoints.organizations, id))
            .await
    }

    pub async fn create_organization(&self, organization: &NewOrganization) -> Result<Organization> {
        self.post_json(&self.url(&self.endpoints.organizations), organization)
            .await
    }

    pub async fn delete_organization(&self, id: i64) -> Result<()> {
        self.delete(&self.item_url(&self.endpoints.organizations, id))
            .await
    }

    pub async fn list_roles(&self) -> Result<Vec<Role>> {
        self.get_json(&self.url(&self.endpoints.roles)).await
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        tracing::debug!("GET {}", url);
        send_json(self.authorized(self.http.get(url))).await
    }

    async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        url: &str,
        body: &B,
    ) -> Result<T> {
        tracing::debug!("POST {}", url);
        send_json(self.authorized(self.http.post(url)).json(body)).await
    }

    async fn delete(&self, url: &str) -> Result<()> {
        tracing::debug!("DELETE {}", url);
        send_empty(self.authorized(self.http.delete(url))).await
    }
}

async fn send_json<T: DeserializeOwned>(request: RequestBuilder) -> Result<T> {
    let response = check(request.send().await?).await?;
    Ok(response.json::<T>().await?)
}

async fn send_empty(request: RequestBuilder) -> Result<()> {
    check(request.send().await?).await?;
    Ok(())
}

/// Map non-success statuses onto the error taxonomy
async fn check(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    if status == StatusCode::UNAUTHORIZED {
        tracing::debug!("{} rejected with {}", response.url(), status);
        return Err(Error::Unauthorized);
    }

    let body = response.text().await.unwrap_or_default();
    if status == StatusCode::FORBIDDEN {
        // The credential is valid; the account just lacks the role
        return Err(Error::Forbidden(rejection_message(status, &body)));
    }

    Err(Error::Rejected {
        status: status.as_u16(),
        message: rejection_message(status, &body),
    })
}

/// Prefer the server's `message`/`error` field, then the raw body, then the reason phrase
fn rejection_message(status: StatusCode, body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        for field in ["message", "error"] {
            if let Some(text) = value.get(field).and_then(|v| v.as_str()) {
                return text.to_string();
            }
        }
    }

    let body = body.trim();
    if !body.is_empty() {
        return body.to_string();
    }

    status
        .canonical_reason()
        .unwrap_or("Unknown error")
        .to_string()
}

/// Pull the token out of an otherwise successful login/register response
async fn read_token(response: Response) -> Result<String> {
    let body = response.text().await?;
    serde_json::from_str::<TokenResponse>(&body)
        .ok()
        .and_then(TokenResponse::into_token)
        .ok_or(Error::MissingToken)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base_url: &str) -> ApiClient {
        let config = ApiConfig {
            base_url: base_url.to_string(),
            ..ApiConfig::default()
        };
        ApiClient::new(&config, CredentialProvider::new()).unwrap()
    }

    #[test]
    fn test_url_joining() {
        let api = client("http://localhost:8080/");
        assert_eq!(api.url("/login"), "http://localhost:8080/login");
        assert_eq!(api.url("login"), "http://localhost:8080/login");
        assert_eq!(api.item_url("/api/contacts", 7), "http://localhost:8080/api/contacts/7");
    }

    #[test]
    fn test_rejection_message_prefers_json_field() {
        let msg = rejection_message(StatusCode::BAD_REQUEST, r#"{"message":"Email already used"}"#);
        assert_eq!(msg, "Email already used");

        let msg = rejection_message(StatusCode::BAD_REQUEST, r#"{"error":"Bad Request"}"#);
        assert_eq!(msg, "Bad Request");
    }

    #[test]
    fn test_rejection_message_fallbacks() {
        assert_eq!(rejection_message(StatusCode::CONFLICT, "  duplicate  "), "duplicate");
        assert_eq!(
            rejection_message(StatusCode::INTERNAL_SERVER_ERROR, ""),
            "Internal Server Error"
        );
    }
}
