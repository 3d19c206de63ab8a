//! Supabase gateway
//!
//! HTTP client for a Supabase project: PostgREST for the `appointments`
//! table and GoTrue for authentication.

use super::session_file::{SessionFile, StoredTokens};
use super::{Gateway, GatewayError, GatewayResult, SignUpOutcome};
use crate::models::{Appointment, AppointmentPatch, NewAppointment, Profile, Session};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, Url};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

const APPOINTMENTS_TABLE: &str = "appointments";

/// Supabase gateway
pub struct SupabaseGateway {
    client: Client,
    config: GatewayConfig,
    base_url: String,
    tokens: RwLock<Option<StoredTokens>>,
}

/// Connection settings for a Supabase project
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Project URL (e.g., "https://abcd.supabase.co")
    pub url: String,
    /// Public anon key
    pub anon_key: String,
    /// Request timeout in milliseconds
    pub request_timeout_ms: u64,
    /// Where confirmation emails should send the user back to
    pub email_redirect_to: Option<String>,
    /// Persisted session tokens
    pub session_file: SessionFile,
}

impl GatewayConfig {
    pub fn new(url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            anon_key: anon_key.into(),
            request_timeout_ms: 10_000,
            email_redirect_to: None,
            session_file: SessionFile::disabled(),
        }
    }
}

impl SupabaseGateway {
    /// Build a client handle for the project
    ///
    /// Fails when the URL is not an absolute http(s) URL or the HTTP client
    /// cannot be constructed. No request is made here.
    pub fn connect(config: GatewayConfig) -> GatewayResult<Self> {
        let url = Url::parse(config.url.trim())
            .map_err(|e| GatewayError::Connection(format!("invalid URL {:?}: {}", config.url, e)))?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(GatewayError::Connection(format!(
                "unsupported URL scheme: {}",
                url.scheme()
            )));
        }

        let client = Client::builder()
            .timeout(std::time::Duration::from_millis(config.request_timeout_ms))
            .build()
            .map_err(|e| GatewayError::Connection(e.to_string()))?;

        let base_url = url.as_str().trim_end_matches('/').to_string();
        let tokens = config.session_file.load();

        tracing::info!(url = %base_url, restored = tokens.is_some(), "Supabase client created");

        Ok(Self {
            client,
            config,
            base_url,
            tokens: RwLock::new(tokens),
        })
    }

    fn rest_url(&self) -> String {
        format!("{}/rest/v1/{}", self.base_url, APPOINTMENTS_TABLE)
    }

    fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.base_url, path)
    }

    /// Attach the project key and the caller's bearer token
    async fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        let tokens = self.tokens.read().await;
        let bearer = tokens
            .as_ref()
            .map(|t| t.access_token.as_str())
            .unwrap_or(self.config.anon_key.as_str());

        request
            .header("apikey", &self.config.anon_key)
            .bearer_auth(bearer)
    }

    async fn send(&self, request: RequestBuilder) -> GatewayResult<Response> {
        request.send().await.map_err(|e| {
            if e.is_timeout() {
                GatewayError::Timeout
            } else {
                GatewayError::Connection(e.to_string())
            }
        })
    }

    async fn store_tokens(&self, tokens: StoredTokens) {
        self.config.session_file.save(&tokens);
        *self.tokens.write().await = Some(tokens);
    }

    async fn drop_tokens(&self) {
        self.config.session_file.clear();
        *self.tokens.write().await = None;
    }

    async fn query_by(&self, column: &str, value: &str) -> GatewayResult<Vec<Appointment>> {
        let url = format!(
            "{}?select=*&{}=eq.{}&order=appointment_date.asc",
            self.rest_url(),
            column,
            urlencoding::encode(value)
        );

        let request = self.authorize(self.client.get(&url)).await;
        let response = ensure_success(self.send(request).await?, GatewayError::Store).await?;

        response
            .json::<Vec<Appointment>>()
            .await
            .map_err(|e| GatewayError::Decode(e.to_string()))
    }

    async fn fetch_user(&self, access_token: &str) -> GatewayResult<Option<AuthUser>> {
        let request = self
            .client
            .get(self.auth_url("user"))
            .header("apikey", &self.config.anon_key)
            .bearer_auth(access_token);
        let response = self.send(request).await?;

        if response.status().as_u16() == 401 || response.status().as_u16() == 403 {
            return Ok(None);
        }

        let response = ensure_success(response, GatewayError::Auth).await?;
        let user = response
            .json::<AuthUser>()
            .await
            .map_err(|e| GatewayError::Decode(e.to_string()))?;
        Ok(Some(user))
    }

    async fn refresh(&self, refresh_token: &str) -> GatewayResult<StoredTokens> {
        let request = self
            .client
            .post(self.auth_url("token?grant_type=refresh_token"))
            .header("apikey", &self.config.anon_key)
            .json(&RefreshRequest { refresh_token });
        let response = ensure_success(self.send(request).await?, GatewayError::Auth).await?;
        let body = response
            .json::<TokenResponse>()
            .await
            .map_err(|e| GatewayError::Decode(e.to_string()))?;
        Ok(body.into_tokens())
    }
}

#[async_trait]
impl Gateway for SupabaseGateway {
    async fn get_session(&self) -> GatewayResult<Option<Session>> {
        let Some(tokens) = self.tokens.read().await.clone() else {
            return Ok(None);
        };

        if let Some(user) = self.fetch_user(&tokens.access_token).await? {
            let session = user.into_session();
            self.store_tokens(StoredTokens {
                session: session.clone(),
                ..tokens
            })
            .await;
            return Ok(Some(session));
        }

        tracing::debug!("Stored access token rejected, attempting refresh");
        match self.refresh(&tokens.refresh_token).await {
            Ok(fresh) => {
                let session = fresh.session.clone();
                self.store_tokens(fresh).await;
                Ok(Some(session))
            }
            Err(e) => {
                tracing::info!(error = %e, "Stored session expired");
                self.drop_tokens().await;
                Ok(None)
            }
        }
    }

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        profile: &Profile,
    ) -> GatewayResult<SignUpOutcome> {
        let mut request = self
            .client
            .post(self.auth_url("signup"))
            .header("apikey", &self.config.anon_key)
            .json(&SignUpRequest {
                email,
                password,
                data: profile,
            });
        if let Some(redirect) = &self.config.email_redirect_to {
            request = request.query(&[("redirect_to", redirect)]);
        }

        let response = ensure_success(self.send(request).await?, GatewayError::Auth).await?;
        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| GatewayError::Decode(e.to_string()))?;

        // Auto-confirmed projects answer with a full token response;
        // otherwise the body is the pending user.
        if body.get("access_token").is_some() {
            let tokens = serde_json::from_value::<TokenResponse>(body)
                .map_err(|e| GatewayError::Decode(e.to_string()))?
                .into_tokens();
            let session = tokens.session.clone();
            self.store_tokens(tokens).await;

            return Ok(SignUpOutcome {
                user_id: session.user_id.clone(),
                email: session.email.clone(),
                session: Some(session),
            });
        }

        let user_value = body.get("user").cloned().unwrap_or(body);
        let user = serde_json::from_value::<AuthUser>(user_value)
            .map_err(|e| GatewayError::Decode(e.to_string()))?;

        Ok(SignUpOutcome {
            user_id: user.id,
            email: user.email.unwrap_or_else(|| email.to_string()),
            session: None,
        })
    }

    async fn sign_in(&self, email: &str, password: &str) -> GatewayResult<Session> {
        let request = self
            .client
            .post(self.auth_url("token?grant_type=password"))
            .header("apikey", &self.config.anon_key)
            .json(&SignInRequest { email, password });

        let response = ensure_success(self.send(request).await?, GatewayError::Auth).await?;
        let tokens = response
            .json::<TokenResponse>()
            .await
            .map_err(|e| GatewayError::Decode(e.to_string()))?
            .into_tokens();

        let session = tokens.session.clone();
        self.store_tokens(tokens).await;

        tracing::info!(user_id = %session.user_id, "Signed in");
        Ok(session)
    }

    async fn sign_out(&self) -> GatewayResult<()> {
        let access_token = self
            .tokens
            .read()
            .await
            .as_ref()
            .map(|t| t.access_token.clone());

        // Local tokens go regardless of what the server says
        self.drop_tokens().await;

        let Some(access_token) = access_token else {
            return Ok(());
        };

        let request = self
            .client
            .post(self.auth_url("logout"))
            .header("apikey", &self.config.anon_key)
            .bearer_auth(access_token);

        match self.send(request).await {
            Ok(response) if !response.status().is_success() => {
                tracing::warn!(status = %response.status(), "Remote sign-out rejected");
            }
            Err(e) => tracing::warn!(error = %e, "Remote sign-out failed"),
            Ok(_) => {}
        }

        Ok(())
    }

    async fn insert_appointment(&self, record: &NewAppointment) -> GatewayResult<String> {
        let request = self
            .authorize(self.client.post(self.rest_url()))
            .await
            .header("Prefer", "return=representation")
            .json(&[record]);

        let response = ensure_success(self.send(request).await?, GatewayError::Store).await?;
        let rows = response
            .json::<Vec<InsertedRow>>()
            .await
            .map_err(|e| GatewayError::Decode(e.to_string()))?;

        let id = rows
            .into_iter()
            .next()
            .map(|row| row.id)
            .ok_or_else(|| GatewayError::Decode("insert returned no rows".to_string()))?;

        tracing::info!(appointment_id = %id, "Appointment stored");
        Ok(id)
    }

    async fn query_appointments_by_email(&self, email: &str) -> GatewayResult<Vec<Appointment>> {
        self.query_by("email", email).await
    }

    async fn query_appointments_by_owner(
        &self,
        owner_id: &str,
    ) -> GatewayResult<Vec<Appointment>> {
        self.query_by("user_id", owner_id).await
    }

    async fn update_appointment(&self, id: &str, patch: &AppointmentPatch) -> GatewayResult<()> {
        let url = format!("{}?id=eq.{}", self.rest_url(), urlencoding::encode(id));
        let request = self.authorize(self.client.patch(&url)).await.json(patch);

        ensure_success(self.send(request).await?, GatewayError::Store).await?;

        tracing::info!(appointment_id = %id, status = %patch.status, "Appointment updated");
        Ok(())
    }
}

/// Pass successful responses through; turn the rest into `kind(message)`
async fn ensure_success(
    response: Response,
    kind: fn(String) -> GatewayError,
) -> GatewayResult<Response> {
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status();
    let text = response.text().await.unwrap_or_default();
    Err(kind(error_message(status.as_u16(), &text)))
}

/// Pull the human-readable message out of a PostgREST or GoTrue error body
fn error_message(status: u16, body: &str) -> String {
    let message = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            ["message", "error_description", "msg", "error"]
                .iter()
                .find_map(|key| value.get(*key).and_then(|v| v.as_str()).map(str::to_string))
        });

    match message {
        Some(message) => message,
        None if body.trim().is_empty() => format!("HTTP {}", status),
        None => format!("{}: {}", status, body.trim()),
    }
}

// ============================================
// Request/Response DTOs
// ============================================

#[derive(Debug, Serialize)]
struct SignUpRequest<'a> {
    email: &'a str,
    password: &'a str,
    data: &'a Profile,
}

#[derive(Debug, Serialize)]
struct SignInRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct RefreshRequest<'a> {
    refresh_token: &'a str,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: String,
    user: AuthUser,
}

impl TokenResponse {
    fn into_tokens(self) -> StoredTokens {
        StoredTokens {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            session: self.user.into_session(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct AuthUser {
    id: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    user_metadata: Option<Profile>,
}

impl AuthUser {
    fn into_session(self) -> Session {
        Session::new(self.id, self.email.unwrap_or_default())
            .with_profile(self.user_metadata.unwrap_or_default())
    }
}

#[derive(Debug, Deserialize)]
struct InsertedRow {
    #[serde(deserialize_with = "crate::models::deserialize_id")]
    id: String,
}
