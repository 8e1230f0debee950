//! Reqwest-backed portal API adapter.
//!
//! This adapter owns transport details only: multipart and JSON encoding,
//! bearer authentication, timeout and status mapping. Classifying a
//! rejection into a user-facing outcome is left to the domain.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, StatusCode, Url};
use serde_json::Value;
use tracing::debug;

use super::dto::{ErrorBodyDto, LoginRequestDto, LoginResponseDto};
use crate::domain::ports::{AuthGateway, BackendError, RegistrationGateway};
use crate::domain::{AuthToken, LoginCredentials, RegistrationReceipt, ValidRegistration};

const REGISTER_PATH: &str = "api/users/register";
const LOGIN_PATH: &str = "api/auth/login";
const VERIFY_PATH: &str = "api/auth/verify";

/// Portal backend client implementing the registration and auth gateways.
#[derive(Debug, Clone)]
pub struct PortalHttpClient {
    client: Client,
    base_url: Url,
}

impl PortalHttpClient {
    /// Build a client rooted at `base_url` with a per-request `timeout`.
    ///
    /// A missing trailing slash on `base_url` is added so endpoint paths join
    /// beneath it rather than replacing its last segment.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(mut base_url: Url, timeout: Duration) -> Result<Self, reqwest::Error> {
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base_url })
    }

    fn endpoint(&self, path: &str) -> Result<Url, BackendError> {
        self.base_url
            .join(path)
            .map_err(|error| BackendError::transport(format!("invalid endpoint {path}: {error}")))
    }
}

#[async_trait]
impl RegistrationGateway for PortalHttpClient {
    async fn register(
        &self,
        registration: &ValidRegistration,
    ) -> Result<RegistrationReceipt, BackendError> {
        let endpoint = self.endpoint(REGISTER_PATH)?;
        let form = registration_form(registration)?;
        debug!(%endpoint, "submitting registration");
        let response = self
            .client
            .post(endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }
        Ok(RegistrationReceipt {
            body: serde_json::from_slice(body.as_ref()).unwrap_or(Value::Null),
        })
    }
}

#[async_trait]
impl AuthGateway for PortalHttpClient {
    async fn login(&self, credentials: &LoginCredentials) -> Result<AuthToken, BackendError> {
        let endpoint = self.endpoint(LOGIN_PATH)?;
        let response = self
            .client
            .post(endpoint)
            .json(&LoginRequestDto {
                email: credentials.email(),
                password: credentials.password(),
            })
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }
        parse_token(body.as_ref())
    }

    async fn verify(&self, token: &AuthToken) -> Result<(), BackendError> {
        let endpoint = self.endpoint(VERIFY_PATH)?;
        let response = self
            .client
            .get(endpoint)
            .bearer_auth(token.expose())
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.bytes().await.map_err(map_transport_error)?;
        Err(map_status_error(status, body.as_ref()))
    }
}

fn registration_form(registration: &ValidRegistration) -> Result<Form, BackendError> {
    let mut form = Form::new()
        .text("name", registration.name.clone())
        .text("email", registration.email.clone())
        .text("phone", registration.phone.clone())
        .text("dob", registration.date_of_birth.to_string())
        .text("plan", registration.plan_id.as_str())
        .text("startDate", registration.window.start_date().to_string())
        .text("endDate", registration.window.end_date().to_string())
        .text("paymentMethod", registration.payment_method.as_str());

    if let Some(photo) = &registration.photo {
        let part = Part::bytes(photo.bytes().to_vec())
            .file_name(photo.file_name().to_owned())
            .mime_str(photo.media_type())
            .map_err(|error| BackendError::transport(format!("invalid photo part: {error}")))?;
        form = form.part("photo", part);
    }
    Ok(form)
}

fn parse_token(body: &[u8]) -> Result<AuthToken, BackendError> {
    let decoded: LoginResponseDto = serde_json::from_slice(body)
        .map_err(|error| BackendError::decode(format!("invalid login payload: {error}")))?;
    AuthToken::new(decoded.token).map_err(|error| BackendError::decode(error.to_string()))
}

fn map_transport_error(error: reqwest::Error) -> BackendError {
    if error.is_timeout() {
        BackendError::timeout(error.to_string())
    } else {
        BackendError::transport(error.to_string())
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> BackendError {
    let decoded: ErrorBodyDto = serde_json::from_slice(body).unwrap_or_default();
    let message = decoded
        .message
        .filter(|message| !message.trim().is_empty());

    if matches!(
        status,
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT
    ) {
        let detail = message.unwrap_or_else(|| format!("status {}", status.as_u16()));
        return BackendError::timeout(detail);
    }

    match (message, decoded.code) {
        (Some(message), code) => BackendError::rejected(status.as_u16(), message, code),
        (None, Some(code)) => BackendError::rejected(
            status.as_u16(),
            format!("Request failed with status {}", status.as_u16()),
            Some(code),
        ),
        (None, None) => BackendError::unparsed(status.as_u16(), body_preview(body)),
    }
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}
