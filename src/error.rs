//! Error types for stores, the catalog fetcher and the orchestrator.
//!
//! `ServiceError` is what callers see. It renders itself as a JSON HTTP
//! response so handlers can return it directly.

use axum::{
  http::StatusCode,
  response::{IntoResponse, Response},
  Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
  #[error("store io error: {0}")]
  Io(#[from] std::io::Error),
  #[error("store serialization error: {0}")]
  Serde(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum FetchError {
  #[error("catalog request failed: {0}")]
  Transport(#[from] reqwest::Error),
  #[error("catalog HTTP {status}: {body}")]
  Status { status: u16, body: String },
  #[error("catalog response malformed: {0}")]
  Malformed(String),
  #[error("catalog returned no problems")]
  Empty,
  #[error("catalog request timed out after {0:?}")]
  Timeout(std::time::Duration),
}

#[derive(Debug, Error)]
pub enum ServiceError {
  #[error("preferences are not configured; set per-difficulty counts first")]
  ConfigurationMissing,
  #[error("no session credential is set; provide one before refreshing")]
  CredentialMissing,
  #[error("refresh produced nothing; check the session credential and try again")]
  FetchFailed(#[source] FetchError),
  #[error("storage failure: {0}")]
  Storage(#[from] StoreError),
  #[error("invalid user id")]
  InvalidUser,
  #[error("the session credential cannot be blank")]
  BlankCredential,
}

impl ServiceError {
  pub fn kind(&self) -> &'static str {
    match self {
      ServiceError::ConfigurationMissing => "configuration_missing",
      ServiceError::CredentialMissing => "credential_missing",
      ServiceError::FetchFailed(_) => "fetch_failed",
      ServiceError::Storage(_) => "storage",
      ServiceError::InvalidUser => "invalid_user",
      ServiceError::BlankCredential => "blank_credential",
    }
  }

  fn status(&self) -> StatusCode {
    match self {
      ServiceError::ConfigurationMissing | ServiceError::CredentialMissing => StatusCode::PRECONDITION_FAILED,
      ServiceError::FetchFailed(_) => StatusCode::BAD_GATEWAY,
      ServiceError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
      ServiceError::InvalidUser | ServiceError::BlankCredential => StatusCode::BAD_REQUEST,
    }
  }
}

#[derive(Serialize)]
struct ErrorOut {
  error: &'static str,
  message: String,
}

impl IntoResponse for ServiceError {
  fn into_response(self) -> Response {
    // FetchFailed stays generic toward the caller; the cause is logged where it happens.
    let body = ErrorOut { error: self.kind(), message: self.to_string() };
    (self.status(), Json(body)).into_response()
  }
}

pub type ServiceResult<T> = Result<T, ServiceError>;
