use reqwest::StatusCode;

// Error handling for local client requests

#[derive(Debug, thiserror::Error)]
pub enum LcuError {
  /// No credentials held. Expected whenever the client is not running.
  #[error("League client not connected")]
  NotConnected,

  /// Connection refused, reset or timed out.
  #[error("League client unreachable: {0}")]
  Unreachable(#[source] Box<dyn std::error::Error + Send + Sync>),

  /// 401: the token belongs to a previous client process.
  #[error("League client rejected credentials (stale auth token)")]
  AuthStale,

  /// 404: the endpoint does not exist in the client's current phase.
  #[error("Endpoint {0} not available")]
  EndpointUnavailable(String),

  #[error("LCU API error on {endpoint}: {status}")]
  Http { endpoint: String, status: StatusCode },

  #[error("Malformed response from {endpoint}: {reason}")]
  Malformed { endpoint: String, reason: String },

  #[error("Invalid endpoint {0}")]
  InvalidEndpoint(String),

  #[error("Failed to create HTTP client: {0}")]
  ClientBuild(#[source] reqwest::Error),
}

impl LcuError {
  /// Errors after which the held credentials can no longer be trusted.
  pub fn is_connection_loss(&self) -> bool {
    matches!(
      self,
      Self::NotConnected | Self::Unreachable(_) | Self::AuthStale
    )
  }

  pub(crate) fn from_status(endpoint: &str, status: StatusCode) -> Self {
    match status {
      StatusCode::UNAUTHORIZED => Self::AuthStale,
      StatusCode::NOT_FOUND => Self::EndpointUnavailable(endpoint.to_string()),
      status => Self::Http {
        endpoint: endpoint.to_string(),
        status,
      },
    }
  }

  pub(crate) fn unreachable(err: impl std::error::Error + Send + Sync + 'static) -> Self {
    Self::Unreachable(Box::new(err))
  }

  pub(crate) fn malformed(endpoint: &str, reason: impl ToString) -> Self {
    Self::Malformed {
      endpoint: endpoint.to_string(),
      reason: reason.to_string(),
    }
  }
}
