use thiserror::Error;

/// Classification of a failed call to an external provider
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderFailure {
    /// The request did not complete within the client timeout
    Timeout,
    /// Connection could not be established or was interrupted
    Network,
    /// HTTP 429: rate limit or quota exhausted
    RateLimited,
    /// HTTP 401/403: bad or missing API key
    Unauthorized,
    /// HTTP 5xx
    Server,
    /// The provider answered, but not with what we expected
    InvalidResponse,
    Other,
}

impl ProviderFailure {
    /// Whether a retry has a reasonable chance of succeeding
    pub fn is_transient(self) -> bool {
        matches!(
            self,
            Self::Timeout | Self::Network | Self::RateLimited | Self::Server
        )
    }
}

/// Core domain errors
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Extraction error: {message}")]
    Extraction { message: String },

    #[error("Chunking error: {message}")]
    Chunking { message: String },

    #[error("Index build error: {message}")]
    IndexBuild { message: String },

    #[error("Precondition failed: {message}")]
    Precondition { message: String },

    #[error("Provider error: {provider} - {message}")]
    Provider {
        provider: String,
        kind: ProviderFailure,
        message: String,
    },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Conflict: {message}")]
    Conflict { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl DomainError {
    pub fn extraction(message: impl Into<String>) -> Self {
        Self::Extraction {
            message: message.into(),
        }
    }

    pub fn chunking(message: impl Into<String>) -> Self {
        Self::Chunking {
            message: message.into(),
        }
    }

    pub fn index_build(message: impl Into<String>) -> Self {
        Self::IndexBuild {
            message: message.into(),
        }
    }

    pub fn precondition(message: impl Into<String>) -> Self {
        Self::Precondition {
            message: message.into(),
        }
    }

    /// Provider error that is not worth retrying
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::provider_failure(provider, ProviderFailure::Other, message)
    }

    pub fn provider_failure(
        provider: impl Into<String>,
        kind: ProviderFailure,
        message: impl Into<String>,
    ) -> Self {
        Self::Provider {
            provider: provider.into(),
            kind,
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// True for provider failures that a retry may fix
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Provider { kind, .. } => kind.is_transient(),
            _ => false,
        }
    }
}
