//! Conversions from external infrastructure errors into domain errors.

use keyring::Error as KeyringError;
use reqwest::Error as HttpError;
use serde_json::Error as JsonError;
use tokenline_domain::TokenlineError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub TokenlineError);

impl From<InfraError> for TokenlineError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<TokenlineError> for InfraError {
    fn from(value: TokenlineError) -> Self {
        InfraError(value)
    }
}

/// Extension trait to make the conversion logic explicit in tests and within
/// this module.
trait IntoTokenlineError {
    fn into_tokenline(self) -> TokenlineError;
}

/* -------------------------------------------------------------------------- */
/* keyring::Error → TokenlineError */
/* -------------------------------------------------------------------------- */

impl IntoTokenlineError for KeyringError {
    fn into_tokenline(self) -> TokenlineError {
        use KeyringError::*;

        let description = self.to_string();

        match self {
            NoEntry => TokenlineError::NotFound("keychain entry not found".into()),
            BadEncoding(_) => {
                TokenlineError::Storage("credential in keychain is not valid UTF-8".into())
            }
            TooLong(name, limit) => TokenlineError::Storage(format!(
                "keychain attribute '{name}' exceeds platform limit ({limit})"
            )),
            Invalid(attr, reason) => {
                TokenlineError::Storage(format!("keychain attribute '{attr}' is invalid: {reason}"))
            }
            PlatformFailure(err) => {
                TokenlineError::Storage(format!("keychain platform error: {err}"))
            }
            NoStorageAccess(err) => {
                TokenlineError::Storage(format!("unable to access secure storage: {err}"))
            }
            _ => TokenlineError::Storage(description),
        }
    }
}

impl From<KeyringError> for InfraError {
    fn from(value: KeyringError) -> Self {
        InfraError(value.into_tokenline())
    }
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → TokenlineError */
/* -------------------------------------------------------------------------- */

impl IntoTokenlineError for HttpError {
    fn into_tokenline(self) -> TokenlineError {
        if self.is_timeout() {
            return TokenlineError::Network("HTTP request timed out".into());
        }

        #[cfg(not(target_arch = "wasm32"))]
        if self.is_connect() {
            return TokenlineError::Network(format!("HTTP connection failure: {self}"));
        }

        if self.is_builder() {
            return TokenlineError::InvalidInput(format!("invalid HTTP request: {self}"));
        }

        TokenlineError::Network(self.to_string())
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        InfraError(value.into_tokenline())
    }
}

/* -------------------------------------------------------------------------- */
/* std::io::Error / serde_json::Error → TokenlineError */
/* -------------------------------------------------------------------------- */

impl IntoTokenlineError for std::io::Error {
    fn into_tokenline(self) -> TokenlineError {
        match self.kind() {
            std::io::ErrorKind::NotFound => TokenlineError::NotFound(self.to_string()),
            _ => TokenlineError::Storage(format!("I/O failure: {self}")),
        }
    }
}

impl From<std::io::Error> for InfraError {
    fn from(value: std::io::Error) -> Self {
        InfraError(value.into_tokenline())
    }
}

impl IntoTokenlineError for JsonError {
    fn into_tokenline(self) -> TokenlineError {
        TokenlineError::Storage(format!("malformed JSON: {self}"))
    }
}

impl From<JsonError> for InfraError {
    fn from(value: JsonError) -> Self {
        InfraError(value.into_tokenline())
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
