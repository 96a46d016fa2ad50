use crate::catalog::CatalogError;
use crate::domain::{CartError, Money};
use crate::engine::LedgerError;
use crate::orchestration::SettlementError;
use crate::recorder::PersistenceError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::collections::BTreeMap;
use thiserror::Error;

/// Shown when a purchase could not be recorded; details stay in the logs.
pub const RETRY_MESSAGE: &str = "Failed to process purchase. Please try again.";

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Internal server error: {0}")]
    Internal(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Bad request: {0}")]
    BadRequest(String),
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Insufficient funds: required {required}, available {available}")]
    InsufficientFunds { required: Money, available: Money },
    #[error("Validation failed: {message}")]
    Validation {
        message: String,
        fields: BTreeMap<&'static str, &'static str>,
    },
    #[error("Service unavailable: {0}")]
    Unavailable(String),
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<CatalogError> for AppError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::Unavailable(_) => AppError::Unavailable(err.to_string()),
            CatalogError::Other(_) => AppError::Internal(err.to_string()),
        }
    }
}

impl From<LedgerError> for AppError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::InsufficientFunds {
                required,
                available,
            } => AppError::InsufficientFunds {
                required,
                available,
            },
            LedgerError::UnknownAccount(_) => AppError::NotFound(err.to_string()),
            LedgerError::NegativeAmount(_) => AppError::BadRequest(err.to_string()),
            LedgerError::Storage(_) => AppError::Unavailable(err.to_string()),
        }
    }
}

impl From<PersistenceError> for AppError {
    fn from(err: PersistenceError) -> Self {
        AppError::Unavailable(err.to_string())
    }
}

impl From<CartError> for AppError {
    fn from(err: CartError) -> Self {
        match err {
            CartError::NotInCart(_) => AppError::NotFound(err.to_string()),
            CartError::ZeroQuantity | CartError::QuantityOverflow(_) => {
                AppError::BadRequest(err.to_string())
            }
        }
    }
}

impl From<SettlementError> for AppError {
    fn from(err: SettlementError) -> Self {
        match err {
            SettlementError::InvalidShipping(errors) => AppError::Validation {
                message: errors.to_string(),
                fields: errors.fields,
            },
            SettlementError::ShippingNotCollected | SettlementError::EmptyCart => {
                AppError::Conflict(err.to_string())
            }
            SettlementError::InsufficientFunds {
                required,
                available,
            } => AppError::InsufficientFunds {
                required,
                available,
            },
            SettlementError::Ledger(e) => AppError::Unavailable(e.to_string()),
            SettlementError::Persistence { .. } => AppError::Unavailable(RETRY_MESSAGE.to_string()),
            SettlementError::InvalidCart(_) | SettlementError::Internal(_) => {
                AppError::Internal(err.to_string())
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::Config(msg) | AppError::Internal(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, json!({ "error": msg }))
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, json!({ "error": msg })),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, json!({ "error": msg })),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, json!({ "error": msg })),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, json!({ "error": msg })),
            AppError::InsufficientFunds {
                required,
                available,
            } => (
                StatusCode::PAYMENT_REQUIRED,
                json!({
                    "error": "Insufficient balance to complete this purchase.",
                    "required": required,
                    "available": available,
                }),
            ),
            AppError::Validation { message, fields } => (
                StatusCode::BAD_REQUEST,
                json!({ "error": message, "fields": fields }),
            ),
            AppError::Unavailable(msg) => {
                (StatusCode::SERVICE_UNAVAILABLE, json!({ "error": msg }))
            }
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ShippingErrors;

    #[test]
    fn test_persistence_error_hides_details() {
        let err: AppError = SettlementError::Persistence {
            message: "disk I/O error".to_string(),
            rolled_back: true,
        }
        .into();
        match err {
            AppError::Unavailable(msg) => assert_eq!(msg, RETRY_MESSAGE),
            other => panic!("unexpected mapping: {:?}", other),
        }
    }

    #[test]
    fn test_status_codes() {
        let cases: Vec<(AppError, StatusCode)> = vec![
            (SettlementError::EmptyCart.into(), StatusCode::CONFLICT),
            (
                SettlementError::InsufficientFunds {
                    required: Money::from_units(2),
                    available: Money::from_units(1),
                }
                .into(),
                StatusCode::PAYMENT_REQUIRED,
            ),
            (
                SettlementError::InvalidShipping(ShippingErrors::default()).into(),
                StatusCode::BAD_REQUEST,
            ),
            (
                SettlementError::Internal("join".to_string()).into(),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                CatalogError::Unavailable("down".to_string()).into(),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                AppError::Unauthorized("missing".to_string()),
                StatusCode::UNAUTHORIZED,
            ),
        ];

        for (err, status) in cases {
            assert_eq!(err.into_response().status(), status);
        }
    }
}
