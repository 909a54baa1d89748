//! Conversions from external infrastructure errors into domain errors.

use bakasync_domain::BakasyncError;
use reqwest::Error as HttpError;
use rusqlite::Error as SqlError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub BakasyncError);

impl From<InfraError> for BakasyncError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<BakasyncError> for InfraError {
    fn from(value: BakasyncError) -> Self {
        InfraError(value)
    }
}

/// Extension trait to make the conversion logic explicit in tests and within
/// this module.
trait IntoBakasyncError {
    fn into_bakasync(self) -> BakasyncError;
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → BakasyncError */
/* -------------------------------------------------------------------------- */

impl IntoBakasyncError for HttpError {
    fn into_bakasync(self) -> BakasyncError {
        if self.is_timeout() {
            return BakasyncError::Network(format!("request timed out: {self}"));
        }
        if self.is_connect() {
            return BakasyncError::Network(format!("connection failed: {self}"));
        }
        if self.is_decode() {
            return BakasyncError::FetchFailure(format!("failed to decode response body: {self}"));
        }
        if self.is_builder() {
            return BakasyncError::Config(format!("invalid request: {self}"));
        }
        BakasyncError::Network(self.to_string())
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        InfraError(value.into_bakasync())
    }
}

/* -------------------------------------------------------------------------- */
/* rusqlite::Error → BakasyncError */
/* -------------------------------------------------------------------------- */

impl IntoBakasyncError for SqlError {
    fn into_bakasync(self) -> BakasyncError {
        use rusqlite::Error as RE;

        match self {
            RE::QueryReturnedNoRows => {
                BakasyncError::NotFound("no rows returned by query".into())
            }
            RE::SqliteFailure(err, maybe_message) => BakasyncError::Storage(format!(
                "sqlite failure {:?} (code {}): {}",
                err.code,
                err.extended_code,
                maybe_message.unwrap_or_default()
            )),
            RE::FromSqlConversionFailure(_, _, cause) => {
                BakasyncError::Storage(format!("failed to convert sqlite value: {cause}"))
            }
            RE::InvalidColumnType(_, _, ty) => {
                BakasyncError::Storage(format!("invalid column type: {ty}"))
            }
            RE::InvalidPath(path) => BakasyncError::Storage(format!(
                "invalid database path: {}",
                path.to_string_lossy()
            )),
            RE::InvalidQuery => BakasyncError::Storage("invalid SQL query".into()),
            other => BakasyncError::Storage(other.to_string()),
        }
    }
}

impl From<SqlError> for InfraError {
    fn from(value: SqlError) -> Self {
        InfraError(value.into_bakasync())
    }
}
