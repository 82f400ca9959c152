//! PostgreSQL implementations of the store traits.
//!
//! Queries are runtime-checked (`sqlx::query_as::<_, T>`) so the workspace
//! builds without a live database.

pub mod organization;
pub mod session;
pub mod user;

pub use organization::PgOrganizationStore;
pub use session::PgSessionStore;
pub use user::PgUserStore;

use ddup_core::error::{AppError, ErrorKind};

/// Wrap a sqlx error as a `Database` error with the given context.
pub(crate) fn db_error(context: &'static str) -> impl FnOnce(sqlx::Error) -> AppError {
    move |e| AppError::with_source(ErrorKind::Database, context, e)
}

/// Whether the error is a unique-constraint violation.
pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}

/// Whether the error is a foreign-key violation.
pub(crate) fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_foreign_key_violation())
}
