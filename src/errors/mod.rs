//! Centralized error handling for the Tahap progress service
//!
//! This module unifies error types across the application layers so that
//! domain rejections and infrastructure failures stay distinguishable all the
//! way to the HTTP boundary.
//!
//! # Error Categories
//!
//! - **Tahap Errors**: Progress engine failures (invalid stage/subtask, storage timeouts)
//! - **Repository Errors**: Data access layer failures
//! - **Application Errors**: Configuration, validation and internal failures
//!
//! # Usage
//!
//! ```rust
//! use kegiatan_tahap::errors::{AppError, AppResult};
//!
//! async fn example_function() -> AppResult<String> {
//!     // Function can return any error type that converts to AppError
//!     Ok("success".to_string())
//! }
//! ```

pub mod types;

pub use types::*;

/// Convenience type alias for Results using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Convenience type alias for Repository Results
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Convenience type alias for progress engine Results
pub type TahapResult<T> = Result<T, TahapError>;
