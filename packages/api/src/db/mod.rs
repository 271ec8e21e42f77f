//! # Database: PostgreSQL connection pool
//!
//! Server-only. The pool is a lazy, process-wide singleton behind a
//! [`tokio::sync::OnceCell`]: the first call to [`get_pool`] reads the database section
//! of [`Settings`](crate::config::Settings), connects, and caches the pool for every
//! later caller.

#[cfg(feature = "server")]
mod pool;

#[cfg(feature = "server")]
pub use pool::get_pool;
