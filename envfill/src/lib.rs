//! Populate the fields of a struct from environment variables.
//!
//! ```
//! use std::time::Duration;
//!
//! use envfill::FromEnv;
//!
//! #[derive(FromEnv)]
//! pub struct Config {
//!     #[env = "DATABASE_URL"]
//!     pub database_url: String,
//!     #[env = "POOL_TIMEOUT"]
//!     pub pool_timeout: Duration,
//!     #[env = "REPLICAS"]
//!     pub replicas: Vec<u16>,
//! }
//!
//! let mut config = Config {
//!     database_url: "postgres://localhost/app".into(),
//!     pool_timeout: Duration::from_secs(5),
//!     replicas: Vec::new(),
//! };
//!
//! envfill::populate_with(&mut config, |key| match key {
//!     "POOL_TIMEOUT" => Some("1m30s".into()),
//!     "REPLICAS" => Some("5432, 5433".into()),
//!     _ => None,
//! })
//! .unwrap();
//!
//! assert_eq!("postgres://localhost/app", config.database_url);
//! assert_eq!(Duration::from_secs(90), config.pool_timeout);
//! assert_eq!(vec![5432, 5433], config.replicas);
//! ```
//!
//! # Keys
//!
//! A field is looked up under its declared name, or under the first
//! comma-separated segment of its `#[env = "..."]` tag. `#[env(key = "...")]`
//! is an equivalent spelling. Only `pub` fields are populated; other fields,
//! and fields marked `#[env(skip)]`, are never looked up.
//!
//! # Decoding
//!
//! The first rule that applies to a field's type is used:
//!
//! 1. [`FromEnvStr`]
//! 2. [`DecodeEnv`]
//! 3. [`Text`] types such as `String` take the value verbatim
//! 4. [`Temporal`] types: RFC 3339 instants and durations like `1m30s`
//! 5. JSON through `serde`. When that fails for a [`Sequence`], a list of
//!    text is split on commas and any other list is retried wrapped in `[]`.
//!
//! # Errors
//!
//! A key that is absent leaves its field untouched. Failures do not stop the
//! scan: every field is visited and all failures come back as one
//! [`ParseError`].
mod decode;
mod duration;
mod engine;
mod error;
mod types;

#[doc(hidden)]
#[path = "private.rs"]
pub mod __private;

pub use decode::{DecodeEnv, Decoder, FromEnvStr, Sequence, Temporal, Text};
pub use duration::{DurationError, parse_nanos};
pub use engine::{
    FieldDescriptor, FromEnv, from_env, keys, populate, populate_with, process_env,
};
pub use envfill_derive::FromEnv;
pub use error::{ParseError, ParseErrorItem};
pub use types::{Base64, Base64Json, FileContents, FileText, ReadError};

/// The cause carried by a failed decode.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Return type of the decoding capabilities.
pub type ParseResult<T> = Result<T, BoxError>;
