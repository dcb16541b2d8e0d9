//! Value types with their own decoding, ready to be used as field types.

use std::{
    error::Error as StdError,
    fmt, fs, io,
    ops::Deref,
    path::{Path, PathBuf},
};

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use serde::de::DeserializeOwned;

use crate::{FromEnvStr, ParseResult};

/// Text given as unpadded URL-safe base64.
///
/// `API_TOKEN=YXNkZg` decodes to `"asdf"`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Base64(pub String);

impl Base64 {
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl FromEnvStr for Base64 {
    fn from_env_str(raw: &str) -> ParseResult<Self> {
        let bytes = URL_SAFE_NO_PAD.decode(raw)?;
        Ok(Self(String::from_utf8(bytes)?))
    }
}

impl Deref for Base64 {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

/// The bytes of the file whose path is the raw value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct FileContents(pub Vec<u8>);

impl FileContents {
    pub fn into_inner(self) -> Vec<u8> {
        self.0
    }
}

impl FromEnvStr for FileContents {
    fn from_env_str(raw: &str) -> ParseResult<Self> {
        let bytes = fs::read(raw).map_err(|source| ReadError::new(raw, source))?;
        Ok(Self(bytes))
    }
}

impl Deref for FileContents {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.0
    }
}

/// The UTF-8 text of the file whose path is the raw value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct FileText(pub String);

impl FileText {
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl FromEnvStr for FileText {
    fn from_env_str(raw: &str) -> ParseResult<Self> {
        let text = fs::read_to_string(raw).map_err(|source| ReadError::new(raw, source))?;
        Ok(Self(text))
    }
}

impl Deref for FileText {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

/// A JSON document given as unpadded URL-safe base64.
///
/// ```
/// use envfill::{Base64Json, FromEnvStr};
///
/// #[derive(serde::Deserialize)]
/// struct Greeting {
///     hello: String,
/// }
///
/// let greeting = Base64Json::<Greeting>::from_env_str("eyJoZWxsbyI6IndvcmxkIn0K").unwrap();
/// assert_eq!("world", greeting.hello);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Base64Json<T>(pub T);

impl<T> Base64Json<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T: DeserializeOwned> FromEnvStr for Base64Json<T> {
    fn from_env_str(raw: &str) -> ParseResult<Self> {
        let bytes = URL_SAFE_NO_PAD.decode(raw)?;
        Ok(Self(serde_json::from_slice(&bytes)?))
    }
}

impl<T> Deref for Base64Json<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0
    }
}

/// A file-backed value could not be read.
#[derive(Debug)]
pub struct ReadError {
    path: PathBuf,
    source: io::Error,
}

impl ReadError {
    fn new(path: &str, source: io::Error) -> Self {
        Self {
            path: PathBuf::from(path),
            source,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl fmt::Display for ReadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cannot read {}: {}", self.path.display(), self.source)
    }
}

impl StdError for ReadError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        Some(&self.source)
    }
}
