use std::{
    borrow::Cow,
    collections::VecDeque,
    rc::Rc,
    sync::Arc,
    time::Duration,
};

use chrono::{DateTime, FixedOffset, Local, TimeDelta, Utc};
use chrono_tz::Tz;
use serde::de::DeserializeOwned;

use crate::{
    ParseResult,
    duration::{self, DurationError},
};

/// A type that builds a whole new value of itself from a raw string.
///
/// This is the highest priority rule: a field whose type implements
/// `FromEnvStr` is always decoded through it, even when the raw value would
/// also be valid JSON for the type.
///
/// ```
/// use envfill::{FromEnvStr, ParseResult};
///
/// pub struct Level(u8);
///
/// impl FromEnvStr for Level {
///     fn from_env_str(raw: &str) -> ParseResult<Self> {
///         match raw {
///             "low" => Ok(Level(0)),
///             "high" => Ok(Level(9)),
///             _ => Err(format!("unknown level {raw:?}").into()),
///         }
///     }
/// }
/// ```
pub trait FromEnvStr: Sized {
    fn from_env_str(raw: &str) -> ParseResult<Self>;
}

/// A type that updates itself in place from a raw string.
///
/// Checked right after [`FromEnvStr`]. The current value of the field is
/// available to the implementation, which allows decoding relative to a
/// preset value. On error the implementation must leave `self` unchanged.
pub trait DecodeEnv {
    fn decode_env(&mut self, raw: &str) -> ParseResult<()>;
}

/// Text types that take the raw string verbatim, without any parsing.
///
/// Implement it for a newtype over `String` to get the same treatment.
pub trait Text: From<String> {}

impl Text for String {}
impl Text for Box<str> {}
impl Text for Arc<str> {}
impl Text for Rc<str> {}
impl Text for Cow<'static, str> {}

/// Points in time, elapsed durations and time zones, which have their own
/// grammars.
///
/// Instants use RFC 3339 with optional fractional seconds, e.g.
/// `2021-09-14T12:13:14.123123+09:00`. Durations use the grammar described
/// in [`parse_nanos`](crate::parse_nanos), e.g. `1m30s`. Time zones are IANA
/// names such as `Asia/Jakarta`.
pub trait Temporal: Sized {
    fn parse_temporal(raw: &str) -> ParseResult<Self>;
}

/// `YYYY-MM-DDTHH:MM:SS[.fraction](Z|+HH:MM|-HH:MM)` with an uppercase `T`
/// and `Z`. chrono alone also takes a space separator and lowercase letters.
fn parse_rfc3339(raw: &str) -> ParseResult<DateTime<FixedOffset>> {
    let bytes = raw.as_bytes();
    let offset_ok = match bytes {
        [.., b'Z'] => true,
        [.., b'+' | b'-', h1, h2, b':', m1, m2] => {
            [h1, h2, m1, m2].iter().all(|b| b.is_ascii_digit())
        }
        _ => false,
    };

    let shape_ok = bytes.len() >= 20
        && bytes[10] == b'T'
        && offset_ok
        && bytes.iter().all(|b| b.is_ascii_graphic());

    if !shape_ok {
        return Err(format!("invalid RFC 3339 instant {raw:?}").into());
    }

    Ok(DateTime::parse_from_rfc3339(raw)?)
}

impl Temporal for DateTime<FixedOffset> {
    fn parse_temporal(raw: &str) -> ParseResult<Self> {
        parse_rfc3339(raw)
    }
}

impl Temporal for DateTime<Utc> {
    fn parse_temporal(raw: &str) -> ParseResult<Self> {
        Ok(parse_rfc3339(raw)?.with_timezone(&Utc))
    }
}

impl Temporal for DateTime<Local> {
    fn parse_temporal(raw: &str) -> ParseResult<Self> {
        Ok(parse_rfc3339(raw)?.with_timezone(&Local))
    }
}

impl Temporal for Tz {
    fn parse_temporal(raw: &str) -> ParseResult<Self> {
        raw.parse::<Tz>()
            .map_err(|_| format!("unknown time zone {raw:?}").into())
    }
}

impl Temporal for Duration {
    fn parse_temporal(raw: &str) -> ParseResult<Self> {
        let nanos = duration::parse_nanos(raw)?;
        let nanos = u64::try_from(nanos).map_err(|_| DurationError::Negative {
            input: raw.to_owned(),
        })?;
        Ok(Duration::from_nanos(nanos))
    }
}

impl Temporal for TimeDelta {
    fn parse_temporal(raw: &str) -> ParseResult<Self> {
        Ok(TimeDelta::nanoseconds(duration::parse_nanos(raw)?))
    }
}

/// Ordered collections that get the comma-separated fallback when the raw
/// value is not a JSON literal.
pub trait Sequence: Sized {
    type Item;

    fn from_items(items: Vec<Self::Item>) -> ParseResult<Self>;
}

impl<T> Sequence for Vec<T> {
    type Item = T;

    fn from_items(items: Vec<T>) -> ParseResult<Self> {
        Ok(items)
    }
}

impl<T> Sequence for VecDeque<T> {
    type Item = T;

    fn from_items(items: Vec<T>) -> ParseResult<Self> {
        Ok(items.into())
    }
}

impl<T> Sequence for Box<[T]> {
    type Item = T;

    fn from_items(items: Vec<T>) -> ParseResult<Self> {
        Ok(items.into_boxed_slice())
    }
}

impl<T, const N: usize> Sequence for [T; N] {
    type Item = T;

    fn from_items(items: Vec<T>) -> ParseResult<Self> {
        let found = items.len();
        items
            .try_into()
            .map_err(|_| format!("expected {N} comma-separated elements, found {found}").into())
    }
}

/// The rule a field's type resolved to, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Decoder {
    /// [`FromEnvStr`].
    Custom,
    /// [`DecodeEnv`].
    CustomInPlace,
    /// [`Text`], assigned verbatim.
    Text,
    /// [`Temporal`].
    Temporal,
    /// JSON, falling back to splitting on commas.
    TextSequence,
    /// JSON, falling back to wrapping the value in `[` `]`.
    Sequence,
    /// JSON only.
    Structured,
}

impl Decoder {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Custom => "custom",
            Self::CustomInPlace => "custom_in_place",
            Self::Text => "text",
            Self::Temporal => "temporal",
            Self::TextSequence => "text_sequence",
            Self::Sequence => "sequence",
            Self::Structured => "structured",
        }
    }
}

pub(crate) fn structured<T>(raw: &str) -> ParseResult<T>
where
    T: DeserializeOwned,
{
    Ok(serde_json::from_str(raw)?)
}

pub(crate) fn text_sequence<T>(raw: &str) -> ParseResult<T>
where
    T: Sequence + DeserializeOwned,
    T::Item: Text,
{
    match serde_json::from_str(raw) {
        Ok(value) => Ok(value),
        Err(_) => {
            let items = raw
                .split(',')
                .map(|piece| T::Item::from(piece.trim().to_owned()))
                .collect();
            T::from_items(items)
        }
    }
}

pub(crate) fn sequence<T>(raw: &str) -> ParseResult<T>
where
    T: Sequence + DeserializeOwned,
{
    match serde_json::from_str(raw) {
        Ok(value) => Ok(value),
        // The bracketed retry's own error is dropped: the reported cause
        // always refers to the value as the user wrote it.
        Err(first) => serde_json::from_str(&format!("[{raw}]")).map_err(|_| first.into()),
    }
}
