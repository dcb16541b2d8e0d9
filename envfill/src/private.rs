//! Support code that `#[derive(FromEnv)]` expands to. Nothing here is a
//! stable API, and it can change in any release.
//!
//! The derive picks a decoding rule for every field with autoref-based
//! dispatch. For a field of type `T` it emits
//!
//! ```text
//! (&&&&&&&Probe::<T>::new()).decode_into(&mut self.field, raw)
//! ```
//!
//! Method resolution tries the receiver with the most references first and
//! strips one reference per step, so the impl on `&&&&&&Probe<T>` is checked
//! before the one on `&&&&&Probe<T>`, and so on down to `Probe<T>`. Each impl
//! only applies when its bounds hold for `T`, which gives an ordered chain of
//! rules resolved entirely at compile time.
use std::marker::PhantomData;

use serde::de::DeserializeOwned;

use crate::{
    BoxError, ParseResult,
    decode::{self, Decoder, DecodeEnv, FromEnvStr, Sequence, Temporal, Text},
};

pub use crate::{FieldDescriptor, FromEnv};

pub struct Probe<T>(PhantomData<fn() -> T>);

impl<T> Probe<T> {
    #[allow(clippy::new_without_default)]
    pub const fn new() -> Self {
        Probe(PhantomData)
    }
}

pub fn unknown_field(index: usize) -> BoxError {
    format!("no decodable field at index {index}").into()
}

/// The dispatch traits. Glob-imported by the derive output so that every rule
/// is in scope for method resolution.
pub mod dispatch {
    use super::*;

    pub trait ViaFromEnvStr {
        type Value;

        fn decoder(&self) -> Decoder;

        fn decode_into(&self, slot: &mut Self::Value, raw: &str) -> ParseResult<()>;
    }

    impl<T: FromEnvStr> ViaFromEnvStr for &&&&&&Probe<T> {
        type Value = T;

        fn decoder(&self) -> Decoder {
            Decoder::Custom
        }

        fn decode_into(&self, slot: &mut T, raw: &str) -> ParseResult<()> {
            *slot = T::from_env_str(raw)?;
            Ok(())
        }
    }

    pub trait ViaDecodeEnv {
        type Value;

        fn decoder(&self) -> Decoder;

        fn decode_into(&self, slot: &mut Self::Value, raw: &str) -> ParseResult<()>;
    }

    impl<T: DecodeEnv> ViaDecodeEnv for &&&&&Probe<T> {
        type Value = T;

        fn decoder(&self) -> Decoder {
            Decoder::CustomInPlace
        }

        fn decode_into(&self, slot: &mut T, raw: &str) -> ParseResult<()> {
            slot.decode_env(raw)
        }
    }

    pub trait ViaText {
        type Value;

        fn decoder(&self) -> Decoder;

        fn decode_into(&self, slot: &mut Self::Value, raw: &str) -> ParseResult<()>;
    }

    impl<T: Text> ViaText for &&&&Probe<T> {
        type Value = T;

        fn decoder(&self) -> Decoder {
            Decoder::Text
        }

        fn decode_into(&self, slot: &mut T, raw: &str) -> ParseResult<()> {
            *slot = T::from(raw.to_owned());
            Ok(())
        }
    }

    pub trait ViaTemporal {
        type Value;

        fn decoder(&self) -> Decoder;

        fn decode_into(&self, slot: &mut Self::Value, raw: &str) -> ParseResult<()>;
    }

    impl<T: Temporal> ViaTemporal for &&&Probe<T> {
        type Value = T;

        fn decoder(&self) -> Decoder {
            Decoder::Temporal
        }

        fn decode_into(&self, slot: &mut T, raw: &str) -> ParseResult<()> {
            *slot = T::parse_temporal(raw)?;
            Ok(())
        }
    }

    pub trait ViaTextSequence {
        type Value;

        fn decoder(&self) -> Decoder;

        fn decode_into(&self, slot: &mut Self::Value, raw: &str) -> ParseResult<()>;
    }

    impl<T> ViaTextSequence for &&Probe<T>
    where
        T: Sequence + DeserializeOwned,
        T::Item: Text,
    {
        type Value = T;

        fn decoder(&self) -> Decoder {
            Decoder::TextSequence
        }

        fn decode_into(&self, slot: &mut T, raw: &str) -> ParseResult<()> {
            *slot = decode::text_sequence(raw)?;
            Ok(())
        }
    }

    pub trait ViaSequence {
        type Value;

        fn decoder(&self) -> Decoder;

        fn decode_into(&self, slot: &mut Self::Value, raw: &str) -> ParseResult<()>;
    }

    impl<T> ViaSequence for &Probe<T>
    where
        T: Sequence + DeserializeOwned,
    {
        type Value = T;

        fn decoder(&self) -> Decoder {
            Decoder::Sequence
        }

        fn decode_into(&self, slot: &mut T, raw: &str) -> ParseResult<()> {
            *slot = decode::sequence(raw)?;
            Ok(())
        }
    }

    pub trait ViaStructured {
        type Value;

        fn decoder(&self) -> Decoder;

        fn decode_into(&self, slot: &mut Self::Value, raw: &str) -> ParseResult<()>;
    }

    impl<T: DeserializeOwned> ViaStructured for Probe<T> {
        type Value = T;

        fn decoder(&self) -> Decoder {
            Decoder::Structured
        }

        fn decode_into(&self, slot: &mut T, raw: &str) -> ParseResult<()> {
            *slot = decode::structured(raw)?;
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{collections::VecDeque, time::Duration};

    use chrono::{DateTime, Utc};

    use super::{Probe, dispatch::*};
    use crate::{Base64, Decoder, DecodeEnv, FromEnvStr, ParseResult};

    #[derive(Debug, Default, PartialEq, serde::Deserialize)]
    struct Both(u32);

    impl FromEnvStr for Both {
        fn from_env_str(raw: &str) -> ParseResult<Self> {
            Ok(Both(raw.len() as u32))
        }
    }

    impl DecodeEnv for Both {
        fn decode_env(&mut self, _raw: &str) -> ParseResult<()> {
            Err("in-place decode must not win".into())
        }
    }

    #[derive(Debug, Default, PartialEq)]
    struct Counter(u32);

    impl DecodeEnv for Counter {
        fn decode_env(&mut self, raw: &str) -> ParseResult<()> {
            self.0 += raw.parse::<u32>()?;
            Ok(())
        }
    }

    #[test]
    fn rules_resolve_in_priority_order() {
        assert_eq!(Decoder::Custom, (&&&&&&&Probe::<Both>::new()).decoder());
        assert_eq!(Decoder::Custom, (&&&&&&&Probe::<Base64>::new()).decoder());
        assert_eq!(
            Decoder::CustomInPlace,
            (&&&&&&&Probe::<Counter>::new()).decoder()
        );
        assert_eq!(Decoder::Text, (&&&&&&&Probe::<String>::new()).decoder());
        assert_eq!(
            Decoder::Temporal,
            (&&&&&&&Probe::<DateTime<Utc>>::new()).decoder()
        );
        assert_eq!(
            Decoder::Temporal,
            (&&&&&&&Probe::<Duration>::new()).decoder()
        );
        assert_eq!(
            Decoder::Temporal,
            (&&&&&&&Probe::<chrono_tz::Tz>::new()).decoder()
        );
        assert_eq!(
            Decoder::TextSequence,
            (&&&&&&&Probe::<Vec<String>>::new()).decoder()
        );
        assert_eq!(
            Decoder::TextSequence,
            (&&&&&&&Probe::<VecDeque<Box<str>>>::new()).decoder()
        );
        assert_eq!(
            Decoder::Sequence,
            (&&&&&&&Probe::<Vec<u16>>::new()).decoder()
        );
        assert_eq!(
            Decoder::Sequence,
            (&&&&&&&Probe::<[bool; 2]>::new()).decoder()
        );
        assert_eq!(Decoder::Structured, (&&&&&&&Probe::<i64>::new()).decoder());
        assert_eq!(
            Decoder::Structured,
            (&&&&&&&Probe::<Option<String>>::new()).decoder()
        );
    }

    #[test]
    fn custom_rule_wins_over_json_and_in_place() {
        let mut slot = Both(0);

        (&&&&&&&Probe::<Both>::new())
            .decode_into(&mut slot, "12345")
            .unwrap();

        assert_eq!(Both(5), slot);
    }

    #[test]
    fn in_place_rule_sees_the_preset_value() {
        let mut slot = Counter(40);

        (&&&&&&&Probe::<Counter>::new())
            .decode_into(&mut slot, "2")
            .unwrap();
        assert_eq!(Counter(42), slot);

        assert!(
            (&&&&&&&Probe::<Counter>::new())
                .decode_into(&mut slot, "two")
                .is_err()
        );
        assert_eq!(Counter(42), slot);
    }

    #[test]
    fn text_rule_assigns_verbatim() {
        let mut slot = String::from("preset");

        (&&&&&&&Probe::<String>::new())
            .decode_into(&mut slot, "\"not json\", really")
            .unwrap();

        assert_eq!("\"not json\", really", slot);
    }

    #[test]
    fn failed_structured_decode_leaves_the_slot() {
        let mut slot = 22_i32;

        assert!(
            (&&&&&&&Probe::<i32>::new())
                .decode_into(&mut slot, "aa")
                .is_err()
        );

        assert_eq!(22, slot);
    }
}
