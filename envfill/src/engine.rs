use tracing::{debug, trace, warn};

use crate::{
    Decoder, ParseResult,
    error::{Collector, ParseError},
};

/// One declared field of a record, as seen by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDescriptor {
    name: &'static str,
    key: &'static str,
    eligible: bool,
}

impl FieldDescriptor {
    #[doc(hidden)]
    pub const fn new(name: &'static str, key: &'static str, eligible: bool) -> Self {
        Self {
            name,
            key,
            eligible,
        }
    }

    /// The declared field name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The key looked up for this field.
    pub fn key(&self) -> &'static str {
        self.key
    }

    /// Whether the field takes part in population at all.
    pub fn is_eligible(&self) -> bool {
        self.eligible
    }
}

/// A record whose fields can be populated from a key/value source.
///
/// Normally derived with `#[derive(FromEnv)]`, which is only accepted on
/// structs with named fields.
pub trait FromEnv {
    /// All declared fields, in declaration order.
    const FIELDS: &'static [FieldDescriptor];

    /// Decodes `raw` into the field at `index` of [`FIELDS`](Self::FIELDS).
    ///
    /// On error the field keeps its previous value.
    fn decode_field(&mut self, index: usize, raw: &str) -> ParseResult<()>;

    /// The rule used for the field at `index`, `None` for ineligible fields.
    fn decoder(index: usize) -> Option<Decoder>;
}

/// Populates `target` from the process environment.
///
/// See [`populate_with`].
pub fn populate<T: FromEnv>(target: &mut T) -> Result<(), ParseError> {
    populate_with(target, process_env)
}

/// Populates `target` using `lookup` as the key/value source.
///
/// Every eligible field whose key `lookup` returns is decoded; fields whose
/// key is absent keep their current value. Failures do not stop the scan,
/// they are all returned together once every field has been visited.
///
/// ```
/// use envfill::FromEnv;
///
/// #[derive(FromEnv, Default)]
/// pub struct Config {
///     #[env = "PORT"]
///     pub port: u16,
///     pub hosts: Vec<String>,
/// }
///
/// let mut config = Config::default();
/// envfill::populate_with(&mut config, |key| match key {
///     "PORT" => Some("8080".to_owned()),
///     "hosts" => Some("a, b".to_owned()),
///     _ => None,
/// })
/// .unwrap();
///
/// assert_eq!(8080, config.port);
/// assert_eq!(vec!["a", "b"], config.hosts);
/// ```
pub fn populate_with<T, F>(target: &mut T, mut lookup: F) -> Result<(), ParseError>
where
    T: FromEnv,
    F: FnMut(&str) -> Option<String>,
{
    let mut collector = Collector::new();

    for (index, field) in T::FIELDS.iter().enumerate() {
        if !field.eligible {
            trace!(field = field.name, "skipping ineligible field");
            continue;
        }

        let Some(raw) = lookup(field.key) else {
            trace!(field = field.name, key = field.key, "key absent");
            continue;
        };

        match target.decode_field(index, &raw) {
            Ok(()) => {
                trace!(
                    field = field.name,
                    key = field.key,
                    decoder = T::decoder(index).map(|d| d.as_str()),
                    "decoded field"
                );
            }
            Err(cause) => {
                debug!(
                    field = field.name,
                    key = field.key,
                    error = %cause,
                    "failed to decode field"
                );
                collector.record(field.key, raw, cause);
            }
        }
    }

    collector.finish()
}

/// Builds `T::default()` and populates it from the process environment.
pub fn from_env<T>() -> Result<T, ParseError>
where
    T: FromEnv + Default,
{
    let mut target = T::default();
    populate(&mut target)?;
    Ok(target)
}

/// The keys `T` consumes, in declaration order. Ineligible fields are left
/// out.
pub fn keys<T: FromEnv>() -> Vec<&'static str> {
    T::FIELDS
        .iter()
        .filter(|field| field.eligible)
        .map(|field| field.key)
        .collect()
}

/// The default lookup: a process environment variable.
///
/// Values that are not valid unicode are converted lossily.
pub fn process_env(key: &str) -> Option<String> {
    let value = std::env::var_os(key)?;

    match value.into_string() {
        Ok(value) => Some(value),
        Err(value) => {
            warn!(key, "environment variable is not valid unicode, converting lossily");
            Some(value.to_string_lossy().into_owned())
        }
    }
}
