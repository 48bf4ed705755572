//! Lenient environment-variable parsing
//!
//! Every setting has a default. An unset or empty variable yields the
//! default silently; a malformed one logs a warning and also yields the
//! default. Nothing here is ever fatal.
//!
//! Parsing goes through a lookup closure rather than `std::env` directly so
//! that configuration can be built from any key/value source.

use std::fmt::Display;
use std::str::FromStr;
use tracing::warn;

/// Looks up a raw value, treating empty strings as unset
fn raw<F>(lookup: &F, name: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name).filter(|value| !value.trim().is_empty())
}

/// Returns the variable as a string, or `default` when unset
pub fn string_or<F>(lookup: &F, name: &str, default: &str) -> String
where
    F: Fn(&str) -> Option<String>,
{
    raw(lookup, name).unwrap_or_else(|| default.to_string())
}

/// Returns the variable as a string if it is set
pub fn optional_string<F>(lookup: &F, name: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    raw(lookup, name)
}

/// Parses the variable, falling back to `default` when unset or malformed
pub fn parse_or<T, F>(lookup: &F, name: &str, default: T) -> T
where
    T: FromStr + Display,
    T::Err: Display,
    F: Fn(&str) -> Option<String>,
{
    let Some(value) = raw(lookup, name) else {
        return default;
    };

    match value.trim().parse::<T>() {
        Ok(parsed) => parsed,
        Err(e) => {
            warn!(
                variable = name,
                value = %value,
                default = %default,
                error = %e,
                "Invalid environment variable, using default"
            );
            default
        }
    }
}

/// Parses the variable if it is set; a malformed value is reported and ignored
pub fn parse_optional<T, F>(lookup: &F, name: &str) -> Option<T>
where
    T: FromStr,
    T::Err: Display,
    F: Fn(&str) -> Option<String>,
{
    let value = raw(lookup, name)?;

    match value.trim().parse::<T>() {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            warn!(
                variable = name,
                value = %value,
                error = %e,
                "Invalid environment variable, ignoring"
            );
            None
        }
    }
}
