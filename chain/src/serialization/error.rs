use std::io;

use thiserror::Error;

/// A serialization error.
///
/// The codec never panics on malformed input: every primitive decoder
/// returns a `Result`, and the first failure short-circuits the rest of a
/// structural decode via `?`. This is the idiomatic-Rust realization of a
/// sticky failure flag -- the whole parse terminates instead of throwing
/// partway through, but no `Err` is ever produced by unwinding.
#[derive(Error, Debug)]
pub enum SerializationError {
    /// an io error prevented deserialization: {0}
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    /// the data to be deserialized was malformed
    #[error("parse error: {0}")]
    Parse(&'static str),
}
