use serde::de::DeserializeOwned;

use crate::error::{ErrorDetail, Result};

/// A data format that declarations and values can be read from.
pub trait Format: Sized {
    /// The data format's error type.
    type Error: serde::de::Error + ErrorDetail + 'static;

    /// Parses `string` as the data format `Self` as a `T` or returns an error
    /// if the `string` is an invalid `T`. **_Note:_** This method is _not_
    /// intended to be called directly. Instead, it is intended to be
    /// _implemented_ and then used indirectly via [`Format::parse()`].
    fn from_str<T: DeserializeOwned>(string: &str) -> Result<T, Self::Error>;

    /// Parses `string` as a `T`, converting failures into an [`Error`] of kind
    /// [`ErrorKind::Format`].
    ///
    /// [`Error`]: crate::error::Error
    /// [`ErrorKind::Format`]: crate::error::ErrorKind::Format
    #[track_caller]
    fn parse<T: DeserializeOwned>(string: &str) -> Result<T> {
        Ok(Self::from_str(string)?)
    }
}

macro_rules! impl_format {
    ($name:ident : $func:expr, $E:ty) => (
        pub struct $name;

        impl Format for $name {
            type Error = $E;

            fn from_str<T: DeserializeOwned>(s: &str) -> Result<T, $E> {
                $func(s)
            }
        }
    );
}

impl_format!(Toml: toml::from_str, toml::de::Error);
impl_format!(Json: serde_json::from_str, serde_json::error::Error);
