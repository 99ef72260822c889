/// Builds a [`Dict`](crate::value::Dict), converting keys and values.
///
/// ```rust
/// use tagline::value::Value;
///
/// let dict = tagline::dict! { "title" => "Hello", "count" => 3 };
/// assert_eq!(dict["count"], Value::Int(3));
/// ```
#[doc(hidden)]
#[macro_export]
macro_rules! dict {
    ($($key:expr => $value:expr),* $(,)?) => ({
        #[allow(unused_mut)]
        let mut dict: $crate::value::Dict = $crate::value::Dict::new();
        $(dict.insert($key.into(), $value.into());)*
        dict
    });
}

pub use dict;
