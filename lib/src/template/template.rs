use std::sync::Arc;

use derive_more::Debug;

use crate::error::Result;
use crate::template::Context;
use crate::value::Value;

/// How a substituted value is converted to text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conversion {
    /// `{key}` or `{key!s}`: the value's display form.
    Str,
    /// `{key!r}`: strings are quoted, everything else displays as usual.
    Repr,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Piece {
    Text(Box<str>),
    Key(Box<str>, Conversion),
}

/// A parsed format string such as `<title>{value}</title>`.
///
/// `{key}` substitutes the value of `key`, `{key!r}` substitutes its quoted
/// form, and `{{`/`}}` are literal braces. Positional fields (`{}`), nested
/// fields and format specs (`{key:>10}`) are rejected when parsing.
///
/// ```rust
/// use tagline::template::Template;
/// use tagline::value::Value;
///
/// let template = Template::parse("<title>{value}</title>").unwrap();
/// let value = Value::from("Hello");
/// let html = template.render(&[("value", &value)][..]).unwrap();
/// assert_eq!(html, "<title>Hello</title>");
/// ```
#[derive(Clone, PartialEq, Eq, Debug)]
#[debug("{source:?}")]
pub struct Template {
    source: Arc<str>,
    pieces: Arc<[Piece]>,
}

impl Template {
    pub fn parse<S: Into<Arc<str>>>(source: S) -> Result<Self> {
        let source: Arc<str> = source.into();
        let bytes = source.as_bytes();

        let mut pieces = vec![];
        let mut text = String::new();
        let mut i = 0;
        while let Some(j) = memchr::memchr2(b'{', b'}', &bytes[i..]).map(|j| i + j) {
            text.push_str(&source[i..j]);
            match (bytes[j], bytes.get(j + 1)) {
                (b'{', Some(b'{')) => {
                    text.push('{');
                    i = j + 2;
                }
                (b'}', Some(b'}')) => {
                    text.push('}');
                    i = j + 2;
                }
                (b'}', _) => return err! {
                    kind: Template,
                    "single '}' encountered in template",
                    "template" => &*source,
                    "position" => j,
                },
                _ => {
                    let Some(k) = memchr::memchr2(b'{', b'}', &bytes[j + 1..]).map(|k| j + 1 + k) else {
                        return err! {
                            kind: Template,
                            "single '{' encountered in template",
                            "template" => &*source,
                            "position" => j,
                        };
                    };

                    if bytes[k] == b'{' {
                        return err! {
                            kind: Template,
                            "nested replacement fields are not supported",
                            "template" => &*source,
                            "position" => k,
                        };
                    }

                    if !text.is_empty() {
                        pieces.push(Piece::Text(std::mem::take(&mut text).into()));
                    }

                    let (key, conversion) = parse_field(&source, &source[j + 1..k])?;
                    pieces.push(Piece::Key(key.into(), conversion));
                    i = k + 1;
                }
            }
        }

        text.push_str(&source[i..]);
        if !text.is_empty() {
            pieces.push(Piece::Text(text.into()));
        }

        Ok(Template { source, pieces: pieces.into() })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// The keys this template substitutes, in order of appearance. A key used
    /// more than once appears more than once.
    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.pieces.iter().filter_map(|piece| match piece {
            Piece::Key(key, _) => Some(&**key),
            Piece::Text(_) => None,
        })
    }

    pub fn references(&self, key: &str) -> bool {
        self.keys().any(|k| k == key)
    }

    /// Renders the template, looking up every key in `context`.
    pub fn render<C: Context + ?Sized>(&self, context: &C) -> Result<String> {
        let mut output = String::with_capacity(self.source.len());
        for piece in self.pieces.iter() {
            match piece {
                Piece::Text(text) => output.push_str(text),
                Piece::Key(key, conversion) => {
                    let value = context.get(key).ok_or_else(|| error! {
                        kind: Template,
                        format!("missing template key `{key}`"),
                        "template" => &*self.source,
                        "hint" => format!("set `{key}` in the keys used to render the template"),
                    })?;

                    conversion.write(value, &mut output);
                }
            }
        }

        Ok(output)
    }
}

impl Conversion {
    fn write(self, value: &Value, output: &mut String) {
        match (self, value) {
            (Conversion::Repr, Value::String(s)) => output.push_str(&crate::util::quote(s)),
            (Conversion::Repr, Value::Null) => output.push_str("null"),
            _ => output.push_str(&value.to_string()),
        }
    }
}

fn parse_field<'a>(template: &str, field: &'a str) -> Result<(&'a str, Conversion)> {
    if let Some(i) = field.find(':') {
        return err! {
            kind: Template,
            format!("format spec `{}` is not supported", &field[i..]),
            "template" => template,
        };
    }

    let (key, conversion) = match field.split_once('!') {
        Some((key, "s")) => (key, Conversion::Str),
        Some((key, "r")) => (key, Conversion::Repr),
        Some((_, other)) => return err! {
            kind: Template,
            format!("unknown conversion `!{other}`"),
            "template" => template,
            "expected" => "`!s` or `!r`",
        },
        None => (field, Conversion::Str),
    };

    if key.is_empty() {
        return err! {
            kind: Template,
            "positional replacement fields are not supported",
            "template" => template,
            "hint" => "name the field, as in `{value}`",
        };
    }

    Ok((key, conversion))
}

impl AsRef<str> for Template {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}
