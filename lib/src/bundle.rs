use std::fmt;
use std::sync::Arc;

use crate::error::{Result, Chainable};
use crate::field::{Field, Warning};
use crate::model::Model;
use crate::value::Dict;

/// Anything that validates and serializes like a tag: a [`Field`], a
/// [`Model`], or a [`Bundle`] of them.
pub trait Tag: fmt::Debug + Send + Sync {
    /// Validates the tag, returning the warnings of lenient out-of-bounds
    /// values.
    fn validate(&self) -> Result<Vec<Warning>>;

    fn as_dict(&self) -> Result<Dict>;

    fn as_html(&self, pretty: bool) -> Result<String>;

    fn as_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.as_dict()?)?)
    }
}

impl Tag for Field {
    fn validate(&self) -> Result<Vec<Warning>> {
        Field::validate(self)
    }

    fn as_dict(&self) -> Result<Dict> {
        Field::as_dict(self)
    }

    #[inline(always)]
    fn as_html(&self, _: bool) -> Result<String> {
        Field::as_html(self)
    }
}

impl Tag for Model {
    fn validate(&self) -> Result<Vec<Warning>> {
        Model::validate(self)
    }

    fn as_dict(&self) -> Result<Dict> {
        Model::as_dict(self)
    }

    fn as_html(&self, pretty: bool) -> Result<String> {
        Model::as_html(self, pretty)
    }
}

/// An ordered group of tags rendered together.
///
/// ```rust
/// use tagline::{Bundle, FieldSpec, Tag};
///
/// let bundle = Bundle::named("head")
///     .with(FieldSpec::char("title").template("<title>{value}</title>").with_value("Home").unwrap())
///     .with(FieldSpec::char("author").template("<meta name=\"{name}\" content=\"{value}\"/>").with_value("Ana").unwrap());
///
/// assert_eq!(
///     bundle.as_html(false).unwrap(),
///     r#"<title>Home</title><meta name="author" content="Ana"/>"#
/// );
/// ```
#[derive(Debug, Default)]
pub struct Bundle {
    name: Option<Arc<str>>,
    tags: Vec<Box<dyn Tag>>,
}

impl Bundle {
    pub fn new() -> Self {
        Bundle::default()
    }

    pub fn named<N: Into<Arc<str>>>(name: N) -> Self {
        Bundle { name: Some(name.into()), tags: vec![] }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn with<T: Tag + 'static>(mut self, tag: T) -> Self {
        self.push(tag);
        self
    }

    pub fn push<T: Tag + 'static>(&mut self, tag: T) {
        self.tags.push(Box::new(tag));
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn Tag> + '_ {
        self.tags.iter().map(|tag| &**tag)
    }

    fn context(&self) -> crate::error::Error {
        match &self.name {
            Some(name) => error!(format!("invalid {name} bundle")),
            None => error!("invalid bundle"),
        }
    }
}

impl Tag for Bundle {
    /// Validates every member in order. The first failure propagates.
    fn validate(&self) -> Result<Vec<Warning>> {
        let mut warnings = vec![];
        for tag in &self.tags {
            warnings.extend(tag.validate().chain_with(|| self.context())?);
        }

        Ok(warnings)
    }

    /// Merges the members' dictionaries in order. Later members win when
    /// names collide.
    fn as_dict(&self) -> Result<Dict> {
        let mut dict = Dict::new();
        for tag in &self.tags {
            dict.extend(tag.as_dict().chain_with(|| self.context())?);
        }

        Ok(dict)
    }

    /// Concatenates the members' HTML, one member per line when `pretty`.
    fn as_html(&self, pretty: bool) -> Result<String> {
        let mut parts = Vec::with_capacity(self.tags.len());
        for tag in &self.tags {
            let html = tag.as_html(pretty).chain_with(|| self.context())?;
            if !html.is_empty() {
                parts.push(html);
            }
        }

        Ok(parts.join(if pretty { "\n" } else { "" }))
    }
}
