use std::fmt;
use std::sync::Arc;

use derive_more::Debug;

use crate::error::{Result, Chainable};
use crate::field::Warning;
use crate::template::Template;
use crate::value::Value;

/// A custom check run against a field's value once its bounds have been
/// checked.
pub type Validator = Arc<dyn Fn(&Value) -> Result<()> + Send + Sync>;

pub const DEFAULT_MAX: usize = 255 * 1000;

/// The type of a field and the bounds its values must respect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// A text value whose length, in characters, must be within bounds.
    Char { min_length: usize, max_length: usize },
    /// An integer value that must be within bounds.
    Int { min_value: i64, max_value: i64 },
}

/// The declaration of a field: its name, type, bounds, and how it renders.
///
/// ```rust
/// use tagline::FieldSpec;
///
/// let spec = FieldSpec::char("title")
///     .length(50, 80)
///     .required(true)
///     .template("<title>{value}</title>");
///
/// let field = spec.with_value("x".repeat(60)).unwrap();
/// assert_eq!(field.as_html().unwrap(), format!("<title>{}</title>", "x".repeat(60)));
/// ```
#[derive(Debug, Clone)]
pub struct FieldSpec {
    name: Arc<str>,
    kind: FieldKind,
    required: bool,
    strict: bool,
    template: Option<Arc<str>>,
    #[debug(ignore)]
    validators: Vec<Validator>,
}

impl FieldSpec {
    pub fn new<N: Into<Arc<str>>>(name: N, kind: FieldKind) -> Self {
        FieldSpec {
            name: name.into(),
            kind,
            required: false,
            strict: false,
            template: None,
            validators: vec![],
        }
    }

    /// A character field with length bounds `0..=255000`.
    pub fn char<N: Into<Arc<str>>>(name: N) -> Self {
        FieldSpec::new(name, FieldKind::Char { min_length: 0, max_length: DEFAULT_MAX })
    }

    /// An integer field with range `0..=255000`.
    pub fn int<N: Into<Arc<str>>>(name: N) -> Self {
        FieldSpec::new(name, FieldKind::Int { min_value: 0, max_value: DEFAULT_MAX as i64 })
    }

    /// Makes this a character field with the given length bounds.
    pub fn length(mut self, min_length: usize, max_length: usize) -> Self {
        self.kind = FieldKind::Char { min_length, max_length };
        self
    }

    /// Makes this an integer field with the given range.
    pub fn range(mut self, min_value: i64, max_value: i64) -> Self {
        self.kind = FieldKind::Int { min_value, max_value };
        self
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Sets the HTML template. It must reference `{value}` and may reference
    /// `{name}`.
    pub fn template<T: Into<Arc<str>>>(mut self, template: T) -> Self {
        self.template = Some(template.into());
        self
    }

    pub fn without_template(mut self) -> Self {
        self.template = None;
        self
    }

    pub fn validator<F>(mut self, f: F) -> Self
        where F: Fn(&Value) -> Result<()> + Send + Sync + 'static
    {
        self.validators.push(Arc::new(f));
        self
    }

    /// Attaches `value`, checking and validating the result.
    pub fn with_value<V: Into<Value>>(self, value: V) -> Result<crate::field::Field> {
        crate::field::Field::new(self, value)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn name_arc(&self) -> &Arc<str> {
        &self.name
    }

    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    pub fn template_str(&self) -> Option<&str> {
        self.template.as_deref()
    }

    /// Checks that the declaration itself is sound: the name is non-empty,
    /// the bounds are ordered, and the template parses and references
    /// `{value}` and nothing but `{value}` and `{name}`.
    pub fn check(&self) -> Result<()> {
        if self.name.is_empty() {
            return err!(kind: Schema, "field name is required");
        }

        let (min, max) = match self.kind {
            FieldKind::Char { min_length, max_length } => (min_length as i128, max_length as i128),
            FieldKind::Int { min_value, max_value } => (min_value as i128, max_value as i128),
        };

        if min > max {
            return err! {
                kind: Schema,
                format!("{} bounds are inverted", self.name),
                "min" => min,
                "max" => max,
            };
        }

        self.parsed_template()?;
        Ok(())
    }

    fn parsed_template(&self) -> Result<Option<Template>> {
        let Some(source) = self.template.as_deref() else {
            return Ok(None);
        };

        let template = Template::parse(source)
            .chain_with(|| error!(format!("invalid template for field {}", self.name)))?;

        if !template.references("value") {
            return err! {
                kind: Template,
                format!("template for field {} must contain the `value` key", self.name),
                "template" => source,
                "example" => "<title>{value}</title>",
            };
        }

        if let Some(key) = template.keys().find(|&k| k != "value" && k != "name") {
            return err! {
                kind: Template,
                format!("template for field {} references unknown key `{key}`", self.name),
                "template" => source,
                "available keys" => "`value`, `name`",
            };
        }

        Ok(Some(template))
    }

    /// Validates `value` against this declaration.
    ///
    /// Missing required values and values that can't be converted to the
    /// field's type are always errors. Out-of-bounds values are errors for
    /// strict fields and warnings otherwise.
    pub fn validate(&self, value: Option<&Value>) -> Result<Option<Warning>> {
        let value = match value.filter(|v| !v.is_empty()) {
            Some(value) => value,
            None if self.required => return err! {
                kind: Required,
                format!("{} is required", self.name),
                "field" => &*self.name,
            },
            None => return Ok(None),
        };

        let warning = match self.kind {
            FieldKind::Char { min_length, max_length } => {
                let length = self.text(value)?.chars().count();
                self.check_bounds("value length", length, min_length, max_length)?
            }
            FieldKind::Int { min_value, max_value } => {
                let number = self.integer(value)?;
                self.check_bounds("value", number, min_value, max_value)?
            }
        };

        for validator in &self.validators {
            validator(value).chain_with(|| error! {
                format!("{} failed validation", self.name),
                "value" => value,
            })?;
        }

        Ok(warning)
    }

    /// Converts `value` to the form the field stores it in: integers for
    /// integer fields, text for character fields.
    pub fn clean(&self, value: &Value) -> Result<Value> {
        match self.kind {
            FieldKind::Char { .. } => match value {
                Value::String(_) => Ok(value.clone()),
                _ => Ok(Value::String(self.text(value)?.into())),
            },
            FieldKind::Int { .. } => self.integer(value).map(Value::Int),
        }
    }

    /// The value `as_dict()` reports for `value`: its cleaned form, or `null`
    /// when the value is absent or empty.
    pub fn serialize(&self, value: Option<&Value>) -> Result<Value> {
        match value.filter(|v| !v.is_empty()) {
            Some(value) => self.clean(value),
            None => Ok(Value::Null),
        }
    }

    /// Renders `value` into the template. Absent values, and fields without a
    /// template, render as the empty string.
    pub fn render(&self, value: Option<&Value>) -> Result<String> {
        let Some(template) = self.parsed_template()? else {
            return Ok(String::new());
        };

        let Some(value) = value.filter(|v| !v.is_empty()) else {
            return Ok(String::new());
        };

        let value = self.clean(value)?;
        let name = Value::String(self.name.clone());
        template.render(&[("name", &name), ("value", &value)][..])
    }

    fn text(&self, value: &Value) -> Result<String> {
        match value {
            Value::String(s) => Ok(s.to_string()),
            Value::Int(_) | Value::Bool(_) => Ok(value.to_string()),
            _ => err! {
                kind: TypeConversion,
                format!("{} must be text", self.name),
                "found" => value.kind(),
            },
        }
    }

    fn integer(&self, value: &Value) -> Result<i64> {
        let number = match value {
            Value::Int(n) => Some(*n),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        };

        number.ok_or_else(|| error! {
            kind: TypeConversion,
            format!("{} must be an integer", self.name),
            "value" => value,
            "found" => value.kind(),
        })
    }

    fn check_bounds<T>(&self, what: &str, actual: T, min: T, max: T) -> Result<Option<Warning>>
        where T: PartialOrd + fmt::Display + Copy
    {
        if min <= actual && actual <= max {
            return Ok(None);
        }

        let message = format!(
            "{} {what} must be between {min} and {max}, current: {actual}",
            self.name
        );

        if self.strict {
            return err! {
                kind: Bounds,
                message,
                "field" => &*self.name,
            };
        }

        tracing::warn!(field = %self.name, %min, %max, %actual, "{message}");
        Ok(Some(Warning::new(self.name.clone(), message)))
    }
}
