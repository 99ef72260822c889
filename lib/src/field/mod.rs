mod spec;

pub use spec::*;

use std::fmt;
use std::sync::Arc;

use crate::error::{ErrorKind, Result};
use crate::value::{Dict, Value};

/// The non-fatal outcome of validating an out-of-bounds value in a field that
/// isn't strict.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warning {
    pub field: Arc<str>,
    pub kind: ErrorKind,
    pub message: String,
}

impl Warning {
    pub(crate) fn new(field: Arc<str>, message: String) -> Self {
        Warning { field, kind: ErrorKind::Bounds, message }
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// A declared field together with its value.
#[derive(Debug, Clone)]
pub struct Field {
    spec: Arc<FieldSpec>,
    value: Option<Value>,
}

impl Field {
    /// Creates a field with `value`, checking the declaration and validating
    /// the value. A `null` value leaves the field without a value.
    pub fn new<V: Into<Value>>(spec: FieldSpec, value: V) -> Result<Field> {
        spec.check()?;
        let field = Field::from_parts(Arc::new(spec), Some(value.into()));
        field.validate()?;
        Ok(field)
    }

    pub(crate) fn from_parts(spec: Arc<FieldSpec>, value: Option<Value>) -> Field {
        Field { spec, value: value.filter(|v| !v.is_null()) }
    }

    pub fn name(&self) -> &str {
        self.spec.name()
    }

    pub fn spec(&self) -> &FieldSpec {
        &self.spec
    }

    pub fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    /// Replaces the value without validating it, returning the old value.
    pub fn set<V: Into<Value>>(&mut self, value: V) -> Option<Value> {
        let value = Some(value.into()).filter(|v| !v.is_null());
        std::mem::replace(&mut self.value, value)
    }

    pub fn clear(&mut self) -> Option<Value> {
        self.value.take()
    }

    pub fn validate(&self) -> Result<Vec<Warning>> {
        Ok(self.spec.validate(self.value())?.into_iter().collect())
    }

    /// Validates the field and returns `{name: value}`. Integer fields yield
    /// their converted value; a field without a value, or with an empty one,
    /// yields `null`.
    pub fn as_dict(&self) -> Result<Dict> {
        self.validate()?;
        let value = self.spec.serialize(self.value())?;
        let mut dict = Dict::new();
        dict.insert(self.spec.name_arc().clone(), value);
        Ok(dict)
    }

    pub fn as_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.as_dict()?)?)
    }

    /// Validates the field and renders its template.
    pub fn as_html(&self) -> Result<String> {
        self.validate()?;
        self.spec.render(self.value())
    }
}

/// Formats as the field's value, or nothing if there is none.
impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Some(value) => fmt::Display::fmt(value, f),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::SimpleTemplate;

    #[test]
    fn construction_validates() {
        let spec = || FieldSpec::char("title").length(1, 5).required(true).strict(true);
        assert!(Field::new(spec(), "abc").is_ok());
        assert_eq!(Field::new(spec(), "abcdef").unwrap_err().kind(), ErrorKind::Bounds);
        assert_eq!(Field::new(spec(), None::<&str>).unwrap_err().kind(), ErrorKind::Required);
        assert_eq!(Field::new(spec().length(9, 1), "abc").unwrap_err().kind(), ErrorKind::Schema);
    }

    #[test]
    fn set_skips_validation() {
        let mut field = FieldSpec::char("title").length(1, 5).strict(true).with_value("abc").unwrap();
        assert_eq!(field.set("too long for it"), Some(Value::from("abc")));
        assert_eq!(field.validate().unwrap_err().kind(), ErrorKind::Bounds);
        assert_eq!(field.as_dict().unwrap_err().kind(), ErrorKind::Bounds);

        field.clear();
        assert_eq!(field.value(), None);
        assert!(field.validate().unwrap().is_empty());
    }

    #[test]
    fn serializes() {
        let field = FieldSpec::int("count").range(0, 10).with_value("7").unwrap();
        assert_eq!(field.as_dict().unwrap(), crate::dict! { "count" => 7 });
        assert_eq!(field.as_json().unwrap(), r#"{"count":7}"#);
        assert_eq!(field.as_html().unwrap(), "");
        assert_eq!(field.to_string(), "7");

        let empty = FieldSpec::char("note").with_value(()).unwrap();
        assert_eq!(empty.as_json().unwrap(), r#"{"note":null}"#);
        assert_eq!(empty.to_string(), "");
    }

    #[test]
    fn empty_values_serialize_as_null() {
        let number = FieldSpec::int("n").with_value("").unwrap();
        assert!(number.validate().unwrap().is_empty());
        assert_eq!(number.as_json().unwrap(), r#"{"n":null}"#);

        let text = FieldSpec::char("t").with_value(Vec::<i64>::new()).unwrap();
        assert_eq!(text.as_dict().unwrap(), crate::dict! { "t" => () });
        assert_eq!(text.as_html().unwrap(), "");
    }

    #[test]
    fn renders_simple_template_output() {
        let rendered = SimpleTemplate::new(
            ["My doggy name is {name} with color {color}", "Name of my doggy is {name}"],
            [("name", "Druzhok"), ("color", "red")],
        ).unwrap().create_all().unwrap();

        for text in rendered {
            let field = FieldSpec::char("title")
                .template("<title>{value}</title>")
                .with_value(text.as_str())
                .unwrap();

            assert_eq!(field.as_html().unwrap(), format!("<title>{text}</title>"));
            assert_eq!(field.as_dict().unwrap()["title"], Value::from(text.as_str()));
        }
    }
}
