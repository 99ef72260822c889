use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::error::{Result, Chainable};
use crate::field::{Field, Warning};
use crate::model::ModelSchema;
use crate::value::{Dict, Value};

/// An instance of a [`ModelSchema`]: one value per declared field.
///
/// Setting and deleting values never validates them. Validation happens in
/// [`Model::validate()`] and before every serialization.
#[derive(Debug, Clone)]
pub struct Model {
    schema: Arc<ModelSchema>,
    values: FxHashMap<Arc<str>, Value>,
}

impl Model {
    /// Creates an instance of `schema` with no values set.
    pub fn new(schema: &Arc<ModelSchema>) -> Model {
        Model { schema: schema.clone(), values: FxHashMap::default() }
    }

    pub fn schema(&self) -> &Arc<ModelSchema> {
        &self.schema
    }

    pub fn name(&self) -> &str {
        self.schema.name()
    }

    /// Returns the value of the field `name`, or `None` if it's unset.
    pub fn get(&self, name: &str) -> Result<Option<&Value>> {
        let (name, _) = self.schema.spec(name)?;
        Ok(self.values.get(name))
    }

    /// Sets the value of the field `name`, returning the previous value. A
    /// `null` value unsets the field.
    pub fn set<V: Into<Value>>(&mut self, name: &str, value: V) -> Result<Option<Value>> {
        let (name, _) = self.schema.spec(name)?;
        let value = value.into();
        if value.is_null() {
            return Ok(self.values.remove(name));
        }

        Ok(self.values.insert(name.clone(), value))
    }

    /// Unsets the field `name`, returning its value, if it had one.
    pub fn delete(&mut self, name: &str) -> Result<Option<Value>> {
        let (name, _) = self.schema.spec(name)?;
        Ok(self.values.remove(name))
    }

    /// A standalone [`Field`] with the declaration and current value of the
    /// field `name`.
    pub fn field(&self, name: &str) -> Result<Field> {
        let (name, spec) = self.schema.spec(name)?;
        Ok(Field::from_parts(spec.clone(), self.values.get(name).cloned()))
    }

    /// Every declared field, in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = Field> + '_ {
        self.schema.entries()
            .map(|(name, spec)| Field::from_parts(spec.clone(), self.values.get(name).cloned()))
    }

    /// Validates every field in declaration order, then runs the schema's
    /// validators against each field that has a value. Returns the warnings of
    /// non-strict fields that are out of bounds.
    pub fn validate(&self) -> Result<Vec<Warning>> {
        let mut warnings = vec![];
        for (name, spec) in self.schema.entries() {
            let warning = spec.validate(self.values.get(name))
                .chain_with(|| error!(format!("invalid {} instance", self.name())))?;

            warnings.extend(warning);
        }

        for (name, validator) in self.schema.validators() {
            let Some(value) = self.values.get(name).filter(|v| !v.is_empty()) else {
                continue;
            };

            validator(self, value).chain_with(|| error! {
                format!("invalid {} instance", self.name()),
                "field" => name,
            })?;
        }

        if !warnings.is_empty() {
            tracing::debug!(model = self.name(), warnings = warnings.len(), "validated with warnings");
        }

        Ok(warnings)
    }

    /// Validates the instance and returns `{name: value}` for every declared
    /// field, in declaration order. Unset and empty fields map to `null`.
    pub fn as_dict(&self) -> Result<Dict> {
        self.validate()?;
        let mut dict = Dict::new();
        for (name, spec) in self.schema.entries() {
            dict.insert(name.clone(), spec.serialize(self.values.get(name))?);
        }

        Ok(dict)
    }

    pub fn as_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.as_dict()?)?)
    }

    /// Validates the instance and renders every field's template, in
    /// declaration order, skipping fields that render to nothing. With
    /// `pretty`, each rendering is on its own line.
    pub fn as_html(&self, pretty: bool) -> Result<String> {
        self.validate()?;
        let mut parts = vec![];
        for (name, spec) in self.schema.entries() {
            let html = spec.render(self.values.get(name))?;
            if !html.is_empty() {
                parts.push(html);
            }
        }

        Ok(parts.join(if pretty { "\n" } else { "" }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::field::FieldSpec;
    use crate::metatags;

    use tracing_test::traced_test;

    static_assertions::assert_impl_all!(Model: Send, Sync, Clone);
    static_assertions::assert_impl_all!(ModelSchema: Send, Sync);

    fn simple_model() -> Arc<ModelSchema> {
        ModelSchema::builder("SimpleModel")
            .field(metatags::title().strict(false))
            .field(metatags::description().strict(false))
            .field(metatags::keywords().strict(false))
            .build()
            .unwrap()
    }

    #[traced_test]
    #[test]
    fn lenient_model_keeps_short_values() {
        let schema = simple_model();
        let mut model = schema.instance([
            ("title", "QWERTY111"),
            ("description", "ASDSAD"),
            ("keywords", "keywords"),
        ]).unwrap();

        model.set("description", "DESCRIPTION").unwrap();
        model.set("keywords", "LET").unwrap();

        let warnings = model.validate().unwrap();
        assert_eq!(warnings.len(), 3);
        assert!(warnings.iter().all(|w| w.kind == ErrorKind::Bounds));
        assert!(logs_contain("title value length must be between 50 and 80, current: 9"));

        assert_eq!(model.field("title").unwrap().as_dict().unwrap(), crate::dict! {
            "title" => "QWERTY111",
        });

        assert_eq!(
            model.field("description").unwrap().as_html().unwrap(),
            r#"<meta name="description" content="DESCRIPTION"/>"#
        );

        assert_eq!(
            model.as_json().unwrap(),
            r#"{"title":"QWERTY111","description":"DESCRIPTION","keywords":"LET"}"#
        );

        assert_eq!(model.as_html(true).unwrap(), concat!(
            "<title>QWERTY111</title>\n",
            "<meta name=\"description\" content=\"DESCRIPTION\"/>\n",
            "<meta name=\"keywords\" content=\"LET\"/>",
        ));
    }

    #[test]
    fn get_set_delete() {
        let mut model = Model::new(&simple_model());
        assert_eq!(model.get("title").unwrap(), None);
        assert_eq!(model.set("title", "Hello").unwrap(), None);
        assert_eq!(model.get("title").unwrap(), Some(&Value::from("Hello")));
        assert_eq!(model.set("title", ()).unwrap(), Some(Value::from("Hello")));
        assert_eq!(model.get("title").unwrap(), None);

        model.set("keywords", "a, b").unwrap();
        assert_eq!(model.delete("keywords").unwrap(), Some(Value::from("a, b")));
        assert_eq!(model.delete("keywords").unwrap(), None);

        for result in [model.get("nope").map(|_| ()), model.delete("nope").map(|_| ())] {
            assert_eq!(result.unwrap_err().kind(), ErrorKind::UnknownField);
        }
    }

    #[test]
    fn first_failure_names_the_model() {
        let model = simple_model().instance([("keywords", "LET")]).unwrap();
        let error = model.validate().unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Required);
        assert!(error.to_string().starts_with("invalid SimpleModel instance\n    title is required"));
        assert!(model.as_dict().is_err());
        assert!(model.as_html(false).is_err());
    }

    #[test]
    fn strict_fields_fail_serialization() {
        let schema = ModelSchema::builder("Strict")
            .field(FieldSpec::int("age").range(0, 150).strict(true))
            .build()
            .unwrap();

        let model = schema.instance([("age", "151")]).unwrap();
        assert_eq!(model.as_json().unwrap_err().kind(), ErrorKind::Bounds);

        let model = schema.instance([("age", " 42 ")]).unwrap();
        assert_eq!(model.as_json().unwrap(), r#"{"age":42}"#);
        assert_eq!(model.as_html(true).unwrap(), "");
    }

    #[test]
    fn empty_values_round_trip_as_null() {
        let schema = ModelSchema::builder("Optional")
            .field(FieldSpec::int("n"))
            .field(FieldSpec::char("t"))
            .build()
            .unwrap();

        let model = schema.instance([
            ("n", Value::from("")),
            ("t", Value::from(Vec::<i64>::new())),
        ]).unwrap();

        let dict = model.as_dict().unwrap();
        assert_eq!(dict, crate::dict! { "n" => (), "t" => () });
        assert_eq!(model.as_json().unwrap(), r#"{"n":null,"t":null}"#);

        let rebuilt = schema.from_dict(&dict).unwrap();
        assert_eq!(rebuilt.get("n").unwrap(), None);
        assert_eq!(rebuilt.as_dict().unwrap(), dict);
    }

    #[test]
    fn model_validators_see_the_instance() {
        let schema = ModelSchema::builder("Range")
            .field(FieldSpec::int("low"))
            .field(FieldSpec::int("high"))
            .validator("high", |model, high| {
                let low = model.field("low")?.as_dict()?["low"].to_int().unwrap_or(0);
                match high.to_int() {
                    Some(high) if high >= low => Ok(()),
                    _ => err!("high must not be below low"),
                }
            })
            .build()
            .unwrap();

        assert!(schema.instance([("low", 1), ("high", 2)]).unwrap().validate().is_ok());
        assert!(schema.instance([("low", 1)]).unwrap().validate().is_ok());

        let error = schema.instance([("low", 3), ("high", 2)]).unwrap().validate().unwrap_err();
        assert!(error.to_string().contains("high must not be below low"));
        assert!(error.to_string().contains("field: high"));
    }

    #[test]
    fn fields_follow_declaration_order() {
        let model = simple_model().instance([("keywords", "k"), ("title", "t")]).unwrap();
        let fields: Vec<_> = model.fields().map(|f| (f.name().to_owned(), f.to_string())).collect();
        assert_eq!(fields, [
            ("title".to_owned(), "t".to_owned()),
            ("description".to_owned(), "".to_owned()),
            ("keywords".to_owned(), "k".to_owned()),
        ]);
    }
}
