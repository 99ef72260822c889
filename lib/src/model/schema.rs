use std::sync::Arc;

use derive_more::Debug;
use indexmap::IndexMap;
use rustc_hash::FxHashSet;

use crate::error::{Error, Result, Chainable};
use crate::field::FieldSpec;
use crate::model::Model;
use crate::value::{Dict, Format, Json, Value};

/// A check run against a model and one of its field's values once every field
/// has been validated.
pub type ModelValidator = Arc<dyn Fn(&Model, &Value) -> Result<()> + Send + Sync>;

/// The field table of a model: each declared field, in declaration order.
///
/// Schemas are built once with [`ModelSchema::builder()`] and shared by every
/// [`Model`] instance created from them.
///
/// ```rust
/// use tagline::{FieldSpec, ModelSchema};
///
/// let schema = ModelSchema::builder("Page")
///     .field(FieldSpec::char("title").length(1, 80).required(true))
///     .field(FieldSpec::int("priority").range(0, 10))
///     .build()
///     .unwrap();
///
/// let page = schema.instance([("title", "Home")]).unwrap();
/// assert_eq!(page.as_json().unwrap(), r#"{"title":"Home","priority":null}"#);
/// ```
#[derive(Debug)]
pub struct ModelSchema {
    name: Arc<str>,
    fields: IndexMap<Arc<str>, Arc<FieldSpec>>,
    #[debug(ignore)]
    validators: IndexMap<Arc<str>, Vec<ModelValidator>>,
}

/// Registers the fields of a [`ModelSchema`].
#[derive(Debug)]
pub struct SchemaBuilder {
    name: Arc<str>,
    fields: IndexMap<Arc<str>, FieldSpec>,
    inherited: FxHashSet<Arc<str>>,
    #[debug(ignore)]
    validators: Vec<(Arc<str>, ModelValidator)>,
    errors: Vec<Error>,
}

impl SchemaBuilder {
    /// Inherits every field and validator of `base`. Fields declared
    /// afterwards with the same name replace the inherited field in place.
    ///
    /// Bases extended later override fields inherited from earlier bases, but
    /// a base may not override a field declared with [`SchemaBuilder::field()`].
    pub fn extend(mut self, base: &ModelSchema) -> Self {
        for (name, spec) in &base.fields {
            if self.fields.contains_key(name) && !self.inherited.contains(name) {
                self.errors.push(error! {
                    kind: Schema,
                    format!("field {name} is declared before extending {}", base.name),
                    "model" => &*self.name,
                    "hint" => "extend base schemas before declaring fields",
                });

                continue;
            }

            self.fields.insert(name.clone(), (**spec).clone());
            self.inherited.insert(name.clone());
        }

        for (name, validators) in &base.validators {
            for validator in validators {
                self.validators.push((name.clone(), validator.clone()));
            }
        }

        self
    }

    pub fn field(mut self, spec: FieldSpec) -> Self {
        let name = spec.name_arc().clone();
        if self.fields.contains_key(&name) && !self.inherited.remove(&name) {
            self.errors.push(error! {
                kind: Schema,
                format!("field {name} is declared more than once"),
                "model" => &*self.name,
            });
        }

        self.fields.insert(name, spec);
        self
    }

    pub fn validator<N, F>(mut self, field: N, f: F) -> Self
        where N: Into<Arc<str>>, F: Fn(&Model, &Value) -> Result<()> + Send + Sync + 'static
    {
        self.validators.push((field.into(), Arc::new(f)));
        self
    }

    pub fn build(self) -> Result<Arc<ModelSchema>> {
        if let Some(error) = self.errors.into_iter().next() {
            return Err(error);
        }

        if self.name.is_empty() {
            return err!(kind: Schema, "model name is required");
        }

        for spec in self.fields.values() {
            spec.check().chain_with(|| error! {
                format!("invalid declaration for model {}", self.name),
                "field" => spec.name(),
            })?;
        }

        let mut validators: IndexMap<Arc<str>, Vec<ModelValidator>> = IndexMap::new();
        for (field, validator) in self.validators {
            if !self.fields.contains_key(&field) {
                return err! {
                    kind: Schema,
                    format!("validator registered for undeclared field {field}"),
                    "model" => &*self.name,
                };
            }

            validators.entry(field).or_default().push(validator);
        }

        tracing::debug!(model = %self.name, fields = self.fields.len(), "built model schema");
        Ok(Arc::new(ModelSchema {
            name: self.name,
            fields: self.fields.into_iter().map(|(k, v)| (k, Arc::new(v))).collect(),
            validators,
        }))
    }
}

impl ModelSchema {
    pub fn builder<N: Into<Arc<str>>>(name: N) -> SchemaBuilder {
        SchemaBuilder {
            name: name.into(),
            fields: IndexMap::new(),
            inherited: FxHashSet::default(),
            validators: vec![],
            errors: vec![],
        }
    }

    /// Builds a schema from fields whose declarations are known to check,
    /// without checking them.
    pub(crate) fn from_specs<N, I>(name: N, specs: I) -> Arc<ModelSchema>
        where N: Into<Arc<str>>, I: IntoIterator<Item = FieldSpec>
    {
        Arc::new(ModelSchema {
            name: name.into(),
            fields: specs.into_iter()
                .map(|spec| (spec.name_arc().clone(), Arc::new(spec)))
                .collect(),
            validators: IndexMap::new(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.get(name).map(|spec| &**spec)
    }

    /// The declared fields, in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = &FieldSpec> + '_ {
        self.fields.values().map(|spec| &**spec)
    }

    pub(crate) fn entries(&self) -> impl Iterator<Item = (&Arc<str>, &Arc<FieldSpec>)> + '_ {
        self.fields.iter()
    }

    pub(crate) fn spec(&self, name: &str) -> Result<(&Arc<str>, &Arc<FieldSpec>)> {
        self.fields.get_key_value(name).ok_or_else(|| error! {
            kind: UnknownField,
            format!("{} has no field {name}", self.name),
            "declared fields" => self.fields.keys()
                .map(|k| &**k)
                .collect::<Vec<_>>()
                .join(", "),
        })
    }

    pub(crate) fn validators(&self) -> impl Iterator<Item = (&Arc<str>, &ModelValidator)> + '_ {
        self.validators.iter()
            .flat_map(|(field, validators)| validators.iter().map(move |v| (field, v)))
    }

    /// Creates an instance, setting each `(name, value)` pair. Values are not
    /// validated until the instance is validated or serialized.
    pub fn instance<I, N, V>(self: &Arc<Self>, values: I) -> Result<Model>
        where I: IntoIterator<Item = (N, V)>, N: AsRef<str>, V: Into<Value>
    {
        let mut model = Model::new(self);
        for (name, value) in values {
            model.set(name.as_ref(), value)?;
        }

        Ok(model)
    }

    /// Recreates an instance from the output of [`Model::as_dict()`].
    pub fn from_dict(self: &Arc<Self>, dict: &Dict) -> Result<Model> {
        self.instance(dict.iter().map(|(k, v)| (k, v.clone())))
    }

    /// Recreates an instance from the output of [`Model::as_json()`].
    pub fn from_json(self: &Arc<Self>, json: &str) -> Result<Model> {
        let dict: Dict = Json::parse(json)?;
        self.from_dict(&dict)
    }

    /// Reads a schema declaration in the data format `F`. See
    /// [`SchemaDecl`](crate::model::SchemaDecl) for the layout.
    pub fn parse<F: Format>(string: &str) -> Result<Arc<ModelSchema>> {
        let decl: crate::model::SchemaDecl = F::parse(string)
            .chain(error!("failed to parse model schema declaration"))?;

        decl.build()
    }

    pub fn from_toml(string: &str) -> Result<Arc<ModelSchema>> {
        Self::parse::<crate::value::Toml>(string)
    }

    pub fn from_json_decl(string: &str) -> Result<Arc<ModelSchema>> {
        Self::parse::<Json>(string)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::field::FieldKind;

    fn base() -> Arc<ModelSchema> {
        ModelSchema::builder("Base")
            .field(FieldSpec::char("title").length(1, 10).required(true))
            .field(FieldSpec::char("description"))
            .validator("title", |_, v| match v.as_str() {
                Some(s) if s.starts_with(char::is_uppercase) => Ok(()),
                _ => err!("title must be capitalized"),
            })
            .build()
            .unwrap()
    }

    #[test]
    fn keeps_declaration_order() {
        let schema = ModelSchema::builder("Ordered")
            .field(FieldSpec::char("c"))
            .field(FieldSpec::char("a"))
            .field(FieldSpec::int("b"))
            .build()
            .unwrap();

        let names: Vec<_> = schema.fields().map(|f| f.name()).collect();
        assert_eq!(names, ["c", "a", "b"]);
        assert_eq!(schema.len(), 3);
        assert!(schema.contains("b") && !schema.contains("d"));
    }

    #[test]
    fn inheritance_replaces_in_place() {
        let child = ModelSchema::builder("Child")
            .extend(&base())
            .field(FieldSpec::int("rank"))
            .field(FieldSpec::char("title").length(1, 99))
            .build()
            .unwrap();

        let names: Vec<_> = child.fields().map(|f| f.name()).collect();
        assert_eq!(names, ["title", "description", "rank"]);
        assert!(!child.field("title").unwrap().is_required());
        assert_eq!(child.validators().count(), 1);
    }

    #[test]
    fn extend_never_overrides_declared_fields() {
        let late = ModelSchema::builder("Late")
            .field(FieldSpec::char("title").length(1, 99))
            .extend(&base())
            .build()
            .unwrap_err();

        assert_eq!(late.kind(), ErrorKind::Schema);
        assert!(late.to_string().contains("field title is declared before extending Base"));

        let other = ModelSchema::builder("Other")
            .field(FieldSpec::char("title").length(1, 3))
            .build()
            .unwrap();

        let layered = ModelSchema::builder("Layered")
            .extend(&base())
            .extend(&other)
            .field(FieldSpec::int("rank"))
            .build()
            .unwrap();

        let title = layered.field("title").unwrap();
        assert_eq!(title.kind(), FieldKind::Char { min_length: 1, max_length: 3 });
        let names: Vec<_> = layered.fields().map(|f| f.name()).collect();
        assert_eq!(names, ["title", "description", "rank"]);
    }

    #[test]
    fn rejects_invalid_declarations() {
        let duplicate = ModelSchema::builder("Dup")
            .field(FieldSpec::char("a"))
            .field(FieldSpec::char("a"))
            .build();
        assert_eq!(duplicate.unwrap_err().kind(), ErrorKind::Schema);

        let redeclared_twice = ModelSchema::builder("Child")
            .extend(&base())
            .field(FieldSpec::char("title"))
            .field(FieldSpec::char("title"))
            .build();
        assert_eq!(redeclared_twice.unwrap_err().kind(), ErrorKind::Schema);

        let orphan = ModelSchema::builder("Orphan")
            .validator("missing", |_, _| Ok(()))
            .build();
        assert_eq!(orphan.unwrap_err().kind(), ErrorKind::Schema);

        let bad_field = ModelSchema::builder("Bad")
            .field(FieldSpec::char("a").template("<p>{nope}</p>"))
            .build();
        assert_eq!(bad_field.unwrap_err().kind(), ErrorKind::Template);

        assert_eq!(ModelSchema::builder("").build().unwrap_err().kind(), ErrorKind::Schema);
    }

    #[test]
    fn unknown_fields_are_named() {
        let error = base().instance([("nope", "x")]).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::UnknownField);
        assert!(error.to_string().contains("Base has no field nope"));
        assert!(error.to_string().contains("declared fields: title, description"));
    }

    #[test]
    fn round_trips_through_dict_and_json() {
        let schema = base();
        let model = schema.instance([("title", "Hello"), ("description", "World")]).unwrap();

        let dict = model.as_dict().unwrap();
        assert_eq!(schema.from_dict(&dict).unwrap().as_dict().unwrap(), dict);

        let json = model.as_json().unwrap();
        assert_eq!(schema.from_json(&json).unwrap().as_json().unwrap(), json);
        assert_eq!(schema.from_json("[1]").unwrap_err().kind(), ErrorKind::Format);
    }
}
