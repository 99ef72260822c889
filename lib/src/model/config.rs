use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Deserialize;
use serde::de::IgnoredAny;

use crate::error::{Result, Chainable};
use crate::field::{FieldKind, FieldSpec, DEFAULT_MAX};
use crate::model::ModelSchema;

/// A model schema declared in data.
///
/// ```toml
/// name = "SimpleModel"
///
/// [[fields]]
/// name = "title"
/// kind = "char"
/// min_length = 50
/// max_length = 80
/// required = true
/// template = "<title>{value}</title>"
///
/// [[fields]]
/// name = "priority"
/// kind = "int"
/// max_value = 10
/// ```
///
/// Omitted bounds take the defaults of [`FieldSpec::char()`] and
/// [`FieldSpec::int()`]. Keys a field's kind doesn't take, such as a
/// misspelled `min_lenght` or `max_value` on a `char` field, are rejected.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchemaDecl {
    pub name: Arc<str>,
    #[serde(default)]
    pub fields: Vec<FieldDecl>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FieldDecl {
    pub name: Arc<str>,
    #[serde(flatten)]
    pub kind: KindDecl,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub strict: bool,
    #[serde(default)]
    pub template: Option<Arc<str>>,
    #[serde(flatten)]
    rest: BTreeMap<String, IgnoredAny>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum KindDecl {
    Char {
        min_length: Option<usize>,
        max_length: Option<usize>,
    },
    Int {
        min_value: Option<i64>,
        max_value: Option<i64>,
    },
}

impl From<KindDecl> for FieldKind {
    fn from(decl: KindDecl) -> Self {
        match decl {
            KindDecl::Char { min_length, max_length } => FieldKind::Char {
                min_length: min_length.unwrap_or(0),
                max_length: max_length.unwrap_or(DEFAULT_MAX),
            },
            KindDecl::Int { min_value, max_value } => FieldKind::Int {
                min_value: min_value.unwrap_or(0),
                max_value: max_value.unwrap_or(DEFAULT_MAX as i64),
            },
        }
    }
}

impl KindDecl {
    fn keys(&self) -> &'static [&'static str] {
        match self {
            KindDecl::Char { .. } => &["kind", "min_length", "max_length"],
            KindDecl::Int { .. } => &["kind", "min_value", "max_value"],
        }
    }
}

impl FieldDecl {
    /// Converts the declaration into a [`FieldSpec`], rejecting keys the
    /// field's kind doesn't take.
    pub fn into_spec(self) -> Result<FieldSpec> {
        let allowed = self.kind.keys();
        if let Some(key) = self.rest.keys().find(|k| !allowed.contains(&k.as_str())) {
            return err! {
                kind: Schema,
                format!("unknown key `{key}` in declaration of field {}", self.name),
                "allowed keys" => ["name", "required", "strict", "template"].iter()
                    .chain(allowed)
                    .map(|k| format!("`{k}`"))
                    .collect::<Vec<_>>()
                    .join(", "),
            };
        }

        let spec = FieldSpec::new(self.name, self.kind.into())
            .required(self.required)
            .strict(self.strict);

        Ok(match self.template {
            Some(template) => spec.template(template),
            None => spec,
        })
    }
}

impl SchemaDecl {
    pub fn build(self) -> Result<Arc<ModelSchema>> {
        let mut builder = ModelSchema::builder(self.name.clone());
        for field in self.fields {
            builder = builder.field(field.into_spec().chain_with(|| error! {
                "invalid model schema declaration",
                "model" => &*self.name,
            })?);
        }

        builder.build()
    }
}
