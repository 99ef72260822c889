//! Declarations for the `<title>`, description, and keywords meta tags.
//!
//! Each function returns a [`FieldSpec`] with the conventional bounds and
//! template. Override `strict`, `required`, or the template before attaching
//! a value:
//!
//! ```rust
//! use tagline::metatags;
//! use tagline::error::ErrorKind;
//!
//! let error = metatags::title().strict(true).with_value("short").unwrap_err();
//! assert_eq!(error.kind(), ErrorKind::Bounds);
//!
//! let title = metatags::title().with_value("short").unwrap();
//! assert_eq!(title.as_html().unwrap(), "<title>short</title>");
//! ```

use std::sync::Arc;

use once_cell::sync::Lazy;

use crate::bundle::Bundle;
use crate::error::Result;
use crate::field::FieldSpec;
use crate::model::ModelSchema;

pub const TITLE_TEMPLATE: &str = "<title>{value}</title>";
pub const DESCRIPTION_TEMPLATE: &str = r#"<meta name="description" content="{value}"/>"#;
pub const KEYWORDS_TEMPLATE: &str = r#"<meta name="keywords" content="{value}"/>"#;

/// The name of the meta tag [`schema()`] and [`bundle()`].
pub const NAME: &str = "META TAGS";

/// `title`: 50 to 80 characters, required.
pub fn title() -> FieldSpec {
    FieldSpec::char("title")
        .length(50, 80)
        .required(true)
        .template(TITLE_TEMPLATE)
}

/// `description`: 150 to 250 characters, required.
pub fn description() -> FieldSpec {
    FieldSpec::char("description")
        .length(150, 250)
        .required(true)
        .template(DESCRIPTION_TEMPLATE)
}

/// `keywords`: 50 to 150 characters, optional.
pub fn keywords() -> FieldSpec {
    FieldSpec::char("keywords")
        .length(50, 150)
        .template(KEYWORDS_TEMPLATE)
}

static SCHEMA: Lazy<Arc<ModelSchema>> = Lazy::new(|| {
    ModelSchema::from_specs(NAME, [title(), description(), keywords()])
});

/// The shared model schema with the [`title()`], [`description()`], and
/// [`keywords()`] fields.
pub fn schema() -> Arc<ModelSchema> {
    Arc::clone(&SCHEMA)
}

/// A bundle of the three meta tags. Each value is validated as it's attached.
pub fn bundle<T, D, K>(title: T, description: D, keywords: K) -> Result<Bundle>
    where T: Into<crate::value::Value>,
          D: Into<crate::value::Value>,
          K: Into<crate::value::Value>,
{
    Ok(Bundle::named(NAME)
        .with(self::title().with_value(title)?)
        .with(self::description().with_value(description)?)
        .with(self::keywords().with_value(keywords)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundle::Tag;
    use crate::error::ErrorKind;

    use tracing_test::traced_test;

    #[test]
    fn sixty_character_title_validates() {
        let value = "x".repeat(60);
        let field = title().strict(true).with_value(value.as_str()).unwrap();
        assert!(field.validate().unwrap().is_empty());
        assert_eq!(field.as_html().unwrap(), format!("<title>{value}</title>"));
    }

    #[test]
    fn short_strict_title_fails() {
        let error = title().strict(true).with_value("short").unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Bounds);
        assert!(error.to_string().contains("title value length must be between 50 and 80, current: 5"));
    }

    #[traced_test]
    #[test]
    fn short_lenient_title_warns() {
        let field = title().with_value("short").unwrap();
        assert_eq!(field.value().and_then(|v| v.as_str()), Some("short"));
        assert!(logs_contain("title value length must be between 50 and 80, current: 5"));
    }

    #[test]
    fn required_and_optional() {
        assert_eq!(description().with_value("").unwrap_err().kind(), ErrorKind::Required);
        assert_eq!(keywords().with_value(()).unwrap().as_html().unwrap(), "");
    }

    #[test]
    fn custom_template() {
        let field = title()
            .template("<meta property=\"og:{name}\" content=\"{value}\"/>")
            .with_value("x".repeat(50))
            .unwrap();

        assert!(field.as_html().unwrap().starts_with("<meta property=\"og:title\" content=\"xxx"));
    }

    #[test]
    fn shared_schema() {
        let schema = schema();
        assert!(Arc::ptr_eq(&schema, &super::schema()));
        assert_eq!(schema.name(), NAME);

        let names: Vec<_> = schema.fields().map(|f| f.name()).collect();
        assert_eq!(names, ["title", "description", "keywords"]);
    }

    #[test]
    fn shared_schema_passes_checks() {
        let checked = ModelSchema::builder(NAME)
            .field(title())
            .field(description())
            .field(keywords())
            .build()
            .unwrap();

        let shared = schema();
        assert_eq!(shared.len(), checked.len());
        assert!(shared.fields().all(|spec| spec.check().is_ok()));
        for (a, b) in shared.fields().zip(checked.fields()) {
            assert_eq!((a.name(), a.kind(), a.is_required()), (b.name(), b.kind(), b.is_required()));
            assert_eq!(a.template_str(), b.template_str());
        }

        let model = shared.instance([("title", "x".repeat(60)), ("description", "y".repeat(150))]).unwrap();
        assert!(model.validate().unwrap().is_empty());
        assert_eq!(model.as_dict().unwrap()["keywords"], crate::value::Value::Null);
    }

    #[test]
    fn bundle_renders_every_tag() {
        let (title, description, keywords) = ("t".repeat(55), "d".repeat(160), "k".repeat(60));
        let bundle = bundle(title.as_str(), description.as_str(), keywords.as_str()).unwrap();
        assert_eq!(bundle.name(), Some(NAME));
        assert_eq!(bundle.as_html(true).unwrap(), format!(
            "<title>{title}</title>\n\
             <meta name=\"description\" content=\"{description}\"/>\n\
             <meta name=\"keywords\" content=\"{keywords}\"/>"
        ));

        let dict = bundle.as_dict().unwrap();
        assert_eq!(dict.len(), 3);
        assert_eq!(dict["keywords"].as_str(), Some(keywords.as_str()));
    }
}
