use std::sync::Arc;

use rand::Rng;
use rustc_hash::FxHashMap;

use crate::error::{Result, Chainable};
use crate::template::Template;
use crate::value::Value;

/// A list of templates rendered against one set of keys.
///
/// A specific template can be rendered by index, a random one can be picked,
/// or every template can be rendered at once.
///
/// ```rust
/// use tagline::template::SimpleTemplate;
///
/// let template = SimpleTemplate::new(
///     ["My doggy name is {name} with color {color}", "Name of my doggy is {name}"],
///     [("name", "Druzhok"), ("color", "red")],
/// ).unwrap();
///
/// assert_eq!(template.create(Some(1)).unwrap(), "Name of my doggy is Druzhok");
/// assert_eq!(template.create_all().unwrap().len(), 2);
/// assert!(template.create(Some(2)).is_err());
/// ```
#[derive(Debug, Clone)]
pub struct SimpleTemplate {
    templates: Vec<Template>,
    keys: FxHashMap<Arc<str>, Value>,
}

impl SimpleTemplate {
    pub fn new<I, T, K, N, V>(templates: I, keys: K) -> Result<Self>
        where I: IntoIterator<Item = T>,
              T: Into<Arc<str>>,
              K: IntoIterator<Item = (N, V)>,
              N: Into<Arc<str>>,
              V: Into<Value>,
    {
        let templates = templates.into_iter()
            .enumerate()
            .map(|(i, source)| Template::parse(source).chain_with(|| error! {
                "invalid template in list",
                "index" => i,
            }))
            .collect::<Result<Vec<_>>>()?;

        if templates.is_empty() {
            return err!(kind: Schema, "templates can't be empty");
        }

        let keys = keys.into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();

        Ok(SimpleTemplate { templates, keys })
    }

    pub fn templates(&self) -> &[Template] {
        &self.templates
    }

    pub fn keys(&self) -> &FxHashMap<Arc<str>, Value> {
        &self.keys
    }

    /// Sets the value of `key`, returning the previous value, if any.
    pub fn set_key<N, V>(&mut self, key: N, value: V) -> Option<Value>
        where N: Into<Arc<str>>, V: Into<Value>
    {
        self.keys.insert(key.into(), value.into())
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    /// Always `false`: construction rejects an empty template list.
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Renders the template at `index` or, if `index` is `None`, a uniformly
    /// random one.
    pub fn create(&self, index: Option<usize>) -> Result<String> {
        match index {
            Some(index) => self.render(index),
            None => self.create_with(&mut rand::thread_rng()),
        }
    }

    /// Renders a template chosen uniformly at random by `rng`.
    pub fn create_with<R: Rng>(&self, rng: &mut R) -> Result<String> {
        let index = rng.gen_range(0..self.templates.len());
        tracing::trace!(index, of = self.templates.len(), "picked random template");
        self.render(index)
    }

    /// Renders every template, in order.
    pub fn create_all(&self) -> Result<Vec<String>> {
        (0..self.templates.len())
            .map(|i| self.render(i))
            .collect()
    }

    fn render(&self, index: usize) -> Result<String> {
        let Some(template) = self.templates.get(index) else {
            return err! {
                kind: IndexOutOfRange,
                "template index must be in range",
                "index" => index,
                "templates" => self.templates.len(),
            };
        };

        template.render(&self.keys)
    }
}
