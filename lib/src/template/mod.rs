mod template;
mod simple;

pub use template::*;
pub use simple::*;

use std::collections::HashMap;
use std::hash::BuildHasher;
use std::sync::Arc;

use crate::value::{Dict, Value};

/// A source of values for the keys a [`Template`] substitutes.
pub trait Context {
    fn get(&self, key: &str) -> Option<&Value>;
}

impl<S: BuildHasher> Context for HashMap<Arc<str>, Value, S> {
    fn get(&self, key: &str) -> Option<&Value> {
        HashMap::get(self, key)
    }
}

impl Context for Dict {
    fn get(&self, key: &str) -> Option<&Value> {
        Dict::get(self, key)
    }
}

impl Context for [(&str, &Value)] {
    fn get(&self, key: &str) -> Option<&Value> {
        self.iter().find(|(k, _)| *k == key).map(|(_, v)| *v)
    }
}
