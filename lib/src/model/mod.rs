mod schema;
mod model;
mod config;

pub use schema::*;
pub use model::*;
pub use config::*;
