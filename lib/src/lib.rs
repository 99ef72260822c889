#![doc = svgbobdoc::transform!(
//! Declarative, validated fields and models for rendering HTML meta tags.
//!
//! # Overview
//!
//! Tagline describes small pieces of page metadata, such as a `<title>` or a
//! `<meta name="description">`, as _fields_: named values with bounds and an
//! HTML template. Fields are grouped into _models_ and models, fields, and
//! other bundles are grouped into _bundles_:
//!
//! ```svgbob
//!                  +--------+
//!                  | Bundle |
//!                  +---+----+
//!                      |
//!      +---------------+-----------------+
//!      |               |                 |
//!  +---+---+     +-----+-----+     +-----+--+
//!  | Model |     |   Field   |     | Bundle |
//!  +---+---+     +-----------+     +--------+
//!      |
//!      |   +-------------+      +-------+  +-------+
//!      +---+ ModelSchema +------+ Field |..| Field |
//!          +-------------+      +-------+  +-------+
//! ```
//!
//!   * A **field** ([`Field`]) pairs a declaration ([`FieldSpec`]) with a
//!     value. A declaration is either a character field with length bounds
//!     or an integer field with a range, and may be `required` and `strict`.
//!
//!   * A **model** ([`Model`]) is an instance of a [`ModelSchema`]: a table of
//!     field declarations built once and shared by every instance.
//!
//!   * A **bundle** ([`Bundle`]) is an ordered group of anything implementing
//!     [`Tag`].
//!
//! ## Validation
//!
//! Values are validated when a field is created and whenever a field, model,
//! or bundle is validated or serialized. A missing `required` value, or one
//! that can't be converted to the field's type, is always an error. A value
//! outside of its bounds is an error in `strict` fields; otherwise it is kept,
//! a [`Warning`] is returned, and a `tracing` warning is emitted.
//!
//! ## Rendering
//!
//! Field templates are format strings such as `<title>{value}</title>`. See
//! [`template::Template`] for the syntax and [`template::SimpleTemplate`] for
//! rendering lists of them. The [`metatags`] module declares the common meta
//! tags.
)]

#[macro_use]
pub mod error;
pub mod util;
pub mod value;
pub mod template;
pub mod field;
pub mod model;
pub mod bundle;
pub mod metatags;

pub use field::*;
pub use model::*;
pub use bundle::*;
