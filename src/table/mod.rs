//! JSON-to-table transformation engine.
//!
//! Two complementary transformations turn a parsed JSON value into uniform
//! rows:
//!
//! - [`flatten()`] keeps one row per top-level element and expands arrays of
//!   objects into indexed columns (`items.0.name`)
//! - [`expand_to_table`] multiplies rows instead, producing one row per leaf
//!   array item with parent fields repeated
//!
//! [`unflatten()`] reverses the flattening for row-level editing round trips.

pub mod classify;
pub mod expand;
pub mod flatten;
pub mod types;
pub mod unflatten;

pub use classify::{classify, ArrayKind, CLASSIFY_SAMPLE};
pub use expand::expand_to_table;
pub use flatten::{flatten, infer_schema, Flattener, CIRCULAR_SENTINEL};
pub use types::{FlatRow, FlattenConfig, FlattenResult, Schema};
pub use unflatten::unflatten;
