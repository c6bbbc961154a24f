//! Metrics bundle model
//!
//! Analyzers produce loosely-typed key/value output. This module holds the
//! merged bundle, the ordered lookup across analyzer sections, and the single
//! numeric coercion gate used by every score computation.

pub mod bundle;
pub mod lookup;
pub mod synonyms;

pub use bundle::MetricsBundle;
pub use lookup::{find_bool, find_metric, find_numeric, numeric, ANALYZER_SECTIONS};
