//! Per-region field normalization.
//!
//! Maps loosely typed source records onto canonical station fields. Each
//! region is described by a static [`models::RegionProfile`] (province
//! aliases, postal prefixes, bounding box, field names, coordinate
//! encodings) and a single [`services::FieldNormalizer`] applies it.

pub mod models;
pub mod services;

pub use services::FieldNormalizer;
