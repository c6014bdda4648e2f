pub mod coordinates;
pub mod dedup;
pub mod field_normalizer;
pub mod municipalities;
pub mod postal;
pub mod province;
pub mod station_type;

pub use dedup::{station_description, DuplicateTracker, StationNamer};
pub use field_normalizer::FieldNormalizer;
