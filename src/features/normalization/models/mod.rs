mod normalized;
mod profile;

pub use normalized::{CoordinateSource, Coordinates, NormalizedRecord, RecordRejection};
pub use profile::{BoundingBox, CoordinateEncoding, ProvinceRule, RegionProfile};
