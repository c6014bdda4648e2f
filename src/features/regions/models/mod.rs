mod raw_record;
mod region;

pub use raw_record::{field_text, RawRecord};
pub use region::{Region, SourceFormat};
