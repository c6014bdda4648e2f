mod region_service;
mod source_reader;

pub use region_service::RegionService;
pub use source_reader::SourceReader;
