mod entity_resolver;
mod geocoding_service;
mod load_job_service;
mod station_loader;

pub use entity_resolver::EntityResolver;
pub use geocoding_service::GeocodingService;
pub use load_job_service::LoadJobService;
pub use station_loader::StationLoader;
