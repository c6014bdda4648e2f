mod station_service;
mod station_store;

pub use station_service::StationService;
pub use station_store::{PgStationStore, StationStore, WriteBatch};
#[cfg(test)]
pub use station_store::format_code;
