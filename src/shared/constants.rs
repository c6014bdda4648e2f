/// Width of zero-padded province and locality codes
pub const PROVINCE_CODE_WIDTH: usize = 4;
pub const LOCALITY_CODE_WIDTH: usize = 4;

/// Width of zero-padded station codes
pub const STATION_CODE_WIDTH: usize = 5;

/// Upper bound for `limit` on raw record listings
pub const MAX_RECORDS_LIMIT: u64 = 50_000;

/// Default and maximum number of stations returned by the store search
pub const DEFAULT_STATIONS_LIMIT: i64 = 500;
pub const MAX_STATIONS_LIMIT: i64 = 2_000;

// =============================================================================
// STATION DEFAULTS
// =============================================================================

pub const DEFAULT_SCHEDULE: &str = "Consultar web";
pub const DEFAULT_CONTACT: &str = "N/A";

/// Appointment site used for every Valencian station
pub const CV_BOOKING_URL: &str = "https://www.sitval.com";
