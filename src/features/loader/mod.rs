//! Loading stations into the database.
//!
//! A load job reads a region's source, normalizes every record and writes
//! provinces, localities and stations in batched transactions. Rejected and
//! duplicate records are skipped and reported per source.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | POST | `/load` | Load `sources` (all when empty), optionally `clear_before` |
//! | POST | `/clear` | Delete all stations, localities and provinces |
//! | POST | `/api/load` | Load an uploaded file (`archivo`) for a region (`fuente`) |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use services::{GeocodingService, LoadJobService, StationLoader};
