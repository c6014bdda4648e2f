//! Persisted stations.
//!
//! Provinces, localities and stations written by the loader live in
//! PostgreSQL behind the [`StationStore`] trait. Codes are zero-padded and
//! drawn from the `id_counters` table.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | GET | `/api/stations` | Search loaded stations (`localidad`, `cp`, `provincia`, `tipo`, `limit`) |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use services::{PgStationStore, StationService, StationStore};
