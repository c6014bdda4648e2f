//! Regional station sources.
//!
//! Each region publishes its inspection stations in its own format: an XML
//! export for Catalonia, a `;` separated CSV for Galicia and a JSON array for
//! the Valencian Community. This feature reads those files and serves them
//! both raw and normalized at query time.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | GET | `/health` | Service status and source file availability |
//! | GET | `/{region}/records` | Raw records as read (`limit` 1-50000) |
//! | GET | `/api/search/{region}` | Normalized stations filtered by `localidad`, `tipo`, `cp`, `provincia` |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use services::{RegionService, SourceReader};
