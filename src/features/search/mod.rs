//! Aggregate search over every region service.
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | GET | `/api/search` | Same filters as `/api/search/{region}`, merged across regions |

pub mod dtos;
pub mod handlers;
pub mod routes;
pub mod services;

pub use services::AggregatorService;
