mod station;

pub use station::{
    EntityKind, Locality, NewStation, Province, StationFilter, StationType, StationWithPlace,
};
