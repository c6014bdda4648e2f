mod load_dto;

pub use load_dto::*;
