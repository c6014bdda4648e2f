mod load_handler;

pub use load_handler::*;
