pub mod loader;
pub mod normalization;
pub mod regions;
pub mod search;
pub mod stations;
