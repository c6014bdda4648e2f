mod aggregator_service;

pub use aggregator_service::AggregatorService;
