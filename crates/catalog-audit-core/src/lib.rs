pub mod aggregate;
pub mod audit;
pub mod candidate;
pub mod config;
pub mod dedup;
pub mod errors;
pub mod ingest;
pub mod judge;
pub mod model;
pub mod normalize;
pub mod providers;
pub mod report;
pub mod verdict;
