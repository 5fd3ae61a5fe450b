pub mod completion;
pub mod config;
pub mod dashboard;
pub mod entities;
pub mod extractor;
pub mod fetcher;
pub mod loader;
pub mod normalizer;
pub mod pipeline;
pub mod repositories;
pub mod storage;
pub mod telemetry;
