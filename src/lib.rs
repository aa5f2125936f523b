// Library for tests to access modules

pub mod collector;
pub mod config;
pub mod error;
pub mod exporter;
pub mod host_query;
pub mod metric_mapper;
pub mod routes;
pub mod stats_parser;
pub mod version;
