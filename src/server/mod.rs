pub mod app;
pub mod error;
pub mod extractors;
pub mod routes;
