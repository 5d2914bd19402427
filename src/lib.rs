pub mod config;
pub mod db;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod models;
pub mod notify;
pub mod routes;
pub mod scrape;
pub mod sites;
pub mod store;
