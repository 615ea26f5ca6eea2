pub mod api;
pub mod catalog;
pub mod config;
pub mod db;
pub mod error;
pub mod gateway;
pub mod metrics;
pub mod models;
pub mod reconcile;
pub mod service;
pub mod store;
pub mod validate;
