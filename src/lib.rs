// Crate root library declaration and module exports.
pub mod cli;
pub mod config;
pub mod conflict;
pub mod context;
pub mod model;
pub mod occupancy;
pub mod resolver;
pub mod storage;
pub mod store;
pub mod views;
