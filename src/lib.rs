pub mod catalog;
pub mod cli;
pub mod clock;
pub mod config;
pub mod error;
pub mod models;
pub mod notify;
pub mod services;
pub mod state;
pub mod storage;
