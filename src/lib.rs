pub mod config;
pub mod controllers;
pub mod db;
pub mod errors;
pub mod gateways;
pub mod models;
pub mod notify;
pub mod scope;
pub mod services;
pub mod session;
pub mod shell;
pub mod state;

#[cfg(test)]
pub(crate) mod testing;
