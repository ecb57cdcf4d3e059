pub mod client;
pub mod components;
pub mod config;
pub mod db;
pub mod models;
pub mod server;

#[cfg(test)]
mod testing;
