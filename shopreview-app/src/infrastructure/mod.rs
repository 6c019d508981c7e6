pub mod auth;
pub mod memory;
pub mod security;

#[cfg(feature = "server")]
pub mod db;
