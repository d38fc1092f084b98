pub mod auth;
pub mod devices;
