//! Shared core of the device submission form.
//!
//! Everything in this crate is target independent: it is compiled into the
//! wasm frontend and into the actix backend, and it is where the form state
//! machine and the YAML policy live so they can be tested natively.

pub mod form;
pub mod model;
pub mod requests;
pub mod yaml;
