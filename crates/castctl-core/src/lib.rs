//! Broadcast control core: schedule derivation, override merge, action
//! vocabulary and the flag-file store behind the control endpoint.

pub mod action;
pub mod book;
pub mod camera;
pub mod config;
pub mod display;
pub mod error;
pub mod io;
pub mod paths;
pub mod schedule;
pub mod session;
pub mod snapshot;
pub mod store;
pub mod types;

pub use error::{CastError, Result};
