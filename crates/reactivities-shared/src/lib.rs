//! # reactivities-shared
//!
//! Domain types shared by the activity store and its remote clients: the
//! in-memory [`Activity`] model, its JSON wire form, and the error types
//! produced while converting between the two or talking to the backend.

pub mod error;
pub mod models;
pub mod wire;

pub use error::{RemoteError, WireError};
pub use models::*;
pub use wire::{ActivityWire, AttendeeWire};
