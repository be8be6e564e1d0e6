//! amixer-webui - HTTP control surface for the ALSA mixer.
//!
//! Routes live in [`web`], the listener in [`serve`] and subscriber setup in
//! [`telemetry`]. The mixer model itself is the `mixctl` crate.

pub mod serve;
pub mod telemetry;
pub mod web;

pub use web::{router, ApiError, WebState, SERVER_NAME};
