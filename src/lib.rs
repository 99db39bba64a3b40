//! Reads NDEF tags for an NFC host app
//!
//! The host owns the screen and the platform NFC adapter, this crate builds the discovery
//! filters it registers, decides when foreground dispatch is held and turns discovered
//! NDEF messages into the strings the screen shows.

pub mod config;
pub mod dispatch;
pub mod event;
pub mod filter;
pub mod logging;

mod ffi;

pub use tapread_ndef as ndef;

uniffi::setup_scaffolding!();
