//! Crate for interacting with Joy-Con 2 wireless controllers over Bluetooth LE.
//!
//! This crate is structured around two key traits: [`Encode`](encode::Encode) and [`Decode`](decode::Decode).
//! Device-bound command packets implement [`Encode`](encode::Encode), and the telemetry
//! notification layout decodes into an [`InputReport`](packets::input::InputReport).
//!
//! Because manually driving discovery, activation and subscription is a chore, the crate
//! also provides a [`Session`](session::Session) controller. A session takes a discovered
//! controller through the fixed activation handshake, subscribes to its telemetry stream
//! and hands every decoded report to the caller until it is cancelled.

pub mod decode;
pub mod device;
pub mod encode;
pub mod packets;

#[cfg(feature = "bluetooth")]
pub mod connection;
#[cfg(feature = "bluetooth")]
pub mod session;
