//! Implements functions and structures for interacting with controller peripherals.

use futures::stream::Stream;
use thiserror::Error;
use uuid::Uuid;

use crate::encode::Encode;

pub mod bluetooth;

#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("No bluetooth adapters were found")]
    NoBluetoothAdapter,

    #[error("No controller advertising the expected manufacturer data was found")]
    ControllerNotFound,

    #[error("Transport is not connected")]
    NotConnected,

    #[error("Connecting to the controller failed: {0}")]
    ConnectFailed(#[source] btleplug::Error),

    #[error("Peripheral is missing an expected GATT characteristic: {0}")]
    MissingCharacteristic(Uuid),

    #[error("Command write failed: {0}")]
    WriteFailed(#[source] btleplug::Error),

    #[error("Subscribing to telemetry notifications failed: {0}")]
    SubscribeFailed(#[source] btleplug::Error),

    #[error("Notification stream ended unexpectedly")]
    StreamClosed,

    #[error(transparent)]
    Bluetooth(#[from] btleplug::Error),
}

/// The capability set a [`Session`](crate::session::Session) drives a
/// peripheral link through.
///
/// Backends only need to expose connect, command writes, notification
/// subscription and disconnect; everything above that (activation ordering,
/// settling delays, decoding) lives in the session.
#[allow(async_fn_in_trait)]
pub trait Transport {
    /// Stream of raw notification payloads from the telemetry characteristic.
    type Notifications: Stream<Item = Vec<u8>> + Unpin + Send;

    /// Opens the link to the peripheral.
    async fn connect(&mut self) -> Result<(), ConnectionError>;

    /// Writes one device-bound packet to the command characteristic.
    async fn write_command(&mut self, packet: impl Encode + Send) -> Result<(), ConnectionError>;

    /// Registers for telemetry notifications.
    async fn subscribe(&mut self) -> Result<Self::Notifications, ConnectionError>;

    /// Releases the link. Must be safe to call on a link that never opened.
    async fn disconnect(&mut self) -> Result<(), ConnectionError>;
}
