//! Drives one controller link from establishment through telemetry streaming.

use std::time::Duration;

use log::{debug, error, info, warn};
use tokio_stream::StreamExt;
use tokio_util::sync::CancellationToken;

use crate::connection::{ConnectionError, Transport};
use crate::decode::Decode;
use crate::packets::commands::{EnableReportingPacket, ReportingChannel};
use crate::packets::input::InputReport;

/// Settling period between link establishment and the first write. The
/// controller drops writes issued immediately after connecting.
const STABILIZE_DELAY: Duration = Duration::from_millis(500);

/// Pause after each activation write.
const ACTIVATION_DELAY: Duration = Duration::from_millis(500);

/// Cadence of the keep-alive tick while streaming. Decoding happens on
/// notification arrival, never on the tick.
const IDLE_TICK: Duration = Duration::from_millis(100);

/// Previous pointer position, used to derive per-report motion deltas.
///
/// One tracker exists per session and starts at the origin, so the first
/// report's delta measures from (0, 0). Deltas are plain differences of the
/// signed 16-bit samples; the position can wrap at the i16 boundaries and no
/// wraparound correction is applied.
#[derive(Debug, Default)]
pub struct PointerTracker {
    last_x: i16,
    last_y: i16,
}

impl PointerTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the motion since the previously tracked report and stores this
    /// report's position as the new reference.
    pub fn update(&mut self, report: &InputReport) -> (i32, i32) {
        let delta = (
            report.pointer_x as i32 - self.last_x as i32,
            report.pointer_y as i32 - self.last_y as i32,
        );
        self.last_x = report.pointer_x;
        self.last_y = report.pointer_y;
        delta
    }
}

/// One decoded report together with the pointer motion since the last one.
#[derive(Debug, Clone, Copy)]
pub struct TrackedReport {
    pub report: InputReport,
    /// Pointer movement (x, y) relative to the previous report.
    pub pointer_delta: (i32, i32),
}

/// Takes a freshly discovered controller through the activation handshake and
/// streams its telemetry.
///
/// The sequence is fixed: connect, wait [`STABILIZE_DELAY`], arm both
/// reporting channels [`ACTIVATION_DELAY`] apart, subscribe, then idle while
/// notifications arrive. Every transport failure before streaming is
/// terminal; once streaming, only the transport dropping the stream ends the
/// session early. Undecodable notifications are logged and skipped.
///
/// The transport is released on every exit path, cancellation and errors
/// included.
pub struct Session<T: Transport> {
    transport: T,
    tracker: PointerTracker,
}

impl<T: Transport> Session<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            tracker: PointerTracker::new(),
        }
    }

    /// Runs the session until `cancel` fires or the transport fails, handing
    /// every decoded report to `on_report`.
    pub async fn run<F>(
        mut self,
        cancel: CancellationToken,
        mut on_report: F,
    ) -> Result<(), ConnectionError>
    where
        F: FnMut(TrackedReport),
    {
        let result = self.drive(&cancel, &mut on_report).await;

        // Scoped release: the link is dropped no matter how the drive ended.
        if let Err(e) = self.transport.disconnect().await {
            warn!("Releasing the connection failed: {}", e);
        }

        result
    }

    async fn drive<F>(
        &mut self,
        cancel: &CancellationToken,
        on_report: &mut F,
    ) -> Result<(), ConnectionError>
    where
        F: FnMut(TrackedReport),
    {
        self.transport.connect().await?;
        info!("Connected, waiting for the link to settle...");
        tokio::time::sleep(STABILIZE_DELAY).await;

        for channel in ReportingChannel::ALL {
            debug!("Arming {:?} reporting", channel);
            self.transport
                .write_command(EnableReportingPacket::new(channel))
                .await?;
            tokio::time::sleep(ACTIVATION_DELAY).await;
        }

        let mut notifications = self.transport.subscribe().await?;
        info!("Telemetry subscription active");

        let mut idle = tokio::time::interval(IDLE_TICK);
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("Session cancelled");
                    return Ok(());
                }
                notification = notifications.next() => match notification {
                    Some(raw) => self.handle_notification(&raw, on_report),
                    None => return Err(ConnectionError::StreamClosed),
                },
                _ = idle.tick() => {}
            }
        }
    }

    fn handle_notification<F>(&mut self, raw: &[u8], on_report: &mut F)
    where
        F: FnMut(TrackedReport),
    {
        match InputReport::decode(&mut &raw[..]) {
            Ok(report) => {
                let pointer_delta = self.tracker.update(&report);
                on_report(TrackedReport {
                    report,
                    pointer_delta,
                });
            }
            // A malformed packet must not end the session.
            Err(e) => error!(
                "Discarding undecodable {} byte notification: {} (raw: {:02x?})",
                raw.len(),
                e,
                raw
            ),
        }
    }
}
