use crate::encode::Encode;

/// Telemetry subsystems armed during activation.
///
/// The controller emits nothing until both subsystems have been enabled, so a
/// session always writes one [`EnableReportingPacket`] per channel, in
/// declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ReportingChannel {
    /// Buttons, sticks and triggers.
    StandardInput = 0x02,
    /// Motion, magnetometer, battery and pointer data.
    ExtendedSensors = 0x04,
}

impl ReportingChannel {
    /// Both channels, in the order they must be armed.
    pub const ALL: [ReportingChannel; 2] = [
        ReportingChannel::StandardInput,
        ReportingChannel::ExtendedSensors,
    ];
}

/// Device-bound packet that arms one telemetry subsystem.
///
/// The payload is fixed apart from the channel opcode:
/// `0c 91 01 <channel> 00 04 00 00 ff 00 00 00`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnableReportingPacket {
    channel: ReportingChannel,
}

impl EnableReportingPacket {
    pub const fn new(channel: ReportingChannel) -> Self {
        Self { channel }
    }
}

impl Encode for EnableReportingPacket {
    fn encode(&self) -> Vec<u8> {
        vec![
            0x0C,
            0x91,
            0x01,
            self.channel as u8,
            0x00,
            0x04,
            0x00,
            0x00,
            0xFF,
            0x00,
            0x00,
            0x00,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::{EnableReportingPacket, ReportingChannel};
    use crate::encode::Encode;

    #[test]
    fn activation_commands_are_bit_exact() {
        assert_eq!(
            EnableReportingPacket::new(ReportingChannel::StandardInput).encode(),
            [0x0C, 0x91, 0x01, 0x02, 0x00, 0x04, 0x00, 0x00, 0xFF, 0x00, 0x00, 0x00]
        );
        assert_eq!(
            EnableReportingPacket::new(ReportingChannel::ExtendedSensors).encode(),
            [0x0C, 0x91, 0x01, 0x04, 0x00, 0x04, 0x00, 0x00, 0xFF, 0x00, 0x00, 0x00]
        );
    }

    #[test]
    fn channels_are_armed_in_order() {
        assert_eq!(
            ReportingChannel::ALL,
            [
                ReportingChannel::StandardInput,
                ReportingChannel::ExtendedSensors
            ]
        );
    }
}
