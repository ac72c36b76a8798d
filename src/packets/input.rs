use crate::decode::{Decode, DecodeError};
use crate::packets::buttons::Buttons;

/// Minimum length of a telemetry notification. Shorter buffers never decode.
pub const INPUT_REPORT_LEN: usize = 0x3E;

/// An analog stick sample, unpacked from the packed 12+12-bit wire field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StickPosition {
    pub x: u16,
    pub y: u16,
}

impl StickPosition {
    /// Unpacks a 3-byte little-endian field into two 12-bit axes.
    pub fn unpack(raw: [u8; 3]) -> Self {
        let packed = u32::from_le_bytes([raw[0], raw[1], raw[2], 0]);
        Self {
            x: (packed & 0xFFF) as u16,
            y: ((packed >> 12) & 0xFFF) as u16,
        }
    }
}

impl Decode for StickPosition {
    fn decode(data: &mut &[u8]) -> Result<Self, DecodeError> {
        let raw: [u8; 3] = Decode::decode(data)?;
        Ok(Self::unpack(raw))
    }
}

/// One three-axis sensor sample (magnetometer, accelerometer or gyroscope).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SensorAxes {
    pub x: i16,
    pub y: i16,
    pub z: i16,
}

impl Decode for SensorAxes {
    fn decode(data: &mut &[u8]) -> Result<Self, DecodeError> {
        Ok(Self {
            x: i16::decode(data)?,
            y: i16::decode(data)?,
            z: i16::decode(data)?,
        })
    }
}

/// One decoded telemetry notification.
///
/// All multi-byte fields are little-endian. The layout is fixed; regions the
/// controller leaves unused are skipped during decoding. Trailing bytes past
/// offset 0x3D are ignored, which allows the 63- and 64-byte notification
/// variants seen in the wild to decode identically.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InputReport {
    /// 24-bit rolling packet counter.
    pub packet_id: u32,
    pub buttons: Buttons,
    pub left_stick: StickPosition,
    pub right_stick: StickPosition,
    /// Optical pointer sensor, absolute position.
    pub pointer_x: i16,
    pub pointer_y: i16,
    pub pointer_unknown: i16,
    /// Surface distance reported by the pointer sensor.
    pub pointer_distance: i16,
    pub magnetometer: SensorAxes,
    /// Battery voltage, 1000 units per volt.
    pub battery_voltage_raw: u16,
    /// Battery current, 100 units per milliamp. Negative while discharging.
    pub battery_current_raw: i16,
    pub temperature_raw: i16,
    pub accelerometer: SensorAxes,
    pub gyroscope: SensorAxes,
    pub trigger_left: u8,
    pub trigger_right: u8,
}

impl InputReport {
    /// Battery voltage in volts.
    pub fn battery_voltage(&self) -> f64 {
        self.battery_voltage_raw as f64 / 1000.0
    }

    /// Battery current in milliamps.
    pub fn battery_current(&self) -> f64 {
        self.battery_current_raw as f64 / 100.0
    }

    /// Controller temperature in degrees Celsius.
    pub fn temperature(&self) -> f64 {
        25.0 + self.temperature_raw as f64 / 127.0
    }
}

impl Decode for InputReport {
    fn decode(data: &mut &[u8]) -> Result<Self, DecodeError> {
        // 0x00
        let packet_id: [u8; 3] = Decode::decode(data)?;
        let packet_id = u32::from_le_bytes([packet_id[0], packet_id[1], packet_id[2], 0]);
        // 0x03
        let buttons = Buttons::from_bits_retain(u32::decode(data)?);
        // 0x07..0x0A unused
        let _: [u8; 3] = Decode::decode(data)?;
        // 0x0A
        let left_stick = StickPosition::decode(data)?;
        // 0x0D
        let right_stick = StickPosition::decode(data)?;
        // 0x10
        let pointer_x = i16::decode(data)?;
        let pointer_y = i16::decode(data)?;
        let pointer_unknown = i16::decode(data)?;
        let pointer_distance = i16::decode(data)?;
        // 0x18
        let magnetometer = SensorAxes::decode(data)?;
        // 0x1E unused
        let _: u8 = u8::decode(data)?;
        // 0x1F
        let battery_voltage_raw = u16::decode(data)?;
        // 0x21..0x28 unused
        let _: [u8; 7] = Decode::decode(data)?;
        // 0x28
        let battery_current_raw = i16::decode(data)?;
        // 0x2A..0x2E unused
        let _: [u8; 4] = Decode::decode(data)?;
        // 0x2E
        let temperature_raw = i16::decode(data)?;
        // 0x30
        let accelerometer = SensorAxes::decode(data)?;
        // 0x36
        let gyroscope = SensorAxes::decode(data)?;
        // 0x3C
        let trigger_left = u8::decode(data)?;
        let trigger_right = u8::decode(data)?;

        Ok(Self {
            packet_id,
            buttons,
            left_stick,
            right_stick,
            pointer_x,
            pointer_y,
            pointer_unknown,
            pointer_distance,
            magnetometer,
            battery_voltage_raw,
            battery_current_raw,
            temperature_raw,
            accelerometer,
            gyroscope,
            trigger_left,
            trigger_right,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{InputReport, StickPosition, INPUT_REPORT_LEN};
    use crate::decode::{Decode, DecodeError};
    use crate::packets::buttons::Buttons;

    fn write_u16(buf: &mut [u8], offset: usize, value: u16) {
        buf[offset..offset + 2].copy_from_slice(&value.to_le_bytes());
    }

    fn write_i16(buf: &mut [u8], offset: usize, value: i16) {
        buf[offset..offset + 2].copy_from_slice(&value.to_le_bytes());
    }

    fn sample_notification() -> [u8; 64] {
        let mut buf = [0u8; 64];
        buf[0x00..0x03].copy_from_slice(&[0x39, 0x05, 0x00]); // packet id 1337
        buf[0x03..0x07].copy_from_slice(&0x0008_0000u32.to_le_bytes()); // LS pressed
        buf[0x0A..0x0D].copy_from_slice(&[0xBC, 0x3A, 0x12]); // left stick (0xABC, 0x123)
        buf[0x0D..0x10].copy_from_slice(&[0xFF, 0xFF, 0xFF]); // right stick maxed
        write_i16(&mut buf, 0x10, 10); // pointer x
        write_i16(&mut buf, 0x12, -5); // pointer y
        write_i16(&mut buf, 0x14, 3);
        write_i16(&mut buf, 0x16, 120);
        write_i16(&mut buf, 0x18, -100); // mag x
        write_i16(&mut buf, 0x1A, 200); // mag y
        write_i16(&mut buf, 0x1C, -300); // mag z
        write_u16(&mut buf, 0x1F, 4200); // 4.2 V
        write_i16(&mut buf, 0x28, -150); // -1.5 mA
        write_i16(&mut buf, 0x2E, 0); // 25 °C
        write_i16(&mut buf, 0x30, 1);
        write_i16(&mut buf, 0x32, 2);
        write_i16(&mut buf, 0x34, 3);
        write_i16(&mut buf, 0x36, -1);
        write_i16(&mut buf, 0x38, -2);
        write_i16(&mut buf, 0x3A, -3);
        buf[0x3C] = 0x55; // trigger L
        buf[0x3D] = 0xAA; // trigger R
        buf
    }

    #[test]
    fn decodes_a_full_notification() {
        let buf = sample_notification();
        let report = InputReport::decode(&mut &buf[..]).unwrap();

        assert_eq!(report.packet_id, 1337);
        assert_eq!(report.buttons, Buttons::LEFT_STICK);
        assert_eq!(report.buttons.pressed_labels(), vec!["LS"]);
        assert_eq!(report.left_stick, StickPosition { x: 0xABC, y: 0x123 });
        assert_eq!(report.right_stick, StickPosition { x: 0xFFF, y: 0xFFF });
        assert_eq!(report.pointer_x, 10);
        assert_eq!(report.pointer_y, -5);
        assert_eq!(report.pointer_unknown, 3);
        assert_eq!(report.pointer_distance, 120);
        assert_eq!((report.magnetometer.x, report.magnetometer.y), (-100, 200));
        assert_eq!(report.magnetometer.z, -300);
        assert_eq!(report.battery_voltage_raw, 4200);
        assert_eq!(report.battery_current_raw, -150);
        assert_eq!(
            (report.accelerometer.x, report.accelerometer.y, report.accelerometer.z),
            (1, 2, 3)
        );
        assert_eq!(
            (report.gyroscope.x, report.gyroscope.y, report.gyroscope.z),
            (-1, -2, -3)
        );
        assert_eq!(report.trigger_left, 0x55);
        assert_eq!(report.trigger_right, 0xAA);
    }

    #[test]
    fn derived_units_are_linear() {
        let buf = sample_notification();
        let report = InputReport::decode(&mut &buf[..]).unwrap();

        assert_eq!(report.battery_voltage(), 4.2);
        assert_eq!(report.battery_current(), -1.5);
        assert_eq!(report.temperature(), 25.0);
    }

    #[test]
    fn short_buffers_are_rejected() {
        for len in 0..INPUT_REPORT_LEN {
            let buf = vec![0u8; len];
            assert_eq!(
                InputReport::decode(&mut &buf[..]),
                Err(DecodeError::UnexpectedEnd),
                "a {len}-byte buffer must not decode"
            );
        }
    }

    #[test]
    fn exact_length_buffer_decodes() {
        let buf = sample_notification();
        assert!(InputReport::decode(&mut &buf[..INPUT_REPORT_LEN]).is_ok());
    }

    #[test]
    fn stick_unpacking_round_trips() {
        for &(x, y) in &[(0u16, 0u16), (0xFFF, 0xFFF), (0x800, 0x7FF), (1, 2)] {
            let packed = ((y as u32) << 12) | x as u32;
            let raw = [
                (packed & 0xFF) as u8,
                ((packed >> 8) & 0xFF) as u8,
                ((packed >> 16) & 0xFF) as u8,
            ];
            assert_eq!(StickPosition::unpack(raw), StickPosition { x, y });
        }
    }
}
