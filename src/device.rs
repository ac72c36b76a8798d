use std::fmt;

/// Which half of a split controller pair (or special variant) a peripheral
/// advertises itself as.
///
/// The side is carried in the manufacturer-data payload of the advertisement,
/// not in the telemetry stream, so it is classified once at discovery time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ControllerSide {
    Left,
    Right,
    GrabController,
    Unknown,
}

impl ControllerSide {
    /// Classifies a manufacturer-data payload by its 6th byte.
    ///
    /// Payloads shorter than 7 bytes carry no side information.
    pub fn from_manufacturer_data(data: &[u8]) -> Self {
        if data.len() < 7 {
            return ControllerSide::Unknown;
        }
        match data[5] {
            0x67 => ControllerSide::Left,
            0x66 => ControllerSide::Right,
            0x73 => ControllerSide::GrabController,
            _ => ControllerSide::Unknown,
        }
    }
}

impl fmt::Display for ControllerSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ControllerSide::Left => "L",
            ControllerSide::Right => "R",
            ControllerSide::GrabController => "GCCon",
            ControllerSide::Unknown => "Unknown",
        })
    }
}
