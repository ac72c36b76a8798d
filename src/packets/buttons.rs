use bitflags::bitflags;

bitflags! {
    /// The 32-bit button field of an input report.
    ///
    /// One bit per physical button, covering both halves of a split pair. The
    /// `SL`/`SR` rail buttons exist independently on each half, so they get
    /// separate bits.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct Buttons: u32 {
        const Y = 0x0000_0100;
        const X = 0x0000_0200;
        const B = 0x0000_0400;
        const A = 0x0000_0800;
        const SR_RIGHT = 0x0000_1000;
        const SL_RIGHT = 0x0000_2000;
        const R = 0x0000_4000;
        const ZR = 0x0000_8000;
        const SELECT = 0x0001_0000;
        const START = 0x0002_0000;
        const RIGHT_STICK = 0x0004_0000;
        const LEFT_STICK = 0x0008_0000;
        const HOME = 0x0010_0000;
        const CAMERA = 0x0020_0000;
        const CHAT = 0x0040_0000;
        const DPAD_DOWN = 0x0100_0000;
        const DPAD_UP = 0x0200_0000;
        const DPAD_RIGHT = 0x0400_0000;
        const DPAD_LEFT = 0x0800_0000;
        const SR_LEFT = 0x1000_0000;
        const SL_LEFT = 0x2000_0000;
        const L = 0x4000_0000;
        const ZL = 0x8000_0000;
    }
}

/// Display labels for every button bit, in the order reports are printed.
pub const BUTTON_LABELS: [(Buttons, &str); 23] = [
    (Buttons::ZL, "ZL"),
    (Buttons::L, "L"),
    (Buttons::SELECT, "SELECT"),
    (Buttons::LEFT_STICK, "LS"),
    (Buttons::DPAD_DOWN, "↓"),
    (Buttons::DPAD_UP, "↑"),
    (Buttons::DPAD_RIGHT, "→"),
    (Buttons::DPAD_LEFT, "←"),
    (Buttons::CAMERA, "CAMERA"),
    (Buttons::SR_LEFT, "SR(L)"),
    (Buttons::SL_LEFT, "SL(L)"),
    (Buttons::HOME, "HOME"),
    (Buttons::CHAT, "CHAT"),
    (Buttons::START, "START"),
    (Buttons::SR_RIGHT, "SR(R)"),
    (Buttons::SL_RIGHT, "SL(R)"),
    (Buttons::R, "R"),
    (Buttons::ZR, "ZR"),
    (Buttons::RIGHT_STICK, "RS"),
    (Buttons::Y, "Y"),
    (Buttons::X, "X"),
    (Buttons::B, "B"),
    (Buttons::A, "A"),
];

impl Buttons {
    /// Collects the labels of every pressed button, in [`BUTTON_LABELS`] order.
    pub fn pressed_labels(self) -> Vec<&'static str> {
        BUTTON_LABELS
            .iter()
            .filter(|(button, _)| self.contains(*button))
            .map(|(_, label)| *label)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::{Buttons, BUTTON_LABELS};

    #[test]
    fn labels_cover_every_bit_exactly_once() {
        let mut seen = Buttons::empty();
        for (button, _) in BUTTON_LABELS {
            assert!(!seen.intersects(button), "{button:?} listed twice");
            seen |= button;
        }
        assert_eq!(seen, Buttons::all());
    }

    #[test]
    fn pressed_labels_match_the_mask() {
        let buttons = Buttons::from_bits_retain(0x0008_0000);
        assert_eq!(buttons.pressed_labels(), vec!["LS"]);

        let buttons = Buttons::A | Buttons::ZL | Buttons::DPAD_UP;
        assert_eq!(buttons.pressed_labels(), vec!["ZL", "↑", "A"]);

        assert!(Buttons::empty().pressed_labels().is_empty());
    }

    #[test]
    fn probe_order_does_not_change_the_set() {
        let mask = Buttons::L | Buttons::R | Buttons::HOME | Buttons::SL_RIGHT;

        let mut reversed: Vec<&str> = BUTTON_LABELS
            .iter()
            .rev()
            .filter(|(button, _)| mask.contains(*button))
            .map(|(_, label)| *label)
            .collect();
        reversed.sort_unstable();

        let mut forward = mask.pressed_labels();
        forward.sort_unstable();

        assert_eq!(forward, reversed);
    }
}
