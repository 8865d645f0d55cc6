use std::ops::{BitOr, BitOrAssign};

use serde::{Deserialize, Serialize};

/// Six-bit mask of velocity channels held fixed during integration.
///
/// Bits 0..3 are the linear axes, bits 3..6 the rotational axes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockedDofs(u8);

impl BlockedDofs {
    pub const NONE: Self = Self(0);
    pub const X: Self = Self(1);
    pub const Y: Self = Self(2);
    pub const Z: Self = Self(4);
    pub const RX: Self = Self(8);
    pub const RY: Self = Self(16);
    pub const RZ: Self = Self(32);
    pub const XYZ: Self = Self(7);
    pub const RXRYRZ: Self = Self(56);
    pub const ALL: Self = Self(63);

    const LINEAR: [Self; 3] = [Self::X, Self::Y, Self::Z];
    const ANGULAR: [Self; 3] = [Self::RX, Self::RY, Self::RZ];

    pub fn from_bits(bits: u8) -> Self {
        Self(bits & Self::ALL.0)
    }

    pub fn bits(self) -> u8 {
        self.0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Whether linear axis `axis` (0 = x, 1 = y, 2 = z) is blocked.
    pub fn linear_blocked(self, axis: usize) -> bool {
        self.contains(Self::LINEAR[axis])
    }

    /// Whether rotational axis `axis` (0 = x, 1 = y, 2 = z) is blocked.
    pub fn angular_blocked(self, axis: usize) -> bool {
        self.contains(Self::ANGULAR[axis])
    }
}

impl BitOr for BlockedDofs {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for BlockedDofs {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}
