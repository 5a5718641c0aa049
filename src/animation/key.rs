//! Keyframes and their packed mode flags.
//!
//! The flag word keeps the source container's exact bit layout so a key can
//! be written back unchanged. Only the interpolation sub-field is read by the
//! sampler; the rest is carried for round-tripping.

use bitflags::bitflags;

use crate::animation::time::{TICKS_PER_SECOND, Ticks};

bitflags! {
    /// Raw key flag word.
    ///
    /// Sub-fields are addressed through the `MASK_*` constants. Unknown bits
    /// are retained.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct KeyFlags: u32 {
        const INTERPOLATION_CONSTANT = 0x0000_0002;
        const INTERPOLATION_LINEAR = 0x0000_0004;
        const INTERPOLATION_CUBIC = 0x0000_0008;

        const TANGENT_AUTO = 0x0000_0100;
        const TANGENT_TCB = 0x0000_0200;
        const TANGENT_USER = 0x0000_0400;
        const TANGENT_GENERIC_BREAK = 0x0000_0800;
        const TANGENT_GENERIC_CLAMP = 0x0000_1000;
        const TANGENT_GENERIC_TIME_INDEPENDENT = 0x0000_2000;
        const TANGENT_GENERIC_CLAMP_PROGRESSIVE = 0x0000_4000 | 0x0000_2000;

        const VISIBILITY_LEFT = 0x0010_0000;
        const VISIBILITY_RIGHT = 0x0020_0000;

        const WEIGHTED_RIGHT = 0x0100_0000;
        const WEIGHTED_NEXT_LEFT = 0x0200_0000;

        const VELOCITY_RIGHT = 0x1000_0000;
        const VELOCITY_NEXT_LEFT = 0x2000_0000;

        const _ = !0;
    }
}

impl KeyFlags {
    pub const MASK_INTERPOLATION: u32 = 0x0000_000F;
    pub const MASK_TANGENT_MODE: u32 = 0x0000_FF00;
    /// Overlaps the low byte of the tangent mode field.
    pub const MASK_CONSTANT_MODE: u32 = 0x0000_0100;
    pub const MASK_TANGENT_VISIBILITY: u32 = 0x00F0_0000;
    pub const MASK_WEIGHTED_MODE: u32 = 0x0F00_0000;
    pub const MASK_VELOCITY_MODE: u32 = 0xF000_0000;

    #[inline]
    fn field(self, mask: u32) -> u32 {
        self.bits() & mask
    }

    #[inline]
    fn set_field(&mut self, mask: u32, value: u32) {
        *self = Self::from_bits_retain((self.bits() & !mask) | (value & mask));
    }

    #[must_use]
    pub fn interpolation(self) -> Option<Interpolation> {
        match self.field(Self::MASK_INTERPOLATION) {
            0x2 => Some(Interpolation::Constant),
            0x4 => Some(Interpolation::Linear),
            0x8 => Some(Interpolation::Cubic),
            _ => None,
        }
    }

    pub fn set_interpolation(&mut self, value: Interpolation) {
        self.set_field(Self::MASK_INTERPOLATION, value as u32);
    }

    #[must_use]
    pub fn tangent_mode(self) -> Option<TangentMode> {
        let bits = self.field(Self::MASK_TANGENT_MODE);
        TangentMode::ALL.into_iter().find(|mode| *mode as u32 == bits)
    }

    pub fn set_tangent_mode(&mut self, value: TangentMode) {
        self.set_field(Self::MASK_TANGENT_MODE, value as u32);
    }

    #[must_use]
    pub fn constant_mode(self) -> ConstantMode {
        if self.field(Self::MASK_CONSTANT_MODE) == 0 {
            ConstantMode::Standard
        } else {
            ConstantMode::Next
        }
    }

    pub fn set_constant_mode(&mut self, value: ConstantMode) {
        self.set_field(Self::MASK_CONSTANT_MODE, value as u32);
    }

    #[must_use]
    pub fn weighted_mode(self) -> SideMode {
        SideMode::from_pair(self.contains(Self::WEIGHTED_RIGHT), self.contains(Self::WEIGHTED_NEXT_LEFT))
    }

    pub fn set_weighted_mode(&mut self, value: SideMode) {
        let (right, left) = value.pair();
        self.set(Self::WEIGHTED_RIGHT, right);
        self.set(Self::WEIGHTED_NEXT_LEFT, left);
    }

    #[must_use]
    pub fn velocity_mode(self) -> SideMode {
        SideMode::from_pair(self.contains(Self::VELOCITY_RIGHT), self.contains(Self::VELOCITY_NEXT_LEFT))
    }

    pub fn set_velocity_mode(&mut self, value: SideMode) {
        let (right, left) = value.pair();
        self.set(Self::VELOCITY_RIGHT, right);
        self.set(Self::VELOCITY_NEXT_LEFT, left);
    }

    #[must_use]
    pub fn tangent_visibility(self) -> TangentVisibility {
        match (self.contains(Self::VISIBILITY_LEFT), self.contains(Self::VISIBILITY_RIGHT)) {
            (false, false) => TangentVisibility::None,
            (true, false) => TangentVisibility::Left,
            (false, true) => TangentVisibility::Right,
            (true, true) => TangentVisibility::Both,
        }
    }

    pub fn set_tangent_visibility(&mut self, value: TangentVisibility) {
        self.set_field(Self::MASK_TANGENT_VISIBILITY, value as u32);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum Interpolation {
    /// Constant value until the next key.
    Constant = 0x0000_0002,
    Linear = 0x0000_0004,
    /// Stored but evaluated as linear.
    Cubic = 0x0000_0008,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum TangentMode {
    Auto = 0x0000_0100,
    Tcb = 0x0000_0200,
    User = 0x0000_0400,
    GenericBreak = 0x0000_0800,
    Break = 0x0000_0800 | 0x0000_0400,
    AutoBreak = 0x0000_0800 | 0x0000_0100,
    GenericClamp = 0x0000_1000,
    GenericTimeIndependent = 0x0000_2000,
    GenericClampProgressive = 0x0000_4000 | 0x0000_2000,
}

impl TangentMode {
    const ALL: [TangentMode; 9] = [
        TangentMode::Auto,
        TangentMode::Tcb,
        TangentMode::User,
        TangentMode::GenericBreak,
        TangentMode::Break,
        TangentMode::AutoBreak,
        TangentMode::GenericClamp,
        TangentMode::GenericTimeIndependent,
        TangentMode::GenericClampProgressive,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum ConstantMode {
    Standard = 0x0000_0000,
    /// Hold the next key's value.
    Next = 0x0000_0100,
}

/// Which tangents of a key carry weights or velocity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SideMode {
    #[default]
    None,
    Right,
    NextLeft,
    All,
}

impl SideMode {
    fn from_pair(right: bool, next_left: bool) -> Self {
        match (right, next_left) {
            (false, false) => SideMode::None,
            (true, false) => SideMode::Right,
            (false, true) => SideMode::NextLeft,
            (true, true) => SideMode::All,
        }
    }

    fn pair(self) -> (bool, bool) {
        match self {
            SideMode::None => (false, false),
            SideMode::Right => (true, false),
            SideMode::NextLeft => (false, true),
            SideMode::All => (true, true),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum TangentVisibility {
    None = 0x0000_0000,
    Left = 0x0010_0000,
    Right = 0x0020_0000,
    Both = 0x0030_0000,
}

/// Index into [`AnimCurveKey::data`]. Meaning depends on the tangent mode;
/// TCB keys reuse slots 0..3 for tension, continuity and bias.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataIndex {
    RightSlope = 0,
    NextLeftSlope = 1,
    RightWeight = 2,
    NextLeftWeight = 3,
    RightVelocity = 4,
    NextLeftVelocity = 5,
}

impl DataIndex {
    pub const TCB_TENSION: usize = 0;
    pub const TCB_CONTINUITY: usize = 1;
    pub const TCB_BIAS: usize = 2;
}

pub const DEFAULT_WEIGHT: f32 = 1.0 / 3.0;
pub const MIN_WEIGHT: f32 = 1e-4;
pub const MAX_WEIGHT: f32 = 0.99;
pub const DEFAULT_VELOCITY: f32 = 0.0;

/// One keyframe of a scalar curve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimCurveKey {
    pub time: Ticks,
    pub value: f32,
    pub flags: KeyFlags,
    /// Tangent slopes, weights and velocities.
    pub data: [f32; 6],
}

impl AnimCurveKey {
    #[must_use]
    pub fn new(time: Ticks, value: f32) -> Self {
        Self {
            time,
            value,
            flags: KeyFlags::INTERPOLATION_LINEAR,
            data: [0.0; 6],
        }
    }

    #[must_use]
    pub fn with_flags(time: Ticks, value: f32, flags: KeyFlags, data: [f32; 6]) -> Self {
        Self {
            time,
            value,
            flags,
            data,
        }
    }

    #[inline]
    #[must_use]
    pub fn data_float(&self, index: DataIndex) -> f32 {
        self.data[index as usize]
    }

    #[inline]
    pub fn set_data_float(&mut self, index: DataIndex, value: f32) {
        self.data[index as usize] = value;
    }

    /// Key time in seconds.
    #[must_use]
    pub fn seconds(&self) -> f64 {
        self.time as f64 / TICKS_PER_SECOND as f64
    }
}
