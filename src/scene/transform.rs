//! Pivot-based local transforms.
//!
//! A node's local transform is described by nine parameter groups:
//!
//! ```text
//! Local = T · Roff · Rp · Rpre · R · Rpost⁻¹ · Rp⁻¹ · Soff · Sp · S · Sp⁻¹
//! V'    = Q·(S·(V − Sp) + Sp + Soff − Rp) + Rp + Roff + T
//! ```
//!
//! [`LocalTransform::to_trs`] folds the pivots and offsets into a single
//! translation so the result is a plain [`TrsTransform`].

use glam::{Mat4, Quat, Vec3};

/// Euler rotation order of a node's local rotation.
///
/// `Xyz` means the X rotation is applied first (`Rz · Ry · Rx`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RotationOrder {
    #[default]
    Xyz,
    Xzy,
    Yzx,
    Yxz,
    Zxy,
    Zyx,
    /// Evaluated as `Xyz`.
    SphericXyz,
}

impl RotationOrder {
    /// Axis indices in application order.
    #[must_use]
    pub fn axes(self) -> [usize; 3] {
        match self {
            RotationOrder::Xyz | RotationOrder::SphericXyz => [0, 1, 2],
            RotationOrder::Xzy => [0, 2, 1],
            RotationOrder::Yzx => [1, 2, 0],
            RotationOrder::Yxz => [1, 0, 2],
            RotationOrder::Zxy => [2, 0, 1],
            RotationOrder::Zyx => [2, 1, 0],
        }
    }
}

/// Converts Euler angles in degrees to a quaternion, X applied first.
#[must_use]
pub fn euler_degrees_to_quat(degrees: Vec3) -> Quat {
    euler_degrees_to_quat_ordered(degrees, RotationOrder::Xyz)
}

/// Converts Euler angles in degrees to a quaternion with an explicit order.
#[must_use]
pub fn euler_degrees_to_quat_ordered(degrees: Vec3, order: RotationOrder) -> Quat {
    let radians = degrees * (std::f32::consts::PI / 180.0);
    let axis_rotation = |axis: usize| match axis {
        0 => Quat::from_rotation_x(radians.x),
        1 => Quat::from_rotation_y(radians.y),
        _ => Quat::from_rotation_z(radians.z),
    };

    let [first, second, third] = order.axes();
    axis_rotation(third) * axis_rotation(second) * axis_rotation(first)
}

// ============================================================================
// TrsTransform
// ============================================================================

/// Translation / rotation / scale triple.
///
/// Applied to a point as `T · R · S · v`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrsTransform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scaling: Vec3,
}

impl TrsTransform {
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scaling: Vec3::ONE,
    };

    #[must_use]
    pub fn new(translation: Vec3, rotation: Quat, scaling: Vec3) -> Self {
        Self {
            translation,
            rotation,
            scaling,
        }
    }

    /// Exact comparison against the identity, no epsilon.
    #[inline]
    #[must_use]
    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }

    #[inline]
    #[must_use]
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scaling, self.rotation, self.translation)
    }

    #[inline]
    #[must_use]
    pub fn transform_point(&self, v: Vec3) -> Vec3 {
        self.rotation * (v * self.scaling) + self.translation
    }

    /// Transforms a normal, correcting for non-uniform scale with the
    /// cofactor of the scale matrix. The result is unit length unless the
    /// input is zero.
    #[must_use]
    pub fn transform_normal(&self, n: Vec3) -> Vec3 {
        let scaled = if self.scaling == Vec3::ONE {
            n
        } else {
            let s = self.scaling;
            let cofactor = Vec3::new(s.y * s.z, s.x * s.z, s.x * s.y);
            (cofactor * n).normalize_or_zero()
        };

        if self.rotation == Quat::IDENTITY {
            scaled
        } else {
            self.rotation * scaled
        }
    }
}

impl Default for TrsTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

// ============================================================================
// LocalTransform
// ============================================================================

/// The static or sampled pivot parameters of one node.
///
/// Rotations are Euler angles in degrees. `rotation` follows
/// `rotation_order`; pre- and post-rotation are always XYZ.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalTransform {
    pub translation: Vec3,
    pub rotation: Vec3,
    pub scaling: Vec3,

    pub pre_rotation: Vec3,
    pub post_rotation: Vec3,
    pub rotation_offset: Vec3,
    pub rotation_pivot: Vec3,

    pub scaling_offset: Vec3,
    pub scaling_pivot: Vec3,

    pub rotation_order: RotationOrder,
}

impl LocalTransform {
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Vec3::ZERO,
        scaling: Vec3::ONE,
        pre_rotation: Vec3::ZERO,
        post_rotation: Vec3::ZERO,
        rotation_offset: Vec3::ZERO,
        rotation_pivot: Vec3::ZERO,
        scaling_offset: Vec3::ZERO,
        scaling_pivot: Vec3::ZERO,
        rotation_order: RotationOrder::Xyz,
    };

    /// A transform with only translation, rotation and scale set.
    #[must_use]
    pub fn from_trs(translation: Vec3, rotation: Vec3, scaling: Vec3) -> Self {
        Self {
            translation,
            rotation,
            scaling,
            ..Self::IDENTITY
        }
    }

    /// True when every pivot, offset and pre/post rotation is exactly zero.
    #[must_use]
    pub fn has_default_pivots(&self) -> bool {
        self.pre_rotation == Vec3::ZERO
            && self.post_rotation == Vec3::ZERO
            && self.rotation_offset == Vec3::ZERO
            && self.rotation_pivot == Vec3::ZERO
            && self.scaling_offset == Vec3::ZERO
            && self.scaling_pivot == Vec3::ZERO
    }

    /// Exact comparison of every parameter against its default.
    #[must_use]
    pub fn is_identity(&self) -> bool {
        self.translation == Vec3::ZERO
            && self.rotation == Vec3::ZERO
            && self.scaling == Vec3::ONE
            && self.has_default_pivots()
    }

    /// Combined rotation: post-rotation inverse first, then the local
    /// rotation, then pre-rotation.
    #[must_use]
    pub fn combined_rotation(&self) -> Quat {
        let q_pre = euler_degrees_to_quat(self.pre_rotation);
        let q_local = euler_degrees_to_quat_ordered(self.rotation, self.rotation_order);
        let q_post_inv = euler_degrees_to_quat(self.post_rotation).inverse();

        (q_pre * q_local * q_post_inv).normalize()
    }

    /// Folds the pivot chain into an equivalent TRS triple.
    #[must_use]
    pub fn to_trs(&self) -> TrsTransform {
        let rotation = self.combined_rotation();

        let t1 = self.scaling_pivot - self.scaling * self.scaling_pivot + self.scaling_offset
            - self.rotation_pivot;
        let t2 = self.rotation_pivot + self.rotation_offset + self.translation;

        TrsTransform {
            translation: rotation * t1 + t2,
            rotation,
            scaling: self.scaling,
        }
    }

    #[inline]
    #[must_use]
    pub fn to_matrix(&self) -> Mat4 {
        self.to_trs().to_matrix()
    }

    /// Applies the pivot formula term by term, without folding.
    #[must_use]
    pub fn transform_point_by_pivots(&self, v: Vec3) -> Vec3 {
        let q = self.combined_rotation();
        let scaled = self.scaling * (v - self.scaling_pivot) + self.scaling_pivot + self.scaling_offset;
        q * (scaled - self.rotation_pivot) + self.rotation_pivot + self.rotation_offset + self.translation
    }

    /// Multiplies every length-valued parameter by `factor`.
    pub fn scale_lengths(&mut self, factor: f32) {
        self.translation *= factor;
        self.rotation_offset *= factor;
        self.rotation_pivot *= factor;
        self.scaling_offset *= factor;
        self.scaling_pivot *= factor;
    }
}

impl Default for LocalTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}
