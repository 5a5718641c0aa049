/// Length unit of a scene, expressed in centimetres.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SystemUnit {
    pub scale_factor: f32,
    pub multiplier: f32,
}

impl SystemUnit {
    pub const CM: Self = Self::new(1.0, 1.0);
    pub const DM: Self = Self::new(10.0, 1.0);
    pub const M: Self = Self::new(100.0, 1.0);

    #[must_use]
    pub const fn new(scale_factor: f32, multiplier: f32) -> Self {
        Self {
            scale_factor,
            multiplier,
        }
    }

    /// The unit after every length has been multiplied by `factor`.
    #[must_use]
    pub fn rescaled(self, factor: f32) -> Self {
        Self::new(self.scale_factor / factor, self.multiplier)
    }
}

impl Default for SystemUnit {
    fn default() -> Self {
        Self::CM
    }
}
