//! Unit types: Dp, Sp, and the density used to resolve them

/// Density-independent pixels
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
pub struct Dp(pub f32);

impl Dp {
    pub fn to_px(&self, density: Density) -> f32 {
        self.0 * density.scale
    }
}

/// Scale-independent pixels
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
pub struct Sp(pub f32);

impl Sp {
    pub fn to_px(&self, density: Density) -> f32 {
        self.0 * density.scale * density.font_scale
    }
}

/// Screen density the host reports. Defaults to one pixel per dp.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Density {
    pub scale: f32,
    pub font_scale: f32,
}

impl Density {
    pub const fn new(scale: f32) -> Self {
        Self {
            scale,
            font_scale: 1.0,
        }
    }

    pub fn dp(&self, value: f32) -> f32 {
        Dp(value).to_px(*self)
    }

    pub fn sp(&self, value: f32) -> f32 {
        Sp(value).to_px(*self)
    }
}

impl Default for Density {
    fn default() -> Self {
        Self::new(1.0)
    }
}
