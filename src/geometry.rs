//! 2-D affine transform and rectangle math for the software blitter

/// Axis-aligned rectangle in destination-surface coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// Center truncated to whole pixels, matching the integer rounding the
    /// rotation pivot uses
    pub fn center_trunc(&self) -> (f32, f32) {
        (
            (self.x + self.w / 2.0).trunc(),
            (self.y + self.h / 2.0).trunc(),
        )
    }

    /// The four corners in clockwise order starting at the top-left
    pub fn corners(&self) -> [(f32, f32); 4] {
        [
            (self.x, self.y),
            (self.x + self.w, self.y),
            (self.x + self.w, self.y + self.h),
            (self.x, self.y + self.h),
        ]
    }

    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x && x < self.x + self.w && y >= self.y && y < self.y + self.h
    }
}

/// 2-D affine transform using the row-vector convention:
/// `(x', y') = (x, y) * M + (dx, dy)`
///
/// Transforms are plain values. Draw calls take one explicitly instead of
/// mutating surface-wide state, so there is nothing to reset afterwards.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform2D {
    pub m11: f32,
    pub m12: f32,
    pub m21: f32,
    pub m22: f32,
    pub dx: f32,
    pub dy: f32,
}

impl Transform2D {
    pub const IDENTITY: Self = Self {
        m11: 1.0,
        m12: 0.0,
        m21: 0.0,
        m22: 1.0,
        dx: 0.0,
        dy: 0.0,
    };

    pub fn translation(dx: f32, dy: f32) -> Self {
        Self {
            dx,
            dy,
            ..Self::IDENTITY
        }
    }

    /// Rotation about the origin, clockwise in screen coordinates (y-down)
    pub fn rotation_deg(angle_deg: f32) -> Self {
        let rad = angle_deg.to_radians();
        let (sin, cos) = rad.sin_cos();
        Self {
            m11: cos,
            m12: sin,
            m21: -sin,
            m22: cos,
            dx: 0.0,
            dy: 0.0,
        }
    }

    /// Rotation about an arbitrary pivot: translate the pivot to the origin,
    /// rotate, translate back
    pub fn rotation_about(angle_deg: f32, cx: f32, cy: f32) -> Self {
        Self::translation(-cx, -cy)
            .then(&Self::rotation_deg(angle_deg))
            .then(&Self::translation(cx, cy))
    }

    /// Compose: apply `self` first, then `next`
    pub fn then(&self, next: &Self) -> Self {
        Self {
            m11: self.m11 * next.m11 + self.m12 * next.m21,
            m12: self.m11 * next.m12 + self.m12 * next.m22,
            m21: self.m21 * next.m11 + self.m22 * next.m21,
            m22: self.m21 * next.m12 + self.m22 * next.m22,
            dx: self.dx * next.m11 + self.dy * next.m21 + next.dx,
            dy: self.dx * next.m12 + self.dy * next.m22 + next.dy,
        }
    }

    #[inline]
    pub fn apply(&self, x: f32, y: f32) -> (f32, f32) {
        (
            x * self.m11 + y * self.m21 + self.dx,
            x * self.m12 + y * self.m22 + self.dy,
        )
    }

    /// Inverse transform, or None when the matrix is singular
    pub fn invert(&self) -> Option<Self> {
        let det = self.m11 * self.m22 - self.m12 * self.m21;
        if det.abs() < 1e-12 {
            return None;
        }
        let inv = 1.0 / det;
        let m11 = self.m22 * inv;
        let m12 = -self.m12 * inv;
        let m21 = -self.m21 * inv;
        let m22 = self.m11 * inv;
        Some(Self {
            m11,
            m12,
            m21,
            m22,
            dx: -(self.dx * m11 + self.dy * m21),
            dy: -(self.dx * m12 + self.dy * m22),
        })
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }
}

impl Default for Transform2D {
    fn default() -> Self {
        Self::IDENTITY
    }
}
