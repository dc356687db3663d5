use glam::{Vec2, Vec3};

pub(crate) fn approx_eq(a: f32, b: f32) -> bool {
    (a - b).abs() < 0.0001
}

pub(crate) fn vec2_approx_eq(a: Vec2, b: Vec2) -> bool {
    approx_eq(a.x, b.x) && approx_eq(a.y, b.y)
}

/// Axis-aligned rectangle in world pixels (y-up).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    pub const UNBOUNDED: Self = Self {
        min: Vec2::splat(f32::NEG_INFINITY),
        max: Vec2::splat(f32::INFINITY),
    };

    pub fn from_center_size(center: Vec2, size: Vec2) -> Self {
        let half = size * 0.5;
        Self {
            min: center - half,
            max: center + half,
        }
    }

    pub fn is_unbounded(&self) -> bool {
        *self == Self::UNBOUNDED
    }

    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.min.x && point.x <= self.max.x && point.y >= self.min.y && point.y <= self.max.y
    }

    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }

    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }
}

impl Default for Rect {
    fn default() -> Self {
        Self::UNBOUNDED
    }
}

/// Resolved placement of an element.
///
/// `position` is relative to the parent's centre, `world_position` is the
/// element's centre in window space with the origin at the window centre.
/// `scale` is the world pixel size.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Transform {
    pub(crate) position: Vec3,
    pub(crate) world_position: Vec3,
    pub(crate) scale: Vec2,
}

impl Transform {
    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn world_position(&self) -> Vec3 {
        self.world_position
    }

    pub fn scale(&self) -> Vec2 {
        self.scale
    }

    pub fn world_z(&self) -> f32 {
        self.world_position.z
    }

    pub fn world_bounds(&self) -> Rect {
        Rect::from_center_size(self.world_position.truncate(), self.scale)
    }
}
