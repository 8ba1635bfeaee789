//! 2D vector and 3x3 transform value types.

use std::ops::{Add, AddAssign, Div, Mul, MulAssign, Neg, Sub, SubAssign};

/// A 2D vector of `f32`, used for positions, velocities and directions.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    /// The zero vector.
    pub const ZERO: Self = Self::new(0.0, 0.0);

    /// Unit X vector.
    pub const X: Self = Self::new(1.0, 0.0);

    /// Unit Y vector.
    pub const Y: Self = Self::new(0.0, 1.0);

    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// The unit vector pointing at `angle` radians from the X axis.
    #[must_use]
    pub fn from_angle(angle: f32) -> Self {
        let (sin, cos) = angle.sin_cos();
        Self::new(cos, sin)
    }

    /// The angle of this vector from the X axis, in radians.
    #[must_use]
    pub fn angle(self) -> f32 {
        self.y.atan2(self.x)
    }

    #[must_use]
    pub fn dot(self, other: Self) -> f32 {
        self.x * other.x + self.y * other.y
    }

    /// Squared length (avoids sqrt).
    #[must_use]
    pub fn squared_norm(self) -> f32 {
        self.dot(self)
    }

    #[must_use]
    pub fn norm(self) -> f32 {
        self.squared_norm().sqrt()
    }

    /// This vector scaled to unit length, or zero for the zero vector.
    #[must_use]
    pub fn normalized(self) -> Self {
        let norm = self.norm();
        if norm > 0.0 { self / norm } else { Self::ZERO }
    }

    /// Reflect this vector about the unit `normal`.
    #[must_use]
    pub fn reflect(self, normal: Self) -> Self {
        self - normal * (2.0 * self.dot(normal))
    }
}

impl Add for Vec2 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sub for Vec2 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl SubAssign for Vec2 {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl Neg for Vec2 {
    type Output = Self;
    fn neg(self) -> Self {
        Self::new(-self.x, -self.y)
    }
}

impl Mul<f32> for Vec2 {
    type Output = Self;
    fn mul(self, rhs: f32) -> Self {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

impl MulAssign<f32> for Vec2 {
    fn mul_assign(&mut self, rhs: f32) {
        *self = *self * rhs;
    }
}

impl Div<f32> for Vec2 {
    type Output = Self;
    fn div(self, rhs: f32) -> Self {
        Self::new(self.x / rhs, self.y / rhs)
    }
}

/// A row-major 3x3 matrix for 2D affine transforms.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mat3 {
    pub rows: [[f32; 3]; 3],
}

impl Mat3 {
    pub const IDENTITY: Self = Self {
        rows: [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
    };

    #[must_use]
    pub const fn identity() -> Self {
        Self::IDENTITY
    }

    /// The forward transform of an object: scale, then rotate, then translate.
    #[must_use]
    pub fn from_orientation(position: Vec2, rotation: f32, scale: f32) -> Self {
        let (sin, cos) = rotation.sin_cos();
        Self {
            rows: [
                [cos * scale, -sin * scale, position.x],
                [sin * scale, cos * scale, position.y],
                [0.0, 0.0, 1.0],
            ],
        }
    }

    /// A uniform scale.
    #[must_use]
    pub fn from_scale(scale: f32) -> Self {
        Self::from_orientation(Vec2::ZERO, 0.0, scale)
    }

    /// Transform a point (implicit homogeneous coordinate of 1).
    #[must_use]
    pub fn transform_point(&self, point: Vec2) -> Vec2 {
        let [r0, r1, _] = self.rows;
        Vec2::new(
            r0[0] * point.x + r0[1] * point.y + r0[2],
            r1[0] * point.x + r1[1] * point.y + r1[2],
        )
    }

    /// The translation part of the transform.
    #[must_use]
    pub fn translation(&self) -> Vec2 {
        Vec2::new(self.rows[0][2], self.rows[1][2])
    }
}

impl Default for Mat3 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul for Mat3 {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self {
        let mut rows = [[0.0; 3]; 3];
        for (i, row) in rows.iter_mut().enumerate() {
            for (j, cell) in row.iter_mut().enumerate() {
                *cell = (0..3).map(|k| self.rows[i][k] * rhs.rows[k][j]).sum();
            }
        }
        Self { rows }
    }
}
