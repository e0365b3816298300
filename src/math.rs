use std::f64::consts::PI;
use std::ops::{Add, Mul, Neg, Sub};

/// Immutable 2D vector
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vector2 {
    pub x: f64,
    pub y: f64,
}

impl Vector2 {
    /// Unit vector along the positive x axis
    pub const I: Vector2 = Vector2 { x: 1.0, y: 0.0 };
    /// Unit vector along the positive y axis
    pub const J: Vector2 = Vector2 { x: 0.0, y: 1.0 };
    pub const ZERO: Vector2 = Vector2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Vector2 { x, y }
    }

    pub fn mult(self, scalar: f64) -> Vector2 {
        Vector2::new(scalar * self.x, scalar * self.y)
    }

    pub fn dot(self, other: Vector2) -> f64 {
        self.x * other.x + self.y * other.y
    }

    pub fn magnitude(self) -> f64 {
        self.dot(self).sqrt()
    }

    /// Projects this vector onto `other`.
    ///
    /// `other` must not be the zero vector; the result is NaN if it is.
    pub fn project(self, other: Vector2) -> Vector2 {
        other.mult(self.dot(other) / other.dot(other))
    }

    /// Angle with respect to the positive x axis, in (-π, π]
    pub fn angle(self) -> f64 {
        self.y.atan2(self.x)
    }

    /// Signed angle from `other` to this vector, in [-π, π].
    ///
    /// Positive when `other` lies clockwise of `self`.
    pub fn angle_to(self, other: Vector2) -> f64 {
        let angle = self.angle() - other.angle();
        (angle + PI).rem_euclid(2.0 * PI) - PI
    }
}

impl Add for Vector2 {
    type Output = Vector2;

    fn add(self, other: Vector2) -> Vector2 {
        Vector2::new(self.x + other.x, self.y + other.y)
    }
}

impl Sub for Vector2 {
    type Output = Vector2;

    fn sub(self, other: Vector2) -> Vector2 {
        self + other.mult(-1.0)
    }
}

impl Mul<f64> for Vector2 {
    type Output = Vector2;

    fn mul(self, scalar: f64) -> Vector2 {
        self.mult(scalar)
    }
}

impl Neg for Vector2 {
    type Output = Vector2;

    fn neg(self) -> Vector2 {
        self.mult(-1.0)
    }
}

/// Immutable 3D vector
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vector3 {
    pub const I: Vector3 = Vector3 { x: 1.0, y: 0.0, z: 0.0 };
    pub const J: Vector3 = Vector3 { x: 0.0, y: 1.0, z: 0.0 };
    pub const K: Vector3 = Vector3 { x: 0.0, y: 0.0, z: 1.0 };

    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Vector3 { x, y, z }
    }

    pub fn mult(self, scalar: f64) -> Vector3 {
        Vector3::new(scalar * self.x, scalar * self.y, scalar * self.z)
    }

    pub fn dot(self, other: Vector3) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn magnitude(self) -> f64 {
        self.dot(self).sqrt()
    }

    /// Projects this vector onto `other`, which must be non-zero.
    pub fn project(self, other: Vector3) -> Vector3 {
        other.mult(self.dot(other) / other.dot(other))
    }

    /// Unsigned angle between the two vectors, in [0, π]
    pub fn angle_between(self, other: Vector3) -> f64 {
        // Clamp guards acos against rounding just outside [-1, 1]
        let cos = self.dot(other) / (self.magnitude() * other.magnitude());
        cos.clamp(-1.0, 1.0).acos()
    }

    /// Drops the z component, projecting onto the screen plane
    pub fn flatten(self) -> Vector2 {
        Vector2::new(self.x, self.y)
    }
}

impl Add for Vector3 {
    type Output = Vector3;

    fn add(self, other: Vector3) -> Vector3 {
        Vector3::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }
}

impl Sub for Vector3 {
    type Output = Vector3;

    fn sub(self, other: Vector3) -> Vector3 {
        self + other.mult(-1.0)
    }
}

impl Mul<f64> for Vector3 {
    type Output = Vector3;

    fn mul(self, scalar: f64) -> Vector3 {
        self.mult(scalar)
    }
}

impl From<[f32; 3]> for Vector3 {
    fn from(values: [f32; 3]) -> Self {
        Vector3::new(values[0] as f64, values[1] as f64, values[2] as f64)
    }
}
