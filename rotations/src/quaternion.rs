use super::*;
use nalgebra::Vector3;
use rand::{prelude::*, rng};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{AddAssign, Mul};
use thiserror::Error;

/// A struct representing a quaternion for 3D rotations.
///
/// `x`, `y`, `z` hold the vector part and `w` the scalar part.
#[derive(Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quaternion {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub w: f64,
}

/// Errors that can occur when creating a `Quaternion`.
#[derive(Debug, Clone, Error, Copy, PartialEq)]
pub enum QuaternionErrors {
    #[error("got zero magnitude quaternion")]
    ZeroMagnitude,
    #[error("got non-finite quaternion component")]
    NonFinite,
    #[error("got zero length rotation axis")]
    ZeroAxis,
}

impl Quaternion {
    /// Identity quaternion, representing no rotation.
    pub const IDENTITY: Self = Self {
        x: 0.0,
        y: 0.0,
        z: 0.0,
        w: 1.0,
    };

    /// The zero quaternion. Not a rotation, used as the additive identity for rates.
    pub const ZERO: Self = Self {
        x: 0.0,
        y: 0.0,
        z: 0.0,
        w: 0.0,
    };

    /// Creates a new `Quaternion` without normalizing it.
    ///
    /// # Arguments
    ///
    /// * `x` - The x component of the quaternion.
    /// * `y` - The y component of the quaternion.
    /// * `z` - The z component of the quaternion.
    /// * `w` - The scalar component of the quaternion.
    pub fn new(x: f64, y: f64, z: f64, w: f64) -> Self {
        Self { x, y, z, w }
    }

    /// Creates a pure quaternion (zero scalar part) from a vector.
    pub fn pure(v: &Vector3<f64>) -> Self {
        Self::new(v[0], v[1], v[2], 0.0)
    }

    /// Creates the quaternion for a rotation of `angle` radians about `axis`.
    pub fn from_axis_angle(axis: &Vector3<f64>, angle: f64) -> Result<Self, QuaternionErrors> {
        let mag = axis.magnitude();
        if mag < f64::EPSILON {
            return Err(QuaternionErrors::ZeroAxis);
        }
        let u = axis / mag;
        let (s, c) = (0.5 * angle).sin_cos();
        Ok(Self::new(u[0] * s, u[1] * s, u[2] * s, c))
    }

    // Dot product of two quaternions
    pub fn dot(&self, other: &Quaternion) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z + self.w * other.w
    }

    /// Conjugate of the quaternion. Equal to the inverse for unit quaternions.
    pub fn inv(&self) -> Quaternion {
        Quaternion::new(-self.x, -self.y, -self.z, self.w)
    }

    pub fn mag(&self) -> f64 {
        self.dot(self).sqrt()
    }

    pub fn vector(&self) -> Vector3<f64> {
        Vector3::new(self.x, self.y, self.z)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite() && self.w.is_finite()
    }

    pub fn normalize(&self) -> Result<Self, QuaternionErrors> {
        if !self.is_finite() {
            return Err(QuaternionErrors::NonFinite);
        }
        let mag = self.mag();
        if mag < f64::EPSILON {
            return Err(QuaternionErrors::ZeroMagnitude);
        }
        Ok(Quaternion::new(
            self.x / mag,
            self.y / mag,
            self.z / mag,
            self.w / mag,
        ))
    }

    /// First time derivative of the attitude quaternion given the body rate.
    /// Follows Markley/Crassidis equation 3.20 with the "x" product used by `Mul`,
    /// q_dot = 1/2 * [w; 0] x q
    ///
    /// # Arguments
    ///
    /// * `omega` - Angular velocity of the body wrt. the reference frame, in the body frame.
    ///
    /// # Returns
    ///
    /// The quaternion rate. Not a rotation, so it is never normalized.
    pub fn derivative(&self, omega: &Vector3<f64>) -> Quaternion {
        (Quaternion::pure(omega) * *self) * 0.5
    }

    /// Creates a random quaternion.
    ///
    /// # Returns
    ///
    /// A random `Quaternion`.
    pub fn rand() -> Quaternion {
        let mut rng = rng();
        let x = rng.random_range(-1.0..1.0);
        let y = rng.random_range(-1.0..1.0);
        let z = rng.random_range(-1.0..1.0);
        let s = rng.random_range(-1.0..1.0);

        Quaternion::new(x, y, z, s)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize, Default)]
pub struct UnitQuaternion(pub Quaternion);
impl UnitQuaternion {
    pub const IDENTITY: Self = Self(Quaternion::IDENTITY);

    pub fn new(x: f64, y: f64, z: f64, w: f64) -> Result<Self, QuaternionErrors> {
        Ok(Self(Quaternion::new(x, y, z, w).normalize()?))
    }

    pub fn rand() -> Result<Self, QuaternionErrors> {
        Ok(Self(Quaternion::rand().normalize()?))
    }
}

impl TryFrom<&Quaternion> for UnitQuaternion {
    type Error = QuaternionErrors;
    fn try_from(value: &Quaternion) -> Result<Self, QuaternionErrors> {
        Ok(Self(value.normalize()?))
    }
}

impl From<&UnitQuaternion> for Quaternion {
    fn from(value: &UnitQuaternion) -> Self {
        value.0
    }
}

impl RotationTrait for UnitQuaternion {
    /// Rotates a vector by the quaternion.
    /// Follows the logic from Markley/Crassidis
    /// aka Active Rotation or "Alibi"
    /// See Markley/Crassidis section 2.4 and figure 2.2 for details
    fn rotate(&self, v: &Vector3<f64>) -> Vector3<f64> {
        let Quaternion { x: q1, y: q2, z: q3, w: q4 } = self.0;

        let out1 = (q1 * q1 - q2 * q2 - q3 * q3 + q4 * q4) * v[0]
            + 2.0 * (q1 * q2 - q3 * q4) * v[1]
            + 2.0 * (q1 * q3 + q2 * q4) * v[2];

        let out2 = 2.0 * (q2 * q1 + q3 * q4) * v[0]
            + (-q1 * q1 + q2 * q2 - q3 * q3 + q4 * q4) * v[1]
            + 2.0 * (q2 * q3 - q1 * q4) * v[2];

        let out3 = 2.0 * (q3 * q1 - q2 * q4) * v[0]
            + 2.0 * (q3 * q2 + q1 * q4) * v[1]
            + (-q1 * q1 - q2 * q2 + q3 * q3 + q4 * q4) * v[2];

        Vector3::new(out1, out2, out3)
    }

    /// Transforms a vector by the quaternion.
    /// Follows the logic from Markley/Crassidis
    /// Section 2.9.3, equations 2.125 and 2.130
    /// aka Passive Rotation or "Alias"
    fn transform(&self, v: &Vector3<f64>) -> Vector3<f64> {
        self.inv().rotate(v)
    }

    fn identity() -> Self {
        Self::IDENTITY
    }

    fn inv(&self) -> Self {
        UnitQuaternion(self.0.inv()) // no need to renormalize since just taking the conjugate
    }
}

impl Default for Quaternion {
    /// Provides the default value for a quaternion.
    ///
    /// # Returns
    ///
    /// The identity quaternion.
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul<Quaternion> for Quaternion {
    type Output = Self;

    /// Multiplies two quaternions.
    /// IMPORTANT: This follows from the "x" logic rather than the "dot" logic
    /// from Markley/Crassidis
    /// Successive multiplications act like DCMs so that a rotation from a2c is
    /// q_a2c = q_c2b * q_b2a
    fn mul(self, rhs: Self) -> Self {
        Self::new(
            self.w * rhs.x + self.x * rhs.w - self.y * rhs.z + self.z * rhs.y,
            self.w * rhs.y + self.y * rhs.w - self.z * rhs.x + self.x * rhs.z,
            self.w * rhs.z + self.z * rhs.w - self.x * rhs.y + self.y * rhs.x,
            self.w * rhs.w - self.x * rhs.x - self.y * rhs.y - self.z * rhs.z,
        )
    }
}

impl Mul<UnitQuaternion> for UnitQuaternion {
    type Output = Self;
    fn mul(self, rhs: UnitQuaternion) -> Self::Output {
        Self(self.0 * rhs.0)
    }
}

impl AddAssign<&Quaternion> for Quaternion {
    /// Component-wise sum.
    /// NOTE: Quaternion addition is not a composition of rotations.
    /// This only exists for adding scaled quaternion rates to attitude states
    /// inside an integrator stage. The result is left unnormalized; the caller
    /// renormalizes once the full step is complete.
    fn add_assign(&mut self, rhs: &Self) {
        self.x += rhs.x;
        self.y += rhs.y;
        self.z += rhs.z;
        self.w += rhs.w;
    }
}

impl Mul<f64> for Quaternion {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self {
        Self::new(self.x * rhs, self.y * rhs, self.z * rhs, self.w * rhs)
    }
}

impl fmt::Debug for Quaternion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Quaternion ")?;
        writeln!(f, "   x: {: >10.6}", self.x)?;
        writeln!(f, "   y: {: >10.6}", self.y)?;
        writeln!(f, "   z: {: >10.6}", self.z)?;
        writeln!(f, "   w: {: >10.6}", self.w)
    }
}

impl fmt::Display for Quaternion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({: >12.9}, {: >12.9}, {: >12.9}; {: >12.9})",
            self.x, self.y, self.z, self.w
        )
    }
}
