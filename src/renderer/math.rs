//! Vector math for 3D rendering

use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul, Sub};

/// Fast approximate reciprocal square root (the classic bit-level trick
/// with one Newton-Raphson step). Accurate to roughly 0.2%, which is
/// plenty for direction vectors and pixel step counts.
///
/// `q_rsqrt(0.0)` returns a huge finite value rather than infinity;
/// callers that can see zero-length input must guard for it.
pub fn q_rsqrt(number: f32) -> f32 {
    let x2 = number * 0.5;
    let i = 0x5f3759df - (number.to_bits() >> 1);
    let y = f32::from_bits(i);
    y * (1.5 - x2 * y * y)
}

/// 3D vector: directions, positions, camera bookkeeping
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 { x: 0.0, y: 0.0, z: 0.0 };
    pub const UP: Vec3 = Vec3 { x: 0.0, y: 1.0, z: 0.0 };

    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn dot(self, other: Vec3) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn cross(self, other: Vec3) -> Vec3 {
        Vec3 {
            x: self.y * other.z - self.z * other.y,
            y: self.z * other.x - self.x * other.z,
            z: self.x * other.y - self.y * other.x,
        }
    }

    pub fn length_sq(self) -> f32 {
        self.dot(self)
    }

    /// Normalize via `q_rsqrt`. A zero-length vector stays the zero
    /// vector instead of going NaN.
    pub fn normalize(self) -> Vec3 {
        let len_sq = self.length_sq();
        if len_sq < 1e-12 {
            return Vec3::ZERO;
        }
        self.scale(q_rsqrt(len_sq))
    }

    pub fn scale(self, k: f32) -> Vec3 {
        Vec3 {
            x: self.x * k,
            y: self.y * k,
            z: self.z * k,
        }
    }

    /// Rotate about `axis` by `angle` radians using the Euler-Rodrigues
    /// formula. The axis is normalized internally.
    pub fn rotate_axis_angle(self, axis: Vec3, angle: f32) -> Vec3 {
        let axis = axis.normalize();

        let half = angle / 2.0;
        let s = half.sin();
        let a = half.cos();
        let w = axis.scale(s);

        let wv = w.cross(self);
        let wwv = w.cross(wv);

        self + wv.scale(2.0 * a) + wwv.scale(2.0)
    }
}

impl Add for Vec3 {
    type Output = Vec3;
    fn add(self, other: Vec3) -> Vec3 {
        Vec3 {
            x: self.x + other.x,
            y: self.y + other.y,
            z: self.z + other.z,
        }
    }
}

impl Sub for Vec3 {
    type Output = Vec3;
    fn sub(self, other: Vec3) -> Vec3 {
        Vec3 {
            x: self.x - other.x,
            y: self.y - other.y,
            z: self.z - other.z,
        }
    }
}

impl Mul<f32> for Vec3 {
    type Output = Vec3;
    fn mul(self, k: f32) -> Vec3 {
        self.scale(k)
    }
}

/// Homogeneous 4D point. `w` only becomes meaningful after the
/// projection multiply, where it carries view-space depth until the
/// perspective divide.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Vec4 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Default for Vec4 {
    fn default() -> Self {
        Vec4::point(0.0, 0.0, 0.0)
    }
}

impl Vec4 {
    /// A point with unit weight.
    pub fn point(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z, w: 1.0 }
    }

    pub fn xyz(self) -> Vec3 {
        Vec3::new(self.x, self.y, self.z)
    }

    /// Dot product over x/y/z; the weight takes no part.
    pub fn dot(self, other: Vec4) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn cross(self, other: Vec4) -> Vec4 {
        Vec4 {
            x: self.y * other.z - self.z * other.y,
            y: self.z * other.x - self.x * other.z,
            z: self.x * other.y - self.y * other.x,
            w: 1.0,
        }
    }

    pub fn scale(self, k: f32) -> Vec4 {
        Vec4 {
            x: self.x * k,
            y: self.y * k,
            z: self.z * k,
            w: self.w,
        }
    }

    /// Divide x/y/z by `k`, keeping the weight. Division by zero yields
    /// the zero point instead of propagating infinities.
    pub fn div(self, k: f32) -> Vec4 {
        if k == 0.0 {
            return Vec4::point(0.0, 0.0, 0.0);
        }
        Vec4 {
            x: self.x / k,
            y: self.y / k,
            z: self.z / k,
            w: self.w,
        }
    }

    /// Normalize x/y/z via `q_rsqrt`, keeping the weight. Zero-length
    /// input stays at the origin.
    pub fn normalize(self) -> Vec4 {
        let len_sq = self.dot(self);
        if len_sq < 1e-12 {
            return Vec4 { x: 0.0, y: 0.0, z: 0.0, w: self.w };
        }
        self.scale(q_rsqrt(len_sq))
    }
}

impl From<Vec3> for Vec4 {
    fn from(v: Vec3) -> Vec4 {
        Vec4::point(v.x, v.y, v.z)
    }
}

impl Add for Vec4 {
    type Output = Vec4;
    fn add(self, other: Vec4) -> Vec4 {
        Vec4 {
            x: self.x + other.x,
            y: self.y + other.y,
            z: self.z + other.z,
            w: self.w,
        }
    }
}

impl Sub for Vec4 {
    type Output = Vec4;
    fn sub(self, other: Vec4) -> Vec4 {
        Vec4 {
            x: self.x - other.x,
            y: self.y - other.y,
            z: self.z - other.z,
            w: self.w,
        }
    }
}

impl Mul<f32> for Vec4 {
    type Output = Vec4;
    fn mul(self, k: f32) -> Vec4 {
        self.scale(k)
    }
}

/// Per-vertex texture coordinate plus the inverse-depth metric carried
/// through projection and compared by the depth buffer.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct TexCoord {
    pub u: f32,
    pub v: f32,
    pub w: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-3;

    #[test]
    fn test_dot() {
        let a = Vec3::new(1.0, 2.0, 3.0);
        let b = Vec3::new(4.0, 5.0, 6.0);
        assert!((a.dot(b) - 32.0).abs() < EPS);
    }

    #[test]
    fn test_cross_right_handed() {
        let c = Vec3::new(1.0, 0.0, 0.0).cross(Vec3::new(0.0, 1.0, 0.0));
        assert!((c.x).abs() < EPS);
        assert!((c.y).abs() < EPS);
        assert!((c.z - 1.0).abs() < EPS);
    }

    #[test]
    fn test_q_rsqrt_accuracy() {
        for v in [0.01f32, 1.0, 2.0, 25.0, 1e4] {
            let approx = q_rsqrt(v);
            let exact = 1.0 / v.sqrt();
            assert!(
                (approx - exact).abs() / exact < 0.005,
                "q_rsqrt({v}) = {approx}, want ~{exact}"
            );
        }
    }

    #[test]
    fn test_normalize_unit_length() {
        let n = Vec3::new(3.0, -4.0, 12.0).normalize();
        assert!((n.length_sq() - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_normalize_zero_stays_zero() {
        let n = Vec3::ZERO.normalize();
        assert_eq!(n, Vec3::ZERO);

        let v = Vec4::point(0.0, 0.0, 0.0).normalize();
        assert_eq!(v.xyz(), Vec3::ZERO);
    }

    #[test]
    fn test_div_by_zero_is_origin() {
        let v = Vec4::point(1.0, 2.0, 3.0).div(0.0);
        assert_eq!(v.xyz(), Vec3::ZERO);
    }

    // rotation goes through the approximate rsqrt when normalizing the
    // axis, so these bounds are loose
    #[test]
    fn test_rotate_axis_angle_quarter_turn() {
        // x axis rotated 90 degrees about z lands on y
        let r = Vec3::new(1.0, 0.0, 0.0)
            .rotate_axis_angle(Vec3::new(0.0, 0.0, 1.0), std::f32::consts::FRAC_PI_2);
        assert!((r.x).abs() < 0.02);
        assert!((r.y - 1.0).abs() < 0.02);
        assert!((r.z).abs() < 0.02);
    }

    #[test]
    fn test_rotate_axis_angle_normalizes_axis() {
        // a scaled axis gives the same rotation as the unit axis
        let axis = Vec3::new(0.0, 0.0, 10.0);
        let r = Vec3::new(0.0, 1.0, 0.0).rotate_axis_angle(axis, std::f32::consts::PI);
        assert!((r.x).abs() < 0.02);
        assert!((r.y + 1.0).abs() < 0.02);
    }
}
