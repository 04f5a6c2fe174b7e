//! 4x4 transform matrices
//!
//! Row-major storage, row-vector convention: `v' = v * M`, so composed
//! transforms apply left to right (`world = rotate * translate`).

use super::math::{Vec3, Vec4};
use serde::{Deserialize, Serialize};

/// Row-major 4x4 transform
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Mat4 {
    pub m: [[f32; 4]; 4],
}

impl Default for Mat4 {
    fn default() -> Self {
        Mat4::identity()
    }
}

impl Mat4 {
    pub const fn zero() -> Self {
        Mat4 { m: [[0.0; 4]; 4] }
    }

    pub fn identity() -> Self {
        let mut matrix = Mat4::zero();
        matrix.m[0][0] = 1.0;
        matrix.m[1][1] = 1.0;
        matrix.m[2][2] = 1.0;
        matrix.m[3][3] = 1.0;
        matrix
    }

    pub fn rotation_x(angle_rad: f32) -> Self {
        let mut matrix = Mat4::zero();
        matrix.m[0][0] = 1.0;
        matrix.m[1][1] = angle_rad.cos();
        matrix.m[1][2] = angle_rad.sin();
        matrix.m[2][1] = -angle_rad.sin();
        matrix.m[2][2] = angle_rad.cos();
        matrix.m[3][3] = 1.0;
        matrix
    }

    pub fn rotation_y(angle_rad: f32) -> Self {
        let mut matrix = Mat4::zero();
        matrix.m[0][0] = angle_rad.cos();
        matrix.m[0][2] = angle_rad.sin();
        matrix.m[2][0] = -angle_rad.sin();
        matrix.m[1][1] = 1.0;
        matrix.m[2][2] = angle_rad.cos();
        matrix.m[3][3] = 1.0;
        matrix
    }

    pub fn rotation_z(angle_rad: f32) -> Self {
        let mut matrix = Mat4::zero();
        matrix.m[0][0] = angle_rad.cos();
        matrix.m[0][1] = angle_rad.sin();
        matrix.m[1][0] = -angle_rad.sin();
        matrix.m[1][1] = angle_rad.cos();
        matrix.m[2][2] = 1.0;
        matrix.m[3][3] = 1.0;
        matrix
    }

    pub fn translation(x: f32, y: f32, z: f32) -> Self {
        let mut matrix = Mat4::identity();
        matrix.m[3][0] = x;
        matrix.m[3][1] = y;
        matrix.m[3][2] = z;
        matrix
    }

    /// Perspective projection into clip space. `m[2][3] = 1` routes
    /// view-space depth into `w`, so the perspective divide happens after
    /// the multiply.
    pub fn perspective(fov_y_degrees: f32, aspect_ratio: f32, near: f32, far: f32) -> Self {
        let fov_scale = 1.0 / (fov_y_degrees * 0.5).to_radians().tan();
        let mut matrix = Mat4::zero();
        matrix.m[0][0] = aspect_ratio * fov_scale;
        matrix.m[1][1] = fov_scale;
        matrix.m[2][2] = far / (far - near);
        matrix.m[3][2] = (-far * near) / (far - near);
        matrix.m[2][3] = 1.0;
        matrix.m[3][3] = 0.0;
        matrix
    }

    /// View matrix for a camera at `position` looking at `target`.
    ///
    /// Builds the orthonormal camera basis (up re-orthogonalized against
    /// forward via Gram-Schmidt) and writes the inverse transform
    /// directly: basis vectors down the columns, translation row
    /// `-dot(axis, position)` per axis.
    pub fn look_at(position: Vec3, target: Vec3, up: Vec3) -> Self {
        let forward = (target - position).normalize();
        let new_up = (up - forward.scale(up.dot(forward))).normalize();
        let right = new_up.cross(forward);

        let mut matrix = Mat4::zero();
        matrix.m[0][0] = right.x;
        matrix.m[0][1] = new_up.x;
        matrix.m[0][2] = forward.x;
        matrix.m[1][0] = right.y;
        matrix.m[1][1] = new_up.y;
        matrix.m[1][2] = forward.y;
        matrix.m[2][0] = right.z;
        matrix.m[2][1] = new_up.z;
        matrix.m[2][2] = forward.z;
        matrix.m[3][0] = -right.dot(position);
        matrix.m[3][1] = -new_up.dot(position);
        matrix.m[3][2] = -forward.dot(position);
        matrix.m[3][3] = 1.0;
        matrix
    }

    pub fn mul(&self, other: &Mat4) -> Mat4 {
        let mut res = Mat4::zero();
        for r in 0..4 {
            for c in 0..4 {
                res.m[r][c] = self.m[r][0] * other.m[0][c]
                    + self.m[r][1] * other.m[1][c]
                    + self.m[r][2] * other.m[2][c]
                    + self.m[r][3] * other.m[3][c];
            }
        }
        res
    }

    /// Row vector times matrix.
    pub fn transform(&self, v: Vec4) -> Vec4 {
        Vec4 {
            x: v.x * self.m[0][0] + v.y * self.m[1][0] + v.z * self.m[2][0] + v.w * self.m[3][0],
            y: v.x * self.m[0][1] + v.y * self.m[1][1] + v.z * self.m[2][1] + v.w * self.m[3][1],
            z: v.x * self.m[0][2] + v.y * self.m[1][2] + v.z * self.m[2][2] + v.w * self.m[3][2],
            w: v.x * self.m[0][3] + v.y * self.m[1][3] + v.z * self.m[2][3] + v.w * self.m[3][3],
        }
    }
}
