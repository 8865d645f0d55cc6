//! Additional math helpers layered on top of `glam`.

use glam::{Mat3, Quat, Vec3};

use crate::config::ROTATION_EPSILON;

const JACOBI_MAX_SWEEPS: usize = 32;

/// Converts a rotation vector scaled by `scale` into a quaternion.
///
/// The rotation axis is `vector / |vector|` and the angle `|vector| * scale`.
/// A zero vector yields the identity.
pub fn rotation_vector_to_quat(vector: Vec3, scale: f32) -> Quat {
    let magnitude = vector.length();
    if magnitude < ROTATION_EPSILON {
        return Quat::IDENTITY;
    }
    Quat::from_axis_angle(vector / magnitude, magnitude * scale)
}

/// Componentwise division by a diagonal tensor.
#[inline]
pub fn diag_div(value: Vec3, diagonal: Vec3) -> Vec3 {
    value / diagonal
}

/// Sign returning `0.0` for zero, unlike [`f32::signum`].
#[inline]
pub fn sign(value: f32) -> f32 {
    if value > 0.0 {
        1.0
    } else if value < 0.0 {
        -1.0
    } else {
        0.0
    }
}

/// Eigen-decomposition of a symmetric 3x3 matrix using cyclic Jacobi rotations.
///
/// Returns the eigenvalues and a proper rotation whose columns are the
/// matching eigenvectors.
pub fn symmetric_eigen(matrix: Mat3) -> (Vec3, Mat3) {
    let mut a = [[0.0f32; 3]; 3];
    for (row, values) in a.iter_mut().enumerate() {
        for (col, value) in values.iter_mut().enumerate() {
            *value = matrix.col(col)[row];
        }
    }
    let mut v = [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];

    let scale = (0..3).map(|i| a[i][i].abs()).fold(0.0f32, f32::max).max(f32::MIN_POSITIVE);

    for _ in 0..JACOBI_MAX_SWEEPS {
        let off = a[0][1] * a[0][1] + a[0][2] * a[0][2] + a[1][2] * a[1][2];
        if off.sqrt() <= scale * 1e-7 {
            break;
        }

        for (p, q) in [(0, 1), (0, 2), (1, 2)] {
            if a[p][q].abs() <= scale * 1e-9 {
                continue;
            }
            let theta = (a[q][q] - a[p][p]) / (2.0 * a[p][q]);
            let t = theta.signum() / (theta.abs() + (theta * theta + 1.0).sqrt());
            let c = 1.0 / (t * t + 1.0).sqrt();
            let s = t * c;

            for row in a.iter_mut() {
                let (kp, kq) = (row[p], row[q]);
                row[p] = c * kp - s * kq;
                row[q] = s * kp + c * kq;
            }
            for k in 0..3 {
                let (pk, qk) = (a[p][k], a[q][k]);
                a[p][k] = c * pk - s * qk;
                a[q][k] = s * pk + c * qk;
            }
            for row in v.iter_mut() {
                let (kp, kq) = (row[p], row[q]);
                row[p] = c * kp - s * kq;
                row[q] = s * kp + c * kq;
            }
        }
    }

    let eigenvalues = Vec3::new(a[0][0], a[1][1], a[2][2]);
    let mut axes = Mat3::from_cols(
        Vec3::new(v[0][0], v[1][0], v[2][0]),
        Vec3::new(v[0][1], v[1][1], v[2][1]),
        Vec3::new(v[0][2], v[1][2], v[2][2]),
    );
    if axes.determinant() < 0.0 {
        axes.z_axis = -axes.z_axis;
    }
    (eigenvalues, axes)
}
