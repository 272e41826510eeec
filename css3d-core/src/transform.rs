/// Local transform composition and world matrix decomposition
use nalgebra::{Matrix3, Matrix4, Point3, Rotation3, UnitQuaternion, Vector3};

/// Rotation around three axes (in radians), applied in X, Y, Z order
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EulerAngles {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl EulerAngles {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }

    /// Intrinsic XYZ rotation: `Rx * Ry * Rz`.
    pub fn to_quaternion(self) -> UnitQuaternion<f64> {
        let rx = UnitQuaternion::from_axis_angle(&Vector3::x_axis(), self.x);
        let ry = UnitQuaternion::from_axis_angle(&Vector3::y_axis(), self.y);
        let rz = UnitQuaternion::from_axis_angle(&Vector3::z_axis(), self.z);
        rx * ry * rz
    }
}

impl Default for EulerAngles {
    fn default() -> Self {
        Self::zero()
    }
}

/// Translation, rotation and per-axis scale of a world matrix
#[derive(Debug, Clone, Copy)]
pub struct Decomposed {
    pub translation: Vector3<f64>,
    pub rotation: UnitQuaternion<f64>,
    pub scale: Vector3<f64>,
}

/// Transform builder for 3D transformations
pub struct Transform;

impl Transform {
    /// `T * R * S`
    pub fn compose(
        position: &Vector3<f64>,
        rotation: &UnitQuaternion<f64>,
        scale: &Vector3<f64>,
    ) -> Matrix4<f64> {
        let mut matrix = rotation.to_homogeneous();
        for (axis, factor) in scale.iter().enumerate() {
            let mut column = matrix.fixed_view_mut::<3, 1>(0, axis);
            column *= *factor;
        }
        matrix.fixed_view_mut::<3, 1>(0, 3).copy_from(position);
        matrix
    }

    /// Column translation of an affine matrix.
    pub fn position(matrix: &Matrix4<f64>) -> Vector3<f64> {
        matrix.fixed_view::<3, 1>(0, 3).into_owned()
    }

    /// Rotation of the upper 3x3 block with any scale divided out.
    pub fn rotation(matrix: &Matrix4<f64>) -> UnitQuaternion<f64> {
        let mut basis: Matrix3<f64> = matrix.fixed_view::<3, 3>(0, 0).into_owned();
        for mut column in basis.column_iter_mut() {
            let length = column.norm();
            if length > 0.0 {
                column /= length;
            }
        }
        UnitQuaternion::from_rotation_matrix(&Rotation3::from_matrix_unchecked(basis))
    }

    pub fn decompose(matrix: &Matrix4<f64>) -> Decomposed {
        let basis = matrix.fixed_view::<3, 3>(0, 0);
        Decomposed {
            translation: Self::position(matrix),
            rotation: Self::rotation(matrix),
            scale: Vector3::new(
                basis.column(0).norm(),
                basis.column(1).norm(),
                basis.column(2).norm(),
            ),
        }
    }

    /// Orientation whose local -Z axis points from `eye` to `target`.
    pub fn look_at(
        eye: &Point3<f64>,
        target: &Point3<f64>,
        up: &Vector3<f64>,
    ) -> UnitQuaternion<f64> {
        let mut backward = eye - target;
        if backward.norm_squared() == 0.0 {
            return UnitQuaternion::identity();
        }
        backward.normalize_mut();
        if backward.cross(up).norm_squared() == 0.0 {
            // up parallel to the view direction: nudge it off the axis
            if up.z.abs() == 1.0 {
                backward.x += 1e-4;
            } else {
                backward.z += 1e-4;
            }
        }
        UnitQuaternion::face_towards(&backward, up)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_identity_compose() {
        let matrix = Transform::compose(
            &Vector3::zeros(),
            &UnitQuaternion::identity(),
            &Vector3::new(1.0, 1.0, 1.0),
        );
        assert!((matrix - Matrix4::identity()).norm() < 1e-12);
    }

    #[test]
    fn test_decompose_recovers_parts() {
        let rotation = EulerAngles::new(0.3, -0.7, 1.1).to_quaternion();
        let position = Vector3::new(4.0, -2.0, 9.0);
        let scale = Vector3::new(2.0, 0.5, 3.0);
        let matrix = Transform::compose(&position, &rotation, &scale);

        let parts = Transform::decompose(&matrix);
        assert_relative_eq!(parts.translation, position, epsilon = 1e-12);
        assert_relative_eq!(parts.scale, scale, epsilon = 1e-9);
        assert!(parts.rotation.angle_to(&rotation) < 1e-9);
    }

    #[test]
    fn test_look_straight_down() {
        let rotation = Transform::look_at(
            &Point3::new(0.0, 500.0, 0.0),
            &Point3::origin(),
            &Vector3::y(),
        );
        assert!(rotation.coords.iter().all(|c| c.is_finite()));
        assert_relative_eq!(rotation * -Vector3::z(), -Vector3::y(), epsilon = 1e-3);
    }

    #[test]
    fn test_half_turn_rotation() {
        let half_turn = UnitQuaternion::from_axis_angle(&Vector3::y_axis(), std::f64::consts::PI);
        let matrix = half_turn.to_homogeneous();
        assert!(Transform::rotation(&matrix).angle_to(&half_turn) < 1e-12);
    }

    #[test]
    fn test_euler_order_is_xyz() {
        let euler = EulerAngles::new(FRAC_PI_2, FRAC_PI_2, 0.0);
        // Rx(90) * Ry(90) maps +Z onto +X
        let mapped = euler.to_quaternion() * Vector3::z();
        assert_relative_eq!(mapped, Vector3::x(), epsilon = 1e-12);
    }

    #[test]
    fn test_look_at_faces_negative_z() {
        let rotation = Transform::look_at(
            &Point3::new(0.0, 0.0, 10.0),
            &Point3::origin(),
            &Vector3::y(),
        );
        assert!(rotation.angle() < 1e-12);

        let rotation = Transform::look_at(
            &Point3::new(10.0, 0.0, 0.0),
            &Point3::origin(),
            &Vector3::y(),
        );
        assert_relative_eq!(rotation * -Vector3::z(), -Vector3::x(), epsilon = 1e-12);
    }
}
