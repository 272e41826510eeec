/// Billboard orientation blend toward the camera
use nalgebra::{Matrix4, UnitQuaternion, Vector3};

use crate::transform::Transform;

/// Scratch storage reused across frames for the billboard blend.
///
/// See <http://swiftcoder.wordpress.com/2008/11/25/constructing-a-billboard-matrix/>
#[derive(Debug, Clone)]
pub struct BillboardBlend {
    facing: UnitQuaternion<f64>,
    own: UnitQuaternion<f64>,
    matrix: Matrix4<f64>,
}

impl BillboardBlend {
    pub fn new() -> Self {
        Self {
            facing: UnitQuaternion::identity(),
            own: UnitQuaternion::identity(),
            matrix: Matrix4::identity(),
        }
    }

    /// Effective world matrix of a billboard.
    ///
    /// The camera-facing rotation is the rotation of the transposed view matrix.
    /// The node's own world rotation is slerped toward it by `ratio`, then the
    /// node's world translation and local `scale` are re-applied. The bottom row
    /// is forced to `0 0 0 1`.
    pub fn compute(
        &mut self,
        camera_world_inverse: &Matrix4<f64>,
        object_world: &Matrix4<f64>,
        scale: &Vector3<f64>,
        ratio: f64,
    ) -> &Matrix4<f64> {
        self.matrix.copy_from(camera_world_inverse);
        self.matrix.transpose_mut();

        self.facing = Transform::rotation(&self.matrix);
        self.own = Transform::rotation(object_world);
        self.own = slerp(&self.own, &self.facing, ratio);

        self.matrix = Transform::compose(&Transform::position(object_world), &self.own, scale);

        self.matrix[3] = 0.0;
        self.matrix[7] = 0.0;
        self.matrix[11] = 0.0;
        self.matrix[15] = 1.0;

        &self.matrix
    }
}

impl Default for BillboardBlend {
    fn default() -> Self {
        Self::new()
    }
}

/// Shortest-arc slerp that returns the exact endpoints at 0 and 1.
fn slerp(from: &UnitQuaternion<f64>, to: &UnitQuaternion<f64>, t: f64) -> UnitQuaternion<f64> {
    if t <= 0.0 {
        *from
    } else if t >= 1.0 {
        *to
    } else {
        // None only when both are (numerically) the same rotation
        from.try_slerp(to, t, 1.0e-9).unwrap_or(*to)
    }
}
