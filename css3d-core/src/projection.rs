/// Camera and projection utilities
use nalgebra::{Matrix4, Point3, UnitQuaternion, Vector3};

use crate::scene::NodeId;
use crate::transform::Transform;

/// Projection for rendering
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Projection {
    /// Vertical field of view in radians
    Perspective {
        fov: f64,
        aspect: f64,
        near: f64,
        far: f64,
    },
    Orthographic {
        left: f64,
        right: f64,
        top: f64,
        bottom: f64,
        near: f64,
        far: f64,
    },
}

/// Camera configuration for 3D rendering
#[derive(Debug, Clone)]
pub struct Camera {
    pub position: Point3<f64>,
    pub rotation: UnitQuaternion<f64>,
    pub projection: Projection,
    /// Scene node the camera is attached to, if any
    pub parent: Option<NodeId>,
    matrix_world: Matrix4<f64>,
    matrix_world_inverse: Matrix4<f64>,
}

impl Camera {
    pub fn new(projection: Projection) -> Self {
        Self {
            position: Point3::origin(),
            rotation: UnitQuaternion::identity(),
            projection,
            parent: None,
            matrix_world: Matrix4::identity(),
            matrix_world_inverse: Matrix4::identity(),
        }
    }

    /// `fov` in radians
    pub fn perspective(fov: f64, aspect: f64, near: f64, far: f64) -> Self {
        Self::new(Projection::Perspective {
            fov,
            aspect,
            near,
            far,
        })
    }

    pub fn orthographic(left: f64, right: f64, top: f64, bottom: f64, near: f64, far: f64) -> Self {
        Self::new(Projection::Orthographic {
            left,
            right,
            top,
            bottom,
            near,
            far,
        })
    }

    pub fn is_orthographic(&self) -> bool {
        matches!(self.projection, Projection::Orthographic { .. })
    }

    /// Orient the camera so it looks at `target` from its current position.
    pub fn look_at(&mut self, target: &Point3<f64>, up: &Vector3<f64>) {
        self.rotation = Transform::look_at(&self.position, target, up);
    }

    /// Update the aspect ratio of a perspective camera. Ignored for orthographic.
    pub fn set_aspect(&mut self, value: f64) {
        if let Projection::Perspective { aspect, .. } = &mut self.projection {
            *aspect = value;
        }
    }

    /// Create the projection matrix
    #[rustfmt::skip]
    pub fn projection_matrix(&self) -> Matrix4<f64> {
        match self.projection {
            Projection::Perspective {
                fov,
                aspect,
                near,
                far,
            } => {
                // no aspect in the focal element, so a zero-width viewport stays finite there
                let focal = 1.0 / (fov / 2.0).tan();
                Matrix4::new(
                    focal / aspect, 0.0, 0.0, 0.0,
                    0.0, focal, 0.0, 0.0,
                    0.0, 0.0, -(far + near) / (far - near), -2.0 * far * near / (far - near),
                    0.0, 0.0, -1.0, 0.0,
                )
            }
            Projection::Orthographic {
                left,
                right,
                top,
                bottom,
                near,
                far,
            } => {
                let w = 1.0 / (right - left);
                let h = 1.0 / (top - bottom);
                let p = 1.0 / (far - near);
                Matrix4::new(
                    2.0 * w, 0.0, 0.0, -(right + left) * w,
                    0.0, 2.0 * h, 0.0, -(top + bottom) * h,
                    0.0, 0.0, -2.0 * p, -(far + near) * p,
                    0.0, 0.0, 0.0, 1.0,
                )
            }
        }
    }

    /// Local matrix from position and rotation.
    pub fn local_matrix(&self) -> Matrix4<f64> {
        Transform::compose(
            &self.position.coords,
            &self.rotation,
            &Vector3::new(1.0, 1.0, 1.0),
        )
    }

    /// Recompute the world matrix and its inverse. `parent_world` is the world
    /// matrix of the node in `parent`, when attached.
    pub fn update_matrix_world(&mut self, parent_world: Option<&Matrix4<f64>>) {
        let local = self.local_matrix();
        self.matrix_world = match parent_world {
            Some(parent) => parent * local,
            None => local,
        };
        self.matrix_world_inverse = self
            .matrix_world
            .try_inverse()
            .unwrap_or_else(Matrix4::identity);
    }

    pub fn matrix_world(&self) -> &Matrix4<f64> {
        &self.matrix_world
    }

    /// The view matrix.
    pub fn matrix_world_inverse(&self) -> &Matrix4<f64> {
        &self.matrix_world_inverse
    }

    pub fn world_position(&self) -> Vector3<f64> {
        Transform::position(&self.matrix_world)
    }
}

impl Default for Camera {
    fn default() -> Self {
        let mut camera = Self::perspective(std::f64::consts::FRAC_PI_4, 800.0 / 600.0, 0.1, 100.0);
        camera.position = Point3::new(0.0, 0.0, 5.0);
        camera
    }
}
