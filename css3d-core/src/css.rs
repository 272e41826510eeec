/// CSS `matrix3d` string derivation for cameras and objects
use nalgebra::Matrix4;

use crate::projection::{Camera, Projection};

/// Components smaller than this are written as `0`.
pub const EPSILON: f64 = 1e-10;

/// Snap near-zero values (and negative zero) to exactly 0.
pub fn epsilon(value: f64) -> f64 {
    if value.abs() < EPSILON {
        0.0
    } else {
        value
    }
}

/// Shortest round-trip decimal, never in exponent notation.
pub fn number(value: f64) -> String {
    format!("{}", epsilon(value))
}

fn matrix3d(elements: &[f64], negate: impl Fn(usize) -> bool) -> String {
    let mut css = String::with_capacity(192);
    css.push_str("matrix3d(");
    for (index, value) in elements.iter().enumerate() {
        if index > 0 {
            css.push(',');
        }
        let value = if negate(index) { -value } else { *value };
        css.push_str(&number(value));
    }
    css.push(')');
    css
}

/// The camera transform for the camera frame element.
///
/// Rows 1, 5, 9 and 13 (column-major) are negated to go from the Y-up scene
/// convention to the Y-down screen. `fov` is the focal length in pixels.
pub fn camera_css_matrix(matrix_world_inverse: &Matrix4<f64>, camera: &Camera, fov: f64) -> String {
    let matrix_css = matrix3d(matrix_world_inverse.as_slice(), |i| i % 4 == 1);

    match camera.projection {
        Projection::Orthographic {
            left,
            right,
            top,
            bottom,
            ..
        } => {
            let tx = -(right + left) / 2.0;
            let ty = (top + bottom) / 2.0;
            format!(
                "scale({})translate({}px,{}px){}",
                number(fov),
                number(tx),
                number(ty),
                matrix_css
            )
        }
        Projection::Perspective { .. } => format!("translateZ({}px){}", number(fov), matrix_css),
    }
}

/// Style of the shared camera frame: the camera matrix re-centred on the viewport.
pub fn camera_frame_style(camera_css: &str, width_half: f64, height_half: f64) -> String {
    format!(
        "{}translate({}px,{}px)",
        camera_css,
        number(width_half),
        number(height_half)
    )
}

/// What an object's matrix is composed with.
#[derive(Debug, Clone, Copy)]
pub enum ObjectFrame<'a> {
    /// The camera frame element composes the camera transform.
    Native,
    /// No nested 3D contexts: the camera transform is baked into the object.
    Legacy {
        camera_css: &'a str,
        width_half: f64,
        height_half: f64,
    },
}

/// The transform of an object element.
///
/// Elements 4 to 7 (the second basis column) are negated. This is not the
/// camera's row flip: objects live inside the already flipped camera frame.
pub fn object_css_matrix(matrix: &Matrix4<f64>, frame: ObjectFrame<'_>) -> String {
    let matrix_css = matrix3d(matrix.as_slice(), |i| (4..8).contains(&i));

    match frame {
        ObjectFrame::Native => format!("translate(-50%,-50%){}", matrix_css),
        ObjectFrame::Legacy {
            camera_css,
            width_half,
            height_half,
        } => format!(
            "translate(-50%,-50%)translate({}px,{}px){}{}",
            number(width_half),
            number(height_half),
            camera_css,
            matrix_css
        ),
    }
}
