use cgmath::Matrix4;

/// Maps OpenGL clip-space depth `[-1, 1]` onto wgpu's `[0, 1]`.
///
/// `Matrix4::new` takes columns, so the `0.5` depth offset sits in the last column.
#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

pub fn convert_matrix4_to_array(matrix4: Matrix4<f32>) -> [[f32; 4]; 4] {
    let mut result = [[0.0; 4]; 4];

    for i in 0..4 {
        for j in 0..4 {
            result[i][j] = matrix4[i][j];
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{Deg, Vector4};

    #[test]
    fn test_depth_range_correction() {
        let projection = OPENGL_TO_WGPU_MATRIX * cgmath::perspective(Deg(45.0), 1.0, 0.1, 100.0);

        let near = projection * Vector4::new(0.0, 0.0, -0.1, 1.0);
        let far = projection * Vector4::new(0.0, 0.0, -100.0, 1.0);
        assert!((near.z / near.w).abs() < 1e-4);
        assert!((far.z / far.w - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_depth_correction_keeps_perspective_divide() {
        let gl = cgmath::perspective(Deg(45.0), 1.0, 0.1, 100.0);
        let point = Vector4::new(1.0, 0.5, -2.5, 1.0);

        let corrected = OPENGL_TO_WGPU_MATRIX * gl * point;
        let original = gl * point;
        assert_eq!(corrected.w, original.w);
        assert!((corrected.x / corrected.w - original.x / original.w).abs() < 1e-6);
        assert!((corrected.y / corrected.w - original.y / original.w).abs() < 1e-6);
        // x = tan(22.5)^-1 / 2.5
        assert!((corrected.x / corrected.w - 0.965_685_4 / 2.5).abs() < 1e-4);
    }

    #[test]
    fn test_matrix_conversion_is_column_major() {
        let matrix = Matrix4::from_translation(cgmath::Vector3::new(1.0, 2.0, 3.0));
        let array = convert_matrix4_to_array(matrix);
        assert_eq!(array[3], [1.0, 2.0, 3.0, 1.0]);
    }
}
