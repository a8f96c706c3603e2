use nalgebra::{Matrix3, Point2, Vector2};

use crate::consts::SINGULAR_DETERMINANT;

/// Planar affine transform stored as a 3x3 homogeneous matrix.
///
/// Points are `(x, y) = (col, row)`. The matrix maps source-plane points to
/// output-plane points; warping samples the source through the inverse,
/// which is computed once here.
#[derive(Clone, Debug, PartialEq)]
pub struct Affine2 {
    matrix: Matrix3<f64>,
    inverse: Matrix3<f64>,
}

impl Affine2 {
    pub fn identity() -> Self {
        Self {
            matrix: Matrix3::identity(),
            inverse: Matrix3::identity(),
        }
    }

    /// Pure translation by `(tx, ty)` pixels.
    pub fn translation(tx: f64, ty: f64) -> Self {
        Self {
            matrix: Matrix3::new_translation(&Vector2::new(tx, ty)),
            inverse: Matrix3::new_translation(&Vector2::new(-tx, -ty)),
        }
    }

    /// Build from row-major nested arrays. Fails with a reason if the matrix
    /// is non-finite or singular.
    pub fn from_matrix(rows: [[f64; 3]; 3]) -> std::result::Result<Self, String> {
        Self::from_matrix3(Matrix3::from_fn(|r, c| rows[r][c]))
    }

    pub fn from_matrix3(matrix: Matrix3<f64>) -> std::result::Result<Self, String> {
        if matrix.iter().any(|v| !v.is_finite()) {
            return Err("matrix contains non-finite values".into());
        }
        let det = matrix.determinant();
        if det.abs() < SINGULAR_DETERMINANT {
            return Err(format!("matrix is singular (det = {:.3e})", det));
        }
        let inverse = matrix
            .try_inverse()
            .ok_or_else(|| format!("matrix is not invertible (det = {:.3e})", det))?;
        Ok(Self { matrix, inverse })
    }

    /// Build from nested rows as read from a transform store.
    pub fn from_rows(rows: &[Vec<f64>]) -> std::result::Result<Self, String> {
        if rows.len() != 3 || rows.iter().any(|r| r.len() != 3) {
            let shape: Vec<usize> = rows.iter().map(|r| r.len()).collect();
            return Err(format!(
                "expected a 3x3 homogeneous matrix, got {} rows with lengths {:?}",
                rows.len(),
                shape
            ));
        }
        Self::from_matrix3(Matrix3::from_fn(|r, c| rows[r][c]))
    }

    pub fn matrix(&self) -> &Matrix3<f64> {
        &self.matrix
    }

    pub fn inverse(&self) -> Affine2 {
        Affine2 {
            matrix: self.inverse,
            inverse: self.matrix,
        }
    }

    /// Map `(x, y)` through the forward matrix.
    pub fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        project(&self.matrix, x, y)
    }

    /// Map `(x, y)` through the inverse matrix.
    pub fn apply_inverse(&self, x: f64, y: f64) -> (f64, f64) {
        project(&self.inverse, x, y)
    }

    /// `self` followed by `other`.
    pub fn then(&self, other: &Affine2) -> Affine2 {
        Affine2 {
            matrix: other.matrix * self.matrix,
            inverse: self.inverse * other.inverse,
        }
    }
}

fn project(m: &Matrix3<f64>, x: f64, y: f64) -> (f64, f64) {
    let p = m.transform_point(&Point2::new(x, y));
    (p.x, p.y)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inverse_of_rotation_scale() {
        let (s, c) = 0.3f64.sin_cos();
        let t = Affine2::from_matrix([[1.2 * c, -s, 4.0], [s, 0.9 * c, -2.5], [0.0, 0.0, 1.0]])
            .unwrap();
        let (x, y) = t.apply(3.0, 7.0);
        let (bx, by) = t.apply_inverse(x, y);
        assert!((bx - 3.0).abs() < 1e-12);
        assert!((by - 7.0).abs() < 1e-12);
    }

    #[test]
    fn test_singular_rejected() {
        let err = Affine2::from_matrix([[1.0, 2.0, 0.0], [2.0, 4.0, 0.0], [0.0, 0.0, 1.0]]);
        assert!(err.is_err());
    }

    #[test]
    fn test_ragged_rows_rejected() {
        let rows = vec![vec![1.0, 0.0, 0.0], vec![0.0, 1.0], vec![0.0, 0.0, 1.0]];
        assert!(Affine2::from_rows(&rows).is_err());
    }

    #[test]
    fn test_translation_inverse_is_exact() {
        let t = Affine2::translation(2.0, -3.0);
        assert_eq!(t.apply_inverse(5.0, 5.0), (3.0, 8.0));
        assert_eq!(t.inverse().matrix()[(0, 2)], -2.0);
    }

    #[test]
    fn test_then_composes_in_order() {
        let a = Affine2::translation(1.0, 0.0);
        let b = Affine2::from_matrix([[2.0, 0.0, 0.0], [0.0, 2.0, 0.0], [0.0, 0.0, 1.0]]).unwrap();
        // translate then scale: (1,1) -> (2,1) -> (4,2)
        assert_eq!(a.then(&b).apply(1.0, 1.0), (4.0, 2.0));
    }
}
