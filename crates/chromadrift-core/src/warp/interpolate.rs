use ndarray::{ArrayView2, ArrayView3};

/// Bilinear sample of a plane at fractional `(y, x)`.
///
/// Neighbours outside the plane contribute the constant 0.
pub fn bilinear_sample(data: &ArrayView2<f64>, y: f64, x: f64) -> f64 {
    let (h, w) = data.dim();

    let x0 = x.floor() as i64;
    let y0 = y.floor() as i64;
    let x1 = x0 + 1;
    let y1 = y0 + 1;

    let fx = x - x0 as f64;
    let fy = y - y0 as f64;

    let sample = |r: i64, c: i64| -> f64 {
        if r >= 0 && r < h as i64 && c >= 0 && c < w as i64 {
            data[[r as usize, c as usize]]
        } else {
            0.0
        }
    };

    // Skip zero-weight taps so integer coordinates reproduce samples exactly.
    let mut acc = sample(y0, x0) * (1.0 - fx) * (1.0 - fy);
    if fx != 0.0 {
        acc += sample(y0, x1) * fx * (1.0 - fy);
    }
    if fy != 0.0 {
        acc += sample(y1, x0) * (1.0 - fx) * fy;
        if fx != 0.0 {
            acc += sample(y1, x1) * fx * fy;
        }
    }
    acc
}

/// Trilinear sample of a volume at fractional `(z, y, x)`, zero outside.
pub fn trilinear_sample(data: &ArrayView3<f64>, z: f64, y: f64, x: f64) -> f64 {
    let depth = data.dim().0 as i64;
    let z0 = z.floor() as i64;
    let fz = z - z0 as f64;

    let plane = |zi: i64| -> f64 {
        if zi >= 0 && zi < depth {
            bilinear_sample(&data.index_axis(ndarray::Axis(0), zi as usize), y, x)
        } else {
            0.0
        }
    };

    let lower = plane(z0) * (1.0 - fz);
    if fz != 0.0 {
        lower + plane(z0 + 1) * fz
    } else {
        lower
    }
}

/// True when `(z, y, x)` lies within the sample grid of a volume of `dim`.
pub fn inside(dim: (usize, usize, usize), z: f64, y: f64, x: f64) -> bool {
    let (d, h, w) = dim;
    z >= 0.0
        && z <= d as f64 - 1.0
        && y >= 0.0
        && y <= h as f64 - 1.0
        && x >= 0.0
        && x <= w as f64 - 1.0
}
