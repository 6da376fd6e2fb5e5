//! Planar projective transforms from four point correspondences.
//!
//! The transform maps `(x, y)` to
//! ```text
//! x' = (h00*x + h01*y + h02) / (h20*x + h21*y + h22)
//! y' = (h10*x + h11*y + h12) / (h20*x + h21*y + h22)
//! ```
//! with `h22` fixed to 1 when solving.

use ndarray::{Array1, Array2};
use tracing::debug;

use crate::consts::PIVOT_TOLERANCE;
use crate::error::{Result, ScalerError};
use crate::geometry::Point;
use crate::solver::solve;

/// Sine of the angle below which three points count as collinear.
const COLLINEAR_SINE: f64 = 1e-9;

/// A 3x3 homography, row-major.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Homography {
    pub m: [[f64; 3]; 3],
}

impl Default for Homography {
    fn default() -> Self {
        Self::identity()
    }
}

impl Homography {
    pub const fn identity() -> Self {
        Self {
            m: [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
        }
    }

    /// Solve the homography taking each `src[i]` to `dst[i]`.
    ///
    /// Fails with [`ScalerError::SingularSystem`] when any three points of
    /// either quad are collinear (or coincide), or when elimination finds no
    /// usable pivot.
    pub fn from_quads<S, D>(src: &[Point<S>; 4], dst: &[Point<D>; 4]) -> Result<Self> {
        if has_collinear_triple(src) || has_collinear_triple(dst) {
            debug!("Rejecting quad with collinear corners");
            return Err(ScalerError::SingularSystem);
        }

        let mut a = Array2::<f64>::zeros((8, 8));
        let mut b = Array1::<f64>::zeros(8);
        for (i, (s, d)) in src.iter().zip(dst.iter()).enumerate() {
            let r = 2 * i;
            a[[r, 0]] = s.x;
            a[[r, 1]] = s.y;
            a[[r, 2]] = 1.0;
            a[[r, 6]] = -d.x * s.x;
            a[[r, 7]] = -d.x * s.y;
            b[r] = d.x;

            a[[r + 1, 3]] = s.x;
            a[[r + 1, 4]] = s.y;
            a[[r + 1, 5]] = 1.0;
            a[[r + 1, 6]] = -d.y * s.x;
            a[[r + 1, 7]] = -d.y * s.y;
            b[r + 1] = d.y;
        }

        let h = solve(&a, &b)?;
        let result = Self {
            m: [[h[0], h[1], h[2]], [h[3], h[4], h[5]], [h[6], h[7], 1.0]],
        };
        debug!(matrix = ?result.m, "Homography solved");
        Ok(result)
    }

    /// Apply the transform, including the perspective divide.
    ///
    /// Points mapped to the line at infinity come back as NaN.
    pub fn transform<S, D>(&self, p: Point<S>) -> Point<D> {
        let m = &self.m;
        let w = m[2][0] * p.x + m[2][1] * p.y + m[2][2];
        if w.abs() < f64::EPSILON {
            return Point::new(f64::NAN, f64::NAN);
        }
        Point::new(
            (m[0][0] * p.x + m[0][1] * p.y + m[0][2]) / w,
            (m[1][0] * p.x + m[1][1] * p.y + m[1][2]) / w,
        )
    }

    pub fn determinant(&self) -> f64 {
        let m = &self.m;
        m[0][0] * (m[1][1] * m[2][2] - m[1][2] * m[2][1])
            - m[0][1] * (m[1][0] * m[2][2] - m[1][2] * m[2][0])
            + m[0][2] * (m[1][0] * m[2][1] - m[1][1] * m[2][0])
    }

    /// The inverse transform, via the adjugate.
    pub fn inverse(&self) -> Result<Self> {
        let m = &self.m;
        let det = self.determinant();
        let scale = m.iter().flatten().fold(0.0f64, |a, v| a.max(v.abs()));
        if !det.is_finite() || det.abs() <= PIVOT_TOLERANCE * scale.powi(3) {
            return Err(ScalerError::SingularSystem);
        }

        let adj = [
            [
                m[1][1] * m[2][2] - m[1][2] * m[2][1],
                m[0][2] * m[2][1] - m[0][1] * m[2][2],
                m[0][1] * m[1][2] - m[0][2] * m[1][1],
            ],
            [
                m[1][2] * m[2][0] - m[1][0] * m[2][2],
                m[0][0] * m[2][2] - m[0][2] * m[2][0],
                m[0][2] * m[1][0] - m[0][0] * m[1][2],
            ],
            [
                m[1][0] * m[2][1] - m[1][1] * m[2][0],
                m[0][1] * m[2][0] - m[0][0] * m[2][1],
                m[0][0] * m[1][1] - m[0][1] * m[1][0],
            ],
        ];

        let mut inv = [[0.0; 3]; 3];
        for (r, row) in adj.iter().enumerate() {
            for (c, v) in row.iter().enumerate() {
                inv[r][c] = v / det;
            }
        }
        // Renormalize so h22 = 1 when possible
        let norm = inv[2][2];
        if norm.abs() > f64::EPSILON {
            for row in inv.iter_mut() {
                for v in row.iter_mut() {
                    *v /= norm;
                }
            }
        }
        Ok(Self { m: inv })
    }
}

/// Solve the homography taking `src[i]` to `dst[i]`.
pub fn compute_homography<S, D>(src: &[Point<S>; 4], dst: &[Point<D>; 4]) -> Result<Homography> {
    Homography::from_quads(src, dst)
}

/// Map `p` through `h`.
pub fn transform_point<S, D>(p: Point<S>, h: &Homography) -> Point<D> {
    h.transform(p)
}

fn has_collinear_triple<S>(quad: &[Point<S>; 4]) -> bool {
    const TRIPLES: [[usize; 3]; 4] = [[0, 1, 2], [0, 1, 3], [0, 2, 3], [1, 2, 3]];
    TRIPLES.iter().any(|&[i, j, k]| {
        let (a, b, c) = (&quad[i], &quad[j], &quad[k]);
        let (ux, uy) = (b.x - a.x, b.y - a.y);
        let (vx, vy) = (c.x - a.x, c.y - a.y);
        let lengths = ux.hypot(uy) * vx.hypot(vy);
        if !lengths.is_finite() || lengths == 0.0 {
            return true;
        }
        (ux * vy - uy * vx).abs() <= COLLINEAR_SINE * lengths
    })
}
