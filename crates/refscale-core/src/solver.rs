//! Dense linear system solver (Gaussian elimination with partial pivoting).

use ndarray::{s, Array1, Array2, Axis};
use tracing::debug;

use crate::consts::PIVOT_TOLERANCE;
use crate::error::{Result, ScalerError};

/// Solve `a * x = b` for a square `a`.
///
/// The inputs are copied into a working augmented matrix; neither is mutated.
/// At each column the row with the largest absolute entry is swapped into the
/// pivot position. A pivot at or below `PIVOT_TOLERANCE` scaled by the largest
/// coefficient magnitude fails with [`ScalerError::SingularSystem`].
pub fn solve(a: &Array2<f64>, b: &Array1<f64>) -> Result<Array1<f64>> {
    let (rows, cols) = a.dim();
    if rows != cols || b.len() != rows {
        return Err(ScalerError::ShapeMismatch {
            rows,
            cols,
            rhs: b.len(),
        });
    }
    let n = rows;
    if n == 0 {
        return Ok(Array1::zeros(0));
    }

    let scale = a.iter().fold(0.0f64, |m, v| m.max(v.abs()));
    if !scale.is_finite() || scale == 0.0 {
        return Err(ScalerError::SingularSystem);
    }
    let tolerance = PIVOT_TOLERANCE * scale;

    let mut m = Array2::<f64>::zeros((n, n + 1));
    m.slice_mut(s![.., ..n]).assign(a);
    m.slice_mut(s![.., n]).assign(b);

    for col in 0..n {
        let pivot_row = (col..n)
            .max_by(|&i, &j| m[[i, col]].abs().total_cmp(&m[[j, col]].abs()))
            .unwrap_or(col);
        let pivot = m[[pivot_row, col]];
        if !pivot.is_finite() || pivot.abs() <= tolerance {
            debug!(col, pivot, tolerance, "Singular pivot");
            return Err(ScalerError::SingularSystem);
        }
        if pivot_row != col {
            swap_rows(&mut m, pivot_row, col);
        }

        for row in col + 1..n {
            let factor = m[[row, col]] / pivot;
            if factor == 0.0 {
                continue;
            }
            for k in col..=n {
                m[[row, k]] -= factor * m[[col, k]];
            }
        }
    }

    let mut x = Array1::<f64>::zeros(n);
    for row in (0..n).rev() {
        let mut acc = m[[row, n]];
        for k in row + 1..n {
            acc -= m[[row, k]] * x[k];
        }
        x[row] = acc / m[[row, row]];
    }

    if x.iter().any(|v| !v.is_finite()) {
        return Err(ScalerError::SingularSystem);
    }
    Ok(x)
}

fn swap_rows(m: &mut Array2<f64>, r1: usize, r2: usize) {
    let cols = m.len_of(Axis(1));
    for k in 0..cols {
        m.swap([r1, k], [r2, k]);
    }
}
