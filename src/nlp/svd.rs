use ndarray::{s, Array1, Array2, ArrayView1, ArrayView2};

const MAX_SWEEPS: usize = 60;
const TOLERANCE: f64 = 1e-12;

/// Extra basis vectors carried by the subspace iteration beyond the requested rank.
const OVERSAMPLE: usize = 10;
const MAX_POWER_ITERATIONS: usize = 60;
/// Columns shrinking below this share of their pre-projection norm are treated as null.
const NULL_COLUMN: f64 = 1e-10;

/// Singular values and right singular vectors of a matrix.
#[derive(Debug, Clone)]
pub struct Svd {
    /// Descending.
    pub singular_values: Vec<f64>,
    /// `n × r` for `r` singular values; column `i` is the right singular vector
    /// for `singular_values[i]`.
    pub v: Array2<f64>,
}

/// A matrix known only through its products with vectors.
pub trait MatrixOperator {
    fn nrows(&self) -> usize;
    fn ncols(&self) -> usize;
    /// `A x`, with `x` of length `ncols`.
    fn mul_vec(&self, x: ArrayView1<'_, f64>) -> Array1<f64>;
    /// `Aᵀ y`, with `y` of length `nrows`.
    fn mul_transpose_vec(&self, y: ArrayView1<'_, f64>) -> Array1<f64>;
}

/// One-sided (Hestenes) Jacobi SVD of an `m × n` matrix.
///
/// Columns are rotated pairwise until they are mutually orthogonal; the column
/// norms are then the singular values and the accumulated rotations form `V`.
/// Cost is cubic in `n`, so it is meant for small dense matrices.
pub fn jacobi_svd(matrix: ArrayView2<'_, f64>) -> Svd {
    let (m, n) = matrix.dim();
    let mut u = matrix.to_owned();
    let mut v = Array2::<f64>::eye(n);

    for _ in 0..MAX_SWEEPS {
        let mut rotated = false;
        for p in 0..n {
            for q in (p + 1)..n {
                let alpha = u.column(p).dot(&u.column(p));
                let beta = u.column(q).dot(&u.column(q));
                let gamma = u.column(p).dot(&u.column(q));
                if alpha == 0.0 || beta == 0.0 || gamma.abs() <= TOLERANCE * (alpha * beta).sqrt() {
                    continue;
                }
                rotated = true;

                let zeta = (beta - alpha) / (2.0 * gamma);
                let t = zeta.signum() / (zeta.abs() + (1.0 + zeta * zeta).sqrt());
                let c = 1.0 / (1.0 + t * t).sqrt();
                let s = c * t;

                for i in 0..m {
                    let (up, uq) = (u[[i, p]], u[[i, q]]);
                    u[[i, p]] = c * up - s * uq;
                    u[[i, q]] = s * up + c * uq;
                }
                for i in 0..n {
                    let (vp, vq) = (v[[i, p]], v[[i, q]]);
                    v[[i, p]] = c * vp - s * vq;
                    v[[i, q]] = s * vp + c * vq;
                }
            }
        }
        if !rotated {
            break;
        }
    }

    let norms: Vec<f64> = (0..n).map(|j| u.column(j).dot(&u.column(j)).sqrt()).collect();
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| norms[b].total_cmp(&norms[a]));

    let mut sorted_v = Array2::<f64>::zeros((n, n));
    for (dst, &src) in order.iter().enumerate() {
        sorted_v.column_mut(dst).assign(&v.column(src));
    }

    Svd {
        singular_values: order.iter().map(|&j| norms[j]).collect(),
        v: sorted_v,
    }
}


/// Leading `rank` singular values and right singular vectors of `a`.
///
/// Subspace iteration on `AᵀA` with a few oversampled vectors, followed by a
/// Rayleigh-Ritz step solved with [`jacobi_svd`]. Only products with `a` are
/// needed, so the cost is linear in the operator size for a fixed rank.
pub fn truncated_svd<A: MatrixOperator + ?Sized>(a: &A, rank: usize) -> Svd {
    let n = a.ncols();
    let rank = rank.min(n);
    if rank == 0 {
        return Svd {
            singular_values: Vec::new(),
            v: Array2::zeros((n, 0)),
        };
    }

    let width = (rank + OVERSAMPLE).min(n);
    let basis = if width == n {
        Array2::eye(n)
    } else {
        power_iterate(a, width)
    };

    let projected = basis.t().dot(&apply_gram(a, &basis));
    let inner = jacobi_svd(projected.view());
    let v = basis.dot(&inner.v.slice(s![.., ..rank]));

    Svd {
        // Eigenvalues of the projected Gram matrix are squared singular values.
        singular_values: inner
            .singular_values
            .iter()
            .take(rank)
            .map(|lambda| lambda.max(0.0).sqrt())
            .collect(),
        v,
    }
}

fn power_iterate<A: MatrixOperator + ?Sized>(a: &A, width: usize) -> Array2<f64> {
    let mut basis = Array2::from_shape_fn((a.ncols(), width), |(row, col)| seed_value(row, col));
    orthonormalize(&mut basis);

    for _ in 0..MAX_POWER_ITERATIONS {
        let mut next = apply_gram(a, &basis);
        orthonormalize(&mut next);

        let live = next
            .columns()
            .into_iter()
            .filter(|c| c.iter().any(|x| *x != 0.0))
            .count();
        let overlap: f64 = next.t().dot(&basis).iter().map(|x| x * x).sum();
        basis = next;
        if (live as f64 - overlap).abs() <= TOLERANCE {
            break;
        }
    }
    basis
}

/// `AᵀA B`, column by column.
fn apply_gram<A: MatrixOperator + ?Sized>(a: &A, block: &Array2<f64>) -> Array2<f64> {
    let mut out = Array2::<f64>::zeros(block.dim());
    for (col, x) in block.columns().into_iter().enumerate() {
        let y = a.mul_vec(x);
        out.column_mut(col).assign(&a.mul_transpose_vec(y.view()));
    }
    out
}

/// Modified Gram-Schmidt, two passes per column. Dependent columns become zero.
fn orthonormalize(block: &mut Array2<f64>) {
    for col in 0..block.ncols() {
        let scale = block.column(col).dot(&block.column(col)).sqrt();
        for _ in 0..2 {
            for prev in 0..col {
                let previous = block.column(prev).to_owned();
                let projection = block.column(col).dot(&previous);
                block.column_mut(col).scaled_add(-projection, &previous);
            }
        }
        let norm = block.column(col).dot(&block.column(col)).sqrt();
        if norm > 0.0 && norm > scale * NULL_COLUMN {
            block.column_mut(col).mapv_inplace(|x| x / norm);
        } else {
            block.column_mut(col).fill(0.0);
        }
    }
}

/// Deterministic, well spread starting block in `[-0.5, 0.5)`.
fn seed_value(row: usize, col: usize) -> f64 {
    let h = (row as u64)
        .wrapping_mul(2_654_435_761)
        .wrapping_add((col as u64).wrapping_mul(40_503))
        .wrapping_add(12_345)
        % 10_007;
    h as f64 / 10_007.0 - 0.5
}
