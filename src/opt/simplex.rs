//! Dense-tableau primal simplex for standard-form maximization problems.

use serde::Serialize;

/// Default pivot budget before a solve is cut off.
pub const MAX_ITERATIONS: usize = 1000;

/// Numerical tolerance for entering-column and pivot-entry tests.
const EPS: f64 = 1e-10;

/// Terminal state of a solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SolveStatus {
    /// No improving column remained; the returned vector is optimal.
    Optimal,
    /// An improving column had no positive entry; the objective is unbounded.
    Unbounded,
    /// The pivot budget ran out; the returned vector is feasible for the
    /// pivots performed so far but not verified optimal.
    IterationLimitReached,
}

/// Result of a solve: the variable vector and how the solve ended.
#[derive(Debug, Clone)]
pub struct LpSolution {
    /// Values of the `n` original variables (slack values are dropped).
    pub x: Vec<f64>,
    /// How the solve terminated.
    pub status: SolveStatus,
    /// Objective value `c·x` accumulated in the tableau.
    pub objective: f64,
    /// Pivots performed.
    pub iterations: usize,
}

/// Maximizes `c·x` subject to `a·x <= b`, `x >= 0`.
///
/// Builds an `m x (n + m + 1)` tableau (original columns, identity slack
/// block, right-hand side) plus an objective row holding `-c`, then pivots:
/// the entering column is the most negative objective entry, the leaving row
/// the minimum ratio `rhs / entry` over strictly positive entries. Stops at
/// [`MAX_ITERATIONS`] pivots as a guard against cycling on degenerate
/// tableaus.
///
/// The slack basis is the starting point, so every entry of `b` must be
/// non-negative; callers formulate their constraints accordingly.
///
/// # Panics
///
/// Panics if `b.len() != a.len()` or any row of `a` differs in length
/// from `c`.
pub fn solve_lp(c: &[f64], a: &[Vec<f64>], b: &[f64]) -> LpSolution {
    solve_lp_capped(c, a, b, MAX_ITERATIONS)
}

/// [`solve_lp`] with an explicit pivot budget.
pub fn solve_lp_capped(c: &[f64], a: &[Vec<f64>], b: &[f64], max_iterations: usize) -> LpSolution {
    let m = a.len();
    let n = c.len();
    assert_eq!(b.len(), m, "rhs length must match constraint row count");
    for (i, row) in a.iter().enumerate() {
        assert_eq!(
            row.len(),
            n,
            "constraint row {i} length must match objective length"
        );
    }

    let width = n + m + 1;
    let mut tableau: Vec<Vec<f64>> = Vec::with_capacity(m + 1);
    for (i, row) in a.iter().enumerate() {
        let mut t_row = vec![0.0; width];
        t_row[..n].copy_from_slice(row);
        t_row[n + i] = 1.0;
        t_row[width - 1] = b[i];
        tableau.push(t_row);
    }
    let mut objective_row = vec![0.0; width];
    for (j, &cj) in c.iter().enumerate() {
        objective_row[j] = -cj;
    }
    tableau.push(objective_row);

    // basis[i] is the variable index currently basic in constraint row i.
    let mut basis: Vec<usize> = (n..n + m).collect();
    let mut status = SolveStatus::IterationLimitReached;
    let mut iterations = 0;

    for _ in 0..max_iterations {
        // Entering column: most negative objective entry.
        let mut entering = None;
        let mut most_negative = -EPS;
        for (j, &v) in tableau[m][..n + m].iter().enumerate() {
            if v < most_negative {
                most_negative = v;
                entering = Some(j);
            }
        }
        let Some(col) = entering else {
            status = SolveStatus::Optimal;
            break;
        };

        // Leaving row: minimum ratio over strictly positive column entries.
        let mut leaving = None;
        let mut best_ratio = f64::INFINITY;
        for (i, row) in tableau[..m].iter().enumerate() {
            let entry = row[col];
            if entry > EPS {
                let ratio = row[width - 1] / entry;
                if ratio < best_ratio {
                    best_ratio = ratio;
                    leaving = Some(i);
                }
            }
        }
        let Some(row) = leaving else {
            status = SolveStatus::Unbounded;
            break;
        };

        // Pivot: normalize the leaving row, eliminate the column elsewhere.
        let pivot = tableau[row][col];
        for v in &mut tableau[row] {
            *v /= pivot;
        }
        let pivot_row = tableau[row].clone();
        for (i, other) in tableau.iter_mut().enumerate() {
            if i == row {
                continue;
            }
            let factor = other[col];
            if factor == 0.0 {
                continue;
            }
            for (v, &pv) in other.iter_mut().zip(&pivot_row) {
                *v -= factor * pv;
            }
        }
        basis[row] = col;
        iterations += 1;
    }

    // Basic variables below n carry their row's RHS; everything else is 0.
    let mut x = vec![0.0; n];
    for (i, &var) in basis.iter().enumerate() {
        if var < n {
            x[var] = tableau[i][width - 1];
        }
    }

    LpSolution {
        x,
        status,
        objective: tableau[m][width - 1],
        iterations,
    }
}
