//! Dense revised simplex run on the dual of a tall LP.
//!
//! Every bound is folded into the row list, so the primal reads
//! `min c·x, g_i·x <= h_i` with `x` free. Its dual
//! `min h·λ, Gᵀλ = -c, λ >= 0` has only `n` equality rows, so the basis is
//! `n × n` no matter how many examples are added:
//! - the basis inverse is rebuilt from the original rows every pivot, so
//!   round-off does not accumulate across pivots;
//! - the reduced cost of row `i` is the primal slack `h_i - g_i·x` at the
//!   current multiplier `x = B⁻ᵀ h_B`, so dual optimality is primal
//!   feasibility and the optimum comes out of the final basis;
//! - pricing is Dantzig with scaled reduced costs, the ratio test is Harris'
//!   two-pass rule with a relative pivot tolerance, and Bland's rule takes
//!   over after a run of non-improving pivots.
//!
//! Dual unbounded means the primal is infeasible. Dual infeasible leaves
//! primal unbounded or infeasible; a feasibility LP with one extra variable
//! decides between them.

use nalgebra::{DMatrix, DVector};

use super::{check_len, LinearProgramSolver, LpError};

/// Non-improving pivots in a row before Bland's rule takes over.
const STALL_PIVOTS: usize = 50;

/// Simplex tolerances and pivot budget.
#[derive(Clone, Copy, Debug)]
pub struct SimplexCfg {
    /// Pivots allowed per solve. `None` scales with the problem:
    /// `1000 + 20·(rows + variables)`.
    pub max_iterations: Option<usize>,
    /// Reduced costs above `-opt_tol·scale` count as nonnegative.
    pub opt_tol: f64,
    /// Direction entries at most `pivot_tol·max(1, ‖d‖∞)` are never pivots.
    pub pivot_tol: f64,
    /// Harris relaxation of the ratio test and phase-one residual threshold.
    pub feas_tol: f64,
}

impl Default for SimplexCfg {
    fn default() -> Self {
        Self {
            max_iterations: None,
            opt_tol: 1e-9,
            pivot_tol: 1e-9,
            feas_tol: 1e-9,
        }
    }
}

impl SimplexCfg {
    fn budget(&self, rows: usize, vars: usize) -> usize {
        self.max_iterations.unwrap_or(1000 + 20 * (rows + vars))
    }
}

/// Native `LinearProgramSolver`.
#[derive(Clone, Debug)]
pub struct SimplexSolver {
    dim: usize,
    cfg: SimplexCfg,
    objective: DVector<f64>,
    lower: DVector<f64>,
    upper: DVector<f64>,
    rows: Vec<(DVector<f64>, f64)>,
}

impl SimplexSolver {
    pub fn new(dim: usize) -> Result<Self, LpError> {
        Self::with_cfg(dim, SimplexCfg::default())
    }

    pub fn with_cfg(dim: usize, cfg: SimplexCfg) -> Result<Self, LpError> {
        if dim == 0 {
            return Err(LpError::ZeroDimension);
        }
        Ok(Self {
            dim,
            cfg,
            objective: DVector::zeros(dim),
            lower: DVector::from_element(dim, f64::NEG_INFINITY),
            upper: DVector::from_element(dim, f64::INFINITY),
            rows: Vec::new(),
        })
    }

    fn check_bounds(&self) -> Result<(), LpError> {
        for (index, (&lower, &upper)) in self.lower.iter().zip(self.upper.iter()).enumerate() {
            let ok = lower <= upper && lower < f64::INFINITY && upper > f64::NEG_INFINITY;
            if !ok {
                return Err(LpError::InvalidBounds {
                    index,
                    lower,
                    upper,
                });
            }
        }
        Ok(())
    }

    /// User rows followed by `x_j <= u_j` and `-x_j <= -l_j` for finite bounds.
    fn stacked_rows(&self) -> (DMatrix<f64>, DVector<f64>) {
        let n = self.dim;
        let mut rows = self.rows.clone();
        for j in 0..n {
            if self.upper[j].is_finite() {
                rows.push((unit(n, j, 1.0), self.upper[j]));
            }
            if self.lower[j].is_finite() {
                rows.push((unit(n, j, -1.0), -self.lower[j]));
            }
        }
        let g = DMatrix::from_fn(rows.len(), n, |i, j| rows[i].0[j]);
        let h = DVector::from_iterator(rows.len(), rows.iter().map(|(_, b)| *b));
        (g, h)
    }
}

impl LinearProgramSolver for SimplexSolver {
    #[inline]
    fn dim(&self) -> usize {
        self.dim
    }

    fn set_objective_function(&mut self, c: DVector<f64>) -> Result<(), LpError> {
        check_len(self.dim, c.len())?;
        self.objective = c;
        Ok(())
    }

    fn set_lower(&mut self, lower: DVector<f64>) -> Result<(), LpError> {
        check_len(self.dim, lower.len())?;
        self.lower = lower;
        Ok(())
    }

    fn set_upper(&mut self, upper: DVector<f64>) -> Result<(), LpError> {
        check_len(self.dim, upper.len())?;
        self.upper = upper;
        Ok(())
    }

    fn add_linear_constraint(&mut self, a: DVector<f64>, b: f64) -> Result<(), LpError> {
        check_len(self.dim, a.len())?;
        self.rows.push((a, b));
        Ok(())
    }

    #[inline]
    fn num_constraints(&self) -> usize {
        self.rows.len()
    }

    fn find_minimizer(&self) -> Result<DVector<f64>, LpError> {
        self.check_bounds()?;
        let (g, h) = self.stacked_rows();
        let mut iterations = 0;
        let outcome = solve_dual(&g, &h, &self.objective, self.cfg, &mut iterations)?;
        tracing::trace!(rows = g.nrows(), vars = self.dim, iterations, "simplex done");
        match outcome {
            DualOutcome::Optimal(x) => Ok(x),
            DualOutcome::Unbounded => Err(LpError::Infeasible),
            DualOutcome::Infeasible => {
                if is_feasible(&g, &h, self.cfg, &mut iterations)? {
                    Err(LpError::Unbounded)
                } else {
                    Err(LpError::Infeasible)
                }
            }
        }
    }
}

fn unit(n: usize, j: usize, value: f64) -> DVector<f64> {
    let mut e = DVector::zeros(n);
    e[j] = value;
    e
}

fn max_abs(v: &DVector<f64>) -> f64 {
    v.iter().fold(0.0_f64, |m, x| m.max(x.abs()))
}

/// `min s` over `g_i·x - s <= h_i, -s <= 0`; the rows are feasible iff `s*` is zero.
fn is_feasible(
    g: &DMatrix<f64>,
    h: &DVector<f64>,
    cfg: SimplexCfg,
    iterations: &mut usize,
) -> Result<bool, LpError> {
    let (m, n) = g.shape();
    let aux_g = DMatrix::from_fn(m + 1, n + 1, |i, j| match (i < m, j < n) {
        (true, true) => g[(i, j)],
        (false, true) => 0.0,
        (_, false) => -1.0,
    });
    let aux_h = DVector::from_fn(m + 1, |i, _| if i < m { h[i] } else { 0.0 });
    let cost = unit(n + 1, n, 1.0);
    match solve_dual(&aux_g, &aux_h, &cost, cfg, iterations)? {
        DualOutcome::Optimal(x) => Ok(x[n] <= cfg.feas_tol * (1.0 + max_abs(h))),
        DualOutcome::Unbounded | DualOutcome::Infeasible => Ok(false),
    }
}

enum DualOutcome {
    /// Primal optimum.
    Optimal(DVector<f64>),
    Unbounded,
    Infeasible,
}

#[derive(Clone, Copy, PartialEq)]
enum Phase {
    /// Minimize the artificial sum.
    One,
    /// Minimize `h·λ`.
    Two,
}

enum Pivoting {
    Optimal {
        multiplier: DVector<f64>,
        beta: DVector<f64>,
    },
    Unbounded,
}

fn solve_dual(
    g: &DMatrix<f64>,
    h: &DVector<f64>,
    c: &DVector<f64>,
    cfg: SimplexCfg,
    iterations: &mut usize,
) -> Result<DualOutcome, LpError> {
    let mut dual = Dual::new(g, h, c, cfg);
    let beta = match dual.run(Phase::One, iterations)? {
        Pivoting::Optimal { beta, .. } => beta,
        Pivoting::Unbounded => return Ok(DualOutcome::Infeasible),
    };
    let residual: f64 = (0..dual.n)
        .filter(|&k| dual.is_artificial(dual.basis[k]))
        .map(|k| beta[k].max(0.0))
        .sum();
    tracing::trace!(residual, iterations = *iterations, "simplex phase one");
    if residual > cfg.feas_tol * (1.0 + max_abs(&dual.rhs)) {
        return Ok(DualOutcome::Infeasible);
    }
    dual.evict_artificials()?;
    match dual.run(Phase::Two, iterations)? {
        Pivoting::Optimal { multiplier, .. } => Ok(DualOutcome::Optimal(multiplier)),
        Pivoting::Unbounded => Ok(DualOutcome::Unbounded),
    }
}

/// Basis state of `min h·λ, Gᵀλ = -c, λ >= 0`.
///
/// Columns `0..m` are the rows of `g`; column `m + k` is the artificial
/// `±e_k` of equality `k`, signed so the start basis is feasible.
struct Dual<'a> {
    g: &'a DMatrix<f64>,
    g_abs: DMatrix<f64>,
    h: &'a DVector<f64>,
    rhs: DVector<f64>,
    art_sign: Vec<f64>,
    basis: Vec<usize>,
    in_basis: Vec<bool>,
    m: usize,
    n: usize,
    cfg: SimplexCfg,
    budget: usize,
}

impl<'a> Dual<'a> {
    fn new(g: &'a DMatrix<f64>, h: &'a DVector<f64>, c: &DVector<f64>, cfg: SimplexCfg) -> Self {
        let (m, n) = g.shape();
        let rhs = -c;
        let art_sign = rhs.iter().map(|&r| if r < 0.0 { -1.0 } else { 1.0 }).collect();
        let mut in_basis = vec![false; m + n];
        in_basis[m..].iter_mut().for_each(|b| *b = true);
        Self {
            g,
            g_abs: g.abs(),
            h,
            rhs,
            art_sign,
            basis: (m..m + n).collect(),
            in_basis,
            m,
            n,
            cfg,
            budget: cfg.budget(m, n),
        }
    }

    #[inline]
    fn is_artificial(&self, col: usize) -> bool {
        col >= self.m
    }

    fn cost(&self, col: usize, phase: Phase) -> f64 {
        match (phase, self.is_artificial(col)) {
            (Phase::One, true) => 1.0,
            (Phase::One, false) | (Phase::Two, true) => 0.0,
            (Phase::Two, false) => self.h[col],
        }
    }

    /// Entry `i` of column `col` of the constraint matrix `[Gᵀ | diag(art_sign)]`.
    fn entry(&self, i: usize, col: usize) -> f64 {
        if !self.is_artificial(col) {
            self.g[(col, i)]
        } else if col - self.m == i {
            self.art_sign[i]
        } else {
            0.0
        }
    }

    fn column(&self, col: usize) -> DVector<f64> {
        DVector::from_fn(self.n, |i, _| self.entry(i, col))
    }

    fn basis_inverse(&self) -> Result<DMatrix<f64>, LpError> {
        DMatrix::from_fn(self.n, self.n, |i, k| self.entry(i, self.basis[k]))
            .try_inverse()
            .ok_or(LpError::SingularBasis)
    }

    fn run(&mut self, phase: Phase, iterations: &mut usize) -> Result<Pivoting, LpError> {
        let mut stalled = 0;
        loop {
            let inv = self.basis_inverse()?;
            let beta = &inv * &self.rhs;
            let cost_b = DVector::from_fn(self.n, |k, _| self.cost(self.basis[k], phase));
            let multiplier = inv.tr_mul(&cost_b);

            let bland = stalled >= STALL_PIVOTS;
            let Some((q, r_q)) = self.entering(phase, &multiplier, bland) else {
                return Ok(Pivoting::Optimal { multiplier, beta });
            };
            let d = &inv * self.column(q);
            let Some(p) = self.leaving(&beta, &d, bland) else {
                return Ok(Pivoting::Unbounded);
            };
            if *iterations >= self.budget {
                return Err(LpError::IterationLimit {
                    iterations: *iterations,
                });
            }
            let step = beta[p].max(0.0) / d[p];
            if -r_q * step > 0.0 {
                stalled = 0;
            } else {
                stalled += 1;
            }
            self.in_basis[self.basis[p]] = false;
            self.in_basis[q] = true;
            self.basis[p] = q;
            *iterations += 1;
        }
    }

    /// Most negative scaled reduced cost, or the first negative one under Bland.
    /// Artificial columns never enter.
    fn entering(&self, phase: Phase, y: &DVector<f64>, bland: bool) -> Option<(usize, f64)> {
        let gy = self.g * y;
        let gy_abs = &self.g_abs * y.abs();
        let mut best: Option<(usize, f64, f64)> = None;
        for j in (0..self.m).filter(|&j| !self.in_basis[j]) {
            let cost = self.cost(j, phase);
            let reduced = cost - gy[j];
            let scale = 1.0 + cost.abs() + gy_abs[j];
            if reduced >= -self.cfg.opt_tol * scale {
                continue;
            }
            if bland {
                return Some((j, reduced));
            }
            let score = reduced / scale;
            if best.map_or(true, |(_, _, s)| score < s) {
                best = Some((j, reduced, score));
            }
        }
        best.map(|(j, reduced, _)| (j, reduced))
    }

    /// Basis position that leaves, or `None` when no entry of `d` can pivot.
    fn leaving(&self, beta: &DVector<f64>, d: &DVector<f64>, bland: bool) -> Option<usize> {
        let pivot_tol = self.cfg.pivot_tol * max_abs(d).max(1.0);
        let rows: Vec<usize> = (0..self.n).filter(|&i| d[i] > pivot_tol).collect();
        let ratio = |i: usize| beta[i].max(0.0) / d[i];
        if bland {
            return rows.into_iter().min_by(|&a, &b| {
                ratio(a)
                    .total_cmp(&ratio(b))
                    .then(self.basis[a].cmp(&self.basis[b]))
            });
        }
        // Harris: the widest step with every row relaxed by `feas_tol`, then
        // the largest pivot among rows that block within it.
        let widest = rows
            .iter()
            .map(|&i| (beta[i].max(0.0) + self.cfg.feas_tol) / d[i])
            .fold(f64::INFINITY, f64::min);
        rows.into_iter()
            .filter(|&i| ratio(i) <= widest)
            .max_by(|&a, &b| d[a].total_cmp(&d[b]))
    }

    /// Swap basic artificials for structural columns where the pivot allows;
    /// artificials of redundant equalities stay at zero.
    fn evict_artificials(&mut self) -> Result<(), LpError> {
        for k in 0..self.n {
            if !self.is_artificial(self.basis[k]) {
                continue;
            }
            let inv = self.basis_inverse()?;
            let row = inv.row(k).transpose();
            let alpha = self.g * &row;
            let threshold = self.cfg.pivot_tol * (1.0 + max_abs(&row));
            let swap = (0..self.m)
                .filter(|&j| !self.in_basis[j] && alpha[j].abs() > threshold)
                .max_by(|&a, &b| alpha[a].abs().total_cmp(&alpha[b].abs()));
            if let Some(j) = swap {
                self.in_basis[self.basis[k]] = false;
                self.in_basis[j] = true;
                self.basis[k] = j;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::dvector;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    fn close(a: &DVector<f64>, b: &DVector<f64>) -> bool {
        (a - b).amax() < 1e-7
    }

    #[test]
    fn textbook_maximization() {
        // max x + y  s.t. x + 2y <= 4, 3x + y <= 6, x, y >= 0  →  (1.6, 1.2)
        let mut lp = SimplexSolver::new(2).unwrap();
        lp.set_objective_function(dvector![-1.0, -1.0]).unwrap();
        lp.set_lower(dvector![0.0, 0.0]).unwrap();
        lp.add_linear_constraint(dvector![1.0, 2.0], 4.0).unwrap();
        lp.add_linear_constraint(dvector![3.0, 1.0], 6.0).unwrap();
        let x = lp.find_minimizer().unwrap();
        assert!(close(&x, &dvector![1.6, 1.2]), "{x}");
    }

    #[test]
    fn box_only_picks_a_corner() {
        let mut lp = SimplexSolver::new(3).unwrap();
        lp.set_objective_function(dvector![1.0, -2.0, 0.5]).unwrap();
        lp.set_lower(dvector![-1.0, -1.0, -1.0]).unwrap();
        lp.set_upper(dvector![1.0, 1.0, 1.0]).unwrap();
        let x = lp.find_minimizer().unwrap();
        assert!(close(&x, &dvector![-1.0, 1.0, -1.0]), "{x}");
    }

    #[test]
    fn negative_rhs_needs_phase_one() {
        // min x + 2y  s.t. x + y >= 2 (i.e. -x - y <= -2), x <= 3, y >= -5
        let mut lp = SimplexSolver::new(2).unwrap();
        lp.set_objective_function(dvector![1.0, 2.0]).unwrap();
        lp.set_lower(dvector![f64::NEG_INFINITY, -5.0]).unwrap();
        lp.set_upper(dvector![3.0, f64::INFINITY]).unwrap();
        lp.add_linear_constraint(dvector![-1.0, -1.0], -2.0).unwrap();
        let x = lp.find_minimizer().unwrap();
        // y as small as the coupling allows: x = 3, y = -1.
        assert!(close(&x, &dvector![3.0, -1.0]), "{x}");
    }

    #[test]
    fn free_variable_slack_problem() {
        // min z  s.t. -z - w <= 0, -z + w <= 0, w in [-1, 1]  →  z = 0 at w = 0.
        let mut lp = SimplexSolver::new(2).unwrap();
        lp.set_objective_function(dvector![1.0, 0.0]).unwrap();
        lp.set_lower(dvector![f64::NEG_INFINITY, -1.0]).unwrap();
        lp.set_upper(dvector![f64::INFINITY, 1.0]).unwrap();
        lp.add_linear_constraint(dvector![-1.0, -1.0], 0.0).unwrap();
        lp.add_linear_constraint(dvector![-1.0, 1.0], 0.0).unwrap();
        let x = lp.find_minimizer().unwrap();
        assert!(x[0].abs() < 1e-9);
        assert!(x[1].abs() < 1e-9);
    }

    #[test]
    fn infeasible_and_unbounded() {
        let mut lp = SimplexSolver::new(1).unwrap();
        lp.set_lower(dvector![0.0]).unwrap();
        lp.add_linear_constraint(dvector![1.0], -1.0).unwrap();
        assert_eq!(lp.find_minimizer(), Err(LpError::Infeasible));

        let mut lp = SimplexSolver::new(2).unwrap();
        lp.set_objective_function(dvector![-1.0, 0.0]).unwrap();
        lp.set_lower(dvector![0.0, 0.0]).unwrap();
        lp.add_linear_constraint(dvector![0.0, 1.0], 1.0).unwrap();
        assert_eq!(lp.find_minimizer(), Err(LpError::Unbounded));
    }

    #[test]
    fn setters_validate_dimensions_and_bounds() {
        assert_eq!(SimplexSolver::new(0).unwrap_err(), LpError::ZeroDimension);
        let mut lp = SimplexSolver::new(2).unwrap();
        assert_eq!(
            lp.set_objective_function(dvector![1.0]),
            Err(LpError::DimensionMismatch {
                expected: 2,
                actual: 1
            })
        );
        assert!(lp.set_lower(dvector![0.0, 0.0, 0.0]).is_err());
        assert!(lp.add_linear_constraint(dvector![1.0], 0.0).is_err());
        assert_eq!(lp.num_constraints(), 0);

        lp.set_lower(dvector![0.0, 2.0]).unwrap();
        lp.set_upper(dvector![1.0, 1.0]).unwrap();
        assert!(matches!(
            lp.find_minimizer(),
            Err(LpError::InvalidBounds { index: 1, .. })
        ));
    }

    #[test]
    fn redundant_equalities_survive_phase_one() {
        // x + y >= 1 twice and x + y <= 1: the feasible set is a segment.
        let mut lp = SimplexSolver::new(2).unwrap();
        lp.set_objective_function(dvector![1.0, 0.0]).unwrap();
        lp.set_lower(dvector![0.0, 0.0]).unwrap();
        lp.add_linear_constraint(dvector![-1.0, -1.0], -1.0).unwrap();
        lp.add_linear_constraint(dvector![-1.0, -1.0], -1.0).unwrap();
        lp.add_linear_constraint(dvector![1.0, 1.0], 1.0).unwrap();
        let x = lp.find_minimizer().unwrap();
        assert!(close(&x, &dvector![0.0, 1.0]), "{x}");
    }

    #[test]
    fn pivot_budget_is_enforced_and_scales() {
        let cfg = SimplexCfg {
            max_iterations: Some(0),
            ..SimplexCfg::default()
        };
        let mut lp = SimplexSolver::with_cfg(2, cfg).unwrap();
        lp.set_objective_function(dvector![-1.0, -1.0]).unwrap();
        lp.set_lower(dvector![0.0, 0.0]).unwrap();
        lp.add_linear_constraint(dvector![1.0, 2.0], 4.0).unwrap();
        assert_eq!(
            lp.find_minimizer(),
            Err(LpError::IterationLimit { iterations: 0 })
        );
        assert_eq!(SimplexCfg::default().budget(5000, 22), 1000 + 20 * 5022);
    }

    /// Max-margin program `min z, -z - y·(w·[1, x]) <= 0, w in [-1, 1]` over
    /// `n` points in `[-2, 2]^d` labelled by a random hyperplane.
    fn separable_lp(d: usize, n: usize, seed: u64) -> (SimplexSolver, Vec<DVector<f64>>) {
        let mut rng = StdRng::seed_from_u64(seed);
        let truth = DVector::from_fn(d + 1, |_, _| rng.gen_range(-1.0..1.0));
        let mut lp = SimplexSolver::new(d + 2).unwrap();
        lp.set_objective_function(unit(d + 2, 0, 1.0)).unwrap();
        let mut lower = DVector::from_element(d + 2, -1.0);
        let mut upper = DVector::from_element(d + 2, 1.0);
        lower[0] = f64::NEG_INFINITY;
        upper[0] = f64::INFINITY;
        lp.set_lower(lower).unwrap();
        lp.set_upper(upper).unwrap();
        let mut rows = Vec::with_capacity(n);
        while rows.len() < n {
            let x = DVector::from_fn(d + 1, |i, _| {
                if i == 0 {
                    1.0
                } else {
                    rng.gen_range(-2.0..2.0)
                }
            });
            let score: f64 = truth.dot(&x);
            if score.abs() < 1e-6 {
                continue;
            }
            let a = DVector::from_fn(d + 2, |i, _| {
                if i == 0 {
                    -1.0
                } else {
                    -score.signum() * x[i - 1]
                }
            });
            lp.add_linear_constraint(a.clone(), 0.0).unwrap();
            rows.push(a);
        }
        (lp, rows)
    }

    #[test]
    fn tall_separable_programs_reach_a_feasible_optimum() {
        for (d, n) in [(3, 1000), (12, 300), (20, 400)] {
            for seed in 0..3 {
                let (lp, rows) = separable_lp(d, n, seed);
                let x = lp
                    .find_minimizer()
                    .unwrap_or_else(|e| panic!("d={d} n={n} seed={seed}: {e}"));
                assert!(x[0] < -1e-8, "d={d} n={n} seed={seed}: z = {}", x[0]);
                for a in &rows {
                    assert!(a.dot(&x) <= 1e-7, "row violated by {}", a.dot(&x));
                }
                assert!(x.rows(1, d + 1).amax() <= 1.0 + 1e-7);
            }
        }
    }

    #[test]
    fn unbounded_direction_with_many_rows() {
        // min -x - y over a wedge opening to the upper right, plus redundant rows.
        let mut lp = SimplexSolver::new(2).unwrap();
        lp.set_objective_function(dvector![-1.0, -1.0]).unwrap();
        lp.add_linear_constraint(dvector![-1.0, 0.0], 0.0).unwrap();
        lp.add_linear_constraint(dvector![0.0, -1.0], 0.0).unwrap();
        for k in 1..50 {
            lp.add_linear_constraint(dvector![-1.0, -(k as f64)], 0.0).unwrap();
        }
        assert_eq!(lp.find_minimizer(), Err(LpError::Unbounded));
    }
}
