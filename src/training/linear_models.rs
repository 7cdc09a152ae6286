//! Logistic regression for the binary placement label

use super::config::{ClassWeight, Solver};
use crate::error::{PlacementError, Result};
use ndarray::{concatenate, Array1, Array2, Axis};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Solve symmetric positive-definite system Ax = b using Cholesky decomposition.
/// Retries once with a small ridge if the matrix is not positive definite.
fn cholesky_solve(a: &Array2<f64>, b: &Array1<f64>) -> Option<Array1<f64>> {
    let n = a.nrows();
    if n != a.ncols() || n != b.len() {
        return None;
    }

    match cholesky_factor(a) {
        Some(l) => Some(cholesky_substitute(&l, b)),
        None => {
            let mut a_reg = a.clone();
            let ridge = 1e-8 * a.diag().iter().map(|v| v.abs()).sum::<f64>().max(1.0) / n as f64;
            for k in 0..n {
                a_reg[[k, k]] += ridge;
            }
            cholesky_factor(&a_reg).map(|l| cholesky_substitute(&l, b))
        }
    }
}

/// Lower-triangular L with A = L * L^T, or None if A is not positive definite
fn cholesky_factor(a: &Array2<f64>) -> Option<Array2<f64>> {
    let n = a.nrows();
    let mut l = Array2::zeros((n, n));

    for i in 0..n {
        for j in 0..=i {
            let mut sum = 0.0;
            for k in 0..j {
                sum += l[[i, k]] * l[[j, k]];
            }

            if i == j {
                let diag = a[[i, i]] - sum;
                if diag <= 0.0 || !diag.is_finite() {
                    return None;
                }
                l[[i, j]] = diag.sqrt();
            } else {
                l[[i, j]] = (a[[i, j]] - sum) / l[[j, j]];
            }
        }
    }

    Some(l)
}

fn cholesky_substitute(l: &Array2<f64>, b: &Array1<f64>) -> Array1<f64> {
    let n = l.nrows();

    // Forward substitution: L * y = b
    let mut y = Array1::zeros(n);
    for i in 0..n {
        let mut sum = 0.0;
        for j in 0..i {
            sum += l[[i, j]] * y[j];
        }
        y[i] = (b[i] - sum) / l[[i, i]];
    }

    // Backward substitution: L^T * x = y
    let mut x = Array1::zeros(n);
    for i in (0..n).rev() {
        let mut sum = 0.0;
        for j in (i + 1)..n {
            sum += l[[j, i]] * x[j];
        }
        x[i] = (y[i] - sum) / l[[i, i]];
    }

    x
}

/// Per-sample weights implementing a class weighting scheme for 0/1 labels
pub fn class_sample_weights(y: &Array1<f64>, class_weight: ClassWeight) -> Array1<f64> {
    match class_weight {
        ClassWeight::None => Array1::ones(y.len()),
        ClassWeight::Balanced => {
            let n = y.len() as f64;
            let n_pos = y.iter().filter(|&&v| v >= 0.5).count() as f64;
            let n_neg = n - n_pos;
            let n_classes = [n_pos, n_neg].iter().filter(|&&c| c > 0.0).count() as f64;
            y.mapv(|v| {
                let count = if v >= 0.5 { n_pos } else { n_neg };
                n / (n_classes * count)
            })
        }
    }
}

/// L2-penalized logistic regression for binary classification.
///
/// Minimizes `sum_i s_i * logloss_i + ||w||^2 / (2C)`; the intercept is not penalized.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticRegression {
    /// Fitted coefficients
    pub coefficients: Option<Array1<f64>>,
    /// Fitted intercept
    pub intercept: Option<f64>,
    /// Inverse regularization strength
    pub c: f64,
    /// Maximum iterations
    pub max_iter: usize,
    /// Convergence tolerance
    pub tol: f64,
    pub solver: Solver,
    pub class_weight: ClassWeight,
    /// Iterations used by the last fit
    pub n_iter: usize,
    /// Whether model is fitted
    pub is_fitted: bool,
}

impl Default for LogisticRegression {
    fn default() -> Self {
        Self::new()
    }
}

impl LogisticRegression {
    /// Create a new logistic regression model
    pub fn new() -> Self {
        Self {
            coefficients: None,
            intercept: None,
            c: 1.0,
            max_iter: 1000,
            tol: 1e-6,
            solver: Solver::Newton,
            class_weight: ClassWeight::None,
            n_iter: 0,
            is_fitted: false,
        }
    }

    /// Set inverse regularization strength
    pub fn with_c(mut self, c: f64) -> Self {
        self.c = c;
        self
    }

    /// Set maximum iterations
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Set convergence tolerance
    pub fn with_tol(mut self, tol: f64) -> Self {
        self.tol = tol;
        self
    }

    pub fn with_solver(mut self, solver: Solver) -> Self {
        self.solver = solver;
        self
    }

    pub fn with_class_weight(mut self, class_weight: ClassWeight) -> Self {
        self.class_weight = class_weight;
        self
    }

    /// Numerically stable sigmoid
    fn sigmoid(z: &Array1<f64>) -> Array1<f64> {
        z.mapv(|v| {
            if v >= 0.0 {
                1.0 / (1.0 + (-v).exp())
            } else {
                let e = v.exp();
                e / (1.0 + e)
            }
        })
    }

    /// Fit the model on 0/1 labels
    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<&mut Self> {
        let n_samples = x.nrows();

        if n_samples != y.len() {
            return Err(PlacementError::ShapeError {
                expected: format!("y length = {}", n_samples),
                actual: format!("y length = {}", y.len()),
            });
        }
        if n_samples == 0 {
            return Err(PlacementError::TrainingError("no training samples".to_string()));
        }
        if y.iter().any(|&v| v != 0.0 && v != 1.0) {
            return Err(PlacementError::TrainingError(
                "labels must be 0 or 1".to_string(),
            ));
        }

        let sample_weight = class_sample_weights(y, self.class_weight);

        // Design matrix with a trailing intercept column
        let ones: Array2<f64> = Array2::ones((n_samples, 1));
        let xa = concatenate(Axis(1), &[x.view(), ones.view()])?;

        let theta = match self.solver.clone() {
            Solver::Newton => self.fit_newton(&xa, y, &sample_weight)?,
            Solver::GradientDescent { learning_rate } => {
                self.fit_gradient_descent(&xa, y, &sample_weight, learning_rate)
            }
        };

        if theta.iter().any(|v| !v.is_finite()) {
            return Err(PlacementError::TrainingError(
                "solver diverged to non-finite coefficients".to_string(),
            ));
        }

        let n_features = x.ncols();
        self.coefficients = Some(theta.slice(ndarray::s![..n_features]).to_owned());
        self.intercept = Some(theta[n_features]);
        self.is_fitted = true;

        Ok(self)
    }

    /// Diagonal of the penalty: 1/C on coefficients, 0 on the intercept
    fn penalty(&self, n_params: usize) -> Array1<f64> {
        let mut penalty = Array1::from_elem(n_params, 1.0 / self.c);
        penalty[n_params - 1] = 0.0;
        penalty
    }

    fn fit_newton(&mut self, xa: &Array2<f64>, y: &Array1<f64>, s: &Array1<f64>) -> Result<Array1<f64>> {
        let n_params = xa.ncols();
        let penalty = self.penalty(n_params);
        let mut theta: Array1<f64> = Array1::zeros(n_params);

        for iter in 0..self.max_iter {
            let p = Self::sigmoid(&xa.dot(&theta));
            let residual = s * &(&p - y);
            let grad = xa.t().dot(&residual) + &penalty * &theta;

            // Hessian: Xa^T diag(s p (1-p)) Xa + diag(penalty)
            let curvature = s * &p.mapv(|v| v * (1.0 - v));
            let weighted = xa * &curvature.insert_axis(Axis(1));
            let mut hessian = xa.t().dot(&weighted);
            for k in 0..n_params {
                hessian[[k, k]] += penalty[k];
            }

            let step = cholesky_solve(&hessian, &grad).ok_or_else(|| {
                PlacementError::TrainingError(format!(
                    "Hessian is singular at iteration {}",
                    iter
                ))
            })?;

            theta = theta - &step;
            self.n_iter = iter + 1;

            let max_step = step.iter().fold(0.0f64, |m, v| m.max(v.abs()));
            if max_step < self.tol {
                debug!(iterations = self.n_iter, "Newton solver converged");
                return Ok(theta);
            }
        }

        warn!(max_iter = self.max_iter, "Newton solver reached max_iter without converging");
        Ok(theta)
    }

    fn fit_gradient_descent(
        &mut self,
        xa: &Array2<f64>,
        y: &Array1<f64>,
        s: &Array1<f64>,
        learning_rate: f64,
    ) -> Array1<f64> {
        let n_params = xa.ncols();
        let penalty = self.penalty(n_params);
        let total_weight = s.sum();
        let mut theta: Array1<f64> = Array1::zeros(n_params);

        for iter in 0..self.max_iter {
            let p = Self::sigmoid(&xa.dot(&theta));
            let residual = s * &(&p - y);
            let grad = (xa.t().dot(&residual) + &penalty * &theta) / total_weight;

            self.n_iter = iter + 1;

            let grad_norm = grad.mapv(|v| v * v).sum().sqrt();
            if grad_norm < self.tol {
                debug!(iterations = self.n_iter, "Gradient descent converged");
                return theta;
            }

            theta = theta - learning_rate * &grad;
        }

        debug!(max_iter = self.max_iter, "Gradient descent stopped at max_iter");
        theta
    }

    fn decision_function(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        if !self.is_fitted {
            return Err(PlacementError::ModelNotFitted);
        }

        let coefficients = self.coefficients.as_ref().ok_or(PlacementError::ModelNotFitted)?;
        if x.ncols() != coefficients.len() {
            return Err(PlacementError::ShapeError {
                expected: format!("{} features", coefficients.len()),
                actual: format!("{} features", x.ncols()),
            });
        }
        let intercept = self.intercept.unwrap_or(0.0);
        Ok(x.dot(coefficients) + intercept)
    }

    /// Predict probability of the positive class
    pub fn predict_proba(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        Ok(Self::sigmoid(&self.decision_function(x)?))
    }

    /// Predict class labels
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let decision = self.decision_function(x)?;
        Ok(decision.mapv(|z| if z > 0.0 { 1.0 } else { 0.0 }))
    }

    /// Get accuracy score
    pub fn score(&self, x: &Array2<f64>, y: &Array1<f64>) -> Result<f64> {
        let y_pred = self.predict(x)?;
        if y.is_empty() {
            return Ok(0.0);
        }

        let correct = y_pred
            .iter()
            .zip(y.iter())
            .filter(|(pred, actual)| (*pred - *actual).abs() < 0.5)
            .count();

        Ok(correct as f64 / y.len() as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn separable() -> (Array2<f64>, Array1<f64>) {
        let x = array![
            [0.0, 0.0],
            [0.5, 0.2],
            [1.0, 0.8],
            [4.0, 4.2],
            [4.5, 5.0],
            [5.0, 4.8],
        ];
        let y = array![0.0, 0.0, 0.0, 1.0, 1.0, 1.0];
        (x, y)
    }

    #[test]
    fn test_logistic_regression_newton() {
        let (x, y) = separable();
        let mut model = LogisticRegression::new();
        model.fit(&x, &y).unwrap();
        assert!(model.is_fitted);
        assert!(model.n_iter < 100);

        let accuracy = model.score(&x, &y).unwrap();
        assert_eq!(accuracy, 1.0);
    }

    #[test]
    fn test_logistic_regression_gradient_descent() {
        let (x, y) = separable();
        let mut model = LogisticRegression::new()
            .with_solver(Solver::GradientDescent { learning_rate: 0.1 })
            .with_max_iter(5000);
        model.fit(&x, &y).unwrap();

        let accuracy = model.score(&x, &y).unwrap();
        assert!(accuracy >= 0.8, "Accuracy should be >= 0.8, got {}", accuracy);
    }

    #[test]
    fn test_solvers_agree() {
        let (x, y) = separable();
        let mut newton = LogisticRegression::new().with_tol(1e-10);
        newton.fit(&x, &y).unwrap();
        let mut gd = LogisticRegression::new()
            .with_solver(Solver::GradientDescent { learning_rate: 0.1 })
            .with_max_iter(50_000)
            .with_tol(1e-10);
        gd.fit(&x, &y).unwrap();

        let pn = newton.predict_proba(&x).unwrap();
        let pg = gd.predict_proba(&x).unwrap();
        for (a, b) in pn.iter().zip(pg.iter()) {
            assert!((a - b).abs() < 1e-3, "{} vs {}", a, b);
        }
    }

    #[test]
    fn test_predict_proba() {
        let x = array![[0.0, 0.0], [10.0, 10.0]];
        let y = array![0.0, 1.0];

        let mut model = LogisticRegression::new();
        model.fit(&x, &y).unwrap();

        let proba = model.predict_proba(&x).unwrap();
        assert!(proba[0] < 0.5);
        assert!(proba[1] > 0.5);
    }

    #[test]
    fn test_balanced_weights() {
        let y = array![1.0, 1.0, 1.0, 0.0];
        let w = class_sample_weights(&y, ClassWeight::Balanced);
        // 4 / (2 * 3) and 4 / (2 * 1)
        assert!((w[0] - 4.0 / 6.0).abs() < 1e-12);
        assert!((w[3] - 2.0).abs() < 1e-12);
        // each class carries half the total weight
        assert!((w.sum() - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_balanced_weighting_shifts_minority_recall() {
        // Overlapping classes, minority positive
        let x = array![[0.0], [0.2], [0.4], [0.6], [0.8], [1.0], [1.2], [0.9]];
        let y = array![0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0, 1.0];

        let mut plain = LogisticRegression::new();
        plain.fit(&x, &y).unwrap();
        let mut balanced = LogisticRegression::new().with_class_weight(ClassWeight::Balanced);
        balanced.fit(&x, &y).unwrap();

        let probe = array![[0.9]];
        let p_plain = plain.predict_proba(&probe).unwrap()[0];
        let p_balanced = balanced.predict_proba(&probe).unwrap()[0];
        assert!(p_balanced > p_plain);
    }

    #[test]
    fn test_rejects_non_binary_labels() {
        let x = array![[0.0], [1.0]];
        let y = array![0.0, 2.0];
        let mut model = LogisticRegression::new();
        assert!(matches!(model.fit(&x, &y), Err(PlacementError::TrainingError(_))));
    }

    #[test]
    fn test_predict_before_fit() {
        let model = LogisticRegression::new();
        let x = array![[0.0]];
        assert!(matches!(model.predict(&x), Err(PlacementError::ModelNotFitted)));
    }

    #[test]
    fn test_feature_count_mismatch() {
        let (x, y) = separable();
        let mut model = LogisticRegression::new();
        model.fit(&x, &y).unwrap();
        let wrong = array![[1.0, 2.0, 3.0]];
        assert!(matches!(model.predict(&wrong), Err(PlacementError::ShapeError { .. })));
    }

    #[test]
    fn test_cholesky_solve() {
        let a = array![[4.0, 2.0], [2.0, 3.0]];
        let b = array![2.0, 1.0];
        let x = cholesky_solve(&a, &b).unwrap();
        let back = a.dot(&x);
        assert!((back[0] - 2.0).abs() < 1e-10);
        assert!((back[1] - 1.0).abs() < 1e-10);
    }
}
