//! Feed-forward regressor: one logistic hidden layer, identity output,
//! squared-error loss with an L2 penalty, minimised by mini-batch Adam.

use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::config::{ModelSettings, PRINT_TRAINING_PROGRESS};
use crate::domain::{FeatureMatrix, TargetVector};
use crate::utils::maths_utils::{get_min_max, sigmoid};

use super::{Model, Trainer, TrainingError};

const ADAM_BETA_1: f64 = 0.9;
const ADAM_BETA_2: f64 = 0.999;
const ADAM_EPSILON: f64 = 1e-8;

/// Offsets into the flat parameter vector:
/// `[w1 (hidden x n_features) | b1 (hidden) | w2 (hidden) | b2]`
#[derive(Debug, Clone, Copy, PartialEq)]
struct Layout {
    n_features: usize,
    hidden: usize,
}

impl Layout {
    fn b1(&self) -> usize {
        self.hidden * self.n_features
    }
    fn w2(&self) -> usize {
        self.b1() + self.hidden
    }
    fn b2(&self) -> usize {
        self.w2() + self.hidden
    }
    fn len(&self) -> usize {
        self.b2() + 1
    }
    fn is_weight(&self, k: usize) -> bool {
        k < self.b1() || (k >= self.w2() && k < self.b2())
    }
}

/// Forward pass for one row. Fills `hidden` with the activations and returns the output.
#[inline]
fn forward(layout: Layout, params: &[f64], row: &[f64], hidden: &mut [f64]) -> f64 {
    let d = layout.n_features;
    let mut out = params[layout.b2()];
    for (j, a) in hidden.iter_mut().enumerate() {
        let weights = &params[j * d..(j + 1) * d];
        let z: f64 = params[layout.b1() + j]
            + weights.iter().zip(row).map(|(w, x)| w * x).sum::<f64>();
        *a = sigmoid(z);
        out += params[layout.w2() + j] * *a;
    }
    out
}

#[derive(Debug, Clone, PartialEq)]
pub struct MlpModel {
    layout: Layout,
    params: Vec<f64>,
    /// Epochs actually run
    pub n_iter: usize,
    pub final_loss: f64,
}

impl MlpModel {
    pub fn n_features(&self) -> usize {
        self.layout.n_features
    }

    pub fn hidden_units(&self) -> usize {
        self.layout.hidden
    }
}

impl Model for MlpModel {
    fn predict(&self, x: &FeatureMatrix) -> Vec<f64> {
        debug_assert!(x.is_empty() || x.n_cols() == self.layout.n_features);
        let mut hidden = vec![0.0; self.layout.hidden];
        x.rows()
            .map(|row| forward(self.layout, &self.params, row, &mut hidden))
            .collect()
    }
}

#[derive(Debug, Clone)]
pub struct MlpRegressor {
    settings: ModelSettings,
    time_limit: Option<Duration>,
}

impl MlpRegressor {
    pub fn new(settings: ModelSettings) -> Self {
        Self {
            settings,
            time_limit: None,
        }
    }

    /// Abandon training (as `TimedOut`) once an epoch ends past this budget.
    pub fn with_time_limit(mut self, limit: Option<Duration>) -> Self {
        self.time_limit = limit;
        self
    }

    fn check_inputs(&self, x: &FeatureMatrix, y: &TargetVector) -> Result<(), TrainingError> {
        if x.n_rows() != y.len() {
            return Err(TrainingError::ShapeMismatch {
                x_rows: x.n_rows(),
                y_rows: y.len(),
            });
        }
        if x.n_rows() < 2 || x.n_rows() < x.n_cols() || x.n_cols() == 0 {
            return Err(TrainingError::InsufficientRows {
                rows: x.n_rows(),
                features: x.n_cols(),
            });
        }
        if let Some((min, max)) = get_min_max(y)
            && min == max
        {
            return Err(TrainingError::ConstantTarget(min));
        }
        Ok(())
    }

    /// Glorot-uniform initialisation scaled for the logistic activation.
    fn initial_params(&self, layout: Layout, rng: &mut StdRng) -> Vec<f64> {
        let mut params = vec![0.0; layout.len()];
        let bound_1 = (2.0 / (layout.n_features + layout.hidden) as f64).sqrt();
        let bound_2 = (2.0 / (layout.hidden + 1) as f64).sqrt();
        for (k, p) in params.iter_mut().enumerate() {
            let bound = if k < layout.w2() { bound_1 } else { bound_2 };
            *p = rng.gen_range(-bound..bound);
        }
        params
    }
}

impl Trainer for MlpRegressor {
    type Model = MlpModel;

    fn fit(&self, x: &FeatureMatrix, y: &TargetVector) -> Result<MlpModel, TrainingError> {
        self.check_inputs(x, y)?;

        let s = &self.settings;
        let layout = Layout {
            n_features: x.n_cols(),
            hidden: s.hidden_units,
        };
        let n = x.n_rows();
        let d = layout.n_features;
        let batch_size = s.batch_size.clamp(1, n);

        let mut rng = StdRng::seed_from_u64(s.seed);
        let mut params = self.initial_params(layout, &mut rng);
        let mut grads = vec![0.0; layout.len()];
        let mut adam_m = vec![0.0; layout.len()];
        let mut adam_v = vec![0.0; layout.len()];
        let mut adam_t: i32 = 0;

        let mut hidden = vec![0.0; layout.hidden];
        let mut order: Vec<usize> = (0..n).collect();

        let mut best_loss = f64::INFINITY;
        let mut no_improvement = 0;
        let mut epoch_loss = f64::INFINITY;
        let mut epochs_run = 0;
        let start = Instant::now();

        for epoch in 0..s.max_iter {
            order.shuffle(&mut rng);
            let mut accumulated = 0.0;

            for batch in order.chunks(batch_size) {
                grads.fill(0.0);
                let mut squared_error = 0.0;

                // --- Backprop over the batch ---
                for &r in batch {
                    let row = x.row(r);
                    let prediction = forward(layout, &params, row, &mut hidden);
                    let delta = prediction - y[r];
                    squared_error += delta * delta;

                    grads[layout.b2()] += delta;
                    for (j, &a) in hidden.iter().enumerate() {
                        grads[layout.w2() + j] += delta * a;
                        let delta_hidden = delta * params[layout.w2() + j] * a * (1.0 - a);
                        grads[layout.b1() + j] += delta_hidden;
                        let g_row = &mut grads[j * d..(j + 1) * d];
                        for (g, xi) in g_row.iter_mut().zip(row) {
                            *g += delta_hidden * xi;
                        }
                    }
                }

                let m = batch.len() as f64;
                let weight_norm: f64 = params
                    .iter()
                    .enumerate()
                    .filter(|(k, _)| layout.is_weight(*k))
                    .map(|(_, w)| w * w)
                    .sum();
                let batch_loss = squared_error / (2.0 * m) + 0.5 * s.alpha * weight_norm / m;
                accumulated += batch_loss * m;

                // --- Adam step ---
                adam_t += 1;
                let step = s.learning_rate * (1.0 - ADAM_BETA_2.powi(adam_t)).sqrt()
                    / (1.0 - ADAM_BETA_1.powi(adam_t));
                for k in 0..layout.len() {
                    let mut g = grads[k] / m;
                    if layout.is_weight(k) {
                        g += s.alpha * params[k] / m;
                    }
                    adam_m[k] = ADAM_BETA_1 * adam_m[k] + (1.0 - ADAM_BETA_1) * g;
                    adam_v[k] = ADAM_BETA_2 * adam_v[k] + (1.0 - ADAM_BETA_2) * g * g;
                    params[k] -= step * adam_m[k] / (adam_v[k].sqrt() + ADAM_EPSILON);
                }
            }

            epoch_loss = accumulated / n as f64;
            epochs_run = epoch + 1;

            if !epoch_loss.is_finite() {
                return Err(TrainingError::Diverged { epoch });
            }

            if PRINT_TRAINING_PROGRESS {
                log::debug!("Iteration {}, loss = {:.8}", epochs_run, epoch_loss);
            }

            if epoch_loss > best_loss - s.tol {
                no_improvement += 1;
            } else {
                no_improvement = 0;
            }
            if epoch_loss < best_loss {
                best_loss = epoch_loss;
            }
            if no_improvement > s.n_iter_no_change {
                log::debug!(
                    "Training loss did not improve more than tol={} for {} consecutive epochs. Stopping.",
                    s.tol,
                    s.n_iter_no_change
                );
                break;
            }

            if let Some(limit) = self.time_limit
                && start.elapsed() > limit
            {
                return Err(TrainingError::TimedOut {
                    epochs: epochs_run,
                    limit_secs: limit.as_secs(),
                });
            }
        }

        Ok(MlpModel {
            layout,
            params,
            n_iter: epochs_run,
            final_loss: epoch_loss,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::maths_utils::mean;

    fn small_settings() -> ModelSettings {
        ModelSettings {
            hidden_units: 10,
            max_iter: 300,
            learning_rate: 0.05,
            batch_size: 16,
            ..ModelSettings::default()
        }
    }

    /// x in [0, 1], label 1 above 0.5
    fn step_data(n: usize) -> (FeatureMatrix, TargetVector) {
        let rows: Vec<Vec<f64>> = (0..n).map(|i| vec![i as f64 / (n - 1) as f64]).collect();
        let y: Vec<f64> = rows.iter().map(|r| if r[0] > 0.5 { 1.0 } else { 0.0 }).collect();
        (
            FeatureMatrix::from_rows(&rows).expect("rect"),
            TargetVector::new(y),
        )
    }

    #[test]
    fn test_layout_offsets() {
        let layout = Layout {
            n_features: 3,
            hidden: 4,
        };
        assert_eq!(layout.b1(), 12);
        assert_eq!(layout.w2(), 16);
        assert_eq!(layout.b2(), 20);
        assert_eq!(layout.len(), 21);
        assert!(layout.is_weight(0));
        assert!(!layout.is_weight(12), "hidden bias is not penalised");
        assert!(layout.is_weight(16));
        assert!(!layout.is_weight(20), "output bias is not penalised");
    }

    #[test]
    fn test_learns_step_function() {
        let (x, y) = step_data(40);
        let model = MlpRegressor::new(small_settings()).fit(&x, &y).expect("model");
        let preds = model.predict(&x);
        assert_eq!(preds.len(), 40);

        let (mut high, mut low) = (Vec::new(), Vec::new());
        for (p, label) in preds.iter().zip(y.iter()) {
            if *label > 0.5 { high.push(*p) } else { low.push(*p) }
        }
        assert!(
            mean(&high) > mean(&low) + 0.3,
            "positives {:.3} vs negatives {:.3}",
            mean(&high),
            mean(&low)
        );
        assert!(model.final_loss < 0.125, "loss {} not below the constant-predictor loss", model.final_loss);
    }

    #[test]
    fn test_same_seed_same_model() {
        let (x, y) = step_data(30);
        let a = MlpRegressor::new(small_settings()).fit(&x, &y).expect("model");
        let b = MlpRegressor::new(small_settings()).fit(&x, &y).expect("model");
        assert_eq!(a, b);
        assert_eq!(a.predict(&x), b.predict(&x));
    }

    #[test]
    fn test_insufficient_rows_is_no_model() {
        let x = FeatureMatrix::from_rows(&[vec![0.1, 0.2, 0.3]]).expect("rect");
        let y = TargetVector::new(vec![1.0]);
        assert!(matches!(
            MlpRegressor::new(small_settings()).fit(&x, &y),
            Err(TrainingError::InsufficientRows { rows: 1, features: 3 })
        ));
    }

    #[test]
    fn test_constant_target_is_no_model() {
        let (x, _) = step_data(10);
        let y = TargetVector::new(vec![1.0; 10]);
        assert_eq!(
            MlpRegressor::new(small_settings()).fit(&x, &y),
            Err(TrainingError::ConstantTarget(1.0))
        );
    }

    #[test]
    fn test_time_budget_exceeded_is_no_model() {
        let (x, y) = step_data(40);
        let trainer = MlpRegressor::new(small_settings()).with_time_limit(Some(Duration::ZERO));
        assert!(matches!(
            trainer.fit(&x, &y),
            Err(TrainingError::TimedOut { epochs: 1, .. })
        ));
    }

    #[test]
    fn test_predict_on_empty_matrix() {
        let (x, y) = step_data(10);
        let model = MlpRegressor::new(small_settings()).fit(&x, &y).expect("model");
        assert!(model.predict(&FeatureMatrix::new(1)).is_empty());
        assert_eq!(model.n_features(), 1);
        assert_eq!(model.hidden_units(), 10);
    }
}
