//! Recurrent sequence regressor
//!
//! Two stacked fixed-weight recurrent layers encode each window into a state
//! vector; a trained dense head (relu hidden layer + linear output) maps that
//! state onto the next OHLC row. Only the head carries trainable parameters,
//! so its gradients are closed-form and the optimizer needs no autodiff
//! machinery. Weight initialization uses `1/sqrt(width)` uniform bounds,
//! which keeps the recurrent dynamics contractive under tanh.

use crate::error::{ForecastError, Result};
use crate::model::{SequenceModel, TrainingConfig, TrainingHistory};
use ndarray::{s, Array1, Array2, Array3, ArrayView2, Axis};
use ndarray_rand::rand_distr::Uniform;
use ndarray_rand::RandomExt;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::path::Path;
use stock_data::FEATURES;

const BETA1: f64 = 0.9;
const BETA2: f64 = 0.999;
const EPSILON: f64 = 1e-8;

/// Adam first/second moment estimates for a matrix parameter.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct AdamMatrix {
    m: Array2<f64>,
    v: Array2<f64>,
}

impl AdamMatrix {
    fn zeros(shape: (usize, usize)) -> Self {
        Self {
            m: Array2::zeros(shape),
            v: Array2::zeros(shape),
        }
    }

    fn step(&mut self, param: &mut Array2<f64>, grad: &Array2<f64>, lr: f64, t: i32) {
        self.m = &self.m * BETA1 + grad * (1.0 - BETA1);
        self.v = &self.v * BETA2 + &(grad * grad) * (1.0 - BETA2);
        let m_hat = &self.m / (1.0 - BETA1.powi(t));
        let v_hat = &self.v / (1.0 - BETA2.powi(t));
        let update = m_hat * lr / (v_hat.mapv(f64::sqrt) + EPSILON);
        *param -= &update;
    }
}

/// Adam moment estimates for a bias vector.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct AdamVector {
    m: Array1<f64>,
    v: Array1<f64>,
}

impl AdamVector {
    fn zeros(len: usize) -> Self {
        Self {
            m: Array1::zeros(len),
            v: Array1::zeros(len),
        }
    }

    fn step(&mut self, param: &mut Array1<f64>, grad: &Array1<f64>, lr: f64, t: i32) {
        self.m = &self.m * BETA1 + grad * (1.0 - BETA1);
        self.v = &self.v * BETA2 + &(grad * grad) * (1.0 - BETA2);
        let m_hat = &self.m / (1.0 - BETA1.powi(t));
        let v_hat = &self.v / (1.0 - BETA2.powi(t));
        let update = m_hat * lr / (v_hat.mapv(f64::sqrt) + EPSILON);
        *param -= &update;
    }
}

/// The in-tree model collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecurrentRegressor {
    config: TrainingConfig,
    // Fixed recurrent encoder.
    w_in1: Array2<f64>,
    w_rec1: Array2<f64>,
    w_in2: Array2<f64>,
    w_rec2: Array2<f64>,
    // Trained dense head.
    w1: Array2<f64>,
    b1: Array1<f64>,
    w2: Array2<f64>,
    b2: Array1<f64>,
    opt_w1: AdamMatrix,
    opt_b1: AdamVector,
    opt_w2: AdamMatrix,
    opt_b2: AdamVector,
    steps: i32,
}

impl RecurrentRegressor {
    /// Build a fresh model from the architecture description.
    pub fn new(config: TrainingConfig) -> Self {
        let mut rng = StdRng::seed_from_u64(config.seed);
        let [h1, h2] = config.recurrent_widths;
        let dense = config.dense_width;
        let outputs = config.outputs;

        let limit1 = 1.0 / (h1 as f64).sqrt();
        let limit2 = 1.0 / (h2 as f64).sqrt();
        let limit_d = 1.0 / (dense as f64).sqrt();

        Self {
            w_in1: Array2::random_using((h1, FEATURES), Uniform::new(-limit1, limit1), &mut rng),
            w_rec1: Array2::random_using((h1, h1), Uniform::new(-limit1, limit1), &mut rng),
            w_in2: Array2::random_using((h2, h1), Uniform::new(-limit2, limit2), &mut rng),
            w_rec2: Array2::random_using((h2, h2), Uniform::new(-limit2, limit2), &mut rng),
            w1: Array2::random_using((h2, dense), Uniform::new(-limit2, limit2), &mut rng),
            b1: Array1::zeros(dense),
            w2: Array2::random_using((dense, outputs), Uniform::new(-limit_d, limit_d), &mut rng),
            b2: Array1::zeros(outputs),
            opt_w1: AdamMatrix::zeros((h2, dense)),
            opt_b1: AdamVector::zeros(dense),
            opt_w2: AdamMatrix::zeros((dense, outputs)),
            opt_b2: AdamVector::zeros(outputs),
            steps: 0,
            config,
        }
    }

    /// The configuration this model was built from.
    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    /// Restore a persisted model.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        Ok(bincode::deserialize(&bytes)?)
    }

    /// Run one window through the recurrent stack, returning the final state
    /// of the second layer.
    fn encode(&self, window: &ArrayView2<f64>) -> Array1<f64> {
        let mut h1: Array1<f64> = Array1::zeros(self.w_rec1.nrows());
        let mut h2: Array1<f64> = Array1::zeros(self.w_rec2.nrows());
        for t in 0..window.nrows() {
            let x = window.row(t);
            h1 = (self.w_in1.dot(&x) + self.w_rec1.dot(&h1)).mapv(f64::tanh);
            h2 = (self.w_in2.dot(&h1) + self.w_rec2.dot(&h2)).mapv(f64::tanh);
        }
        h2
    }

    /// Encode every window in a batch into an `[n, state]` matrix.
    fn encode_batch(&self, inputs: &Array3<f64>) -> Array2<f64> {
        let n = inputs.shape()[0];
        let mut encoded = Array2::zeros((n, self.w_rec2.nrows()));
        for i in 0..n {
            let window = inputs.slice(s![i, .., ..]);
            encoded.row_mut(i).assign(&self.encode(&window));
        }
        encoded
    }

    /// Dense head forward pass; returns (output, pre-activation, activation).
    fn head_forward(&self, state: &Array2<f64>) -> (Array2<f64>, Array2<f64>, Array2<f64>) {
        let z1 = state.dot(&self.w1) + &self.b1;
        let a1 = z1.mapv(|v| v.max(0.0));
        let y = a1.dot(&self.w2) + &self.b2;
        (y, z1, a1)
    }

    fn validate_inputs(&self, inputs: &Array3<f64>) -> Result<()> {
        if inputs.shape()[0] > 0 && inputs.shape()[2] != FEATURES {
            return Err(ForecastError::InvalidParameter(format!(
                "expected {} features per row, got {}",
                FEATURES,
                inputs.shape()[2]
            )));
        }
        Ok(())
    }
}

impl SequenceModel for RecurrentRegressor {
    fn fit(
        &mut self,
        train_x: &Array3<f64>,
        train_y: &Array2<f64>,
        val_x: &Array3<f64>,
        val_y: &Array2<f64>,
    ) -> Result<TrainingHistory> {
        self.validate_inputs(train_x)?;
        self.validate_inputs(val_x)?;
        let n = train_x.shape()[0];
        if n == 0 {
            return Err(ForecastError::InsufficientData {
                required: 1,
                found: 0,
            });
        }
        if n != train_y.shape()[0] {
            return Err(ForecastError::InvalidParameter(
                "training inputs and targets disagree on sample count".to_string(),
            ));
        }

        // The encoder is fixed, so windows are encoded once up front and the
        // epochs only iterate the dense head.
        let encoded_train = self.encode_batch(train_x);
        let encoded_val = self.encode_batch(val_x);

        let mut rng = StdRng::seed_from_u64(self.config.seed);
        let dropout = self.config.dropout;
        let keep = 1.0 - dropout;
        let lr = self.config.learning_rate;
        let mut history = TrainingHistory::default();

        for _epoch in 0..self.config.epochs {
            let mut epoch_loss = 0.0;
            let mut batches = 0usize;
            let mut start = 0usize;

            while start < n {
                let end = (start + self.config.batch_size).min(n);
                let mut state = encoded_train.slice(s![start..end, ..]).to_owned();
                let targets = train_y.slice(s![start..end, ..]);

                if dropout > 0.0 {
                    let mask = Array2::from_shape_fn(state.raw_dim(), |_| {
                        if rng.gen::<f64>() < dropout {
                            0.0
                        } else {
                            1.0 / keep
                        }
                    });
                    state = &state * &mask;
                }

                let (y, z1, a1) = self.head_forward(&state);
                let diff = &y - &targets;
                let loss = diff.mapv(|d| d * d).mean().unwrap_or(0.0);
                epoch_loss += loss;
                batches += 1;

                // Closed-form gradients of the two-layer head under MSE.
                let d_y = &diff * (2.0 / diff.len() as f64);
                let d_w2 = a1.t().dot(&d_y);
                let d_b2 = d_y.sum_axis(Axis(0));
                let d_a1 = d_y.dot(&self.w2.t());
                let relu_mask = z1.mapv(|v| if v > 0.0 { 1.0 } else { 0.0 });
                let d_z1 = &d_a1 * &relu_mask;
                let d_w1 = state.t().dot(&d_z1);
                let d_b1 = d_z1.sum_axis(Axis(0));

                self.steps += 1;
                self.opt_w1.step(&mut self.w1, &d_w1, lr, self.steps);
                self.opt_b1.step(&mut self.b1, &d_b1, lr, self.steps);
                self.opt_w2.step(&mut self.w2, &d_w2, lr, self.steps);
                self.opt_b2.step(&mut self.b2, &d_b2, lr, self.steps);

                start = end;
            }

            let train_loss = epoch_loss / batches.max(1) as f64;
            history.loss.push(train_loss);

            let val_loss = if encoded_val.nrows() > 0 {
                let (vy, _, _) = self.head_forward(&encoded_val);
                let diff = &vy - val_y;
                diff.mapv(|d| d * d).mean().unwrap_or(0.0)
            } else {
                train_loss
            };
            history.val_loss.push(val_loss);
        }

        Ok(history)
    }

    fn predict(&self, window: &Array2<f64>) -> Result<Array1<f64>> {
        if window.ncols() != FEATURES {
            return Err(ForecastError::InvalidParameter(format!(
                "expected {} features per row, got {}",
                FEATURES,
                window.ncols()
            )));
        }
        if window.nrows() == 0 {
            return Err(ForecastError::InsufficientData {
                required: 1,
                found: 0,
            });
        }
        let state = self.encode(&window.view()).insert_axis(Axis(0));
        let (y, _, _) = self.head_forward(&state);
        Ok(y.row(0).to_owned())
    }

    fn predict_batch(&self, inputs: &Array3<f64>) -> Result<Array2<f64>> {
        self.validate_inputs(inputs)?;
        let state = self.encode_batch(inputs);
        let (y, _, _) = self.head_forward(&state);
        Ok(y)
    }

    fn save(&self, path: &Path) -> Result<()> {
        let bytes = bincode::serialize(self)?;
        std::fs::write(path, bytes)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config() -> TrainingConfig {
        TrainingConfig {
            window: 10,
            recurrent_widths: [16, 8],
            epochs: 30,
            batch_size: 8,
            ..TrainingConfig::default()
        }
    }

    /// Synthetic windows whose target is a fixed affine function of the last
    /// row, so the head has something learnable.
    fn synthetic_pairs(n: usize, window: usize) -> (Array3<f64>, Array2<f64>) {
        let mut x = Array3::zeros((n, window, FEATURES));
        let mut y = Array2::zeros((n, 4));
        for i in 0..n {
            for t in 0..window {
                for f in 0..FEATURES {
                    let phase = (i + t) as f64 * 0.1 + f as f64;
                    x[[i, t, f]] = (phase.sin() + 1.0) / 2.0;
                }
            }
            for j in 0..4 {
                y[[i, j]] = (x[[i, window - 1, j]] * 0.8 + 0.1).clamp(0.0, 1.0);
            }
        }
        (x, y)
    }

    #[test]
    fn test_fit_reports_one_loss_per_epoch() {
        let config = small_config();
        let (x, y) = synthetic_pairs(40, config.window);
        let (vx, vy) = synthetic_pairs(8, config.window);

        let mut model = RecurrentRegressor::new(config.clone());
        let history = model.fit(&x, &y, &vx, &vy).unwrap();

        assert_eq!(history.loss.len(), config.epochs);
        assert_eq!(history.val_loss.len(), config.epochs);
        assert!(history.loss.iter().all(|l| l.is_finite() && *l >= 0.0));
        assert!(history.val_loss.iter().all(|l| l.is_finite() && *l >= 0.0));
        // Some epoch must improve on the untrained starting point.
        let best = history.loss.iter().cloned().fold(f64::MAX, f64::min);
        assert!(best < history.loss[0]);
    }

    #[test]
    fn test_same_seed_is_deterministic() {
        let config = small_config();
        let (x, y) = synthetic_pairs(24, config.window);
        let (vx, vy) = synthetic_pairs(8, config.window);

        let mut a = RecurrentRegressor::new(config.clone());
        let mut b = RecurrentRegressor::new(config.clone());
        a.fit(&x, &y, &vx, &vy).unwrap();
        b.fit(&x, &y, &vx, &vy).unwrap();

        let window = x.slice(s![0, .., ..]).to_owned();
        assert_eq!(a.predict(&window).unwrap(), b.predict(&window).unwrap());
    }

    #[test]
    fn test_predict_shape() {
        let config = small_config();
        let model = RecurrentRegressor::new(config.clone());
        let (x, _) = synthetic_pairs(3, config.window);

        let single = model.predict(&x.slice(s![0, .., ..]).to_owned()).unwrap();
        assert_eq!(single.len(), 4);

        let batch = model.predict_batch(&x).unwrap();
        assert_eq!(batch.shape(), &[3, 4]);
    }

    #[test]
    fn test_feature_count_mismatch_rejected() {
        let model = RecurrentRegressor::new(small_config());
        let window = Array2::zeros((10, 3));
        assert!(matches!(
            model.predict(&window).unwrap_err(),
            ForecastError::InvalidParameter(_)
        ));
    }

    #[test]
    fn test_save_load_round_trip() {
        let config = small_config();
        let (x, y) = synthetic_pairs(24, config.window);
        let (vx, vy) = synthetic_pairs(8, config.window);
        let mut model = RecurrentRegressor::new(config.clone());
        model.fit(&x, &y, &vx, &vy).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.bin");
        model.save(&path).unwrap();
        let restored = RecurrentRegressor::load(&path).unwrap();

        let window = x.slice(s![0, .., ..]).to_owned();
        assert_eq!(
            model.predict(&window).unwrap(),
            restored.predict(&window).unwrap()
        );
    }
}
