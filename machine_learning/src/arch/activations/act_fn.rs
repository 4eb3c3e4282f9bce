use serde::{Deserialize, Serialize};

const SELU_LAMBDA: f32 = 1.050_701;
const SELU_ALPHA: f32 = 1.673_263_2;

/// The element-wise activation functions a network can apply after a linear transform.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActFn {
    Identity,
    Relu,
    LeakyRelu { alpha: f32 },
    Elu { alpha: f32 },
    Selu,
    Sigmoid,
    HardSigmoid,
    Tanh,
    HardTanh,
    Softsign,
    Softplus,
    Silu,
}
use ActFn::*;

fn sigmoid(z: f32) -> f32 {
    1. / (1. + (-z).exp())
}

impl ActFn {
    pub fn leaky_relu(alpha: f32) -> Self {
        LeakyRelu { alpha }
    }

    pub fn elu(alpha: f32) -> Self {
        Elu { alpha }
    }

    /// Evaluates the function at `z`.
    pub fn f(&self, z: f32) -> f32 {
        match *self {
            Identity => z,
            Relu => z.max(0.),
            LeakyRelu { alpha } => {
                if z > 0. {
                    z
                } else {
                    alpha * z
                }
            }
            Elu { alpha } => {
                if z > 0. {
                    z
                } else {
                    alpha * z.exp_m1()
                }
            }
            Selu => {
                if z > 0. {
                    SELU_LAMBDA * z
                } else {
                    SELU_LAMBDA * SELU_ALPHA * z.exp_m1()
                }
            }
            Sigmoid => sigmoid(z),
            HardSigmoid => (0.2 * z + 0.5).clamp(0., 1.),
            Tanh => z.tanh(),
            HardTanh => z.clamp(-1., 1.),
            Softsign => z / (1. + z.abs()),
            Softplus => z.max(0.) + (-z.abs()).exp().ln_1p(),
            Silu => z * sigmoid(z),
        }
    }

    /// Evaluates the derivative of the function at `z`.
    pub fn df(&self, z: f32) -> f32 {
        match *self {
            Identity => 1.,
            Relu => {
                if z > 0. {
                    1.
                } else {
                    0.
                }
            }
            LeakyRelu { alpha } => {
                if z > 0. {
                    1.
                } else {
                    alpha
                }
            }
            Elu { alpha } => {
                if z > 0. {
                    1.
                } else {
                    alpha * z.exp()
                }
            }
            Selu => {
                if z > 0. {
                    SELU_LAMBDA
                } else {
                    SELU_LAMBDA * SELU_ALPHA * z.exp()
                }
            }
            Sigmoid => {
                let s = sigmoid(z);
                s * (1. - s)
            }
            HardSigmoid => {
                let y = 0.2 * z + 0.5;
                if y > 0. && y < 1. { 0.2 } else { 0. }
            }
            Tanh => 1. - z.tanh().powi(2),
            HardTanh => {
                if z > -1. && z < 1. {
                    1.
                } else {
                    0.
                }
            }
            Softsign => 1. / (1. + z.abs()).powi(2),
            Softplus => sigmoid(z),
            Silu => {
                let s = sigmoid(z);
                s + z * s * (1. - s)
            }
        }
    }

    /// Returns the gain used for a variance aware (Xavier) initialization of the weights feeding
    /// this activation.
    ///
    /// # Returns
    /// `None` if the activation is fine with the default initialization.
    pub fn xavier_gain(&self) -> Option<f32> {
        match *self {
            Tanh => Some(5. / 3.),
            LeakyRelu { alpha } => Some((2. / (1. + alpha.powi(2))).sqrt()),
            _ => None,
        }
    }
}
