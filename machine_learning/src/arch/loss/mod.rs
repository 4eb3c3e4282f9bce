mod cross_entropy;
mod loss_fn;
mod mae;
mod mse;

pub use cross_entropy::CrossEntropy;
pub use loss_fn::{LossFn, argmax};
pub use mae::Mae;
pub use mse::Mse;
