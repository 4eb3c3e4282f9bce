mod random;
mod weight_gen;

pub use random::RandWeightGen;
pub use weight_gen::WeightGen;
