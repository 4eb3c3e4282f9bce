use log::debug;
use machine_learning::{
    arch::{Sequential, activations::ActFn, layers::Layer},
    initialization::{RandWeightGen, WeightGen},
};
use rand::{SeedableRng, rngs::StdRng};

use crate::{Result, TrainErr, config::LayerSpec, registry::Registry};

/// The seed every variance aware initialization starts from, so a topology always starts from the
/// same weights.
pub const INIT_SEED: u64 = 42;

/// Turns an ordered list of `LayerSpec`s into a runnable `Sequential`.
pub struct NetBuilder<'a> {
    activations: &'a Registry<ActFn>,
}

impl<'a> NetBuilder<'a> {
    /// Creates a new `NetBuilder`.
    ///
    /// # Arguments
    /// * `activations` - The registry activation names are resolved against.
    pub fn new(activations: &'a Registry<ActFn>) -> Self {
        Self { activations }
    }

    /// Validates the layer specs and builds the network they describe.
    ///
    /// Every layer spec becomes a dense layer followed by one layer per activation. Dense weights
    /// start at zero unless one of its activations asks for a Xavier initialization, in which case
    /// the first such activation decides the gain.
    ///
    /// # Arguments
    /// * `specs` - The layers, in order.
    ///
    /// # Returns
    /// The network, or `Topology` if two adjacent specs don't fit or `UnknownName` if an
    /// activation isn't registered.
    pub fn build(&self, specs: &[LayerSpec]) -> Result<Sequential> {
        self.check(specs)?;

        let mut layers = Vec::new();
        let mut inits = Vec::new();

        for spec in specs {
            let dense_idx = layers.len();
            layers.push(Layer::dense((spec.input_count, spec.output_count)));

            let mut gain = None;
            for name in &spec.activations {
                let act_fn = self.activations.resolve(name)?;
                gain = gain.or(act_fn.xavier_gain());
                layers.push(Layer::activation(act_fn));
            }

            if let Some(gain) = gain {
                inits.push((dense_idx, gain));
            }
        }

        let mut model = Sequential::new(layers);
        for (idx, gain) in inits {
            xavier_init(&mut model, idx, gain)?;
        }

        debug!(
            "built a network of {} layers from {} specs",
            model.layers().len(),
            specs.len()
        );
        Ok(model)
    }

    fn check(&self, specs: &[LayerSpec]) -> Result<()> {
        if specs.is_empty() {
            return Err(TrainErr::Topology(
                "the network must have at least one layer".into(),
            ));
        }

        if let Some(i) = specs
            .iter()
            .position(|s| s.input_count == 0 || s.output_count == 0)
        {
            return Err(TrainErr::Topology(format!("layer {i} has a zero size")));
        }

        for (i, pair) in specs.windows(2).enumerate() {
            let (prev, next) = (&pair[0], &pair[1]);
            if prev.output_count != next.input_count {
                return Err(TrainErr::Topology(format!(
                    "layer {}: input size ({}) does not match previous layer output size ({})",
                    i + 1,
                    next.input_count,
                    prev.output_count
                )));
            }
        }

        Ok(())
    }
}

/// Overwrites the weights of the dense layer at `idx` with a Xavier normal sample.
fn xavier_init(model: &mut Sequential, idx: usize, gain: f32) -> Result<()> {
    let Some((weights, (fan_in, fan_out))) = model.weights_mut(idx) else {
        return Ok(());
    };

    let rng = StdRng::seed_from_u64(INIT_SEED);
    let mut weight_gen = RandWeightGen::xavier(rng, fan_in, fan_out, gain)?;
    weight_gen.fill(weights);
    Ok(())
}

#[cfg(test)]
mod tests {
    use machine_learning::arch::Model;

    use super::*;
    use crate::{error::NameKind, registry::Registries};

    fn build(specs: &[LayerSpec]) -> Result<Sequential> {
        let registries = Registries::standard();
        NetBuilder::new(&registries.activations).build(specs)
    }

    fn weights(model: &mut Sequential, idx: usize) -> Vec<f32> {
        model.weights_mut(idx).unwrap().0.to_vec()
    }

    #[test]
    fn mismatched_adjacent_layers_fail() {
        let specs = [
            LayerSpec::new(4, 8, Vec::<String>::new()),
            LayerSpec::new(6, 2, Vec::<String>::new()),
        ];

        assert!(matches!(build(&specs), Err(TrainErr::Topology(_))));
    }

    #[test]
    fn empty_and_zero_sized_topologies_fail() {
        assert!(matches!(build(&[]), Err(TrainErr::Topology(_))));

        let specs = [LayerSpec::new(0, 2, Vec::<String>::new())];
        assert!(matches!(build(&specs), Err(TrainErr::Topology(_))));
    }

    #[test]
    fn unknown_activation_fails() {
        let specs = [LayerSpec::new(2, 2, ["Gelu"])];

        assert!(matches!(
            build(&specs),
            Err(TrainErr::UnknownName {
                kind: NameKind::Activation,
                ..
            })
        ));
    }

    #[test]
    fn every_spec_becomes_dense_plus_activations() {
        let specs = [
            LayerSpec::new(4, 8, ["ReLU", "Sigmoid"]),
            LayerSpec::new(8, 3, Vec::<String>::new()),
        ];

        let model = build(&specs).unwrap();

        let kinds: Vec<_> = model
            .layers()
            .iter()
            .map(|layer| match layer {
                Layer::Dense(dense) => format!("dense{:?}", dense.dim()),
                Layer::Activation(act) => format!("{:?}", act.act_fn()),
            })
            .collect();
        assert_eq!(
            kinds,
            ["dense(4, 8)", "Relu", "Sigmoid", "dense(8, 3)"]
        );
        assert_eq!(model.size(), 5 * 8 + 9 * 3);
    }

    #[test]
    fn activations_without_gain_keep_zero_weights() {
        let mut model = build(&[LayerSpec::new(3, 2, ["ReLU"])]).unwrap();
        assert!(weights(&mut model, 0).iter().all(|&w| w == 0.));
    }

    #[test]
    fn tanh_triggers_a_deterministic_xavier_init() {
        let specs = [
            LayerSpec::new(3, 4, ["Tanh"]),
            LayerSpec::new(4, 2, Vec::<String>::new()),
        ];

        let mut a = build(&specs).unwrap();
        let mut b = build(&specs).unwrap();

        let w = weights(&mut a, 0);
        assert!(w.iter().any(|&w| w != 0.));
        assert_eq!(w, weights(&mut b, 0));

        // biases and the plain dense layer stay at zero
        assert!(a.params()[12..16].iter().all(|&p| p == 0.));
        assert!(weights(&mut a, 2).iter().all(|&w| w == 0.));
    }

    #[test]
    fn only_the_first_gain_activation_counts() {
        let mut tanh_first = build(&[LayerSpec::new(3, 4, ["Tanh", "LeakyReLU"])]).unwrap();
        let mut tanh_only = build(&[LayerSpec::new(3, 4, ["Tanh"])]).unwrap();
        let mut leaky_only = build(&[LayerSpec::new(3, 4, ["LeakyReLU"])]).unwrap();

        let w = weights(&mut tanh_first, 0);
        assert_eq!(w, weights(&mut tanh_only, 0));
        assert_ne!(w, weights(&mut leaky_only, 0));
    }

    #[test]
    fn gain_activation_after_a_plain_one_still_counts() {
        let mut relu_tanh = build(&[LayerSpec::new(3, 4, ["ReLU", "Tanh"])]).unwrap();
        let mut tanh = build(&[LayerSpec::new(3, 4, ["Tanh"])]).unwrap();

        assert_eq!(weights(&mut relu_tanh, 0), weights(&mut tanh, 0));
    }
}
