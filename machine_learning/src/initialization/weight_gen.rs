/// A `WeightGen` generates values for the initial state of the model's parameters.
pub trait WeightGen {
    /// Should sample at most `n` parameters.
    ///
    /// # Arguments
    /// * `n` - The upper limit of samples to generate.
    ///
    /// # Returns
    /// An option whether the generator is exhausted.
    fn sample(&mut self, n: usize) -> Option<Vec<f32>>;

    /// Overwrites `params` with freshly sampled values.
    ///
    /// # Returns
    /// The amount of values actually written, less than `params.len()` if the generator ran out.
    fn fill(&mut self, params: &mut [f32]) -> usize {
        let Some(sample) = self.sample(params.len()) else {
            return 0;
        };

        params
            .iter_mut()
            .zip(&sample)
            .for_each(|(p, &s)| *p = s);

        sample.len()
    }
}
