use serde::{Deserialize, Serialize};

/// One linear transform of the network followed by its activations, applied in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerSpec {
    pub input_count: usize,
    pub output_count: usize,
    #[serde(default)]
    pub activations: Vec<String>,
}

impl LayerSpec {
    pub fn new<S: Into<String>>(
        input_count: usize,
        output_count: usize,
        activations: impl IntoIterator<Item = S>,
    ) -> Self {
        Self {
            input_count,
            output_count,
            activations: activations.into_iter().map(Into::into).collect(),
        }
    }
}
