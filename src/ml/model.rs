use burn::{
    nn::{Dropout, DropoutConfig, Linear, LinearConfig, Relu},
    prelude::*,
    tensor::activation::log_softmax,
    tensor::backend::AutodiffBackend,
};

use crate::ml::encoder::{SentenceEncoder, SentenceEncoderConfig};

// NOTE: #[derive(Config)] already generates Clone and Serialize/Deserialize
// internally — do NOT add them again or you get conflicting impls.
#[derive(Config, Debug)]
pub struct IntentClassifierConfig {
    pub vocab_size:  usize,
    pub num_classes: usize,
    #[config(default = 768)]
    pub embed_width: usize,
    #[config(default = 512)]
    pub hidden_1:    usize,
    #[config(default = 256)]
    pub hidden_2:    usize,
    #[config(default = 0.2)]
    pub dropout:     f64,
}

impl IntentClassifierConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> IntentClassifier<B> {
        IntentClassifier {
            encoder: SentenceEncoderConfig::new(self.vocab_size, self.embed_width)
                .init(device),
            fc1:     LinearConfig::new(self.embed_width, self.hidden_1).init(device),
            fc2:     LinearConfig::new(self.hidden_1, self.hidden_2).init(device),
            fc3:     LinearConfig::new(self.hidden_2, self.num_classes).init(device),
            act:     Relu::new(),
            dropout: DropoutConfig::new(self.dropout).init(),
        }
    }
}

/// Frozen sentence encoder feeding a small feed-forward head:
/// two hidden layers with ReLU and dropout, then a projection to
/// per-class log probabilities. Only the head's parameters carry
/// gradients; the encoder stays fixed (see ml::encoder).
#[derive(Module, Debug)]
pub struct IntentClassifier<B: Backend> {
    pub encoder: SentenceEncoder<B>,
    pub fc1:     Linear<B>,
    pub fc2:     Linear<B>,
    pub fc3:     Linear<B>,
    pub act:     Relu,
    pub dropout: Dropout,
}

impl<B: Backend> IntentClassifier<B> {
    /// token_ids, attention_mask: [batch, seq_len]
    /// → log probabilities: [batch, num_classes]
    ///
    /// Dropout is live on an autodiff backend (training) and
    /// inert on a plain backend (evaluation), so the two modes
    /// of this model are just two backends.
    pub fn forward(
        &self,
        token_ids:      Tensor<B, 2, Int>,
        attention_mask: Tensor<B, 2, Int>,
    ) -> Tensor<B, 2> {
        let features = self.encoder.forward(token_ids, attention_mask);

        let x = self.dropout.forward(self.act.forward(self.fc1.forward(features)));
        let x = self.dropout.forward(self.act.forward(self.fc2.forward(x)));

        log_softmax(self.fc3.forward(x), 1)
    }

    /// Forward pass plus class-weighted negative log likelihood.
    ///
    /// Each sample's loss is the log probability of its true
    /// class scaled by that class's weight; the batch loss is the
    /// weighted sum divided by the sum of the applied weights.
    /// Under-represented classes therefore pull on the gradient
    /// as hard as common ones.
    pub fn forward_loss(
        &self,
        token_ids:      Tensor<B, 2, Int>,
        attention_mask: Tensor<B, 2, Int>,
        labels:         Tensor<B, 1, Int>,
        class_weights:  Tensor<B, 1>,
    ) -> (Tensor<B, 1>, Tensor<B, 2>)
    where
        B: AutodiffBackend,
    {
        let log_probs  = self.forward(token_ids, attention_mask); // [batch, classes]
        let [batch_size, _] = log_probs.dims();

        // Log probability of each sample's true class
        let picked = log_probs.clone()
            .gather(1, labels.clone().reshape([batch_size, 1]))
            .reshape([batch_size]);

        // Per-sample weight, looked up by true class
        let sample_weights = class_weights.gather(0, labels); // [batch]

        let loss = -((picked * sample_weights.clone()).sum()) / sample_weights.sum();

        (loss, log_probs)
    }
}
