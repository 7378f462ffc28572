// ============================================================
// Layer 5 — ML / Model Layer (Burn)
// ============================================================
// This layer contains ALL Burn framework specific code.
// No other layer imports from burn directly — only this one.
//
// Why isolate Burn code here?
//   - If Burn's API changes, we only update this layer
//   - Other layers are testable without tensors in scope
//   - The model architecture is clearly separated from
//     data loading and application logic
//
// What's in this layer:
//
//   encoder.rs   — The frozen sentence encoder
//                  Token embedding table plus mask-aware mean
//                  pooling and L2 normalisation. Its output is
//                  detached, so training never updates it.
//
//   model.rs     — The intent classifier
//                  Frozen encoder feeding a trainable head:
//                  • Two hidden Linear layers (ReLU, dropout)
//                  • Linear projection to one score per intent
//                  • log-softmax output
//                  Also the class-weighted NLL training loss.
//
//   trainer.rs   — The training loop
//                  Handles forward pass, loss computation,
//                  backward pass, optimiser step, and the
//                  end-of-run checkpoint
//
//   predictor.rs — The inference engine
//                  Loads a checkpoint, cleans and encodes a
//                  query, runs the model, argmaxes the intent
//
// Reference: Burn Book §3 (Building Blocks)
//            Burn Book §5 (Training)
//            Reimers & Gurevych (2019) Sentence-BERT

/// Frozen sentence encoder — embeddings and mean pooling
pub mod encoder;

/// Classifier head over the frozen encoder, plus the loss
pub mod model;

/// Full training loop with metrics and checkpointing
pub mod trainer;

/// Inference engine — loads checkpoint and predicts intents
pub mod predictor;
