// ============================================================
// Layer 5 — Training Loop
// ============================================================
// Full training loop using Burn's DataLoader and AdamW.
//
// Key Burn insight:
//   - Training uses TrainBackend (Autodiff<NdArray>) so dropout
//     fires and gradients are tracked
//   - The frozen encoder contributes no gradients, so the
//     optimizer only ever touches the head
//   - Gradient-norm clipping is wired into the optimizer config,
//     bounding each update before AdamW applies it
//
// Every epoch reshuffles the dataset and walks ALL of its
// batches; the reported loss is the mean over those batches.
//
// Reference: Burn Book §5
//            Loshchilov & Hutter (2019) - AdamW

use anyhow::Result;
use burn::{
    data::dataloader::{DataLoader, DataLoaderBuilder},
    grad_clipping::GradientClippingConfig,
    optim::{AdamWConfig, GradientsParams, Optimizer},
    prelude::*,
};
use std::sync::Arc;

use crate::application::train_use_case::TrainConfig;
use crate::data::{
    batcher::{IntentBatch, IntentBatcher},
    dataset::IntentDataset,
};
use crate::infra::checkpoint::CheckpointManager;
use crate::infra::metrics::{EpochMetrics, MetricsLogger};
use crate::ml::model::{IntentClassifier, IntentClassifierConfig};

type TrainBackend = burn::backend::Autodiff<burn::backend::NdArray>;

pub fn run_training(
    cfg:           &TrainConfig,
    model_cfg:     &IntentClassifierConfig,
    dataset:       IntentDataset,
    class_weights: Vec<f32>,
    ckpt_manager:  CheckpointManager,
) -> Result<()> {
    let device = burn::backend::ndarray::NdArrayDevice::default();
    tracing::info!("Using CPU device: {:?}", device);

    // Reproducible parameter init and dropout masks
    TrainBackend::seed(cfg.seed);

    train_loop(cfg, model_cfg, dataset, class_weights, ckpt_manager, device)
}

fn train_loop(
    cfg:           &TrainConfig,
    model_cfg:     &IntentClassifierConfig,
    dataset:       IntentDataset,
    class_weights: Vec<f32>,
    ckpt_manager:  CheckpointManager,
    device:        burn::backend::ndarray::NdArrayDevice,
) -> Result<()> {

    // ── Build model ───────────────────────────────────────────────────────────
    let mut model: IntentClassifier<TrainBackend> = model_cfg.init(&device);
    tracing::info!(
        "Model ready: {} → {} → {} → {} classes",
        model_cfg.embed_width, model_cfg.hidden_1, model_cfg.hidden_2, model_cfg.num_classes,
    );

    // ── AdamW optimiser with gradient-norm clipping ───────────────────────────
    // m = β1*m + (1-β1)*g        (mean)
    // v = β2*v + (1-β2)*g²       (variance)
    // θ = θ(1 - lr*wd) - lr * m / (√v + ε)  (decoupled decay)
    let optim_cfg = AdamWConfig::new()
        .with_epsilon(1e-8)
        .with_weight_decay(0.01)
        .with_grad_clipping(Some(GradientClippingConfig::Norm(cfg.grad_clip)));
    let mut optim = optim_cfg.init();

    // ── Class-weight tensor, fixed for the whole run ──────────────────────────
    let class_weights = Tensor::<TrainBackend, 1>::from_floats(
        class_weights.as_slice(), &device,
    );

    // ── Training data loader ──────────────────────────────────────────────────
    // A fresh permutation every epoch: each sample lands in
    // exactly one batch per pass
    let batcher = IntentBatcher::<TrainBackend>::new(device);
    let loader  = DataLoaderBuilder::new(batcher)
        .batch_size(cfg.batch_size)
        .shuffle(cfg.seed)
        .num_workers(1)
        .build(dataset);

    let metrics = MetricsLogger::new(ckpt_manager.dir())?;

    // ── Epoch loop ────────────────────────────────────────────────────────────
    for epoch in 1..=cfg.epochs {
        let (updated, avg_loss) = train_one_epoch(model, &mut optim, &loader, &class_weights, cfg.lr);
        model = updated;

        println!("Epoch {:>3}/{} | train_loss={:.4}", epoch, cfg.epochs, avg_loss);
        metrics.log(&EpochMetrics::new(epoch, avg_loss))?;
    }

    // One checkpoint at the end of the run; the record carries
    // the frozen encoder and the trained head together
    ckpt_manager.save_model(&model)?;
    tracing::info!("Training complete, model saved");
    Ok(())
}

/// Run one full pass over the loader: forward, weighted loss,
/// backward, optimizer step per batch. Returns the updated model
/// and the mean loss across all batches visited.
fn train_one_epoch(
    mut model:     IntentClassifier<TrainBackend>,
    optim:         &mut impl Optimizer<IntentClassifier<TrainBackend>, TrainBackend>,
    loader:        &Arc<dyn DataLoader<IntentBatch<TrainBackend>>>,
    class_weights: &Tensor<TrainBackend, 1>,
    lr:            f64,
) -> (IntentClassifier<TrainBackend>, f64) {
    let mut loss_sum = 0.0f64;
    let mut batches  = 0usize;

    for batch in loader.iter() {
        let (loss, _) = model.forward_loss(
            batch.token_ids,
            batch.attention_mask,
            batch.labels,
            class_weights.clone(),
        );

        loss_sum += loss.clone().into_scalar().elem::<f64>();
        batches  += 1;

        // Backward pass + clipped AdamW update
        let grads = loss.backward();
        let grads = GradientsParams::from_grads(grads, &model);
        model = optim.step(lr, model, grads);
    }

    let avg_loss = if batches > 0 {
        loss_sum / batches as f64
    } else { f64::NAN };

    (model, avg_loss)
}
