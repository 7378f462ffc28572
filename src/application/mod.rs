// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// This layer orchestrates all the other layers to accomplish
// a specific goal (training or chatting).
//
// Rules for this layer:
//   - No ML math or model code here
//   - No argument parsing here (that's Layer 1); the serving
//     loop talks to the console only through injected handles
//   - No direct file parsing (that's Layer 4 and 6)
//   - Only workflow coordination
//
// Think of this layer as the "director" — it tells other
// layers what to do but doesn't do the work itself.
//
// Reference: Clean Architecture pattern
//            Rust Book §7 (Module System)

// The training workflow
pub mod train_use_case;

// The interactive serving loop
pub mod chat_use_case;
