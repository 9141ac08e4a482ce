// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Plain Rust structs and traits that define what the system
// talks about. No burn types and no file I/O in this layer.

// Layer-size list of a feed-forward classifier
pub mod shape;

// Parameter name → values mapping used for checkpoints
pub mod state_dict;

// Architecture + state dict, the unit that gets saved to disk
pub mod checkpoint;

// Labelled images and the datasets they come from
pub mod image;

// Core abstractions (traits) that other layers implement
pub mod traits;
