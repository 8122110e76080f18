//! Model plumbing: asset resolution, tokenizer, and device selection

pub mod device;
pub mod hub;
pub mod tokenizer;

pub use device::{select_device, DevicePreference};
pub use hub::ModelAssets;
pub use tokenizer::TokenizerWrapper;
