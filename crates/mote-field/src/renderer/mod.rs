pub mod color;
pub mod instance;
pub mod traits;

// Re-export key types for convenient access
pub use traits::{FrameData, Surface};
