pub mod occlusion;
pub mod ripple;
