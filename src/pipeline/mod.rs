pub mod animate;
pub mod corridor;
pub mod geo;
pub mod interpolate;
pub mod normalize;
pub mod progress;
