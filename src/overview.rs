pub mod matrix;
pub mod normalize;
pub mod pipeline;
pub mod projection;
pub mod reduction;
