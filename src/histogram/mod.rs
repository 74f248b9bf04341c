pub mod buffer;
pub mod sampler;
pub mod builder;
pub mod compartments;
pub mod chart;

pub use buffer::*;
pub use sampler::*;
pub use builder::*;
pub use compartments::*;
pub use chart::*;
