//! Gene and individual sampling
//!
//! The [`Sampler`](traits::Sampler) seam plus a default implementation that
//! draws random call sequences from an API model.

pub mod api_model;
pub mod api_sampler;
pub mod traits;

pub mod prelude {
    pub use super::api_model::*;
    pub use super::api_sampler::*;
    pub use super::traits::*;
}
