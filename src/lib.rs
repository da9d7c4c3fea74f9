pub mod error;
pub mod model;
pub mod shape;

pub use error::UNetError;
pub use model::UNet;
pub use model::UNetConfig;
pub use shape::ShapePlan;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
