pub mod config;
pub mod shared_str;
pub mod types;
pub mod units;

pub use config::RenderConfig;
pub use shared_str::SharedStr;
pub use types::{BarCoordinates, BarRect, Hsl, ZoomRange};
pub use units::ValueUnit;
