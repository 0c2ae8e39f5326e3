//! Flame graph data engine.
//!
//! ```text
//!   frame JSON ─┐
//!               ├─▶ ProfileTable ─▶ ProfileStore ─▶ Levels ──────────────┬─▶ BarRect[]
//!   collapsed  ─┘     (columns)       (cached tree)   │                   └─▶ hit test
//!                                                     └─▶ Sandwich ─▶ callers / callees
//! ```
//!
//! Rendering itself (canvas, colors on screen, events) belongs to the
//! consumer; this crate only produces data and pixel geometry.

pub mod model;
pub mod parsers;
pub mod search;
pub mod transform;
pub mod views;

pub use model::{LevelItem, Levels, MalformedInputError, NodeId, ProfileStore, ProfileTable};
pub use transform::{CollapsedMap, Sandwich};
