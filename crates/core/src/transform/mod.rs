pub mod collapse;
pub mod levels;
pub mod sandwich;

pub use collapse::{CollapsedGroup, CollapsedMap};
pub use levels::nested_set_to_levels;
pub use sandwich::{Direction, Sandwich, merge_subtrees, sandwich_levels};
