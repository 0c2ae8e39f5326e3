pub mod diff;
pub mod levels;
pub mod store;
pub mod table;

pub use diff::{DiffChange, DiffShares};
pub use levels::{FlameTree, LabelIndex, LevelItem, Levels, NodeId};
pub use store::ProfileStore;
pub use table::{LabelColumn, MalformedInputError, ProfileTable, TableColumns};
