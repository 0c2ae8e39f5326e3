pub mod call_tree;
pub mod color;
pub mod geometry;

pub use call_tree::{
    CallTreeNode, CallTreeSort, build_call_tree, build_callers_tree, focus_call_tree,
    sort_call_tree,
};
pub use color::{bar_color_by_value, diff_color, package_color_index};
pub use geometry::{Projection, bar_x, flame_rects, level_rects, pixels_per_tick};
pub use hit_test::hit_test;
