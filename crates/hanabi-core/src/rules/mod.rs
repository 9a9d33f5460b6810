pub mod usefulness;

pub use usefulness::{
    is_already_played, is_color_killed_below, is_last_copy, is_playable, is_useful, max_reachable,
};
