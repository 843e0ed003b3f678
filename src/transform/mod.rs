//! Pure relational transforms, one per stage kind

pub mod assemble;
pub mod filter;
pub mod join;
pub mod metrics;
pub mod rank;
pub mod rename;
pub mod staging;

pub use assemble::assemble;
pub use filter::filter_generation;
pub use join::{inner_join, inner_join_all, JoinLoss};
pub use metrics::{calculate_base_stats, calculate_bmi, calculate_egg_hatch_time, count_types};
pub use rank::rank_bmi;
pub use rename::rename_columns;
pub use staging::{empty_raw, stage};
