pub mod canonical;
pub mod relations;
pub mod stages;
pub mod types;

pub use relations::*;
pub use stages::*;
pub use types::*;
