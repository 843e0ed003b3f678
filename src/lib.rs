pub mod cli;
pub mod config;
pub mod error;
pub mod parser;
pub mod paths;
pub mod pipeline;
pub mod relation;
pub mod schema;
pub mod source;
pub mod transform;
pub mod ui;
pub mod writer;

pub use cli::{Cli, Commands, RunOptions};
pub use config::{PipelineConfig, RankMethod, ZeroHeightPolicy};
pub use error::PipelineError;
pub use pipeline::{Pipeline, PipelineRun, RunReport};
pub use relation::{Field, Relation, Value};
pub use source::{JsonlSource, MemorySource, RawSource, SqliteSource};
pub use ui::{LogUi, Phase, SilentUi, Ui, UiApp};
