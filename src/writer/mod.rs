pub mod jsonl;
pub mod schema_gen;
pub mod sqlite;

pub use jsonl::write_jsonl;
pub use schema_gen::generate_create_table;
pub use sqlite::{write_to_sqlite, SqliteWriter};
