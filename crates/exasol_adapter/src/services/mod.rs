//! Services behind the host contracts.
//!
//! - `connection` - Connection lifecycle and statement dispatch
//! - `cursor` - Result cursor with bounded fetch
//! - `catalog` - Catalog introspection against Exasol system views
//! - `completions` - Memoized keyword completions

pub mod catalog;
pub mod completions;
pub mod connection;
pub mod cursor;

pub use catalog::CatalogBuilder;
pub use completions::CompletionsProvider;
pub use connection::Connection;
pub use cursor::Cursor;
