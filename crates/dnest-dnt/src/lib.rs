//! DNT table parser for Dragon Nest.
//!
//! DNT files hold the client's game data tables (items, skills, monsters…).
//! A file is a small header, a typed column schema and a fixed number of
//! rows. This crate decodes a whole table in one pass.
//!
//! # Layout
//!
//! ```text
//! [00 00 00 00][u16 column count][u32 row count]
//! column count × [u16 length][EUC-KR name][u8 type tag]
//! row count    × [u32 id][one cell per column]
//! ```
//!
//! Type tags: `1` text, `2` bool (4 bytes), `3` u32, `4` and `5` f32.
//!
//! # Example
//!
//! ```no_run
//! use dnest_dnt::DntFile;
//!
//! let table = DntFile::open("itemtable.dnt")?;
//!
//! for column in table.columns() {
//!     println!("{}: {}", column.name(), column.kind());
//! }
//!
//! if let Some(row) = table.find_by_id(1001) {
//!     println!("{:?}", row.values());
//! }
//! # Ok::<(), dnest_dnt::Error>(())
//! ```

mod error;
mod table;
mod types;
mod value;

#[cfg(feature = "json-export")]
mod export;

pub use error::{Error, Result};
pub use table::{Column, DntFile, Row, END_MARKER, HEADER, ID_COLUMN};
pub use types::ColumnType;
pub use value::Value;
