//! UIString message tables for Dragon Nest.
//!
//! The client keeps its user-facing strings in XML files of the form
//! `<message mid="1234"><![CDATA[text]]></message>`. This crate loads such a
//! file into an id-keyed lookup table.
//!
//! # Example
//!
//! ```no_run
//! use dnest_uistring::UiStringTable;
//!
//! let strings = UiStringTable::open("uistring.xml")?;
//! println!("{}", strings.get(1000).unwrap_or("?"));
//! # Ok::<(), dnest_uistring::Error>(())
//! ```

mod error;
mod table;

pub use error::{Error, Result};
pub use table::UiStringTable;
