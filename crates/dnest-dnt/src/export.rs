//! JSON export of decoded tables.
//!
//! Rows are written as objects keyed by column name, keeping schema order.

use std::io::Write;

use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

use crate::table::{Column, DntFile, Row};
use crate::{Error, Result};

struct RowObject<'a> {
    columns: &'a [Column],
    row: &'a Row,
}

impl Serialize for RowObject<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.columns.len()))?;
        for (column, value) in self.columns.iter().zip(self.row.values()) {
            map.serialize_entry(column.name(), value)?;
        }
        map.end()
    }
}

struct TableRows<'a>(&'a DntFile);

impl Serialize for TableRows<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let table = self.0;
        let mut seq = serializer.serialize_seq(Some(table.row_count()))?;
        for row in table.rows() {
            seq.serialize_element(&RowObject {
                columns: table.columns(),
                row,
            })?;
        }
        seq.end()
    }
}

impl DntFile {
    /// Serialize all rows as a compact JSON array.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(&TableRows(self)).map_err(|e| Error::Export(e.to_string()))
    }

    /// Serialize all rows as an indented JSON array.
    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(&TableRows(self)).map_err(|e| Error::Export(e.to_string()))
    }

    /// Stream all rows as JSON into a writer.
    pub fn write_json<W: Write>(&self, writer: W, pretty: bool) -> Result<()> {
        let rows = TableRows(self);
        let written = if pretty {
            serde_json::to_writer_pretty(writer, &rows)
        } else {
            serde_json::to_writer(writer, &rows)
        };
        written.map_err(|e| Error::Export(e.to_string()))
    }
}
