//! DNT table decoding.

use std::fs::File;
use std::path::Path;

use dnest_common::BinaryReader;
use memmap2::Mmap;
use tracing::{debug, info};

use crate::types::ColumnType;
use crate::value::Value;
use crate::{Error, Result};

/// Every DNT file starts with four zero bytes.
pub const HEADER: [u8; 4] = [0x00; 4];

/// End-of-table marker written after the last row by the game's tools.
///
/// It is recorded but never required; see [`DntFile::has_end_marker`].
pub const END_MARKER: &[u8] = b"\x05THEND";

/// Name of the synthetic leading column.
pub const ID_COLUMN: &str = "id";

/// A named, typed column of a DNT table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    name: String,
    kind: ColumnType,
}

impl Column {
    /// Create a new column.
    pub fn new(name: impl Into<String>, kind: ColumnType) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    /// The synthetic `id` column that precedes the on-disk schema.
    fn id() -> Self {
        Self::new(ID_COLUMN, ColumnType::UInt32)
    }

    /// Column name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Column type.
    #[inline]
    pub fn kind(&self) -> ColumnType {
        self.kind
    }
}

/// One decoded row: a value per column, in column order.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    values: Vec<Value>,
}

impl Row {
    /// The row id (the synthetic first column).
    pub fn id(&self) -> u32 {
        match self.values.first() {
            Some(Value::UInt32(id)) => *id,
            _ => unreachable!("rows always start with the u32 id column"),
        }
    }

    /// Get a value by column index.
    #[inline]
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    /// All values of this row.
    #[inline]
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Number of cells in this row.
    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the row has no cells. Never true for a decoded row.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// A fully decoded DNT table.
///
/// Decoding is all-or-nothing: [`DntFile::parse`] either returns every row
/// or an error.
#[derive(Debug, Clone, PartialEq)]
pub struct DntFile {
    columns: Vec<Column>,
    rows: Vec<Row>,
    has_end_marker: bool,
}

impl DntFile {
    /// Open and decode a DNT file.
    ///
    /// The file is mapped only for the duration of the parse.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Parsing DNT file: {}", path.display());

        let file = File::open(path)?;
        if file.metadata()?.len() == 0 {
            return Self::parse(&[]);
        }

        // SAFETY: the mapping is read-only and dropped before returning.
        let mmap = unsafe { Mmap::map(&file)? };
        Self::parse(&mmap)
    }

    /// Decode a DNT table from bytes.
    pub fn parse(data: &[u8]) -> Result<Self> {
        let mut reader = BinaryReader::new(data);

        let header: [u8; 4] = reader.read_array()?;
        if header != HEADER {
            return Err(Error::InvalidHeader { actual: header });
        }

        let column_count = reader.read_u16()? as usize;
        let row_count = reader.read_u32()? as usize;
        debug!(columns = column_count, rows = row_count, "DNT header");

        let mut columns = Vec::with_capacity(column_count + 1);
        columns.push(Column::id());
        for index in 0..column_count {
            let offset = reader.position();
            let column = Self::read_column(&mut reader, index)?;
            // Rows are keyed by name, so names must stay unique (`_id` included).
            if columns.iter().any(|c| c.name == column.name) {
                return Err(Error::DuplicateColumn {
                    column: index,
                    name: column.name,
                    offset,
                });
            }
            columns.push(column);
        }

        // Every row holds at least its 4-byte id, which bounds a bogus count.
        let mut rows = Vec::with_capacity(row_count.min(reader.remaining() / 4));
        for _ in 0..row_count {
            rows.push(Self::read_row(&mut reader, &columns)?);
        }

        let has_end_marker = reader.starts_with(END_MARKER);
        if !has_end_marker {
            debug!(
                trailing = reader.remaining(),
                "DNT table has no end marker after its last row"
            );
        }

        Ok(Self {
            columns,
            rows,
            has_end_marker,
        })
    }

    fn read_column(reader: &mut BinaryReader<'_>, index: usize) -> Result<Column> {
        let raw_name = reader.read_varchar()?;
        // The first character is a marker (usually '_') and is always dropped.
        let name: String = raw_name.chars().skip(1).collect();

        let offset = reader.position();
        let tag = reader.read_u8()?;
        let kind = ColumnType::from_tag(tag).ok_or_else(|| Error::UnknownColumnType {
            column: index,
            name: name.clone(),
            tag,
            offset,
        })?;

        Ok(Column::new(name, kind))
    }

    fn read_row(reader: &mut BinaryReader<'_>, columns: &[Column]) -> Result<Row> {
        let values = columns
            .iter()
            .map(|column| column.kind.decode(reader))
            .collect::<Result<Vec<_>>>()?;
        Ok(Row { values })
    }

    /// The schema, starting with the synthetic `id` column.
    #[inline]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// All rows in file order.
    #[inline]
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Number of columns, including `id`.
    #[inline]
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Number of rows.
    #[inline]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Whether the end-of-table marker directly follows the last row.
    #[inline]
    pub fn has_end_marker(&self) -> bool {
        self.has_end_marker
    }

    /// Index of the column with the given name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// Get a row by position.
    #[inline]
    pub fn row(&self, index: usize) -> Option<&Row> {
        self.rows.get(index)
    }

    /// Find the first row with the given id.
    pub fn find_by_id(&self, id: u32) -> Option<&Row> {
        self.rows.iter().find(|row| row.id() == id)
    }

    /// Get a cell by row position and column name.
    pub fn get(&self, row: usize, column: &str) -> Option<&Value> {
        let index = self.column_index(column)?;
        self.rows.get(row)?.get(index)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Builds DNT bytes column by column and row by row.
    pub(crate) struct DntBytes {
        schema: Vec<u8>,
        rows: Vec<u8>,
        columns: u16,
        row_count: u32,
    }

    impl DntBytes {
        pub(crate) fn new() -> Self {
            Self {
                schema: Vec::new(),
                rows: Vec::new(),
                columns: 0,
                row_count: 0,
            }
        }

        pub(crate) fn column(mut self, raw_name: &[u8], tag: u8) -> Self {
            self.schema
                .extend_from_slice(&(raw_name.len() as u16).to_le_bytes());
            self.schema.extend_from_slice(raw_name);
            self.schema.push(tag);
            self.columns += 1;
            self
        }

        pub(crate) fn row(mut self, cells: &[u8]) -> Self {
            self.rows.extend_from_slice(cells);
            self.row_count += 1;
            self
        }

        pub(crate) fn build(&self) -> Vec<u8> {
            let mut out = HEADER.to_vec();
            out.extend_from_slice(&self.columns.to_le_bytes());
            out.extend_from_slice(&self.row_count.to_le_bytes());
            out.extend_from_slice(&self.schema);
            out.extend_from_slice(&self.rows);
            out
        }
    }

    pub(crate) fn cells(parts: &[&[u8]]) -> Vec<u8> {
        parts.concat()
    }

    pub(crate) fn text(s: &str) -> Vec<u8> {
        let mut out = (s.len() as u16).to_le_bytes().to_vec();
        out.extend_from_slice(s.as_bytes());
        out
    }

    #[test]
    fn test_single_uint32_column() {
        let data = DntBytes::new()
            .column(b"_X", 3)
            .row(&cells(&[&7u32.to_le_bytes(), &42u32.to_le_bytes()]))
            .build();

        let table = DntFile::parse(&data).unwrap();

        assert_eq!(table.column_count(), 2);
        assert_eq!(table.columns()[0], Column::new("id", ColumnType::UInt32));
        assert_eq!(table.columns()[1], Column::new("X", ColumnType::UInt32));
        assert_eq!(table.row_count(), 1);

        let row = &table.rows()[0];
        assert_eq!(row.id(), 7);
        assert_eq!(row.values(), &[Value::UInt32(7), Value::UInt32(42)]);
        assert_eq!(table.get(0, "X"), Some(&Value::UInt32(42)));
    }

    #[test]
    fn test_all_column_types() {
        let data = DntBytes::new()
            .column(b"_Name", 1)
            .column(b"_Enabled", 2)
            .column(b"_Level", 3)
            .column(b"_Rate", 4)
            .column(b"_Scale", 5)
            .row(&cells(&[
                &1u32.to_le_bytes(),
                &text("sword"),
                &[1, 0, 0, 0],
                &60u32.to_le_bytes(),
                &0.5f32.to_le_bytes(),
                &2.0f32.to_le_bytes(),
            ]))
            .row(&cells(&[
                &2u32.to_le_bytes(),
                &text(""),
                &[0, 9, 9, 9],
                &1u32.to_le_bytes(),
                &(-1.25f32).to_le_bytes(),
                &0f32.to_le_bytes(),
            ]))
            .build();

        let table = DntFile::parse(&data).unwrap();
        let names: Vec<_> = table.columns().iter().map(Column::name).collect();
        assert_eq!(names, ["id", "Name", "Enabled", "Level", "Rate", "Scale"]);
        assert_eq!(table.columns()[5].kind(), ColumnType::FloatAlt);

        assert_eq!(table.row_count(), 2);
        for row in table.rows() {
            assert_eq!(row.len(), table.column_count());
        }

        let second = table.find_by_id(2).unwrap();
        assert_eq!(second.get(1), Some(&Value::Text(String::new())));
        assert_eq!(second.get(2), Some(&Value::Bool(false)));
        assert_eq!(second.get(4), Some(&Value::Float(-1.25)));
        assert_eq!(table.get(0, "Name").and_then(Value::as_str), Some("sword"));
        assert_eq!(table.get(0, "Enabled").and_then(Value::as_bool), Some(true));
    }

    #[test]
    fn test_first_character_always_dropped() {
        // Not just underscores: whatever the first character is goes away.
        let data = DntBytes::new()
            .column(b"_Name", 3)
            .column(b"Name", 3)
            .column(b"x", 3)
            .build();

        let table = DntFile::parse(&data).unwrap();
        let names: Vec<_> = table.columns().iter().map(Column::name).collect();
        assert_eq!(names, ["id", "Name", "ame", ""]);
    }

    #[test]
    fn test_column_named_id_is_rejected() {
        let data = DntBytes::new()
            .column(b"_id", 3)
            .row(&cells(&[&1u32.to_le_bytes(), &2u32.to_le_bytes()]))
            .build();

        match DntFile::parse(&data).unwrap_err() {
            Error::DuplicateColumn {
                column,
                name,
                offset,
            } => {
                assert_eq!(column, 0);
                assert_eq!(name, "id");
                assert_eq!(offset, 10);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_names_colliding_after_drop_are_rejected() {
        let first = DntBytes::new().column(b"_Ok", 3).column(b"xA", 3).build();
        let data = DntBytes::new()
            .column(b"_Ok", 3)
            .column(b"xA", 3)
            .column(b"yA", 3)
            .row(&cells(&[
                &1u32.to_le_bytes(),
                &2u32.to_le_bytes(),
                &3u32.to_le_bytes(),
                &4u32.to_le_bytes(),
            ]))
            .build();

        match DntFile::parse(&data).unwrap_err() {
            Error::DuplicateColumn {
                column,
                name,
                offset,
            } => {
                assert_eq!(column, 2);
                assert_eq!(name, "A");
                // Third schema entry starts right after the first two.
                assert_eq!(offset, first.len());
                assert_eq!(&data[offset + 2..offset + 4], b"yA");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_first_multibyte_character_dropped_whole() {
        // "_가" then "가나" in EUC-KR
        let data = DntBytes::new()
            .column(&[b'_', 0xB0, 0xA1], 3)
            .column(&[0xB0, 0xA1, 0xB3, 0xAA], 3)
            .build();

        let table = DntFile::parse(&data).unwrap();
        assert_eq!(table.columns()[1].name(), "가");
        assert_eq!(table.columns()[2].name(), "나");
    }

    #[test]
    fn test_invalid_header() {
        let mut data = DntBytes::new().column(b"_X", 3).build();
        data[3] = 0x01;

        match DntFile::parse(&data).unwrap_err() {
            Error::InvalidHeader { actual } => assert_eq!(actual, [0, 0, 0, 1]),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_invalid_header_short_file() {
        // Header is checked before anything else, even on a 4-byte file
        assert!(matches!(
            DntFile::parse(&[0xFF, 0, 0, 0]),
            Err(Error::InvalidHeader { .. })
        ));
    }

    #[test]
    fn test_unknown_column_type() {
        for tag in [0u8, 6, 0x7F, 0xFF] {
            let data = DntBytes::new()
                .column(b"_Ok", 3)
                .column(b"_Bad", tag)
                .row(&cells(&[&1u32.to_le_bytes(), &2u32.to_le_bytes()]))
                .build();

            match DntFile::parse(&data).unwrap_err() {
                Error::UnknownColumnType {
                    column,
                    name,
                    tag: found,
                    offset,
                } => {
                    assert_eq!(column, 1);
                    assert_eq!(name, "Bad");
                    assert_eq!(found, tag);
                    assert_eq!(data[offset], tag);
                }
                other => panic!("unexpected error: {other}"),
            }
        }
    }

    #[test]
    fn test_truncated_row_fails_whole_parse() {
        let data = DntBytes::new()
            .column(b"_X", 3)
            .row(&cells(&[&1u32.to_le_bytes(), &2u32.to_le_bytes()]))
            .row(&cells(&[&3u32.to_le_bytes(), &[0x04, 0x00]]))
            .build();

        assert!(matches!(
            DntFile::parse(&data),
            Err(Error::Common(dnest_common::Error::UnexpectedEof { .. }))
        ));
    }

    #[test]
    fn test_row_count_larger_than_data() {
        let mut data = DntBytes::new()
            .column(b"_X", 3)
            .row(&cells(&[&1u32.to_le_bytes(), &2u32.to_le_bytes()]))
            .build();
        // Claim u32::MAX rows
        data[6..10].copy_from_slice(&u32::MAX.to_le_bytes());

        assert!(DntFile::parse(&data).is_err());
    }

    #[test]
    fn test_zero_columns_zero_rows() {
        let data = DntBytes::new().build();
        let table = DntFile::parse(&data).unwrap();

        assert_eq!(table.column_count(), 1);
        assert_eq!(table.row_count(), 0);
        assert!(!table.has_end_marker());
    }

    #[test]
    fn test_end_marker_is_recorded_not_required() {
        let builder = DntBytes::new()
            .column(b"_X", 3)
            .row(&cells(&[&1u32.to_le_bytes(), &2u32.to_le_bytes()]));

        let mut with_marker = builder.build();
        with_marker.extend_from_slice(END_MARKER);
        assert!(DntFile::parse(&with_marker).unwrap().has_end_marker());

        let mut with_garbage = builder.build();
        with_garbage.extend_from_slice(b"garbage");
        let table = DntFile::parse(&with_garbage).unwrap();
        assert!(!table.has_end_marker());
        assert_eq!(table.row_count(), 1);
    }

    #[test]
    fn test_parse_is_deterministic() {
        let data = DntBytes::new()
            .column(b"_Name", 1)
            .column(b"_Rate", 4)
            .row(&cells(&[&9u32.to_le_bytes(), &text("a"), &1.5f32.to_le_bytes()]))
            .build();

        assert_eq!(DntFile::parse(&data).unwrap(), DntFile::parse(&data).unwrap());
    }

    #[test]
    fn test_open_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("itemtable.dnt");
        let data = DntBytes::new()
            .column(b"_X", 3)
            .row(&cells(&[&7u32.to_le_bytes(), &42u32.to_le_bytes()]))
            .build();
        std::fs::write(&path, &data).unwrap();

        let table = DntFile::open(&path).unwrap();
        assert_eq!(table, DntFile::parse(&data).unwrap());
    }

    #[test]
    fn test_open_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.dnt");
        std::fs::write(&path, b"").unwrap();

        assert!(matches!(
            DntFile::open(&path),
            Err(Error::Common(dnest_common::Error::UnexpectedEof { .. }))
        ));
    }
}
