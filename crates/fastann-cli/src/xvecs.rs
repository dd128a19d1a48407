//! Reader and writer for the `.fvecs` / `.ivecs` vector file formats.
//!
//! Each record is a little-endian `i32` dimension followed by that many
//! little-endian 4-byte values (`f32` for fvecs, `i32` for ivecs). All
//! records of a file share one dimension. Record ids are ordinals.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;
use thiserror::Error;

/// Buffer size for file IO.
const IO_BUFFER_SIZE: usize = 128 * 1024;

/// Errors raised while reading or writing xvecs files.
#[derive(Error, Debug)]
pub enum XvecsError {
    /// Underlying IO failure.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A record header holds a non-positive dimension.
    #[error("record {record}: invalid dimension {dimension}")]
    InvalidDimension { record: usize, dimension: i64 },

    /// A record's dimension differs from the first record's.
    #[error("record {record}: dimension {actual} differs from {expected}")]
    MixedDimensions {
        record: usize,
        expected: usize,
        actual: usize,
    },

    /// The file ends inside a record.
    #[error("record {record}: truncated")]
    Truncated { record: usize },
}

/// A 4-byte little-endian element of an xvecs record.
pub trait Element: Copy {
    /// Decodes one element.
    fn decode(bytes: [u8; 4]) -> Self;
    /// Encodes one element.
    fn encode(self) -> [u8; 4];
}

impl Element for f32 {
    fn decode(bytes: [u8; 4]) -> Self {
        Self::from_le_bytes(bytes)
    }

    fn encode(self) -> [u8; 4] {
        self.to_le_bytes()
    }
}

impl Element for i32 {
    fn decode(bytes: [u8; 4]) -> Self {
        Self::from_le_bytes(bytes)
    }

    fn encode(self) -> [u8; 4] {
        self.to_le_bytes()
    }
}

/// Rows of a vector file; every row has `dimension` elements.
#[derive(Debug, Clone, PartialEq)]
pub struct VecFile<T> {
    /// Shared row length, 0 for an empty file.
    pub dimension: usize,
    /// Rows in file order.
    pub rows: Vec<Vec<T>>,
}

impl<T> VecFile<T> {
    /// Number of records.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if the file holds no record.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Reads an `.fvecs` file.
pub fn read_fvecs(path: &Path) -> Result<VecFile<f32>, XvecsError> {
    let file = File::open(path)?;
    read_vecs(BufReader::with_capacity(IO_BUFFER_SIZE, file))
}

/// Reads an `.ivecs` file.
pub fn read_ivecs(path: &Path) -> Result<VecFile<i32>, XvecsError> {
    let file = File::open(path)?;
    read_vecs(BufReader::with_capacity(IO_BUFFER_SIZE, file))
}

/// Writes rows as an `.ivecs` file, replacing any existing file.
pub fn write_ivecs(path: &Path, rows: &[Vec<i32>]) -> Result<(), XvecsError> {
    let file = File::create(path)?;
    let mut writer = BufWriter::with_capacity(IO_BUFFER_SIZE, file);
    write_vecs(&mut writer, rows)?;
    writer.flush()?;
    Ok(())
}

/// Decodes records from `reader` until a clean end of input.
pub fn read_vecs<T: Element, R: Read>(mut reader: R) -> Result<VecFile<T>, XvecsError> {
    let mut rows = Vec::new();
    let mut dimension = None;
    let mut buf = Vec::new();

    while let Some(header) = read_header(&mut reader, rows.len())? {
        let record = rows.len();
        let raw = i32::from_le_bytes(header);
        let dim = usize::try_from(raw)
            .ok()
            .filter(|&d| d > 0)
            .ok_or(XvecsError::InvalidDimension {
                record,
                dimension: i64::from(raw),
            })?;

        match dimension {
            None => dimension = Some(dim),
            Some(expected) if expected != dim => {
                return Err(XvecsError::MixedDimensions {
                    record,
                    expected,
                    actual: dim,
                });
            }
            Some(_) => {}
        }

        // Buffer grows with the bytes read, not with the header value
        let wanted = dim * 4;
        buf.clear();
        reader.by_ref().take(wanted as u64).read_to_end(&mut buf)?;
        if buf.len() != wanted {
            return Err(XvecsError::Truncated { record });
        }

        rows.push(
            buf.chunks_exact(4)
                .map(|c| T::decode([c[0], c[1], c[2], c[3]]))
                .collect(),
        );
    }

    Ok(VecFile {
        dimension: dimension.unwrap_or(0),
        rows,
    })
}

/// Reads a 4-byte header; `None` on end of input before its first byte.
fn read_header<R: Read>(reader: &mut R, record: usize) -> Result<Option<[u8; 4]>, XvecsError> {
    let mut header = [0u8; 4];
    let mut filled = 0;
    while filled < header.len() {
        match reader.read(&mut header[filled..]) {
            Ok(0) if filled == 0 => return Ok(None),
            Ok(0) => return Err(XvecsError::Truncated { record }),
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e.into()),
        }
    }
    Ok(Some(header))
}

/// Encodes `rows` to `writer`. All rows must share a non-zero length.
pub fn write_vecs<T: Element, W: Write>(writer: &mut W, rows: &[Vec<T>]) -> Result<(), XvecsError> {
    let Some(first) = rows.first() else {
        return Ok(());
    };
    let expected = first.len();

    for (record, row) in rows.iter().enumerate() {
        if row.len() != expected {
            return Err(XvecsError::MixedDimensions {
                record,
                expected,
                actual: row.len(),
            });
        }
        let header = i32::try_from(row.len())
            .ok()
            .filter(|&d| d > 0)
            .ok_or(XvecsError::InvalidDimension {
                record,
                dimension: row.len() as i64,
            })?;

        writer.write_all(&header.to_le_bytes())?;
        for &value in row {
            writer.write_all(&value.encode())?;
        }
    }
    Ok(())
}
