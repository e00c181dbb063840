//! Versioned on-disk format for the flat index.
//!
//! Layout (all integers little-endian):
//!
//! ```text
//! magic    [u8; 4]   "BVDB"
//! version  u16       format version, currently 1
//! metric   u8        Metric::tag()
//! dim      u32       vector dimension
//! count    u64       number of rows
//! entries  count × { id_len u16, id UTF-8 bytes, dim × f32 }
//! ```
//!
//! Rows are written and read back in row-id order, so the persisted file
//! preserves the stable row -> identifier mapping. Loading validates the
//! header and every entry; any violation surfaces as `IndexError::Corrupt`
//! rather than a silently misread index.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use crate::error::{IndexError, Result};
use crate::flat::FlatIndex;
use crate::metric::Metric;

const MAGIC: [u8; 4] = *b"BVDB";
const FORMAT_VERSION: u16 = 1;

/// Maximum identifier length accepted on load. DOIs and ISBNs are far
/// shorter; anything larger indicates a corrupt length field.
const MAX_IDENTIFIER_LEN: usize = 4096;

/// Write the index to `path`, replacing any existing file.
pub fn save(index: &FlatIndex, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let mut writer = BufWriter::new(File::create(path)?);

    let dimension = u32::try_from(index.dimension()).map_err(|_| {
        IndexError::InvalidParameter(format!("dimension {} exceeds u32", index.dimension()))
    })?;

    writer.write_all(&MAGIC)?;
    writer.write_all(&FORMAT_VERSION.to_le_bytes())?;
    writer.write_all(&[index.metric().tag()])?;
    writer.write_all(&dimension.to_le_bytes())?;
    writer.write_all(&(index.len() as u64).to_le_bytes())?;

    for (_row, identifier, vector) in index.rows() {
        let id_bytes = identifier.as_bytes();
        let id_len = u16::try_from(id_bytes.len()).map_err(|_| {
            IndexError::InvalidParameter(format!(
                "identifier too long to persist: {} bytes",
                id_bytes.len()
            ))
        })?;
        writer.write_all(&id_len.to_le_bytes())?;
        writer.write_all(id_bytes)?;
        for value in vector {
            writer.write_all(&value.to_le_bytes())?;
        }
    }

    writer.flush()?;
    tracing::debug!(
        "Saved index: {} rows, dim {}, metric {} -> {}",
        index.len(),
        index.dimension(),
        index.metric(),
        path.display()
    );
    Ok(())
}

/// Load an index from `path`, validating the header and every entry.
///
/// # Errors
/// Returns `Corrupt` if the magic, version, metric tag, dimension, or
/// entry data fail validation; `Io` on underlying read failures.
pub fn load(path: impl AsRef<Path>) -> Result<FlatIndex> {
    let path = path.as_ref();
    let mut reader = BufReader::new(File::open(path)?);

    let mut magic = [0u8; 4];
    read_exact(&mut reader, &mut magic, "magic")?;
    if magic != MAGIC {
        return Err(IndexError::Corrupt(format!(
            "bad magic {magic:?}, not a bibvdb index file"
        )));
    }

    let version = read_u16(&mut reader, "version")?;
    if version != FORMAT_VERSION {
        return Err(IndexError::Corrupt(format!(
            "unsupported format version {version} (expected {FORMAT_VERSION})"
        )));
    }

    let mut metric_tag = [0u8; 1];
    read_exact(&mut reader, &mut metric_tag, "metric")?;
    let metric = Metric::from_tag(metric_tag[0])?;

    let dimension = read_u32(&mut reader, "dimension")? as usize;
    let count = read_u64(&mut reader, "count")?;

    let mut index = FlatIndex::new(dimension, metric)
        .map_err(|_| IndexError::Corrupt("header dimension is zero".to_string()))?;

    let mut vector = vec![0.0f32; dimension];
    for row in 0..count {
        let id_len = read_u16(&mut reader, "identifier length")? as usize;
        if id_len == 0 || id_len > MAX_IDENTIFIER_LEN {
            return Err(IndexError::Corrupt(format!(
                "row {row}: identifier length {id_len} out of range"
            )));
        }
        let mut id_bytes = vec![0u8; id_len];
        read_exact(&mut reader, &mut id_bytes, "identifier")?;
        let identifier = String::from_utf8(id_bytes).map_err(|e| {
            IndexError::Corrupt(format!("row {row}: identifier is not UTF-8: {e}"))
        })?;

        let mut buf = [0u8; 4];
        for value in &mut vector {
            read_exact(&mut reader, &mut buf, "vector data")?;
            *value = f32::from_le_bytes(buf);
        }

        index.insert(&vector, identifier)?;
    }

    // Anything after the declared entries means the count field lies
    let mut trailing = [0u8; 1];
    if reader.read(&mut trailing)? != 0 {
        return Err(IndexError::Corrupt(
            "trailing data after declared entry count".to_string(),
        ));
    }

    tracing::debug!(
        "Loaded index: {} rows, dim {}, metric {} <- {}",
        index.len(),
        dimension,
        metric,
        path.display()
    );
    Ok(index)
}

fn read_exact(reader: &mut impl Read, buf: &mut [u8], what: &str) -> Result<()> {
    reader.read_exact(buf).map_err(|e| {
        if e.kind() == std::io::ErrorKind::UnexpectedEof {
            IndexError::Corrupt(format!("truncated file while reading {what}"))
        } else {
            IndexError::Io(e)
        }
    })
}

fn read_u16(reader: &mut impl Read, what: &str) -> Result<u16> {
    let mut buf = [0u8; 2];
    read_exact(reader, &mut buf, what)?;
    Ok(u16::from_le_bytes(buf))
}

fn read_u32(reader: &mut impl Read, what: &str) -> Result<u32> {
    let mut buf = [0u8; 4];
    read_exact(reader, &mut buf, what)?;
    Ok(u32::from_le_bytes(buf))
}

fn read_u64(reader: &mut impl Read, what: &str) -> Result<u64> {
    let mut buf = [0u8; 8];
    read_exact(reader, &mut buf, what)?;
    Ok(u64::from_le_bytes(buf))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample_index() -> FlatIndex {
        let mut index = FlatIndex::new(3, Metric::Cosine).unwrap();
        index.insert(&[1.0, 0.0, 0.0], "10.1/a").unwrap();
        index.insert(&[0.0, 1.0, 0.0], "978-0-306-40615-7").unwrap();
        index
    }

    #[test]
    fn test_save_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("index.bvdb");

        let index = sample_index();
        save(&index, &path).unwrap();

        let loaded = load(&path).unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded.dimension(), 3);
        assert_eq!(loaded.metric(), Metric::Cosine);
        assert_eq!(loaded.identifier(0), Some("10.1/a"));
        assert_eq!(loaded.identifier(1), Some("978-0-306-40615-7"));
        assert_eq!(loaded.vector(1), Some(&[0.0f32, 1.0, 0.0][..]));
    }

    #[test]
    fn test_empty_index_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("empty.bvdb");

        let index = FlatIndex::new(8, Metric::L2).unwrap();
        save(&index, &path).unwrap();

        let loaded = load(&path).unwrap();
        assert!(loaded.is_empty());
        assert_eq!(loaded.dimension(), 8);
        assert_eq!(loaded.metric(), Metric::L2);
    }

    #[test]
    fn test_bad_magic_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("garbage.bvdb");
        std::fs::write(&path, b"NOPE, not an index").unwrap();

        let err = load(&path).unwrap_err();
        assert!(matches!(err, IndexError::Corrupt(msg) if msg.contains("magic")));
    }

    #[test]
    fn test_truncated_file_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("index.bvdb");
        save(&sample_index(), &path).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        std::fs::write(&path, &bytes[..bytes.len() - 5]).unwrap();

        let err = load(&path).unwrap_err();
        assert!(matches!(err, IndexError::Corrupt(msg) if msg.contains("truncated")));
    }

    #[test]
    fn test_trailing_data_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("index.bvdb");
        save(&sample_index(), &path).unwrap();

        let mut bytes = std::fs::read(&path).unwrap();
        bytes.push(0xFF);
        std::fs::write(&path, &bytes).unwrap();

        let err = load(&path).unwrap_err();
        assert!(matches!(err, IndexError::Corrupt(msg) if msg.contains("trailing")));
    }

    #[test]
    fn test_unsupported_version_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("index.bvdb");
        save(&sample_index(), &path).unwrap();

        let mut bytes = std::fs::read(&path).unwrap();
        bytes[4] = 0xFE; // version low byte
        std::fs::write(&path, &bytes).unwrap();

        let err = load(&path).unwrap_err();
        assert!(matches!(err, IndexError::Corrupt(msg) if msg.contains("version")));
    }
}
