//! Seekable reader for stored ZIP entries
//!
//! Implements parquet's [`ChunkReader`] over a Stored entry of a `.capmat`
//! container, so matrix row groups can be read in bounded chunks straight
//! out of the ZIP without extracting the entry or loading it into memory.
//!
//! # Requirements
//!
//! The entry MUST be written with the `Stored` (no compression) method;
//! the container format requires this for the matrix table precisely so
//! that random access stays possible.

use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::Path;

use bytes::Bytes;
use parquet::file::reader::{ChunkReader, Length};
use zip::ZipArchive;

use super::ViewError;

/// Zero-copy reader for a stored ZIP entry
///
/// Holds only the entry's byte offset and size; every read opens a fresh
/// file handle, so clones are cheap and there is no shared mutable state.
#[derive(Clone)]
pub struct ZipEntryChunkReader {
    /// Path to the ZIP file (reopened per read)
    zip_path: std::path::PathBuf,
    /// Byte offset of entry data within the ZIP
    entry_offset: u64,
    /// Size of the uncompressed entry
    entry_size: u64,
}

impl ZipEntryChunkReader {
    /// Create a chunk reader for a stored ZIP entry.
    ///
    /// # Errors
    /// Returns an error if the entry is missing, compressed (must be
    /// Stored), or the archive cannot be read.
    pub fn new<P: AsRef<Path>>(zip_path: P, entry_name: &str) -> Result<Self, ViewError> {
        let zip_path = zip_path.as_ref();
        let file = File::open(zip_path)?;
        let mut archive = ZipArchive::new(BufReader::new(file))?;

        let entry = archive.by_name(entry_name).map_err(|_| {
            ViewError::InvalidFormat(format!("container missing {}", entry_name))
        })?;

        // Stored entries can be addressed by absolute offset; anything else
        // would force full decompression and break the memory bound.
        if entry.compression() != zip::CompressionMethod::Stored {
            return Err(ViewError::InvalidFormat(format!(
                "container entry '{}' must be Stored (uncompressed) for streaming access, found {:?}",
                entry_name,
                entry.compression()
            )));
        }

        let entry_offset = entry.data_start();
        let entry_size = entry.size();

        Ok(Self {
            zip_path: zip_path.to_path_buf(),
            entry_offset,
            entry_size,
        })
    }

    /// Size of the entry in bytes.
    pub fn entry_size(&self) -> u64 {
        self.entry_size
    }

    /// Byte offset of the entry within the ZIP file.
    pub fn entry_offset(&self) -> u64 {
        self.entry_offset
    }
}

impl std::fmt::Debug for ZipEntryChunkReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ZipEntryChunkReader")
            .field("zip_path", &self.zip_path)
            .field("entry_offset", &self.entry_offset)
            .field("entry_size", &self.entry_size)
            .finish()
    }
}

impl Length for ZipEntryChunkReader {
    fn len(&self) -> u64 {
        self.entry_size
    }
}

/// A reader for a slice of a ZIP entry
///
/// Wraps a file handle positioned inside the entry and refuses to read
/// past the entry boundary.
pub struct ZipEntrySliceReader {
    file: File,
    position: u64,
    max_len: u64,
}

impl Read for ZipEntrySliceReader {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let remaining = self.max_len.saturating_sub(self.position);
        if remaining == 0 {
            return Ok(0);
        }

        let to_read = std::cmp::min(buf.len() as u64, remaining) as usize;
        let n = self.file.read(&mut buf[..to_read])?;
        self.position += n as u64;
        Ok(n)
    }
}

impl ChunkReader for ZipEntryChunkReader {
    type T = ZipEntrySliceReader;

    fn get_read(&self, start: u64) -> parquet::errors::Result<Self::T> {
        let mut file = File::open(&self.zip_path).map_err(|e| {
            parquet::errors::ParquetError::General(format!("Failed to open container: {}", e))
        })?;

        file.seek(SeekFrom::Start(self.entry_offset + start))
            .map_err(|e| {
                parquet::errors::ParquetError::General(format!("Failed to seek in container: {}", e))
            })?;

        Ok(ZipEntrySliceReader {
            file,
            position: 0,
            max_len: self.entry_size.saturating_sub(start),
        })
    }

    fn get_bytes(&self, start: u64, length: usize) -> parquet::errors::Result<Bytes> {
        let mut file = File::open(&self.zip_path).map_err(|e| {
            parquet::errors::ParquetError::General(format!("Failed to open container: {}", e))
        })?;

        file.seek(SeekFrom::Start(self.entry_offset + start))
            .map_err(|e| {
                parquet::errors::ParquetError::General(format!("Failed to seek in container: {}", e))
            })?;

        // Clamp to the entry boundary.
        let remaining = self.entry_size.saturating_sub(start) as usize;
        let actual_length = std::cmp::min(length, remaining);

        let mut buf = vec![0u8; actual_length];
        file.read_exact(&mut buf).map_err(|e| {
            parquet::errors::ParquetError::General(format!("Failed to read from container: {}", e))
        })?;

        Ok(Bytes::from(buf))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    fn create_test_zip(compression: zip::CompressionMethod) -> NamedTempFile {
        let temp_file = NamedTempFile::new().expect("Failed to create temp file");
        let file = File::create(temp_file.path()).expect("Failed to create file");
        let mut zip = ZipWriter::new(file);

        let options = SimpleFileOptions::default().compression_method(compression);
        zip.start_file("matrix/matrix.parquet", options)
            .expect("Failed to start file");
        zip.write_all(b"PAR1test_data_here_12345PAR1")
            .expect("Failed to write");
        zip.finish().expect("Failed to finish");

        temp_file
    }

    #[test]
    fn test_stored_entry_opens_successfully() {
        let temp = create_test_zip(zip::CompressionMethod::Stored);
        let reader = ZipEntryChunkReader::new(temp.path(), "matrix/matrix.parquet");
        assert!(reader.is_ok());

        let reader = reader.expect("should open");
        assert_eq!(reader.entry_size(), 28);
    }

    #[test]
    fn test_compressed_entry_fails() {
        let temp = create_test_zip(zip::CompressionMethod::Deflated);
        let result = ZipEntryChunkReader::new(temp.path(), "matrix/matrix.parquet");
        assert!(result.is_err());

        let err = result.expect_err("should fail on compressed");
        assert!(
            format!("{}", err).contains("Stored"),
            "Error should mention Stored requirement"
        );
    }

    #[test]
    fn test_missing_entry_fails() {
        let temp = create_test_zip(zip::CompressionMethod::Stored);
        let result = ZipEntryChunkReader::new(temp.path(), "nonexistent/table.parquet");
        assert!(result.is_err());
    }

    #[test]
    fn test_get_bytes_reads_correctly() {
        let temp = create_test_zip(zip::CompressionMethod::Stored);
        let reader =
            ZipEntryChunkReader::new(temp.path(), "matrix/matrix.parquet").expect("should open");

        let bytes = reader.get_bytes(0, 4).expect("should read");
        assert_eq!(&bytes[..], b"PAR1");

        let bytes = reader.get_bytes(4, 10).expect("should read");
        assert_eq!(&bytes[..], b"test_data_");

        let bytes = reader.get_bytes(24, 4).expect("should read");
        assert_eq!(&bytes[..], b"PAR1");
    }

    #[test]
    fn test_get_read_reads_correctly() {
        let temp = create_test_zip(zip::CompressionMethod::Stored);
        let reader =
            ZipEntryChunkReader::new(temp.path(), "matrix/matrix.parquet").expect("should open");

        let mut slice_reader = reader.get_read(0).expect("should get reader");
        let mut buf = [0u8; 28];
        slice_reader.read_exact(&mut buf).expect("should read");
        assert_eq!(&buf[..], b"PAR1test_data_here_12345PAR1");
    }

    #[test]
    fn test_length_trait() {
        let temp = create_test_zip(zip::CompressionMethod::Stored);
        let reader =
            ZipEntryChunkReader::new(temp.path(), "matrix/matrix.parquet").expect("should open");

        assert_eq!(Length::len(&reader), 28);
    }
}
