use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use bytes::Bytes;
use log::debug;
use zip::ZipArchive;

use crate::metadata::DatasetMetadata;
use crate::schema::{CAPMAT_MIMETYPE, ENTRY_MATRIX, ENTRY_METADATA, ENTRY_MIMETYPE};

use super::chunks::MatrixSection;
use super::source::ParquetSource;
use super::tables::{AnnotationTable, Axis};
use super::zip_chunk_reader::ZipEntryChunkReader;
use super::{ContainerKind, DatasetView, MimetypeStatus, ViewError};

type Archive = ZipArchive<BufReader<File>>;

impl DatasetView {
    /// Open a dataset bundle for one validation run.
    ///
    /// Detects the format automatically: directories are bundles, files are
    /// `.capmat` ZIP containers. Fails with [`ViewError`] when the bundle
    /// cannot be read at all; missing sections are not errors here; they
    /// surface later as schema violations.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, ViewError> {
        let path = path.as_ref();
        if path.is_dir() {
            Self::open_directory(path)
        } else if path.is_file() {
            Self::open_container(path)
        } else {
            Err(ViewError::InvalidFormat(format!(
                "path does not exist: {}",
                path.display()
            )))
        }
    }

    fn open_directory(path: &Path) -> Result<Self, ViewError> {
        debug!("opening directory bundle {}", path.display());

        let metadata = match std::fs::read_to_string(path.join(ENTRY_METADATA)) {
            Ok(content) => Some(parse_metadata(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => return Err(ViewError::IoError(e)),
        };

        let table = |axis: Axis| -> Result<Option<AnnotationTable>, ViewError> {
            let file = path.join(axis.entry());
            if file.is_file() {
                let source = ParquetSource::FilePath(file);
                Ok(Some(AnnotationTable::load(axis, &source)?))
            } else {
                Ok(None)
            }
        };

        let matrix_path = path.join(ENTRY_MATRIX);
        let matrix = if matrix_path.is_file() {
            Some(MatrixSection::open(ParquetSource::FilePath(matrix_path))?)
        } else {
            None
        };

        Ok(Self {
            source: path.display().to_string(),
            kind: ContainerKind::Directory,
            mimetype: MimetypeStatus::NotApplicable,
            metadata,
            obs: table(Axis::Obs)?,
            var: table(Axis::Var)?,
            matrix,
        })
    }

    fn open_container(path: &Path) -> Result<Self, ViewError> {
        debug!("opening container {}", path.display());

        let file = File::open(path)?;
        let mut archive = ZipArchive::new(BufReader::new(file))?;

        let mimetype = mimetype_status(&mut archive)?;

        let metadata = match read_entry_bytes(&mut archive, ENTRY_METADATA)? {
            Some(bytes) => Some(parse_metadata(&String::from_utf8_lossy(&bytes))?),
            None => None,
        };

        let mut table = |axis: Axis| -> Result<Option<AnnotationTable>, ViewError> {
            match read_entry_bytes(&mut archive, axis.entry())? {
                Some(bytes) => {
                    let source = ParquetSource::InMemory(bytes);
                    Ok(Some(AnnotationTable::load(axis, &source)?))
                }
                None => Ok(None),
            }
        };
        let obs = table(Axis::Obs)?;
        let var = table(Axis::Var)?;

        // The matrix is never pulled into memory: a compressed entry cannot
        // honor the chunked-read contract and is rejected as unreadable.
        let matrix = if archive.by_name(ENTRY_MATRIX).is_ok() {
            let chunk_reader = ZipEntryChunkReader::new(path, ENTRY_MATRIX)?;
            Some(MatrixSection::open(ParquetSource::ZipEntry(chunk_reader))?)
        } else {
            None
        };

        Ok(Self {
            source: path.display().to_string(),
            kind: ContainerKind::Container,
            mimetype,
            metadata,
            obs,
            var,
            matrix,
        })
    }
}

fn parse_metadata(content: &str) -> Result<DatasetMetadata, ViewError> {
    DatasetMetadata::from_json(content).map_err(|e| {
        ViewError::MetadataError(format!("failed to parse {}: {}", ENTRY_METADATA, e))
    })
}

fn read_entry_bytes(archive: &mut Archive, name: &str) -> Result<Option<Bytes>, ViewError> {
    match archive.by_name(name) {
        Ok(mut entry) => {
            let mut buf = Vec::with_capacity(entry.size() as usize);
            entry.read_to_end(&mut buf)?;
            Ok(Some(Bytes::from(buf)))
        }
        Err(_) => Ok(None),
    }
}

fn mimetype_status(archive: &mut Archive) -> Result<MimetypeStatus, ViewError> {
    if archive.len() == 0 {
        return Ok(MimetypeStatus::Missing);
    }

    let is_first = {
        let first = archive.by_index(0)?;
        first.name() == ENTRY_MIMETYPE
    };

    let (content, stored) = match archive.by_name(ENTRY_MIMETYPE) {
        Ok(mut entry) => {
            let stored = entry.compression() == zip::CompressionMethod::Stored;
            let mut buf = Vec::new();
            entry.read_to_end(&mut buf)?;
            (String::from_utf8_lossy(&buf).into_owned(), stored)
        }
        Err(_) => return Ok(MimetypeStatus::Missing),
    };

    if content != CAPMAT_MIMETYPE {
        Ok(MimetypeStatus::Mismatch(content))
    } else if !is_first {
        Ok(MimetypeStatus::NotFirst)
    } else if !stored {
        Ok(MimetypeStatus::NotStored)
    } else {
        Ok(MimetypeStatus::Valid)
    }
}
