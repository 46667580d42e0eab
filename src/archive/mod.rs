use std::io::{Cursor, Write};

use serde_json::{Map, Value};
use thiserror::Error;
use zip::write::FileOptions;
use zip::ZipWriter;

#[derive(Error, Debug)]
pub enum ArchiveError {
    #[error("zip write failed: {0}")]
    Zip(String),
}

/// Builds a zip archive from a name→content mapping. Schema-agnostic: any
/// set of names is accepted, and non-string values are written as empty
/// files. Bundles are a handful of small text files, so the archive is
/// assembled in memory.
pub fn build_zip(files: &Map<String, Value>) -> Result<Vec<u8>, ArchiveError> {
    let mut buffer = Vec::new();
    {
        let mut zip = ZipWriter::new(Cursor::new(&mut buffer));
        let options = FileOptions::default();

        for (name, content) in files {
            let content = content.as_str().unwrap_or("");
            zip.start_file(name, options)
                .map_err(|e| ArchiveError::Zip(e.to_string()))?;
            zip.write_all(content.as_bytes())
                .map_err(|e| ArchiveError::Zip(e.to_string()))?;
        }

        zip.finish().map_err(|e| ArchiveError::Zip(e.to_string()))?;
    }
    Ok(buffer)
}
