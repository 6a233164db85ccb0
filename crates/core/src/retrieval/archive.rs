//! Container unwrapping.
//!
//! Origins serve either a ZIP container or a bare text payload; content-type
//! headers are untrustworthy, so detection goes by the fixed two-byte `PK`
//! signature. Inside a container, entries are picked by extension priority:
//! `.srt`, then the legacy frame-based `.sub`, then `.txt`.

use std::io::{Cursor, Read};

use tracing::warn;
use zip::ZipArchive;

use super::RetrievalError;

const ZIP_MAGIC: [u8; 2] = [b'P', b'K'];

/// Extension priority for picking an entry out of a container.
const EXTENSION_PRIORITY: [&str; 3] = [".srt", ".sub", ".txt"];

/// True when the payload leads with the container signature.
pub fn is_container(bytes: &[u8]) -> bool {
    bytes.len() >= ZIP_MAGIC.len() && bytes[..ZIP_MAGIC.len()] == ZIP_MAGIC
}

/// Select the subtitle payload out of a raw response body.
///
/// Non-container bodies pass through unchanged. A container is scanned
/// case-insensitively for the best entry by extension priority; a container
/// without any recognized entry is `ArtifactNotFound`. A container that
/// cannot be parsed at all (corrupt or partial) degrades to the raw bytes
/// rather than failing the request.
pub fn select_payload(bytes: &[u8]) -> Result<Vec<u8>, RetrievalError> {
    if !is_container(bytes) {
        return Ok(bytes.to_vec());
    }

    let mut archive = match ZipArchive::new(Cursor::new(bytes)) {
        Ok(archive) => archive,
        Err(e) => {
            warn!(error = %e, "Container unreadable; treating payload as plain text");
            return Ok(bytes.to_vec());
        }
    };

    let names: Vec<String> = archive.file_names().map(String::from).collect();

    for extension in EXTENSION_PRIORITY {
        let Some(name) = names
            .iter()
            .find(|name| name.to_lowercase().ends_with(extension))
        else {
            continue;
        };

        let mut entry = match archive.by_name(name) {
            Ok(entry) => entry,
            Err(e) => {
                warn!(entry = %name, error = %e, "Container entry unreadable; treating payload as plain text");
                return Ok(bytes.to_vec());
            }
        };

        let mut payload = Vec::with_capacity(entry.size() as usize);
        if let Err(e) = entry.read_to_end(&mut payload) {
            warn!(entry = %name, error = %e, "Container entry truncated; treating payload as plain text");
            return Ok(bytes.to_vec());
        }
        return Ok(payload);
    }

    Err(RetrievalError::ArtifactNotFound)
}
