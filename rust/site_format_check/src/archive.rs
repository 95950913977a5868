use std::io::{Cursor, Read};
use std::path::Path;
use zip::read::read_zipfile_from_stream;
use zip::result::ZipResult;
use zip::ZipArchive;

pub const INDEX_MEMBER: &str = "index.html";
pub const STYLE_MEMBERS: [&str; 2] = ["style.css", "css/style.css"];

pub const ISSUE_OPEN_FAILED: &str = "Could not open zip file (corrupted or invalid).";
pub const ISSUE_NO_INDEX: &str = "No index.html found at zip root.";
pub const ISSUE_INDEX_UNREADABLE: &str = "Could not read index.html from the zip archive.";
pub const ISSUE_NO_STYLESHEET: &str =
    "No style.css found. Expected style.css at root or css/style.css.";

/// What the archive pass found: the decoded `index.html` (if any) and the
/// archive-level issues, in detection order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArchiveInspection {
    pub document: Option<String>,
    pub issues: Vec<String>,
    pub members: Vec<String>,
}

impl ArchiveInspection {
    fn unopenable() -> Self {
        Self {
            document: None,
            issues: vec![ISSUE_OPEN_FAILED.to_string()],
            members: Vec::new(),
        }
    }
}

/// Inspect the archive at `path`. Never fails: a missing or unreadable file
/// becomes a single issue.
pub fn inspect_archive(path: &Path) -> ArchiveInspection {
    match std::fs::read(path) {
        Ok(bytes) => inspect_archive_bytes(&bytes),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "could not read archive");
            ArchiveInspection::unopenable()
        }
    }
}

pub fn inspect_archive_bytes(bytes: &[u8]) -> ArchiveInspection {
    let mut archive = match ZipArchive::new(Cursor::new(bytes)) {
        Ok(a) => a,
        Err(e) => {
            tracing::warn!(error = %e, "could not open archive");
            return ArchiveInspection::unopenable();
        }
    };

    let members = match list_entries(bytes) {
        Ok(names) => names,
        Err(e) => {
            // Streaming walk can't cross data descriptors; the indexed listing
            // collapses entries sharing a path but is always available.
            tracing::debug!(error = %e, "falling back to indexed member listing");
            archive.file_names().map(str::to_string).collect()
        }
    };
    tracing::debug!(members = members.len(), "archive opened");

    let mut issues = Vec::new();
    for name in &members {
        if name.to_lowercase().ends_with(".zip") {
            issues.push(format!("Nested zip found: {name}"));
        }
    }

    // Exact membership: no normalisation, no case folding.
    let has = |wanted: &str| members.iter().any(|m| m == wanted);

    let mut document = None;
    if !has(INDEX_MEMBER) {
        issues.push(ISSUE_NO_INDEX.to_string());
    } else {
        match read_member(&mut archive, INDEX_MEMBER) {
            Ok(raw) => document = Some(String::from_utf8_lossy(&raw).into_owned()),
            Err(e) => {
                tracing::debug!(error = %e, "index.html listed but unreadable");
                issues.push(ISSUE_INDEX_UNREADABLE.to_string());
            }
        }
    }

    if !STYLE_MEMBERS.iter().any(|s| has(s)) {
        issues.push(ISSUE_NO_STYLESHEET.to_string());
    }

    ArchiveInspection {
        document,
        issues,
        members,
    }
}

/// Every entry name in local-header order, duplicates included.
fn list_entries(bytes: &[u8]) -> ZipResult<Vec<String>> {
    let mut reader = Cursor::new(bytes);
    let mut names = Vec::new();
    while let Some(mut file) = read_zipfile_from_stream(&mut reader)? {
        names.push(file.name().to_string());
        std::io::copy(&mut file, &mut std::io::sink())?;
    }
    Ok(names)
}

fn read_member<R: Read + std::io::Seek>(
    archive: &mut ZipArchive<R>,
    name: &str,
) -> std::io::Result<Vec<u8>> {
    let mut file = archive.by_name(name)?;
    let mut out = Vec::new();
    file.read_to_end(&mut out)?;
    Ok(out)
}

#[cfg(test)]
pub(crate) mod test_zip {
    use std::io::{Cursor, Write};
    use zip::write::SimpleFileOptions;
    use zip::{CompressionMethod, ZipWriter};

    /// Build an in-memory archive with stored (uncompressed) members.
    pub fn build(members: &[(&str, &[u8])]) -> Vec<u8> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let opt = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
        for (name, data) in members {
            zip.start_file(*name, opt).unwrap();
            zip.write_all(data).unwrap();
        }
        zip.finish().unwrap().into_inner()
    }
}
