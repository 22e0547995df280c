//! Text/binary classification for walked files.
//!
//! Two variants share the same name-based core: the cheap variant decides
//! from the basename and extension alone, the verified variant additionally
//! sniffs the first bytes of content before a file may be embedded verbatim.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use crate::config::ExtensionSnapshot;

const SNIFF_BUFFER_SIZE: usize = 1024;

/// Decides text vs. binary from the file name alone (cheap variant).
pub fn is_text_candidate(path: &Path, snapshot: &ExtensionSnapshot) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };

    // Dotenv files are text no matter what follows the second dot; there is
    // no extension-based rule that could catch ".env.local".
    if name == ".env" || name.starts_with(".env.") {
        return true;
    }

    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) => snapshot.allows_extension(&ext.to_lowercase()),
        None => snapshot.allows_bare_name(&name.to_lowercase()),
    }
}

/// Name check plus a content sniff over the first bytes (verified variant).
///
/// Only files passing this check may have their content embedded verbatim.
pub fn is_text_file(path: &Path, snapshot: &ExtensionSnapshot) -> bool {
    if !is_text_candidate(path, snapshot) {
        return false;
    }

    match sniff_is_text(path) {
        Ok(is_text) => is_text,
        Err(e) => {
            tracing::warn!("Failed to sniff {}: {e}; treating as binary", path.display());
            false
        }
    }
}

/// Reads up to the first 1024 bytes; any NUL byte or ill-formed UTF-8 means
/// binary. A multi-byte sequence cut off by the buffer boundary counts as
/// ill-formed.
fn sniff_is_text(path: &Path) -> io::Result<bool> {
    let mut file = File::open(path)?;
    let mut buffer = [0u8; SNIFF_BUFFER_SIZE];

    let mut filled = 0;
    while filled < buffer.len() {
        let n = file.read(&mut buffer[filled..])?;
        if n == 0 {
            break;
        }
        filled += n;
    }

    let head = &buffer[..filled];
    if head.is_empty() {
        return Ok(true);
    }
    // NUL is valid UTF-8, so this check has to come first.
    if head.contains(&0) {
        return Ok(false);
    }

    Ok(std::str::from_utf8(head).is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExtensionCatalog;
    use std::fs;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn snapshot() -> Arc<ExtensionSnapshot> {
        ExtensionCatalog::new().snapshot()
    }

    fn write_file(dir: &TempDir, name: &str, bytes: &[u8]) -> std::path::PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, bytes).unwrap();
        path
    }

    #[test]
    fn test_dotenv_variants_are_text() {
        let snap = snapshot();
        assert!(is_text_candidate(Path::new(".env"), &snap));
        assert!(is_text_candidate(Path::new(".env.local"), &snap));
        assert!(is_text_candidate(Path::new(".env.production"), &snap));
        assert!(!is_text_candidate(Path::new(".envrc-not-quite"), &snap));
    }

    #[test]
    fn test_bare_names_match_case_insensitively() {
        let snap = snapshot();
        assert!(is_text_candidate(Path::new("README"), &snap));
        assert!(is_text_candidate(Path::new("Makefile"), &snap));
        assert!(is_text_candidate(Path::new("LICENSE"), &snap));
        assert!(!is_text_candidate(Path::new("a.out"), &snap));
    }

    #[test]
    fn test_extensions_match_case_insensitively() {
        let snap = snapshot();
        assert!(is_text_candidate(Path::new("main.RS"), &snap));
        assert!(is_text_candidate(Path::new("notes.md"), &snap));
        assert!(!is_text_candidate(Path::new("photo.png"), &snap));
    }

    #[test]
    fn test_nul_byte_in_head_is_binary() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "blob.txt", b"looks like text\x00but is not");
        assert!(!is_text_file(&path, &snapshot()));
    }

    #[test]
    fn test_ill_formed_utf8_is_binary() {
        let dir = TempDir::new().unwrap();
        // 0xFF can never start a UTF-8 sequence.
        let path = write_file(&dir, "bad.txt", b"ok so far \xFF and then not");
        assert!(!is_text_file(&path, &snapshot()));
    }

    #[test]
    fn test_sequence_truncated_at_buffer_boundary_is_binary() {
        let dir = TempDir::new().unwrap();
        // 1023 ASCII bytes, then the first byte of a two-byte sequence whose
        // continuation lies beyond the sniff window.
        let mut bytes = vec![b'a'; SNIFF_BUFFER_SIZE - 1];
        bytes.push(0xC3);
        bytes.push(0xA9);
        let path = write_file(&dir, "cut.txt", &bytes);
        assert!(!is_text_file(&path, &snapshot()));
    }

    #[test]
    fn test_clean_utf8_is_text() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "ok.txt", "héllo wörld\n".as_bytes());
        assert!(is_text_file(&path, &snapshot()));
    }

    #[test]
    fn test_empty_file_is_text() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "empty.txt", b"");
        assert!(is_text_file(&path, &snapshot()));
    }

    #[test]
    fn test_missing_file_sniff_degrades_to_binary() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("vanished.txt");
        assert!(!is_text_file(&path, &snapshot()));
    }
}
