use std::io;
use std::path::PathBuf;

/// The only two store operations the core needs: list identifiers
/// under a prefix, and hand back raw bytes for one identifier.
pub trait ArtifactStore: Send + Sync {
    fn list(&self, prefix: &str) -> io::Result<Vec<String>>;
    fn read(&self, id: &str) -> io::Result<Vec<u8>>;
}

/// Directory-backed store: identifiers are file names under `root`.
pub struct FsArtifactStore {
    root: PathBuf,
}

impl FsArtifactStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl ArtifactStore for FsArtifactStore {
    fn list(&self, prefix: &str) -> io::Result<Vec<String>> {
        let mut ids = Vec::new();
        for entry in std::fs::read_dir(&self.root)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            if name.starts_with(prefix) {
                ids.push(name.to_string());
            }
        }
        Ok(ids)
    }

    fn read(&self, id: &str) -> io::Result<Vec<u8>> {
        std::fs::read(self.root.join(id))
    }
}
