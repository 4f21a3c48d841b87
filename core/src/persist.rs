use crate::ModPack;
use anyhow::{Context, Result};
use std::fs::{self, create_dir_all, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

/// Location of the persisted dataset file.
#[derive(Debug, Clone)]
pub struct DatasetPath {
    pub path: PathBuf,
}

impl DatasetPath {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self { path: path.as_ref().to_path_buf() }
    }
    pub fn exists(&self) -> bool { self.path.is_file() }
    fn staging(&self) -> PathBuf {
        let mut name = self.path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

/// Write the dataset as pretty-printed JSON. The file is replaced in one rename,
/// so readers never observe a half-written dataset.
pub fn save_dataset(paths: &DatasetPath, packs: &[ModPack]) -> Result<()> {
    if let Some(dir) = paths.path.parent().filter(|d| !d.as_os_str().is_empty()) {
        create_dir_all(dir)?;
    }
    let json = serde_json::to_string_pretty(packs)?;
    let staging = paths.staging();
    {
        let mut f = File::create(&staging)
            .with_context(|| format!("creating {}", staging.display()))?;
        f.write_all(json.as_bytes())?;
        f.sync_all()?;
    }
    fs::rename(&staging, &paths.path)
        .with_context(|| format!("replacing {}", paths.path.display()))?;
    tracing::debug!(path = %paths.path.display(), records = packs.len(), "dataset saved");
    Ok(())
}

pub fn load_dataset(paths: &DatasetPath) -> Result<Vec<ModPack>> {
    let mut f = File::open(&paths.path)
        .with_context(|| format!("opening {}", paths.path.display()))?;
    let mut buf = String::new();
    f.read_to_string(&mut buf)?;
    let packs: Vec<ModPack> = serde_json::from_str(&buf)
        .with_context(|| format!("decoding {}", paths.path.display()))?;
    Ok(packs)
}
