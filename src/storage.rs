use crate::model::Dataset;
use anyhow::Context;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

pub trait Storage {
    /// Charge le jeu de données depuis un support.
    fn load(&self) -> anyhow::Result<Dataset>;
    /// Sauvegarde de manière atomique.
    fn save(&self, dataset: &Dataset) -> anyhow::Result<()>;
}

/// Jeu de données dans un unique fichier JSON.
pub struct JsonStorage {
    path: PathBuf,
}

impl JsonStorage {
    pub fn open<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        Ok(Self {
            path: path.as_ref().to_path_buf(),
        })
    }

    fn dir(&self) -> &Path {
        self.path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."))
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Jeu vide si le fichier n'existe pas encore.
    pub fn load_or_default(&self) -> anyhow::Result<Dataset> {
        if self.exists() {
            self.load()
        } else {
            Ok(Dataset::default())
        }
    }
}

impl Storage for JsonStorage {
    fn load(&self) -> anyhow::Result<Dataset> {
        let data =
            fs::read(&self.path).with_context(|| format!("reading {}", self.path.display()))?;
        serde_json::from_slice(&data).with_context(|| format!("parsing {}", self.path.display()))
    }

    fn save(&self, dataset: &Dataset) -> anyhow::Result<()> {
        // fichier temporaire voisin puis renommage : jamais de JSON tronqué
        let tmp = tempfile::Builder::new()
            .prefix(".roulement-")
            .suffix(".json.tmp")
            .tempfile_in(self.dir())
            .with_context(|| format!("creating temp file next to {}", self.path.display()))?;

        let mut out = BufWriter::new(tmp);
        serde_json::to_writer_pretty(&mut out, dataset)?;
        out.write_all(b"\n")?;
        let tmp = out.into_inner().map_err(|e| e.into_error())?;
        tmp.as_file().sync_all()?;

        tmp.persist(&self.path)
            .map_err(|e| e.error)
            .with_context(|| format!("replacing {}", self.path.display()))?;
        tracing::debug!(
            path = %self.path.display(),
            records = dataset.history.len(),
            "dataset saved"
        );
        Ok(())
    }
}
