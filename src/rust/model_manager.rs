use std::path::{Path, PathBuf};
use std::fs;
use std::io;
use std::sync::Arc;
use std::env;
use tokio::sync::Mutex;
use sha2::{Sha256, Digest};

use crate::models::{BuiltinModel, ModelInfo};

/// Environment variable overriding the model cache root
pub const CACHE_ENV_VAR: &str = "BINWISE_CACHE";

#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("Download error: {0}")]
    DownloadError(#[from] reqwest::Error),
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
    #[error("Model verification failed")]
    VerificationFailed,
    #[error("Hash mismatch: expected {expected}, got {actual} for {file_type} file")]
    HashMismatch {
        file_type: String,
        expected: String,
        actual: String,
    },
}

/// Which of the two files that make up a model
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ModelFile {
    Model,
    Labels,
}

impl ModelFile {
    fn kind(&self) -> &'static str {
        match self {
            Self::Model => "model",
            Self::Labels => "labels",
        }
    }

    fn url<'a>(&self, info: &'a ModelInfo) -> &'a str {
        match self {
            Self::Model => &info.model_url,
            Self::Labels => &info.labels_url,
        }
    }

    fn hash<'a>(&self, info: &'a ModelInfo) -> Option<&'a str> {
        match self {
            Self::Model => info.model_hash.as_deref(),
            Self::Labels => info.labels_hash.as_deref(),
        }
    }
}

/// Downloads and caches classifier models and their labels files
#[derive(Clone)]
pub struct ModelManager {
    models_dir: PathBuf,
    download_lock: Arc<Mutex<()>>,
}

impl ModelManager {
    /// Creates a new ModelManager with the default models directory
    pub fn new_default() -> io::Result<Self> {
        Self::new(Self::get_default_models_dir())
    }

    /// Returns the default models directory path
    pub fn get_default_models_dir() -> PathBuf {
        if let Ok(path) = env::var(CACHE_ENV_VAR) {
            return PathBuf::from(path).join("models");
        }
        if let Some(cache_dir) = dirs::cache_dir() {
            return cache_dir.join("binwise").join("models");
        }
        if let Some(home_dir) = dirs::home_dir() {
            return home_dir.join(".cache").join("binwise").join("models");
        }
        env::temp_dir().join("binwise").join("models")
    }

    pub fn new<P: AsRef<Path>>(models_dir: P) -> io::Result<Self> {
        let models_dir = models_dir.as_ref().to_path_buf();
        fs::create_dir_all(&models_dir)?;
        Ok(Self {
            models_dir,
            download_lock: Arc::new(Mutex::new(())),
        })
    }

    pub fn models_dir(&self) -> &Path {
        &self.models_dir
    }

    pub fn get_model_path(&self, model: BuiltinModel) -> PathBuf {
        self.file_path(&model.get_model_info(), ModelFile::Model)
    }

    pub fn get_labels_path(&self, model: BuiltinModel) -> PathBuf {
        self.file_path(&model.get_model_info(), ModelFile::Labels)
    }

    fn file_path(&self, info: &ModelInfo, file: ModelFile) -> PathBuf {
        let name = match file {
            ModelFile::Model => "model.onnx",
            ModelFile::Labels => "labels.txt",
        };
        self.models_dir.join(&info.name).join(name)
    }

    pub fn is_model_downloaded(&self, model: BuiltinModel) -> bool {
        let model_path = self.get_model_path(model);
        let labels_path = self.get_labels_path(model);
        log::debug!("Model path: {:?} (exists: {})", model_path, model_path.exists());
        log::debug!("Labels path: {:?} (exists: {})", labels_path, labels_path.exists());
        model_path.exists() && labels_path.exists()
    }

    /// Downloads both files of a model, keeping existing copies that still verify
    pub async fn download_model(&self, model: BuiltinModel) -> Result<(), ModelError> {
        let info = model.get_model_info();
        let _lock = self.download_lock.lock().await;

        let model_dir = self.models_dir.join(&info.name);
        log::info!("Preparing model directory at {:?}", model_dir);
        fs::create_dir_all(&model_dir)?;

        let result = match self.ensure_file(&info, ModelFile::Model).await {
            Ok(()) => self.ensure_file(&info, ModelFile::Labels).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(()) => {
                log::info!("Model '{}' ready to use", info.name);
                Ok(())
            }
            Err(e) => {
                log::error!("Failed to set up model '{}': {}", info.name, e);
                let _ = self.remove_download(model);
                Err(e)
            }
        }
    }

    async fn ensure_file(&self, info: &ModelInfo, file: ModelFile) -> Result<(), ModelError> {
        let path = self.file_path(info, file);
        if path.exists() {
            if self.verify_file(&path, file.hash(info))? {
                log::info!("Existing {} file verified", file.kind());
                return Ok(());
            }
            log::warn!("{} file failed verification, downloading again", file.kind());
        }
        self.download_and_verify_file(file.url(info), &path, file.hash(info), file.kind()).await
    }

    /// Compares a file against the pinned hash, or against the digest recorded
    /// when it was downloaded. A file with neither does not verify.
    fn verify_file(&self, path: &Path, pinned_hash: Option<&str>) -> Result<bool, ModelError> {
        if !path.exists() {
            return Ok(false);
        }
        let expected = match pinned_hash {
            Some(hash) => hash.to_string(),
            None => match read_recorded_digest(path)? {
                Some(hash) => hash,
                None => {
                    log::warn!("No known hash for {:?}, treating it as unverified", path);
                    return Ok(false);
                }
            },
        };
        let bytes = fs::read(path)?;
        let actual = sha256_hex(&bytes);
        log::debug!("Verifying {:?}: expected {}, got {}", path, expected, actual);
        Ok(actual == expected)
    }

    /// Checks that both files exist and match their pinned or recorded hashes
    pub fn verify_model(&self, model: BuiltinModel) -> Result<bool, ModelError> {
        let info = model.get_model_info();
        let model_path = self.get_model_path(model);
        let labels_path = self.get_labels_path(model);

        if !model_path.exists() || !labels_path.exists() {
            log::info!("Model '{}' is missing one or both files", info.name);
            return Ok(false);
        }

        let model_ok = self.verify_file(&model_path, info.model_hash.as_deref())?;
        let labels_ok = self.verify_file(&labels_path, info.labels_hash.as_deref())?;
        log::info!("Verification of '{}': model {}, labels {}", info.name, model_ok, labels_ok);
        Ok(model_ok && labels_ok)
    }

    async fn download_and_verify_file(
        &self,
        url: &str,
        path: &Path,
        expected_hash: Option<&str>,
        file_type: &str,
    ) -> Result<(), ModelError> {
        log::info!("Downloading {} file from {}", file_type, url);
        let response = reqwest::get(url).await?.error_for_status()?;
        let bytes = response.bytes().await?;
        log::info!("Downloaded {} bytes", bytes.len());

        if let Some(expected) = expected_hash {
            let actual = sha256_hex(&bytes);
            if actual != expected {
                log::error!("{} hash mismatch: expected {}, got {}", file_type, expected, actual);
                return Err(ModelError::HashMismatch {
                    file_type: file_type.to_string(),
                    expected: expected.to_string(),
                    actual,
                });
            }
        }

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, &bytes)?;
        if expected_hash.is_none() {
            let digest = record_digest(path, &bytes)?;
            log::warn!("No pinned hash for {} file, recorded digest {}", file_type, digest);
        }

        if !self.verify_file(path, expected_hash)? {
            return Err(ModelError::VerificationFailed);
        }

        log::info!("{} file saved to {:?}", file_type, path);
        Ok(())
    }

    pub fn remove_download(&self, model: BuiltinModel) -> Result<(), ModelError> {
        for path in [self.get_model_path(model), self.get_labels_path(model)] {
            for path in [digest_path(&path), path] {
                if path.exists() {
                    fs::remove_file(&path)?;
                }
            }
        }
        Ok(())
    }

    /// Ensures that a model is downloaded and verified, downloading it again if verification fails
    pub async fn ensure_model_downloaded(&self, model: BuiltinModel) -> Result<(), ModelError> {
        if !self.is_model_downloaded(model) {
            log::info!("Model {:?} not found, downloading...", model);
            self.download_model(model).await?;
        } else if !self.verify_model(model)? {
            log::info!("Model {:?} failed verification, re-downloading...", model);
            self.remove_download(model)?;
            self.download_model(model).await?;
        }
        Ok(())
    }
}

fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

/// `model.onnx` -> `model.onnx.sha256`
fn digest_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".sha256");
    path.with_file_name(name)
}

fn record_digest(path: &Path, bytes: &[u8]) -> io::Result<String> {
    let digest = sha256_hex(bytes);
    fs::write(digest_path(path), &digest)?;
    Ok(digest)
}

fn read_recorded_digest(path: &Path) -> io::Result<Option<String>> {
    match fs::read_to_string(digest_path(path)) {
        Ok(digest) => Ok(Some(digest.trim().to_string())),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_manager(name: &str) -> ModelManager {
        ModelManager::new(env::temp_dir().join("binwise-test").join(name)).unwrap()
    }

    #[test]
    fn test_default_models_dir() {
        env::set_var(CACHE_ENV_VAR, "/tmp/binwise-cache");
        let path = ModelManager::get_default_models_dir();
        assert!(path.to_str().unwrap().contains("/tmp/binwise-cache/models"));
        env::remove_var(CACHE_ENV_VAR);

        let path = ModelManager::get_default_models_dir();
        assert!(path.to_str().unwrap().contains("binwise"));
    }

    #[test]
    fn test_missing_model_is_not_downloaded() -> Result<(), ModelError> {
        let manager = temp_manager("missing");
        manager.remove_download(BuiltinModel::MobileNetV2)?;
        assert!(!manager.is_model_downloaded(BuiltinModel::MobileNetV2));
        assert!(!manager.verify_model(BuiltinModel::MobileNetV2)?);
        Ok(())
    }

    #[test]
    fn test_verify_file_with_hash() -> Result<(), ModelError> {
        let manager = temp_manager("hash");
        let path = manager.models_dir().join("sample.txt");
        fs::write(&path, "hello")?;
        let _ = fs::remove_file(digest_path(&path));
        let hash = "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824";
        assert!(manager.verify_file(&path, Some(hash))?);
        assert!(!manager.verify_file(&path, Some("00"))?);
        assert!(!manager.verify_file(&path, None)?);

        assert_eq!(record_digest(&path, b"hello")?, hash);
        assert!(manager.verify_file(&path, None)?);
        // a pinned hash wins over the recorded one
        assert!(!manager.verify_file(&path, Some("00"))?);
        Ok(())
    }

    #[test]
    fn test_tampered_model_fails_verification() -> Result<(), ModelError> {
        let manager = temp_manager("tampered");
        let model = BuiltinModel::MobileNetV2;
        manager.remove_download(model)?;
        let model_path = manager.get_model_path(model);
        let labels_path = manager.get_labels_path(model);
        fs::create_dir_all(model_path.parent().unwrap())?;

        for (path, bytes) in [(&model_path, &b"onnx bytes"[..]), (&labels_path, &b"n07753592 banana"[..])] {
            fs::write(path, bytes)?;
            record_digest(path, bytes)?;
        }
        assert!(manager.verify_model(model)?);

        fs::write(&model_path, b"onnx bytes, modified")?;
        assert!(!manager.verify_model(model)?);

        fs::write(&model_path, b"onnx bytes")?;
        fs::write(&labels_path, "n07753592 plastic bag")?;
        assert!(!manager.verify_model(model)?);

        manager.remove_download(model)?;
        assert!(!digest_path(&model_path).exists());
        assert!(!digest_path(&labels_path).exists());
        Ok(())
    }

    #[tokio::test]
    #[ignore = "downloads the model from the network"]
    async fn test_model_download() -> Result<(), ModelError> {
        let manager = temp_manager("download");
        manager.remove_download(BuiltinModel::MobileNetV2)?;
        manager.download_model(BuiltinModel::MobileNetV2).await?;
        assert!(manager.is_model_downloaded(BuiltinModel::MobileNetV2));
        Ok(())
    }
}
