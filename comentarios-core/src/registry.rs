//! # Registro de Modelos e Fallback entre Níveis
//!
//! O carregamento acontece uma vez, na inicialização:
//!
//! 1. Tenta o nível `Large` (`pt_core_news_lg`).
//! 2. Se falhar por qualquer motivo, registra um aviso e tenta `Small`.
//! 3. Se ambos falharem, devolve [`ConfigError::NoModelAvailable`] com as
//!    duas causas. Quem chamou decide se encerra o processo.
//!
//! Não há novas tentativas: cada nível é tentado no máximo uma vez.
//!
//! ```rust
//! use comentarios_core::registry::{load_with_fallback, BuiltinRegistry};
//! use comentarios_core::model::ModelTier;
//!
//! let loaded = load_with_fallback(&BuiltinRegistry::new()).unwrap();
//! assert_eq!(loaded.tier, ModelTier::Large);
//! ```

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{error, info, warn};

use crate::error::{ConfigError, ModelError};
use crate::model::{ModelPackage, ModelTier};
use crate::recognizer::{CrfRecognizer, StatisticalRecognizer};

/// Fonte de modelos pré-treinados.
pub trait ModelRegistry {
    /// Descrição da fonte para logs (ex: "embarcado", "/opt/modelos")
    fn describe(&self) -> String;

    fn load(&self, tier: ModelTier) -> Result<Arc<dyn StatisticalRecognizer>, ModelError>;
}

/// Modelo carregado e o nível que de fato foi usado
#[derive(Clone)]
pub struct LoadedModel {
    pub tier: ModelTier,
    pub recognizer: Arc<dyn StatisticalRecognizer>,
}

impl std::fmt::Debug for LoadedModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadedModel")
            .field("tier", &self.tier)
            .field("recognizer", &self.recognizer.name())
            .finish()
    }
}

/// Carrega o melhor nível disponível, do maior para o menor.
pub fn load_with_fallback(registry: &dyn ModelRegistry) -> Result<LoadedModel, ConfigError> {
    let mut failures = Vec::new();

    for tier in ModelTier::fallback_order() {
        match registry.load(tier) {
            Ok(recognizer) => {
                info!(model = %tier, source = %registry.describe(), "modelo de linguagem carregado");
                return Ok(LoadedModel { tier, recognizer });
            }
            Err(err) => {
                warn!(model = %tier, error = %err, "modelo indisponível");
                failures.push((tier, err));
            }
        }
    }

    let err = ConfigError::NoModelAvailable { failures };
    error!(error = %err, "nenhum modelo pôde ser carregado");
    Err(err)
}

/// Serve os pacotes embarcados no binário.
#[derive(Debug, Clone)]
pub struct BuiltinRegistry {
    available: Vec<ModelTier>,
}

impl BuiltinRegistry {
    /// Ambos os níveis disponíveis
    pub fn new() -> Self {
        Self::with_tiers(&ModelTier::fallback_order())
    }

    /// Só os níveis informados ficam disponíveis
    pub fn with_tiers(tiers: &[ModelTier]) -> Self {
        Self {
            available: tiers.to_vec(),
        }
    }
}

impl Default for BuiltinRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ModelRegistry for BuiltinRegistry {
    fn describe(&self) -> String {
        "embarcado".to_string()
    }

    fn load(&self, tier: ModelTier) -> Result<Arc<dyn StatisticalRecognizer>, ModelError> {
        if !self.available.contains(&tier) {
            return Err(ModelError::NotFound {
                name: tier.model_name().to_string(),
                location: self.describe(),
            });
        }
        Ok(Arc::new(CrfRecognizer::from_package(ModelPackage::bundled(tier))))
    }
}

/// Lê pacotes JSON de um diretório: `<dir>/pt_core_news_lg.json` etc.
#[derive(Debug, Clone)]
pub struct DirectoryRegistry {
    root: PathBuf,
}

impl DirectoryRegistry {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn path_for(&self, tier: ModelTier) -> PathBuf {
        self.root.join(format!("{}.json", tier.model_name()))
    }
}

impl ModelRegistry for DirectoryRegistry {
    fn describe(&self) -> String {
        self.root.display().to_string()
    }

    fn load(&self, tier: ModelTier) -> Result<Arc<dyn StatisticalRecognizer>, ModelError> {
        let name = tier.model_name().to_string();
        let path = self.path_for(tier);

        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Err(ModelError::NotFound {
                    name,
                    location: path.display().to_string(),
                })
            }
            Err(source) => return Err(ModelError::Io { name, source }),
        };

        let package: ModelPackage = serde_json::from_str(&raw).map_err(|source| ModelError::Corrupt {
            name: name.clone(),
            source,
        })?;
        package
            .check_compatible(tier)
            .map_err(|reason| ModelError::Incompatible { name, reason })?;

        Ok(Arc::new(CrfRecognizer::from_package(package)))
    }
}

/// Grava os dois pacotes embarcados em `dir`, criando o diretório se preciso.
///
/// Depois disso, um [`DirectoryRegistry`] apontado para `dir` carrega ambos.
pub fn export_bundled(dir: impl AsRef<Path>) -> io::Result<Vec<PathBuf>> {
    let registry = DirectoryRegistry::new(dir.as_ref());
    fs::create_dir_all(dir.as_ref())?;

    let mut written = Vec::new();
    for tier in ModelTier::fallback_order() {
        let path = registry.path_for(tier);
        let mut writer = BufWriter::new(File::create(&path)?);
        serde_json::to_writer(&mut writer, &ModelPackage::bundled(tier))?;
        writer.flush()?;
        info!(model = %tier, path = %path.display(), "modelo exportado");
        written.push(path);
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MODEL_FORMAT_VERSION;

    #[test]
    fn test_builtin_prefers_large() {
        let loaded = load_with_fallback(&BuiltinRegistry::new()).unwrap();
        assert_eq!(loaded.tier, ModelTier::Large);
        assert_eq!(loaded.recognizer.name(), "pt_core_news_lg");
    }

    #[test]
    fn test_falls_back_to_small() {
        let registry = BuiltinRegistry::with_tiers(&[ModelTier::Small]);
        let loaded = load_with_fallback(&registry).unwrap();
        assert_eq!(loaded.tier, ModelTier::Small);
        assert_eq!(loaded.recognizer.name(), "pt_core_news_sm");
    }

    #[test]
    fn test_no_model_is_fatal_config_error() {
        let registry = BuiltinRegistry::with_tiers(&[]);
        let err = load_with_fallback(&registry).unwrap_err();

        let ConfigError::NoModelAvailable { failures } = &err;
        assert_eq!(failures.len(), 2);
        assert_eq!(failures[0].0, ModelTier::Large);
        assert_eq!(failures[1].0, ModelTier::Small);
        assert!(failures.iter().all(|(_, e)| e.is_not_found()));

        let message = err.to_string();
        assert!(message.contains("pt_core_news_lg"));
        assert!(message.contains("pt_core_news_sm"));
        assert!(err.hint().contains("export-model"));
    }

    #[test]
    fn test_directory_roundtrip_via_export() {
        let dir = tempfile::tempdir().unwrap();
        let written = export_bundled(dir.path()).unwrap();
        assert_eq!(written.len(), 2);

        let registry = DirectoryRegistry::new(dir.path());
        let loaded = load_with_fallback(&registry).unwrap();
        assert_eq!(loaded.tier, ModelTier::Large);
    }

    #[test]
    fn test_export_is_byte_stable() {
        let (a, b) = (tempfile::tempdir().unwrap(), tempfile::tempdir().unwrap());
        let first = export_bundled(a.path()).unwrap();
        let second = export_bundled(b.path()).unwrap();
        for (x, y) in first.iter().zip(&second) {
            assert_eq!(fs::read(x).unwrap(), fs::read(y).unwrap());
        }
    }

    #[test]
    fn test_directory_missing_large_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        export_bundled(dir.path()).unwrap();
        let registry = DirectoryRegistry::new(dir.path());
        fs::remove_file(registry.path_for(ModelTier::Large)).unwrap();

        let loaded = load_with_fallback(&registry).unwrap();
        assert_eq!(loaded.tier, ModelTier::Small);
    }

    #[test]
    fn test_directory_distinguishes_error_kinds() {
        let dir = tempfile::tempdir().unwrap();
        let registry = DirectoryRegistry::new(dir.path());

        let missing = registry.load(ModelTier::Large).err().unwrap();
        assert!(missing.is_not_found());

        fs::write(registry.path_for(ModelTier::Large), "{ isto não é json").unwrap();
        let corrupt = registry.load(ModelTier::Large).err().unwrap();
        assert!(matches!(corrupt, ModelError::Corrupt { .. }));

        let mut package = ModelPackage::bundled(ModelTier::Small);
        package.format_version = MODEL_FORMAT_VERSION + 1;
        fs::write(
            registry.path_for(ModelTier::Small),
            serde_json::to_string(&package).unwrap(),
        )
        .unwrap();
        let incompatible = registry.load(ModelTier::Small).err().unwrap();
        assert!(matches!(incompatible, ModelError::Incompatible { .. }));

        let err = load_with_fallback(&registry).unwrap_err();
        let ConfigError::NoModelAvailable { failures } = err;
        assert!(matches!(failures[0].1, ModelError::Corrupt { .. }));
        assert!(matches!(failures[1].1, ModelError::Incompatible { .. }));
    }

    #[test]
    fn test_package_for_wrong_tier_is_incompatible() {
        let dir = tempfile::tempdir().unwrap();
        let registry = DirectoryRegistry::new(dir.path());
        fs::write(
            registry.path_for(ModelTier::Large),
            serde_json::to_string(&ModelPackage::bundled(ModelTier::Small)).unwrap(),
        )
        .unwrap();
        let err = registry.load(ModelTier::Large).err().unwrap();
        assert!(matches!(err, ModelError::Incompatible { .. }));
    }
}
