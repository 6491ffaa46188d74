//! Erros da biblioteca.
//!
//! O carregamento de modelo distingue "não encontrado" de "corrompido" e de
//! "incompatível", para que o operador saiba se falta instalar algo ou se o
//! arquivo instalado está com problema.

use std::path::PathBuf;

use thiserror::Error;

use crate::model::ModelTier;

/// Falha ao carregar um modelo de um único nível.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("modelo '{name}' não encontrado em {location}")]
    NotFound { name: String, location: String },

    #[error("falha de E/S ao ler o modelo '{name}': {source}")]
    Io {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("modelo '{name}' corrompido: {source}")]
    Corrupt {
        name: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("modelo '{name}' incompatível: {reason}")]
    Incompatible { name: String, reason: String },
}

impl ModelError {
    /// `true` quando o modelo simplesmente não está instalado
    pub fn is_not_found(&self) -> bool {
        matches!(self, ModelError::NotFound { .. })
    }
}

/// Erro fatal de configuração: nenhum nível de modelo pôde ser carregado.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("nenhum modelo de linguagem disponível ({})", describe_failures(.failures))]
    NoModelAvailable { failures: Vec<(ModelTier, ModelError)> },
}

impl ConfigError {
    /// Instrução para o operador obter o modelo ausente
    pub fn hint(&self) -> String {
        match self {
            ConfigError::NoModelAvailable { .. } => format!(
                "Execute `comentarios export-model --dir <DIR>` para gravar os modelos \
                 '{}' e '{}' e aponte --model-dir (ou COMENTARIOS_MODEL_DIR) para esse diretório.",
                ModelTier::Large.model_name(),
                ModelTier::Small.model_name(),
            ),
        }
    }
}

fn describe_failures(failures: &[(ModelTier, ModelError)]) -> String {
    failures
        .iter()
        .map(|(tier, err)| format!("{}: {err}", tier.model_name()))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Falha ao carregar ou validar regras de sobrescrita.
#[derive(Debug, Error)]
pub enum RulesError {
    #[error("não foi possível ler as regras em {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("regras inválidas: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("a regra #{index} ({label}) tem padrão vazio")]
    EmptyPattern { index: usize, label: String },
}
