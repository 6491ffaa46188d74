//! # Extração de Entidades
//!
//! Combina as regras de sobrescrita com o reconhecedor estatístico:
//!
//! 1. Tokeniza o texto limpo e aplica as regras. Cada trecho casado fica
//!    reservado.
//! 2. Roda o modelo e converte as tags BIO em entidades, descartando qualquer
//!    entidade que toque um token reservado.
//! 3. Junta as duas listas, remove os rótulos `IGNORE` e ordena por posição.
//!
//! O extrator só é lido depois de montado, então pode ser compartilhado entre
//! threads sem trava.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::recognizer::StatisticalRecognizer;
use crate::rules::OverrideRules;
use crate::tagger::{tokens_to_spans, EntityLabel};
use crate::tokenizer::tokenize;

/// De onde veio uma entidade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchSource {
    OverrideRule,
    StatisticalModel,
}

/// Uma entidade encontrada no texto limpo
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityMatch {
    pub text: String,
    pub label: EntityLabel,
    pub source: MatchSource,
    /// Byte inicial no texto limpo
    pub start: usize,
    /// Byte final (exclusivo)
    pub end: usize,
    /// 1.0 para regras; média do modelo nos demais casos
    pub confidence: f64,
}

pub struct EntityExtractor {
    recognizer: Arc<dyn StatisticalRecognizer>,
    overrides: Option<OverrideRules>,
}

impl EntityExtractor {
    /// Extrator sem regras: só o modelo decide.
    pub fn new(recognizer: Arc<dyn StatisticalRecognizer>) -> Self {
        Self {
            recognizer,
            overrides: None,
        }
    }

    pub fn with_overrides(recognizer: Arc<dyn StatisticalRecognizer>, rules: OverrideRules) -> Self {
        Self {
            recognizer,
            overrides: Some(rules),
        }
    }

    /// Instala `rules` se ainda não houver regras. Retorna `false` (e mantém
    /// as regras atuais) quando já havia um conjunto registrado.
    pub fn register_overrides(&mut self, rules: OverrideRules) -> bool {
        if self.overrides.is_some() {
            debug!(ignored = rules.len(), "regras de sobrescrita já registradas");
            return false;
        }
        debug!(rules = rules.len(), "regras de sobrescrita registradas");
        self.overrides = Some(rules);
        true
    }

    pub fn has_overrides(&self) -> bool {
        self.overrides.is_some()
    }

    pub fn recognizer_name(&self) -> &str {
        self.recognizer.name()
    }

    /// Entidades visíveis de `text`, ordenadas pelo byte inicial.
    pub fn extract(&self, text: &str) -> Vec<EntityMatch> {
        let tokens = tokenize(text);
        if tokens.is_empty() {
            return Vec::new();
        }

        let mut claimed = vec![false; tokens.len()];
        let mut entities = Vec::new();

        if let Some(rules) = &self.overrides {
            for m in rules.matches(&tokens) {
                claimed[m.start_token..=m.end_token].fill(true);
                let start = tokens[m.start_token].start;
                let end = tokens[m.end_token].end;
                entities.push(EntityMatch {
                    text: text[start..end].to_string(),
                    label: m.label,
                    source: MatchSource::OverrideRule,
                    start,
                    end,
                    confidence: 1.0,
                });
            }
        }

        let tagged = self.recognizer.predict(&tokens);
        for span in tokens_to_spans(&tagged, text) {
            let overlaps = claimed
                .get(span.start_token..=span.end_token)
                .map_or(true, |range| range.iter().any(|c| *c));
            if overlaps {
                continue;
            }
            entities.push(EntityMatch {
                text: span.text,
                label: span.category.into(),
                source: MatchSource::StatisticalModel,
                start: span.start,
                end: span.end,
                confidence: span.confidence,
            });
        }

        entities.retain(|e| e.label.is_visible());
        entities.sort_by_key(|e| e.start);
        entities
    }
}

impl std::fmt::Debug for EntityExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityExtractor")
            .field("recognizer", &self.recognizer.name())
            .field("overrides", &self.overrides.as_ref().map(OverrideRules::len))
            .finish()
    }
}
