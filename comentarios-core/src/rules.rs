//! # Regras de Sobrescrita
//!
//! Modelos pré-treinados erram bastante em textos curtos e informais: palavras
//! comuns no início da frase ("Acho", "Gente") viram pessoas e nomes de marcas
//! passam despercebidos. As regras de sobrescrita corrigem isso com frases
//! literais associadas a um rótulo, aplicadas **antes** do modelo: um trecho
//! reivindicado por uma regra nunca é reclassificado pelo modelo.
//!
//! ## Casamento
//!
//! - A frase é tokenizada com o mesmo [`tokenize`] usado na análise e
//!   comparada token a token, diferenciando maiúsculas ("Elize" ≠ "elize").
//! - Sobreposições: vence o trecho mais longo; empate, o que começa antes;
//!   persistindo o empate, a regra que aparece antes na lista.
//!
//! ## Formato JSON
//!
//! ```json
//! [
//!   {"label": "PER", "pattern": "Elize Matsunaga"},
//!   {"label": "IGNORE", "pattern": "Vi"}
//! ]
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::RulesError;
use crate::tagger::EntityLabel;
use crate::tokenizer::{tokenize, Token};

/// Uma frase literal e o rótulo que ela recebe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverrideRule {
    pub label: EntityLabel,
    pub pattern: String,
}

impl OverrideRule {
    pub fn new(label: EntityLabel, pattern: impl Into<String>) -> Self {
        Self {
            label,
            pattern: pattern.into(),
        }
    }
}

/// Um trecho do texto reivindicado por uma regra
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleMatch {
    /// Posição da regra na lista
    pub rule_index: usize,
    pub label: EntityLabel,
    pub start_token: usize,
    /// Inclusivo
    pub end_token: usize,
}

impl RuleMatch {
    fn token_len(&self) -> usize {
        self.end_token - self.start_token + 1
    }
}

/// Lista ordenada de regras, somente leitura depois de construída.
#[derive(Debug, Clone, Default)]
pub struct OverrideRules {
    rules: Vec<OverrideRule>,
    /// Frase de cada regra já tokenizada, alinhada com `rules`
    phrases: Vec<Vec<String>>,
}

impl OverrideRules {
    /// Valida e pré-tokeniza as regras.
    pub fn new(rules: Vec<OverrideRule>) -> Result<Self, RulesError> {
        let mut phrases = Vec::with_capacity(rules.len());
        for (index, rule) in rules.iter().enumerate() {
            let parts: Vec<String> = tokenize(&rule.pattern).into_iter().map(|t| t.text).collect();
            if parts.is_empty() {
                return Err(RulesError::EmptyPattern {
                    index,
                    label: rule.label.code().to_string(),
                });
            }
            phrases.push(parts);
        }
        Ok(Self { rules, phrases })
    }

    /// Regras escritas à mão para comentários sobre o caso Elize Matsunaga.
    ///
    /// O primeiro bloco é o gabarito do que deve ser identificado; o segundo
    /// suprime palavras comuns que o modelo confunde com nomes próprios.
    pub fn default_rules() -> Self {
        let rules = vec![
            OverrideRule::new(EntityLabel::Person, "Elize Matsunaga"),
            OverrideRule::new(EntityLabel::Person, "Elize"),
            OverrideRule::new(EntityLabel::Location, "Tremembé"),
            OverrideRule::new(EntityLabel::Organization, "Netflix"),
            OverrideRule::new(EntityLabel::Organization, "Uber"),
            OverrideRule::new(EntityLabel::Miscellaneous, "True Crime"),
            // Perfil, já sem o @
            OverrideRule::new(EntityLabel::Organization, "justiça_br"),
            OverrideRule::new(EntityLabel::Ignore, "Vi"),
            OverrideRule::new(EntityLabel::Ignore, "Acho"),
            OverrideRule::new(EntityLabel::Ignore, "Gente"),
            OverrideRule::new(EntityLabel::Ignore, "Olha"),
        ];
        Self::new(rules).expect("regras padrão têm padrões não vazios")
    }

    pub fn from_json_str(json: &str) -> Result<Self, RulesError> {
        let rules: Vec<OverrideRule> = serde_json::from_str(json)?;
        Self::new(rules)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, RulesError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| RulesError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    pub fn rules(&self) -> &[OverrideRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Encontra os trechos reivindicados pelas regras, sem sobreposição,
    /// ordenados pela posição no texto.
    pub fn matches(&self, tokens: &[Token]) -> Vec<RuleMatch> {
        let mut candidates = Vec::new();

        for (rule_index, (rule, parts)) in self.rules.iter().zip(&self.phrases).enumerate() {
            if parts.len() > tokens.len() {
                continue;
            }
            for start in 0..=tokens.len() - parts.len() {
                let hit = parts
                    .iter()
                    .enumerate()
                    .all(|(j, part)| tokens[start + j].text == *part);
                if hit {
                    candidates.push(RuleMatch {
                        rule_index,
                        label: rule.label,
                        start_token: start,
                        end_token: start + parts.len() - 1,
                    });
                }
            }
        }

        candidates.sort_by(|a, b| {
            b.token_len()
                .cmp(&a.token_len())
                .then(a.start_token.cmp(&b.start_token))
                .then(a.rule_index.cmp(&b.rule_index))
        });

        let mut taken = vec![false; tokens.len()];
        let mut accepted = Vec::new();
        for candidate in candidates {
            let span = &mut taken[candidate.start_token..=candidate.end_token];
            if span.iter().any(|t| *t) {
                continue;
            }
            span.fill(true);
            accepted.push(candidate);
        }

        accepted.sort_by_key(|m| m.start_token);
        accepted
    }
}
