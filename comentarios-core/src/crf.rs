//! # CRF — Conditional Random Field Linear-Chain
//!
//! Score de uma sequência de tags `y` para os tokens `x`:
//!
//! ```text
//! score(y, x) = Σ_i [emission(y_i, x, i) + transition(y_{i-1}, y_i)]
//! emission(t, x, i) = Σ_k w_{k,t} * f_k(x, i)
//! ```
//!
//! Os pesos são serializáveis, de modo que um modelo inteiro pode ser gravado
//! e lido como JSON (ver [`crate::model::ModelPackage`]).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::features::FeatureVector;
use crate::tagger::Tag;

/// Pesos de um CRF linear.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrfModel {
    /// Pesos de emissão: "feature|tag_label" → peso
    pub emission_weights: BTreeMap<String, f64>,
    /// Pesos de transição indexados por [prev_tag][next_tag]
    pub transition_weights: Vec<Vec<f64>>,
}

impl CrfModel {
    /// Cria um modelo com pesos zerados
    pub fn new() -> Self {
        let n = Tag::COUNT;
        Self {
            emission_weights: BTreeMap::new(),
            transition_weights: vec![vec![0.0f64; n]; n],
        }
    }

    /// `score = Σ_k w_{k, tag} * f_k(x, i)`
    pub fn emission_score(&self, features: &FeatureVector, tag: &Tag) -> f64 {
        let tag_label = tag.label();
        features
            .features
            .iter()
            .map(|(feat_name, feat_val)| {
                let key = format!("{feat_name}|{tag_label}");
                feat_val * self.emission_weights.get(&key).unwrap_or(&0.0)
            })
            .sum()
    }

    pub fn transition_score(&self, prev: &Tag, next: &Tag) -> f64 {
        self.transition_weights[prev.index()][next.index()]
    }

    pub fn set_emission(&mut self, feature: &str, tag: &Tag, weight: f64) {
        let key = format!("{feature}|{}", tag.label());
        self.emission_weights.insert(key, weight);
    }

    pub fn set_transition(&mut self, from: &Tag, to: &Tag, weight: f64) {
        self.transition_weights[from.index()][to.index()] = weight;
    }

    /// Confere se a matriz de transição é `Tag::COUNT × Tag::COUNT` e se os
    /// pesos são finitos. Modelos lidos de disco passam por aqui.
    pub fn validate(&self) -> Result<(), String> {
        let n = Tag::COUNT;
        if self.transition_weights.len() != n
            || self.transition_weights.iter().any(|row| row.len() != n)
        {
            return Err(format!("matriz de transição deve ser {n}x{n}"));
        }
        let all_finite = self
            .transition_weights
            .iter()
            .flatten()
            .chain(self.emission_weights.values())
            .all(|w| w.is_finite());
        if !all_finite {
            return Err("pesos não finitos (NaN ou infinito)".to_string());
        }
        if let Some(key) = self
            .emission_weights
            .keys()
            .find(|key| key.rsplit_once('|').and_then(|(_, tag)| Tag::from_label(tag)).is_none())
        {
            return Err(format!("peso de emissão com tag desconhecida: {key}"));
        }
        Ok(())
    }
}

impl Default for CrfModel {
    fn default() -> Self {
        Self::new()
    }
}

/// Scores de emissão de todos os tokens: `emission[i][tag.index()]`
pub fn compute_emission_scores(model: &CrfModel, feature_vectors: &[FeatureVector]) -> Vec<Vec<f64>> {
    let tags = Tag::all();
    feature_vectors
        .iter()
        .map(|fv| tags.iter().map(|tag| model.emission_score(fv, tag)).collect())
        .collect()
}
