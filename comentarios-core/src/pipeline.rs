//! # Pipeline de Comentários
//!
//! Orquestra as duas etapas para cada comentário:
//!
//! ```text
//! comentário bruto ──► Normalizer::clean ──► EntityExtractor::extract ──► CommentAnalysis
//! ```
//!
//! Normalizador e extrator são somente leitura, então um lote é processado em
//! paralelo com `rayon` e o resultado sai na mesma ordem da entrada.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::extractor::{EntityExtractor, EntityMatch};
use crate::normalizer::Normalizer;

/// Resultado da análise de um comentário
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentAnalysis {
    pub original: String,
    pub cleaned: String,
    /// Entidades visíveis, com offsets relativos a `cleaned`
    pub entities: Vec<EntityMatch>,
}

#[derive(Debug)]
pub struct CommentPipeline {
    normalizer: Normalizer,
    extractor: EntityExtractor,
}

impl CommentPipeline {
    pub fn new(extractor: EntityExtractor) -> Self {
        Self {
            normalizer: Normalizer::new(),
            extractor,
        }
    }

    pub fn extractor(&self) -> &EntityExtractor {
        &self.extractor
    }

    /// Limpa e extrai as entidades de um comentário.
    pub fn analyze(&self, comment: &str) -> CommentAnalysis {
        let cleaned = self.normalizer.clean(comment);
        let entities = self.extractor.extract(&cleaned);
        debug!(
            chars = comment.chars().count(),
            entities = entities.len(),
            "comentário analisado"
        );
        CommentAnalysis {
            original: comment.to_string(),
            cleaned,
            entities,
        }
    }

    /// Analisa vários comentários em paralelo, preservando a ordem.
    pub fn analyze_batch<S>(&self, comments: &[S]) -> Vec<CommentAnalysis>
    where
        S: AsRef<str> + Sync,
    {
        comments
            .par_iter()
            .map(|comment| self.analyze(comment.as_ref()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::demo_comments;
    use crate::registry::{load_with_fallback, BuiltinRegistry};
    use crate::rules::OverrideRules;
    use crate::tagger::EntityLabel;

    fn pipeline() -> CommentPipeline {
        let loaded = load_with_fallback(&BuiltinRegistry::new()).unwrap();
        CommentPipeline::new(EntityExtractor::with_overrides(
            loaded.recognizer,
            OverrideRules::default_rules(),
        ))
    }

    fn has(analysis: &CommentAnalysis, text: &str, label: EntityLabel) -> bool {
        analysis.entities.iter().any(|e| e.text == text && e.label == label)
    }

    #[test]
    fn test_reddit_fragment() {
        let analysis = pipeline().analyze("Vi no link https://reddit.com/r/crime kkkkkk #elizematsunaga");

        assert!(analysis.cleaned.contains("elizematsunaga"));
        assert!(!analysis.cleaned.contains("http"));
        assert!(!analysis.cleaned.contains("kkkkkk"));
        assert!(!analysis.cleaned.contains('#'));
        assert!(!analysis.entities.iter().any(|e| e.label == EntityLabel::Person));
        assert!(!analysis.entities.iter().any(|e| e.text == "Vi"));
    }

    #[test]
    fn test_uber_comment() {
        let analysis = pipeline().analyze("A empresa Uber deveria banir motoristas!!!!!");

        assert!(analysis.cleaned.ends_with("motoristas!"));
        assert!(has(&analysis, "Uber", EntityLabel::Organization));
        assert!(!analysis
            .entities
            .iter()
            .any(|e| e.text == "Uber" && e.label != EntityLabel::Organization));
    }

    #[test]
    fn test_rules_reach_inside_hyphens_and_possessives() {
        let pipeline = pipeline();

        let hyphen = pipeline.analyze("Olha a Elize-Matsunaga");
        assert!(has(&hyphen, "Elize", EntityLabel::Person));
        assert!(!hyphen.entities.iter().any(|e| e.text == "Elize-Matsunaga"));

        let possessive = pipeline.analyze("A Uber's app");
        assert!(has(&possessive, "Uber", EntityLabel::Organization));
        assert!(!possessive.entities.iter().any(|e| e.text.starts_with("Uber'")));
    }

    #[test]
    fn test_overrides_on_demo_comments() {
        let results = pipeline().analyze_batch(&demo_comments());

        assert!(has(&results[0], "Elize Matsunaga", EntityLabel::Person));
        assert!(has(&results[1], "Tremembé", EntityLabel::Location));
        assert!(has(&results[1], "justiça_br", EntityLabel::Organization));
        assert!(has(&results[2], "Netflix", EntityLabel::Organization));
        assert!(has(&results[2], "Elize", EntityLabel::Person));

        for analysis in &results {
            for ignored in ["Vi", "Acho", "Gente", "Olha"] {
                assert!(!analysis.entities.iter().any(|e| e.text == ignored));
            }
            for e in &analysis.entities {
                assert_eq!(&analysis.cleaned[e.start..e.end], e.text);
            }
        }
    }

    #[test]
    fn test_batch_preserves_order() {
        let comments = demo_comments();
        let pipeline = pipeline();
        let results = pipeline.analyze_batch(&comments);

        assert_eq!(results.len(), comments.len());
        for (comment, analysis) in comments.iter().zip(&results) {
            assert_eq!(analysis.original, *comment);
            assert_eq!(*analysis, pipeline.analyze(comment));
        }
    }

    #[test]
    fn test_empty_comment() {
        let analysis = pipeline().analyze("   ");
        assert_eq!(analysis.cleaned, "");
        assert!(analysis.entities.is_empty());
    }

    #[test]
    fn test_analysis_serializes_to_json() {
        let analysis = pipeline().analyze("A empresa Uber!!");
        let json = serde_json::to_value(&analysis).unwrap();
        assert_eq!(json["cleaned"], "A empresa Uber!");
        let uber = json["entities"]
            .as_array()
            .unwrap()
            .iter()
            .find(|e| e["text"] == "Uber")
            .unwrap();
        assert_eq!(uber["label"], "ORG");
        assert_eq!(uber["source"], "override_rule");
    }
}
