//! # Reconhecedor Estatístico
//!
//! [`StatisticalRecognizer`] é a fronteira com o modelo pré-treinado: o resto
//! do pipeline só sabe que ele recebe tokens e devolve uma tag BIO por token.
//! Em testes, qualquer dublê que implemente o trait pode ocupar o lugar do
//! modelo real.
//!
//! [`CrfRecognizer`] é a implementação embarcada: features → CRF → Viterbi,
//! com a confiança de cada token dada pelo softmax dos scores do passo.

use crate::crf::CrfModel;
use crate::features::{extract_features, Gazetteers};
use crate::model::ModelPackage;
use crate::tagger::{Tag, TaggedToken};
use crate::tokenizer::Token;
use crate::viterbi::{scores_to_probs, viterbi_decode};

/// Um modelo que prevê entidades sobre uma sequência de tokens.
///
/// Implementações são somente leitura depois de carregadas, então podem ser
/// compartilhadas entre threads.
pub trait StatisticalRecognizer: Send + Sync {
    /// Identificador do modelo (ex: "pt_core_news_lg")
    fn name(&self) -> &str;

    /// Uma [`TaggedToken`] por token de entrada, na mesma ordem.
    fn predict(&self, tokens: &[Token]) -> Vec<TaggedToken>;
}

/// Reconhecedor CRF + Viterbi.
#[derive(Debug, Clone)]
pub struct CrfRecognizer {
    name: String,
    crf: CrfModel,
    gazetteers: Gazetteers,
}

impl CrfRecognizer {
    pub fn new(name: impl Into<String>, crf: CrfModel, gazetteers: Gazetteers) -> Self {
        Self {
            name: name.into(),
            crf,
            gazetteers,
        }
    }

    pub fn from_package(package: ModelPackage) -> Self {
        Self::new(package.name, package.crf, package.gazetteers)
    }
}

impl StatisticalRecognizer for CrfRecognizer {
    fn name(&self) -> &str {
        &self.name
    }

    fn predict(&self, tokens: &[Token]) -> Vec<TaggedToken> {
        let feature_vectors = extract_features(tokens, &self.gazetteers);
        let result = viterbi_decode(&self.crf, &feature_vectors);

        tokens
            .iter()
            .enumerate()
            .map(|(i, token)| {
                let tag = result.best_sequence.get(i).copied().unwrap_or(Tag::Outside);
                let confidence = result
                    .step_scores
                    .get(i)
                    .map(|scores| scores_to_probs(scores))
                    .and_then(|probs| probs.get(tag.index()).copied())
                    .unwrap_or(0.5);
                TaggedToken {
                    token: token.clone(),
                    tag,
                    confidence,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ModelTier;
    use crate::tagger::{tokens_to_spans, EntityCategory};
    use crate::tokenizer::tokenize;

    fn spans(tier: ModelTier, text: &str) -> Vec<(String, EntityCategory)> {
        let recognizer = CrfRecognizer::from_package(ModelPackage::bundled(tier));
        let tagged = recognizer.predict(&tokenize(text));
        tokens_to_spans(&tagged, text)
            .into_iter()
            .map(|s| (s.text, s.category))
            .collect()
    }

    #[test]
    fn test_one_tag_per_token() {
        let recognizer = CrfRecognizer::from_package(ModelPackage::bundled(ModelTier::Small));
        let tokens = tokenize("O documentário é muito bom, mostra detalhes do crime.");
        let tagged = recognizer.predict(&tokens);
        assert_eq!(tagged.len(), tokens.len());
        assert!(tagged.iter().all(|t| (0.0..=1.0).contains(&t.confidence)));
        assert_eq!(recognizer.name(), "pt_core_news_sm");
    }

    #[test]
    fn test_large_model_uses_gazetteers() {
        let found = spans(ModelTier::Large, "O presidente Lula visitou Brasília");
        assert!(found.contains(&("Lula".to_string(), EntityCategory::Per)));
        assert!(found.contains(&("Brasília".to_string(), EntityCategory::Loc)));
        assert!(!found.iter().any(|(text, _)| text == "O"));
    }

    #[test]
    fn test_lowercase_text_has_no_entities() {
        let found = spans(ModelTier::Large, "não dá pra acreditar que ela está solta");
        assert!(found.is_empty());
    }

    #[test]
    fn test_empty_input() {
        let recognizer = CrfRecognizer::from_package(ModelPackage::bundled(ModelTier::Large));
        assert!(recognizer.predict(&[]).is_empty());
    }
}
