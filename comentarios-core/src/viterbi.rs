//! # Algoritmo de Viterbi
//!
//! Encontra a sequência de tags de maior score em `O(N × T²)` em vez de
//! testar as `T^N` combinações.
//!
//! ```text
//! Inicialização: viterbi[0][t] = emission(t, x_0)   (I-X penalizado)
//! Recursão:      viterbi[i][t] = max_{t'} [viterbi[i-1][t'] + transition(t', t)] + emission(t, x_i)
//! Backtracking:  reconstrói o caminho ótimo de trás para frente
//! ```

use crate::crf::{compute_emission_scores, CrfModel};
use crate::features::FeatureVector;
use crate::tagger::Tag;

/// Penalidade extra para transições que violam o esquema BIO
const INVALID_TRANSITION_PENALTY: f64 = 10.0;

/// Resultado do Viterbi
#[derive(Debug, Clone, Default)]
pub struct ViterbiResult {
    /// Uma tag por token
    pub best_sequence: Vec<Tag>,
    /// Score (não normalizado) do caminho escolhido
    pub best_score: f64,
    /// Scores acumulados de cada tag em cada token: `step_scores[i][tag.index()]`
    pub step_scores: Vec<Vec<f64>>,
}

/// Decodifica a sequência de tags de maior score.
pub fn viterbi_decode(model: &CrfModel, feature_vectors: &[FeatureVector]) -> ViterbiResult {
    let emission = compute_emission_scores(model, feature_vectors);
    let Some((first, rest)) = emission.split_first() else {
        return ViterbiResult::default();
    };
    let tags = Tag::all();

    // Sem transição no primeiro token, mas I-X não pode abrir a sequência
    let mut step_scores: Vec<Vec<f64>> = Vec::with_capacity(emission.len());
    step_scores.push(
        tags.iter()
            .zip(first)
            .map(|(tag, e)| match tag {
                Tag::Inside(_) => e - INVALID_TRANSITION_PENALTY,
                _ => *e,
            })
            .collect(),
    );

    let mut backpointers: Vec<Vec<usize>> = Vec::with_capacity(rest.len());
    for row in rest {
        let prev_scores = &step_scores[step_scores.len() - 1];
        let (scores, back): (Vec<f64>, Vec<usize>) = tags
            .iter()
            .zip(row)
            .map(|(next, e)| {
                let (from, score) = argmax(
                    tags.iter()
                        .zip(prev_scores)
                        .map(|(prev, s)| s + transition(model, prev, next)),
                );
                (score + e, from)
            })
            .unzip();
        step_scores.push(scores);
        backpointers.push(back);
    }

    let last = step_scores.last().map(Vec::as_slice).unwrap_or_default();
    let (mut current, best_score) = argmax(last.iter().copied());

    let mut best_sequence = Vec::with_capacity(step_scores.len());
    best_sequence.push(tags[current]);
    for back in backpointers.iter().rev() {
        current = back[current];
        best_sequence.push(tags[current]);
    }
    best_sequence.reverse();

    ViterbiResult {
        best_sequence,
        best_score,
        step_scores,
    }
}

/// Peso aprendido mais a penalidade BIO, quando a transição é inválida
fn transition(model: &CrfModel, prev: &Tag, next: &Tag) -> f64 {
    let penalty = if Tag::is_valid_transition(prev, next) {
        0.0
    } else {
        INVALID_TRANSITION_PENALTY
    };
    model.transition_score(prev, next) - penalty
}

/// (posição, valor) do maior score; empates ficam com o primeiro
fn argmax(scores: impl Iterator<Item = f64>) -> (usize, f64) {
    scores
        .enumerate()
        .fold((0, f64::NEG_INFINITY), |best, (i, s)| if s > best.1 { (i, s) } else { best })
}

/// Softmax dos scores de um passo (usado como confiança)
pub fn scores_to_probs(scores: &[f64]) -> Vec<f64> {
    if scores.is_empty() {
        return vec![];
    }
    let max_score = scores.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = scores.iter().map(|&s| (s - max_score).exp()).collect();
    let sum: f64 = exps.iter().sum();
    if sum == 0.0 || !sum.is_finite() {
        return vec![1.0 / scores.len() as f64; scores.len()];
    }
    exps.iter().map(|e| e / sum).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tagger::EntityCategory;

    fn fv(index: usize, capitalized: bool) -> FeatureVector {
        let mut fv = FeatureVector::new(index);
        fv.insert("bias", 1.0);
        if capitalized {
            fv.insert("is_capitalized", 1.0);
        }
        fv
    }

    #[test]
    fn test_viterbi_prefers_capitalized_as_per() {
        let mut model = CrfModel::new();
        model.set_emission("is_capitalized", &Tag::Begin(EntityCategory::Per), 5.0);
        model.set_emission("is_capitalized", &Tag::Outside, -3.0);
        model.set_emission("bias", &Tag::Outside, 1.0);
        model.set_transition(&Tag::Begin(EntityCategory::Per), &Tag::Inside(EntityCategory::Per), 3.0);

        let result = viterbi_decode(&model, &[fv(0, true), fv(1, false)]);
        assert_eq!(result.best_sequence.len(), 2);
        assert_eq!(result.best_sequence[0], Tag::Begin(EntityCategory::Per));
        assert_eq!(result.step_scores.len(), 2);
    }

    #[test]
    fn test_sequence_never_opens_with_inside() {
        let mut model = CrfModel::new();
        model.set_emission("bias", &Tag::Inside(EntityCategory::Loc), 4.0);
        model.set_emission("bias", &Tag::Begin(EntityCategory::Loc), 3.0);

        let result = viterbi_decode(&model, &[fv(0, false)]);
        assert_eq!(result.best_sequence, vec![Tag::Begin(EntityCategory::Loc)]);
    }

    #[test]
    fn test_invalid_transition_is_avoided() {
        // I-LOC pontua mais no segundo token, mas O → I-LOC é inválida
        let mut model = CrfModel::new();
        model.set_emission("bias", &Tag::Outside, 2.0);
        model.set_emission("is_capitalized", &Tag::Inside(EntityCategory::Loc), 4.0);
        model.set_emission("is_capitalized", &Tag::Begin(EntityCategory::Loc), 3.0);

        let result = viterbi_decode(&model, &[fv(0, false), fv(1, true)]);
        assert_eq!(
            result.best_sequence,
            vec![Tag::Outside, Tag::Begin(EntityCategory::Loc)]
        );
    }

    #[test]
    fn test_viterbi_empty() {
        let result = viterbi_decode(&CrfModel::new(), &[]);
        assert!(result.best_sequence.is_empty());
        assert!(result.step_scores.is_empty());
    }

    #[test]
    fn test_softmax_sums_to_one() {
        let probs = scores_to_probs(&[1.0, 2.0, 3.0, 0.5, -1.0]);
        let sum: f64 = probs.iter().sum();
        assert!((sum - 1.0).abs() < 1e-9);
        assert!(probs[2] > probs[1]);
    }
}
