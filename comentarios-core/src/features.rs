//! # Engenharia de Features
//!
//! Para cada token, extrai um vetor esparso de features que o CRF usa para
//! pontuar as tags candidatas.
//!
//! ## Features implementadas
//!
//! - Forma da palavra (lowercase), prefixos e sufixos de 2 a 4 caracteres
//! - Capitalização: inicial maiúscula, tudo maiúsculo, maiúscula no meio
//! - Classe: minúscula comum, stopword, conector de nome ("de", "da"...),
//!   dígito, pontuação, símbolo/emoji
//! - Conector seguido de maiúscula ("Tarsila do Amaral")
//! - Posição: primeiro/último token, logo após pontuação final
//! - Contexto: palavras vizinhas (janela de 2) e capitalização da vizinha
//! - Gazetteers: pertence às listas de pessoas, locais, organizações, misc

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::tokenizer::Token;

/// Vetor esparso de features de um token.
///
/// O espaço de features é aberto ("word=abacaxi", "suffix3=axi"), mas cada
/// token ativa só um punhado delas.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureVector {
    /// Features ativas. Ex: `{"is_capitalized": 1.0, "word=netflix": 1.0}`.
    pub features: HashMap<String, f64>,
    pub token_index: usize,
}

impl FeatureVector {
    pub fn new(token_index: usize) -> Self {
        Self {
            features: HashMap::new(),
            token_index,
        }
    }

    pub fn insert(&mut self, key: impl Into<String>, value: f64) {
        self.features.insert(key.into(), value);
    }

    pub fn contains(&self, key: &str) -> bool {
        self.features.contains_key(key)
    }
}

/// Listas de entidades conhecidas (lowercase, palavra a palavra), em ordem
/// alfabética para que o JSON exportado seja estável
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Gazetteers {
    pub persons: BTreeSet<String>,
    pub locations: BTreeSet<String>,
    pub organizations: BTreeSet<String>,
    pub misc: BTreeSet<String>,
}

impl Gazetteers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.persons.is_empty()
            && self.locations.is_empty()
            && self.organizations.is_empty()
            && self.misc.is_empty()
    }

    /// Adiciona cada palavra de `names` com pelo menos `min_len` caracteres
    pub fn extend_words(set: &mut BTreeSet<String>, names: &[&str], min_len: usize) {
        for name in names {
            for word in name.split_whitespace() {
                if word.chars().count() >= min_len {
                    set.insert(word.to_lowercase());
                }
            }
        }
    }
}

/// Palavras funcionais frequentes que quase nunca são entidades
const STOPWORDS: &[&str] = &[
    "o", "a", "os", "as", "um", "uma", "uns", "umas", "em", "no", "na", "nos", "nas",
    "ao", "aos", "à", "às", "com", "sem", "por", "pra", "pro", "para", "que", "se",
    "é", "foi", "ser", "está", "tá", "não", "mas", "ou", "isso", "essa", "esse",
    "ela", "ele", "eles", "elas", "eu", "você", "vc", "agora", "muito", "mais",
    "tão", "sobre", "quando", "como", "já", "só", "também",
];

/// Conectores que aparecem dentro de nomes ("Tarsila do Amaral")
const CONNECTORS: &[&str] = &["de", "da", "do", "das", "dos", "e"];

/// Gera os vetores de features de toda a sequência, alinhados com `tokens`.
pub fn extract_features(tokens: &[Token], gazetteers: &Gazetteers) -> Vec<FeatureVector> {
    (0..tokens.len())
        .map(|i| extract_for_token(tokens, i, gazetteers))
        .collect()
}

/// Extrai as features de um único token em seu contexto.
pub fn extract_for_token(tokens: &[Token], i: usize, gazetteers: &Gazetteers) -> FeatureVector {
    let mut fv = FeatureVector::new(i);
    let word = tokens[i].text.as_str();
    let lower = word.to_lowercase();
    let first = word.chars().next().unwrap_or(' ');

    fv.insert(format!("word={lower}"), 1.0);
    fv.insert("bias", 1.0);

    // Classe do token
    if first.is_alphabetic() {
        if first.is_uppercase() {
            fv.insert("is_capitalized", 1.0);
        } else if CONNECTORS.contains(&lower.as_str()) {
            fv.insert("is_connector", 1.0);
        } else {
            fv.insert("is_lowercase", 1.0);
        }
        if STOPWORDS.contains(&lower.as_str()) {
            fv.insert("is_stopword", 1.0);
        }
        let letters = word.chars().filter(|c| c.is_alphabetic()).count();
        if letters > 1 && word.chars().all(|c| c.is_uppercase() || !c.is_alphabetic()) {
            fv.insert("is_all_caps", 1.0);
        }
        if word.chars().skip(1).any(char::is_uppercase) {
            fv.insert("is_mixed_case", 1.0);
        }
    } else if first.is_numeric() {
        fv.insert("is_digit", 1.0);
    } else if first.is_ascii_punctuation() {
        fv.insert("is_punctuation", 1.0);
    } else {
        fv.insert("is_symbol", 1.0);
    }
    if word.contains('_') {
        fv.insert("has_underscore", 1.0);
    }

    // Prefixos e sufixos
    let chars: Vec<char> = lower.chars().collect();
    for n in 2..=4 {
        if chars.len() >= n {
            let prefix: String = chars[..n].iter().collect();
            let suffix: String = chars[chars.len() - n..].iter().collect();
            fv.insert(format!("prefix{n}={prefix}"), 1.0);
            fv.insert(format!("suffix{n}={suffix}"), 1.0);
        }
    }

    // Posição e contexto anterior
    if i == 0 {
        fv.insert("BOS", 1.0);
    } else {
        let prev = &tokens[i - 1];
        fv.insert(format!("prev_word={}", prev.text.to_lowercase()), 1.0);
        if starts_uppercase(&prev.text) {
            fv.insert("prev_is_capitalized", 1.0);
        }
        if matches!(prev.text.as_str(), "." | "!" | "?") {
            fv.insert("after_sentence_end", 1.0);
        }
    }
    if i > 1 {
        fv.insert(format!("prev2_word={}", tokens[i - 2].text.to_lowercase()), 1.0);
    }

    // Contexto seguinte
    if i + 1 < tokens.len() {
        let next = &tokens[i + 1];
        fv.insert(format!("next_word={}", next.text.to_lowercase()), 1.0);
        if starts_uppercase(&next.text) {
            fv.insert("next_is_capitalized", 1.0);
            if fv.contains("is_connector") {
                fv.insert("connector_before_capital", 1.0);
            }
        }
    } else {
        fv.insert("EOS", 1.0);
    }
    if i + 2 < tokens.len() {
        fv.insert(format!("next2_word={}", tokens[i + 2].text.to_lowercase()), 1.0);
    }

    // Gazetteers: só para tokens com maiúscula ou dígito, senão "são" e "rio"
    // minúsculos viram locais
    if word.chars().any(|c| c.is_uppercase() || c.is_numeric()) {
        add_gazetteer_features(&mut fv, &lower, gazetteers);
    }

    fv
}

fn add_gazetteer_features(fv: &mut FeatureVector, lower: &str, gazetteers: &Gazetteers) {
    if gazetteers.persons.contains(lower) {
        fv.insert("in_person_gazetteer", 1.0);
    }
    if gazetteers.locations.contains(lower) {
        fv.insert("in_location_gazetteer", 1.0);
    }
    if gazetteers.organizations.contains(lower) {
        fv.insert("in_org_gazetteer", 1.0);
    }
    if gazetteers.misc.contains(lower) {
        fv.insert("in_misc_gazetteer", 1.0);
    }
}

fn starts_uppercase(text: &str) -> bool {
    text.chars().next().map(char::is_uppercase).unwrap_or(false)
}
