//! # Normalizador de Comentários
//!
//! Limpa comentários curtos de redes sociais antes da extração de entidades,
//! preservando o que carrega sinal: emojis e as palavras de hashtags/menções.
//!
//! ## Etapas (ordem fixa)
//!
//! 1. Remove links (`http://...`, `https://...`, `www....`).
//! 2. Remove só os marcadores `@` e `#` (`#justiça` → `justiça`). Se isso
//!    formar um link (`http@s://...`), ele também sai.
//! 3. Remove risadas: palavras inteiras como `kkkk`, `rsrs`, `hahaha`, `huahua`.
//! 4. Reduz pontuação repetida (`!!!!` → `!`, `??` → `?`).
//! 5. Colapsa espaços e quebras de linha e apara as bordas.
//!
//! Só a última etapa depende de verdade da ordem: as anteriores deixam
//! buracos que ela fecha. A palavra depois de um marcador é mantida, a não
//! ser que ela própria seja uma risada (`@kkk` some inteiro).
//!
//! ```rust
//! use comentarios_core::normalizer::clean_text;
//!
//! let limpo = clean_text("Vi no link https://reddit.com/r/crime kkkkkk #elizematsunaga");
//! assert_eq!(limpo, "Vi no link elizematsunaga");
//! ```

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static DEFAULT_NORMALIZER: Lazy<Normalizer> = Lazy::new(Normalizer::new);

/// Links não carregam conteúdo linguístico
const URL_PATTERN: &str = r"https?://\S+|www\.\S+";
/// Risadas como palavras inteiras, sem diferenciar maiúsculas
const LAUGHTER_PATTERN: &str = r"(?i)\b(?:k+|r+|s+|(?:rs)+|(?:ha)+|(?:hua)+)\b";
/// Sequências de pontuação; a deduplicação é feita no replacer
const PUNCTUATION_RUN_PATTERN: &str = r"[!?,.]{2,}";
const WHITESPACE_PATTERN: &str = r"\s+";

/// Normalizador com as expressões regulares pré-compiladas.
///
/// Compilar uma vez e reutilizar evita recriar os autômatos a cada comentário.
/// É `Send + Sync`, então uma instância pode ser compartilhada entre threads.
#[derive(Debug, Clone)]
pub struct Normalizer {
    url: Regex,
    laughter: Regex,
    punctuation_run: Regex,
    whitespace: Regex,
}

impl Normalizer {
    pub fn new() -> Self {
        Self {
            url: Regex::new(URL_PATTERN).expect("padrão de URL válido"),
            laughter: Regex::new(LAUGHTER_PATTERN).expect("padrão de risadas válido"),
            punctuation_run: Regex::new(PUNCTUATION_RUN_PATTERN).expect("padrão de pontuação válido"),
            whitespace: Regex::new(WHITESPACE_PATTERN).expect("padrão de espaços válido"),
        }
    }

    /// Aplica as cinco etapas, em ordem, e devolve o texto limpo.
    pub fn clean(&self, raw: &str) -> String {
        let text = self.url.replace_all(raw, "");
        let text = text.replace(['@', '#'], "");
        let text = self.url.replace_all(&text, "");
        let text = self.laughter.replace_all(&text, "");
        let text = self
            .punctuation_run
            .replace_all(&text, |caps: &Captures| collapse_repeats(&caps[0]));
        let text = self.whitespace.replace_all(&text, " ");
        text.trim().to_string()
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Limpa o texto usando uma instância compartilhada de [`Normalizer`].
pub fn clean_text(raw: &str) -> String {
    DEFAULT_NORMALIZER.clean(raw)
}

/// "!!!??" → "!?": remove só repetições consecutivas do mesmo caractere
fn collapse_repeats(run: &str) -> String {
    let mut out = String::with_capacity(run.len());
    let mut prev = None;
    for ch in run.chars() {
        if prev != Some(ch) {
            out.push(ch);
        }
        prev = Some(ch);
    }
    out
}
