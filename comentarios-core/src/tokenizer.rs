//! # Tokenizador para comentários em Português
//!
//! Divide o texto limpo em tokens (palavras, pontuação, emojis) preservando a
//! posição original de cada um em bytes. Tanto as regras de sobrescrita quanto
//! o modelo estatístico enxergam exatamente os mesmos tokens, o que garante que
//! uma frase literal como "Elize Matsunaga" seja comparada token a token.
//!
//! ## Esquema
//!
//! - Palavras: sequências alfanuméricas. `_` só continua uma palavra quando
//!   vem seguido de outro caractere alfanumérico (`justiça_br`). Hífen e
//!   apóstrofo separam: `Elize-Matsunaga` vira `Elize`, `-`, `Matsunaga`, e
//!   uma regra para "Elize" continua casando.
//! - Números: `.` e `,` entre dígitos ficam dentro do token (`1.234`, `2,5`).
//! - Demais símbolos viram um token por grafema, de modo que emojis compostos
//!   (👩‍⚖️, 👍🏽) não são quebrados.
//!
//! ```rust
//! use comentarios_core::tokenizer::tokenize;
//!
//! let tokens = tokenize("Cadê a @justiça_br? 😱");
//! let texts: Vec<&str> = tokens.iter().map(|t| t.text.as_str()).collect();
//! assert_eq!(texts, ["Cadê", "a", "@", "justiça_br", "?", "😱"]);
//! ```

use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

/// Um token extraído do texto.
///
/// `start` e `end` são offsets de byte no texto de entrada, o que permite
/// recortar o trecho exato de uma entidade com múltiplos tokens.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Token {
    /// O texto do token (ex: "Elize", "!", "😱").
    pub text: String,
    /// Índice de byte inicial (inclusive).
    pub start: usize,
    /// Índice de byte final (exclusivo).
    pub end: usize,
    /// Posição sequencial do token (0, 1, 2...).
    pub index: usize,
}

/// Caracteres que unem duas partes de uma mesma palavra (perfis: `justiça_br`)
const JOINERS: &[char] = &['_'];

/// Separadores aceitos dentro de números
const NUMBER_SEPARATORS: &[char] = &['.', ','];

/// Tokeniza o texto.
pub fn tokenize(text: &str) -> Vec<Token> {
    let graphemes: Vec<(usize, &str)> = text.grapheme_indices(true).collect();
    let mut tokens = Vec::new();
    let mut word_start: Option<usize> = None;

    for (i, &(pos, grapheme)) in graphemes.iter().enumerate() {
        let first = grapheme.chars().next().unwrap_or(' ');

        if first.is_alphanumeric() {
            word_start.get_or_insert(pos);
            continue;
        }

        if let Some(start) = word_start {
            let next_alnum = graphemes
                .get(i + 1)
                .and_then(|(_, g)| g.chars().next())
                .map(char::is_alphanumeric)
                .unwrap_or(false);
            let prev_digit = text[start..pos]
                .chars()
                .next_back()
                .map(|c| c.is_ascii_digit())
                .unwrap_or(false);
            let next_digit = graphemes
                .get(i + 1)
                .and_then(|(_, g)| g.chars().next())
                .map(|c| c.is_ascii_digit())
                .unwrap_or(false);

            let joins_word = JOINERS.contains(&first) && next_alnum;
            let joins_number = NUMBER_SEPARATORS.contains(&first) && prev_digit && next_digit;
            if joins_word || joins_number {
                continue;
            }

            push_token(&mut tokens, text, start, pos);
            word_start = None;
        }

        if !grapheme.chars().all(char::is_whitespace) {
            push_token(&mut tokens, text, pos, pos + grapheme.len());
        }
    }

    if let Some(start) = word_start {
        push_token(&mut tokens, text, start, text.len());
    }

    tokens
}

/// Adiciona o token `text[start..end]` com o próximo índice sequencial
fn push_token(tokens: &mut Vec<Token>, text: &str, start: usize, end: usize) {
    let index = tokens.len();
    tokens.push(Token {
        text: text[start..end].to_string(),
        start,
        end,
        index,
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(input: &str) -> Vec<String> {
        tokenize(input).into_iter().map(|t| t.text).collect()
    }

    #[test]
    fn test_basic_words_and_punctuation() {
        assert_eq!(
            texts("A empresa Uber deveria banir motoristas!"),
            ["A", "empresa", "Uber", "deveria", "banir", "motoristas", "!"]
        );
    }

    #[test]
    fn test_underscore_handle_stays_whole() {
        assert_eq!(texts("justiça_br fiquem"), ["justiça_br", "fiquem"]);
    }

    #[test]
    fn test_hyphen_and_apostrophe_split_words() {
        assert_eq!(texts("Elize-Matsunaga"), ["Elize", "-", "Matsunaga"]);
        assert_eq!(texts("A Uber's app"), ["A", "Uber", "'", "s", "app"]);
        assert_eq!(texts("d\u{2019}água"), ["d", "\u{2019}", "água"]);
    }

    #[test]
    fn test_trailing_joiner_is_separate() {
        assert_eq!(texts("rio- abaixo"), ["rio", "-", "abaixo"]);
    }

    #[test]
    fn test_numbers_keep_separators() {
        assert_eq!(texts("subiu 2,5% em 1.234 dias."), ["subiu", "2,5", "%", "em", "1.234", "dias", "."]);
    }

    #[test]
    fn test_emoji_is_single_token() {
        let tokens = tokenize("motorista de app? 👩‍⚖️😱");
        let last_two: Vec<&str> = tokens[tokens.len() - 2..].iter().map(|t| t.text.as_str()).collect();
        assert_eq!(last_two, ["👩‍⚖️", "😱"]);
    }

    #[test]
    fn test_offsets_and_indices() {
        let text = "Vi a Elize";
        let tokens = tokenize(text);
        assert_eq!(tokens.len(), 3);
        for (i, token) in tokens.iter().enumerate() {
            assert_eq!(token.index, i);
            assert_eq!(&text[token.start..token.end], token.text);
        }
    }

    #[test]
    fn test_empty_input() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("   \n ").is_empty());
    }
}
