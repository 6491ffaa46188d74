//! # Rótulos de Entidade e Esquema BIO
//!
//! Dois vocabulários convivem aqui:
//!
//! - [`EntityCategory`]: as quatro classes que o modelo estatístico sabe prever
//!   (PER, ORG, LOC, MISC), usadas nas tags BIO.
//! - [`EntityLabel`]: o vocabulário das regras de sobrescrita e da saída, que
//!   acrescenta o pseudo-rótulo `IGNORE`, usado só para suprimir falsos
//!   positivos e nunca exibido.
//!
//! | Código | Significado      | Exemplos                       |
//! |--------|------------------|--------------------------------|
//! | PER    | Pessoa           | Elize Matsunaga                |
//! | ORG    | Organização      | Netflix, Uber                  |
//! | LOC    | Local            | Tremembé, SP                   |
//! | MISC   | Miscelânea       | True Crime                     |
//! | IGNORE | Suprimido        | Vi, Acho, Gente                |
//!
//! ## Esquema BIO
//!
//! - `B-TAG`: primeiro token de uma entidade
//! - `I-TAG`: tokens seguintes da mesma entidade
//! - `O`: fora de entidade

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::tokenizer::Token;

/// Categorias que o reconhecedor estatístico consegue prever.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityCategory {
    /// Pessoa. Ex: "Elize Matsunaga".
    Per,
    /// Organização. Ex: "Netflix", "STF".
    Org,
    /// Local. Ex: "Tremembé", "São Paulo".
    Loc,
    /// Miscelânea: eventos, obras, gêneros. Ex: "True Crime".
    Misc,
}

impl EntityCategory {
    /// Todas as categorias em ordem fixa
    pub const ALL: [EntityCategory; 4] = [
        EntityCategory::Per,
        EntityCategory::Org,
        EntityCategory::Loc,
        EntityCategory::Misc,
    ];

    fn position(&self) -> usize {
        match self {
            EntityCategory::Per => 0,
            EntityCategory::Org => 1,
            EntityCategory::Loc => 2,
            EntityCategory::Misc => 3,
        }
    }

    /// Código curto da categoria ("PER", "ORG", ...)
    pub fn code(&self) -> &'static str {
        match self {
            EntityCategory::Per => "PER",
            EntityCategory::Org => "ORG",
            EntityCategory::Loc => "LOC",
            EntityCategory::Misc => "MISC",
        }
    }

    /// Parseia a partir do código (ex: "PER" → Some(Per))
    pub fn from_code(s: &str) -> Option<Self> {
        match s {
            "PER" => Some(EntityCategory::Per),
            "ORG" => Some(EntityCategory::Org),
            "LOC" => Some(EntityCategory::Loc),
            "MISC" => Some(EntityCategory::Misc),
            _ => None,
        }
    }
}

/// Rótulo final de uma entidade, incluindo o pseudo-rótulo de supressão.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityLabel {
    #[serde(rename = "PER")]
    Person,
    #[serde(rename = "LOC")]
    Location,
    #[serde(rename = "ORG")]
    Organization,
    #[serde(rename = "MISC")]
    Miscellaneous,
    /// Marca trechos que o modelo costuma confundir com nomes próprios.
    /// Entidades com este rótulo são calculadas, mas nunca devolvidas.
    #[serde(rename = "IGNORE", alias = "IGNORAR")]
    Ignore,
}

impl EntityLabel {
    pub fn code(&self) -> &'static str {
        match self {
            EntityLabel::Person => "PER",
            EntityLabel::Location => "LOC",
            EntityLabel::Organization => "ORG",
            EntityLabel::Miscellaneous => "MISC",
            EntityLabel::Ignore => "IGNORE",
        }
    }

    pub fn from_code(s: &str) -> Option<Self> {
        match s {
            "IGNORE" | "IGNORAR" => Some(EntityLabel::Ignore),
            other => EntityCategory::from_code(other).map(EntityLabel::from),
        }
    }

    /// `false` apenas para [`EntityLabel::Ignore`]
    pub fn is_visible(&self) -> bool {
        !matches!(self, EntityLabel::Ignore)
    }
}

impl From<EntityCategory> for EntityLabel {
    fn from(cat: EntityCategory) -> Self {
        match cat {
            EntityCategory::Per => EntityLabel::Person,
            EntityCategory::Org => EntityLabel::Organization,
            EntityCategory::Loc => EntityLabel::Location,
            EntityCategory::Misc => EntityLabel::Miscellaneous,
        }
    }
}

impl fmt::Display for EntityLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Tag BIO aplicada a um token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tag {
    /// Início de uma entidade. Ex: **Elize** (B-PER) Matsunaga.
    Begin(EntityCategory),
    /// Continuação de uma entidade. Ex: Elize **Matsunaga** (I-PER).
    Inside(EntityCategory),
    /// Fora de entidade.
    Outside,
}

impl Tag {
    /// Representação textual da tag (ex: "B-PER", "I-ORG", "O")
    pub fn label(&self) -> String {
        match self {
            Tag::Begin(cat) => format!("B-{}", cat.code()),
            Tag::Inside(cat) => format!("I-{}", cat.code()),
            Tag::Outside => "O".to_string(),
        }
    }

    /// Posição da tag nas matrizes do CRF: `O` = 0, depois `B-X`/`I-X` de
    /// cada categoria na ordem de [`EntityCategory::ALL`].
    pub fn index(&self) -> usize {
        match self {
            Tag::Outside => 0,
            Tag::Begin(cat) => 1 + 2 * cat.position(),
            Tag::Inside(cat) => 2 + 2 * cat.position(),
        }
    }

    pub const COUNT: usize = 1 + 2 * EntityCategory::ALL.len();

    /// Todas as tags, na ordem de [`Tag::index`]
    pub fn all() -> [Tag; Tag::COUNT] {
        let mut tags = [Tag::Outside; Tag::COUNT];
        for cat in EntityCategory::ALL {
            tags[Tag::Begin(cat).index()] = Tag::Begin(cat);
            tags[Tag::Inside(cat).index()] = Tag::Inside(cat);
        }
        tags
    }

    pub fn category(&self) -> Option<EntityCategory> {
        match self {
            Tag::Begin(c) | Tag::Inside(c) => Some(*c),
            Tag::Outside => None,
        }
    }

    /// `I-X` só pode seguir `B-X` ou `I-X`; o resto é sempre válido.
    pub fn is_valid_transition(prev: &Tag, next: &Tag) -> bool {
        match next {
            Tag::Inside(cat) => match prev {
                Tag::Begin(prev_cat) | Tag::Inside(prev_cat) => prev_cat == cat,
                _ => false,
            },
            _ => true,
        }
    }

    /// Parseia uma tag a partir de string (ex: "B-PER" → Begin(Per))
    pub fn from_label(s: &str) -> Option<Self> {
        if s == "O" {
            return Some(Tag::Outside);
        }
        let (prefix, code) = s.split_once('-')?;
        let cat = EntityCategory::from_code(code)?;
        match prefix {
            "B" => Some(Tag::Begin(cat)),
            "I" => Some(Tag::Inside(cat)),
            _ => None,
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Um token com sua tag BIO e a confiança do modelo
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaggedToken {
    pub token: Token,
    pub tag: Tag,
    /// Probabilidade desta atribuição (0.0 a 1.0)
    pub confidence: f64,
}

/// Uma entidade prevista pelo modelo (um ou mais tokens)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntitySpan {
    /// Texto da entidade (ex: "São Paulo")
    pub text: String,
    pub category: EntityCategory,
    /// Índice do primeiro token
    pub start_token: usize,
    /// Índice do último token (inclusivo)
    pub end_token: usize,
    /// Byte inicial no texto analisado
    pub start: usize,
    /// Byte final no texto analisado
    pub end: usize,
    /// Confiança média dos tokens
    pub confidence: f64,
}

/// Converte uma sequência de tokens classificados (BIO) em entidades.
///
/// - Abre uma entidade em `B-X`.
/// - Estende enquanto encontrar `I-X` da mesma categoria.
/// - Fecha em `O`, `B-Y` ou `I-Y` de outra categoria.
///
/// Um `I-X` sem `B-X` antes é descartado.
///
/// # Exemplo
/// `[B-PER, I-PER, O, B-LOC]` -> `[EntitySpan(PER), EntitySpan(LOC)]`
pub fn tokens_to_spans(tagged: &[TaggedToken], original_text: &str) -> Vec<EntitySpan> {
    let mut spans = Vec::new();
    // Entidade aberta: (categoria, primeiro token, último token, soma das confianças)
    let mut open: Option<(EntityCategory, &TaggedToken, &TaggedToken, f64)> = None;

    for current in tagged {
        match (current.tag, open.as_mut()) {
            (Tag::Inside(cat), Some((open_cat, _, last, conf))) if *open_cat == cat => {
                *last = current;
                *conf += current.confidence;
                continue;
            }
            _ => {}
        }
        if let Some(entity) = open.take() {
            spans.push(close_span(entity, original_text));
        }
        if let Tag::Begin(cat) = current.tag {
            open = Some((cat, current, current, current.confidence));
        }
    }
    if let Some(entity) = open {
        spans.push(close_span(entity, original_text));
    }

    spans
}

fn close_span(
    (category, first, last, conf_sum): (EntityCategory, &TaggedToken, &TaggedToken, f64),
    original_text: &str,
) -> EntitySpan {
    let (start, end) = (first.token.start, last.token.end);
    let count = last.token.index - first.token.index + 1;
    EntitySpan {
        text: original_text.get(start..end).unwrap_or_default().trim().to_string(),
        category,
        start_token: first.token.index,
        end_token: last.token.index,
        start,
        end,
        confidence: conf_sum / count as f64,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::tokenize;

    #[test]
    fn test_tag_labels() {
        assert_eq!(Tag::Outside.label(), "O");
        assert_eq!(Tag::Begin(EntityCategory::Per).label(), "B-PER");
        assert_eq!(Tag::Inside(EntityCategory::Loc).label(), "I-LOC");
    }

    #[test]
    fn test_valid_transitions() {
        assert!(Tag::is_valid_transition(
            &Tag::Begin(EntityCategory::Per),
            &Tag::Inside(EntityCategory::Per)
        ));
        assert!(!Tag::is_valid_transition(
            &Tag::Outside,
            &Tag::Inside(EntityCategory::Per)
        ));
        assert!(!Tag::is_valid_transition(
            &Tag::Begin(EntityCategory::Org),
            &Tag::Inside(EntityCategory::Per)
        ));
    }

    #[test]
    fn test_tag_from_label() {
        assert_eq!(Tag::from_label("O"), Some(Tag::Outside));
        assert_eq!(Tag::from_label("B-PER"), Some(Tag::Begin(EntityCategory::Per)));
        assert_eq!(Tag::from_label("I-LOC"), Some(Tag::Inside(EntityCategory::Loc)));
        assert_eq!(Tag::from_label("X-LOC"), None);
        assert_eq!(Tag::from_label("B-IGNORE"), None);
    }

    #[test]
    fn test_all_tags_have_unique_indices() {
        let mut indices: Vec<usize> = Tag::all().iter().map(|t| t.index()).collect();
        indices.sort();
        indices.dedup();
        assert_eq!(indices.len(), Tag::COUNT);
    }

    #[test]
    fn test_label_codes() {
        assert_eq!(EntityLabel::from_code("IGNORE"), Some(EntityLabel::Ignore));
        assert_eq!(EntityLabel::from_code("ORG"), Some(EntityLabel::Organization));
        assert_eq!(EntityLabel::from_code("XYZ"), None);
        assert!(!EntityLabel::Ignore.is_visible());
        assert_eq!(EntityLabel::from(EntityCategory::Misc).to_string(), "MISC");
        assert_eq!(serde_json::to_string(&EntityLabel::Location).unwrap(), "\"LOC\"");
    }

    #[test]
    fn test_tokens_to_spans_multiword() {
        let text = "a Elize Matsunaga saiu de Tremembé";
        let tags = [
            Tag::Outside,
            Tag::Begin(EntityCategory::Per),
            Tag::Inside(EntityCategory::Per),
            Tag::Outside,
            Tag::Outside,
            Tag::Begin(EntityCategory::Loc),
        ];
        let tagged: Vec<TaggedToken> = tokenize(text)
            .into_iter()
            .zip(tags)
            .map(|(token, tag)| TaggedToken { token, tag, confidence: 0.8 })
            .collect();

        let spans = tokens_to_spans(&tagged, text);
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0].text, "Elize Matsunaga");
        assert_eq!(spans[0].category, EntityCategory::Per);
        assert_eq!((spans[0].start_token, spans[0].end_token), (1, 2));
        assert_eq!(spans[1].text, "Tremembé");
    }

    #[test]
    fn test_orphan_inside_is_dropped() {
        let text = "motorista Uber";
        let tags = [Tag::Outside, Tag::Inside(EntityCategory::Org)];
        let tagged: Vec<TaggedToken> = tokenize(text)
            .into_iter()
            .zip(tags)
            .map(|(token, tag)| TaggedToken { token, tag, confidence: 1.0 })
            .collect();
        assert!(tokens_to_spans(&tagged, text).is_empty());
    }
}
