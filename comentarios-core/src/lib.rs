//! # comentarios-core — Anotação de Entidades em Comentários (PT-BR)
//!
//! Limpa comentários informais de redes sociais e identifica pessoas, locais,
//! organizações e temas citados neles.
//!
//! ## Arquitetura
//!
//! 1.  **Normalização** ([`normalizer`]): remove links, `@`/`#`, risadas
//!     ("kkkk", "rsrs") e pontuação repetida.
//! 2.  **Tokenização** ([`tokenizer`]): segmenta o texto limpo preservando offsets.
//! 3.  **Regras de sobrescrita** ([`rules`]): frases literais com rótulo fixo,
//!     aplicadas antes do modelo. O rótulo `IGNORE` suprime falsos positivos.
//! 4.  **Modelo estatístico** ([`recognizer`]): CRF + Viterbi sobre as
//!     [`features`], carregado via [`registry`] com fallback do modelo grande
//!     para o pequeno.
//! 5.  **Extração** ([`extractor`]): junta regras e modelo, sem deixar o
//!     modelo reclassificar o que uma regra já reivindicou.
//!
//! ## Exemplo de Uso
//!
//! ```rust
//! use comentarios_core::{
//!     load_with_fallback, BuiltinRegistry, CommentPipeline, EntityExtractor, EntityLabel,
//!     OverrideRules,
//! };
//!
//! let model = load_with_fallback(&BuiltinRegistry::new()).expect("modelo embarcado");
//! let extractor = EntityExtractor::with_overrides(model.recognizer, OverrideRules::default_rules());
//! let pipeline = CommentPipeline::new(extractor);
//!
//! let analysis = pipeline.analyze("A empresa Uber deveria banir motoristas!!!!!");
//! assert_eq!(analysis.cleaned, "A empresa Uber deveria banir motoristas!");
//! assert!(analysis
//!     .entities
//!     .iter()
//!     .any(|e| e.text == "Uber" && e.label == EntityLabel::Organization));
//! ```

pub mod corpus;
pub mod crf;
pub mod error;
pub mod extractor;
pub mod features;
pub mod model;
pub mod normalizer;
pub mod pipeline;
pub mod recognizer;
pub mod registry;
pub mod rules;
pub mod tagger;
pub mod tokenizer;
pub mod viterbi;

pub use error::{ConfigError, ModelError, RulesError};
pub use extractor::{EntityExtractor, EntityMatch, MatchSource};
pub use model::{ModelPackage, ModelTier};
pub use normalizer::{clean_text, Normalizer};
pub use pipeline::{CommentAnalysis, CommentPipeline};
pub use recognizer::{CrfRecognizer, StatisticalRecognizer};
pub use registry::{export_bundled, load_with_fallback, BuiltinRegistry, DirectoryRegistry, LoadedModel, ModelRegistry};
pub use rules::{OverrideRule, OverrideRules};
pub use tagger::{EntityCategory, EntityLabel, Tag};
pub use tokenizer::{tokenize, Token};
