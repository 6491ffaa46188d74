//! # Modelos Pré-treinados
//!
//! Um modelo é distribuído como um [`ModelPackage`]: pesos do CRF mais
//! gazetteers, serializados em JSON. Há dois níveis:
//!
//! | Nível   | Nome              | Conteúdo                          |
//! |---------|-------------------|-----------------------------------|
//! | Large   | `pt_core_news_lg` | pesos CRF + gazetteers PT-BR      |
//! | Small   | `pt_core_news_sm` | mesmos pesos CRF, sem gazetteers  |
//!
//! ## Como os pesos foram derivados
//!
//! Os pesos foram fixados à mão a partir de intuições sobre o português
//! informal: capitalização sugere entidade, mas a primeira palavra de um
//! comentário quase sempre é capitalizada, e stopwords/minúsculas quase nunca
//! são entidades. Essa fragilidade no início da frase é justamente o que as
//! regras de sobrescrita `IGNORE` corrigem.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::crf::CrfModel;
use crate::features::Gazetteers;
use crate::tagger::{EntityCategory, Tag};

/// Versão do formato de [`ModelPackage`] em disco
pub const MODEL_FORMAT_VERSION: u32 = 1;

/// Idioma suportado pelos modelos
pub const MODEL_LANG: &str = "pt";

/// Nível de modelo, em ordem de preferência.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelTier {
    Large,
    Small,
}

impl ModelTier {
    /// Nome canônico do pacote, também usado como nome de arquivo
    pub fn model_name(&self) -> &'static str {
        match self {
            ModelTier::Large => "pt_core_news_lg",
            ModelTier::Small => "pt_core_news_sm",
        }
    }

    /// Ordem de tentativa no carregamento: primeiro o maior
    pub fn fallback_order() -> [ModelTier; 2] {
        [ModelTier::Large, ModelTier::Small]
    }
}

impl fmt::Display for ModelTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.model_name())
    }
}

/// Um modelo completo, pronto para ser gravado ou lido como JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelPackage {
    pub name: String,
    pub lang: String,
    pub format_version: u32,
    pub crf: CrfModel,
    #[serde(default)]
    pub gazetteers: Gazetteers,
}

impl ModelPackage {
    /// Constrói o pacote embarcado de um nível.
    pub fn bundled(tier: ModelTier) -> Self {
        let gazetteers = match tier {
            ModelTier::Large => build_gazetteers(),
            ModelTier::Small => Gazetteers::new(),
        };
        Self {
            name: tier.model_name().to_string(),
            lang: MODEL_LANG.to_string(),
            format_version: MODEL_FORMAT_VERSION,
            crf: build_crf_model(),
            gazetteers,
        }
    }

    /// Confere se o pacote pode ser usado como o nível `tier`.
    pub fn check_compatible(&self, tier: ModelTier) -> Result<(), String> {
        if self.name != tier.model_name() {
            return Err(format!(
                "pacote se identifica como '{}', esperado '{}'",
                self.name,
                tier.model_name()
            ));
        }
        if self.lang != MODEL_LANG {
            return Err(format!("idioma '{}' não suportado (esperado '{MODEL_LANG}')", self.lang));
        }
        if self.format_version != MODEL_FORMAT_VERSION {
            return Err(format!(
                "versão de formato {} não suportada (esperada {MODEL_FORMAT_VERSION})",
                self.format_version
            ));
        }
        self.crf.validate()
    }
}

/// Pesos heurísticos do CRF.
///
/// # Intuições
/// - Palavra nos gazetteers de pessoa → `B-PER` muito mais provável (+5.0).
/// - Inicial maiúscula → indício de entidade (+2.8 para `B-PER`), mas no
///   início do comentário a concorrência com `O` é apertada.
/// - Stopword ou palavra minúscula → quase sempre `O`.
/// - "empresa X", "app X" → X tende a ser `ORG`.
fn build_crf_model() -> CrfModel {
    let mut model = CrfModel::new();

    let per_b = Tag::Begin(EntityCategory::Per);
    let org_b = Tag::Begin(EntityCategory::Org);
    let loc_b = Tag::Begin(EntityCategory::Loc);
    let misc_b = Tag::Begin(EntityCategory::Misc);

    // --- Forma da palavra ---
    model.set_emission("is_capitalized", &per_b, 2.8);
    model.set_emission("is_capitalized", &org_b, 1.5);
    model.set_emission("is_capitalized", &loc_b, 1.5);
    model.set_emission("is_capitalized", &misc_b, 0.8);
    model.set_emission("is_capitalized", &Tag::Inside(EntityCategory::Per), 1.5);
    for cat in EntityCategory::ALL {
        if cat != EntityCategory::Per {
            model.set_emission("is_capitalized", &Tag::Inside(cat), 1.0);
        }
    }

    model.set_emission("is_all_caps", &org_b, 1.5);
    model.set_emission("is_all_caps", &loc_b, 1.0);
    model.set_emission("is_all_caps", &misc_b, 0.5);
    model.set_emission("has_underscore", &org_b, 1.0);

    // Conector só continua uma entidade quando vem antes de outra maiúscula
    model.set_emission("is_connector", &Tag::Outside, 1.5);
    for cat in EntityCategory::ALL {
        model.set_emission("is_connector", &Tag::Inside(cat), -1.0);
    }
    for cat in EntityCategory::ALL {
        model.set_emission("connector_before_capital", &Tag::Inside(cat), 2.0);
    }

    // --- Gazetteers ---
    for (feature, cat) in [
        ("in_person_gazetteer", EntityCategory::Per),
        ("in_location_gazetteer", EntityCategory::Loc),
        ("in_org_gazetteer", EntityCategory::Org),
        ("in_misc_gazetteer", EntityCategory::Misc),
    ] {
        model.set_emission(feature, &Tag::Begin(cat), 5.0);
        model.set_emission(feature, &Tag::Inside(cat), 4.5);
    }

    // --- PESSOA (PER) ---
    for (word, weight) in [
        ("presidente", 2.5),
        ("governador", 2.5),
        ("deputado", 2.0),
        ("senador", 2.0),
        ("ministro", 2.0),
        ("juiz", 2.0),
        ("juíza", 2.0),
        ("promotor", 1.8),
        ("delegado", 1.8),
        ("advogado", 1.8),
        ("advogada", 1.8),
        ("dr", 1.8),
        ("dra", 1.8),
        ("ator", 1.5),
        ("atriz", 1.5),
        ("cantor", 1.5),
        ("cantora", 1.5),
    ] {
        model.set_emission(&format!("prev_word={word}"), &per_b, weight);
    }
    model.set_emission("suffix3=nho", &per_b, 1.0);
    model.set_emission("suffix3=nha", &per_b, 1.0);
    for prefix in ["lu", "ma", "jo", "an", "ca", "fe", "ro", "pe", "el", "ri"] {
        model.set_emission(&format!("prefix2={prefix}"), &per_b, 0.3);
    }

    // --- ORGANIZAÇÃO (ORG) ---
    for (word, weight) in [
        ("empresa", 2.0),
        ("app", 1.8),
        ("aplicativo", 1.8),
        ("plataforma", 1.8),
        ("canal", 1.5),
        ("emissora", 2.0),
        ("jornal", 1.8),
        ("site", 1.2),
        ("banco", 2.0),
        ("tribunal", 2.0),
        ("ministério", 2.5),
        ("polícia", 1.5),
        ("universidade", 2.0),
    ] {
        model.set_emission(&format!("prev_word={word}"), &org_b, weight);
    }
    model.set_emission("suffix3=ras", &org_b, 1.8);
    model.set_emission("suffix4=flix", &org_b, 2.0);
    model.set_emission("suffix4=bank", &org_b, 2.0);

    // --- LOCALIZAÇÃO (LOC) ---
    for (word, weight) in [
        ("cidade", 1.8),
        ("estado", 1.8),
        ("presídio", 2.5),
        ("penitenciária", 2.5),
        ("bairro", 2.0),
        ("rua", 2.0),
        ("município", 2.0),
        ("país", 1.8),
        ("em", 0.8),
        ("no", 0.6),
        ("na", 0.6),
        ("de", 0.5),
    ] {
        model.set_emission(&format!("prev_word={word}"), &loc_b, weight);
    }
    model.set_emission("suffix4=ília", &loc_b, 1.5);
    model.set_emission("suffix3=lis", &loc_b, 1.2);
    model.set_emission("suffix3=mbé", &loc_b, 1.0);

    // --- MISC ---
    for (word, weight) in [
        ("série", 2.0),
        ("documentário", 1.5),
        ("filme", 2.0),
        ("caso", 1.2),
        ("operação", 1.5),
        ("lei", 1.5),
        ("programa", 1.5),
    ] {
        model.set_emission(&format!("prev_word={word}"), &misc_b, weight);
    }

    // --- Fora de entidade ---
    model.set_emission("bias", &Tag::Outside, 1.0);
    model.set_emission("BOS", &Tag::Outside, 0.5);
    model.set_emission("after_sentence_end", &Tag::Outside, 0.5);
    model.set_emission("is_stopword", &Tag::Outside, 3.0);
    model.set_emission("is_lowercase", &Tag::Outside, 2.5);
    model.set_emission("is_punctuation", &Tag::Outside, 5.0);
    model.set_emission("is_symbol", &Tag::Outside, 5.0);
    model.set_emission("is_digit", &Tag::Outside, 2.0);

    // =====================================================================
    // PESOS DE TRANSIÇÃO
    // =====================================================================
    let tags = Tag::all();
    for prev in &tags {
        for next in &tags {
            if !Tag::is_valid_transition(prev, next) {
                model.set_transition(prev, next, -8.0);
            }
        }
    }
    for cat in EntityCategory::ALL {
        let b = Tag::Begin(cat);
        let i = Tag::Inside(cat);
        model.set_transition(&b, &i, 4.0);
        model.set_transition(&i, &i, 3.5);
        model.set_transition(&b, &Tag::Outside, 2.0);
        model.set_transition(&i, &Tag::Outside, 2.5);
        model.set_transition(&Tag::Outside, &b, 1.5);
    }
    model.set_transition(&Tag::Outside, &Tag::Outside, 2.5);

    model
}

/// Gazetteers do modelo grande: figuras públicas, lugares, organizações e
/// temas que aparecem em comentários sobre crimes e noticiário brasileiro.
fn build_gazetteers() -> Gazetteers {
    let mut gaz = Gazetteers::new();

    let persons = [
        "Lula", "Bolsonaro", "Dilma", "Rousseff", "Temer", "Haddad", "Alckmin", "Moro",
        "Moraes", "Xandão", "Suzane", "Richthofen", "Nardoni", "Isabella", "Daniel",
        "Cravinhos", "Flordelis", "Elize", "Matsunaga", "Neymar", "Anitta", "Xuxa",
        "Gugu", "Faustão", "Silvio", "Santos", "Ana", "Maria", "João", "José",
        "Pedro", "Paulo", "Lucas", "Marcos", "Carla", "Fernanda", "Juliana",
    ];
    Gazetteers::extend_words(&mut gaz.persons, &persons, 3);

    let locations = [
        "Brasil", "Brasília", "São Paulo", "SP", "Rio de Janeiro", "RJ", "Minas Gerais",
        "Curitiba", "Salvador", "Recife", "Fortaleza", "Manaus", "Belém", "Porto Alegre",
        "Goiânia", "Campinas", "Guarulhos", "Taubaté", "Tremembé", "Vale do Paraíba",
        "Paraná", "Bahia", "Pernambuco", "Japão", "Portugal", "Argentina", "Estados Unidos",
    ];
    Gazetteers::extend_words(&mut gaz.locations, &locations, 2);
    // "de"/"do" são palavras de nomes compostos, não locais
    for connector in ["de", "do"] {
        gaz.locations.remove(connector);
    }

    let organizations = [
        "Netflix", "Globoplay", "Globo", "Record", "SBT", "Band", "Uber", "iFood",
        "Reddit", "Twitter", "Instagram", "TikTok", "YouTube", "Google", "Petrobras",
        "Nubank", "Itaú", "Bradesco", "STF", "STJ", "TJSP", "OAB", "PF", "PM", "MP",
        "Folha", "Estadão", "UOL", "G1", "CNN",
    ];
    Gazetteers::extend_words(&mut gaz.organizations, &organizations, 2);

    let misc = [
        "True Crime", "Lava Jato", "Copa do Mundo", "Carnaval", "Big Brother", "BBB",
        "Linha Direta", "Investigação Criminal",
    ];
    Gazetteers::extend_words(&mut gaz.misc, &misc, 4);

    gaz
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_names_and_order() {
        assert_eq!(ModelTier::Large.model_name(), "pt_core_news_lg");
        assert_eq!(ModelTier::Small.to_string(), "pt_core_news_sm");
        assert_eq!(ModelTier::fallback_order(), [ModelTier::Large, ModelTier::Small]);
    }

    #[test]
    fn test_bundled_packages_are_compatible() {
        for tier in ModelTier::fallback_order() {
            let package = ModelPackage::bundled(tier);
            assert_eq!(package.check_compatible(tier), Ok(()));
        }
    }

    #[test]
    fn test_small_has_no_gazetteers() {
        assert!(ModelPackage::bundled(ModelTier::Small).gazetteers.is_empty());
        let large = ModelPackage::bundled(ModelTier::Large);
        assert!(large.gazetteers.locations.contains("tremembé"));
        assert!(large.gazetteers.organizations.contains("netflix"));
        assert!(!large.gazetteers.locations.contains("de"));
    }

    #[test]
    fn test_incompatible_packages() {
        let package = ModelPackage::bundled(ModelTier::Small);
        assert!(package.check_compatible(ModelTier::Large).is_err());

        let mut english = package.clone();
        english.lang = "en".to_string();
        assert!(english.check_compatible(ModelTier::Small).unwrap_err().contains("idioma"));

        let mut future = package;
        future.format_version = MODEL_FORMAT_VERSION + 1;
        assert!(future.check_compatible(ModelTier::Small).is_err());
    }

    #[test]
    fn test_serialization_is_stable() {
        let first = serde_json::to_string(&ModelPackage::bundled(ModelTier::Large)).unwrap();
        let second = serde_json::to_string(&ModelPackage::bundled(ModelTier::Large)).unwrap();
        assert_eq!(first, second);

        let persons = &ModelPackage::bundled(ModelTier::Large).gazetteers.persons;
        let sorted: Vec<&String> = persons.iter().collect();
        assert!(sorted.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_json_roundtrip_preserves_weights() {
        let package = ModelPackage::bundled(ModelTier::Large);
        let json = serde_json::to_string(&package).unwrap();
        let back: ModelPackage = serde_json::from_str(&json).unwrap();
        assert_eq!(back, package);
    }
}
