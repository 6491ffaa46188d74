//! # comentarios — Linha de Comando
//!
//! Carrega o modelo (grande, com fallback para o pequeno), limpa cada
//! comentário e lista as entidades encontradas.
//!
//! ```text
//! comentarios                                   # comentários de demonstração
//! comentarios "A empresa Uber!!!" --json        # comentários na linha de comando
//! comentarios analyze --input comentarios.txt   # um comentário por linha
//! comentarios export-model --dir ./modelos      # grava os modelos embarcados
//! ```
//!
//! Logs vão para stderr (`RUST_LOG` ajusta o nível); stdout fica só com os
//! resultados.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use comentarios_core::corpus::demo_comments;
use comentarios_core::{
    export_bundled, load_with_fallback, BuiltinRegistry, CommentAnalysis, CommentPipeline, ConfigError,
    DirectoryRegistry, EntityExtractor, LoadedModel, OverrideRules,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "comentarios")]
#[command(version)]
#[command(about = "Limpa comentários de redes sociais e identifica as entidades citadas")]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    #[command(flatten)]
    analyze: AnalyzeArgs,
}

#[derive(Subcommand)]
enum Command {
    /// Analisa comentários (comando padrão)
    Analyze(AnalyzeArgs),
    /// Grava os modelos embarcados como JSON em um diretório
    ExportModel {
        #[arg(long)]
        dir: PathBuf,
    },
}

#[derive(Args, Debug, Default)]
struct AnalyzeArgs {
    /// Arquivo com um comentário por linha
    #[arg(long, short)]
    input: Option<PathBuf>,

    /// Saída em JSON, um objeto por linha
    #[arg(long)]
    json: bool,

    /// Diretório com pt_core_news_lg.json / pt_core_news_sm.json
    #[arg(long, env = "COMENTARIOS_MODEL_DIR")]
    model_dir: Option<PathBuf>,

    /// Regras de sobrescrita em JSON (padrão: regras embarcadas)
    #[arg(long, env = "COMENTARIOS_RULES")]
    rules: Option<PathBuf>,

    /// Comentários a analisar
    comments: Vec<String>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let outcome = match cli.command {
        Some(Command::ExportModel { dir }) => export(dir),
        Some(Command::Analyze(args)) => analyze(args),
        None => analyze(cli.analyze),
    };

    if let Err(err) = outcome {
        eprintln!("erro: {err:#}");
        if let Some(config) = err.downcast_ref::<ConfigError>() {
            eprintln!("{}", config.hint());
        }
        std::process::exit(1);
    }
}

fn export(dir: PathBuf) -> Result<()> {
    let written = export_bundled(&dir).with_context(|| format!("falha ao exportar modelos para {}", dir.display()))?;
    for path in written {
        println!("{}", path.display());
    }
    Ok(())
}

fn analyze(args: AnalyzeArgs) -> Result<()> {
    // O modelo vem antes de tudo: sem ele nenhum comentário é processado
    let model = load_model(&args)?;

    let rules = match &args.rules {
        Some(path) => OverrideRules::from_json_file(path)
            .with_context(|| format!("regras inválidas em {}", path.display()))?,
        None => OverrideRules::default_rules(),
    };
    let rule_count = rules.len();
    let pipeline = CommentPipeline::new(EntityExtractor::with_overrides(model.recognizer, rules));
    info!(
        rules = rule_count,
        tier = %model.tier,
        recognizer = pipeline.extractor().recognizer_name(),
        "pipeline pronto"
    );

    let comments = collect_comments(&args)?;
    let results = pipeline.analyze_batch(&comments);

    for analysis in &results {
        if args.json {
            println!("{}", serde_json::to_string(analysis)?);
        } else {
            print!("{}", render(analysis));
        }
    }
    Ok(())
}

fn load_model(args: &AnalyzeArgs) -> Result<LoadedModel, ConfigError> {
    match &args.model_dir {
        Some(dir) => load_with_fallback(&DirectoryRegistry::new(dir)),
        None => load_with_fallback(&BuiltinRegistry::new()),
    }
}

/// Ordem de prioridade: arquivo, argumentos, demonstração.
fn collect_comments(args: &AnalyzeArgs) -> Result<Vec<String>> {
    if let Some(path) = &args.input {
        let raw = fs::read_to_string(path).with_context(|| format!("não foi possível ler {}", path.display()))?;
        return Ok(raw
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(str::to_string)
            .collect());
    }
    if !args.comments.is_empty() {
        return Ok(args.comments.clone());
    }
    Ok(demo_comments().into_iter().map(str::to_string).collect())
}

fn render(analysis: &CommentAnalysis) -> String {
    let rule = "=".repeat(60);
    let mut out = format!("\n{rule}\n");
    out.push_str(&format!("📝 ORIGINAL: {}\n", analysis.original));
    out.push_str(&format!("🧹 LIMPO:    {}\n", analysis.cleaned));
    out.push_str(&format!("{}\n", "-".repeat(60)));
    out.push_str("🔍 ENTIDADES DETECTADAS:\n");
    if analysis.entities.is_empty() {
        out.push_str("   (Nenhuma entidade relevante encontrada)\n");
    }
    for entity in &analysis.entities {
        out.push_str(&format!("   • {:<20} | Tipo: {}\n", entity.text, entity.label));
    }
    out.push_str(&format!("{rule}\n"));
    out
}
