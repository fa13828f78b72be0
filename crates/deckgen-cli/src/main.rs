use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use colored::Colorize;

use deck_core::{DetailLevel, GenerationSettings, PresentationStyle, SlideCount};
use deck_pipeline::GenerationService;
use deck_storage::{FileBackend, LocalStore, SettingsPatch};
use gemini_client::validator::ValidationStatus;
use gemini_client::{ApiKeyValidator, GeminiClient};

#[derive(Parser)]
#[command(name = "deckgen")]
#[command(about = "Generate Slidev presentations from a prompt with Gemini")]
#[command(version)]
struct Cli {
    /// Gemini API key; falls back to the stored credential
    #[arg(long, env = "GEMINI_API_KEY")]
    api_key: Option<String>,

    /// Data directory for saved presentations and settings
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Enable debug output
    #[arg(long, short, default_value = "false")]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a presentation: plan first, then full slide content
    Generate {
        /// Topic of the presentation
        prompt: String,

        /// Number of slides: "auto" (5-8) or a number between 1 and 50
        #[arg(long, default_value = "auto")]
        slides: String,

        /// Presentation style: professional, educational, creative,
        /// technical or business
        #[arg(long, default_value = "professional")]
        style: String,

        /// Detail level: concise, balanced or detailed
        #[arg(long, default_value = "balanced")]
        detail: String,

        /// Skip speaker notes in the generated content
        #[arg(long)]
        no_speaker_notes: bool,

        /// Skip the conclusion slide
        #[arg(long)]
        no_conclusion: bool,

        /// Skip the title slide
        #[arg(long)]
        no_title_slide: bool,

        /// Accept the generated plan without asking
        #[arg(long, short)]
        yes: bool,

        /// Write the Slidev deck to this file
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Check the API key format and liveness
    ValidateKey,
    /// Manage saved presentations
    History {
        #[command(subcommand)]
        command: HistoryCommands,
    },
    /// Generate speaker notes for one slide of a saved presentation
    Notes {
        /// Id of the saved presentation
        id: String,
        /// Zero-based slide index
        slide: usize,
    },
    /// Show or change stored settings
    Settings {
        #[command(subcommand)]
        command: SettingsCommands,
    },
}

#[derive(Subcommand)]
enum HistoryCommands {
    /// List saved presentations, most recent first
    List,
    /// Delete a saved presentation
    Delete { id: String },
    /// Export a saved presentation as a Slidev deck
    Export {
        id: String,
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum SettingsCommands {
    /// Print the stored settings
    Show,
    /// Update stored settings
    Set {
        #[arg(long)]
        theme: Option<String>,
        #[arg(long)]
        auto_save: Option<bool>,
        #[arg(long)]
        max_history: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let data_dir = cli.data_dir.clone().unwrap_or_else(default_data_dir);
    if cli.debug {
        eprintln!("{}", format!("[DEBUG] Data dir: {}", data_dir.display()).dimmed());
    }

    let store = Arc::new(LocalStore::open(FileBackend::new(&data_dir)).await?);

    match cli.command {
        Commands::Generate {
            prompt,
            slides,
            style,
            detail,
            no_speaker_notes,
            no_conclusion,
            no_title_slide,
            yes,
            output,
        } => {
            let settings = build_settings(
                &slides,
                &style,
                &detail,
                no_speaker_notes,
                no_conclusion,
                no_title_slide,
            )?;
            let api_key = resolve_api_key(cli.api_key, &store).await?;
            let service = GenerationService::new(GeminiClient::new(api_key), store);
            run_generate(&service, &prompt, settings, yes, output).await
        }
        Commands::ValidateKey => {
            let api_key = resolve_api_key(cli.api_key, &store).await?;
            run_validate_key(&api_key, &store).await
        }
        Commands::History { command } => run_history(command, store).await,
        Commands::Notes { id, slide } => {
            let api_key = resolve_api_key(cli.api_key, &store).await?;
            let service = GenerationService::new(GeminiClient::new(api_key), store);
            run_notes(&service, &id, slide).await
        }
        Commands::Settings { command } => run_settings(command, &store).await,
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("deckgen")
}

/// Key resolution order: flag / environment, then the stored credential.
async fn resolve_api_key(
    from_args: Option<String>,
    store: &LocalStore<FileBackend>,
) -> anyhow::Result<String> {
    if let Some(key) = from_args {
        return Ok(key);
    }
    let stored = store.load_credential().await;
    if stored.is_empty() {
        bail!(
            "no API key configured - pass --api-key, set GEMINI_API_KEY, \
             or run `deckgen validate-key` once with a key to store it"
        );
    }
    Ok(stored)
}

fn build_settings(
    slides: &str,
    style: &str,
    detail: &str,
    no_speaker_notes: bool,
    no_conclusion: bool,
    no_title_slide: bool,
) -> anyhow::Result<GenerationSettings> {
    let mut settings = GenerationSettings {
        generate_speaker_notes: !no_speaker_notes,
        include_conclusion: !no_conclusion,
        include_title_slide: !no_title_slide,
        presentation_style: parse_enum::<PresentationStyle>(style, "style")?,
        detail_level: parse_enum::<DetailLevel>(detail, "detail")?,
        ..GenerationSettings::default()
    };

    if slides != "auto" {
        let count: u8 = slides
            .parse()
            .with_context(|| format!("invalid slide count {slides:?}"))?;
        if !settings.set_slide_count(count) {
            bail!("slide count must be between 1 and 50 (got {count})");
        }
    } else {
        settings.slide_count = SlideCount::Auto;
    }
    Ok(settings)
}

/// Parse a lowercase CLI word through the enum's serde representation.
fn parse_enum<T: serde::de::DeserializeOwned>(value: &str, what: &str) -> anyhow::Result<T> {
    serde_json::from_value(serde_json::Value::String(value.to_string()))
        .with_context(|| format!("invalid {what} {value:?}"))
}

async fn run_generate(
    service: &GenerationService<FileBackend>,
    prompt: &str,
    settings: GenerationSettings,
    yes: bool,
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    service.set_prompt(prompt).await;
    service.set_settings(settings).await;

    println!("{}", "Generating plan...".cyan());
    if service.generate_plan().await.is_err() {
        bail_with_service_error(service).await?;
    }

    let snapshot = service.snapshot().await;
    println!(
        "\n{} {}",
        "Plan:".bold(),
        snapshot.title.as_str().bold().green()
    );
    for (index, entry) in snapshot.plan.iter().enumerate() {
        println!("  {}. {} - {}", index + 1, entry.title.bold(), entry.description);
    }

    if !yes && !confirm("\nGenerate slides from this plan?")? {
        println!("Aborted. The plan was not turned into slides.");
        return Ok(());
    }

    println!("{}", "Generating slide content...".cyan());
    if service.generate_content().await.is_err() {
        bail_with_service_error(service).await?;
    }

    let (filename, deck) = service
        .export_deck()
        .await
        .context("generation produced no slides")?;
    let path = output.unwrap_or_else(|| PathBuf::from(filename));
    std::fs::write(&path, deck)
        .with_context(|| format!("failed to write {}", path.display()))?;

    let slide_count = service.snapshot().await.slides.len();
    println!(
        "{} {} slides written to {}",
        "Done:".green().bold(),
        slide_count,
        path.display()
    );
    if service.store().settings().await.auto_save {
        if let Some(saved) = service.store().presentations().await.first() {
            println!("Saved to history as {}", saved.id.dimmed());
        }
    }
    Ok(())
}

async fn run_validate_key(
    api_key: &str,
    store: &LocalStore<FileBackend>,
) -> anyhow::Result<()> {
    let validator = ApiKeyValidator::new();
    validator.validate_now(api_key).await;
    let state = validator.state().await;

    match state.status {
        ValidationStatus::Valid => {
            println!("{} {}", "✓".green(), state.message);
            // A validated key is reused across sessions.
            store.save_credential(api_key).await;
            Ok(())
        }
        _ => {
            println!("{} {}", "✗".red(), state.message);
            std::process::exit(1);
        }
    }
}

async fn run_history(
    command: HistoryCommands,
    store: Arc<LocalStore<FileBackend>>,
) -> anyhow::Result<()> {
    match command {
        HistoryCommands::List => {
            let presentations = store.presentations().await;
            if presentations.is_empty() {
                println!("No saved presentations.");
                return Ok(());
            }
            for p in presentations {
                println!(
                    "{}  {}  {} slides  {}",
                    p.id.dimmed(),
                    p.title.bold(),
                    p.slides.len(),
                    p.updated_at.format("%Y-%m-%d %H:%M")
                );
            }
            Ok(())
        }
        HistoryCommands::Delete { id } => {
            store.delete_presentation(&id).await?;
            println!("Deleted {id} (if it existed).");
            Ok(())
        }
        HistoryCommands::Export { id, output } => {
            let stored = store
                .load_presentation(&id)
                .await
                .with_context(|| format!("no saved presentation with id {id}"))?;
            let deck = slidev_export::render_deck(&stored.slides, &stored.title);
            let path =
                output.unwrap_or_else(|| PathBuf::from(slidev_export::export_filename(&stored.title)));
            std::fs::write(&path, deck)
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!("Exported {} to {}", stored.title.bold(), path.display());
            Ok(())
        }
    }
}

async fn run_notes(
    service: &GenerationService<FileBackend>,
    id: &str,
    slide: usize,
) -> anyhow::Result<()> {
    if !service.load_presentation(id).await {
        bail!("no saved presentation with id {id}");
    }

    let snapshot = service.snapshot().await;
    let Some(target) = snapshot.slides.get(slide) else {
        bail!(
            "slide index {slide} out of range (deck has {} slides)",
            snapshot.slides.len()
        );
    };
    if target.has_notes() {
        println!("Slide {slide} already has speaker notes:\n");
        println!("{}", target.speaker_notes.as_deref().unwrap_or_default());
        return Ok(());
    }

    println!("{}", "Generating speaker notes...".cyan());
    let notes = service.generate_speaker_notes(slide).await;
    println!("\n{}\n\n{notes}", format!("Notes for slide {slide}:").bold());
    Ok(())
}

async fn run_settings(
    command: SettingsCommands,
    store: &LocalStore<FileBackend>,
) -> anyhow::Result<()> {
    match command {
        SettingsCommands::Show => {
            let settings = store.settings().await;
            println!("{}", serde_json::to_string_pretty(&settings)?);
            Ok(())
        }
        SettingsCommands::Set {
            theme,
            auto_save,
            max_history,
        } => {
            let settings = store
                .save_settings(SettingsPatch {
                    theme,
                    auto_save,
                    max_history,
                })
                .await?;
            println!("{}", serde_json::to_string_pretty(&settings)?);
            Ok(())
        }
    }
}

async fn bail_with_service_error(
    service: &GenerationService<FileBackend>,
) -> anyhow::Result<()> {
    let message = service
        .last_error()
        .await
        .unwrap_or_else(|| "generation failed".to_string());
    bail!("{message}");
}

fn confirm(question: &str) -> anyhow::Result<bool> {
    print!("{question} [Y/n] ");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    let answer = line.trim().to_ascii_lowercase();
    Ok(answer.is_empty() || answer == "y" || answer == "yes")
}
