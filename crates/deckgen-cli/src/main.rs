//! Deckgen CLI - generate presentations from a topic.

use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use deckgen::store::{ChatMessage, HybridStore};
use deckgen::{
    Config, Deck, Delivery, FidelityWarning, FileDelivery, Generation, Palette, Pipeline,
    StyleOptions,
};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser)]
#[command(name = "deckgen")]
#[command(author, version, about = "Generate presentations from a topic", long_about = None)]
struct Cli {
    /// Config file (default: <config dir>/deckgen/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log more (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Log everything at debug level
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a presentation about a topic
    Generate {
        /// What the presentation is about
        topic: String,

        #[command(flatten)]
        style: StyleArgs,

        /// Session to record the request in (a new one is created if omitted)
        #[arg(long)]
        session: Option<String>,

        /// Output file (default: derived from the deck title)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Revise the latest presentation of a session
    Edit {
        /// What to change
        instruction: String,

        /// Session holding the presentation
        #[arg(long)]
        session: String,

        #[command(flatten)]
        style: StyleArgs,

        /// Output file (default: derived from the deck title)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Build a presentation from saved content-source output, offline
    Render {
        /// Raw content-source response (use - for stdin)
        input: PathBuf,

        /// Output file (default: derived from the deck title)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Deck palette as PRIMARY,SECONDARY,BACKGROUND
        #[arg(long, value_parser = parse_palette)]
        palette: Option<Palette>,

        /// Look up images with the configured providers
        #[arg(long)]
        resolve_images: bool,
    },

    /// Manage stored sessions
    Sessions {
        #[command(subcommand)]
        command: SessionCommands,
    },
}

#[derive(Subcommand)]
enum SessionCommands {
    /// List sessions, most recent first
    List,

    /// Delete a session and its presentation
    Delete {
        /// Session id
        id: String,
    },
}

#[derive(Args)]
struct StyleArgs {
    /// Number of slides to ask for
    #[arg(long)]
    slides: Option<u32>,

    /// Presentation style, e.g. "Educational Content"
    #[arg(long)]
    kind: Option<String>,

    #[arg(long)]
    tone: Option<String>,

    #[arg(long)]
    audience: Option<String>,

    /// Deck palette as PRIMARY,SECONDARY,BACKGROUND
    #[arg(long, value_parser = parse_palette)]
    palette: Option<Palette>,

    /// Do not add images to slides
    #[arg(long)]
    no_images: bool,

    /// Element the deck must include (repeatable)
    #[arg(long = "require")]
    required: Vec<String>,
}

impl StyleArgs {
    fn into_style(self, default_palette: Palette) -> StyleOptions {
        let defaults = StyleOptions::default();
        StyleOptions {
            palette: self.palette.unwrap_or(default_palette),
            presentation_kind: self.kind.unwrap_or(defaults.presentation_kind),
            slide_count_hint: self.slides,
            tone: self.tone.unwrap_or(defaults.tone),
            audience: self.audience.unwrap_or(defaults.audience),
            include_images: !self.no_images,
            required_elements: self.required,
        }
    }
}

fn parse_palette(s: &str) -> Result<Palette, String> {
    let parts: Vec<&str> = s.split(',').map(str::trim).collect();
    match parts.as_slice() {
        [primary, secondary, background] => Palette::parse(primary, secondary, background)
            .ok_or_else(|| format!("not a hex colour triple: {s}")),
        _ => Err("expected PRIMARY,SECONDARY,BACKGROUND".to_string()),
    }
}

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.debug);

    let config = Config::load(cli.config.as_deref())?;
    let runtime = tokio::runtime::Runtime::new()?;

    runtime.block_on(async {
        match cli.command {
            Commands::Generate {
                topic,
                style,
                session,
                output,
            } => generate(&config, topic, style, session, output).await,
            Commands::Edit {
                instruction,
                session,
                style,
                output,
            } => edit(&config, instruction, session, style, output).await,
            Commands::Render {
                input,
                output,
                palette,
                resolve_images,
            } => render(&config, input, output, palette, resolve_images).await,
            Commands::Sessions { command } => sessions(&config, command).await,
        }
    })
}

fn init_tracing(verbose: u8, debug: bool) {
    let default = match (debug, verbose) {
        (true, _) | (_, 2..) => "debug",
        (false, 1) => "info",
        (false, 0) => "warn",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(io::stderr).with_target(false))
        .init();
}

async fn generate(
    config: &Config,
    topic: String,
    style: StyleArgs,
    session: Option<String>,
    output: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let style = style.into_style(config.palette.clone());
    let pipeline = Pipeline::from_config(config)?;
    let generation = pipeline.generate(&topic, &style).await?;
    report(&generation.warnings);

    let path = deliver(config, &generation, output.as_deref())?;
    println!("{}", path.display());

    let session = session.unwrap_or_else(new_session_id);
    record(config, &session, ChatMessage::user(topic), &generation).await;
    eprintln!("session: {session}");
    Ok(())
}

async fn edit(
    config: &Config,
    instruction: String,
    session: String,
    style: StyleArgs,
    output: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let store = HybridStore::from_settings(&config.store)?;
    store.open().await?;
    let current = store
        .load_presentation(&session)
        .await
        .ok_or_else(|| format!("session {session} has no presentation"))?;
    store.close();

    let style = style.into_style(current.theme_palette());
    let pipeline = Pipeline::from_config(config)?;
    let generation = pipeline.edit(&instruction, &current, &style).await?;
    report(&generation.warnings);

    let path = deliver(config, &generation, output.as_deref())?;
    println!("{}", path.display());

    record(config, &session, ChatMessage::user(instruction), &generation).await;
    Ok(())
}

async fn render(
    config: &Config,
    input: PathBuf,
    output: Option<PathBuf>,
    palette: Option<Palette>,
    resolve_images: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let text = if input.as_os_str() == "-" {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        fs::read_to_string(&input)?
    };

    let style = StyleOptions {
        palette: palette.unwrap_or_else(|| config.palette.clone()),
        include_images: resolve_images,
        ..Default::default()
    };
    let pipeline = Pipeline::from_config(config)?;
    let generation = pipeline.render_text(&text, &style).await;
    report(&generation.warnings);

    let path = deliver(config, &generation, output.as_deref())?;
    println!("{}", path.display());
    Ok(())
}

async fn sessions(
    config: &Config,
    command: SessionCommands,
) -> Result<(), Box<dyn std::error::Error>> {
    let store = HybridStore::from_settings(&config.store)?;
    store.open().await?;

    match command {
        SessionCommands::List => {
            let list = store.list_sessions().await?;
            if list.is_empty() {
                println!("No sessions.");
            }
            for s in list {
                println!(
                    "  {:24} {:>4}  {}  {}",
                    s.id,
                    s.message_count,
                    s.last_modified.format("%Y-%m-%d %H:%M"),
                    s.title
                );
            }
        }
        SessionCommands::Delete { id } => {
            store.delete_session(&id).await?;
            println!("Deleted {id}");
        }
    }

    store.close();
    Ok(())
}

/// Report fidelity warnings to stderr.
fn report(warnings: &[FidelityWarning]) {
    for warning in warnings {
        eprintln!("warning: {warning}");
    }
}

/// Save the artifact to `output`, or into the configured output directory.
///
/// A degraded artifact keeps the requested stem but gets its own extension.
fn deliver(
    config: &Config,
    generation: &Generation,
    output: Option<&Path>,
) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let (dir, name) = match output {
        Some(path) => {
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from("."));
            let name = if generation.degraded {
                let stem = path
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .unwrap_or(generation.deck.title.as_str());
                generation.artifact.suggested_file_name(stem)
            } else {
                path.file_name()
                    .and_then(|s| s.to_str())
                    .map(str::to_string)
                    .unwrap_or_else(|| generation.suggested_file_name())
            };
            (dir, name)
        }
        None => (config.output_directory(), generation.suggested_file_name()),
    };
    Ok(FileDelivery::new(dir).deliver(&generation.artifact, &name)?)
}

/// Append the exchange to a session. Failures are logged, not fatal.
async fn record(config: &Config, session: &str, request: ChatMessage, generation: &Generation) {
    if let Err(e) = try_record(config, session, request, &generation.deck, summary(generation)).await
    {
        warn!(session, error = %e, "could not save session");
        eprintln!("warning: session not saved: {e}");
    }
}

async fn try_record(
    config: &Config,
    session: &str,
    request: ChatMessage,
    deck: &Deck,
    reply: String,
) -> Result<(), Box<dyn std::error::Error>> {
    let store = HybridStore::from_settings(&config.store)?;
    store.open().await?;
    store
        .append_messages(session, vec![request, ChatMessage::bot(reply, Some(deck.clone()))])
        .await?;
    store.save_presentation(session, deck).await?;
    store.close();
    Ok(())
}

fn summary(generation: &Generation) -> String {
    let mut text = format!(
        "Created \"{}\" with {} slides.",
        generation.deck.title,
        generation.deck.len()
    );
    if generation.placeholder {
        text.push_str(" The generated content was unusable, so placeholder slides were used.");
    }
    if generation.degraded {
        text.push_str(" Saved as a styled HTML document; open it in a browser to print or convert.");
    }
    text
}

fn new_session_id() -> String {
    Utc::now().format("%Y%m%d-%H%M%S%3f").to_string()
}
