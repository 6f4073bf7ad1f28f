use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use config::{Settings, load_env_file};
use llm::providers::GeminiProvider;
use llm::{ChatModel, ModelProvider};
use scribe_core::{
    BytescaleStore, ChatEngine, ChatId, ChatStore, CompletionGateway, FsObjectStore, JsonlCodec,
    MarkdownCodec, MemoryObjectStore, ObjectStore, TranscriptCodec,
};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

mod repl;

#[derive(Copy, Clone, ValueEnum, Debug, PartialEq, Eq)]
#[clap(rename_all = "lowercase")]
enum StoreKind {
    Bytescale,
    Fs,
    Memory,
}

impl From<StoreKind> for config::StoreKind {
    fn from(s: StoreKind) -> Self {
        match s {
            StoreKind::Bytescale => config::StoreKind::Bytescale,
            StoreKind::Fs => config::StoreKind::Fs,
            StoreKind::Memory => config::StoreKind::Memory,
        }
    }
}

#[derive(Copy, Clone, ValueEnum, Debug, PartialEq, Eq)]
#[clap(rename_all = "lowercase")]
enum Format {
    Markdown,
    Jsonl,
}

impl From<Format> for config::TranscriptFormat {
    fn from(f: Format) -> Self {
        match f {
            Format::Markdown => config::TranscriptFormat::Markdown,
            Format::Jsonl => config::TranscriptFormat::Jsonl,
        }
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Chat with Gemini, keeping transcripts in an object store", long_about = None)]
struct Args {
    /// Where transcripts are stored (overrides settings.toml and SCRIBE_STORE)
    #[arg(long, value_enum)]
    store: Option<StoreKind>,

    /// Transcript encoding (overrides settings.toml and SCRIBE_FORMAT)
    #[arg(long, value_enum)]
    format: Option<Format>,

    /// Folder in the object store holding the transcripts
    #[arg(long)]
    folder: Option<String>,

    /// Log debug output to stderr
    #[arg(long, short)]
    tracing: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create an empty chat and print its id
    New,
    /// Send one message to a chat and print the reply
    Send { id: String, message: String },
    /// Print a chat's transcript
    History { id: String },
    /// List chats, most recent first
    List {
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Delete a chat
    Delete { id: String },
    /// Talk to a chat interactively; starts a new chat without an id
    Chat { id: Option<String> },
    /// List the models the provider offers
    Models,
}

fn setup_tracing(enable: bool) {
    let default = if enable { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();
}

fn build_objects(settings: &Settings) -> anyhow::Result<Arc<dyn ObjectStore>> {
    match settings.store {
        config::StoreKind::Bytescale => {
            let account_id = settings
                .bytescale_account_id
                .as_deref()
                .context("BYTESCALE_ACCOUNT_ID must be set to use the bytescale store")?;
            let api_key = Settings::bytescale_api_key()
                .context("BYTESCALE_API_KEY must be set to use the bytescale store")?;
            let store = BytescaleStore::with_urls(
                settings
                    .bytescale_api_url
                    .as_deref()
                    .unwrap_or(scribe_core::storage::DEFAULT_API_URL),
                settings
                    .bytescale_cdn_url
                    .as_deref()
                    .unwrap_or(scribe_core::storage::DEFAULT_CDN_URL),
                account_id,
                &api_key,
            )?;
            Ok(Arc::new(store))
        }
        config::StoreKind::Fs => {
            let root = settings
                .objects_dir()
                .context("Could not determine a data directory; set SCRIBE_DATA_DIR")?;
            tracing::debug!("Using filesystem store at {:?}", root);
            Ok(Arc::new(FsObjectStore::new(root)))
        }
        config::StoreKind::Memory => {
            tracing::warn!("Using the in-memory store; chats are lost on exit");
            Ok(Arc::new(MemoryObjectStore::new()))
        }
    }
}

fn build_provider(settings: &Settings) -> anyhow::Result<GeminiProvider> {
    let api_key = Settings::gemini_api_key().context("GEMINI_API_KEY must be set")?;
    match settings.gemini_base_url.as_deref() {
        Some(base_url) => GeminiProvider::new(base_url, &api_key),
        None => GeminiProvider::default(&api_key),
    }
}

fn build_model(settings: &Settings) -> anyhow::Result<Arc<dyn ChatModel + Send + Sync>> {
    build_provider(settings)?
        .create_chat_model(&settings.model)
        .with_context(|| format!("Failed to create model {}", settings.model))
}

fn build_engine(settings: &Settings) -> anyhow::Result<ChatEngine> {
    let codec: Arc<dyn TranscriptCodec> = match settings.format {
        config::TranscriptFormat::Markdown => Arc::new(MarkdownCodec),
        config::TranscriptFormat::Jsonl => Arc::new(JsonlCodec),
    };
    let store = ChatStore::with_codec(build_objects(settings)?, settings.folder.clone(), codec);

    let mut gateway = CompletionGateway::new(build_model(settings)?);
    if let Some(fallback) = &settings.fallback_reply {
        gateway = gateway.with_fallback(fallback.clone());
    }

    let engine = ChatEngine::new(store, gateway);
    Ok(match settings.list_limit {
        Some(limit) => engine.with_list_limit(limit),
        None => engine,
    })
}

async fn run(command: Command, settings: &Settings) -> anyhow::Result<()> {
    let engine = || build_engine(settings);

    match command {
        Command::New => {
            println!("{}", engine()?.new_chat().await?);
        }
        Command::Send { id, message } => {
            let id = ChatId::parse(&id)?;
            let reply = engine()?.send(&id, &message).await?;
            if reply.is_degraded() {
                eprintln!("(the model could not answer; a fallback reply was stored)");
            }
            println!("{}", reply.text());
        }
        Command::History { id } => {
            let id = ChatId::parse(&id)?;
            repl::print_history(&engine()?.history(&id).await);
        }
        Command::List { limit } => {
            let engine = engine()?;
            let chats = match limit {
                Some(limit) => engine.store().list(limit).await,
                None => engine.list().await,
            };
            if chats.is_empty() {
                println!("No chats yet.");
            }
            for chat in chats {
                println!(
                    "{}  {}  {}",
                    chat.id,
                    chat.timestamp.format("%Y-%m-%d %H:%M"),
                    chat.preview
                );
            }
        }
        Command::Delete { id } => {
            engine()?.delete(&ChatId::parse(&id)?).await?;
            println!("Deleted {}", id);
        }
        Command::Chat { id } => {
            let engine = engine()?;
            let id = match id {
                Some(id) => ChatId::parse(&id)?,
                None => engine.new_chat().await?,
            };
            repl::run(&engine, id).await?;
        }
        Command::Models => {
            for model in build_provider(settings)?.list_models().await? {
                println!("{}\t{}", model.id, model.name());
            }
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_env_file();
    let args = Args::parse();

    setup_tracing(args.tracing);

    let mut settings = Settings::load();
    if let Some(store) = args.store {
        settings.store = store.into();
    }
    if let Some(format) = args.format {
        settings.format = format.into();
    }
    if let Some(folder) = args.folder {
        settings.folder = folder;
    }

    run(args.command, &settings).await
}
