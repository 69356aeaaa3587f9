use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use videorag::config::{DEFAULT_DATA_DIR, Settings};
use videorag::pipeline;
use videorag::registry;
use videorag::{
    ChunkIndex, ChunkingConfig, DEFAULT_CHUNK_TOKENS, DEFAULT_MAX_TOKENS, DEFAULT_OVERLAP_TOKENS,
    EventBuilderConfig, TokenCounter, load_tokenizer, logging,
};

/// videorag - turn video transcripts into token-bounded chunks for retrieval
#[derive(Parser, Debug)]
#[command(name = "videorag")]
#[command(version)]
#[command(about = "Transcript event normalization and chunking", long_about = None)]
struct Cli {
    /// Directory holding raw/, derived/, registry.json and the chunk index
    #[arg(long, global = true, env = "VIDEORAG_DATA_DIR", default_value = DEFAULT_DATA_DIR)]
    data_dir: PathBuf,

    /// Chunk index database (defaults to <data-dir>/index.sqlite)
    #[arg(long, global = true, env = "VIDEORAG_INDEX")]
    index: Option<PathBuf>,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Register a video file and create its data directories
    Add {
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },
    /// List registered videos
    List,
    /// Build events.json from transcript_segments.json
    Events {
        video_id: String,
        /// Omit event_id from the written events
        #[arg(long)]
        no_event_ids: bool,
    },
    /// Build chunks.json from events.json
    Chunk {
        video_id: String,
        #[command(flatten)]
        chunking: ChunkingArgs,
    },
    /// Upsert chunks.json into the chunk index
    Index { video_id: String },
    /// Show how many videos and chunks the index holds
    Stats,
    /// Events, chunks and index in one go
    Run {
        video_id: String,
        #[arg(long)]
        no_event_ids: bool,
        #[command(flatten)]
        chunking: ChunkingArgs,
    },
}

#[derive(Args, Debug)]
struct ChunkingArgs {
    /// Target tokens per chunk
    #[arg(long, default_value_t = DEFAULT_CHUNK_TOKENS)]
    chunk_tokens: usize,

    /// Minimum tokens shared with the next chunk
    #[arg(long, default_value_t = DEFAULT_OVERLAP_TOKENS)]
    overlap_tokens: usize,

    /// Hard cap when overshooting the target
    #[arg(long, default_value_t = DEFAULT_MAX_TOKENS)]
    max_tokens: usize,

    /// Hugging Face tokenizer.json; whitespace counting when omitted
    #[arg(long, env = "VIDEORAG_TOKENIZER", value_name = "PATH")]
    tokenizer_file: Option<PathBuf>,
}

impl ChunkingArgs {
    fn config(&self) -> Result<ChunkingConfig> {
        let config = ChunkingConfig::new(self.chunk_tokens, self.overlap_tokens, self.max_tokens);
        config.validate().context("Invalid chunking options")?;
        Ok(config)
    }

    fn tokenizer(&self) -> Result<Box<dyn TokenCounter>> {
        load_tokenizer(self.tokenizer_file.as_deref()).context("Failed to load tokenizer")
    }
}

fn event_config(no_event_ids: bool) -> EventBuilderConfig {
    EventBuilderConfig {
        include_event_id: !no_event_ids,
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(&cli.log_level);

    let mut settings = Settings::from_data_dir(&cli.data_dir);
    if let Some(index) = &cli.index {
        settings = settings.with_index_path(index);
    }

    match cli.command {
        Command::Add { input } => {
            let registered = registry::register_video(&settings, &input)?;
            println!("Registered video '{}'", registered.video_id);
            println!("Stored at: {}", registered.raw_video_path.display());
            println!("Derived dir: {}", registered.derived_dir.display());
        }
        Command::List => {
            let ids = registry::list_video_ids(&settings.registry_path)?;
            if ids.is_empty() {
                println!("No videos found in registry. Add one with `videorag add <FILE>`.");
            }
            for id in ids {
                println!("{}", id);
            }
        }
        Command::Events {
            video_id,
            no_event_ids,
        } => {
            let written =
                pipeline::build_events(&settings, &video_id, &event_config(no_event_ids))?;
            println!("Wrote {} events to {}", written.records, written.path.display());
        }
        Command::Chunk { video_id, chunking } => {
            let config = chunking.config()?;
            let counter = chunking.tokenizer()?;
            let written = pipeline::chunk_video(&settings, &video_id, &config, counter.as_ref())?;
            println!("Wrote {} chunks to {}", written.records, written.path.display());
        }
        Command::Index { video_id } => {
            let indexed = pipeline::index_video(&settings, &video_id)?;
            println!(
                "Indexed {} chunks for video '{}' into {}",
                indexed,
                video_id,
                settings.index_path.display()
            );
        }
        Command::Stats => {
            let stats = ChunkIndex::open(&settings.index_path)?.get_stats()?;
            println!("Index:  {}", settings.index_path.display());
            println!("Videos: {}", stats.video_count);
            println!("Chunks: {}", stats.chunk_count);
        }
        Command::Run {
            video_id,
            no_event_ids,
            chunking,
        } => {
            let config = chunking.config()?;
            let counter = chunking.tokenizer()?;
            let summary = pipeline::run_all(
                &settings,
                &video_id,
                &event_config(no_event_ids),
                &config,
                counter.as_ref(),
            )?;
            println!("Events:  {} ({})", summary.events.records, summary.events.path.display());
            println!("Chunks:  {} ({})", summary.chunks.records, summary.chunks.path.display());
            println!("Indexed: {}", summary.indexed);
        }
    }

    Ok(())
}
