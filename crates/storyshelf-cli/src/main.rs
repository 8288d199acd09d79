//! storyshelf - manage reader bookmarks from the command line.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde_json::Value;
use storyshelf_core::config::CONFIG_FILE_NAME;
use storyshelf_core::{
    FavoritesPort, FavoritesStore, ItemId, SavedItem, StoreConfig, Toggled,
};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// storyshelf - bookmarks for the Storyshelf reader
#[derive(Parser, Debug)]
#[command(name = "storyshelf")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = CONFIG_FILE_NAME)]
    config: PathBuf,

    /// Directory holding the bookmark store (overrides config)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Storage key of the bookmark slot (overrides config)
    #[arg(long)]
    key: Option<String>,

    /// Log level (trace, debug, info, warn, error); RUST_LOG takes precedence
    #[arg(long, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Bookmark a work (no-op if already bookmarked)
    Add(ItemArgs),

    /// Remove a bookmark
    #[command(alias = "rm")]
    Remove {
        /// Id of the work
        id: String,
    },

    /// Bookmark a work, or remove it if already bookmarked
    Toggle(ItemArgs),

    /// Exit 0 if the work is bookmarked, 1 otherwise
    Contains {
        /// Id of the work
        id: String,
    },

    /// List bookmarks, oldest first
    #[command(alias = "ls")]
    List {
        /// Print the stored JSON array instead of one line per bookmark
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args, Debug)]
struct ItemArgs {
    /// Id of the work
    id: String,

    #[arg(long)]
    title: Option<String>,

    #[arg(long)]
    author: Option<String>,

    /// Cover image URL
    #[arg(long)]
    cover: Option<String>,

    /// Extra payload field as KEY=VALUE; VALUE is parsed as JSON when valid
    #[arg(long = "field", value_name = "KEY=VALUE", value_parser = parse_field)]
    fields: Vec<(String, Value)>,
}

impl ItemArgs {
    fn into_item(self) -> Result<SavedItem> {
        let id = ItemId::new(self.id).context("invalid bookmark id")?;
        let mut item = SavedItem::new(id);
        for (key, value) in self.fields {
            item = item.with_field(key, value);
        }
        if let Some(title) = self.title {
            item = item.with_field("title", title);
        }
        if let Some(author) = self.author {
            item = item.with_field("author", author);
        }
        if let Some(cover) = self.cover {
            item = item.with_field("coverImage", cover);
        }
        Ok(item.with_field("savedAt", chrono::Utc::now().to_rfc3339()))
    }
}

fn parse_field(raw: &str) -> Result<(String, Value), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got {raw:?}"))?;
    if key.is_empty() {
        return Err(format!("empty field name in {raw:?}"));
    }
    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((key.to_string(), value))
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&cli.log_level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let mut config = StoreConfig::load(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;
    if let Some(dir) = cli.data_dir {
        config.data_dir = Some(dir);
    }
    if let Some(key) = cli.key {
        config.storage_key = key;
    }
    storyshelf_core::system::validate_key(&config.storage_key)
        .context("invalid storage key")?;

    let mut store = FavoritesStore::initialize(config.open_port());
    let success = run(&mut store, cli.command)?;
    if let Some(error) = store.last_persist_error() {
        eprintln!("warning: change not saved to disk: {error}");
    }
    Ok(if success { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

/// Execute one subcommand. Returns `false` only for a `contains` miss.
fn run<P: FavoritesPort>(store: &mut FavoritesStore<P>, command: Command) -> Result<bool> {
    match command {
        Command::Add(args) => {
            let item = args.into_item()?;
            let id = item.id().clone();
            if store.add(item) {
                println!("added {id}");
            } else {
                println!("already saved {id}");
            }
        }
        Command::Remove { id } => {
            if store.remove(&id) {
                println!("removed {id}");
            } else {
                println!("not saved {id}");
            }
        }
        Command::Toggle(args) => {
            let item = args.into_item()?;
            let id = item.id().clone();
            match store.toggle(item) {
                Toggled::Added => println!("added {id}"),
                Toggled::Removed => println!("removed {id}"),
            }
        }
        Command::Contains { id } => {
            let present = store.contains(&id);
            println!("{present}");
            return Ok(present);
        }
        Command::List { json } => {
            let collection = store.list();
            if json {
                let out = serde_json::to_string_pretty(&*collection)
                    .context("failed to encode bookmarks")?;
                println!("{out}");
            } else {
                for item in collection.iter() {
                    println!("{}\t{}", item.id(), item.title().unwrap_or(""));
                }
            }
        }
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use storyshelf_core::MemoryPort;

    fn item_args(id: &str) -> ItemArgs {
        ItemArgs {
            id: id.to_string(),
            title: Some("Night Ferry".to_string()),
            author: None,
            cover: None,
            fields: vec![("primaryGenre".to_string(), Value::from("Mystery"))],
        }
    }

    #[test]
    fn parse_field_json_and_string() {
        assert_eq!(parse_field("chapters=12").unwrap(), ("chapters".to_string(), Value::from(12)));
        assert_eq!(
            parse_field("genre=Sci-Fi").unwrap(),
            ("genre".to_string(), Value::from("Sci-Fi"))
        );
        assert_eq!(parse_field("note=a=b").unwrap().1, Value::from("a=b"));
        assert!(parse_field("novalue").is_err());
        assert!(parse_field("=x").is_err());
    }

    #[test]
    fn into_item_builds_payload() {
        let item = item_args("b1").into_item().unwrap();
        assert_eq!(item.id().as_str(), "b1");
        assert_eq!(item.title(), Some("Night Ferry"));
        assert_eq!(item.field("primaryGenre"), Some(&Value::from("Mystery")));
        assert!(item.field("savedAt").is_some());
        assert!(item_args("  ").into_item().is_err());
    }

    #[test]
    fn contains_exit_status() {
        let mut store = FavoritesStore::initialize(MemoryPort::new());
        run(&mut store, Command::Add(item_args("b1"))).unwrap();
        let present = run(&mut store, Command::Contains { id: "b1".into() }).unwrap();
        let absent = run(&mut store, Command::Contains { id: "b2".into() }).unwrap();
        assert!(present);
        assert!(!absent);
    }

    #[test]
    fn toggle_round_trip() {
        let port = MemoryPort::new();
        let mut store = FavoritesStore::initialize(port.clone());
        run(&mut store, Command::Toggle(item_args("b1"))).unwrap();
        assert!(port.persisted().contains("b1"));
        run(&mut store, Command::Toggle(item_args("b1"))).unwrap();
        assert!(port.persisted().is_empty());
    }

    #[test]
    fn cli_parses_global_overrides() {
        let cli = Cli::try_parse_from([
            "storyshelf", "--data-dir", "/tmp/shelf", "--key", "reader-2", "add", "b1",
            "--title", "Foo", "--field", "chapters=3",
        ])
        .unwrap();
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/shelf")));
        assert_eq!(cli.key.as_deref(), Some("reader-2"));
        let Command::Add(args) = cli.command else {
            panic!("expected add");
        };
        assert_eq!(args.fields, vec![("chapters".to_string(), Value::from(3))]);
    }
}
