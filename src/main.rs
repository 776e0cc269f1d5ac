use anyhow::Context as _;
use clap::{Parser, ValueEnum};
use rusty_library_manager::{
    adapters::json_file::JsonFileDocumentStore,
    application::library::{LibraryManager, LoadPolicy},
    config::{DEFAULT_BOOKS_FILE, DEFAULT_LOANS_FILE, DEFAULT_READERS_FILE, StorageLocations},
    shell::{Shell, ShellExit},
};
use std::io;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(about = "Library catalog, readers and loans")]
struct Cli {
    /// Directory holding the data files
    #[arg(long, env = "LIBRARY_DATA_DIR", default_value = ".")]
    data_dir: PathBuf,

    /// Books file, relative to the data directory
    #[arg(long, default_value = DEFAULT_BOOKS_FILE)]
    books_file: PathBuf,

    /// Readers file, relative to the data directory
    #[arg(long, default_value = DEFAULT_READERS_FILE)]
    readers_file: PathBuf,

    /// Loans file, relative to the data directory
    #[arg(long, default_value = DEFAULT_LOANS_FILE)]
    loans_file: PathBuf,

    /// What to discard when a data file cannot be read
    #[arg(long, value_enum, env = "LIBRARY_LOAD_POLICY", default_value = "reset-all")]
    load_policy: LoadPolicyArg,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum LoadPolicyArg {
    /// Start from an empty library if any file is unreadable
    ResetAll,
    /// Only empty the collection whose file is unreadable
    PerCollection,
}

impl From<LoadPolicyArg> for LoadPolicy {
    fn from(arg: LoadPolicyArg) -> Self {
        match arg {
            LoadPolicyArg::ResetAll => LoadPolicy::ResetAll,
            LoadPolicyArg::PerCollection => LoadPolicy::PerCollection,
        }
    }
}

impl Cli {
    fn storage_locations(&self) -> StorageLocations {
        StorageLocations::new(
            self.data_dir.join(&self.books_file),
            self.data_dir.join(&self.readers_file),
            self.data_dir.join(&self.loans_file),
        )
    }
}

fn main() -> anyhow::Result<()> {
    // Initialize tracing (stderr, so the menu on stdout stays readable)
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rusty_library_manager=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();
    let locations = cli.storage_locations();
    tracing::debug!("Storage locations: {:?}", locations);

    let store = JsonFileDocumentStore::new(locations);
    let mut library = LibraryManager::new();
    library.load(&store, cli.load_policy.into());

    println!(
        "Library system started. Loaded {} books, {} readers.",
        library.books().len(),
        library.readers().len()
    );

    let stdin = io::stdin();
    let exit = Shell::new(stdin.lock(), io::stdout())
        .run(&mut library, &store)
        .context("Interactive shell failed")?;

    tracing::info!("Shell exited: {:?}", exit);
    if exit == ShellExit::Discarded {
        tracing::debug!("Changes since start-up were not saved");
    }
    Ok(())
}
