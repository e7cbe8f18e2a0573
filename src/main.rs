mod cli;

use gamedeck::{
    config,
    metadata::MetadataProvider,
    providers::{self, ProviderManager},
};

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use gamedeck_common::Catalog;
use std::path::{Path, PathBuf};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    // Respect RUST_LOG env var if set, otherwise use defaults based on verbosity flags
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "gamedeck=trace,gamedeck_metafile=trace,gamedeck_common=debug".to_string()
        } else if cli.silent {
            "warn".to_string()
        } else {
            "gamedeck=info,gamedeck_metafile=info".to_string()
        }
    });

    // Logs go to stderr so `scan --json` output stays parseable.
    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Scan {
            dirs,
            json,
            recursive,
        } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(scan(
                cli.config.as_deref(),
                cli.portable,
                dirs,
                json,
                recursive,
            ))
        }
        Commands::Validate { config } => {
            validate_config(config.as_deref().or(cli.config.as_deref()))
        }
        Commands::Version => {
            println!("gamedeck {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

async fn scan(
    config_path: Option<&Path>,
    portable: bool,
    dirs: Vec<PathBuf>,
    json: bool,
    recursive: bool,
) -> Result<()> {
    let mut config = config::load_config_or_default(config_path)?;
    config.paths.portable |= portable;
    config.scan.recursive_directories |= recursive;

    let providers = if dirs.is_empty() {
        providers::default_providers(&config)
    } else {
        let metadata =
            MetadataProvider::new(dirs).with_recursive(config.scan.recursive_directories);
        providers::providers_with_metadata(&config, metadata)
    };

    let manager = ProviderManager::new(providers);
    let catalog = manager.run_static_search().await?;
    let catalog = manager.run_dynamic_search(catalog).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&catalog)?);
    } else {
        print_catalog(&catalog);
    }
    Ok(())
}

fn print_catalog(catalog: &Catalog) {
    println!("Collections: {}", catalog.collections.len());
    for collection in &catalog.collections {
        println!(
            "  {} [{}] ({} games)",
            collection.name,
            collection.short_name,
            collection.games.len()
        );
        for game in catalog.games_of(collection) {
            print!("    {}", game.data.title);
            if game.files.len() > 1 {
                print!(" ({} files)", game.files.len());
            }
            if game.data.is_favorite {
                print!(" [favorite]");
            }
            println!();
        }
    }

    let loose = catalog
        .games
        .iter()
        .filter(|game| game.collections.is_empty())
        .count();
    println!("\nGames: {}", catalog.games.len());
    if loose > 0 {
        println!("  Not in any collection: {}", loose);
    }
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    let config = match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            let config = config::load_config(p)?;
            println!("✓ Configuration is valid");
            config
        }
        None => {
            println!("No config file specified, using defaults");
            config::Config::default()
        }
    };

    println!("  Config dir: {}", config.config_dir().display());
    println!("  Portable: {}", config.paths.portable);
    println!("  Game dirs: {}", config.scan.game_dirs.len());
    println!(
        "  Recursive directories: {}",
        config.scan.recursive_directories
    );
    println!("  Global metafiles: {}", config.scan.global_metafiles);
    println!(
        "  Providers: metadata={}, favorites={}, whitelists={}",
        config.providers.metadata, config.providers.favorites, config.providers.whitelists
    );

    Ok(())
}
