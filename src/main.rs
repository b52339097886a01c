use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use smartsearch::cli::{Cli, Commands, ConfigAction};
use smartsearch::config::Config;
use smartsearch::error::SmartSearchError;
use smartsearch::patterns::PatternRegistry;
use smartsearch::provider::MemoryProvider;
use smartsearch::query::QueryNormalizer;
use smartsearch::retrieval::{partition_by_type, Ranker};
use smartsearch::session::{
    FileHistoryStore, HistoryStore, SearchSession, SessionEvent, SessionHandle,
};

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse_args();

    // Initialize logging
    init_logging(cli.verbose);

    // Handle commands
    match cli.command {
        Commands::Parse { query, json } => {
            cmd_parse(cli.config, &query, json)?;
        }
        Commands::Search {
            query,
            data,
            limit,
            json,
        } => {
            cmd_search(cli.config, &query, &data, limit, json)?;
        }
        Commands::History { clear } => {
            cmd_history(cli.config, clear)?;
        }
        Commands::Config { action } => {
            cmd_config(cli.config, action)?;
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default_filter = if verbose {
        "smartsearch=debug"
    } else {
        "smartsearch=info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn cmd_parse(config_path: Option<PathBuf>, query: &str, json: bool) -> Result<()> {
    let config = load_config(config_path)?;
    let normalizer = build_normalizer(&config)?;
    let parsed = normalizer.normalize(query);

    if json {
        println!("{}", to_json(&parsed, "Failed to serialize parsed query")?);
        return Ok(());
    }

    let filter = &parsed.filter;
    println!("Query:   {}", query);
    println!("Clean:   {}", display_or_dash(&parsed.clean_query));
    match &filter.result_types {
        Some(types) => {
            let names: Vec<&str> = types.iter().map(|t| t.as_str()).collect();
            println!("Types:   {}", names.join(", "));
        }
        None => println!("Types:   -"),
    }
    match &filter.date_range {
        Some(range) => println!(
            "Dates:   {} .. {}",
            range.start().format("%Y-%m-%d %H:%M:%S"),
            range.end().format("%Y-%m-%d %H:%M:%S")
        ),
        None => println!("Dates:   -"),
    }
    match &filter.contacts {
        Some(contacts) => println!("From:    {}", contacts.join(", ")),
        None => println!("From:    -"),
    }
    match &filter.sentiment {
        Some(sentiment) => println!("Mood:    {:?}", sentiment),
        None => println!("Mood:    -"),
    }

    Ok(())
}

fn cmd_search(
    config_path: Option<PathBuf>,
    query: &str,
    data: &Path,
    limit: usize,
    json: bool,
) -> Result<()> {
    let config = load_config(config_path)?;
    let provider = MemoryProvider::from_json_file(data)
        .with_context(|| format!("Failed to load search data from {}", data.display()))?;
    tracing::debug!("Loaded {} candidate results from {:?}", provider.len(), data);

    let mut session = SearchSession::new(
        build_normalizer(&config)?,
        Ranker::from_config(&config.ranking),
        config.session.history_capacity,
    );
    if let Some(store) = history_store(&config)? {
        session = session.with_history_store(Box::new(store));
    }

    let rt = tokio::runtime::Runtime::new().map_err(|e| SmartSearchError::Io {
        source: e,
        context: "Failed to create tokio runtime".to_string(),
    })?;
    let snapshot = rt.block_on(async {
        let (handle, mut events) = SessionHandle::spawn(session, Arc::new(provider));
        let ticket = handle.submit(query).await?;

        while let Some(event) = events.recv().await {
            if let SessionEvent::Presented { generation, .. } = event {
                if generation == ticket.generation {
                    break;
                }
            }
        }

        let snapshot = handle.snapshot().await;
        handle.shutdown().await;
        snapshot
    })?;

    if json {
        let shown: Vec<_> = snapshot.results.iter().take(limit).collect();
        println!("{}", to_json(&shown, "Failed to serialize results")?);
        return Ok(());
    }

    if let Some(message) = &snapshot.error_message {
        println!("Search failed: {}", message);
        return Ok(());
    }

    let tabs = partition_by_type(&snapshot.results).counts();
    println!(
        "{} results (messages {}, attachments {}, decisions {}, tasks {}, mentions {})",
        tabs.all, tabs.messages, tabs.attachments, tabs.decisions, tabs.tasks, tabs.mentions
    );

    let open = &config.ranking.highlight_open;
    let close = &config.ranking.highlight_close;
    for (rank, result) in snapshot.results.iter().take(limit).enumerate() {
        println!(
            "\n{}. [{}] {:.3}  {} in #{}  ({})",
            rank + 1,
            result.result_type,
            result.relevance_score,
            result.author,
            result.container_name,
            result.timestamp.format("%Y-%m-%d %H:%M")
        );
        println!("   {}", result.render(open, close));
    }

    Ok(())
}

fn cmd_history(config_path: Option<PathBuf>, clear: bool) -> Result<()> {
    let config = load_config(config_path)?;
    let Some(store) = history_store(&config)? else {
        println!("History persistence is disabled (session.history_file is unset)");
        return Ok(());
    };

    if clear {
        store.clear()?;
        println!("✓ Search history cleared");
        return Ok(());
    }

    let searches = store.load()?;
    if searches.is_empty() {
        println!("No recent searches");
        return Ok(());
    }

    println!("Recent searches:");
    for (i, query) in searches.iter().enumerate() {
        println!("  {:>2}. {}", i + 1, query);
    }

    Ok(())
}

fn cmd_config(config_path: Option<PathBuf>, action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let config = load_config(config_path)?;
            let content = toml::to_string_pretty(&config)?;
            println!("{}", content);
        }
        ConfigAction::Validate { file } => {
            let path = match file.or(config_path) {
                Some(path) => path,
                None => Config::default_path()?,
            };
            let config = Config::load(&path)
                .with_context(|| format!("Invalid configuration at {}", path.display()))?;
            if let Some(keywords) = &config.patterns.keywords_file {
                load_keywords(keywords)?;
            }
            println!("✓ Configuration is valid");
            println!("  Schema version: {}", config.meta.schema_version);
        }
        ConfigAction::Init { force } => {
            let path = match config_path {
                Some(path) => path,
                None => Config::default_path()?,
            };

            if path.exists() && !force {
                println!("Configuration file already exists at: {}", path.display());
                println!("Use --force to overwrite");
                return Ok(());
            }

            let config_dir = path
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from("."));
            std::fs::create_dir_all(&config_dir).map_err(|e| SmartSearchError::Io {
                source: e,
                context: format!("Failed to create config directory: {:?}", config_dir),
            })?;

            let keywords_path = config_dir.join("keywords.toml");
            if force || !keywords_path.exists() {
                let keywords_content = include_str!("../config-templates/keywords.toml");
                std::fs::write(&keywords_path, keywords_content).map_err(|e| {
                    SmartSearchError::Io {
                        source: e,
                        context: format!("Failed to write keywords.toml: {:?}", keywords_path),
                    }
                })?;
            }

            let mut config = Config::default();
            config.patterns.keywords_file = Some(keywords_path);
            config.save(&path)?;

            println!("✓ Configuration initialized at: {}", path.display());
            println!("✓ Keyword vocabulary installed");
            println!("  - keywords.toml: Type, sender, sentiment and date phrases");
        }
    }

    Ok(())
}

fn load_config(config_path: Option<PathBuf>) -> Result<Config> {
    let path = match config_path {
        Some(path) => path,
        None => Config::default_path()?,
    };

    if !path.exists() {
        tracing::debug!(
            "Config file not found, using defaults. Run 'smartsearch config init' to create one."
        );
        let mut config = Config::default();
        config.apply_env_overrides();
        return Ok(config);
    }

    Config::load(&path).with_context(|| format!("Failed to load config from {}", path.display()))
}

fn build_normalizer(config: &Config) -> Result<QueryNormalizer> {
    let patterns = match &config.patterns.keywords_file {
        Some(path) => load_keywords(path)?,
        None => PatternRegistry::builtin()?,
    };
    Ok(QueryNormalizer::new(
        Arc::new(patterns),
        config.dates.week_start()?,
    ))
}

fn load_keywords(path: &Path) -> Result<PatternRegistry> {
    let path = expand_path(path)?;
    PatternRegistry::from_config_file(&path)
        .with_context(|| format!("Failed to load keyword vocabulary from {}", path.display()))
}

fn history_store(config: &Config) -> Result<Option<FileHistoryStore>> {
    config
        .session
        .history_file
        .as_deref()
        .map(|path| -> Result<FileHistoryStore> {
            Ok(FileHistoryStore::new(
                expand_path(path)?,
                config.session.history_capacity,
            ))
        })
        .transpose()
}

fn to_json<T: serde::Serialize>(value: &T, context: &str) -> Result<String> {
    serde_json::to_string_pretty(value).with_context(|| context.to_string())
}

fn display_or_dash(text: &str) -> &str {
    if text.is_empty() {
        "-"
    } else {
        text
    }
}

fn expand_path(path: &Path) -> Result<PathBuf> {
    let path_str = path
        .to_str()
        .ok_or_else(|| SmartSearchError::Config("Invalid path encoding".to_string()))?;

    if let Some(stripped) = path_str.strip_prefix("~/") {
        let home = dirs::home_dir().ok_or_else(|| {
            SmartSearchError::Config("Cannot determine home directory".to_string())
        })?;
        Ok(home.join(stripped))
    } else {
        Ok(path.to_path_buf())
    }
}
