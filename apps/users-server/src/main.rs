use anyhow::{anyhow, Context, Result};
use api_ingress::{ApiIngress, ApiIngressConfig};
use clap::{Parser, Subcommand};
use mimalloc::MiMalloc;
use runtime::{AppConfig, CliArgs, DatabaseConfig};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;
use users::{UsersConfig, UsersModule};

mod shutdown;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

const MEMORY_DSN: &str = "sqlite::memory:";
const DEFAULT_MAX_CONNS: u32 = 10;
const DEFAULT_BUSY_TIMEOUT_MS: u32 = 5000;

/// Expand a sqlite DSN into an absolute-path DSN using a base directory.
/// - Keeps "sqlite::memory:" as-is.
/// - Normalizes backslashes into forward slashes (important on Windows).
fn absolutize_sqlite_dsn(dsn: &str, base_dir: &Path, create_dirs: bool) -> Result<String> {
    if dsn.eq_ignore_ascii_case(MEMORY_DSN) || dsn.eq_ignore_ascii_case("sqlite://:memory:") {
        return Ok(MEMORY_DSN.to_string());
    }
    let db_path = dsn
        .strip_prefix("sqlite://")
        .ok_or_else(|| anyhow!("DSN must start with sqlite:// (got: {})", dsn))?;

    let (path_str, query) = match db_path.split_once('?') {
        Some((p, q)) => (p, Some(q)),
        None => (db_path, None),
    };

    let mut p = PathBuf::from(path_str);
    if p.as_os_str().is_empty() {
        return Err(anyhow!("Empty SQLite path in DSN"));
    }
    if p.is_relative() {
        p = base_dir.join(p);
    }

    if let Some(dir) = p.parent() {
        if create_dirs {
            std::fs::create_dir_all(dir)?;
        }
    }

    // Rebuild DSN with absolute path and normalized slashes
    let mut out = String::from("sqlite://");
    out.push_str(&p.to_string_lossy().replace('\\', "/"));
    if let Some(q) = query {
        out.push('?');
        out.push_str(q);
    }
    Ok(out)
}

/// Users API server - CRUD over the user resource
#[derive(Parser)]
#[command(name = "users-server")]
#[command(about = "Users API server - CRUD REST service for users")]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port for HTTP server (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Print current configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity level (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Use an in-memory SQLite database instead of the configured one
    #[arg(long)]
    mock: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server
    Run,
    /// Check configuration
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // CLI args passed down to config/app
    let args = CliArgs {
        config: cli.config.as_ref().map(|p| p.to_string_lossy().to_string()),
        port: cli.port,
        print_config: cli.print_config,
        verbose: cli.verbose,
        mock: cli.mock,
    };

    // Load configuration (normalized home_dir is applied inside)
    let mut config = AppConfig::load_or_default(cli.config.as_deref())?;

    // Apply CLI overrides (port / verbosity)
    config.apply_cli_overrides(&args);

    // Initialize logging
    let logging_config = config
        .logging
        .clone()
        .unwrap_or_else(runtime::default_logging_config);
    runtime::logging::init_logging_from_config(&logging_config, Path::new(&config.server.home_dir));
    tracing::info!("Users API server starting");

    // Print config and exit if requested
    if cli.print_config {
        println!("{}", config.to_yaml()?);
        return Ok(());
    }

    // Execute command
    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_server(config, args).await,
        Commands::Check => check_config(config, args),
    }
}

/// Detect DB backend from URL scheme; only SQLite is compiled in.
fn detect_from_dsn(cfg: &DatabaseConfig) -> Result<&'static str> {
    let raw = cfg.url.trim().to_owned();
    if raw.is_empty() {
        return Err(anyhow!("Database URL not configured"));
    }
    if raw.eq_ignore_ascii_case(MEMORY_DSN) {
        return Ok("sqlite");
    }

    let url = Url::parse(&raw).map_err(|e| anyhow!("Invalid database DSN '{}': {}", raw, e))?;

    match url.scheme() {
        "sqlite" | "sqlite3" => Ok("sqlite"),
        other => Err(anyhow!("Unsupported database type: {}", other)),
    }
}

/// Effective database section: `--mock` swaps in in-memory SQLite.
fn database_config(config: &AppConfig, args: &CliArgs) -> Result<DatabaseConfig> {
    if args.mock {
        return Ok(DatabaseConfig {
            url: MEMORY_DSN.to_string(),
            max_conns: Some(1),
            busy_timeout_ms: None,
        });
    }
    let db = config
        .database
        .clone()
        .or_else(|| AppConfig::default().database)
        .ok_or_else(|| anyhow!("Database configuration missing"))?;
    detect_from_dsn(&db)?;
    Ok(db)
}

async fn connect_database(db_config: &DatabaseConfig, base_dir: &Path) -> Result<DatabaseConnection> {
    let mut dsn = db_config.url.trim().to_owned();

    // Absolutize sqlite DSNs to avoid cwd issues
    if dsn.starts_with("sqlite://") {
        dsn = absolutize_sqlite_dsn(&dsn, base_dir, true)?;
    }

    let in_memory = dsn == MEMORY_DSN;
    let max_conns = if in_memory {
        1
    } else {
        db_config.max_conns.unwrap_or(DEFAULT_MAX_CONNS)
    };
    let busy_timeout = Duration::from_millis(
        db_config.busy_timeout_ms.unwrap_or(DEFAULT_BUSY_TIMEOUT_MS) as u64,
    );

    let mut opts = ConnectOptions::new(dsn.clone());
    opts.max_connections(max_conns)
        .acquire_timeout(Duration::from_secs(5))
        .sqlx_logging(false)
        .map_sqlx_sqlite_opts(move |o| o.create_if_missing(true).busy_timeout(busy_timeout));

    tracing::info!("Connecting to database: {}", dsn);
    let db = Database::connect(opts)
        .await
        .with_context(|| format!("Failed to connect to database '{dsn}'"))?;
    tracing::info!("Connected DB backend: {:?}", db.get_database_backend());
    Ok(db)
}

async fn run_server(config: AppConfig, args: CliArgs) -> Result<()> {
    tracing::info!("Initializing modules...");

    let users_cfg: UsersConfig = config.module_config("users")?;
    let ingress_cfg: ApiIngressConfig = config.module_config("api_ingress")?;

    let ingress =
        ApiIngress::new(ingress_cfg).with_timeout(Duration::from_secs(config.server.timeout_sec));
    let addr = ingress.bind_addr(&config.server.host, config.server.port)?;

    // Base dir for resolving relative sqlite paths (already absolute & created)
    let base_dir = PathBuf::from(&config.server.home_dir);
    let db_config = database_config(&config, &args)?;
    let db = connect_database(&db_config, &base_dir).await?;

    let users = UsersModule::init(db.clone(), users_cfg).await?;
    let router = ingress.build_router(users.register_rest(axum::Router::new()), Some(users.openapi()))?;

    ingress
        .serve(addr, router, shutdown::shutdown_signal())
        .await?;

    tracing::info!("Closing database connection");
    db.close().await.context("Failed to close database")?;
    tracing::info!("Users API server stopped");
    Ok(())
}

fn check_config(config: AppConfig, args: CliArgs) -> Result<()> {
    tracing::info!("Checking configuration...");

    // AppConfig::load_* already normalized & created home_dir
    let _: UsersConfig = config.module_config("users")?;
    let ingress_cfg: ApiIngressConfig = config.module_config("api_ingress")?;
    ApiIngress::new(ingress_cfg).bind_addr(&config.server.host, config.server.port)?;
    database_config(&config, &args)?;

    tracing::info!("Configuration is valid");
    println!("Configuration check passed");
    println!("Server config:");
    println!("{}", config.to_yaml()?);

    Ok(())
}
