//! this binary starts the yatta server
//! to see the list of options, type: `yatta-server --help`

use std::path::PathBuf;
use std::process::exit;

use clap::{crate_version, App, Arg, ArgMatches};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;
use yatta::config::{parse_addr, DEFAULT_ADDRESS};
use yatta::{
    PasswordHash, PoolKind, RayonThreadPool, Result, ServerConfig, SharedQueueThreadPool, ThreadPool,
    YattaError, YattaServer,
};

fn main() {
    let matches = App::new("yatta-server")
        .version(crate_version!())
        .about("a multi-user task list server")
        .arg(Arg::with_name("addr")
            .long("addr")
            .value_name("IP_ADDR:PORT")
            .help("sets the IP_ADDR:PORT that the server listens on")
            .default_value(DEFAULT_ADDRESS))
        .arg(Arg::with_name("data-dir")
            .long("data-dir")
            .value_name("DIR")
            .help("sets the directory holding the database files")
            .default_value("."))
        .arg(Arg::with_name("pool")
            .long("pool")
            .value_name("POOL")
            .help("sets the thread pool serving connections")
            .possible_values(&["shared", "rayon"])
            .default_value("shared"))
        .arg(Arg::with_name("threads")
            .long("threads")
            .value_name("N")
            .help("sets the number of threads in the pool")
            .default_value("4"))
        .arg(Arg::with_name("hash-cost")
            .long("hash-cost")
            .value_name("COST")
            .help("sets the Argon2 time cost used to hash new passwords")
            .default_value("2"))
        .arg(Arg::with_name("log-level")
            .long("log-level")
            .value_name("LEVEL")
            .help("sets the most verbose level that is logged: trace, debug, info, warn or error")
            .default_value("info"))
        .get_matches();

    let level = match parse_level(&matches) {
        Ok(level) => level,
        Err(err) => {
            eprintln!("{}", err);
            exit(1);
        }
    };
    // set up a tracing subscriber to log to STDERR
    subscriber_config(level);

    let config = match build_config(&matches) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{}", err);
            exit(1);
        }
    };

    if let Err(e) = run(config) {
        eprintln!("{}", e);
        exit(1);
    }
}

fn run(config: ServerConfig) -> Result<()> {
    info!("yatta-server {}", env!("CARGO_PKG_VERSION"));
    info!("Thread pool: {} ({} threads)", config.pool, config.threads);

    let (tasks, users) = config.open_stores()?;
    match config.pool {
        PoolKind::Shared => {
            let pool = SharedQueueThreadPool::new(config.threads)?;
            YattaServer::new(tasks, users, pool, config.hash_cost).run(config.addr)
        }
        PoolKind::Rayon => {
            let pool = RayonThreadPool::new(config.threads)?;
            YattaServer::new(tasks, users, pool, config.hash_cost).run(config.addr)
        }
    }
}

/// validates the command line options and collects them into a [`ServerConfig`]
/// # Errors
/// returns [`YattaError::Parsing`] if one of the options is invalid
fn build_config(matches: &ArgMatches) -> Result<ServerConfig> {
    let defaults = ServerConfig::default();

    let addr = match matches.value_of("addr") {
        Some(addr) => parse_addr(addr)?,
        None => defaults.addr,
    };
    let data_dir = matches
        .value_of("data-dir")
        .map(PathBuf::from)
        .unwrap_or(defaults.data_dir);
    let pool = match matches.value_of("pool") {
        Some(pool) => pool.parse()?,
        None => defaults.pool,
    };
    let threads = parse_number(matches, "threads")?.unwrap_or(defaults.threads);
    if threads == 0 {
        return Err(YattaError::Parsing("threads must be at least 1".to_string()));
    }
    let hash_cost = parse_number(matches, "hash-cost")?.unwrap_or(defaults.hash_cost);
    if hash_cost < PasswordHash::MIN_COST {
        return Err(YattaError::Parsing(format!(
            "hash-cost must be at least {}",
            PasswordHash::MIN_COST
        )));
    }

    Ok(ServerConfig {
        addr,
        data_dir,
        pool,
        threads,
        hash_cost,
    })
}

fn parse_number(matches: &ArgMatches, name: &str) -> Result<Option<u32>> {
    matches
        .value_of(name)
        .map(|value| {
            value
                .parse::<u32>()
                .map_err(|_| YattaError::Parsing(format!("{} must be a number, got {}", name, value)))
        })
        .transpose()
}

fn parse_level(matches: &ArgMatches) -> Result<Level> {
    let level = matches.value_of("log-level").unwrap_or("info");
    level
        .parse()
        .map_err(|_| YattaError::Parsing(format!("unknown log level {}", level)))
}

/// configures a tracing subscriber that will log to STDERR
fn subscriber_config(level: Level) {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("setting tracing default subscriber failed");
}
