use crate::{
    commands::{Commands, SourceArgs},
    env::{DATABASE_URL_VAR, EnvManager},
    error::CliError,
};
use clap::Parser;
use connectors::{
    memory::store::MemoryStore,
    sql::{generator::QueryGenerator, postgres::store::PgStore},
    store::SampleStore,
};
use planner::query::dialect::{Dialect, MySql, Postgres};
use sample_filter::{FilterSpec, compile_now, count_samples, metric_query, trend_series};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

mod commands;
mod env;
mod error;
mod output;

#[derive(Parser)]
#[command(name = "qctrend", version = "0.1.0", about = "QC metric trends over filtered samples")]
struct Cli {
    #[arg(long, global = true, help = "Read extra environment variables from this .env file")]
    env_file: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    // Initialize logger
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let env = load_env(cli.env_file.as_deref())?;

    match cli.command {
        Commands::Validate { filter } => {
            let spec = read_spec(&filter).await?;
            let query = compile_now(&spec);

            println!("{} group(s)", spec.groups.len());
            for (i, group) in spec.groups.iter().enumerate() {
                let kinds = group.iter().map(|p| p.kind()).collect::<Vec<_>>();
                println!("  group {}: {}", i + 1, kinds.join(" AND "));
            }
            match &query.filter {
                Some(filter) => println!("{filter}"),
                None => println!("<every row>"),
            }
        }
        Commands::Sql {
            filter,
            key,
            dialect,
        } => {
            let spec = read_spec(&filter).await?;
            let mut query = compile_now(&spec);
            if let Some(key) = key {
                query = metric_query(&query, &key);
            }

            let dialect = parse_dialect(&dialect)?;
            let (sql, params) = QueryGenerator::new(dialect.as_ref()).select(&query)?;
            output::print_sql(&sql, &params);
        }
        Commands::Count { filter, source } => {
            let spec = read_spec(&filter).await?;
            let query = compile_now(&spec);

            let store = open_store(&source, &env).await?;
            let count = count_samples(store.as_ref(), &query).await?;
            println!("{count} samples");
        }
        Commands::Trend {
            filter,
            fields,
            source,
            output,
        } => {
            let spec = read_spec(&filter).await?;
            let keys = serde_json::from_str::<Vec<String>>(&read_arg(&fields).await?)
                .map_err(|e| CliError::InvalidArgument(format!("--fields: {e}")))?;
            let query = compile_now(&spec);

            let store = open_store(&source, &env).await?;
            let series = trend_series(store.as_ref(), &query, &keys).await?;
            info!(keys = keys.len(), series = series.len(), "Built trend series");

            output::write_json(&series, output.as_deref()).await?;
        }
    }

    Ok(())
}

fn load_env(env_file: Option<&str>) -> Result<EnvManager, CliError> {
    let mut env = EnvManager::new();
    match env_file {
        Some(path) => env.load_from_file(path)?,
        None => {
            if let Some(path) = EnvManager::default_file().filter(|p| p.is_file()) {
                debug!(path = %path.display(), "Loading default env file");
                env.load_from_file(path)?;
            }
        }
    }
    Ok(env)
}

/// Reads `value` as is, or the file it names when prefixed with `@`.
async fn read_arg(value: &str) -> Result<String, CliError> {
    match value.strip_prefix('@') {
        Some(path) => Ok(tokio::fs::read_to_string(path).await?),
        None => Ok(value.to_string()),
    }
}

async fn read_spec(filter: &str) -> Result<FilterSpec, CliError> {
    let text = read_arg(filter).await?;
    Ok(FilterSpec::from_json(&text)?)
}

fn parse_dialect(name: &str) -> Result<Box<dyn Dialect>, CliError> {
    match name.to_ascii_lowercase().as_str() {
        "postgres" | "postgresql" | "pg" => Ok(Box::new(Postgres)),
        "mysql" => Ok(Box::new(MySql)),
        other => Err(CliError::InvalidArgument(format!(
            "unknown dialect '{other}', expected postgres or mysql"
        ))),
    }
}

async fn open_store(
    source: &SourceArgs,
    env: &EnvManager,
) -> Result<Box<dyn SampleStore>, CliError> {
    if let Some(path) = &source.fixture {
        return Ok(Box::new(MemoryStore::load(path)?));
    }

    let url = source
        .conn
        .as_deref()
        .or_else(|| env.database_url())
        .ok_or(CliError::MissingSource(DATABASE_URL_VAR))?;
    Ok(Box::new(PgStore::connect(url).await?))
}
