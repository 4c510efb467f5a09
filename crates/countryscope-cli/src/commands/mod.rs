mod explore;
mod list;
mod show;

use std::process::ExitCode;
use std::sync::Arc;

use countryscope_core::{
    ExplorerConfig, FixtureHttpClient, HttpClient, QueryCache, ReqwestHttpClient,
    RestCountriesSource, RetryConfig,
};
use tracing::debug;

use crate::cli::{Cli, Command, OutputFormat};
use crate::error::CliError;

/// Exit code when the countries could not be loaded.
pub const FETCH_FAILED: u8 = 3;

/// Everything a command needs: the cache over the configured source plus
/// the output settings.
pub struct Session {
    pub cache: QueryCache,
    pub format: OutputFormat,
    pub pretty: bool,
}

impl Session {
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        let mut config = ExplorerConfig::default().with_timeout_ms(cli.timeout_ms);
        if let Some(endpoint) = &cli.endpoint {
            config = config.with_endpoint(endpoint.clone());
        }
        config.cache.retry = if cli.retries == 0 {
            RetryConfig::no_retry()
        } else {
            RetryConfig::exponential(cli.retries)
        };
        config.validate()?;

        let http_client: Arc<dyn HttpClient> = match &cli.fixture {
            Some(path) => {
                debug!(path = %path.display(), "serving countries from fixture");
                Arc::new(FixtureHttpClient::new(path.clone()))
            }
            None => Arc::new(ReqwestHttpClient::new(&config.user_agent)),
        };
        let source = RestCountriesSource::with_http_client(http_client, &config);
        debug!(endpoint = source.endpoint(), "countries source configured");

        Ok(Self {
            cache: QueryCache::new(Arc::new(source), config.cache.clone()),
            format: cli.format,
            pretty: cli.pretty,
        })
    }
}

pub async fn run(cli: &Cli) -> Result<ExitCode, CliError> {
    let session = Session::from_cli(cli)?;

    match &cli.command {
        Command::List(args) => list::run(args, &session).await,
        Command::Show(args) => show::run(args, &session).await,
        Command::Explore => explore::run(&session).await,
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use clap::Parser;

    use super::*;

    const FIXTURE: &str = r#"[
        {"name":{"common":"Peru","official":"Republic of Peru","nativeName":{}},
         "flags":{"png":"pe.png"},"region":"Americas","latlng":[-10,-76],
         "population":33000000,"timezones":["UTC-05:00"],"currencies":{},"capital":["Lima"]}
    ]"#;

    #[tokio::test]
    async fn session_reads_fixture_through_cache() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(FIXTURE.as_bytes()).expect("write fixture");

        let path = file.path().to_string_lossy().into_owned();
        let cli = Cli::try_parse_from(["countryscope", "--fixture", path.as_str(), "list"])
            .expect("parses");
        let session = Session::from_cli(&cli).expect("session");

        let countries = session.cache.fetch().await.expect("fixture fetch");
        assert_eq!(countries.len(), 1);
        assert_eq!(countries[0].name.common, "Peru");
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let cli = Cli::try_parse_from(["countryscope", "--timeout-ms", "0", "list"])
            .expect("parses");
        let error = Session::from_cli(&cli).err().expect("invalid timeout");
        assert_eq!(error.exit_code(), 2);
    }

    #[test]
    fn zero_retries_disables_retrying() {
        let cli =
            Cli::try_parse_from(["countryscope", "--retries", "0", "list"]).expect("parses");
        let session = Session::from_cli(&cli).expect("session");
        assert!(!session.cache.config().retry.should_retry(0));
    }
}
