//! Runtime configuration, built once at startup and passed explicitly.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};

pub const DEFAULT_ENGINE_URL: &str = "http://localhost:9200";
pub const DEFAULT_INDEX: &str = "ap89-index";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Where the search engine lives and how to authenticate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    pub url: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub index: String,
    pub timeout: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_ENGINE_URL.to_string(),
            username: None,
            password: None,
            index: DEFAULT_INDEX.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl EngineConfig {
    /// Read `ES_URL`, `ES_USERNAME`, `ES_PASSWORD`, `ES_INDEX` and
    /// `ES_TIMEOUT_SECS`, falling back to defaults for unset variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();

        let timeout = match lookup("ES_TIMEOUT_SECS") {
            Some(secs) => Duration::from_secs(
                secs.trim()
                    .parse()
                    .with_context(|| format!("ES_TIMEOUT_SECS is not a number: {secs:?}"))?,
            ),
            None => defaults.timeout,
        };

        Ok(Self {
            url: lookup("ES_URL").unwrap_or(defaults.url),
            username: lookup("ES_USERNAME").filter(|u| !u.is_empty()),
            password: lookup("ES_PASSWORD"),
            index: lookup("ES_INDEX").unwrap_or(defaults.index),
            timeout,
        })
    }
}

/// Location and naming of the corpus files, and ingestion knobs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorpusConfig {
    pub data_dir: PathBuf,
    pub stopwords_path: PathBuf,
    /// Corpus files start with this prefix.
    pub file_prefix: String,
    /// Appended to a raw file name to name its repaired copy.
    pub repaired_suffix: String,
    /// Rewrite repaired files that already exist.
    pub force_repair: bool,
    /// Maximum in-flight document writes; 1 submits strictly in order.
    pub submit_concurrency: usize,
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data/ap89_collection"),
            stopwords_path: PathBuf::from("data/stoplist.txt"),
            file_prefix: "ap89".to_string(),
            repaired_suffix: ".xml".to_string(),
            force_repair: false,
            submit_concurrency: 1,
        }
    }
}

/// Which engine serves the index.
#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EngineKind {
    /// Elasticsearch over HTTP, configured by `EngineConfig`.
    #[default]
    Elastic,
    /// In-memory Tantivy indexes, lost on exit.
    Local,
}

/// Engine flags shared by the binaries. Set flags override the environment.
#[derive(Args, Debug, Clone, Default)]
pub struct EngineArgs {
    /// Search engine backend
    #[arg(long, value_enum, default_value_t = EngineKind::Elastic)]
    pub engine: EngineKind,

    /// Engine base URL (overrides ES_URL)
    #[arg(long)]
    pub es_url: Option<String>,

    /// Index name (overrides ES_INDEX)
    #[arg(long)]
    pub index: Option<String>,

    /// Basic auth user (overrides ES_USERNAME)
    #[arg(long)]
    pub username: Option<String>,

    /// Basic auth password (overrides ES_PASSWORD)
    #[arg(long)]
    pub password: Option<String>,
}

impl EngineArgs {
    pub fn apply(&self, mut config: EngineConfig) -> EngineConfig {
        if let Some(url) = &self.es_url {
            config.url = url.clone();
        }
        if let Some(index) = &self.index {
            config.index = index.clone();
        }
        if let Some(username) = &self.username {
            config.username = Some(username.clone());
        }
        if let Some(password) = &self.password {
            config.password = Some(password.clone());
        }
        config
    }
}

/// Corpus flags shared by the binaries.
#[derive(Args, Debug, Clone)]
pub struct CorpusArgs {
    /// Directory holding the raw corpus files
    #[arg(long, default_value = "data/ap89_collection")]
    pub data_dir: PathBuf,

    /// Stopword list, one word per line
    #[arg(long, default_value = "data/stoplist.txt")]
    pub stopwords: PathBuf,

    /// Rewrite repaired files that already exist
    #[arg(long, default_value_t = false)]
    pub force_repair: bool,

    /// Maximum concurrent document writes
    #[arg(long, default_value_t = 1)]
    pub concurrency: usize,
}

impl From<CorpusArgs> for CorpusConfig {
    fn from(args: CorpusArgs) -> Self {
        Self {
            data_dir: args.data_dir,
            stopwords_path: args.stopwords,
            force_repair: args.force_repair,
            submit_concurrency: args.concurrency.max(1),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use clap::Parser;

    use super::*;

    #[derive(Parser)]
    struct Cli {
        #[command(flatten)]
        engine: EngineArgs,
        #[command(flatten)]
        corpus: CorpusArgs,
    }

    #[test]
    fn flags_override_environment() {
        let cli = Cli::parse_from([
            "test",
            "--engine",
            "local",
            "--index",
            "scratch",
            "--username",
            "admin",
            "--concurrency",
            "0",
        ]);
        assert_eq!(cli.engine.engine, EngineKind::Local);

        let config = cli.engine.apply(EngineConfig::default());
        assert_eq!(config.index, "scratch");
        assert_eq!(config.username.as_deref(), Some("admin"));
        assert_eq!(config.url, DEFAULT_ENGINE_URL);

        let corpus = CorpusConfig::from(cli.corpus);
        assert_eq!(corpus.submit_concurrency, 1);
        assert_eq!(corpus, CorpusConfig::default());
    }

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = EngineConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn reads_credentials_and_index() {
        let config = EngineConfig::from_lookup(lookup(&[
            ("ES_URL", "https://search.example.com:9243"),
            ("ES_USERNAME", "elastic"),
            ("ES_PASSWORD", "secret"),
            ("ES_INDEX", "ap89-test"),
            ("ES_TIMEOUT_SECS", " 5 "),
        ]))
        .unwrap();

        assert_eq!(config.url, "https://search.example.com:9243");
        assert_eq!(config.username.as_deref(), Some("elastic"));
        assert_eq!(config.password.as_deref(), Some("secret"));
        assert_eq!(config.index, "ap89-test");
        assert_eq!(config.timeout, Duration::from_secs(5));
    }

    #[test]
    fn rejects_bad_timeout() {
        let err = EngineConfig::from_lookup(lookup(&[("ES_TIMEOUT_SECS", "soon")])).unwrap_err();
        assert!(err.to_string().contains("ES_TIMEOUT_SECS"));
    }
}
