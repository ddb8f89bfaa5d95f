//! Top-level CLI parsing and command execution.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing::info;

use crate::config::ListenConfig;
use crate::entities::profile::resolve_profile;
use crate::entities::suggestion::{SuggestionRequest, SuggestionResponse};
use crate::gateway::Gateway;
use crate::link::AmigoLinker;
use crate::server::{AppState, Pages};
use crate::sources::golr::{DEFAULT_ROWS, GolrClient};

pub mod health;

#[derive(Parser, Debug)]
#[command(
    name = "amigo-opensearch",
    about = "OpenSearch suggestions for Gene Ontology terms and gene products, backed by GOlr",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Output as JSON instead of Markdown
    #[arg(short, long, global = true)]
    pub json: bool,

    /// GOlr base URL (default: $GOLR_URL or http://golr.berkeleybop.org/)
    #[arg(long, global = true)]
    pub golr_url: Option<String>,

    /// AmiGO base URL used for result links (default: $AMIGO_URL or http://amigo.geneontology.org)
    #[arg(long, global = true)]
    pub amigo_url: Option<String>,

    /// Maximum suggestions per request
    #[arg(long, global = true, default_value_t = DEFAULT_ROWS)]
    pub rows: usize,

    /// Backend deadline in seconds (0 waits indefinitely)
    #[arg(long, global = true, default_value = "20")]
    pub timeout_secs: u64,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the OpenSearch HTTP service (default)
    Serve {
        /// Address to bind (default: detected from the environment)
        #[arg(long)]
        host: Option<String>,
        /// Port to listen on (default: detected from the environment)
        #[arg(long)]
        port: Option<u16>,
        /// Host advertised in descriptor URLs
        #[arg(long)]
        public_host: Option<String>,
        /// Static page served at /index.html
        #[arg(long, default_value = crate::server::pages::INDEX_HTML_PATH)]
        index_html: PathBuf,
    },
    /// Run one suggestion query and print the result
    #[command(after_help = "\
EXAMPLES:
  amigo-opensearch suggest term apopto
  amigo-opensearch suggest gene_product pax6 --json")]
    Suggest {
        /// Entity type (term, gene_product)
        entity: String,
        /// Partial query text
        query: Option<String>,
    },
    /// Print the OpenSearch descriptor XML for an entity type
    Osd {
        /// Entity type (term, gene_product)
        entity: String,
        /// Host advertised in descriptor URLs
        #[arg(long)]
        public_host: Option<String>,
    },
    /// Check GOlr and AmiGO connectivity
    Health,
    /// Show version
    Version,
}

impl Cli {
    fn golr_client(&self) -> anyhow::Result<GolrClient> {
        let client = match self.golr_url.as_deref() {
            Some(base) => GolrClient::with_base(base)?,
            None => GolrClient::new()?,
        };
        Ok(client.rows(self.rows))
    }

    fn linker(&self) -> AmigoLinker {
        match self.amigo_url.as_deref() {
            Some(base) => AmigoLinker::with_base(base),
            None => AmigoLinker::new(),
        }
    }

    fn deadline(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }

    pub fn gateway(&self) -> anyhow::Result<Gateway> {
        Ok(Gateway::new(Arc::new(self.golr_client()?), Arc::new(self.linker()))
            .with_deadline(self.deadline()))
    }

    fn pages(&self, public_host: &str) -> anyhow::Result<Pages> {
        let linker = self.linker();
        let search_form = format!("{}/", linker.base());
        Ok(Pages::render(
            public_host,
            &linker.search_template(),
            &search_form,
        )?)
    }
}

fn suggestion_markdown(entity: &str, response: &SuggestionResponse) -> String {
    let mut out = format!("# Suggestions: {entity} \"{}\"\n\n", response.query);
    if response.is_empty() {
        out.push_str("No suggestions found.\n");
        return out;
    }
    out.push_str("| Label | ID | Link |\n");
    out.push_str("|-------|----|------|\n");
    for ((label, id), link) in response
        .labels
        .iter()
        .zip(&response.ids)
        .zip(&response.links)
    {
        out.push_str(&format!("| {label} | {id} | {link} |\n"));
    }
    out.push_str(&format!("\n{} result(s)\n", response.len()));
    out
}

fn version_output() -> String {
    let version = env!("CARGO_PKG_VERSION");
    let git = option_env!("AMIGO_OPENSEARCH_BUILD_GIT_SHA").unwrap_or("unknown");
    let build = option_env!("AMIGO_OPENSEARCH_BUILD_DATE").unwrap_or("unknown");
    format!("amigo-opensearch {version} (git {git}, build {build})")
}

/// Runs the HTTP service until a termination signal arrives.
///
/// # Errors
///
/// Returns an error when clients or pages cannot be built, or the listener fails.
pub async fn serve(cli: &Cli) -> anyhow::Result<()> {
    let (host, port, public_host, index_html) = match &cli.command {
        Some(Commands::Serve {
            host,
            port,
            public_host,
            index_html,
        }) => (
            host.clone(),
            *port,
            public_host.clone(),
            index_html.clone(),
        ),
        _ => (
            None,
            None,
            None,
            PathBuf::from(crate::server::pages::INDEX_HTML_PATH),
        ),
    };

    let listen = ListenConfig::from_env().with_overrides(host, port, public_host);
    info!(
        environment = ?listen.environment,
        bind = %listen.bind_addr(),
        public_host = %listen.public_host,
        "resolved listen configuration"
    );

    let gateway = cli.gateway()?;
    let pages = cli
        .pages(&listen.public_host)?
        .load_index_html(&index_html)
        .await?;
    let app = crate::server::router(AppState::new(gateway, pages));
    crate::server::serve(app, &listen.bind_addr()).await
}

/// Executes one parsed CLI command and returns rendered output.
///
/// # Errors
///
/// Returns an error if the entity type is unknown, the backend fails, or rendering fails.
pub async fn run(cli: Cli) -> anyhow::Result<String> {
    match &cli.command {
        Some(Commands::Suggest { entity, query }) => {
            let request = SuggestionRequest::new(entity.as_str(), query.as_deref());
            let response = cli.gateway()?.suggest(&request).await?;
            if cli.json {
                Ok(serde_json::to_string(&response)?)
            } else {
                Ok(suggestion_markdown(entity, &response))
            }
        }
        Some(Commands::Osd {
            entity,
            public_host,
        }) => {
            let profile = resolve_profile(entity)?;
            let public_host = public_host
                .clone()
                .unwrap_or_else(|| ListenConfig::from_env().public_host);
            let linker = cli.linker();
            Ok(crate::server::pages::render_descriptor(
                profile,
                &public_host,
                &linker.search_template(),
                &format!("{}/", linker.base()),
            )?)
        }
        Some(Commands::Health) => {
            let golr = cli.golr_client()?;
            let report = health::check(golr.base(), cli.linker().base()).await?;
            if cli.json {
                Ok(serde_json::to_string_pretty(&report)?)
            } else {
                Ok(report.to_markdown())
            }
        }
        Some(Commands::Version) => Ok(version_output()),
        Some(Commands::Serve { .. }) | None => {
            anyhow::bail!("serve command should not go through CLI run()")
        }
    }
}
