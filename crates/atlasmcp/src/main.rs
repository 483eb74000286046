#![allow(unused)]

use crate::prelude::*;
use clap::Parser;

mod atlassian;
mod mcp;
mod prelude;
mod server;

#[derive(Debug, clap::Parser)]
#[command(
    author,
    version,
    about,
    long_about = "Jira and Confluence operations exposed as MCP tools and a REST facade"
)]
pub struct App {
    #[command(subcommand)]
    pub command: SubCommands,

    #[clap(flatten)]
    global: Global,
}

#[derive(Debug, Clone, clap::Args)]
pub struct Global {
    /// Whether to display additional information.
    #[clap(long, env = "ATLASMCP_VERBOSE", global = true, default_value = "false")]
    verbose: bool,
}

#[derive(Debug, clap::Parser)]
pub enum SubCommands {
    /// Start the HTTP server (MCP transports plus the REST facade)
    Serve(server::ServeOptions),

    /// Start an MCP server on stdin/stdout
    Stdio,
}

/// Process-wide context: the global flags plus one authenticated client
/// per vendor, built once at transport startup and passed explicitly to
/// every access-layer call.
pub struct AppContext {
    pub global: Global,
    pub jira: atlassian::JiraClient,
    pub confluence: atlassian::ConfluenceClient,
}

impl AppContext {
    pub fn from_env(global: Global) -> Result<Self> {
        Ok(Self {
            global,
            jira: atlassian::JiraClient::from_env()?,
            confluence: atlassian::ConfluenceClient::from_env()?,
        })
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    color_eyre::install()?;

    let app = App::parse();

    match app.command {
        SubCommands::Serve(options) => server::run(options, app.global).await,
        SubCommands::Stdio => mcp::stdio::run_stdio(app.global).await,
    }
    .map_err(|err: color_eyre::eyre::Report| eyre!(err))
}
