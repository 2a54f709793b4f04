pub mod commands;
pub mod config;
pub mod import;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

use crate::gateway::HttpGateway;

#[derive(Parser)]
#[command(name = "ssl")]
#[command(about = "Church SSL CLI - manage study lessons, languages and notes")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in human-readable text format")]
    pub text: bool,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[arg(long, global = true, env = "SSL_SERVER", help = "Lesson server base URL")]
    pub server: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Lesson server selection and health")]
    Server {
        #[command(subcommand)]
        cmd: commands::server::ServerCommands,
    },

    #[command(about = "Create, edit, search and delete lessons")]
    Lesson {
        #[command(subcommand)]
        cmd: commands::lesson::LessonCommands,
    },

    #[command(about = "List and toggle lesson languages")]
    Language {
        #[command(subcommand)]
        cmd: commands::language::LanguageCommands,
    },

    #[command(about = "Personal study notes stored locally")]
    Note {
        #[command(subcommand)]
        cmd: commands::note::NoteCommands,
    },

    #[command(about = "Activity feed")]
    Notify {
        #[command(subcommand)]
        cmd: commands::notify::NotifyCommands,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

/// Gateway client for the resolved server URL
pub fn gateway(server: Option<String>) -> anyhow::Result<HttpGateway> {
    let server = config::resolve_server(server)?;
    Ok(HttpGateway::new(&server)?)
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);
    let server = cli.server;

    match cli.command {
        Commands::Server { cmd } => commands::server::handle(cmd, server, output_format).await,
        Commands::Lesson { cmd } => commands::lesson::handle(cmd, gateway(server)?, output_format).await,
        Commands::Language { cmd } => commands::language::handle(cmd, gateway(server)?, output_format).await,
        Commands::Note { cmd } => commands::note::handle(cmd, output_format),
        Commands::Notify { cmd } => commands::notify::handle(cmd, gateway(server)?, output_format).await,
    }
}
