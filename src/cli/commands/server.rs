use clap::Subcommand;
use serde_json::{json, Value};

use crate::cli::config::{load_cli_config, ping_server, resolve_server, save_cli_config};
use crate::cli::utils::{output_success, output_value};
use crate::cli::OutputFormat;

#[derive(Subcommand)]
pub enum ServerCommands {
    #[command(about = "Save the server URL used when --server and SSL_SERVER are absent")]
    Use {
        #[arg(help = "Server base URL, e.g. http://localhost:3000")]
        url: String,
    },

    #[command(about = "Show the server URL in effect")]
    Current,

    #[command(about = "Check server health via the /health endpoint")]
    Health,

    #[command(about = "Show server information from the API root endpoint")]
    Info,
}

pub async fn handle(cmd: ServerCommands, server: Option<String>, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        ServerCommands::Use { url } => {
            let parsed = url::Url::parse(&url).map_err(|e| anyhow::anyhow!("Invalid server URL '{}': {}", url, e))?;
            let mut config = load_cli_config()?;
            config.server = Some(parsed.as_str().trim_end_matches('/').to_string());
            save_cli_config(&config)?;
            output_success(
                &output_format,
                &format!("Using server {}", url),
                Some(json!({ "server": config.server })),
            )
        }
        ServerCommands::Current => {
            let server = resolve_server(server)?;
            output_value(&output_format, &json!({ "server": server }), |_| println!("{}", server))
        }
        ServerCommands::Health => {
            let server = resolve_server(server)?;
            if ping_server(&server).await {
                output_success(&output_format, &format!("{} is healthy", server), None)
            } else {
                Err(anyhow::anyhow!("{} is unreachable or degraded", server))
            }
        }
        ServerCommands::Info => {
            let server = resolve_server(server)?;
            let body: Value = reqwest::get(format!("{}/", server.trim_end_matches('/')))
                .await?
                .error_for_status()?
                .json()
                .await?;
            let data = body.get("data").cloned().unwrap_or(Value::Null);
            output_value(&output_format, &data, |data| {
                let field = |name: &str| data.get(name).and_then(Value::as_str).unwrap_or("-").to_string();
                println!("Server: {}", server);
                println!("Name: {}", field("name"));
                println!("Version: {}", field("version"));
            })
        }
    }
}
