use clap::Subcommand;
use serde_json::json;

use crate::cli::import::resolve_language;
use crate::cli::utils::{output_empty_collection, output_success, output_value};
use crate::cli::OutputFormat;
use crate::gateway::{HttpGateway, LanguageSource};
use crate::models::Language;

#[derive(Subcommand)]
pub enum LanguageCommands {
    #[command(about = "List languages offered to editors")]
    List {
        #[arg(long, help = "Include deactivated languages")]
        all: bool,
    },

    #[command(about = "Offer a language to editors again")]
    Enable {
        #[arg(help = "Language ID, code or name")]
        language: String,
    },

    #[command(about = "Stop offering a language to editors")]
    Disable {
        #[arg(help = "Language ID, code or name")]
        language: String,
    },
}

fn print_languages(languages: &[Language]) {
    println!("{:<36}  {:<4}  {:<6}  NAME", "ID", "CODE", "ACTIVE");
    for language in languages {
        println!(
            "{:<36}  {:<4}  {:<6}  {}",
            language.id,
            language.code,
            if language.is_active { "yes" } else { "no" },
            language.label()
        );
    }
}

async fn toggle(
    gateway: &HttpGateway,
    raw: &str,
    is_active: bool,
    output_format: &OutputFormat,
) -> anyhow::Result<()> {
    let languages = gateway.all_languages().await?;
    let id = resolve_language(&languages, raw)?;
    let language = gateway.set_language_active(id, is_active).await?;
    let verb = if language.is_active { "enabled" } else { "disabled" };
    output_success(
        output_format,
        &format!("Language {} {}", language.name, verb),
        Some(json!({ "language": language })),
    )
}

pub async fn handle(cmd: LanguageCommands, gateway: HttpGateway, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        LanguageCommands::List { all } => {
            let languages = if all {
                gateway.all_languages().await?
            } else {
                gateway.active_languages().await?
            };
            if languages.is_empty() {
                return output_empty_collection(&output_format, "languages", "No languages found");
            }
            output_value(&output_format, &languages, |l| print_languages(l))
        }
        LanguageCommands::Enable { language } => toggle(&gateway, &language, true, &output_format).await,
        LanguageCommands::Disable { language } => toggle(&gateway, &language, false, &output_format).await,
    }
}
