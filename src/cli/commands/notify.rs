use clap::Subcommand;
use serde_json::json;

use crate::cli::utils::{output_empty_collection, output_success, output_value, truncate};
use crate::cli::OutputFormat;
use crate::gateway::HttpGateway;
use crate::models::{NewNotification, Notification};
use crate::types::NotificationKind;

#[derive(Subcommand)]
pub enum NotifyCommands {
    #[command(about = "Show the most recent activity feed entries")]
    List,

    #[command(about = "Post an entry to the activity feed")]
    Post {
        title: String,
        message: String,
        #[arg(long = "type", default_value = "info", help = "info, success, warning or error")]
        kind: NotificationKind,
    },
}

fn print_notifications(notifications: &[Notification]) {
    for n in notifications {
        println!(
            "{}  {:<7}  {}: {}",
            n.created_at.format("%Y-%m-%d %H:%M"),
            n.kind.as_str(),
            n.title,
            truncate(&n.message, 60)
        );
    }
}

pub async fn handle(cmd: NotifyCommands, gateway: HttpGateway, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        NotifyCommands::List => {
            let notifications = gateway.notifications().await?;
            if notifications.is_empty() {
                return output_empty_collection(&output_format, "notifications", "No activity yet");
            }
            output_value(&output_format, &notifications, |n| print_notifications(n))
        }
        NotifyCommands::Post { title, message, kind } => {
            let posted = gateway.notify(&NewNotification::new(title, message, kind)).await?;
            output_success(
                &output_format,
                &format!("Posted '{}'", posted.title),
                Some(json!({ "notification": posted })),
            )
        }
    }
}
