use activity_stream::{ActivityStreamClient, ClientConfig, EventHandlers};
use anyhow::Result;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "activity_stream=info".into()),
        )
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => activity_stream::load_config(&path)
            .map_err(|e| anyhow::anyhow!("failed to load config {}: {}", path, e))?,
        None => ClientConfig::default(),
    };

    info!(endpoint = %config.endpoint, "Activity stream client starting");

    let handlers = EventHandlers::new()
        .on_connected(|| info!("Connected to activity stream"))
        .on_disconnected(|reason| warn!(code = ?reason.code, reason = %reason.reason, "Disconnected"))
        .on_error(|message| error!(message = %message, "Stream error"))
        .on_subscription_confirmed(|activity_id| {
            info!(activity_id = %activity_id, "Subscription confirmed")
        })
        .on_activity_updated(|activity| info!(activity = %activity, "Activity updated"))
        .on_task_updated(|task, activity_id| {
            info!(activity_id = %activity_id, task = %task, "Task updated")
        })
        .on_milestone_updated(|milestone, activity_id| {
            info!(activity_id = %activity_id, milestone = %milestone, "Milestone updated")
        })
        .on_checklist_updated(|checklist, activity_id| {
            info!(activity_id = %activity_id, checklist = %checklist, "Checklist updated")
        })
        .on_comment_added(|comment, activity_id| {
            info!(activity_id = %activity_id, comment = %comment, "Comment added")
        })
        .on_time_log_updated(|time_log, activity_id| {
            info!(activity_id = %activity_id, time_log = %time_log, "Time log updated")
        });

    let client = ActivityStreamClient::new(config, handlers);
    client.connect().await;

    // Subscribe to any activity ids passed after the config path
    for activity_id in std::env::args().skip(2) {
        client.subscribe_to_activity(activity_id).await;
    }

    tokio::signal::ctrl_c().await?;
    info!("Shutting down");
    client.disconnect("client shutting down").await;

    Ok(())
}
