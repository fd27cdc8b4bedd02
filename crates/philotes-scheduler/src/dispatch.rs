//! Notification dispatch: sends notifications to configured targets.
//! Supports: Discord Webhook, HTTP Webhook.

use philotes_core::config::PhilotesConfig;
use philotes_core::error::{PhilotesError, Result};

use super::notify::{Notification, NotifyPriority};

/// Notification target configuration.
#[derive(Debug, Clone, PartialEq)]
pub enum NotifyTarget {
    /// Discord Webhook URL.
    Discord { webhook_url: String },
    /// Generic HTTP webhook, POST with JSON body.
    Webhook {
        url: String,
        headers: Vec<(String, String)>,
    },
}

/// Dispatch a notification to a target.
pub async fn dispatch(notification: &Notification, target: &NotifyTarget) -> Result<()> {
    match target {
        NotifyTarget::Discord { webhook_url } => send_discord(webhook_url, notification).await,
        NotifyTarget::Webhook { url, headers } => send_webhook(url, headers, notification).await,
    }
}

/// Discord embed body for a notification.
pub fn discord_payload(notification: &Notification) -> serde_json::Value {
    let color = match notification.priority {
        NotifyPriority::Urgent => 0xFF0000,
        NotifyPriority::High => 0xFF8800,
        NotifyPriority::Normal => 0x00AAFF,
        NotifyPriority::Low => 0x888888,
    };
    serde_json::json!({
        "embeds": [{
            "title": notification.title,
            "description": notification.body,
            "color": color,
            "footer": {
                "text": format!("Source: {} • {}", notification.source, notification.timestamp.format("%H:%M:%S UTC"))
            }
        }]
    })
}

/// Generic webhook body for a notification.
pub fn webhook_payload(notification: &Notification) -> serde_json::Value {
    serde_json::json!({
        "title": notification.title,
        "body": notification.body,
        "priority": format!("{:?}", notification.priority),
        "source": notification.source,
        "timestamp": notification.timestamp.to_rfc3339(),
    })
}

async fn send_discord(webhook_url: &str, notification: &Notification) -> Result<()> {
    let client = reqwest::Client::new();
    let resp = client
        .post(webhook_url)
        .json(&discord_payload(notification))
        .timeout(std::time::Duration::from_secs(10))
        .send()
        .await
        .map_err(|e| PhilotesError::Notify(format!("Discord send failed: {e}")))?;

    if resp.status().is_success() {
        tracing::info!("✅ Discord notification sent: {}", notification.title);
        Ok(())
    } else {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        Err(PhilotesError::Notify(format!("Discord webhook error {status}: {body}")))
    }
}

async fn send_webhook(
    url: &str,
    headers: &[(String, String)],
    notification: &Notification,
) -> Result<()> {
    let client = reqwest::Client::new();
    let mut req = client
        .post(url)
        .json(&webhook_payload(notification))
        .timeout(std::time::Duration::from_secs(10));

    for (key, value) in headers {
        req = req.header(key.as_str(), value.as_str());
    }

    let resp = req
        .send()
        .await
        .map_err(|e| PhilotesError::Notify(format!("Webhook send failed: {e}")))?;

    if resp.status().is_success() {
        tracing::info!("✅ Webhook notification sent to {}: {}", url, notification.title);
        Ok(())
    } else {
        Err(PhilotesError::Notify(format!("Webhook error {}", resp.status())))
    }
}

/// Dispatch to every target. Returns (target_name, result) per target.
pub async fn dispatch_all(
    notification: &Notification,
    targets: &[(String, NotifyTarget)],
) -> Vec<(String, Result<()>)> {
    let mut results = Vec::with_capacity(targets.len());
    for (name, target) in targets {
        let result = dispatch(notification, target).await;
        results.push((name.clone(), result));
    }
    results
}

/// Build targets from the `[notify]` config section.
pub fn targets_from_config(config: &PhilotesConfig) -> Vec<(String, NotifyTarget)> {
    let mut targets = Vec::new();

    if let Some(url) = config.notify.discord_webhook_url.as_deref().filter(|u| !u.is_empty()) {
        targets.push((
            "discord".to_string(),
            NotifyTarget::Discord {
                webhook_url: url.to_string(),
            },
        ));
    }

    if let Some(url) = config.notify.webhook_url.as_deref().filter(|u| !u.is_empty()) {
        targets.push((
            "webhook".to_string(),
            NotifyTarget::Webhook {
                url: url.to_string(),
                headers: vec![],
            },
        ));
    }

    targets
}
