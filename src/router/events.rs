// Message, push, notification click and sync events
// Author: kelexine (https://github.com/kelexine)

use super::CacheRouter;
use crate::cache::{limit_cache_size, CacheStorage};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

const CLEAN_CACHE: &str = "CLEAN_CACHE";
const EXPLORE_ACTION: &str = "explore";
const CLOSE_ACTION: &str = "close";
const BACKGROUND_SYNC_TAG: &str = "background-sync";

/// A message posted by a client page.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ClientMessage {
    pub action: String,
}

/// Entries removed by a `CLEAN_CACHE` message.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct CleanupReport {
    pub dynamic_removed: usize,
    pub static_removed: usize,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct NotificationAction {
    pub action: String,
    pub title: String,
    pub icon: String,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NotificationData {
    /// Milliseconds since the Unix epoch.
    pub date_of_arrival: i64,
    pub primary_key: u32,
}

/// A system notification to display.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub body: String,
    pub icon: String,
    pub badge: String,
    pub vibrate: Vec<u32>,
    pub data: NotificationData,
    pub actions: Vec<NotificationAction>,
}

/// What a notification click does. The notification is always closed.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ClickOutcome {
    pub close: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub open_url: Option<String>,
}

impl CacheRouter {
    /// Handle a client message. Only `CLEAN_CACHE` is recognized; anything
    /// else is ignored and yields `None`.
    pub async fn handle_message(&self, message: &ClientMessage) -> Option<CleanupReport> {
        crate::metrics::record_event("message");
        if message.action != CLEAN_CACHE {
            debug!("Ignoring message with action {:?}", message.action);
            return None;
        }
        Some(self.clean_caches().await)
    }

    /// Trim both partitions to their configured caps, oldest entries first.
    pub async fn clean_caches(&self) -> CleanupReport {
        let storage = self.storage.as_ref();
        let (dynamic_removed, static_removed) = futures::join!(
            limit_cache_size(storage, &self.config.dynamic_cache, self.config.dynamic_max_entries),
            limit_cache_size(storage, &self.config.static_cache, self.config.static_max_entries),
        );

        for partition in [&self.config.dynamic_cache, &self.config.static_cache] {
            crate::metrics::update_cache_entries(partition, storage.keys(partition).await.len());
        }

        info!(
            "Cache cleanup removed {} dynamic and {} static entries",
            dynamic_removed, static_removed
        );
        CleanupReport {
            dynamic_removed,
            static_removed,
        }
    }

    /// Build the notification for a push message. No payload, no notification.
    pub fn handle_push(&self, payload: Option<&str>) -> Option<Notification> {
        crate::metrics::record_event("push");
        let body = payload?;
        let settings = &self.config.notifications;

        Some(Notification {
            title: settings.title.clone(),
            body: body.to_string(),
            icon: settings.icon.clone(),
            badge: settings.badge.clone(),
            vibrate: vec![100, 50, 100],
            data: NotificationData {
                date_of_arrival: chrono::Utc::now().timestamp_millis(),
                primary_key: 1,
            },
            actions: vec![
                NotificationAction {
                    action: EXPLORE_ACTION.to_string(),
                    title: "Explore Portfolio".to_string(),
                    icon: "/src/assets/images/explore-icon.png".to_string(),
                },
                NotificationAction {
                    action: CLOSE_ACTION.to_string(),
                    title: "Close".to_string(),
                    icon: "/src/assets/images/close-icon.png".to_string(),
                },
            ],
        })
    }

    /// `explore` opens the site root; every other action only dismisses.
    pub fn handle_notification_click(&self, action: Option<&str>) -> ClickOutcome {
        crate::metrics::record_event("notificationclick");
        let open_url = match action {
            Some(EXPLORE_ACTION) => Some(self.config.notifications.explore_url.clone()),
            _ => None,
        };
        ClickOutcome {
            close: true,
            open_url,
        }
    }

    /// Run background sync for the `background-sync` tag. Returns whether the
    /// tag was recognized.
    pub async fn handle_sync(&self, tag: &str) -> bool {
        crate::metrics::record_event("sync");
        if tag != BACKGROUND_SYNC_TAG {
            debug!("Ignoring sync tag {:?}", tag);
            return false;
        }
        // no queued work yet; the tag is acknowledged and logged
        info!("Background sync triggered");
        true
    }
}
