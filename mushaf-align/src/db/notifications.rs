//! Outcome notifications

use crate::db::parse_uuid;
use crate::error::PersistenceError;
use crate::services::ports::OutcomeReport;
use serde::Serialize;
use sqlx::SqlitePool;
use uuid::Uuid;

/// Notification status for reports that need no user action
pub const STATUS_NOTHING: &str = "nothing";

/// Stored notification row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotificationRow {
    pub guid: Uuid,
    pub user_guid: Uuid,
    pub resource_controller: String,
    pub resource_action: String,
    pub resource_uuid: Option<String>,
    pub status: String,
    pub description: String,
    pub message: String,
    pub message_type: String,
}

pub async fn insert_notification(
    pool: &SqlitePool,
    report: &OutcomeReport,
) -> Result<Uuid, PersistenceError> {
    let guid = Uuid::new_v4();

    sqlx::query(
        r#"
        INSERT INTO notifications (
            guid, user_guid, resource_controller, resource_action, resource_uuid,
            status, description, message, message_type, created_at
        ) VALUES (?, ?, ?, '', ?, ?, ?, ?, ?, CURRENT_TIMESTAMP)
        "#,
    )
    .bind(guid.to_string())
    .bind(report.recipient.to_string())
    .bind(&report.controller)
    .bind(report.resource_uuid.to_string())
    .bind(STATUS_NOTHING)
    .bind(&report.description)
    .bind(&report.message)
    .bind(report.kind.as_str())
    .execute(pool)
    .await?;

    Ok(guid)
}

pub async fn list_for_user(
    pool: &SqlitePool,
    user_guid: Uuid,
) -> Result<Vec<NotificationRow>, PersistenceError> {
    let rows = sqlx::query_as::<
        _,
        (String, String, String, Option<String>, String, String, String, String),
    >(
        r#"
        SELECT guid, resource_controller, resource_action, resource_uuid,
               status, description, message, message_type
        FROM notifications
        WHERE user_guid = ?
        ORDER BY created_at, rowid
        "#,
    )
    .bind(user_guid.to_string())
    .fetch_all(pool)
    .await?;

    rows.into_iter()
        .map(
            |(guid, controller, action, resource_uuid, status, description, message, kind)| {
                Ok(NotificationRow {
                    guid: parse_uuid(&guid, "notifications.guid")?,
                    user_guid,
                    resource_controller: controller,
                    resource_action: action,
                    resource_uuid,
                    status,
                    description,
                    message,
                    message_type: kind,
                })
            },
        )
        .collect()
}
