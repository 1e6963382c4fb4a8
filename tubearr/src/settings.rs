use sqlx::{Row, SqlitePool};

/// Key/value store for the handful of UI preferences that survive a
/// restart: theme and the preview filter selections.
pub struct Settings;

impl Settings {
    pub async fn get(pool: &SqlitePool, key: &str) -> Result<Option<String>, sqlx::Error> {
        let row = sqlx::query("SELECT value FROM settings WHERE key = ?")
            .bind(key)
            .fetch_optional(pool)
            .await?;
        Ok(row.map(|r| r.get("value")))
    }

    pub async fn set(pool: &SqlitePool, key: &str, value: &str) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO settings (key, value) VALUES (?, ?) ON CONFLICT(key) DO UPDATE SET value = excluded.value"
        )
        .bind(key)
        .bind(value)
        .execute(pool)
        .await?;
        Ok(())
    }

    pub async fn get_theme(pool: &SqlitePool) -> Result<String, sqlx::Error> {
        Ok(Self::get(pool, "theme")
            .await?
            .unwrap_or_else(|| "dark".to_string()))
    }

    pub async fn get_resolution_filter(pool: &SqlitePool) -> Result<String, sqlx::Error> {
        Ok(Self::get(pool, "resolution_filter")
            .await?
            .unwrap_or_else(|| "all".to_string()))
    }

    pub async fn get_format_filter(pool: &SqlitePool) -> Result<String, sqlx::Error> {
        Ok(Self::get(pool, "format_filter")
            .await?
            .unwrap_or_else(|| "all".to_string()))
    }
}
