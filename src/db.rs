use sqlx::SqlitePool;

/// Applies connection pragmas and creates the tables the live lookup reads.
///
/// The CRUD side of the inspection system owns these tables; creating them
/// here keeps a fresh database queryable.
pub async fn init_db(pool: &SqlitePool) -> anyhow::Result<()> {
    if let Err(e) = sqlx::query("PRAGMA journal_mode=WAL;").execute(pool).await {
        tracing::warn!("Failed to set WAL journal mode: {}", e);
    }
    if let Err(e) = sqlx::query("PRAGMA synchronous=NORMAL;").execute(pool).await {
        tracing::warn!("Failed to set synchronous mode: {}", e);
    }
    // Foreign keys are critical - fail if this doesn't work
    sqlx::query("PRAGMA foreign_keys=ON;").execute(pool).await?;
    if let Err(e) = sqlx::query("PRAGMA busy_timeout=10000;").execute(pool).await {
        tracing::warn!("Failed to set busy_timeout: {}", e);
    }

    sqlx::query(
        r#"CREATE TABLE IF NOT EXISTS cameras (
            camera_id TEXT PRIMARY KEY,
            camera_name TEXT NOT NULL,
            location TEXT NOT NULL DEFAULT '',
            status INTEGER NOT NULL DEFAULT 1,
            created_date TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%SZ','now'))
        )"#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"CREATE TABLE IF NOT EXISTS products (
            product_id TEXT PRIMARY KEY,
            product_name TEXT NOT NULL,
            product_type_id TEXT NULL,
            serial_no TEXT NOT NULL DEFAULT '',
            barcode TEXT NOT NULL DEFAULT '',
            pack_size INTEGER NOT NULL DEFAULT 0,
            status INTEGER NOT NULL DEFAULT 1
        )"#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"CREATE TABLE IF NOT EXISTS planning (
            plan_id TEXT PRIMARY KEY,
            product_id TEXT NOT NULL,
            camera_id TEXT NOT NULL,
            lot_no TEXT NOT NULL,
            line_id TEXT NULL,
            plan_quantity INTEGER NOT NULL DEFAULT 0,
            start_date TEXT NOT NULL,
            end_date TEXT NULL,
            FOREIGN KEY(product_id) REFERENCES products(product_id),
            FOREIGN KEY(camera_id) REFERENCES cameras(camera_id)
        )"#,
    )
    .execute(pool)
    .await?;

    // Running NG/actual counters per camera and lot, maintained by the inspection line
    sqlx::query(
        r#"CREATE TABLE IF NOT EXISTS defect_summary (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            camera_id TEXT NOT NULL,
            lot_no TEXT NOT NULL,
            total_ng INTEGER NOT NULL DEFAULT 0,
            actual_product INTEGER NOT NULL DEFAULT 0,
            updated_date TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%SZ','now')),
            FOREIGN KEY(camera_id) REFERENCES cameras(camera_id)
        )"#,
    )
    .execute(pool)
    .await?;

    let indexes = [
        ("idx_planning_camera_start", "CREATE INDEX IF NOT EXISTS idx_planning_camera_start ON planning(camera_id, start_date DESC)"),
        ("idx_defect_summary_camera_lot", "CREATE INDEX IF NOT EXISTS idx_defect_summary_camera_lot ON defect_summary(camera_id, lot_no, updated_date DESC)"),
    ];

    for (name, query) in indexes {
        if let Err(e) = sqlx::query(query).execute(pool).await {
            tracing::warn!("Failed to create index {}: {}", name, e);
        }
    }

    Ok(())
}
