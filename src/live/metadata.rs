use std::time::Duration;

use async_trait::async_trait;
use sqlx::{Row, SqlitePool};

use crate::error::{AppError, AppResult};
use crate::types::InspectionMetadata;

/// Source of the camera/plan/product/defect record a live result is merged with.
#[async_trait]
pub trait MetadataStore: Send + Sync {
    /// Latest record for `camera`, or `None` when nothing is planned for it.
    async fn latest_for_camera(&self, camera: &str) -> AppResult<Option<InspectionMetadata>>;
}

/// Reads metadata from the inspection database.
#[derive(Clone)]
pub struct SqliteMetadataStore {
    pool: SqlitePool,
    timeout: Duration,
}

impl SqliteMetadataStore {
    pub fn new(pool: SqlitePool, timeout: Duration) -> Self {
        Self { pool, timeout }
    }
}

// Newest plan for the camera, with its product and the latest defect counters of that lot.
const LATEST_FOR_CAMERA: &str = r#"
    SELECT c.camera_id, c.camera_name, c.location,
           p.lot_no, pr.product_id, pr.product_name, pr.serial_no,
           COALESCE(ds.updated_date, p.start_date) AS product_date_time,
           COALESCE(ds.total_ng, 0) AS total_ng,
           p.plan_quantity AS total_product,
           COALESCE(ds.actual_product, 0) AS actual_product
    FROM planning p
    JOIN cameras c ON c.camera_id = p.camera_id
    JOIN products pr ON pr.product_id = p.product_id
    LEFT JOIN defect_summary ds ON ds.camera_id = p.camera_id AND ds.lot_no = p.lot_no
    WHERE p.camera_id = ?1
    ORDER BY p.start_date DESC, ds.updated_date DESC
    LIMIT 1
"#;

#[async_trait]
impl MetadataStore for SqliteMetadataStore {
    async fn latest_for_camera(&self, camera: &str) -> AppResult<Option<InspectionMetadata>> {
        let query = sqlx::query(LATEST_FOR_CAMERA).bind(camera).fetch_optional(&self.pool);
        let row = match tokio::time::timeout(self.timeout, query).await {
            Ok(res) => res?,
            Err(_) => {
                return Err(AppError::ServiceUnavailable(format!(
                    "metadata lookup for {} timed out",
                    camera
                )))
            }
        };

        let Some(row) = row else {
            return Ok(None);
        };
        Ok(Some(InspectionMetadata {
            camera_id: row.try_get("camera_id")?,
            camera_name: row.try_get("camera_name")?,
            location: row.try_get("location")?,
            lot_no: row.try_get("lot_no")?,
            product_id: row.try_get("product_id")?,
            product_name: row.try_get("product_name")?,
            serial_no: row.try_get("serial_no")?,
            product_date_time: row.try_get("product_date_time")?,
            total_ng: row.try_get("total_ng")?,
            total_product: row.try_get("total_product")?,
            actual_product: row.try_get("actual_product")?,
        }))
    }
}
