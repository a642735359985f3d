use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Identifier of one camera feed. Sole key of the live hub.
pub type CameraKey = String;

/// Inspection result pushed by the producer for one camera.
///
/// The five detection sections the dashboard knows about are named; any other
/// top-level section is kept in `extra` and passed through untouched.
/// `liveStream` and `status` are only honoured when they are strings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub live_stream: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color_detection: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_classification: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component_detection: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_counting: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub barcode_reading: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl UpdatePayload {
    /// All detection sections, named ones first, in a stable order.
    pub fn sections(&self) -> impl Iterator<Item = &Value> {
        [
            &self.color_detection,
            &self.type_classification,
            &self.component_detection,
            &self.object_counting,
            &self.barcode_reading,
        ]
        .into_iter()
        .flatten()
        .chain(self.extra.values())
    }
}

/// Latest joined camera/plan/product/defect record for a camera.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InspectionMetadata {
    pub camera_id: String,
    pub camera_name: String,
    pub location: String,
    pub lot_no: String,
    pub product_id: String,
    pub product_name: String,
    pub serial_no: String,
    pub product_date_time: String,
    pub total_ng: i64,
    pub total_product: i64,
    pub actual_product: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentInspection {
    pub product_id: String,
    pub product_name: String,
    pub serial_no: String,
    pub product_date_time: String,
}

/// One message streamed to a live subscriber.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergedResult {
    pub live_stream: String,
    pub location: String,
    pub camera_id: String,
    pub camera_name: String,
    pub status: InspectionStatus,
    pub lot_no: String,
    #[serde(rename = "totalNG")]
    pub total_ng: i64,
    pub total_product: i64,
    pub actual_product: i64,
    pub current_inspection: CurrentInspection,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color_detection: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_classification: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component_detection: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_counting: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub barcode_reading: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum InspectionStatus {
    Ok,
    Ng,
}

/// Inline message sent instead of a result when enrichment is not possible.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub error: String,
}

/// Answer of the push endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PushStatus {
    Queued { clients: usize },
    NoActiveSocket,
}

/// Fan-out size and backlog of one camera.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CameraStats {
    pub camera_id: String,
    pub clients: usize,
    pub pending: usize,
}

/// Messages a live client may send over its socket.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum ClientCommand {
    Join {
        #[serde(rename = "cameraId")]
        camera_id: String,
    },
    Leave,
}
