use serde_json::{Map, Value};

use crate::config::CAMERA_ID_PLACEHOLDER;
use crate::types::{CurrentInspection, InspectionMetadata, InspectionStatus, MergedResult, UpdatePayload};

/// Sent in place of a result when the camera has no planning/defect record.
pub const NO_METADATA_ERROR: &str = "No defect + planning found";
/// Sent in place of a result when the metadata store could not be queried.
pub const LOOKUP_FAILED_ERROR: &str = "Metadata lookup failed";

// Keys a producer section must not shadow in the merged output.
const RESERVED_KEYS: &[&str] = &[
    "liveStream",
    "location",
    "cameraId",
    "cameraName",
    "status",
    "lotNo",
    "totalNG",
    "totalProduct",
    "actualProduct",
    "currentInspection",
];

/// Merges one producer payload with the metadata read for its camera.
pub fn merge(
    camera: &str,
    payload: &UpdatePayload,
    meta: &InspectionMetadata,
    stream_url_template: &str,
) -> MergedResult {
    let live_stream = payload
        .live_stream
        .as_ref()
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| stream_url_template.replace(CAMERA_ID_PLACEHOLDER, camera));

    let extra: Map<String, Value> = payload
        .extra
        .iter()
        .filter(|(k, _)| !RESERVED_KEYS.contains(&k.as_str()))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();

    MergedResult {
        live_stream,
        location: meta.location.clone(),
        camera_id: meta.camera_id.clone(),
        camera_name: meta.camera_name.clone(),
        status: overall_status(payload),
        lot_no: meta.lot_no.clone(),
        total_ng: meta.total_ng,
        total_product: meta.total_product,
        actual_product: meta.actual_product,
        current_inspection: CurrentInspection {
            product_id: meta.product_id.clone(),
            product_name: meta.product_name.clone(),
            serial_no: meta.serial_no.clone(),
            product_date_time: meta.product_date_time.clone(),
        },
        color_detection: payload.color_detection.clone(),
        type_classification: payload.type_classification.clone(),
        component_detection: payload.component_detection.clone(),
        object_counting: payload.object_counting.clone(),
        barcode_reading: payload.barcode_reading.clone(),
        extra,
    }
}

/// Producer verdict if it sent a valid one, otherwise NG as soon as one
/// detection section reports NG.
pub fn overall_status(payload: &UpdatePayload) -> InspectionStatus {
    if let Some(status) = payload.status.as_ref().and_then(Value::as_str).and_then(parse_status) {
        return status;
    }

    let any_ng = payload.sections().any(|section| {
        section.get("status").and_then(Value::as_str).and_then(parse_status) == Some(InspectionStatus::Ng)
    });
    if any_ng {
        InspectionStatus::Ng
    } else {
        InspectionStatus::Ok
    }
}

fn parse_status(raw: &str) -> Option<InspectionStatus> {
    match raw.trim().to_ascii_uppercase().as_str() {
        "OK" => Some(InspectionStatus::Ok),
        "NG" => Some(InspectionStatus::Ng),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const TEMPLATE: &str = "http://127.0.0.1:8001/live-defect/{camera_id}";

    fn meta() -> InspectionMetadata {
        InspectionMetadata {
            camera_id: "CAM1".to_string(),
            camera_name: "Line 1 top".to_string(),
            location: "Zone A".to_string(),
            lot_no: "LOT-2025".to_string(),
            product_id: "P-001".to_string(),
            product_name: "Bottle".to_string(),
            serial_no: "CB550GT50".to_string(),
            product_date_time: "2025-06-01T08:00:00Z".to_string(),
            total_ng: 3,
            total_product: 5000,
            actual_product: 4000,
        }
    }

    #[test]
    fn test_merge_uses_metadata_and_template() {
        let payload = UpdatePayload { color_detection: Some(json!({"ok": true})), ..Default::default() };
        let merged = merge("CAM1", &payload, &meta(), TEMPLATE);

        assert_eq!(merged.live_stream, "http://127.0.0.1:8001/live-defect/CAM1");
        assert_eq!(merged.camera_id, "CAM1");
        assert_eq!(merged.status, InspectionStatus::Ok);
        assert_eq!(merged.current_inspection.serial_no, "CB550GT50");
        assert_eq!(merged.color_detection, Some(json!({"ok": true})));

        let wire = serde_json::to_value(&merged).unwrap();
        assert_eq!(wire["totalNG"], 3);
        assert_eq!(wire["totalProduct"], 5000);
        assert_eq!(wire["currentInspection"]["productDateTime"], "2025-06-01T08:00:00Z");
        assert_eq!(wire["status"], "OK");
        assert!(wire.get("barcodeReading").is_none());
    }

    #[test]
    fn test_producer_stream_wins_over_template() {
        let payload = UpdatePayload { live_stream: Some("rtsp://edge/cam1".into()), ..Default::default() };
        let merged = merge("CAM1", &payload, &meta(), TEMPLATE);
        assert_eq!(merged.live_stream, "rtsp://edge/cam1");
    }

    #[test]
    fn test_status_derived_from_sections() {
        let payload: UpdatePayload = serde_json::from_value(json!({
            "colorDetection": {"status": "OK"},
            "barcodeReading": {"status": "ng"}
        }))
        .unwrap();
        assert_eq!(overall_status(&payload), InspectionStatus::Ng);

        let explicit = UpdatePayload { status: Some("ok".into()), ..payload };
        assert_eq!(overall_status(&explicit), InspectionStatus::Ok);
    }

    #[test]
    fn test_non_string_status_and_stream_fall_back() {
        let payload: UpdatePayload = serde_json::from_value(json!({
            "status": 1,
            "liveStream": {"url": "rtsp://x"},
            "colorDetection": {"status": "NG"}
        }))
        .unwrap();
        let merged = merge("CAM1", &payload, &meta(), TEMPLATE);

        assert_eq!(merged.status, InspectionStatus::Ng);
        assert_eq!(merged.live_stream, "http://127.0.0.1:8001/live-defect/CAM1");
    }

    #[test]
    fn test_unknown_sections_pass_through_but_cannot_shadow() {
        let payload: UpdatePayload = serde_json::from_value(json!({
            "ocrReading": {"text": "A12"},
            "cameraId": "spoofed"
        }))
        .unwrap();
        let wire = serde_json::to_value(merge("CAM1", &payload, &meta(), TEMPLATE)).unwrap();

        assert_eq!(wire["ocrReading"], json!({"text": "A12"}));
        assert_eq!(wire["cameraId"], "CAM1");
    }
}
