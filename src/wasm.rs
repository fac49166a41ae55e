use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::filter::{self, FilterSpec};
use crate::lifecycle::mapping::{self, OrderStatus};
use crate::lifecycle::{LifecycleEngine, Stage};
use crate::normalize::{self, OrderView};
use crate::stats::OrderStats;
use crate::types::{NormalizeContext, RawService};

fn to_js<T: Serialize>(value: &T) -> JsValue {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .unwrap_or(JsValue::NULL)
}

fn error_result(msg: &str) -> JsValue {
    to_js(&serde_json::json!({ "error": msg }))
}

fn context(today: Option<String>) -> Result<NormalizeContext, String> {
    match today.as_deref() {
        Some(date) => NormalizeContext::from_date_str(date).map_err(|e| e.to_string()),
        None => Ok(NormalizeContext::today()),
    }
}

fn parse_views(json: &str) -> Result<Vec<OrderView>, String> {
    serde_json::from_str(json).map_err(|e| format!("Invalid views JSON: {e}"))
}

/// Normalize a JSON array of backend orders into views.
///
/// `today` (`YYYY-MM-DD`) pins the purchase-date fallback; defaults to the
/// browser's local date.
#[wasm_bindgen]
pub fn normalize_orders(json: &str, today: Option<String>) -> JsValue {
    let ctx = match context(today) {
        Ok(ctx) => ctx,
        Err(e) => return error_result(&e),
    };
    match normalize::normalize_json(json, &ctx) {
        Ok(views) => to_js(&views),
        Err(e) => error_result(&e.to_string()),
    }
}

/// Resolve the stage of a single service payload.
#[wasm_bindgen]
pub fn resolve_service_stage(json: &str) -> JsValue {
    let service: RawService = match serde_json::from_str(json) {
        Ok(s) => s,
        Err(_) => return error_result("Invalid JSON"),
    };
    let resolution = LifecycleEngine::resolve_stage(&service);
    to_js(&serde_json::json!({
        "stage": resolution.stage,
        "stageLabel": resolution.stage.label(),
        "progress": resolution.progress,
        "color": resolution.stage.color(),
    }))
}

/// Filter previously normalized views with a `FilterSpec` JSON object.
#[wasm_bindgen]
pub fn filter_orders(views_json: &str, spec_json: &str) -> JsValue {
    let views = match parse_views(views_json) {
        Ok(v) => v,
        Err(e) => return error_result(&e),
    };
    let spec = match FilterSpec::from_json(spec_json) {
        Ok(s) => s,
        Err(e) => return error_result(&format!("Invalid filter: {e}")),
    };
    to_js(&filter::filter(&views, &spec))
}

#[wasm_bindgen]
pub fn order_stats(views_json: &str) -> JsValue {
    match parse_views(views_json) {
        Ok(views) => to_js(&OrderStats::from_views(&views)),
        Err(e) => error_result(&e),
    }
}

/// Display label for a stage token or label, or null if unknown.
#[wasm_bindgen]
pub fn stage_label(stage: &str) -> Option<String> {
    Stage::parse_any(stage).map(|s| s.label().to_string())
}

#[wasm_bindgen]
pub fn stage_color(stage: &str) -> Option<String> {
    Stage::parse_any(stage).map(|s| s.color().to_string())
}

/// Normalized label for a backend status name; unknown names pass through.
#[wasm_bindgen]
pub fn status_label(nome: &str) -> String {
    mapping::normalize_status(nome)
}

#[wasm_bindgen]
pub fn status_color(label: &str) -> String {
    mapping::status_color(label).to_string()
}

/// All stages in lifecycle order with label, colour and progress.
#[wasm_bindgen]
pub fn get_all_stages() -> JsValue {
    let stages: Vec<serde_json::Value> = Stage::ALL
        .iter()
        .map(|s| {
            serde_json::json!({
                "id": s.to_string(),
                "label": s.label(),
                "color": s.color(),
                "progress": s.progress(),
            })
        })
        .collect();
    to_js(&stages)
}

#[wasm_bindgen]
pub fn get_all_statuses() -> JsValue {
    let statuses: Vec<serde_json::Value> = OrderStatus::ALL
        .iter()
        .map(|s| {
            serde_json::json!({
                "label": s.label(),
                "color": s.color(),
            })
        })
        .collect();
    to_js(&statuses)
}
