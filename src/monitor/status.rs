use chrono::Utc;
use serde::Serialize;

/// One machine-readable status line, for piping `--json` output elsewhere.
#[derive(Debug, Serialize)]
pub struct StatusLine<T: Serialize> {
    pub ts: String,
    pub event: &'static str,
    #[serde(flatten)]
    pub data: T,
}

pub fn render<T: Serialize>(event: &'static str, data: T) -> Option<String> {
    let entry = StatusLine {
        ts: Utc::now().format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string(),
        event,
        data,
    };
    serde_json::to_string(&entry).ok()
}

pub fn emit<T: Serialize>(event: &'static str, data: T) {
    if let Some(json) = render(event, data) {
        println!("{json}");
    }
}
