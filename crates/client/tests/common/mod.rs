#![allow(dead_code)]

use marquee_core::AppConfig;
use serde_json::{Value, json};
use tracing_subscriber::EnvFilter;

pub const API_KEY: &str = "test-key";

/// Install a test-writer subscriber once; honours `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env()).with_test_writer().try_init();
}

pub fn config(base_url: &str) -> AppConfig {
    AppConfig { base_url: Some(base_url.to_string()), api_key: Some(API_KEY.to_string()), ..Default::default() }
}

/// A list/search page body whose ids start at `first_id`.
pub fn page_body(page: u32, total_pages: u32, per_page: u64, first_id: u64) -> Value {
    let results: Vec<Value> = (first_id..first_id + per_page)
        .map(|id| json!({ "id": id, "title": format!("Movie {id}"), "poster_path": format!("/{id}.jpg") }))
        .collect();

    json!({
        "page": page,
        "results": results,
        "total_pages": total_pages,
        "total_results": u64::from(total_pages) * per_page,
    })
}
