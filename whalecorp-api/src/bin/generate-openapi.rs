//! OpenAPI Specification Generator Binary
//!
//! Prints the WhaleCorp API OpenAPI document as JSON on stdout.
//!
//! Usage:
//!   cargo run -p whalecorp-api --bin generate-openapi > openapi.json

use utoipa::OpenApi;
use whalecorp_api::ApiDoc;

fn main() {
    let spec = ApiDoc::openapi();

    match serde_json::to_string_pretty(&spec) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Failed to serialize OpenAPI spec: {}", e);
            std::process::exit(1);
        }
    }
}
