//! services/api/src/bin/openapi.rs
//!
//! Writes the OpenAPI document for the chat API, REST routes plus the
//! WebSocket frame schemas, and lists what it documents.
//!
//! Usage: `openapi [OUTPUT]`. OUTPUT defaults to `openapi.json`; `-` prints the
//! document to stdout. The route summary always goes to stderr.

use api_lib::web::rest::ApiDoc;
use utoipa::OpenApi;

const DEFAULT_OUTPUT: &str = "openapi.json";

fn write_document(
    api_doc: &utoipa::openapi::OpenApi,
    output: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let spec_json = api_doc.to_pretty_json()?;
    if output == "-" {
        println!("{}", spec_json);
    } else {
        std::fs::write(output, spec_json)?;
        eprintln!("OpenAPI document written to {}", output);
    }
    Ok(())
}

/// One line per documented route, e.g. `POST   /uploads`.
fn route_summary(api_doc: &utoipa::openapi::OpenApi) -> Vec<String> {
    let mut lines = Vec::new();
    for (path, item) in &api_doc.paths.paths {
        let methods = [
            ("GET", item.get.is_some()),
            ("POST", item.post.is_some()),
            ("DELETE", item.delete.is_some()),
        ];
        for (method, present) in methods {
            if present {
                lines.push(format!("{:<6} {}", method, path));
            }
        }
    }
    lines
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let output = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_OUTPUT.to_string());
    let api_doc = ApiDoc::openapi();
    write_document(&api_doc, &output)?;

    let schemas = api_doc
        .components
        .as_ref()
        .map_or(0, |components| components.schemas.len());
    let routes = route_summary(&api_doc);
    eprintln!("{} routes, {} schemas:", routes.len(), schemas);
    for line in routes {
        eprintln!("  {}", line);
    }
    Ok(())
}
