use std::path::Path;
use std::process;

use crate::{report_error, OutputFormat};

static FORM_SCHEMA_STR: &str = include_str!("../../../../docs/form-schema.json");

pub(crate) fn cmd_validate(form_path: &Path, output: OutputFormat, quiet: bool) {
    // Parse the embedded formal schema
    let form_schema: serde_json::Value = match serde_json::from_str(FORM_SCHEMA_STR) {
        Ok(s) => s,
        Err(e) => {
            let msg = format!("internal error: failed to parse embedded form schema: {}", e);
            report_error(&msg, output, quiet);
            process::exit(1);
        }
    };

    // Read and parse the document file
    let doc_str = match std::fs::read_to_string(form_path) {
        Ok(s) => s,
        Err(e) => {
            let msg = format!("error reading file '{}': {}", form_path.display(), e);
            report_error(&msg, output, quiet);
            process::exit(1);
        }
    };

    let doc: serde_json::Value = match serde_json::from_str(&doc_str) {
        Ok(v) => v,
        Err(e) => {
            let msg = format!("error parsing JSON in '{}': {}", form_path.display(), e);
            report_error(&msg, output, quiet);
            process::exit(1);
        }
    };

    let validator = match jsonschema::validator_for(&form_schema) {
        Ok(v) => v,
        Err(e) => {
            let msg = format!("internal error: failed to compile schema: {}", e);
            report_error(&msg, output, quiet);
            process::exit(1);
        }
    };

    let mut errors: Vec<String> = validator.iter_errors(&doc).map(|e| format!("{}", e)).collect();

    // Structural rules (unique ids, option sets, visibility references)
    // only run once the document matches the formal shape.
    if errors.is_empty() {
        if let Err(e) = intake_schema::load_str(&doc_str) {
            errors.push(e.to_string());
        }
    }

    if errors.is_empty() {
        if !quiet {
            match output {
                OutputFormat::Text => println!("valid"),
                OutputFormat::Json => println!("{{\"valid\": true}}"),
            }
        }
        return;
    }

    match output {
        OutputFormat::Text => {
            if !quiet {
                eprintln!("invalid form schema");
                for err in &errors {
                    eprintln!("  {}", err);
                }
            }
        }
        OutputFormat::Json => {
            let payload = serde_json::json!({"valid": false, "errors": errors});
            eprintln!(
                "{}",
                serde_json::to_string_pretty(&payload)
                    .unwrap_or_else(|_| "{\"valid\": false}".to_string())
            );
        }
    }
    process::exit(1);
}
