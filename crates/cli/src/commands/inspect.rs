use std::path::Path;
use std::process;

use intake_schema::{AnswerValue, FormSchema};

use crate::{report_error, OutputFormat};

pub(crate) fn cmd_inspect(form_path: &Path, output: OutputFormat, quiet: bool) {
    let doc_str = match std::fs::read_to_string(form_path) {
        Ok(s) => s,
        Err(e) => {
            let msg = format!("error reading file '{}': {}", form_path.display(), e);
            report_error(&msg, output, quiet);
            process::exit(1);
        }
    };

    let schema = match intake_schema::load_str(&doc_str) {
        Ok(s) => s,
        Err(e) => {
            report_error(&format!("invalid form schema: {}", e), output, quiet);
            process::exit(1);
        }
    };

    match output {
        OutputFormat::Json => print_json(&schema),
        OutputFormat::Text => print_text(&schema),
    }
}

fn print_json(schema: &FormSchema) {
    let sections: Vec<serde_json::Value> = schema
        .sections
        .iter()
        .map(|section| {
            let fields: Vec<serde_json::Value> = section
                .fields
                .iter()
                .map(|f| {
                    serde_json::json!({
                        "id": f.id,
                        "kind": f.kind.as_str(),
                        "label": f.label,
                        "required": f.required,
                        "options": f.options,
                        "show_if": f.show_if,
                    })
                })
                .collect();
            serde_json::json!({
                "id": section.id,
                "title": section.title,
                "field_count": section.fields.len(),
                "fields": fields,
            })
        })
        .collect();

    let summary = serde_json::json!({
        "id": schema.id,
        "version": schema.version,
        "title": schema.title,
        "section_count": schema.sections.len(),
        "field_count": schema.field_count(),
        "sections": sections,
    });
    println!(
        "{}",
        serde_json::to_string_pretty(&summary).unwrap_or_else(|e| format!("{{\"error\": \"{}\"}}", e))
    );
}

fn print_text(schema: &FormSchema) {
    println!("{} ({}, v{})", schema.title, schema.id, schema.version);
    println!(
        "{} section(s), {} field(s)",
        schema.sections.len(),
        schema.field_count()
    );

    for section in &schema.sections {
        println!();
        println!("Section: {} ({})", section.title, section.id);
        for f in &section.fields {
            let required = if f.required { "required" } else { "" };
            let mut line = format!("  {:<20} {:<10} {:<9} {}", f.id, f.kind.as_str(), required, f.label);
            if let Some(options) = &f.options {
                line.push_str(&format!("  [{}]", options.join(" | ")));
            }
            if let Some(cond) = &f.show_if {
                let expected = match &cond.equals {
                    AnswerValue::Bool(b) => b.to_string(),
                    AnswerValue::Text(s) => format!("\"{}\"", s),
                };
                line.push_str(&format!("  (when {} = {})", cond.field, expected));
            }
            println!("{}", line.trim_end());
        }
    }
}
