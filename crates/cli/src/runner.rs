//! `intake run` — interactive flash-mode form session in the terminal.
//!
//! One question per step, `y`/`n` answers on boolean fields advance
//! immediately, `back` retreats without validation. The draft is saved
//! after every step, so Ctrl-D (or a crash) loses nothing: rerunning
//! the command resumes at the same question.

use std::io::{self, BufRead, Write};
use std::path::Path;
use std::process;

use intake_engine::{FlashAdapter, FormSession, SessionState};
use intake_schema::FieldKind;
use intake_storage::FileDraftStore;

use crate::submit_http::HttpSubmitter;
use crate::{report_error, OutputFormat};

pub(crate) struct RunOptions<'a> {
    pub form: &'a Path,
    pub token: &'a str,
    pub draft_dir: &'a Path,
    pub submit_url: Option<&'a str>,
    pub output: OutputFormat,
    pub quiet: bool,
}

pub(crate) fn cmd_run(opts: RunOptions<'_>) {
    let doc_str = match std::fs::read_to_string(opts.form) {
        Ok(s) => s,
        Err(e) => {
            let msg = format!("error reading file '{}': {}", opts.form.display(), e);
            report_error(&msg, opts.output, opts.quiet);
            process::exit(1);
        }
    };
    let schema = match intake_schema::load_str(&doc_str) {
        Ok(s) => s,
        Err(e) => {
            report_error(&format!("invalid form schema: {}", e), opts.output, opts.quiet);
            process::exit(1);
        }
    };

    let store = FileDraftStore::new(opts.draft_dir);
    let mut flash = FlashAdapter::new(FormSession::start(&schema, opts.token, store));

    if !opts.quiet {
        println!("{}", schema.title);
        println!("Answer each question. 'back' returns to the previous one; Ctrl-D saves and exits.");
    }

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    let mut last_section = String::new();

    loop {
        let is_boolean = match render_step(&flash, &mut last_section) {
            Some(is_boolean) => is_boolean,
            None => break, // session left the editing state
        };

        let Some(Ok(line)) = lines.next() else {
            if !opts.quiet {
                println!();
                println!("Draft saved; rerun to resume.");
            }
            return;
        };
        let input = line.trim();

        if input == "back" {
            flash.back();
            continue;
        }
        if is_boolean {
            match input {
                "y" | "yes" | "Y" => {
                    flash.answer_boolean(true);
                }
                "n" | "no" | "N" => {
                    flash.answer_boolean(false);
                }
                _ => println!("please answer y or n"),
            }
        } else {
            flash.set_text(input);
            flash.next();
        }

        if matches!(flash.session().state(), SessionState::Submitting { .. }) {
            break;
        }
    }

    finish(flash, &opts);
}

/// Print the current question. Returns whether it is boolean, or `None`
/// once no field is left to render.
fn render_step(
    flash: &FlashAdapter<'_, FileDraftStore>,
    last_section: &mut String,
) -> Option<bool> {
    let view = flash.view();
    let flat = view.field?;

    if flat.section_title != last_section.as_str() {
        println!();
        println!("── {} ──", flat.section_title);
        *last_section = flat.section_title.to_string();
    }

    println!();
    println!(
        "[{}/{} {:>3}%] {}",
        view.step, view.total, view.progress_pct, flat.field.label
    );
    if let Some(options) = &flat.field.options {
        println!("        options: {}", options.join(" | "));
    }
    if let Some(placeholder) = &flat.field.placeholder {
        println!("        e.g. {}", placeholder);
    }
    if let Some(value) = view.value {
        // Resumed sessions show the previously-entered answer.
        if !value.is_blank() {
            if let Some(text) = value.as_text() {
                println!("        current: {}", text);
            }
        }
    }
    if let Some(err) = view.error {
        println!("        !! {}", err);
    }
    if let Some(submit_err) = view.submit_error {
        println!("        !! last attempt failed: {}", submit_err);
    }

    let is_boolean = flat.field.kind == FieldKind::Boolean;
    let prompt = if is_boolean { "(y/n/back) > " } else { "> " };
    print!("{}", prompt);
    io::stdout().flush().ok();
    Some(is_boolean)
}

/// All questions answered: submit if a URL was given, otherwise print
/// the answer set and keep the draft.
fn finish(mut flash: FlashAdapter<'_, FileDraftStore>, opts: &RunOptions<'_>) {
    // A schema whose conditions leave nothing visible never saw an
    // advance; run one so the vacuously-valid set reaches Submitting.
    if matches!(flash.session().state(), SessionState::Editing { .. }) {
        flash.next();
    }
    let answers = intake_engine::answers_to_json(flash.session().answers());

    let Some(url) = opts.submit_url else {
        if !opts.quiet {
            println!();
            println!("All questions answered. No --submit-url given; draft retained.");
        }
        println!(
            "{}",
            serde_json::to_string_pretty(&answers).unwrap_or_else(|e| format!("{{\"error\": \"{}\"}}", e))
        );
        return;
    };

    let submitter = HttpSubmitter::new(url);
    let rt = tokio::runtime::Runtime::new().expect("failed to create tokio runtime");
    match rt.block_on(flash.submit(&submitter)) {
        Ok(receipt) => {
            if !opts.quiet {
                println!();
            }
            match opts.output {
                OutputFormat::Text => println!("Submitted. Record id: {}", receipt.record_id),
                OutputFormat::Json => {
                    println!("{{\"record_id\": \"{}\"}}", receipt.record_id)
                }
            }
        }
        Err(e) => {
            report_error(&e.to_string(), opts.output, opts.quiet);
            if !opts.quiet {
                if e.is_terminal() {
                    eprintln!("This session cannot be retried.");
                } else {
                    eprintln!("Your draft is saved; rerun with the same token to retry.");
                }
            }
            process::exit(1);
        }
    }
}
