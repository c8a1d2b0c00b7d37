//! aidata: tooling for AI learning files
//!
//! An aidata file is a plain-text document in which an AI agent keeps what it
//! has learned about a domain: a `# AI LEARNING FILE: <title>` header followed
//! by `## NAME` sections. Seven sections are mandatory:
//!
//! - `FILE METADATA`: `- **Key**: Value` bullets, including the integrity hash
//! - `DOMAIN CONTEXT`, `KNOWLEDGE REPRESENTATION`, `VALIDATION FRAMEWORK`,
//!   `APPLICATION CONTEXT`: free-form bodies
//! - `EVOLUTION TRACKING`: holds `### Checkpoint History`
//! - `AUTOMATED LEARNINGS`: `### Learning Entry - <timestamp>` records, last
//!
//! # Commands
//!
//! ```bash
//! aidata validate notes.aidata
//! aidata generate-hash notes.aidata
//! aidata deduplicate notes.aidata --auto-confirm
//! aidata add-checkpoint notes.aidata --description "Imported vendor docs"
//! aidata to-json notes.aidata
//! ```
//!
//! Every command reads the file fresh, works on an in-memory
//! [`core::document::Document`] and rewrites the file only on success.
//!
//! # Crate Structure
//!
//! - [`core`]: document model, file I/O, config, errors, logging
//! - [`plugins`]: one module per operation

pub mod core;
pub mod plugins;

mod cli;

use crate::cli::{Cli, Command, OutputFormat};
use crate::core::config::{self, Config};
use crate::core::error::AidataError;
use crate::core::store::WriteMode;
use crate::core::{logging, output, time};
use crate::plugins::{checkpoint, dedupe, export, integrity, sections, validate};

use clap::Parser;
use serde_json::json;
use std::io;

fn write_mode(cfg: &Config, atomic_flag: bool) -> WriteMode {
    if atomic_flag {
        WriteMode::Atomic
    } else {
        cfg.write.mode()
    }
}

fn emit(format: OutputFormat, cmd: &str, status: &str, text: &str, extra: serde_json::Value) {
    match format {
        OutputFormat::Text => println!("{}", text),
        OutputFormat::Json => {
            let envelope = time::command_envelope(cmd, status, extra);
            match serde_json::to_string_pretty(&envelope) {
                Ok(s) => println!("{}", s),
                Err(e) => eprintln!("Failed to render JSON output: {}", e),
            }
        }
    }
}

pub fn run() -> Result<(), AidataError> {
    let cli = Cli::parse();
    let cfg = config::load_config(cli.config.as_deref(), cli.command.file())?;

    let level = cli.log_level.clone().unwrap_or_else(|| cfg.log.level.clone());
    if let Err(e) = logging::init_logging(&level) {
        eprintln!("Warning: {:#}", e);
    }

    let format = cli.format;
    let cmd = cli.command.name();
    match cli.command {
        Command::Validate {
            file,
            strict_metadata,
            skip_integrity,
        } => {
            let mut opts = validate::ValidationOptions::from(&cfg.validation);
            opts.strict_metadata |= strict_metadata;
            opts.verify_integrity &= !skip_integrity;

            let report = validate::validate_file(&file, &opts)?;
            let status = if report.ok { "ok" } else { "fail" };
            if report.ok || format == OutputFormat::Json {
                emit(
                    format,
                    cmd,
                    status,
                    &output::status_line(report.ok, &report.message),
                    serde_json::to_value(&report)?,
                );
            }
            if report.ok {
                Ok(())
            } else {
                Err(AidataError::ValidationError(report.message))
            }
        }

        Command::GenerateHash { file, write } => {
            let refresh = integrity::generate_hash(&file, write_mode(&cfg, write.atomic))?;
            emit(
                format,
                cmd,
                "ok",
                &format!("Integrity hash updated: SHA256-{}", refresh.hash),
                serde_json::to_value(&refresh)?,
            );
            Ok(())
        }

        Command::VerifyHash { file } => {
            let status = integrity::verify_hash(&file)?;
            let ok = status.is_valid();
            if ok || format == OutputFormat::Json {
                emit(
                    format,
                    cmd,
                    if ok { "ok" } else { "fail" },
                    &output::status_line(ok, &status.describe()),
                    json!({ "integrity": status }),
                );
            }
            if ok {
                Ok(())
            } else {
                Err(AidataError::ValidationError(status.describe()))
            }
        }

        Command::Deduplicate {
            file,
            auto_confirm,
            write,
        } => {
            let mode = write_mode(&cfg, write.atomic);
            let outcome = if auto_confirm {
                dedupe::deduplicate_file(&file, mode, |_| true)?
            } else if format == OutputFormat::Json {
                // stdout carries only the envelope.
                dedupe::deduplicate_file(&file, mode, |n| {
                    dedupe::confirm_with(&mut io::stdin().lock(), &mut io::stderr(), n)
                })?
            } else {
                dedupe::deduplicate_file(&file, mode, dedupe::prompt_confirm)?
            };
            match outcome {
                dedupe::DedupeOutcome::Applied { .. } => {
                    emit(
                        format,
                        cmd,
                        "ok",
                        &outcome.message(),
                        serde_json::to_value(outcome)?,
                    );
                    Ok(())
                }
                dedupe::DedupeOutcome::Declined { .. } => {
                    if format == OutputFormat::Json {
                        emit(format, cmd, "cancelled", "", serde_json::to_value(outcome)?);
                    }
                    Err(AidataError::Cancelled)
                }
            }
        }

        Command::ToJson { file } => {
            let out = export::export_json(&file)?;
            emit(
                format,
                cmd,
                "ok",
                &format!("Converted to JSON: {}", out.display()),
                json!({ "output": out.display().to_string() }),
            );
            Ok(())
        }

        Command::AddCheckpoint {
            file,
            description,
            write,
        } => {
            let description = description.ok_or_else(|| {
                AidataError::UsageError("--description is required for add-checkpoint".into())
            })?;
            let inserted =
                checkpoint::add_checkpoint(&file, &description, write_mode(&cfg, write.atomic))?;
            emit(
                format,
                cmd,
                "ok",
                &format!("Checkpoint added: {}", output::compact_line(&description, 120)),
                serde_json::to_value(&inserted)?,
            );
            Ok(())
        }

        Command::ListSections { file } => {
            let names = sections::list_sections(&file)?;
            let refs: Vec<&str> = names.iter().map(String::as_str).collect();
            emit(
                format,
                cmd,
                "ok",
                &output::numbered(&refs),
                json!({ "sections": names }),
            );
            Ok(())
        }
    }
}
