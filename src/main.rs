// SPDX-FileCopyrightText: 2026 Procflow contributors
// SPDX-License-Identifier: LicenseRef-Procflow-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Procflow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Procflow CLI entrypoint.
//!
//! Opens a document (or the built-in demo), prints the control and device trees plus a short
//! summary, and optionally writes the document back out with `--save`.

use std::error::Error;

use log::{Level, LevelFilter, Log, Metadata, Record};

use procflow::config::EditorConfig;
use procflow::projection::{TreeNode, TreePane};
use procflow::session::Session;
use procflow::store::demo_store;

const LOG_ENV: &str = "PROCFLOW_LOG";

fn print_usage(program: &str) {
    eprintln!(
        "Usage:\n  {program} <document.json> [--config <path>] [--save <path>]\n  {program} --demo [--config <path>] [--save <path>]\n\n--config reads editor settings from a JSON file (missing file = defaults).\n--save writes the opened document to <path> after printing the summary.\n\nSet {LOG_ENV}=debug|info|warn|error|off to control stderr logging (default warn)."
    );
}

struct StderrLogger;

static LOGGER: StderrLogger = StderrLogger;

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let tag = match record.level() {
            Level::Error => "ERROR",
            Level::Warn => "WARN",
            Level::Info => "INFO",
            Level::Debug => "DEBUG",
            Level::Trace => "TRACE",
        };
        eprintln!("[{tag}] {}: {}", record.target(), record.args());
    }

    fn flush(&self) {}
}

fn init_logging() {
    let level = std::env::var(LOG_ENV)
        .ok()
        .and_then(|raw| raw.trim().parse::<LevelFilter>().ok())
        .unwrap_or(LevelFilter::Warn);
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(level);
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
struct CliOptions {
    demo: bool,
    document: Option<String>,
    config: Option<String>,
    save: Option<String>,
}

fn parse_options(mut args: impl Iterator<Item = String>) -> Result<CliOptions, ()> {
    let mut options = CliOptions::default();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--demo" => {
                if options.demo {
                    return Err(());
                }
                options.demo = true;
            }
            "--config" => {
                if options.config.is_some() {
                    return Err(());
                }
                options.config = Some(args.next().ok_or(())?);
            }
            "--save" => {
                if options.save.is_some() {
                    return Err(());
                }
                options.save = Some(args.next().ok_or(())?);
            }
            _ if arg.starts_with('-') => return Err(()),
            _ => {
                if options.document.is_some() {
                    return Err(());
                }
                options.document = Some(arg);
            }
        }
    }

    if options.demo == options.document.is_some() {
        return Err(());
    }

    Ok(options)
}

fn print_tree(nodes: &[TreeNode], depth: usize) {
    for node in nodes {
        println!(
            "{:indent$}{} [{}]",
            "",
            node.name,
            node.key.entity_type.as_str(),
            indent = depth * 2
        );
        print_tree(&node.children, depth + 1);
    }
}

fn print_summary(session: &Session) {
    println!("{}", session.title().get());
    for (label, pane) in [("Control", TreePane::Control), ("Device", TreePane::Device)] {
        println!("\n{label}:");
        print_tree(session.tree().roots(pane), 1);
    }
    let store = session.store();
    println!(
        "\n{} entities, {} arrows",
        store.entity_count(),
        store.arrow_count()
    );
    let history = session.history().get();
    println!("history: {} item(s), at {}", history.items.len(), history.current);
}

fn main() {
    let result = (|| -> Result<(), Box<dyn Error>> {
        let mut args = std::env::args();
        let program = args.next().unwrap_or_else(|| "procflow".to_owned());

        let options = match parse_options(args) {
            Ok(options) => options,
            Err(()) => {
                print_usage(&program);
                std::process::exit(2);
            }
        };

        init_logging();

        let config = match &options.config {
            Some(path) => EditorConfig::load(path)?,
            None => EditorConfig::default(),
        };

        let mut session = match options.document {
            Some(path) => Session::open(path, config)?,
            None => {
                let store = demo_store(&config)?;
                Session::with_store(store, config)
            }
        };

        print_summary(&session);

        if let Some(path) = options.save {
            if !session.save_as(&path) {
                return Err(session.status().get().clone().into());
            }
            println!("saved {path}");
        }

        Ok(())
    })();

    if let Err(err) = result {
        eprintln!("procflow: {err}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_options, CliOptions};

    fn args(items: &[&str]) -> impl Iterator<Item = String> {
        items
            .iter()
            .map(|item| (*item).to_owned())
            .collect::<Vec<_>>()
            .into_iter()
    }

    #[test]
    fn parses_demo_flag() {
        let options = parse_options(args(&["--demo"])).expect("parse options");
        assert_eq!(
            options,
            CliOptions {
                demo: true,
                ..CliOptions::default()
            }
        );
    }

    #[test]
    fn parses_positional_document_with_config_and_save() {
        let options = parse_options(args(&[
            "line.json",
            "--config",
            "editor.json",
            "--save",
            "out.json",
        ]))
        .expect("parse options");
        assert_eq!(options.document.as_deref(), Some("line.json"));
        assert_eq!(options.config.as_deref(), Some("editor.json"));
        assert_eq!(options.save.as_deref(), Some("out.json"));
        assert!(!options.demo);
    }

    #[test]
    fn requires_exactly_one_source() {
        parse_options(args(&[])).unwrap_err();
        parse_options(args(&["--demo", "line.json"])).unwrap_err();
    }

    #[test]
    fn rejects_unknown_and_duplicate_args() {
        parse_options(args(&["--nope"])).unwrap_err();
        parse_options(args(&["--demo", "--demo"])).unwrap_err();
        parse_options(args(&["one.json", "two.json"])).unwrap_err();
        parse_options(args(&["--demo", "--save", "a", "--save", "b"])).unwrap_err();
    }

    #[test]
    fn rejects_missing_values() {
        parse_options(args(&["--demo", "--config"])).unwrap_err();
        parse_options(args(&["--demo", "--save"])).unwrap_err();
    }
}
