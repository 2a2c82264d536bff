//! The Sentree Command-Line Interface.
//!
//! This module is the main entry point for all CLI commands and orchestrates
//! the core library functions.

use std::io::IsTerminal;
use std::process;

use clap::Parser;
use termcolor::{ColorChoice, StandardStream};
use tracing::{debug, info};

use crate::cli::args::{Command, SentreeArgs};
use crate::config::{Tables, TranslatorSettings};
use crate::definitions::{PapagoTranslator, Translator};
use crate::engine::{Engine, ParseOptions, Response};
use crate::errors::SentreeError;
use crate::logging;
use crate::tagging::AnnotatedTagger;

pub mod args;
pub mod output;

/// The main entry point for the CLI.
pub fn run() {
    let args = SentreeArgs::parse();
    logging::init(args.verbose);

    let result = load_tables(&args).and_then(|tables| match args.command {
        Command::Parse {
            text,
            show_all_levels,
            json,
            no_definitions,
        } => {
            let options = ParseOptions {
                show_all_levels,
                definitions: !no_definitions,
            };
            handle_parse(&tables, &text, &options, json)
        }
        Command::Tags => handle_tags(&tables),
    });

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn load_tables(args: &SentreeArgs) -> Result<Tables, SentreeError> {
    match &args.tables {
        Some(path) => {
            info!(path = %path.display(), "loading tables");
            Tables::from_path(path)
        }
        None => Ok(Tables::builtin().clone()),
    }
}

/// Handles the `parse` subcommand.
fn handle_parse(tables: &Tables, text: &str, options: &ParseOptions, json: bool) -> Result<(), SentreeError> {
    let tagger = AnnotatedTagger::new();
    let translator = if options.definitions {
        TranslatorSettings::from_env().map(PapagoTranslator::new)
    } else {
        None
    };
    if options.definitions && translator.is_none() {
        debug!("translator credentials not set; skipping definitions");
    }

    let mut engine = Engine::new(tables, &tagger);
    if let Some(translator) = &translator {
        engine = engine.with_translator(translator as &dyn Translator);
    }

    let sentences = engine.parse_input(text, options)?;
    if json {
        let response = Response::ok(sentences);
        let rendered = serde_json::to_string_pretty(&response).map_err(std::io::Error::from)?;
        println!("{rendered}");
        return Ok(());
    }

    let mut stdout = StandardStream::stdout(color_choice());
    for (index, sentence) in sentences.iter().enumerate() {
        output::write_sentence(&mut stdout, index, sentence)?;
        if let Some(failure) = &sentence.failure {
            let report = miette::Report::new(failure.to_diagnostic(&sentence.mapped_pos_list));
            eprintln!("{report:?}");
        }
    }
    Ok(())
}

/// Handles the `tags` subcommand.
fn handle_tags(tables: &Tables) -> Result<(), SentreeError> {
    let mut stdout = StandardStream::stdout(color_choice());
    output::write_tags(&mut stdout, tables)?;
    Ok(())
}

/// `ColorChoice::Auto` does not check whether stdout is a terminal.
fn color_choice() -> ColorChoice {
    if std::io::stdout().is_terminal() {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    }
}
