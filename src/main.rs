use std::path::PathBuf;
use std::{env, process};

use rlox_tree::error::{new_shared_print_sink, new_shared_sink, StderrSink, StdoutSink};
use rlox_tree::Lox;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

fn history_path() -> Option<PathBuf> {
    home::home_dir().map(|home| home.join(".rlox_history"))
}

fn run_prompt() {
    let sink = new_shared_sink(StderrSink::default());
    let print = new_shared_print_sink(StdoutSink);
    let mut lox = Lox::new(sink, print);

    let mut editor = DefaultEditor::new().expect("readline editor should initialize");
    let history = history_path();
    if let Some(path) = &history {
        let _ = editor.load_history(path);
    }

    loop {
        match editor.readline("> ") {
            Ok(line) => {
                if line.trim().is_empty() {
                    continue;
                }
                let _ = editor.add_history_entry(line.as_str());
                lox.run_line(&line);
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(err) => {
                log::error!("readline error: {err}");
                break;
            }
        }
    }

    if let Some(path) = &history {
        let _ = editor.save_history(path);
    }
}

fn run_file(path: &str) -> i32 {
    let sink = new_shared_sink(StderrSink::default());
    let print = new_shared_print_sink(StdoutSink);
    let mut lox = Lox::new(sink, print);
    lox.run_file(path)
}

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();

    match args.len() {
        n if n > 2 => {
            eprintln!("Usage: lox [script]");
            process::exit(64);
        }
        2 => process::exit(run_file(&args[1])),
        _ => run_prompt(),
    }
}
