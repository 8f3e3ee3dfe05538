#[macro_use]
extern crate clap;

mod command;
mod controller;
mod view;


use clap::Arg;
use controller::Debugger;
use std::fs::File;
use std::io::prelude::*;
use std::io::BufReader;
use std::path::Path;
use std::process;

fn main() {
    let matches = app_from_crate!()
        .arg(
            Arg::with_name("INPUT")
                .help("Sets the assembly source file to debug")
                .required(true)
                .index(1),
        )
        .get_matches();

    let input = matches.value_of("INPUT").unwrap();

    if let Err(message) = debug(input) {
        eprintln!("{}", message);
        process::exit(1);
    }
}

fn debug(input: &str) -> Result<(), String> {
    let path = Path::new(input);
    let read_failed = |err| format!("Reading input file \"{}\" failed: {}", path.display(), err);

    let file = File::open(path).map_err(read_failed)?;
    let mut source = String::new();
    BufReader::new(file)
        .read_to_string(&mut source)
        .map_err(read_failed)?;

    // Assembly errors surface before the terminal is taken over.
    let debugger = Debugger::new(&source).map_err(|err| err.to_string())?;

    view::run(debugger, input).map_err(|err| format!("Terminal failure: {}", err))
}
