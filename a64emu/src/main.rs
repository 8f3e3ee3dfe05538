#[macro_use]
extern crate clap;

use clap::Arg;
use std::path::Path;
use std::process;

fn main() {
    let matches = app_from_crate!()
        .arg(
            Arg::with_name("INPUT")
                .help("Sets the binary file to run")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::with_name("OUTPUT")
                .help("Writes the final state dump to this file instead of stdout")
                .index(2),
        )
        .get_matches();

    let input = Path::new(matches.value_of("INPUT").unwrap());
    let output = matches.value_of("OUTPUT").map(Path::new);

    if let Err(err) = a64emu::emulate(input, output) {
        eprintln!("{}", err);
        process::exit(1);
    }
}
