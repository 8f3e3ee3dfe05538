use a64::{ExitCode, Processor};
use std::fs::{self, File};
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};


#[derive(Debug)]
pub enum Error {
    Io(io::Error, PathBuf),
    Load(a64::Error),
    Stopped(ExitCode),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Io(err, path) => write!(f, "Accessing \"{}\" failed: {}", path.display(), err),
            Error::Load(err) => write!(f, "Loading the program failed: {}", err),
            Error::Stopped(code) => write!(f, "Execution stopped: {}", code),
        }
    }
}

/// Loads a raw image at address 0 and runs it to the halt sentinel.
/// Any other stop reason is an error.
pub fn run_image(image: &[u8]) -> Result<Processor, Error> {
    let mut processor = Processor::new();
    processor.load_image(image).map_err(Error::Load)?;

    match processor.run() {
        ExitCode::Halted => Ok(processor),
        code => Err(Error::Stopped(code)),
    }
}

/// Emulates a binary file, writing the final state dump to `output`,
/// or to stdout when no output file is given.
pub fn emulate(input: &Path, output: Option<&Path>) -> Result<(), Error> {
    let image = fs::read(input).map_err(|err| Error::Io(err, input.to_owned()))?;
    let processor = run_image(&image)?;

    match output {
        Some(path) => {
            let file = File::create(path).map_err(|err| Error::Io(err, path.to_owned()))?;
            let mut writer = BufWriter::new(file);
            processor
                .write_state(&mut writer)
                .map_err(|err| Error::Io(err, path.to_owned()))
        }
        None => {
            let stdout = io::stdout();
            processor
                .write_state(&mut stdout.lock())
                .map_err(|err| Error::Io(err, PathBuf::from("<stdout>")))
        }
    }
}
