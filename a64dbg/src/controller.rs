use crate::command::{Command, InfoKind, Location, COMMANDS};
use a64::{ExitCode, Processor};
use a64asm::{line_for_address, SourceMap};
use std::collections::BTreeSet;
use std::fmt;

#[derive(Debug)]
pub enum StartError {
    Asm(a64asm::Error),
    Load(a64::Error),
}

impl fmt::Display for StartError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            StartError::Asm(err) => {
                writeln!(f, "Assembling input failed:")?;
                write!(f, "{}", err)
            }
            StartError::Load(err) => write!(f, "Loading the program failed: {}", err),
        }
    }
}

/// What the view should do with a handled command.
pub enum Reply {
    Messages(Vec<String>),
    /// `run` was issued while the program is running; ask before
    /// restarting.
    ConfirmRestart,
    Quit,
}

/// The debug session: source text, the assembled image, the word→line
/// map, breakpoints, and the processor being driven.
///
/// All mutation enters through [`handle`](#method.handle); the view
/// only reads.
pub struct Debugger {
    lines: Vec<String>,
    source_map: SourceMap,
    image: Vec<u8>,
    breakpoints: BTreeSet<usize>,
    processor: Processor,
    running: bool,
    current_line: usize,
}

impl Debugger {
    /// Assembles `source` in memory and loads the image at address 0.
    pub fn new(source: &str) -> Result<Debugger, StartError> {
        let (words, source_map) = a64asm::assemble(source).map_err(StartError::Asm)?;
        let image = a64asm::program_to_bytes(&words);

        let mut processor = Processor::new();
        processor.load_image(&image).map_err(StartError::Load)?;

        Ok(Debugger {
            lines: source.lines().map(String::from).collect(),
            source_map,
            image,
            breakpoints: BTreeSet::new(),
            processor,
            running: false,
            current_line: 0,
        })
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn breakpoints(&self) -> &BTreeSet<usize> {
        &self.breakpoints
    }

    /// The next source line to execute, or 0 when nothing should be
    /// highlighted.
    pub fn current_line(&self) -> usize {
        self.current_line
    }

    pub fn running(&self) -> bool {
        self.running
    }

    pub fn processor(&self) -> &Processor {
        &self.processor
    }

    pub fn handle(&mut self, command: Command) -> Reply {
        match command {
            Command::Quit => Reply::Quit,
            Command::Run => {
                if self.running {
                    Reply::ConfirmRestart
                } else {
                    Reply::Messages(self.start())
                }
            }
            Command::Continue => {
                if !self.running {
                    return Reply::Messages(vec!["The program has not started yet.".to_owned()]);
                }
                let mut messages = Vec::new();
                self.run_until_stop(&mut messages);
                Reply::Messages(messages)
            }
            Command::Next => {
                if !self.running {
                    return Reply::Messages(vec!["The program has not started yet.".to_owned()]);
                }
                let mut messages = Vec::new();
                self.step_once(&mut messages);
                Reply::Messages(messages)
            }
            Command::Refresh => Reply::Messages(Vec::new()),
            Command::Break(line) => Reply::Messages(self.add_breakpoint(line)),
            Command::Clear(line) => Reply::Messages(self.clear_breakpoint(line)),
            Command::Print(location) => Reply::Messages(vec![self.print_location(location)]),
            Command::Set(location, value) => Reply::Messages(vec![self.set_location(location, value)]),
            Command::Info(kind) => Reply::Messages(self.info(kind)),
            Command::Help(topic) => Reply::Messages(help(topic)),
        }
    }

    /// Resolves the pending `run` confirmation.
    pub fn restart(&mut self, confirmed: bool) -> Reply {
        if confirmed {
            let mut messages = vec!["Restarting program: ".to_owned()];
            messages.extend(self.start());
            Reply::Messages(messages)
        } else {
            Reply::Messages(vec!["Resuming program: ".to_owned()])
        }
    }

    // Reinitializes registers, flags and memory, reloads the image and
    // runs to the first stop.
    fn start(&mut self) -> Vec<String> {
        self.processor = Processor::new();
        if let Err(err) = self.processor.load_image(&self.image) {
            return vec![format!("ERROR: {}", err)];
        }
        self.running = true;
        self.current_line = line_for_address(&self.source_map, 0)
            .map(|line| line as usize)
            .unwrap_or(0);

        let mut messages = Vec::new();
        self.run_until_stop(&mut messages);
        messages
    }

    fn run_until_stop(&mut self, messages: &mut Vec<String>) {
        while self.step_once(messages) {}
    }

    /// Executes one instruction. Returns whether a `continue` may keep
    /// going: false on halt, on an engine error, or at a breakpoint.
    fn step_once(&mut self, messages: &mut Vec<String>) -> bool {
        match self.processor.step() {
            Some(ExitCode::Halted) => {
                messages.push("***End of program reached***".to_owned());
                self.running = false;
                self.current_line = 0;
                false
            }
            Some(code) => {
                messages.push(format!("ERROR: {}", code));
                self.running = false;
                self.current_line = 0;
                false
            }
            None => {
                self.current_line = line_for_address(&self.source_map, self.processor.registers().pc())
                    .map(|line| line as usize)
                    .unwrap_or(0);
                if self.current_line != 0 && self.breakpoints.contains(&self.current_line) {
                    messages.push(format!(
                        "-----Breakpoint reached: Line {}-----",
                        self.current_line
                    ));
                    false
                } else {
                    true
                }
            }
        }
    }

    fn add_breakpoint(&mut self, line: usize) -> Vec<String> {
        if line == 0 || line > self.lines.len() {
            return vec!["ERROR: Line number out of range.".to_owned()];
        }
        self.breakpoints.insert(line);
        Vec::new()
    }

    fn clear_breakpoint(&mut self, line: usize) -> Vec<String> {
        if line == 0 || line > self.lines.len() {
            return vec!["ERROR: Line number out of range.".to_owned()];
        }
        if !self.breakpoints.remove(&line) {
            return vec!["Breakpoint does not exist".to_owned()];
        }
        Vec::new()
    }

    fn print_location(&self, location: Location) -> String {
        match location {
            Location::Register { index, is_64 } => {
                let value = if is_64 {
                    self.processor.registers().read_64(index)
                } else {
                    u64::from(self.processor.registers().read_32(index))
                };
                format!("X{:02} = 0x{:08x}", index, value)
            }
            Location::ZeroRegister => "X31 = 0x00000000".to_owned(),
            Location::Memory(address) => match self.processor.memory().read_word(address) {
                Ok(word) => format!("*0x{:08x} = 0x{:08x}", address, word),
                Err(()) => "ERROR: Memory address out of range.".to_owned(),
            },
        }
    }

    fn set_location(&mut self, location: Location, value: u64) -> String {
        match location {
            Location::ZeroRegister => "Cannot write to zero register.".to_owned(),
            Location::Register { index, is_64 } => {
                let value = if is_64 { value } else { value & 0xFFFF_FFFF };
                self.processor.registers_mut().write(index, value);
                format!("X{:02} := 0x{:08x}", index, value)
            }
            Location::Memory(address) => {
                match self
                    .processor
                    .memory_mut()
                    .write_word(address, value as u32)
                {
                    Ok(()) => format!("*0x{:08x} := 0x{:08x}", address, value as u32),
                    Err(()) => "ERROR: Memory address out of range.".to_owned(),
                }
            }
        }
    }

    fn info(&self, kind: InfoKind) -> Vec<String> {
        match kind {
            InfoKind::Memory => {
                let mut out = vec!["Non-Zero Memory:".to_owned()];
                for (address, word) in self.processor.memory().non_zero_words() {
                    out.push(format!("0x{:08x}: {:08x}", address, word));
                }
                out
            }
            InfoKind::Registers => {
                let registers = self.processor.registers();
                let mut out = vec!["Registers:".to_owned()];
                for row in 0..6 {
                    let mut line = String::new();
                    for i in (row * 5)..(row * 5 + 5) {
                        line.push_str(&format!("X{:02} = {:016x}   ", i, registers.read_64(i)));
                    }
                    out.push(line.trim_end().to_owned());
                }
                out.push(format!(
                    "X30 = {:016x}   PC  = {:016x}",
                    registers.read_64(30),
                    registers.pc()
                ));
                out
            }
            InfoKind::Pstate => vec![format!("PSTATE : {}", self.processor.pstate())],
            InfoKind::Breakpoints => {
                if self.breakpoints.is_empty() {
                    return vec!["Breakpoints is empty".to_owned()];
                }
                let mut out = vec!["Breakpoints:".to_owned()];
                for line in &self.breakpoints {
                    out.push(format!("Breakpoint at line {}", line));
                }
                out
            }
        }
    }
}

fn help(topic: Option<String>) -> Vec<String> {
    match topic {
        None => {
            let mut out = vec!["List of commands:".to_owned()];
            for entry in COMMANDS.iter() {
                out.push(format!("{:<10}: {}", entry.name, entry.help));
            }
            out
        }
        Some(topic) => {
            for entry in COMMANDS.iter() {
                if topic == entry.name || topic == entry.short {
                    let mut out = vec![format!(" - {}", entry.help), format!(" - {}", entry.syntax)];
                    if let Some(example) = entry.example {
                        out.push(format!(" - {}", example));
                    }
                    return out;
                }
            }
            vec![format!("Illegal arguments passed in help: {}", topic)]
        }
    }
}
