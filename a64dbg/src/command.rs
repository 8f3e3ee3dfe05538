use a64::constants::ZERO_REGISTER;
use a64::Word;

/// A register or memory location named on the command line.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Location {
    Register { index: Word, is_64: bool },
    ZeroRegister,
    Memory(u64),
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum InfoKind {
    Memory,
    Registers,
    Pstate,
    Breakpoints,
}

/// A fully parsed debugger command. Everything the prompt accepts is
/// turned into one of these before any state is touched.
#[derive(Clone, PartialEq, Debug)]
pub enum Command {
    Run,
    Quit,
    Continue,
    Next,
    Refresh,
    Break(usize),
    Clear(usize),
    Print(Location),
    Set(Location, u64),
    Info(InfoKind),
    Help(Option<String>),
}

pub struct HelpEntry {
    pub name: &'static str,
    pub short: &'static str,
    pub help: &'static str,
    pub syntax: &'static str,
    pub example: Option<&'static str>,
}

pub const COMMANDS: [HelpEntry; 11] = [
    HelpEntry {
        name: "run",
        short: "r",
        help: "Start/Restart program execution",
        syntax: "Type 'r' or \"run\".",
        example: None,
    },
    HelpEntry {
        name: "quit",
        short: "q",
        help: "Exit the debugger",
        syntax: "Type 'q' or \"quit\".",
        example: None,
    },
    HelpEntry {
        name: "continue",
        short: "c",
        help: "Continue program execution",
        syntax: "Type 'c' or \"continue\".",
        example: None,
    },
    HelpEntry {
        name: "next",
        short: "n",
        help: "Step program",
        syntax: "Type 'n' or \"next\".",
        example: None,
    },
    HelpEntry {
        name: "refresh",
        short: "ref",
        help: "Refresh screen display",
        syntax: "Type \"ref\" or \"refresh\".",
        example: None,
    },
    HelpEntry {
        name: "break",
        short: "b",
        help: "Set a breakpoint at specified line number",
        syntax: "Type 'b' or \"break\".",
        example: Some("Example: b 5 - Creates a breakpoint on line 5."),
    },
    HelpEntry {
        name: "clear",
        short: "cl",
        help: "Delete a breakpoint at a specified line number",
        syntax: "Type \"cl\" or \"clear\".",
        example: Some("Example: cl 5 - Removes a breakpoint on line 5 if it exists."),
    },
    HelpEntry {
        name: "print",
        short: "p",
        help: "Print value of register or memory",
        syntax: "Type 'p' or \"print\"",
        example: Some("Example: p x30/*0x4 - Prints the value held at register x30/memory address 0x4"),
    },
    HelpEntry {
        name: "set",
        short: "s",
        help: "Assign value to a general register or a memory location",
        syntax: "Type 's' or \"set\"",
        example: Some("Example: s x0/*0x4 = 5 - Sets the value held at register x0/memory address 0x4 equal to 5"),
    },
    HelpEntry {
        name: "info",
        short: "i",
        help: "Show information about all registers, non-zero memory locations or the program state",
        syntax: "Type 'i' or \"info\"",
        example: Some("Example: i brs - Prints the location of all breakpoints"),
    },
    HelpEntry {
        name: "help",
        short: "h",
        help: "Show information about a specified command, or all commands",
        syntax: "Type 'h' or \"help\"",
        example: Some("Example: h run - Prints information about the command \"run\""),
    },
];

fn matches_command(input: &str, name: &str, short: &str) -> bool {
    input == name || input == short
}

/// Parses one prompt line. Errors are diagnostics for the command log,
/// never fatal.
pub fn parse(input: &str) -> Result<Command, String> {
    let args: Vec<&str> = input.split_whitespace().collect();

    match args.len() {
        1 => parse_plain(&args),
        2 => parse_with_argument(&args),
        4 => parse_set(input, &args),
        _ => Err(illegal_input(input)),
    }
}

fn parse_plain(args: &[&str]) -> Result<Command, String> {
    let arg = args[0];
    if matches_command(arg, "run", "r") {
        Ok(Command::Run)
    } else if matches_command(arg, "quit", "q") {
        Ok(Command::Quit)
    } else if matches_command(arg, "continue", "c") {
        Ok(Command::Continue)
    } else if matches_command(arg, "next", "n") {
        Ok(Command::Next)
    } else if matches_command(arg, "refresh", "ref") {
        Ok(Command::Refresh)
    } else if matches_command(arg, "help", "h") {
        Ok(Command::Help(None))
    } else {
        Err(illegal_input(arg))
    }
}

fn parse_with_argument(args: &[&str]) -> Result<Command, String> {
    let (command, argument) = (args[0], args[1]);

    if matches_command(command, "break", "b") {
        return Ok(Command::Break(parse_line_number(argument)?));
    }
    if matches_command(command, "clear", "cl") {
        return Ok(Command::Clear(parse_line_number(argument)?));
    }
    if matches_command(command, "print", "p") {
        return Ok(Command::Print(parse_location(argument)?));
    }
    if matches_command(command, "info", "i") {
        return Ok(Command::Info(parse_info_kind(argument)?));
    }
    if matches_command(command, "help", "h") {
        return Ok(Command::Help(Some(argument.to_owned())));
    }

    Err(illegal_input(command))
}

fn parse_set(input: &str, args: &[&str]) -> Result<Command, String> {
    if !matches_command(args[0], "set", "s") || args[2] != "=" {
        return Err(illegal_input(input));
    }
    let location = parse_location(args[1])?;
    let value = parse_value(args[3])?;
    Ok(Command::Set(location, value))
}

fn illegal_input(input: &str) -> String {
    format!("Illegal arguments passed in: {}", input)
}

fn parse_line_number(arg: &str) -> Result<usize, String> {
    arg.parse()
        .map_err(|_| "ERROR: Invalid number passed in.".to_owned())
}

fn parse_info_kind(arg: &str) -> Result<InfoKind, String> {
    if matches_command(arg, "memory", "mem") {
        Ok(InfoKind::Memory)
    } else if matches_command(arg, "registers", "reg") {
        Ok(InfoKind::Registers)
    } else if matches_command(arg, "pstate", "pst") {
        Ok(InfoKind::Pstate)
    } else if matches_command(arg, "breakpoints", "brs") {
        Ok(InfoKind::Breakpoints)
    } else {
        Err(illegal_input(arg))
    }
}

fn parse_location(arg: &str) -> Result<Location, String> {
    if arg == "wzr" || arg == "xzr" || arg == "rzr" {
        return Ok(Location::ZeroRegister);
    }

    if let Some(hex) = arg.strip_prefix("*0x") {
        return u64::from_str_radix(hex, 16)
            .map(Location::Memory)
            .map_err(|_| format!("Invalid memory address: {}", arg));
    }

    if arg.starts_with('w') || arg.starts_with('x') {
        if let Ok(index) = arg[1..].parse::<Word>() {
            if index >= ZERO_REGISTER {
                return Err("Register value provided out of range.".to_owned());
            }
            return Ok(Location::Register {
                index,
                is_64: arg.starts_with('x'),
            });
        }
    }

    Err(format!("Invalid register or memory location: {}", arg))
}

fn parse_value(arg: &str) -> Result<u64, String> {
    let (digits, negative) = match arg.strip_prefix('-') {
        Some(rest) => (rest, true),
        None => (arg, false),
    };

    let parsed = match digits.strip_prefix("0x") {
        Some(hex) => i64::from_str_radix(hex, 16),
        None => digits.parse(),
    };

    parsed
        .map(|value: i64| (if negative { -value } else { value }) as u64)
        .map_err(|_| format!("Invalid value: {}", arg))
}
