use crate::command;
use crate::controller::{Debugger, Reply};
use crossterm::event::{
    self, DisableFocusChange, DisableMouseCapture, EnableFocusChange, EnableMouseCapture, Event,
    KeyCode, KeyEventKind, KeyModifiers, MouseEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use std::io::{self, Stdout};
use tui::backend::CrosstermBackend;
use tui::layout::{Constraint, Direction, Layout};
use tui::style::{Modifier, Style};
use tui::text::{Span, Spans};
use tui::widgets::{Block, Borders, Paragraph};
use tui::Terminal;

// Pure presentation state. Emulator state is only ever touched through
// controller commands.
struct View {
    file_name: String,
    scroll: usize,
    log: Vec<String>,
    input: String,
    previous: Option<String>,
    focused: bool,
    awaiting_confirmation: bool,
}

/// Runs the debugger UI until quit. Terminal modes are restored before
/// returning.
pub fn run(mut debugger: Debugger, file_name: &str) -> crossterm::Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(
        stdout,
        EnterAlternateScreen,
        EnableMouseCapture,
        EnableFocusChange
    )?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = event_loop(&mut terminal, &mut debugger, file_name);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture,
        DisableFocusChange
    )?;
    terminal.show_cursor()?;

    result
}

fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    debugger: &mut Debugger,
    file_name: &str,
) -> crossterm::Result<()> {
    let mut view = View {
        file_name: file_name.to_owned(),
        scroll: 1,
        log: Vec::new(),
        input: String::new(),
        previous: None,
        focused: true,
        awaiting_confirmation: false,
    };

    loop {
        let source_height = draw(terminal, debugger, &view)?;

        match event::read()? {
            Event::Key(key) => {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                match key.code {
                    KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                        return Ok(())
                    }
                    KeyCode::Enter => {
                        if !submit(debugger, &mut view, source_height) {
                            return Ok(());
                        }
                    }
                    KeyCode::Backspace => {
                        view.input.pop();
                    }
                    KeyCode::Up => view.scroll_up(),
                    KeyCode::Down => view.scroll_down(debugger.lines().len(), source_height),
                    KeyCode::Char(c) => view.input.push(c),
                    _ => {}
                }
            }
            Event::Mouse(mouse) => match mouse.kind {
                MouseEventKind::ScrollUp => view.scroll_up(),
                MouseEventKind::ScrollDown => {
                    view.scroll_down(debugger.lines().len(), source_height)
                }
                _ => {}
            },
            Event::FocusGained => view.focused = true,
            Event::FocusLost => view.focused = false,
            // The next draw picks the new size up from the backend.
            Event::Resize(_, _) => {}
            _ => {}
        }
    }
}

// Returns false when the session should end.
fn submit(debugger: &mut Debugger, view: &mut View, source_height: usize) -> bool {
    let entered = view.input.clone();
    view.input.clear();
    view.log.push(format!("(debug) {}", entered));

    if view.awaiting_confirmation {
        return match entered.as_str() {
            "y" => {
                view.awaiting_confirmation = false;
                let reply = debugger.restart(true);
                view.apply(debugger, reply, source_height)
            }
            "n" => {
                view.awaiting_confirmation = false;
                let reply = debugger.restart(false);
                view.apply(debugger, reply, source_height)
            }
            _ => {
                view.log.push("Please enter 'y' or 'n'.".to_owned());
                true
            }
        };
    }

    // An empty line repeats the previous command.
    let text = if entered.is_empty() {
        match &view.previous {
            Some(previous) => previous.clone(),
            None => return true,
        }
    } else {
        view.previous = Some(entered.clone());
        entered
    };

    match command::parse(&text) {
        Err(message) => {
            view.log.push(message);
            true
        }
        Ok(parsed) => {
            let reply = debugger.handle(parsed);
            view.apply(debugger, reply, source_height)
        }
    }
}

impl View {
    fn apply(&mut self, debugger: &Debugger, reply: Reply, source_height: usize) -> bool {
        match reply {
            Reply::Quit => false,
            Reply::ConfirmRestart => {
                self.awaiting_confirmation = true;
                self.log.push(
                    "The program is currently running, are you sure you want to start again? (y/n): "
                        .to_owned(),
                );
                true
            }
            Reply::Messages(messages) => {
                self.log.extend(messages);
                self.ensure_visible(debugger.current_line(), debugger.lines().len(), source_height);
                true
            }
        }
    }

    fn scroll_up(&mut self) {
        if self.scroll > 1 {
            self.scroll -= 1;
        }
    }

    fn scroll_down(&mut self, total: usize, height: usize) {
        if self.scroll + height <= total {
            self.scroll += 1;
        }
    }

    // Keeps the highlighted line roughly centered, clamped to the
    // start and end of the source.
    fn ensure_visible(&mut self, line: usize, total: usize, height: usize) {
        if line == 0 || height == 0 {
            return;
        }
        if total <= height || line <= height / 2 {
            self.scroll = 1;
        } else if total - line <= height / 2 {
            self.scroll = total - height + 1;
        } else {
            self.scroll = line - height / 2 + 1;
        }
    }
}

// Draws both panes and reports the source pane's inner height, which
// scrolling math needs.
fn draw(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    debugger: &Debugger,
    view: &View,
) -> crossterm::Result<usize> {
    let mut source_height = 0usize;

    terminal.draw(|frame| {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)].as_ref())
            .split(frame.size());

        source_height = usize::from(chunks[0].height.saturating_sub(2));
        frame.render_widget(render_source(debugger, view, source_height), chunks[0]);

        let command_height = usize::from(chunks[1].height.saturating_sub(2));
        frame.render_widget(render_command(view, command_height), chunks[1]);
    })?;

    Ok(source_height)
}

fn render_source(debugger: &Debugger, view: &View, height: usize) -> Paragraph<'static> {
    let lines = debugger.lines();
    let current = debugger.current_line();

    let mut text: Vec<Spans> = Vec::new();
    for number in view.scroll..=lines.len() {
        if text.len() >= height {
            break;
        }
        let marker = if debugger.breakpoints().contains(&number) {
            "b+"
        } else {
            "  "
        };
        let content = format!("{}{:4}  {}", marker, number, lines[number - 1]);
        if number == current {
            text.push(Spans::from(Span::styled(
                content,
                Style::default().add_modifier(Modifier::REVERSED),
            )));
        } else {
            text.push(Spans::from(content));
        }
    }

    Paragraph::new(text).block(
        Block::default()
            .borders(Borders::ALL)
            .title(view.file_name.clone()),
    )
}

fn render_command(view: &View, height: usize) -> Paragraph<'static> {
    let mut text: Vec<Spans> = Vec::new();
    let available = height.saturating_sub(1);

    if view.log.is_empty() {
        text.push(Spans::from(
            "Type commands here, press 'q' to quit".to_owned(),
        ));
    } else {
        let start = view.log.len().saturating_sub(available);
        for line in &view.log[start..] {
            text.push(Spans::from(line.clone()));
        }
    }

    // Pin the prompt to the bottom row of the pane.
    while text.len() + 1 < height {
        text.push(Spans::from(String::new()));
    }

    let cursor_style = if view.focused {
        Style::default().add_modifier(Modifier::REVERSED)
    } else {
        Style::default()
    };
    text.push(Spans::from(vec![
        Span::raw(format!("(debug) {}", view.input)),
        Span::styled(" ".to_owned(), cursor_style),
    ]));

    Paragraph::new(text).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Command Line Interface:"),
    )
}
