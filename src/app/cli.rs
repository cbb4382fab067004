use std::io::{self, BufRead, Write};

use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal,
    tty::IsTty,
};
use log::{error, info};

use crate::config::ShellConfig;
use crate::manager::job_manager::JobManager;
use crate::models::command::{tokenize, Command};
use crate::models::message::JobNotice;
use crate::worker::process::ProcessControl;

/// Source of command lines. `Ok(None)` means end of input.
pub trait LineReader {
    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>>;
}

/// Reads plain lines, for piped or redirected stdin.
pub struct PipedReader<R> {
    input: R,
}

impl<R: BufRead> PipedReader<R> {
    pub fn new(input: R) -> Self {
        Self { input }
    }
}

impl<R: BufRead> LineReader for PipedReader<R> {
    fn read_line(&mut self, _prompt: &str) -> io::Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }
}

/// Raw-mode line editor with history for interactive terminals.
pub struct TerminalReader {
    history: Vec<String>,
    max_line_len: usize,
}

struct RawModeGuard;

impl RawModeGuard {
    fn enable() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(RawModeGuard)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        if let Err(e) = terminal::disable_raw_mode() {
            error!("Failed to disable raw mode: {}", e);
        }
    }
}

impl TerminalReader {
    pub fn new(max_line_len: usize) -> Self {
        Self {
            history: Vec::new(),
            max_line_len,
        }
    }

    fn redraw(prompt: &str, input: &str) -> io::Result<()> {
        let mut stdout = io::stdout();
        execute!(
            stdout,
            cursor::MoveToColumn(0),
            terminal::Clear(terminal::ClearType::CurrentLine)
        )?;
        print!("{}{}", prompt, input);
        stdout.flush()
    }
}

impl LineReader for TerminalReader {
    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        let _raw = RawModeGuard::enable()?;
        let mut history_index = self.history.len();
        let mut input = String::new();
        Self::redraw(prompt, &input)?;

        loop {
            let Event::Key(key_event) = event::read()? else {
                continue;
            };
            if key_event.kind != KeyEventKind::Press {
                continue;
            }
            let ctrl = key_event.modifiers.contains(KeyModifiers::CONTROL);

            match key_event.code {
                KeyCode::Enter => {
                    print!("\r\n");
                    io::stdout().flush()?;
                    break;
                }
                KeyCode::Char('d') if ctrl => {
                    if input.is_empty() {
                        print!("\r\n");
                        io::stdout().flush()?;
                        return Ok(None);
                    }
                }
                KeyCode::Char('c') if ctrl => {
                    input.clear();
                    print!("^C\r\n");
                    Self::redraw(prompt, &input)?;
                }
                KeyCode::Up => {
                    if history_index > 0 {
                        history_index -= 1;
                    }
                    if let Some(command) = self.history.get(history_index) {
                        input = command.clone();
                        Self::redraw(prompt, &input)?;
                    }
                }
                KeyCode::Down => {
                    if history_index < self.history.len() {
                        history_index += 1;
                    }
                    input = self.history.get(history_index).cloned().unwrap_or_default();
                    Self::redraw(prompt, &input)?;
                }
                KeyCode::Char(c) if !ctrl => {
                    if input.len() + c.len_utf8() <= self.max_line_len {
                        input.push(c);
                        print!("{}", c);
                        io::stdout().flush()?;
                    }
                }
                KeyCode::Backspace => {
                    input.pop();
                    Self::redraw(prompt, &input)?;
                }
                _ => {}
            }
        }

        if !input.trim().is_empty() {
            self.history.push(input.clone());
        }
        Ok(Some(input))
    }
}

/// Whether the command loop keeps going after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// Runs the shell on the process's own stdin and stdout until `exit`.
pub fn run_cli<P: ProcessControl>(manager: &mut JobManager<P>, config: &ShellConfig) {
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    let result = if stdin.is_tty() {
        let mut reader = TerminalReader::new(config.max_line_len);
        run_loop(manager, config, &mut reader, &mut stdout)
    } else {
        let mut reader = PipedReader::new(stdin.lock());
        run_loop(manager, config, &mut reader, &mut stdout)
    };

    if let Err(e) = result {
        error!("Shell session ended with an I/O error: {}", e);
    }
}

/// The command loop: reap, read, dispatch, until `exit` or end of input.
///
/// Jobs that finish while the loop waits for input are only noticed once the
/// next line arrives.
pub fn run_loop<P, L, W>(
    manager: &mut JobManager<P>,
    config: &ShellConfig,
    reader: &mut L,
    out: &mut W,
) -> io::Result<()>
where
    P: ProcessControl,
    L: LineReader,
    W: Write,
{
    info!("Job shell started");
    loop {
        print_notices(out, &manager.reap_completed())?;

        let line = match reader.read_line(&config.prompt) {
            Ok(Some(line)) => line,
            Ok(None) => {
                info!("End of input, shutting down");
                dispatch(manager, Command::Exit, out)?;
                return Ok(());
            }
            Err(e) => {
                error!("Failed to read command: {}", e);
                dispatch(manager, Command::Exit, out)?;
                return Ok(());
            }
        };

        let tokens = tokenize(truncate(&line, config.max_line_len), config.max_tokens);
        let command = match Command::parse(&tokens) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                writeln!(out, "{}", e)?;
                continue;
            }
        };

        if dispatch(manager, command, out)? == Flow::Exit {
            return Ok(());
        }
    }
}

/// Executes one command and prints its outcome.
pub fn dispatch<P: ProcessControl, W: Write>(
    manager: &mut JobManager<P>,
    command: Command,
    out: &mut W,
) -> io::Result<Flow> {
    let outcome = match command {
        Command::Run {
            program,
            args,
            priority,
        } => manager.run(&program, &args, priority),
        Command::Stop(pid) => manager.stop(pid),
        Command::Kill(pid) => manager.kill(pid),
        Command::Resume(pid) => manager.resume(pid),
        Command::List => {
            writeln!(out, "{}", manager.list())?;
            return Ok(Flow::Continue);
        }
        Command::Exit => {
            writeln!(out, "Terminating all processes...")?;
            manager.shutdown();
            writeln!(out, "bye!")?;
            out.flush()?;
            return Ok(Flow::Exit);
        }
        Command::Unknown(name) => {
            info!("Unknown command '{}'", name);
            writeln!(out, "invalid command")?;
            return Ok(Flow::Continue);
        }
    };

    match outcome {
        Ok(notices) => print_notices(out, &notices)?,
        Err(e) => writeln!(out, "{}", e)?,
    }
    Ok(Flow::Continue)
}

fn print_notices<W: Write>(out: &mut W, notices: &[JobNotice]) -> io::Result<()> {
    for notice in notices {
        writeln!(out, "{}", notice)?;
    }
    out.flush()
}

fn truncate(line: &str, max_len: usize) -> &str {
    if line.len() <= max_len {
        return line;
    }
    let mut end = max_len;
    while !line.is_char_boundary(end) {
        end -= 1;
    }
    &line[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn piped_reader_strips_line_endings() {
        let mut reader = PipedReader::new("list\r\nexit\n".as_bytes());
        assert_eq!(reader.read_line("").unwrap().as_deref(), Some("list"));
        assert_eq!(reader.read_line("").unwrap().as_deref(), Some("exit"));
        assert_eq!(reader.read_line("").unwrap(), None);
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate("run sleep P1", 79), "run sleep P1");
        assert_eq!(truncate("abcdef", 3), "abc");
        assert_eq!(truncate("aé", 2), "a");
    }
}
