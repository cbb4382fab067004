use crate::error::{JobError, Result};
use crate::models::job::{Pid, Priority};

/// One parsed line of shell input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Run {
        program: String,
        args: Vec<String>,
        priority: Priority,
    },
    Stop(Pid),
    Kill(Pid),
    Resume(Pid),
    List,
    Exit,
    Unknown(String),
}

impl Command {
    /// Parses already-tokenized input. `Ok(None)` for an empty line.
    pub fn parse<S: AsRef<str>>(tokens: &[S]) -> Result<Option<Command>> {
        let Some((name, rest)) = tokens.split_first() else {
            return Ok(None);
        };
        let rest: Vec<&str> = rest.iter().map(|t| t.as_ref()).collect();

        let command = match name.as_ref() {
            "run" => parse_run(&rest)?,
            "stop" => Command::Stop(parse_pid("stop", &rest)?),
            "kill" => Command::Kill(parse_pid("kill", &rest)?),
            "resume" => Command::Resume(parse_pid("resume", &rest)?),
            "list" => Command::List,
            "exit" => Command::Exit,
            other => Command::Unknown(other.to_string()),
        };
        Ok(Some(command))
    }
}

/// Splits a line on whitespace, keeping at most `max_tokens` tokens.
pub fn tokenize(line: &str, max_tokens: usize) -> Vec<String> {
    line.split_whitespace()
        .take(max_tokens)
        .map(str::to_string)
        .collect()
}

fn parse_run(rest: &[&str]) -> Result<Command> {
    let (priority_token, program_and_args) = match rest.split_last() {
        None => {
            return Err(JobError::InvalidArguments(
                "Usage: run [program] [arguments] [Priority]".to_string(),
            ))
        }
        Some((_, [])) => {
            return Err(JobError::InvalidArguments(
                "Error: Priority is required".to_string(),
            ))
        }
        Some((last, init)) => (*last, init),
    };

    let priority = priority_token.parse::<Priority>()?;
    let program = program_and_args[0].to_string();
    let args = program_and_args[1..].iter().map(|a| a.to_string()).collect();

    Ok(Command::Run {
        program,
        args,
        priority,
    })
}

fn parse_pid(name: &str, rest: &[&str]) -> Result<Pid> {
    let token = rest
        .first()
        .ok_or_else(|| JobError::InvalidArguments(format!("Usage: {} [PID]", name)))?;

    match token.parse::<Pid>() {
        Ok(pid) if pid > 0 => Ok(pid),
        _ => Err(JobError::InvalidArguments(
            "Error: PID must be a positive integer".to_string(),
        )),
    }
}
