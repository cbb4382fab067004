//! Sample long-running job for the job shell.
//!
//! Writes one progress line per second to a file and stops early, reporting
//! partial progress, when it receives SIGTERM or SIGINT.

use std::{
    fs::File,
    io::{self, Write},
    path::PathBuf,
    process,
    sync::atomic::{AtomicBool, Ordering},
    time::{Duration, Instant},
};

use clap::Parser;
use crossbeam_channel::{tick, Receiver};

static RUNNING: AtomicBool = AtomicBool::new(true);

extern "C" fn request_shutdown(_signal: libc::c_int) {
    RUNNING.store(false, Ordering::SeqCst);
}

#[derive(Parser, Debug)]
#[command(name = "progress")]
#[command(about = "Writes one progress line per second to a file")]
struct Args {
    /// File that receives the progress lines
    file: PathBuf,

    /// Number of seconds of work
    #[arg(value_parser = clap::value_parser!(u32).range(1..))]
    seconds: u32,
}

/// Does `total` units of work, one per tick, checking `running` before each unit.
///
/// Returns the number of units completed.
fn run_units<W: Write>(
    out: &mut W,
    total: u32,
    ticks: &Receiver<Instant>,
    running: &AtomicBool,
) -> io::Result<u32> {
    let mut done = 0;
    while running.load(Ordering::SeqCst) && done < total {
        done += 1;
        writeln!(out, "Process ran {} out of {} secs", done, total)?;
        out.flush()?;

        if done < total && ticks.recv().is_err() {
            break;
        }
    }
    Ok(done)
}

fn install_handlers() {
    let handler = request_shutdown as extern "C" fn(libc::c_int) as libc::sighandler_t;
    unsafe {
        libc::signal(libc::SIGTERM, handler);
        libc::signal(libc::SIGINT, handler);
    }
}

fn main() {
    let args = Args::parse();
    install_handlers();

    let mut file = match File::create(&args.file) {
        Ok(file) => file,
        Err(e) => {
            eprintln!("Error: Cannot open file '{}' for writing: {}", args.file.display(), e);
            process::exit(1);
        }
    };

    let pid = process::id();
    println!(
        "Process {} starting: writing to '{}' for {} seconds",
        pid,
        args.file.display(),
        args.seconds
    );

    let ticks = tick(Duration::from_secs(1));
    let done = match run_units(&mut file, args.seconds, &ticks, &RUNNING) {
        Ok(done) => done,
        Err(e) => {
            eprintln!("Error: Failed writing progress: {}", e);
            process::exit(1);
        }
    };

    if RUNNING.load(Ordering::SeqCst) {
        println!("Process {} completed successfully: {}/{} seconds", pid, done, args.seconds);
    } else {
        println!("Process {} terminated early: {}/{} seconds", pid, done, args.seconds);
    }
}
