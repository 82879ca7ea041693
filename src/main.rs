//! kbdrec - Keystroke frequency recorder
//!
//! Usage: `kbdrec <ev-id>`, where `<ev-id>` is the N of `/dev/input/eventN`.
//! Send SIGUSR1 to print the current table without stopping.

use anyhow::{Context, Result};
use std::{env, io, process, sync::mpsc};

use kbdrec::{
    capture::{self, signals, SessionEvent, ShutdownReason},
    config::Config,
    session::Session,
};

fn print_usage(program: &str) {
    println!("{} <ev-id>", program);
    println!("To get event ID with name, run `evtest'");
    println!("The ID may be different after reboot");
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args: Vec<String> = env::args().collect();
    if args.len() != 2 {
        print_usage(args.first().map(String::as_str).unwrap_or("kbdrec"));
        process::exit(1);
    }
    let event_id = capture::parse_event_id(&args[1])?;

    let config = Config::load().unwrap_or_else(|e| {
        log::warn!("ignoring config: {}", e);
        Config::default()
    });

    println!("[+] PID: {}", process::id());

    // Signal mask first, so every thread spawned below inherits it
    let (event_tx, event_rx) = mpsc::channel::<SessionEvent>();
    signals::install(event_tx.clone()).context("failed to set up signal handling")?;

    let mut source = capture::open_source(&config.capture, event_id)?;
    source
        .start(event_tx)
        .with_context(|| format!("failed to attach {} capture to event{}", source.name(), event_id))?;

    let stdout = io::stdout();
    let mut session = Session::from_config(&config, stdout.lock());
    if let Err(e) = session.open() {
        log::warn!("writing to stdout failed: {}", e);
    }

    let reason = session.run(&event_rx);
    log::info!("stopping: {}", reason);

    // Counts reach disk before the capture side is torn down
    if let Err(e) = session.finish() {
        log::warn!("final report incomplete: {}", e);
    }
    source.stop();

    if let ShutdownReason::CaptureFailed(code) = reason {
        anyhow::bail!(
            "{} capture on event{} exited with status {}",
            source.name(),
            event_id,
            code
        );
    }
    Ok(())
}
