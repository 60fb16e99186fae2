//! Terminal lifecycle management for specnote.
//!
//! The UI draws to stderr so stdout stays free for shell pipelines, and ratatui
//! does not restore the terminal on `Drop`: every exit path, including panics,
//! must go through [`restore_tui`].

use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use signal_hook::consts::SIGTERM;
use signal_hook::flag::register;
use std::io::{stderr, BufWriter, Stderr};
use std::panic;
use std::sync::{atomic::AtomicBool, Arc};

/// CrosstermBackend over a buffered stderr writer; buffering batches escape
/// sequences into fewer writes per frame.
pub type Tui = Terminal<CrosstermBackend<BufWriter<Stderr>>>;

/// Enables raw mode, enters the alternate screen, and turns on mouse capture.
///
/// # Errors
///
/// Returns `Err` if any terminal setup step fails.
pub fn init_tui() -> std::io::Result<Tui> {
    let mut out = BufWriter::new(stderr());
    enable_raw_mode()?;
    execute!(out, EnterAlternateScreen, EnableMouseCapture)?;
    Terminal::new(CrosstermBackend::new(out))
}

/// Leaves the alternate screen and disables raw mode. Idempotent.
///
/// # Errors
///
/// Returns `Err` if `disable_raw_mode` or `execute!` fails.
pub fn restore_tui() -> std::io::Result<()> {
    disable_raw_mode()?;
    execute!(stderr(), LeaveAlternateScreen, DisableMouseCapture)?;
    Ok(())
}

/// Chains a panic hook that restores the terminal before the previous hook
/// prints the panic message. Install before [`init_tui`].
pub fn install_panic_hook() {
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = restore_tui();
        original_hook(panic_info);
    }));
}

/// Registers a SIGTERM handler that flips the returned flag to `true`.
///
/// # Errors
///
/// Returns `Err` if the OS refuses the signal registration.
pub fn register_sigterm() -> std::io::Result<Arc<AtomicBool>> {
    let term = Arc::new(AtomicBool::new(false));
    // The handler only performs an atomic store, which is async-signal-safe.
    register(SIGTERM, Arc::clone(&term))?;
    Ok(term)
}
