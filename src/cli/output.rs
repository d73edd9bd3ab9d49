//! Output helpers shared by the subcommands.
//!
//! Global flags are carried in environment variables set by `main` so any
//! module can check them without threading a context through every call.

use serde::Serialize;

/// Machine-readable JSON output requested.
pub fn is_json() -> bool {
    std::env::var("CHATSWEEP_JSON").is_ok()
}

/// Non-essential output suppressed.
pub fn is_quiet() -> bool {
    std::env::var("CHATSWEEP_QUIET").is_ok()
}

/// Print a value as a single JSON line.
pub fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string(value) {
        Ok(s) => println!("{s}"),
        Err(e) => eprintln!("  Error: failed to serialize output: {e}"),
    }
}

/// Print a status line unless quiet or JSON mode is active.
pub fn note(msg: &str) {
    if !is_quiet() && !is_json() {
        println!("{msg}");
    }
}
