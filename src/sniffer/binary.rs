//! Chromium binary discovery.

use std::path::PathBuf;

/// Find a Chromium/Chrome binary to drive.
///
/// Priority: `CHATSWEEP_CHROMIUM_PATH` env → `~/.chatsweep/chromium/` →
/// system PATH → the default macOS install location.
pub fn find_chromium() -> Option<PathBuf> {
    if let Ok(p) = std::env::var("CHATSWEEP_CHROMIUM_PATH") {
        let path = PathBuf::from(&p);
        if path.exists() {
            return Some(path);
        }
    }

    if let Some(home) = dirs::home_dir() {
        let candidates = if cfg!(target_os = "macos") {
            vec![
                home.join(".chatsweep/chromium/Google Chrome for Testing.app/Contents/MacOS/Google Chrome for Testing"),
                home.join(".chatsweep/chromium/chrome"),
            ]
        } else {
            vec![
                home.join(".chatsweep/chromium/chrome-linux64/chrome"),
                home.join(".chatsweep/chromium/chrome"),
            ]
        };
        for c in candidates {
            if c.exists() {
                return Some(c);
            }
        }
    }

    for name in ["google-chrome", "chromium", "chromium-browser"] {
        if let Ok(path) = which::which(name) {
            return Some(path);
        }
    }

    if cfg!(target_os = "macos") {
        let common =
            PathBuf::from("/Applications/Google Chrome.app/Contents/MacOS/Google Chrome");
        if common.exists() {
            return Some(common);
        }
    }

    None
}
