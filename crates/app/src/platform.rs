//! Platform detection and clipboard access
//!
//! The clipboard goes through `arboard`, with `wl-copy` as the fallback
//! on Wayland sessions where arboard cannot reach the compositor.

use std::env;
use std::io::Write;
use std::process::{Command, Stdio};

/// Detected display server type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayServer {
    Wayland,
    /// X11 session (native or XWayland)
    X11,
    /// Unknown or headless
    Unknown,
}

impl DisplayServer {
    /// Detect the current display server from environment
    pub fn detect() -> Self {
        Self::from_vars(
            env::var_os("WAYLAND_DISPLAY").is_some(),
            env::var_os("DISPLAY").is_some(),
        )
    }

    fn from_vars(wayland: bool, x11: bool) -> Self {
        if wayland {
            DisplayServer::Wayland
        } else if x11 {
            DisplayServer::X11
        } else {
            DisplayServer::Unknown
        }
    }

    pub fn is_wayland(&self) -> bool {
        matches!(self, DisplayServer::Wayland)
    }

    /// Whether there is any clipboard to talk to
    pub fn has_clipboard(&self) -> bool {
        !matches!(self, DisplayServer::Unknown) || cfg!(any(target_os = "macos", windows))
    }
}

impl std::fmt::Display for DisplayServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DisplayServer::Wayland => write!(f, "Wayland"),
            DisplayServer::X11 => write!(f, "X11"),
            DisplayServer::Unknown => write!(f, "Unknown"),
        }
    }
}

/// Log platform information at startup
pub fn log_platform_info() {
    let display_server = DisplayServer::detect();
    tracing::debug!(display_server = %display_server, "Display server detected");

    if let Ok(session_type) = env::var("XDG_SESSION_TYPE") {
        tracing::debug!(session_type = %session_type, "XDG session type");
    }
}

/// Put text on the system clipboard
pub fn copy_to_clipboard(text: &str) -> bool {
    let display_server = DisplayServer::detect();
    if !display_server.has_clipboard() {
        tracing::warn!("No display server, clipboard unavailable");
        return false;
    }

    if let Ok(mut clipboard) = arboard::Clipboard::new() {
        if clipboard.set_text(text).is_ok() {
            tracing::debug!("Copied to clipboard via arboard");
            return true;
        }
    }

    if display_server.is_wayland() && try_wl_copy(text) {
        tracing::debug!("Copied to clipboard via wl-copy");
        return true;
    }

    tracing::warn!("All clipboard methods failed");
    false
}

fn try_wl_copy(text: &str) -> bool {
    let mut child = match Command::new("wl-copy")
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
    {
        Ok(child) => child,
        Err(_) => return false,
    };

    if let Some(mut stdin) = child.stdin.take() {
        if stdin.write_all(text.as_bytes()).is_err() {
            return false;
        }
    }

    matches!(child.wait(), Ok(status) if status.success())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_server_display() {
        assert_eq!(format!("{}", DisplayServer::Wayland), "Wayland");
        assert_eq!(format!("{}", DisplayServer::X11), "X11");
        assert_eq!(format!("{}", DisplayServer::Unknown), "Unknown");
    }

    #[test]
    fn wayland_wins_over_x11() {
        assert_eq!(DisplayServer::from_vars(true, true), DisplayServer::Wayland);
        assert_eq!(DisplayServer::from_vars(false, true), DisplayServer::X11);
        assert_eq!(DisplayServer::from_vars(false, false), DisplayServer::Unknown);
    }
}
