//! macOS appearance through System Events.

use anyhow::Result;
use std::process::Command;

use super::{AppearanceMode, AppearanceSetter, run_command};

pub struct MacOsSetter;

/// AppleScript that sets dark mode on or off.
pub(crate) fn script(mode: AppearanceMode) -> String {
    format!(
        "tell application \"System Events\" to tell appearance preferences to set dark mode to {}",
        mode.is_dark()
    )
}

impl AppearanceSetter for MacOsSetter {
    fn apply(&mut self, mode: AppearanceMode) -> Result<()> {
        run_command(Command::new("osascript").arg("-e").arg(script(mode)))
    }

    fn name(&self) -> &'static str {
        "macos"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_toggles_dark_mode() {
        assert!(script(AppearanceMode::Night).ends_with("set dark mode to true"));
        assert!(script(AppearanceMode::Day).ends_with("set dark mode to false"));
    }
}
