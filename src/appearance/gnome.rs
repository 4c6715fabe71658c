//! GNOME (and derivatives) through the `color-scheme` gsettings key.

use anyhow::Result;
use std::process::Command;

use super::{AppearanceMode, AppearanceSetter, run_command};

const SCHEMA: &str = "org.gnome.desktop.interface";
const KEY: &str = "color-scheme";

pub struct GnomeSetter;

pub(crate) fn color_scheme(mode: AppearanceMode) -> &'static str {
    match mode {
        AppearanceMode::Day => "default",
        AppearanceMode::Night => "prefer-dark",
    }
}

impl AppearanceSetter for GnomeSetter {
    fn apply(&mut self, mode: AppearanceMode) -> Result<()> {
        run_command(Command::new("gsettings").args(["set", SCHEMA, KEY, color_scheme(mode)]))
    }

    fn name(&self) -> &'static str {
        "gnome"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_scheme_values() {
        assert_eq!(color_scheme(AppearanceMode::Day), "default");
        assert_eq!(color_scheme(AppearanceMode::Night), "prefer-dark");
    }
}
