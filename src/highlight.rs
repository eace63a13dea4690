use inksac::prelude::*;
use std::path::Path;

const BANNER: &str = r"
                       __                                  .__  .__
  ____  __ __  _______/  |_  ____   _____             ____ |  | |__|
_/ ___\|  |  \/  ___/\   __\/  _ \ /     \   ______ _/ ___\|  | |  |
\  \___|  |  /\___ \  |  | (  <_> )  Y Y  \ /_____/ \  \___|  |_|  |
 \___  >____//____  > |__|  \____/|__|_|  /          \___  >____/__|
     \/           \/                    \/               \/
";

pub const CLEAR_SCREEN: &str = "\x1b[H\x1b[2J";

/// Colors for everything the front-end itself prints.
#[derive(Debug, Clone, Copy)]
pub struct Highlighter {
    color_support: ColorSupport,
}

impl Default for Highlighter {
    fn default() -> Self {
        Self::new()
    }
}

impl Highlighter {
    pub fn new() -> Self {
        let support = check_color_support().unwrap_or(ColorSupport::NoColor);
        Self {
            color_support: support,
        }
    }

    pub fn plain() -> Self {
        Self {
            color_support: ColorSupport::NoColor,
        }
    }

    fn paint(&self, text: &str, style: Style) -> String {
        if matches!(self.color_support, ColorSupport::NoColor) {
            return text.to_string();
        }
        text.style(style).to_string()
    }

    pub fn banner(&self) -> String {
        let style = Style::builder().foreground(Color::Green).bold().build();
        self.paint(BANNER, style)
    }

    pub fn prompt(&self, cwd: &Path) -> String {
        let style = Style::builder().foreground(Color::Cyan).build();
        format!("{}> ", self.paint(&cwd.to_string_lossy(), style))
    }

    pub fn farewell(&self) -> String {
        let style = Style::builder().foreground(Color::Red).bold().build();
        self.paint(" Exiting...", style)
    }

    pub fn error(&self, message: &str) -> String {
        let style = Style::builder().foreground(Color::Red).bold().build();
        self.paint(message, style)
    }

    pub fn hint(&self, hint: &str) -> String {
        let style = Style::builder().foreground(Color::RGB(128, 128, 128)).build();
        self.paint(hint, style)
    }
}
