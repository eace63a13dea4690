use std::path::Path;

/// Command line used to launch the backing shell.
///
/// The shell must read commands from stdin without printing a prompt or
/// sourcing startup files, otherwise its chatter would end up in the output
/// of the first forwarded command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellProgram {
    pub program: String,
    pub args: Vec<String>,
}

impl ShellProgram {
    pub fn new(program: impl Into<String>, args: &[&str]) -> Self {
        Self {
            program: program.into(),
            args: args.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Shell for the platform this binary runs on.
    pub fn host() -> Self {
        Self::for_os(std::env::consts::OS)
    }

    pub fn for_os(os: &str) -> Self {
        match os {
            "windows" => Self::new("powershell", &["-NoLogo", "-NoProfile", "-Command", "-"]),
            _ => Self::new("bash", &["--noprofile", "--norc"]),
        }
    }

    /// Shell given explicitly by path; quiet-startup arguments are picked
    /// from the binary name.
    pub fn from_path(path: &str) -> Self {
        let name = Path::new(path)
            .file_stem()
            .map(|s| s.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        let args: &[&str] = match name.as_str() {
            "bash" => &["--noprofile", "--norc"],
            "zsh" => &["-f"],
            "pwsh" | "powershell" => &["-NoLogo", "-NoProfile", "-Command", "-"],
            _ => &[],
        };

        Self::new(path, args)
    }

    pub fn display_name(&self) -> String {
        if self.args.is_empty() {
            self.program.clone()
        } else {
            format!("{} {}", self.program, self.args.join(" "))
        }
    }
}

impl Default for ShellProgram {
    fn default() -> Self {
        Self::host()
    }
}
