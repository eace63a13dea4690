use crate::flags::Flags;
use crate::input::CaseMode;
use crate::process::ShellProgram;

/// Runtime settings, taken from the command line only.
#[derive(Debug, Clone)]
pub struct Config {
    pub program: ShellProgram,
    pub case_mode: CaseMode,
    pub quiet: bool,
    pub debug: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            program: ShellProgram::host(),
            case_mode: CaseMode::Lower,
            quiet: false,
            debug: false,
        }
    }
}

impl Config {
    pub fn from_flags(flags: &Flags) -> Self {
        let program = match flags.get_value("shell") {
            Some(path) => ShellProgram::from_path(path),
            None => ShellProgram::host(),
        };

        let case_mode = if flags.is_set("keep-case") {
            CaseMode::Preserve
        } else {
            CaseMode::Lower
        };

        Config {
            program,
            case_mode,
            quiet: flags.is_set("quiet"),
            debug: flags.is_set("debug"),
        }
    }
}
