use custom_cli::config::Config;
use custom_cli::error::ShellError;
use custom_cli::flags::Flags;
use custom_cli::logging::init_logging;
use custom_cli::shell::Shell;
use std::env;
use std::process::ExitCode;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("custom-cli: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), ShellError> {
    let mut flags = Flags::new();
    let args: Vec<String> = env::args().skip(1).collect();
    flags.parse(&args)?;

    if flags.is_set("help") {
        flags.print_help();
        return Ok(());
    }

    if flags.is_set("version") {
        println!("custom-cli {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    init_logging(flags.is_set("debug"));

    let config = Config::from_flags(&flags);
    tracing::debug!(?config, "starting");

    let mut shell = Shell::new(config)?;
    shell.run()
}
