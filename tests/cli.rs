#![cfg(unix)]

use std::ffi::OsStr;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;
use std::process::{Child, ChildStdout, Command, ExitStatus, Output, Stdio};
use std::thread;
use std::time::{Duration, Instant};

fn run_cli(dir: &Path, input: &str, extra: &[&str]) -> Output {
    run_cli_with_env(dir, input, extra, &[])
}

fn cli_command(dir: &Path, extra: &[&str]) -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_custom-cli"));
    command
        .arg("--quiet")
        .args(extra)
        .current_dir(dir)
        .env("NO_COLOR", "1")
        .env("TERM", "xterm")
        .env_remove("RUST_LOG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    command
}

fn run_cli_with_env(dir: &Path, input: &str, extra: &[&str], env: &[(&str, &OsStr)]) -> Output {
    let mut command = cli_command(dir, extra);
    for (key, value) in env {
        command.env(key, value);
    }

    let mut child = command.spawn().unwrap();
    child
        .stdin
        .take()
        .unwrap()
        .write_all(input.as_bytes())
        .unwrap();
    child.wait_with_output().unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn scratch() -> tempfile::TempDir {
    tempfile::tempdir().unwrap()
}

fn is_pid(line: &str) -> bool {
    !line.is_empty() && line.chars().all(|c| c.is_ascii_digit())
}

/// Reads forwarded output until the backing shell's `echo $$` comes back.
fn read_shell_pid(stdout: &mut BufReader<ChildStdout>) -> String {
    let mut line = String::new();
    loop {
        line.clear();
        assert_ne!(stdout.read_line(&mut line).unwrap(), 0, "front-end closed stdout");
        if is_pid(line.trim_end()) {
            return line.trim_end().to_string();
        }
    }
}

fn wait_with_deadline(child: &mut Child, limit: Duration) -> Option<ExitStatus> {
    let deadline = Instant::now() + limit;
    while Instant::now() < deadline {
        if let Some(status) = child.try_wait().unwrap() {
            return Some(status);
        }
        thread::sleep(Duration::from_millis(50));
    }
    None
}

/// Starts the front-end with stdin held open, runs `first`, then sends SIGTERM.
fn terminate_after(first: &str) -> (Option<ExitStatus>, String) {
    let dir = scratch();
    let mut child = cli_command(dir.path(), &[]).spawn().unwrap();
    let mut stdin = child.stdin.take().unwrap();
    let mut stdout = BufReader::new(child.stdout.take().unwrap());

    writeln!(stdin, "echo $$").unwrap();
    let shell_pid = read_shell_pid(&mut stdout);
    stdin.write_all(first.as_bytes()).unwrap();
    thread::sleep(Duration::from_millis(200));

    let pid = i32::try_from(child.id()).unwrap();
    assert_eq!(unsafe { libc::kill(pid, libc::SIGTERM) }, 0);

    let status = wait_with_deadline(&mut child, Duration::from_secs(5));
    if status.is_none() {
        child.kill().unwrap();
        child.wait().unwrap();
    }
    drop(stdin);
    (status, shell_pid)
}

#[test]
fn test_forwarded_command_prints_once_then_blank_line() {
    let dir = scratch();
    let output = run_cli(dir.path(), "echo hello\n", &[]);
    let out = stdout(&output);

    assert!(output.status.success());
    assert_eq!(out.matches("hello").count(), 1);
    assert!(out.contains("hello\n\n"));
    assert!(!out.contains("__DONE"));
}

#[test]
fn test_input_is_lowercased_by_default() {
    let dir = scratch();
    let out = stdout(&run_cli(dir.path(), "ECHO HeLLo\n", &[]));
    assert!(out.contains("hello\n\n"));
}

#[test]
fn test_keep_case_forwards_input_untouched() {
    let dir = scratch();
    let out = stdout(&run_cli(dir.path(), "echo HeLLo\n", &["--keep-case"]));
    assert!(out.contains("HeLLo\n\n"));
}

#[test]
fn test_whitespace_lines_run_nothing() {
    let dir = scratch();
    let output = run_cli(dir.path(), "   \n\t\n\n", &[]);
    let out = stdout(&output);

    assert!(output.status.success());
    assert!(!out.contains("\n\n"));
    assert!(out.contains("Exiting..."));
}

#[test]
fn test_sequential_commands_do_not_mix() {
    let dir = scratch();
    let out = stdout(&run_cli(dir.path(), "seq 1 50\necho tail\n", &[]));
    assert!(out.contains("49\n50\n\ntail\n\n"));
    assert_eq!(out.matches("tail").count(), 1);
}

#[test]
fn test_cd_restarts_shell_in_new_directory() {
    let dir = scratch();
    let target = scratch();
    let canonical = target.path().canonicalize().unwrap();
    let input = format!("echo $$\ncd {}\necho $$\npwd -P\n", canonical.display());

    let out = stdout(&run_cli(dir.path(), &input, &["--keep-case"]));
    let pids: Vec<&str> = out
        .lines()
        .filter(|line| is_pid(line))
        .collect();

    assert_eq!(pids.len(), 2);
    assert_ne!(pids[0], pids[1]);
    assert!(out.contains(&format!("{}\n\n", canonical.display())));
}

#[test]
fn test_prompt_shows_directory_after_cd() {
    let dir = scratch();
    let target = scratch();
    let canonical = target.path().canonicalize().unwrap();
    let input = format!("cd {}\n", canonical.display());

    // rustyline only writes the prompt for piped stdin on terminals it cannot drive
    let output = run_cli_with_env(
        dir.path(),
        &input,
        &["--keep-case"],
        &[("TERM", OsStr::new("dumb"))],
    );

    assert!(output.status.success());
    assert!(stdout(&output).contains(&format!("{}> ", canonical.display())));
}

#[test]
fn test_cd_to_missing_directory_keeps_session() {
    let dir = scratch();
    let input = "x=kept\ncd /no/such/dir\necho $x\n";
    let out = stdout(&run_cli(dir.path(), input, &[]));

    assert!(out.contains("cd: "));
    assert!(out.contains("kept\n\n"));
}

#[test]
fn test_bare_cd_is_handled_by_backing_shell() {
    let dir = scratch();
    let home = scratch();
    let canonical = home.path().canonicalize().unwrap();
    let input = "x=kept\ncd\npwd -P\necho $x\n";

    let out = stdout(&run_cli_with_env(
        dir.path(),
        input,
        &["--keep-case"],
        &[("HOME", canonical.as_os_str())],
    ));

    assert!(out.contains(&format!("{}\n\n", canonical.display())));
    assert!(out.contains("kept\n\n"));
}

#[test]
fn test_help_is_intercepted() {
    let dir = scratch();
    let out = stdout(&run_cli(dir.path(), "HELP\n", &[]));
    assert!(out.contains("Here are your available commands:"));
    assert!(out.contains(" - exit: Exits the program"));
    assert!(!out.contains("command not found"));
}

#[test]
fn test_clear_redraws_banner_without_forwarding() {
    let dir = scratch();
    let output = run_cli(dir.path(), "clear\ncls\n", &[]);
    let out = stdout(&output);
    let err = String::from_utf8_lossy(&output.stderr);

    assert_eq!(out.matches("\x1b[H\x1b[2J").count(), 2);
    assert!(out.contains("|__|"));
    assert!(!err.contains("command not found"));
}

#[cfg(target_os = "linux")]
#[test]
fn test_exit_reaps_backing_shell() {
    let dir = scratch();
    let output = run_cli(dir.path(), "echo $$\nexit\necho unreachable\n", &[]);
    let out = stdout(&output);

    assert!(output.status.success());
    assert!(out.contains("Exiting..."));
    assert!(!out.contains("unreachable"));

    let pid = out.lines().find(|line| is_pid(line)).unwrap();
    assert!(!Path::new(&format!("/proc/{}", pid)).exists());
}

#[test]
fn test_sigterm_at_prompt_ends_front_end() {
    let (status, shell_pid) = terminate_after("");
    let status = status.expect("front-end ignored SIGTERM at the prompt");

    assert_eq!(status.code(), Some(128 + libc::SIGTERM));
    #[cfg(target_os = "linux")]
    assert!(!Path::new(&format!("/proc/{}", shell_pid)).exists());
    #[cfg(not(target_os = "linux"))]
    let _ = shell_pid;
}

#[test]
fn test_sigterm_during_command_ends_front_end() {
    let (status, shell_pid) = terminate_after("sleep 30\n");
    let status = status.expect("front-end ignored SIGTERM while a command ran");

    assert_eq!(status.code(), Some(128 + libc::SIGTERM));
    #[cfg(target_os = "linux")]
    assert!(!Path::new(&format!("/proc/{}", shell_pid)).exists());
    #[cfg(not(target_os = "linux"))]
    let _ = shell_pid;
}

#[test]
fn test_unspawnable_shell_is_fatal() {
    let dir = scratch();
    let output = run_cli(dir.path(), "echo hi\n", &["--shell", "/no/such/shell"]);
    let err = String::from_utf8_lossy(&output.stderr);

    assert!(!output.status.success());
    assert!(err.contains("failed to start backing shell"));
}

#[test]
fn test_version_and_unknown_flags() {
    let dir = scratch();
    let version = run_cli(dir.path(), "", &["--version"]);
    assert!(version.status.success());
    assert!(stdout(&version).starts_with("custom-cli "));

    let unknown = run_cli(dir.path(), "", &["--bogus"]);
    assert!(!unknown.status.success());
    assert!(String::from_utf8_lossy(&unknown.stderr).contains("Unknown flag --bogus"));
}
