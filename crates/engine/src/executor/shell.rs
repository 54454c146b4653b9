//! System shell resolution and child-process driving.
//!
//! Commands run through `bash -o pipefail -c` when bash is installed so that
//! pipeline failures (`false | cat`) fail the step; otherwise `sh -c` is used.
//! The shell is looked up once per process.

use std::{
    env,
    ffi::OsStr,
    io::Write,
    path::{Path, PathBuf},
    process::{ExitStatus, Stdio},
};

use once_cell::sync::Lazy;
use tokio::{
    io::{AsyncRead, AsyncReadExt},
    process::Command,
};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::{CommandError, ShellInvocation};

const READ_CHUNK: usize = 8 * 1024;

static SYSTEM_SHELL: Lazy<Option<ShellProgram>> = Lazy::new(|| detect_shell(env::var_os("PATH").as_deref()));

/// Shell binary plus the flags placed before the command string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellProgram {
    pub program: PathBuf,
    pub flags: &'static [&'static str],
}

/// Returns the shell resolved from `PATH`, if any.
pub fn system_shell() -> Option<&'static ShellProgram> {
    SYSTEM_SHELL.as_ref()
}

/// Finds bash (preferred) or sh on the given search path.
pub fn detect_shell(search_path: Option<&OsStr>) -> Option<ShellProgram> {
    let search_path = search_path?;
    if let Some(program) = find_executable("bash", search_path) {
        return Some(ShellProgram {
            program,
            flags: &["-o", "pipefail", "-c"],
        });
    }
    find_executable("sh", search_path).map(|program| ShellProgram { program, flags: &["-c"] })
}

fn find_executable(name: &str, search_path: &OsStr) -> Option<PathBuf> {
    env::split_paths(search_path).find_map(|dir| {
        let candidate = dir.join(name);
        if is_file(&candidate) {
            return Some(candidate);
        }
        let with_suffix = dir.join(format!("{name}{}", env::consts::EXE_SUFFIX));
        is_file(&with_suffix).then_some(with_suffix)
    })
}

fn is_file(path: &Path) -> bool {
    path.metadata().map(|metadata| metadata.is_file()).unwrap_or(false)
}

/// Spawn `invocation` and copy its stdout and stderr to `diagnostics` until it exits.
///
/// The child is killed when `cancel` fires; the child is also killed if this
/// future is dropped early.
pub async fn drive_child(
    shell: &ShellProgram,
    invocation: &ShellInvocation<'_>,
    cancel: &CancellationToken,
    diagnostics: &mut dyn Write,
) -> Result<(), CommandError> {
    let mut command = Command::new(&shell.program);
    command
        .args(shell.flags)
        .arg(invocation.command)
        .envs(invocation.env)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let mut child = command.spawn().map_err(CommandError::Spawn)?;
    debug!(pid = ?child.id(), "spawned workflow command");

    let mut stdout = child.stdout.take();
    let mut stderr = child.stderr.take();
    let mut stdout_buffer = vec![0u8; READ_CHUNK];
    let mut stderr_buffer = vec![0u8; READ_CHUNK];

    loop {
        let streaming = stdout.is_some() || stderr.is_some();
        tokio::select! {
            _ = cancel.cancelled(), if streaming => {
                let _ = child.kill().await;
                return Err(CommandError::Canceled);
            }
            read = read_chunk(&mut stdout, &mut stdout_buffer), if stdout.is_some() => {
                match read.map_err(CommandError::Stream)? {
                    0 => stdout = None,
                    count => forward(diagnostics, &stdout_buffer[..count])?,
                }
            }
            read = read_chunk(&mut stderr, &mut stderr_buffer), if stderr.is_some() => {
                match read.map_err(CommandError::Stream)? {
                    0 => stderr = None,
                    count => forward(diagnostics, &stderr_buffer[..count])?,
                }
            }
            else => break,
        }
    }

    let status = tokio::select! {
        _ = cancel.cancelled() => {
            let _ = child.kill().await;
            return Err(CommandError::Canceled);
        }
        status = child.wait() => status.map_err(CommandError::Spawn)?,
    };
    check_status(status)
}

async fn read_chunk<R>(reader: &mut Option<R>, buffer: &mut [u8]) -> std::io::Result<usize>
where
    R: AsyncRead + Unpin,
{
    match reader {
        Some(reader) => reader.read(buffer).await,
        None => Ok(0),
    }
}

fn forward(diagnostics: &mut dyn Write, chunk: &[u8]) -> Result<(), CommandError> {
    diagnostics.write_all(chunk).map_err(CommandError::Stream)?;
    diagnostics.flush().map_err(CommandError::Stream)
}

fn check_status(status: ExitStatus) -> Result<(), CommandError> {
    if status.success() {
        return Ok(());
    }
    if let Some(code) = status.code() {
        return Err(CommandError::Exit(code));
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return Err(CommandError::Signal(signal));
        }
    }
    Err(CommandError::Exit(-1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn prefers_bash_over_sh() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join("sh"), "").expect("write sh");
        fs::write(dir.path().join("bash"), "").expect("write bash");

        let shell = detect_shell(Some(dir.path().as_os_str())).expect("shell found");
        assert_eq!(shell.program, dir.path().join("bash"));
        assert_eq!(shell.flags, &["-o", "pipefail", "-c"]);
    }

    #[test]
    fn falls_back_to_sh() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join("sh"), "").expect("write sh");

        let shell = detect_shell(Some(dir.path().as_os_str())).expect("shell found");
        assert_eq!(shell.program, dir.path().join("sh"));
        assert_eq!(shell.flags, &["-c"]);
    }

    #[test]
    fn reports_missing_shell() {
        let dir = tempfile::tempdir().expect("tempdir");
        assert_eq!(detect_shell(Some(dir.path().as_os_str())), None);
        assert_eq!(detect_shell(None), None);
    }
}
