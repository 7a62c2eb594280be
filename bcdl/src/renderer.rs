//! DOM rendering through a headless browser
//!
//! The album page builds its payloads with scripts, so the raw HTTP body is
//! not enough. A headless Chrome/Chromium renders the page for a bounded
//! amount of virtual time and dumps the resulting DOM to stdout.

use crate::error::{Error, Result};
use async_trait::async_trait;
use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Output, Stdio};
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Capability to turn a URL into rendered HTML
#[async_trait]
pub trait DomRenderer: Send + Sync {
    /// Render `url`, letting the page settle for at most `budget`.
    ///
    /// Returns [`Error::Cancelled`] promptly once `cancel` fires.
    async fn render(&self, url: &str, budget: Duration, cancel: &CancellationToken)
        -> Result<String>;
}

/// Standard install locations of Chrome/Chromium for the host platform
pub fn well_known_browser_paths() -> Vec<PathBuf> {
    let paths: &[&str] = if cfg!(target_os = "windows") {
        &[
            r"C:\Program Files\Google\Chrome\Application\chrome.exe",
            r"C:\Program Files (x86)\Google\Chrome\Application\chrome.exe",
        ]
    } else if cfg!(target_os = "macos") {
        &[
            "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
            "/Applications/Chromium.app/Contents/MacOS/Chromium",
        ]
    } else {
        &[
            "/usr/bin/google-chrome",
            "/usr/bin/google-chrome-stable",
            "/usr/bin/chromium",
            "/usr/bin/chromium-browser",
        ]
    };
    paths.iter().map(PathBuf::from).collect()
}

/// Headless Chrome/Chromium process renderer
#[derive(Debug, Clone)]
pub struct HeadlessBrowser {
    executable: PathBuf,
}

impl HeadlessBrowser {
    pub fn new(executable: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
        }
    }

    /// Find the browser executable.
    ///
    /// An explicit path is used as-is and must exist; otherwise the
    /// well-known install locations are checked in order.
    pub fn locate(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::locate_in(&[path.to_path_buf()]),
            None => Self::locate_in(&well_known_browser_paths()),
        }
    }

    /// First existing file among `candidates`
    pub fn locate_in(candidates: &[PathBuf]) -> Result<Self> {
        candidates
            .iter()
            .find(|path| path.is_file())
            .map(|path| Self::new(path.clone()))
            .ok_or_else(|| Error::BrowserNotFound(candidates.to_vec()))
    }

    pub fn executable(&self) -> &Path {
        &self.executable
    }

    /// Browser command line for one render
    pub fn command_args(profile_dir: &Path, url: &str, budget: Duration) -> Vec<OsString> {
        let mut user_data_dir = OsString::from("--user-data-dir=");
        user_data_dir.push(profile_dir.as_os_str());

        vec![
            OsString::from("--headless"),
            OsString::from("--disable-gpu"),
            user_data_dir,
            OsString::from(format!("--virtual-time-budget={}", budget.as_millis())),
            OsString::from("--dump-dom"),
            OsString::from(url),
        ]
    }
}

#[async_trait]
impl DomRenderer for HeadlessBrowser {
    async fn render(
        &self,
        url: &str,
        budget: Duration,
        cancel: &CancellationToken,
    ) -> Result<String> {
        // Removed after the browser's process group is gone, on every path
        let profile = tempfile::Builder::new().prefix("bcdl-profile-").tempdir()?;

        debug!(
            browser = %self.executable.display(),
            profile = %profile.path().display(),
            budget_ms = budget.as_millis() as u64,
            "Launching headless browser"
        );

        let mut command = Command::new(&self.executable);
        command
            .args(Self::command_args(profile.path(), url, budget))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        // Own group so browser helpers can be signalled together
        #[cfg(unix)]
        command.process_group(0);

        let mut child = command.spawn()?;
        let pid = child.id();

        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => None,
            output = collect_output(&mut child) => Some(output),
        };

        // Helpers outlive the main process and keep writing into the profile
        kill_process_group(pid);
        if outcome.is_none() {
            warn!("Rendering cancelled before the browser exited");
            if let Err(e) = child.kill().await {
                warn!("Failed to stop browser process: {}", e);
            }
        }

        if let Err(e) = profile.close() {
            warn!("Failed to remove browser profile directory: {}", e);
        }

        let output = outcome.ok_or(Error::Cancelled)??;

        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        if !output.status.success() {
            return Err(Error::RendererFailed {
                code: output.status.code(),
                stderr,
            });
        }
        if !stderr.is_empty() {
            debug!(diagnostics = %stderr, "Browser diagnostics");
        }

        let html = String::from_utf8_lossy(&output.stdout).into_owned();
        debug!(bytes = html.len(), "Rendered DOM captured");
        Ok(html)
    }
}

/// Wait for the child while draining both pipes
async fn collect_output(child: &mut Child) -> io::Result<Output> {
    let stdout = child.stdout.take();
    let stderr = child.stderr.take();
    let (status, stdout, stderr) =
        tokio::try_join!(child.wait(), read_pipe(stdout), read_pipe(stderr))?;
    Ok(Output {
        status,
        stdout,
        stderr,
    })
}

async fn read_pipe<R: AsyncRead + Unpin>(pipe: Option<R>) -> io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    if let Some(mut pipe) = pipe {
        pipe.read_to_end(&mut buf).await?;
    }
    Ok(buf)
}

/// SIGKILL the process group led by `pid`
#[cfg(unix)]
fn kill_process_group(pid: Option<u32>) {
    let Some(pgid) = pid.and_then(|pid| libc::pid_t::try_from(pid).ok()) else {
        return;
    };
    // SAFETY: kill(2) takes no pointers; a negative pid addresses the group
    if unsafe { libc::kill(-pgid, libc::SIGKILL) } != 0 {
        let err = io::Error::last_os_error();
        if err.raw_os_error() != Some(libc::ESRCH) {
            warn!(pgid, "Failed to signal browser process group: {}", err);
        }
    }
}

#[cfg(not(unix))]
fn kill_process_group(_pid: Option<u32>) {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_args() {
        let args = HeadlessBrowser::command_args(
            Path::new("/tmp/profile"),
            "https://vbeo.bandcamp.com/album/--17",
            Duration::from_millis(7500),
        );

        let args: Vec<String> = args
            .into_iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            args,
            vec![
                "--headless",
                "--disable-gpu",
                "--user-data-dir=/tmp/profile",
                "--virtual-time-budget=7500",
                "--dump-dom",
                "https://vbeo.bandcamp.com/album/--17",
            ]
        );
    }

    #[test]
    fn test_well_known_paths_not_empty() {
        let paths = well_known_browser_paths();
        assert!(paths.len() >= 2);
        assert!(paths.iter().all(|p| p.is_absolute()));
    }

    #[test]
    fn test_locate_in_reports_checked_paths() {
        let candidates = vec![
            PathBuf::from("/nonexistent/bcdl/chrome"),
            PathBuf::from("/nonexistent/bcdl/chromium"),
        ];

        match HeadlessBrowser::locate_in(&candidates) {
            Err(Error::BrowserNotFound(checked)) => assert_eq!(checked, candidates),
            other => panic!("expected BrowserNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_locate_in_picks_first_existing() {
        let dir = tempfile::tempdir().unwrap();
        let present = dir.path().join("chromium");
        std::fs::write(&present, b"").unwrap();

        let candidates = [dir.path().join("missing"), present.clone()];
        let browser = HeadlessBrowser::locate_in(&candidates).unwrap();

        assert_eq!(browser.executable(), present.as_path());
    }

    #[test]
    fn test_locate_explicit_missing_path() {
        let result = HeadlessBrowser::locate(Some(Path::new("/nonexistent/bcdl/chrome")));
        assert!(matches!(result, Err(Error::BrowserNotFound(paths)) if paths.len() == 1));
    }
}
