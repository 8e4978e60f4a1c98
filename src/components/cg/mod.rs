//! Interface to an external constraint grammar engine.
//!
//! The engine reads cohorts in the vislcg3 text stream format and writes them back with
//! implausible readings removed. The [protocol] module builds requests and parses responses.

use fs_err as fs;
use log::{debug, info};
use std::{
    io::{self, Write},
    path::{Path, PathBuf},
    process::{Command, Stdio},
    thread,
};

use crate::Error;

pub mod protocol;

/// Name of the engine executable searched on the `PATH`.
pub const VISLCG3: &str = "vislcg3";

/// Something which applies a constraint grammar to a request in the text stream format.
pub trait ConstraintGrammar {
    /// Disambiguates the cohorts in `input`, returning the raw engine output.
    fn disambiguate(&self, input: &str) -> Result<String, Error>;
}

impl<T: ConstraintGrammar + ?Sized> ConstraintGrammar for &T {
    fn disambiguate(&self, input: &str) -> Result<String, Error> {
        (**self).disambiguate(input)
    }
}

/// Runs `vislcg3 -g <grammar>` as a subprocess, once per request.
#[derive(Debug, Clone)]
pub struct VislCg3 {
    executable: PathBuf,
    grammar: PathBuf,
}

/// Whether `path` is a file with an execute permission bit set.
fn is_executable(path: &Path) -> bool {
    let metadata = match fs::metadata(path) {
        Ok(metadata) => metadata,
        Err(_) => return false,
    };

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        metadata.is_file() && metadata.permissions().mode() & 0o111 != 0
    }
    #[cfg(not(unix))]
    {
        metadata.is_file()
    }
}

impl VislCg3 {
    /// Locates the engine, either at `executable` or on the `PATH`.
    /// Fails with [Error::MissingDependency] if it can not be found or is not executable.
    pub fn locate<P: AsRef<Path>>(executable: Option<&Path>, grammar: P) -> Result<Self, Error> {
        let executable = match executable {
            Some(path) if is_executable(path) => Some(path.to_path_buf()),
            Some(path) => {
                debug!("{} is not an executable file.", path.display());
                None
            }
            None => match which::which(VISLCG3) {
                Ok(path) => Some(path),
                Err(error) => {
                    debug!("{} is not on the PATH: {}", VISLCG3, error);
                    None
                }
            },
        }
        .ok_or_else(|| Error::MissingDependency {
            name: VISLCG3.to_string(),
        })?;

        info!("Using constraint grammar engine at {}.", executable.display());
        Ok(VislCg3 {
            executable,
            grammar: grammar.as_ref().to_path_buf(),
        })
    }

    pub fn executable(&self) -> &Path {
        &self.executable
    }

    pub fn grammar(&self) -> &Path {
        &self.grammar
    }
}

impl ConstraintGrammar for VislCg3 {
    fn disambiguate(&self, input: &str) -> Result<String, Error> {
        let mut child = Command::new(&self.executable)
            .arg("-g")
            .arg(&self.grammar)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        // the engine may fill its stdout pipe before it has read all input
        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| io::Error::new(io::ErrorKind::BrokenPipe, "engine stdin is closed"))?;
        let request = input.to_string();
        let writer = thread::spawn(move || stdin.write_all(request.as_bytes()));

        let output = child.wait_with_output()?;
        let written = writer.join();

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr);

        // a failed engine takes precedence over a broken pipe while writing the request
        if !output.status.success() {
            return Err(Error::MalformedEngineOutput {
                reason: format!("{} exited with {}: {}", VISLCG3, output.status, stderr.trim()),
                raw: stdout,
            });
        }

        match written {
            Ok(result) => result?,
            Err(_) => {
                let error = io::Error::new(io::ErrorKind::Other, "writing the request panicked");
                return Err(error.into());
            }
        }

        if !stderr.trim().is_empty() {
            debug!("{}: {}", VISLCG3, stderr.trim());
        }

        Ok(stdout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_executable_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let executable = dir.path().join("no-such-engine");

        let result = VislCg3::locate(Some(&executable), "grammar");
        match result {
            Err(Error::MissingDependency { name }) => assert_eq!(name, VISLCG3),
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[cfg(unix)]
    fn script(dir: &Path, name: &str, body: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.join(name);
        fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[cfg(unix)]
    fn request(n_tokens: usize) -> String {
        (0..n_tokens)
            .map(|i| format!("\"<gair>\"\n\t\"gair\" {{1,{}}} [cy] E b u :word:\n", i + 1))
            .collect()
    }

    #[test]
    #[cfg(unix)]
    fn non_executable_file_is_missing() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let executable = script(dir.path(), VISLCG3, "exec cat");
        fs::set_permissions(&executable, std::fs::Permissions::from_mode(0o644)).unwrap();

        assert!(matches!(
            VislCg3::locate(Some(&executable), "grammar"),
            Err(Error::MissingDependency { .. })
        ));
    }

    #[test]
    #[cfg(unix)]
    fn runs_the_engine_process() -> Result<(), Error> {
        let dir = tempfile::tempdir()?;
        let executable = script(dir.path(), VISLCG3, "exec cat");

        let engine = VislCg3::locate(Some(&executable), "grammar")?;
        assert_eq!(engine.executable(), executable.as_path());

        let input = request(3);
        assert_eq!(engine.disambiguate(&input)?, input);
        Ok(())
    }

    #[test]
    #[cfg(unix)]
    fn large_requests_do_not_block() -> Result<(), Error> {
        let dir = tempfile::tempdir()?;
        let engine = VislCg3::locate(Some(&script(dir.path(), VISLCG3, "exec cat")), "grammar")?;

        // far beyond the capacity of a pipe in both directions
        let input = request(50_000);
        assert!(input.len() > 1 << 20);
        assert_eq!(engine.disambiguate(&input)?.len(), input.len());
        Ok(())
    }

    #[test]
    #[cfg(unix)]
    fn failing_engine_keeps_its_diagnostic() -> Result<(), Error> {
        let dir = tempfile::tempdir()?;
        let executable = script(
            dir.path(),
            VISLCG3,
            "echo 'grammar g not found' >&2\nexit 1",
        );
        let engine = VislCg3::locate(Some(&executable), "g")?;

        for input in &[request(1), request(50_000)] {
            match engine.disambiguate(input) {
                Err(Error::MalformedEngineOutput { reason, .. }) => {
                    assert!(reason.contains("grammar g not found"), "{}", reason)
                }
                other => panic!("unexpected result {:?}", other),
            }
        }
        Ok(())
    }

    #[test]
    fn engines_can_be_borrowed() {
        struct Echo;

        impl ConstraintGrammar for Echo {
            fn disambiguate(&self, input: &str) -> Result<String, Error> {
                Ok(input.to_string())
            }
        }

        fn run<E: ConstraintGrammar>(engine: E) -> String {
            engine.disambiguate("\"<a>\"\n").unwrap()
        }

        assert_eq!(run(&Echo), "\"<a>\"\n");
    }
}
