//! Blocking wrapper around the Spine editor's command line interface.

use crate::{EditorConfig, Result, ToolError};
use std::ffi::OsStr;
use std::path::Path;
use std::process::Command;
use std::time::Instant;

#[derive(Clone, Debug)]
pub struct SpineEditor {
    config: EditorConfig,
}

impl SpineEditor {
    pub fn new(config: EditorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// `<editor> -i <input> -o <output> <options...>`
    pub fn build_command<I, S>(&self, input: &Path, output: &Path, options: I) -> Command
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let mut command = Command::new(&self.config.editor);
        command
            .arg("-i")
            .arg(input)
            .arg("-o")
            .arg(output)
            .args(options);
        command
    }

    /// Runs the editor and blocks until it exits and `output` exists.
    pub fn run<I, S>(&self, input: &Path, output: &Path, options: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let mut command = self.build_command(input, output, options);
        log::info!("running {command:?}");

        let result = command.output().map_err(|source| ToolError::Spawn {
            program: self.config.editor.clone(),
            source,
        })?;
        for line in String::from_utf8_lossy(&result.stdout).lines() {
            log::info!("editor: {line}");
        }
        for line in String::from_utf8_lossy(&result.stderr).lines() {
            log::warn!("editor: {line}");
        }
        if !result.status.success() {
            return Err(ToolError::EditorFailed {
                status: result.status,
            });
        }

        self.wait_for_file(output)
    }

    /// Polls for `path` every poll interval until it exists or the timeout runs out.
    pub fn wait_for_file(&self, path: &Path) -> Result<()> {
        let timeout = self.config.timeout();
        let interval = self.config.poll_interval();
        let start = Instant::now();
        loop {
            if path.exists() {
                log::debug!("'{}' appeared after {:?}", path.display(), start.elapsed());
                return Ok(());
            }
            let waited = start.elapsed();
            if waited >= timeout {
                return Err(ToolError::Timeout {
                    path: path.to_path_buf(),
                    waited,
                });
            }
            std::thread::sleep(interval.min(timeout - waited));
        }
    }

    /// Imports a skeleton into a `.spine` project, rescaling it by `scale`.
    pub fn import_and_rescale(&self, skeleton: &Path, output: &Path, scale: f64) -> Result<()> {
        if output.extension() != Some(OsStr::new("spine")) {
            return Err(ToolError::InvalidPath {
                path: output.to_path_buf(),
                reason: "output must have the .spine extension".to_string(),
            });
        }
        let scale = scale.to_string();
        self.run(skeleton, output, ["-s", scale.as_str(), "-r"])
    }

    /// Imports a project or skeleton and exports it as JSON with the configured export settings.
    pub fn import_and_export_json(&self, project: &Path, output: &Path) -> Result<()> {
        let settings = self.config.export_settings.as_os_str();
        self.run(project, output, [OsStr::new("-e"), settings])
    }

    /// Unpacks the regions of `atlas` from the page images in `png_folder` into `output`.
    pub fn unpack_texture(&self, png_folder: &Path, output: &Path, atlas: &Path) -> Result<()> {
        self.run(png_folder, output, [OsStr::new("-c"), atlas.as_os_str()])
    }
}
