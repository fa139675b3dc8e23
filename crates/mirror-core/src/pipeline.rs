//! Pipeline orchestration
//!
//! [`Pipeline::run`] executes the seven stages in order. Each stage is
//! bracketed by its `BEFORE_*` and `AFTER_*` hook points; the stage body runs
//! only if no `BEFORE_*` handler vetoed it, while the `AFTER_*` hook is
//! always dispatched. Failures propagate and leave staging in place.

use mirror_fs::{Storage, is_archive, path};

use crate::extensions::{ExtensionRunner, RunEnvironment};
use crate::hooks::Stage;
use crate::state::BuildState;
use crate::Result;

/// Runs the build stages for one configuration
pub struct Pipeline {
    runner: ExtensionRunner,
    env: RunEnvironment,
}

impl Pipeline {
    pub fn new(runner: ExtensionRunner, env: RunEnvironment) -> Self {
        Self { runner, env }
    }

    pub fn runner(&self) -> &ExtensionRunner {
        &self.runner
    }

    pub fn env(&self) -> &RunEnvironment {
        &self.env
    }

    /// Run every stage in order.
    pub fn run(&mut self, state: &mut BuildState) -> Result<()> {
        for stage in Stage::ALL {
            self.run_stage(stage, state)?;
        }
        Ok(())
    }

    /// Run one stage with its surrounding hooks.
    pub fn run_stage(&mut self, stage: Stage, state: &mut BuildState) -> Result<()> {
        let proceed = self.runner.dispatch(stage.before(), state, &self.env)?;
        state.set_last_step_executed(proceed);

        if proceed {
            tracing::info!("Running {}", stage.label());
            self.stage_body(stage, state)?;
        } else {
            tracing::info!("Skipping {}", stage.label());
        }

        self.runner.dispatch(stage.after(), state, &self.env)?;
        Ok(())
    }

    fn stage_body(&self, stage: Stage, state: &mut BuildState) -> Result<()> {
        match stage {
            Stage::InitialClearTempDirectory | Stage::FinalClearTempDirectory => {
                self.env.staging.delete_directory(state.temp_prefix())?;
                Ok(())
            }
            Stage::CreateTempDirectory => {
                self.env.staging.make_directory(state.temp_prefix())?;
                Ok(())
            }
            Stage::DownloadFromS3 => self.download(state),
            Stage::BuildSatisRepository => {
                let output_dir = self.env.staging.absolute(state.temp_prefix())?;
                self.env
                    .generator
                    .build(state.config_file_path(), &output_dir, state.repository_urls())
            }
            Stage::UploadToS3 => self.upload(state),
            Stage::RemoveMissingFilesFromS3 => self.remove_missing(state),
        }
    }

    fn download(&self, state: &mut BuildState) -> Result<()> {
        if state.is_force_fresh_downloads() {
            tracing::debug!("Fresh build requested, nothing to download");
            return Ok(());
        }

        let staging = &self.env.staging;
        for file in self.env.remote.list("")? {
            let target = state.staging_path(&file);
            if is_archive(&file) {
                tracing::debug!("Creating placeholder for {file}");
                staging.put(&target, b"")?;
                state.add_placeholder(target);
            } else {
                tracing::debug!("Downloading {file}");
                let mut reader = self.env.remote.read_stream(&file)?;
                staging.write_stream(&target, &mut reader)?;
            }
        }
        Ok(())
    }

    fn upload(&self, state: &BuildState) -> Result<()> {
        let staging = &self.env.staging;
        for staged in staging.list(state.temp_prefix())? {
            let relative = state.relative_path(&staged);

            if state.is_placeholder(&staged) {
                if staging.size(&staged)? == 0 {
                    tracing::debug!("Skipping upload of placeholder {relative}");
                    continue;
                }
            } else if let Some(known) = state.known_checksum(&staged) {
                let native = staging.absolute(&staged)?;
                if mirror_fs::checksum::crc32_file(&native)? == known {
                    tracing::debug!("Skipping upload of unchanged {relative}");
                    continue;
                }
            }

            tracing::debug!("Uploading {relative}");
            let mut reader = staging.read_stream(&staged)?;
            self.env.remote.write_stream(&relative, &mut reader)?;
        }
        Ok(())
    }

    fn remove_missing(&self, state: &BuildState) -> Result<()> {
        for file in self.env.remote.list("")? {
            if !self.env.staging.exists(&path::join(state.temp_prefix(), &file)) {
                tracing::debug!("Removing {file} from remote");
                self.env.remote.delete(&file)?;
            }
        }
        Ok(())
    }
}
