//! Pipeline stages and the hook points around them
//!
//! Every stage of a build is bracketed by a `BEFORE_*` and an `AFTER_*`
//! hook point. Extensions bind handlers to hook points; a `BEFORE_*`
//! handler may veto its stage.

use std::fmt;

use serde::Serialize;

/// Points in the pipeline where extension handlers run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HookPoint {
    BeforeInitialClearTempDirectory,
    AfterInitialClearTempDirectory,
    BeforeCreateTempDirectory,
    AfterCreateTempDirectory,
    BeforeDownloadFromS3,
    AfterDownloadFromS3,
    BeforeBuildSatisRepository,
    AfterBuildSatisRepository,
    BeforeUploadToS3,
    AfterUploadToS3,
    BeforeRemoveMissingFilesFromS3,
    AfterRemoveMissingFilesFromS3,
    BeforeFinalClearTempDirectory,
    AfterFinalClearTempDirectory,
}

impl fmt::Display for HookPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl HookPoint {
    /// Every hook point, in pipeline order
    pub const ALL: [HookPoint; 14] = [
        Self::BeforeInitialClearTempDirectory,
        Self::AfterInitialClearTempDirectory,
        Self::BeforeCreateTempDirectory,
        Self::AfterCreateTempDirectory,
        Self::BeforeDownloadFromS3,
        Self::AfterDownloadFromS3,
        Self::BeforeBuildSatisRepository,
        Self::AfterBuildSatisRepository,
        Self::BeforeUploadToS3,
        Self::AfterUploadToS3,
        Self::BeforeRemoveMissingFilesFromS3,
        Self::AfterRemoveMissingFilesFromS3,
        Self::BeforeFinalClearTempDirectory,
        Self::AfterFinalClearTempDirectory,
    ];

    /// The hook point's name as used in configuration
    pub fn name(&self) -> &'static str {
        match self {
            Self::BeforeInitialClearTempDirectory => "BEFORE_INITIAL_CLEAR_TEMP_DIRECTORY",
            Self::AfterInitialClearTempDirectory => "AFTER_INITIAL_CLEAR_TEMP_DIRECTORY",
            Self::BeforeCreateTempDirectory => "BEFORE_CREATE_TEMP_DIRECTORY",
            Self::AfterCreateTempDirectory => "AFTER_CREATE_TEMP_DIRECTORY",
            Self::BeforeDownloadFromS3 => "BEFORE_DOWNLOAD_FROM_S3",
            Self::AfterDownloadFromS3 => "AFTER_DOWNLOAD_FROM_S3",
            Self::BeforeBuildSatisRepository => "BEFORE_BUILD_SATIS_REPOSITORY",
            Self::AfterBuildSatisRepository => "AFTER_BUILD_SATIS_REPOSITORY",
            Self::BeforeUploadToS3 => "BEFORE_UPLOAD_TO_S3",
            Self::AfterUploadToS3 => "AFTER_UPLOAD_TO_S3",
            Self::BeforeRemoveMissingFilesFromS3 => "BEFORE_REMOVE_MISSING_FILES_FROM_S3",
            Self::AfterRemoveMissingFilesFromS3 => "AFTER_REMOVE_MISSING_FILES_FROM_S3",
            Self::BeforeFinalClearTempDirectory => "BEFORE_FINAL_CLEAR_TEMP_DIRECTORY",
            Self::AfterFinalClearTempDirectory => "AFTER_FINAL_CLEAR_TEMP_DIRECTORY",
        }
    }
}

/// Pipeline stages, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Remove any staging left over from an earlier run
    InitialClearTempDirectory,
    /// Create the staging area
    CreateTempDirectory,
    /// Mirror the remote store into staging, with placeholders for archives
    DownloadFromS3,
    /// Run the repository generator
    BuildSatisRepository,
    /// Upload changed staging files
    UploadToS3,
    /// Delete remote files that are no longer staged
    RemoveMissingFilesFromS3,
    /// Remove the staging area
    FinalClearTempDirectory,
}

impl Stage {
    pub const ALL: [Stage; 7] = [
        Self::InitialClearTempDirectory,
        Self::CreateTempDirectory,
        Self::DownloadFromS3,
        Self::BuildSatisRepository,
        Self::UploadToS3,
        Self::RemoveMissingFilesFromS3,
        Self::FinalClearTempDirectory,
    ];

    pub fn before(&self) -> HookPoint {
        match self {
            Self::InitialClearTempDirectory => HookPoint::BeforeInitialClearTempDirectory,
            Self::CreateTempDirectory => HookPoint::BeforeCreateTempDirectory,
            Self::DownloadFromS3 => HookPoint::BeforeDownloadFromS3,
            Self::BuildSatisRepository => HookPoint::BeforeBuildSatisRepository,
            Self::UploadToS3 => HookPoint::BeforeUploadToS3,
            Self::RemoveMissingFilesFromS3 => HookPoint::BeforeRemoveMissingFilesFromS3,
            Self::FinalClearTempDirectory => HookPoint::BeforeFinalClearTempDirectory,
        }
    }

    pub fn after(&self) -> HookPoint {
        match self {
            Self::InitialClearTempDirectory => HookPoint::AfterInitialClearTempDirectory,
            Self::CreateTempDirectory => HookPoint::AfterCreateTempDirectory,
            Self::DownloadFromS3 => HookPoint::AfterDownloadFromS3,
            Self::BuildSatisRepository => HookPoint::AfterBuildSatisRepository,
            Self::UploadToS3 => HookPoint::AfterUploadToS3,
            Self::RemoveMissingFilesFromS3 => HookPoint::AfterRemoveMissingFilesFromS3,
            Self::FinalClearTempDirectory => HookPoint::AfterFinalClearTempDirectory,
        }
    }

    /// Human-readable description used in progress output
    pub fn label(&self) -> &'static str {
        match self {
            Self::InitialClearTempDirectory => "initial clear of the temp directory",
            Self::CreateTempDirectory => "creation of the temp directory",
            Self::DownloadFromS3 => "download from S3",
            Self::BuildSatisRepository => "build of the Satis repository",
            Self::UploadToS3 => "upload to S3",
            Self::RemoveMissingFilesFromS3 => "removal of missing files from S3",
            Self::FinalClearTempDirectory => "final clear of the temp directory",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
