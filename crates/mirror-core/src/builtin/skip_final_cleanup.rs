//! Keeps the staging area after the run

use crate::extensions::{ExtensionDescriptor, HookContext, HookOutcome};
use crate::hooks::HookPoint;
use crate::Result;

pub const KEY: &str = "skip-final-cleanup";

pub fn descriptor() -> ExtensionDescriptor {
    ExtensionDescriptor::builder::<SkipFinalCleanup>("Skip Final Cleanup", KEY)
        .hook(
            HookPoint::BeforeFinalClearTempDirectory,
            "skip",
            SkipFinalCleanup::skip,
        )
        .build()
}

#[derive(Debug, Default)]
pub struct SkipFinalCleanup;

impl SkipFinalCleanup {
    fn skip(&mut self, _ctx: &mut HookContext<'_>) -> Result<HookOutcome> {
        Ok(HookOutcome::Skip)
    }
}
