//! Pausing the run at selected hooks
//!
//! `pause=BEFORE_UPLOAD_TO_S3` waits for the operator before the upload, so
//! the staged repository can be inspected.

use crate::extensions::{ExtensionDescriptor, HookContext, HookOutcome};
use crate::hooks::HookPoint;
use crate::Result;

pub const KEY: &str = "pause-at-hook";

pub fn descriptor() -> ExtensionDescriptor {
    ExtensionDescriptor::builder::<PauseAtHook>("Pause At Hook", KEY)
        .hooks(HookPoint::ALL, "pause", PauseAtHook::pause)
        .build()
}

#[derive(Debug, Default)]
pub struct PauseAtHook;

impl PauseAtHook {
    fn pause(&mut self, ctx: &mut HookContext<'_>) -> Result<HookOutcome> {
        let hook = ctx.hook.name();
        if ctx.config.get_strings("pause").iter().any(|name| name == hook) {
            tracing::warn!("Paused at hook {hook}.");
            ctx.env
                .prompter
                .wait_for_confirmation("Press enter to continue...")?;
        }
        Ok(HookOutcome::Continue)
    }
}
