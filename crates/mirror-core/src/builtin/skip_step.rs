//! Skipping stages by hook name
//!
//! `skip=[BEFORE_UPLOAD_TO_S3,BEFORE_REMOVE_MISSING_FILES_FROM_S3]` vetoes
//! the stages those hooks bracket.

use crate::extensions::{ExtensionDescriptor, HookContext, HookOutcome};
use crate::hooks::Stage;
use crate::Result;

pub const KEY: &str = "skip-step-after-hook";

pub fn descriptor() -> ExtensionDescriptor {
    ExtensionDescriptor::builder::<SkipStep>("Skip Step After Hook", KEY)
        .hooks(Stage::ALL.map(|stage| stage.before()), "skip", SkipStep::skip)
        .build()
}

#[derive(Debug, Default)]
pub struct SkipStep;

impl SkipStep {
    fn skip(&mut self, ctx: &mut HookContext<'_>) -> Result<HookOutcome> {
        let listed = ctx
            .config
            .get_strings("skip")
            .iter()
            .any(|name| name == ctx.hook.name());
        Ok(if listed { HookOutcome::Skip } else { HookOutcome::Continue })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtin::test_support::Harness;
    use mirror_extensions::PluginConfig;
    use serde_json::json;

    #[test]
    fn test_listed_hooks_are_vetoed() {
        let mut harness = Harness::new(&json!({}));
        let settings = PluginConfig::from_value(&json!({"skip": ["BEFORE_UPLOAD_TO_S3"]}));

        for stage in Stage::ALL {
            let hook = stage.before();
            let outcome = SkipStep.skip(&mut harness.context(hook, &settings)).unwrap();
            let expected = if hook == HookPoint::BeforeUploadToS3 {
                HookOutcome::Skip
            } else {
                HookOutcome::Continue
            };
            assert_eq!(outcome, expected, "unexpected outcome at {hook}");
        }
    }

    #[test]
    fn test_handles_every_before_hook_only() {
        let descriptor = descriptor();
        for hook in HookPoint::ALL {
            let is_before = Stage::ALL.iter().any(|stage| stage.before() == hook);
            assert_eq!(descriptor.handles(hook), is_before);
        }
    }
}
