//! Removal of `source` links from every version record

use mirror_meta::Rewrite;

use crate::extensions::{ExtensionDescriptor, HookContext, HookOutcome};
use crate::hooks::HookPoint;
use crate::Result;

pub const KEY: &str = "strip-sources-links";

pub fn descriptor() -> ExtensionDescriptor {
    ExtensionDescriptor::builder::<StripSourcesLinks>("Strip Sources Links", KEY)
        .hook(HookPoint::AfterBuildSatisRepository, "strip", StripSourcesLinks::strip)
        .build()
}

#[derive(Debug, Default)]
pub struct StripSourcesLinks;

impl StripSourcesLinks {
    fn strip(&mut self, ctx: &mut HookContext<'_>) -> Result<HookOutcome> {
        ctx.transformer().for_each_version(|version, _package, _file| {
            if let Some(record) = version.as_object_mut() {
                record.shift_remove("source");
            }
            Rewrite::Keep
        })?;
        Ok(HookOutcome::Continue)
    }
}
