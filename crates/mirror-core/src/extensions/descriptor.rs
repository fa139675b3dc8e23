//! Extension descriptors
//!
//! A descriptor names an extension, knows how to create an instance of it
//! and maps hook points to the instance methods that handle them:
//!
//! ```ignore
//! ExtensionDescriptor::builder::<CacheExtension>("Cache", "cache")
//!     .hook(HookPoint::BeforeDownloadFromS3, "load_from_cache", CacheExtension::load_from_cache)
//!     .hook(HookPoint::BeforeFinalClearTempDirectory, "save_to_cache", CacheExtension::save_to_cache)
//!     .build()
//! ```

use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::marker::PhantomData;

use super::context::{HookContext, HookOutcome};
use crate::hooks::HookPoint;
use crate::{Error, Result};

/// Signature of an extension method bound to a hook point
pub type Handler<E> = fn(&mut E, &mut HookContext<'_>) -> Result<HookOutcome>;

type ErasedHandler =
    Box<dyn Fn(&mut dyn Any, &mut HookContext<'_>) -> Result<HookOutcome> + Send + Sync>;

/// One method bound to one hook point
pub struct HandlerDescriptor {
    method: &'static str,
    call: ErasedHandler,
}

impl HandlerDescriptor {
    pub fn method(&self) -> &'static str {
        self.method
    }

    /// Invoke the handler on an instance created by the owning descriptor
    pub fn invoke(&self, instance: &mut dyn Any, ctx: &mut HookContext<'_>) -> Result<HookOutcome> {
        (self.call)(instance, ctx)
    }
}

impl fmt::Debug for HandlerDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerDescriptor")
            .field("method", &self.method)
            .finish_non_exhaustive()
    }
}

/// A registered extension
pub struct ExtensionDescriptor {
    name: &'static str,
    key: &'static str,
    factory: fn() -> Box<dyn Any>,
    hooks: BTreeMap<HookPoint, Vec<HandlerDescriptor>>,
}

impl ExtensionDescriptor {
    /// Start describing extension type `E`
    pub fn builder<E: Default + 'static>(name: &'static str, key: &'static str) -> DescriptorBuilder<E> {
        DescriptorBuilder {
            name,
            key,
            hooks: BTreeMap::new(),
            _marker: PhantomData,
        }
    }

    /// Human-readable name
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Key used to enable and configure the extension
    pub fn key(&self) -> &'static str {
        self.key
    }

    pub fn handles(&self, hook: HookPoint) -> bool {
        self.hooks.contains_key(&hook)
    }

    /// Handlers bound to `hook`, in declaration order
    pub fn handlers(&self, hook: HookPoint) -> &[HandlerDescriptor] {
        self.hooks.get(&hook).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Hook points with at least one handler, in pipeline order
    pub fn hook_points(&self) -> impl Iterator<Item = HookPoint> + '_ {
        self.hooks.keys().copied()
    }

    /// Create a fresh instance
    pub fn instantiate(&self) -> Box<dyn Any> {
        (self.factory)()
    }
}

impl fmt::Debug for ExtensionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtensionDescriptor")
            .field("name", &self.name)
            .field("key", &self.key)
            .field("hooks", &self.hooks)
            .finish_non_exhaustive()
    }
}

/// Builder returned by [`ExtensionDescriptor::builder`]
pub struct DescriptorBuilder<E> {
    name: &'static str,
    key: &'static str,
    hooks: BTreeMap<HookPoint, Vec<HandlerDescriptor>>,
    _marker: PhantomData<fn() -> E>,
}

impl<E: Default + 'static> DescriptorBuilder<E> {
    /// Bind `handler` to `hook`. A method may be bound to several hooks.
    pub fn hook(mut self, hook: HookPoint, method: &'static str, handler: Handler<E>) -> Self {
        let key = self.key;
        let call: ErasedHandler = Box::new(move |instance: &mut dyn Any, ctx: &mut HookContext<'_>| {
            let instance = instance.downcast_mut::<E>().ok_or_else(|| {
                Error::extension(key, format!("instance does not match handler {method}"))
            })?;
            handler(instance, ctx)
        });
        self.hooks
            .entry(hook)
            .or_default()
            .push(HandlerDescriptor { method, call });
        self
    }

    /// Bind `handler` to every hook in `hooks`
    pub fn hooks(
        mut self,
        hooks: impl IntoIterator<Item = HookPoint>,
        method: &'static str,
        handler: Handler<E>,
    ) -> Self {
        for hook in hooks {
            self = self.hook(hook, method, handler);
        }
        self
    }

    pub fn build(self) -> ExtensionDescriptor {
        ExtensionDescriptor {
            name: self.name,
            key: self.key,
            factory: create::<E>,
            hooks: self.hooks,
        }
    }
}

fn create<E: Default + 'static>() -> Box<dyn Any> {
    Box::new(E::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Counter {
        calls: usize,
    }

    impl Counter {
        fn count(&mut self, _ctx: &mut HookContext<'_>) -> Result<HookOutcome> {
            self.calls += 1;
            Ok(HookOutcome::Continue)
        }
    }

    fn descriptor() -> ExtensionDescriptor {
        ExtensionDescriptor::builder::<Counter>("Counter", "counter")
            .hook(HookPoint::BeforeUploadToS3, "count", Counter::count)
            .hook(HookPoint::BeforeUploadToS3, "count_again", Counter::count)
            .hooks(
                [HookPoint::AfterBuildSatisRepository, HookPoint::AfterUploadToS3],
                "count",
                Counter::count,
            )
            .build()
    }

    #[test]
    fn test_handlers_keep_declaration_order() {
        let descriptor = descriptor();
        let methods: Vec<_> = descriptor
            .handlers(HookPoint::BeforeUploadToS3)
            .iter()
            .map(HandlerDescriptor::method)
            .collect();
        assert_eq!(methods, vec!["count", "count_again"]);
    }

    #[test]
    fn test_handles_only_bound_hooks() {
        let descriptor = descriptor();
        assert!(descriptor.handles(HookPoint::AfterUploadToS3));
        assert!(!descriptor.handles(HookPoint::BeforeDownloadFromS3));
        assert!(descriptor.handlers(HookPoint::BeforeDownloadFromS3).is_empty());
        assert_eq!(
            descriptor.hook_points().collect::<Vec<_>>(),
            vec![
                HookPoint::AfterBuildSatisRepository,
                HookPoint::BeforeUploadToS3,
                HookPoint::AfterUploadToS3
            ]
        );
    }

    #[test]
    fn test_instantiate_creates_the_extension_type() {
        let descriptor = descriptor();
        let instance = descriptor.instantiate();
        assert!(instance.downcast_ref::<Counter>().is_some());
        assert_eq!(descriptor.key(), "counter");
        assert_eq!(descriptor.name(), "Counter");
    }
}
