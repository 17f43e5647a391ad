//! Hooks supplied by the screen that owns the content.

/// Error reported by a finished load. Its shape belongs to the caller.
pub type LoadError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// What the controller asks of the screen it manages.
#[cfg_attr(test, mockall::automock)]
pub trait ContentProvider {
    /// Whether the content view currently has something to show.
    ///
    /// Queried every time a placeholder decision is made.
    fn has_content(&self) -> bool;

    /// A load failed but content is still on screen.
    ///
    /// The placeholder stays hidden; this is the place for a non-blocking
    /// notice such as a banner or toast.
    fn on_error_with_content_available(&self, error: &LoadError);
}

type HasContentFn = Box<dyn Fn() -> bool + Send>;
type OnErrorFn = Box<dyn Fn(&LoadError) + Send>;

/// A [`ContentProvider`] built from two closures.
pub struct ContentHooks {
    has_content: HasContentFn,
    on_error: OnErrorFn,
}

impl ContentHooks {
    pub fn new(
        has_content: impl Fn() -> bool + Send + 'static,
        on_error: impl Fn(&LoadError) + Send + 'static,
    ) -> Self {
        Self {
            has_content: Box::new(has_content),
            on_error: Box::new(on_error),
        }
    }

    /// Hooks that only answer the content question and log errors.
    pub fn content(has_content: impl Fn() -> bool + Send + 'static) -> Self {
        Self::new(has_content, |error| {
            tracing::warn!("Load failed with content available: {}", error);
        })
    }
}

impl ContentProvider for ContentHooks {
    fn has_content(&self) -> bool {
        (self.has_content)()
    }

    fn on_error_with_content_available(&self, error: &LoadError) {
        (self.on_error)(error)
    }
}
