//! The host (renderer) contract (§6.1).
//!
//! The core asks the host to adopt native selection and to show/hide
//! placeholder text; it hands back an opaque handle for decorator view
//! mounting. `text_storage` itself isn't part of this trait: the
//! `AttributedStore` the core writes into is owned by the `Editor` and
//! shared with the host by reference, the way the spec's "host object"
//! exposes its `text_storage` field directly rather than through a method.

use crate::decorator::{DecoratorDiff, DecoratorViewHandle};
use crate::reconcile::NativeRange;

/// Implemented by the platform-rendering layer that owns the native
/// rich-text widget (§6.1). All methods are synchronous notifications; the
/// host is free to defer actual view work (e.g. decorator mounting) to its
/// own next tick, per §5 "Suspension points".
pub trait Host {
    /// Adopt a new caret/range in the native widget.
    fn update_native_selection(&mut self, range: NativeRange);

    /// Clear the native selection entirely.
    fn reset_selected_range(&mut self);

    /// Called when the root's text content becomes empty, so the host can
    /// show its placeholder.
    fn show_placeholder_text(&mut self, show: bool);

    /// Notifies the host of decorators that need a view created or torn
    /// down since the last commit (§4.8 step 9). The core does not await a
    /// response; the host drains this asynchronously.
    fn reconcile_decorators(&mut self, diff: &DecoratorDiff);
}

/// A `Host` that discards every notification, for headless operation and
/// tests (§4.8 "Headless mode").
#[derive(Default)]
pub struct NullHost;

impl Host for NullHost {
    fn update_native_selection(&mut self, _range: NativeRange) {}
    fn reset_selected_range(&mut self) {}
    fn show_placeholder_text(&mut self, _show: bool) {}
    fn reconcile_decorators(&mut self, _diff: &DecoratorDiff) {}
}

/// Handle the core passes back in decorator notifications, re-exported at
/// this module's surface since it's part of the host contract
/// (§6.1 "view_for_decorator_subviews").
pub type ViewHandle = DecoratorViewHandle;
