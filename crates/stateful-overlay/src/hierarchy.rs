//! The seam between the state machine and a host view system.

use std::fmt;

/// Mutations the state machine performs on the host's view tree.
///
/// Implementations own the actual views; the machine only holds handles.
/// Every method is called from the thread that owns the machine.
pub trait ViewHierarchy {
    /// Handle to a displayable surface.
    type View: Clone + PartialEq + fmt::Debug;

    /// Insert `overlay` directly above `base`, covering its bounds.
    ///
    /// If `overlay` is already attached it is moved to the top.
    fn attach_above(&mut self, base: &Self::View, overlay: &Self::View);

    /// Remove `view` from the tree. No-op if it is not attached.
    fn detach(&mut self, view: &Self::View);

    /// Check if `view` is currently in the tree.
    fn is_attached(&self, view: &Self::View) -> bool;

    /// Set the opacity of `view`, `0.0` (invisible) to `1.0` (opaque).
    fn set_opacity(&mut self, view: &Self::View, opacity: f32);
}
