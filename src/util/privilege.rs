//! Effective-uid checks for operations that modify the system.

use nix::unistd::Uid;

/// Source of the ambient privilege level.
///
/// The pipeline takes this as a trait object so tests can substitute a
/// fixed answer for the euid check.
pub trait PrivilegeGuard {
    /// Whether the running principal may modify the system.
    fn is_elevated(&self) -> bool;

    /// Effective uid, for error messages.
    fn euid(&self) -> u32;
}

/// The real check against the process effective uid.
#[derive(Debug, Clone, Copy, Default)]
pub struct EuidGuard;

impl PrivilegeGuard for EuidGuard {
    fn is_elevated(&self) -> bool {
        Uid::effective().is_root()
    }

    fn euid(&self) -> u32 {
        Uid::effective().as_raw()
    }
}
