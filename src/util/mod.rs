//! Shared utilities

pub mod detect;
pub mod fs;
pub mod hash;
pub mod privilege;
pub mod process;
pub mod proxy;
pub mod shell;

pub use privilege::{EuidGuard, PrivilegeGuard};
pub use process::{ExecError, ProcessBuilder};
pub use proxy::{with_proxy, ProxyScope, ProxySettings};
pub use shell::{Shell, Status};
