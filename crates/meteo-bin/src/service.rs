//! systemd service lifecycle management. Out of scope for this crate: the
//! original station installs/starts/stops a unit file directly. These
//! handlers preserve the CLI shape without reimplementing that surface.

use crate::cli::ServiceAction;
use anyhow::Result;

pub fn run(action: ServiceAction) -> Result<()> {
    anyhow::bail!(
        "service {action:?} is not implemented on this platform; this build only supports 'run'"
    )
}

impl std::fmt::Debug for ServiceAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ServiceAction::Install => "install",
            ServiceAction::Start => "start",
            ServiceAction::Stop => "stop",
            ServiceAction::IsRunning => "is-running",
            ServiceAction::IsInstalled => "is-installed",
        };
        write!(f, "{name}")
    }
}
