//! Command dispatch: bridges CLI args -> dashboard intents -> output formatting.

pub mod alerts;
pub mod auth;
pub mod config_cmd;
pub mod dashboard;
pub mod devices;
pub mod sensors;
pub mod util;

use smartdash_core::Dashboard;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a backend-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    dashboard: &Dashboard,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Auth(args) => auth::handle(dashboard, args, global).await,
        Command::Devices(args) => devices::handle(dashboard, args, global).await,
        Command::Sensors(args) => sensors::handle(dashboard, args, global).await,
        Command::Alerts(args) => alerts::handle(dashboard, args, global).await,
        Command::Dashboard(args) => dashboard::handle(dashboard, args, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => Err(CliError::Internal(
            "config and completions do not reach the backend".into(),
        )),
    }
}
