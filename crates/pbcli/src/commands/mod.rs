//! Command dispatch: bridges CLI args -> core client -> output formatting.

pub mod config_cmd;
pub mod devices;
pub mod listen;
pub mod push;

use pbcli_core::PushClient;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a service-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    client: &PushClient,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Device(args) => devices::handle(client, args, global).await,
        Command::Push(args) => push::handle(client, args, global).await,
        Command::Listen => listen::handle(client, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => Ok(()),
    }
}
