//! Command dispatch: bridges CLI args -> collection controllers -> output.

pub mod collection;
pub mod config_cmd;
pub mod predictions;
pub mod transactions;
pub mod users;
pub mod util;

use adminly_core::{Backend, CollectionController, Gateway};
use serde::de::DeserializeOwned;

use crate::cli::{CollectionCommand, Command, GlobalOpts};
use crate::error::CliError;

use self::collection::Presenter;

/// Dispatch a backend-bound command to the matching collection.
pub async fn dispatch(cmd: Command, backend: &Backend, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Users(args) => run(&backend.users(), args.command, global).await,
        Command::Transactions(args) => run(&backend.transactions(), args.command, global).await,
        Command::Predictions(args) => run(&backend.predictions(), args.command, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => unreachable!(),
    }
}

async fn run<R, G>(
    controller: &CollectionController<R, G>,
    cmd: CollectionCommand,
    global: &GlobalOpts,
) -> Result<(), CliError>
where
    R: Presenter,
    R::Draft: DeserializeOwned,
    G: Gateway<R>,
{
    let result = collection::handle(controller, cmd, global).await;
    controller.dispose();
    result
}
