//! Push command handlers.

use url::Url;

use pbcli_core::{Iden, Push, PushClient, PushDraft};

use crate::cli::{GlobalOpts, LinkArgs, NoteArgs, PushArgs, PushCommand};
use crate::error::CliError;
use crate::output;

pub async fn handle(client: &PushClient, args: PushArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let push = match args.command {
        PushCommand::Note(note) => send_note(client, note).await?,
        PushCommand::Link(link) => send_link(client, link).await?,
    };

    let out = output::render_single(
        global.output,
        &push,
        |_| "Success!".into(),
        |p: &Push| p.iden.to_string(),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}

async fn send_note(client: &PushClient, args: NoteArgs) -> Result<Push, CliError> {
    let target = target(client, args.device.as_deref()).await?;
    let draft = PushDraft {
        title: args.title,
        body: args.message,
    };
    Ok(client.push_note(target.as_ref(), draft).await?)
}

async fn send_link(client: &PushClient, args: LinkArgs) -> Result<Push, CliError> {
    Url::parse(&args.url).map_err(|e| CliError::Validation {
        field: "url".into(),
        reason: e.to_string(),
    })?;

    let target = target(client, args.device.as_deref()).await?;
    let draft = PushDraft {
        title: args.title,
        body: args.message,
    };
    Ok(client.push_link(target.as_ref(), args.url, draft).await?)
}

/// Resolve `-d`; no target (or an empty one) pushes to every device.
async fn target(client: &PushClient, device: Option<&str>) -> Result<Option<Iden>, CliError> {
    match device.filter(|d| !d.is_empty()) {
        None => Ok(None),
        Some(query) => Ok(Some(client.resolve_device(query).await?.iden)),
    }
}
