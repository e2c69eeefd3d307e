//! Device command handlers.

use tabled::Tabled;

use pbcli_core::{Device, PushClient, resolve_device};

use crate::cli::{DeviceArgs, DeviceCommand, DeviceListArgs, GlobalOpts};
use crate::error::CliError;
use crate::output;

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct DeviceRow {
    #[tabled(rename = "#")]
    index: String,
    #[tabled(rename = "Iden")]
    iden: String,
    #[tabled(rename = "Nickname")]
    nickname: String,
    #[tabled(rename = "Manufacturer")]
    manufacturer: String,
    #[tabled(rename = "Model")]
    model: String,
    #[tabled(rename = "Type")]
    dtype: String,
    #[tabled(rename = "Active")]
    active: bool,
    #[tabled(rename = "Pushable")]
    pushable: bool,
}

#[derive(Tabled)]
struct VerboseDeviceRow {
    #[tabled(inline)]
    base: DeviceRow,
    #[tabled(rename = "Fingerprint")]
    fingerprint: String,
    #[tabled(rename = "Key Fingerprint")]
    key_fingerprint: String,
    #[tabled(rename = "Push Token")]
    push_token: String,
}

fn row(d: &Device) -> DeviceRow {
    DeviceRow {
        index: d.position.map(|p| p.to_string()).unwrap_or_default(),
        iden: d.iden.to_string(),
        nickname: d.nickname.clone().unwrap_or_default(),
        manufacturer: d.manufacturer.clone().unwrap_or_default(),
        model: d.model.clone().unwrap_or_default(),
        dtype: d.device_type.clone().unwrap_or_default(),
        active: d.active,
        pushable: d.pushable,
    }
}

fn verbose_row(d: &Device) -> VerboseDeviceRow {
    VerboseDeviceRow {
        base: row(d),
        fingerprint: d.fingerprint.clone().unwrap_or_default(),
        key_fingerprint: d.key_fingerprint.clone().unwrap_or_default(),
        push_token: d.push_token.clone().unwrap_or_default(),
    }
}

fn iden(d: &Device) -> String {
    d.iden.to_string()
}

/// Drop the fields only verbose listings show.
fn redact(mut d: Device) -> Device {
    d.fingerprint = None;
    d.key_fingerprint = None;
    d.push_token = None;
    d
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    client: &PushClient,
    args: DeviceArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        DeviceCommand::List(list) => list_devices(client, list, global).await,
    }
}

async fn list_devices(
    client: &PushClient,
    args: DeviceListArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let mut devices = client.devices().await?;
    if devices.is_empty() {
        return Err(CliError::NoDevices);
    }

    if let Some(query) = args.device.as_deref().filter(|q| !q.is_empty()) {
        let device = resolve_device(query, &devices)?.clone();
        devices = vec![device];
    }
    if !args.verbose {
        devices = devices.into_iter().map(redact).collect();
    }

    let out = if args.verbose {
        output::render_list(global.output, &devices, verbose_row, iden)
    } else {
        output::render_list(global.output, &devices, row, iden)
    };
    output::print_output(&out, global.quiet);
    Ok(())
}
