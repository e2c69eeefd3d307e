//! `pb listen`: print live events until Ctrl-C.

use std::io::{self, Write};

use chrono::Local;
use owo_colors::OwoColorize;
use tokio_util::sync::CancellationToken;

use pbcli_core::{Dispatcher, Event, EventKind, EventSink, PushClient, StreamError, Summary};

use crate::cli::{GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::output;

const TIMESTAMP_FORMAT: &str = "%Y/%m/%d %H:%M:%S";

pub async fn handle(client: &PushClient, global: &GlobalOpts) -> Result<(), CliError> {
    let cancel = CancellationToken::new();
    let (subscription, listener) = client.listen(cancel.clone())?;

    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("interrupt received, shutting down");
        }
        on_signal.cancel();
    });

    let sink = ConsoleSink {
        format: global.output,
        color: output::should_color(global.color),
        quiet: global.quiet,
    };
    let stats = Dispatcher::new(sink).run(subscription, cancel).await;
    let _ = listener.await;

    tracing::debug!(
        pushes = stats.pushes,
        ephemerals = stats.ephemerals,
        device_updates = stats.device_updates,
        stream_errors = stats.stream_errors,
        "listen session ended"
    );
    Ok(())
}

// ── Console sink ────────────────────────────────────────────────────

/// Writes each event to stdout as it is dispatched.
struct ConsoleSink {
    format: OutputFormat,
    color: bool,
    quiet: bool,
}

impl ConsoleSink {
    fn structured(&self, event: &Event) -> Option<String> {
        match self.format {
            OutputFormat::Json | OutputFormat::JsonCompact => {
                Some(output::render_json_compact(event))
            }
            OutputFormat::Yaml => Some(format!("---\n{}", output::render_yaml(event))),
            OutputFormat::Table | OutputFormat::Plain => None,
        }
    }

    fn headline(&self, kind: EventKind, text: &str) -> String {
        if !self.color {
            return text.to_owned();
        }
        match kind {
            EventKind::Push => text.bold().to_string(),
            EventKind::Ephemeral => text.cyan().to_string(),
            EventKind::DeviceUpdate => text.yellow().to_string(),
            EventKind::StreamError => text.red().to_string(),
        }
    }
}

impl EventSink for ConsoleSink {
    fn on_event(&mut self, event: &Event, summary: &Summary) {
        if self.quiet {
            return;
        }
        let mut stdout = io::stdout().lock();

        if let Some(doc) = self.structured(event) {
            let _ = writeln!(stdout, "{doc}");
            return;
        }

        let stamp = Local::now().format(TIMESTAMP_FORMAT);
        let headline = self.headline(event.kind(), &summary.headline);
        let _ = writeln!(stdout, "{stamp} {headline}");
        for line in &summary.details {
            let _ = writeln!(stdout, "{line}");
        }
    }

    fn on_stream_error(&mut self, error: &StreamError) {
        if !error.transient {
            tracing::warn!(error = %error, "stream reported a non-transient error, still listening");
        }
    }
}
