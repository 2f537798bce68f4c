//! Progress printing for download commands.

use scandl_core::ProgressEvent;
use std::io::Write;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

const CHANNEL_CAPACITY: usize = 64;

/// Spawn a task that prints every event received on the returned sender.
/// The task ends once all senders are dropped.
pub(crate) fn spawn_printer(json: bool) -> (mpsc::Sender<ProgressEvent>, JoinHandle<()>) {
    let (tx, mut rx) = mpsc::channel::<ProgressEvent>(CHANNEL_CAPACITY);
    let handle = tokio::spawn(async move {
        let mut printed = false;
        while let Some(event) = rx.recv().await {
            if json {
                println!("{}", progress_json(&event));
            } else {
                print!("\r  {}", progress_line(&event));
                let _ = std::io::stdout().flush();
                printed = true;
            }
        }
        if printed {
            println!();
        }
    });
    (tx, handle)
}

/// Wait for the printer task. A printer that panicked only loses output.
pub(crate) async fn finish_printer(printer: JoinHandle<()>) {
    if let Err(e) = printer.await {
        tracing::debug!("progress printer ended abnormally: {}", e);
    }
}

pub(crate) fn progress_json(event: &ProgressEvent) -> serde_json::Value {
    serde_json::json!({
        "type": "volume_download_progress",
        "progress": event,
    })
}

pub(crate) fn progress_line(event: &ProgressEvent) -> String {
    let pct = if event.total == 0 {
        100.0
    } else {
        event.current as f64 * 100.0 / event.total as f64
    };
    format!("{} / {} images ({:.0}%)  ", event.current, event.total, pct)
}
