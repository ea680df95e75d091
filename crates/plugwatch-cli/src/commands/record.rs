use plugwatch_core::{record_from, RecordOutcome, Recorder};

use crate::context::{block_on, Context};

/// Poll once and append a status change if there is one.
///
/// Meant to run from cron. A failed poll is not retried here; the next
/// scheduled run is the retry.
pub fn run(ctx: &Context, threshold: Option<f64>) -> Result<(), Box<dyn std::error::Error>> {
    let classifier = ctx.classifier(threshold)?;
    let client = ctx.client()?;
    let recorder = Recorder::new(ctx.store()?, classifier);

    let outcome = block_on(record_from(&client, &recorder))??;
    if let RecordOutcome::Skipped { last, .. } = &outcome {
        tracing::debug!(status = %last.status, "no state change since last event");
    }
    Ok(())
}
