use chrono::{DateTime, Duration, Local, TimeZone, Utc};
use plugwatch_core::{aggregate, read_all, StatusRange};

use crate::context::Context;

pub fn run(ctx: &Context, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let store = ctx.store()?;
    let events = read_all(&store)?;

    if json {
        let ranges: Vec<StatusRange> = aggregate(&events).collect();
        println!("{}", serde_json::to_string_pretty(&ranges)?);
        return Ok(());
    }

    if events.is_empty() {
        println!("No history found.");
        return Ok(());
    }

    let now = Utc::now();
    println!("{:<40} {:<8} {:<6}", "Time Range", "Duration", "Status");
    println!("{}", "-".repeat(56));
    let rows: Vec<String> = aggregate(&events).map(|r| format_row(&r, now, &Local)).collect();
    for row in rows.iter().rev() {
        println!("{row}");
    }
    Ok(())
}

/// `HH:MM`, hours unbounded.
pub fn format_duration(d: Duration) -> String {
    let minutes = d.num_minutes().max(0);
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}

/// Start and end in `tz`; the end drops its date when both fall on the same day.
pub fn format_time_range<Tz: TimeZone>(range: &StatusRange, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let start = range.start.with_timezone(tz);
    let end = match range.end {
        None => return format!("{} - now", start.format("%Y-%m-%d %H:%M")),
        Some(end) => end.with_timezone(tz),
    };
    if start.date_naive() == end.date_naive() {
        format!("{} - {}", start.format("%Y-%m-%d %H:%M"), end.format("%H:%M"))
    } else {
        format!(
            "{} - {}",
            start.format("%Y-%m-%d %H:%M"),
            end.format("%Y-%m-%d %H:%M")
        )
    }
}

pub fn format_row<Tz: TimeZone>(range: &StatusRange, now: DateTime<Utc>, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!(
        "{:<40} {:<8} {:<6}",
        format_time_range(range, tz),
        format_duration(range.duration(now)),
        range.status
    )
}
