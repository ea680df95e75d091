use chrono::Local;
use plugwatch_core::{read_all, Event};

use crate::context::Context;

pub fn run(ctx: &Context, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let store = ctx.store()?;
    let events = read_all(&store)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&events)?);
        return Ok(());
    }

    if events.is_empty() {
        println!("No events recorded.");
        return Ok(());
    }

    println!("{:<20} {:<6} {:>10}", "Recorded At", "Status", "Power");
    println!("{}", "-".repeat(38));
    for event in &events {
        println!("{}", format_event(event));
    }
    Ok(())
}

fn format_event(event: &Event) -> String {
    let watts = match event.power_watts {
        Some(w) => format!("{w:.1} W"),
        None => "-".to_string(),
    };
    format!(
        "{:<20} {:<6} {:>10}",
        event.timestamp.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string(),
        event.status,
        watts
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use plugwatch_core::Status;

    #[test]
    fn missing_wattage_renders_dash() {
        let event = Event {
            timestamp: Utc::now(),
            status: Status::Off,
            power_watts: None,
        };
        assert!(format_event(&event).trim_end().ends_with('-'));

        let event = Event {
            power_watts: Some(12.34),
            ..event
        };
        assert!(format_event(&event).ends_with("12.3 W"));
    }
}
