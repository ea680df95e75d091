use plugwatch_core::{DeviceInfo, PlugSnapshot};

use crate::context::{block_on, Context};

pub fn run(ctx: &Context) -> Result<(), Box<dyn std::error::Error>> {
    let client = ctx.client()?;
    let (info, snapshot) = block_on(async {
        let info = client.device_info().await?;
        let snapshot = client.snapshot().await?;
        Ok::<_, plugwatch_core::CoreError>((info, snapshot))
    })??;

    print!("{}", render(&info, &snapshot));
    Ok(())
}

fn on_off(flag: Option<bool>) -> &'static str {
    match flag {
        Some(true) => "On",
        Some(false) => "Off",
        None => "unknown",
    }
}

fn render(info: &DeviceInfo, snap: &PlugSnapshot) -> String {
    let mut out = String::new();
    out.push_str(&format!("Device:        {} ({})\n", info.name, info.product_name));
    out.push_str(&format!(
        "Online:        {}\n",
        if info.online { "yes" } else { "no" }
    ));
    out.push_str(&format!("Power:         {}\n", on_off(snap.power_on)));
    out.push_str(&format!("Countdown:     {} s\n", snap.countdown_s));
    out.push_str(&format!("Voltage:       {:.1} V\n", snap.voltage_v));
    out.push_str(&format!("Current:       {:.3} A\n", snap.current_a));
    match snap.power_w {
        Some(w) => out.push_str(&format!("Power Usage:   {w:.1} W\n")),
        None => out.push_str("Power Usage:   n/a\n"),
    }
    out.push_str(&format!("Energy Used:   {} Wh\n", snap.energy_wh));
    out.push_str(&format!("Relay Status:  {}\n", snap.relay_status));
    out.push_str(&format!("Fault Code:    {}\n", snap.fault_code));
    out
}
