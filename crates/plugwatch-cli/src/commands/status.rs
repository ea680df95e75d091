use plugwatch_core::SampleSource;

use crate::context::{block_on, Context};

pub fn run(ctx: &Context, threshold: Option<f64>) -> Result<(), Box<dyn std::error::Error>> {
    let classifier = ctx.classifier(threshold)?;
    let client = ctx.client()?;
    let reading = block_on(client.fetch_reading())??;

    let plug = classifier.plug_state(&reading)?;
    let device = classifier.classify(&reading)?;
    println!("Plug:     {plug}");
    println!("Device:   {device}");
    Ok(())
}
