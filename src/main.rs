use restream_panel::coders::{assemble_arguments, Coder, Vp9};

fn main() -> anyhow::Result<()> {
    println!("Restream Panel - VP9 profile");
    println!("============================\n");

    // Optional settings as JSON, e.g. '{"fps": "30", "gop": "auto"}'
    let partial = match std::env::args().nth(1) {
        Some(raw) => serde_json::from_str(&raw)?,
        None => serde_json::Value::Null,
    };

    let coder = Vp9;
    let settings = coder.init(&partial);
    let mapping = coder.create_mapping(&settings);

    println!("Settings: {}", serde_json::to_string_pretty(&settings)?);
    println!("Summary:  {}", coder.summarize(&settings));
    println!("Arguments:");
    for (flag, value) in mapping.pairs() {
        println!("  {} {}", flag, value);
    }

    println!("\nffmpeg {}", assemble_arguments(&[mapping]).join(" "));

    Ok(())
}
