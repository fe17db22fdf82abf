use std::fs;
use std::path::Path;

use anyhow::Result;
use clap::Parser;
use serde_json::json;

use pix_payload::services::pix;
use pix_payload::settings::Settings;
use pix_payload::EncodedPayload;

#[derive(Parser)]
#[command(version, about = "Encode a static PIX BR Code payload.", long_about = None)]
struct Args {
    #[arg(short, long, default_value = "pix.toml")]
    config: String,
    #[arg(long, default_value = "log4rs.yaml")]
    log4rs: String,
    #[arg(short, long, allow_negative_numbers = true)]
    amount: f64,
    #[arg(short, long)]
    reference: Option<String>,
    /// Print the payload and its decoded fields as JSON.
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args.log4rs)?;

    let settings = Settings::new(&args.config)?;
    let spec = settings.merchant.charge_spec(args.amount, args.reference);
    log::debug!(
        "Encoding charge of {} for key type {:?}",
        spec.amount,
        spec.receiving_key_type
    );

    let encoded = pix::encode(&spec)?;
    log::info!("Encoded payload with checksum {}", encoded.checksum());

    println!("{}", render(&encoded, args.json)?);

    Ok(())
}

fn render(encoded: &EncodedPayload, as_json: bool) -> Result<String> {
    if !as_json {
        return Ok(encoded.to_string());
    }

    let decoded = pix::decode(&encoded.payload)?;
    let output = json!({
        "payload": encoded.payload,
        "fields": decoded.fields,
    });

    Ok(serde_json::to_string_pretty(&output)?)
}

fn init_logging(path: &str) -> Result<(), anyhow::Error> {
    if !Path::new("logs").exists() {
        fs::create_dir("logs")?;
    }

    log4rs::init_file(path, Default::default())
        .map_err(|e| anyhow::anyhow!("Could not initialize logging: {}", e))
}
