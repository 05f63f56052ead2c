use clap::Parser;
use std::io::{self, Write};
use trip_crawler::intrepid::TripData;

/// Print stored trips, one JSON object per line.
#[derive(Debug, Parser)]
struct Args {
    #[arg(long, default_value = "intrepid")]
    name: String,
}

async fn export(name: &str) -> Result<usize, Box<dyn std::error::Error>> {
    let data = TripData::existing(name).await?;
    let results = data.results_get().await?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    for (_, record) in &results {
        writeln!(out, "{}", record)?;
    }
    Ok(results.len())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let exported = export(&args.name).await?;
    eprintln!("Exported {} trips", exported);
    Ok(())
}
