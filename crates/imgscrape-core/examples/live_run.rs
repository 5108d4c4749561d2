//! Downloads a handful of images with real credentials.
//!
//! IMGSCRAPE_API_KEY=... IMGSCRAPE_ENGINE_ID=... cargo run --example live_run -- "red panda" 3

use imgscrape_core::{Credentials, ScrapeController};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = std::env::args().skip(1);
    let query = args.next().unwrap_or_else(|| "red panda".to_string());
    let count: u32 = args.next().map(|n| n.parse::<u32>()).transpose()?.unwrap_or(3);

    let credentials = Credentials::new(
        std::env::var("IMGSCRAPE_API_KEY")?,
        std::env::var("IMGSCRAPE_ENGINE_ID")?,
    );

    let mut controller = ScrapeController::with_output_dir("live-run-output")?;
    controller.set_progress(|p| println!("  {}/{} -> {}", p.ordinal, p.total_requested, p.path.display()));

    println!("Searching '{}' for {} images...\n", query, count);
    let report = controller.start(&query, count, &credentials).await?;

    println!(
        "\n{:?}: {} of {} images, next start index {}",
        report.status,
        report.state.total_downloaded,
        report.state.total_requested,
        report.state.next_start_index
    );

    Ok(())
}
