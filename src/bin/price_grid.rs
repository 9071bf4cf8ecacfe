//! Price a grid of deal structures for one catalog
//!
//! Runs every deal-type / deal-percent combination in parallel and prints
//! the recommended costs side by side, for quick structure comparisons.

use anyhow::Context;
use catalog_pricer::deal::{DealInputs, DealType, MarketMix};
use catalog_pricer::DealAnalyzer;
use clap::Parser;
use rayon::prelude::*;
use std::time::Instant;

/// Price a grid of deal structures for one catalog
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Genre for the decay calibration
    #[arg(short, long)]
    genre: String,

    /// Current weekly audio streams
    #[arg(long)]
    weekly_audio: f64,

    /// Current weekly video streams
    #[arg(long, default_value = "0")]
    weekly_video: f64,

    /// Number of tracks in the catalog
    #[arg(long, default_value = "1")]
    catalog_tracks: u32,

    /// Weeks the catalog is past its streaming peak
    #[arg(long, default_value = "0")]
    weeks_post_peak: u32,

    /// Deal percents to sweep
    #[arg(long, value_delimiter = ',', default_value = "0.15,0.20,0.25,0.30,0.50")]
    percents: Vec<f64>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args = Args::parse();
    let analyzer = DealAnalyzer::from_csv().context("loading bundled calibration data")?;

    let mut mix = MarketMix::new();
    mix.insert("USA".to_string(), 0.50);
    mix.insert("UK".to_string(), 0.10);

    let deal_types = [DealType::Distribution, DealType::ProfitSplit, DealType::Royalty];
    let grid: Vec<(DealType, f64)> = deal_types
        .iter()
        .flat_map(|deal_type| args.percents.iter().map(move |pct| (*deal_type, *pct)))
        .collect();

    println!("Pricing {} structures...", grid.len());
    let start = Instant::now();

    let results: Vec<_> = grid
        .par_iter()
        .map(|(deal_type, percent)| {
            let mut inputs =
                DealInputs::new(args.genre.clone(), args.weekly_audio, args.weekly_video);
            inputs.catalog_tracks = args.catalog_tracks;
            inputs.weeks_post_peak = args.weeks_post_peak;
            inputs.deal_type = *deal_type;
            inputs.deal_percent = *percent;
            inputs.market_mix = mix.clone();

            let result = analyzer.recommend_deal_cost(&inputs);
            (*deal_type, *percent, result)
        })
        .collect();

    println!("Grid complete in {:?}\n", start.elapsed());

    println!(
        "{:<14} {:>8} {:>14} {:>14} {:>14} {:>10}",
        "Deal Type", "Percent", "Payback Max", "10% IRR Max", "15% IRR Max", "Recoup Wk"
    );
    println!("{}", "-".repeat(80));

    for (deal_type, percent, result) in &results {
        match result {
            Ok(result) => {
                let irr_10 = result
                    .irr_recommendations
                    .first()
                    .map(|r| r.max_total_cost)
                    .unwrap_or(0.0);
                let irr_15 = result
                    .irr_recommendations
                    .last()
                    .map(|r| r.max_total_cost)
                    .unwrap_or(0.0);
                let recoup = result
                    .payback
                    .recoup_week
                    .map(|w| w.to_string())
                    .unwrap_or_else(|| "-".to_string());
                println!(
                    "{:<14} {:>7.1}% {:>14.2} {:>14.2} {:>14.2} {:>10}",
                    format!("{:?}", deal_type),
                    percent * 100.0,
                    result.payback.max_total_cost,
                    irr_10,
                    irr_15,
                    recoup
                );
            }
            Err(e) => {
                println!("{:<14} {:>7.1}% error: {}", format!("{:?}", deal_type), percent * 100.0, e);
            }
        }
    }

    Ok(())
}
