//! Catalog Pricer CLI
//!
//! Command-line interface for running a single deal analysis against the
//! bundled calibration data.

use anyhow::Context;
use catalog_pricer::deal::{DealInputs, DealType, DecayMode, EngineConfig, MarketMix};
use catalog_pricer::{DealAnalyzer, RecommendationResult, ViabilityResult};
use clap::{Parser, ValueEnum};
use std::fs::File;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum DealTypeArg {
    Distribution,
    ProfitSplit,
    Royalty,
}

impl From<DealTypeArg> for DealType {
    fn from(arg: DealTypeArg) -> Self {
        match arg {
            DealTypeArg::Distribution => DealType::Distribution,
            DealTypeArg::ProfitSplit => DealType::ProfitSplit,
            DealTypeArg::Royalty => DealType::Royalty,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum DecayModeArg {
    Annual,
    Weekly,
}

impl From<DecayModeArg> for DecayMode {
    fn from(arg: DecayModeArg) -> Self {
        match arg {
            DecayModeArg::Annual => DecayMode::Annual,
            DecayModeArg::Weekly => DecayMode::Weekly,
        }
    }
}

/// Parse a `COUNTRY=SHARE` market argument.
fn parse_market(value: &str) -> Result<(String, f64), String> {
    let (country, share) = value
        .split_once('=')
        .ok_or_else(|| format!("expected COUNTRY=SHARE, got '{}'", value))?;
    let share: f64 = share
        .trim()
        .parse()
        .map_err(|e| format!("bad share in '{}': {}", value, e))?;
    Ok((country.trim().to_string(), share))
}

/// Catalog Pricer - price and evaluate recorded-music catalog deals
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Genre for the decay calibration (aliases like hip-hop, edm accepted)
    #[arg(short, long)]
    genre: String,

    /// Current weekly audio streams across the catalog
    #[arg(long)]
    weekly_audio: f64,

    /// Current weekly video streams across the catalog
    #[arg(long, default_value = "0")]
    weekly_video: f64,

    /// Number of tracks in the catalog
    #[arg(long, default_value = "1")]
    catalog_tracks: u32,

    /// New songs owed in the deal
    #[arg(long, default_value = "0")]
    extra_tracks: u32,

    /// Market share as COUNTRY=SHARE, repeatable (e.g. --market USA=0.5)
    #[arg(long = "market", value_parser = parse_market)]
    markets: Vec<(String, f64)>,

    /// Deal structure
    #[arg(long, value_enum, default_value_t = DealTypeArg::Distribution)]
    deal_type: DealTypeArg,

    /// Deal percent (label share, or artist royalty for royalty deals)
    #[arg(long, default_value = "0.25")]
    deal_percent: f64,

    /// Fraction of total cost paid as advance
    #[arg(long, default_value = "0.70")]
    advance_share: f64,

    /// Treat marketing spend as recoupable
    #[arg(long)]
    marketing_recoupable: bool,

    /// Weeks the catalog is past its streaming peak
    #[arg(long, default_value = "0")]
    weeks_post_peak: u32,

    /// Decay projection mode
    #[arg(long, value_enum, default_value_t = DecayModeArg::Weekly)]
    decay_mode: DecayModeArg,

    /// Evaluate fixed deal terms instead of recommending a cost
    #[arg(long)]
    evaluate: bool,

    /// Advance amount (evaluate mode)
    #[arg(long, default_value = "0")]
    advance: f64,

    /// Marketing/recording spend (evaluate mode)
    #[arg(long, default_value = "0")]
    marketing: f64,

    /// Discount rate for NPV metrics
    #[arg(long, default_value = "0.10")]
    discount_rate: f64,

    /// Rate table CSV (defaults to the bundled file)
    #[arg(long)]
    rates_file: Option<PathBuf>,

    /// Decay calibration CSV (defaults to the bundled file)
    #[arg(long)]
    decay_file: Option<PathBuf>,

    /// Write the full result as JSON to this path
    #[arg(long)]
    output: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args = Args::parse();

    let analyzer = match (&args.rates_file, &args.decay_file) {
        (Some(rates), Some(decay)) => {
            DealAnalyzer::from_csv_paths(rates, decay, EngineConfig::default())?
        }
        (None, None) => DealAnalyzer::from_csv()?,
        _ => anyhow::bail!("--rates-file and --decay-file must be given together"),
    };

    let mut inputs = DealInputs::new(args.genre.clone(), args.weekly_audio, args.weekly_video);
    inputs.catalog_tracks = args.catalog_tracks;
    inputs.extra_tracks = args.extra_tracks;
    inputs.deal_type = args.deal_type.into();
    inputs.deal_percent = args.deal_percent;
    inputs.advance_share = args.advance_share;
    inputs.marketing_recoupable = args.marketing_recoupable;
    inputs.weeks_post_peak = args.weeks_post_peak;
    inputs.decay_mode = args.decay_mode.into();
    inputs.market_mix = args.markets.iter().cloned().collect::<MarketMix>();

    println!("Catalog Pricer v{}", env!("CARGO_PKG_VERSION"));
    println!("======================\n");

    if args.evaluate {
        let result = analyzer.evaluate_deal_viability(
            &inputs,
            args.advance,
            args.marketing,
            args.discount_rate,
        )?;
        print_viability(&result);
        if let Some(path) = &args.output {
            let file = File::create(path)
                .with_context(|| format!("creating {}", path.display()))?;
            serde_json::to_writer_pretty(file, &result)?;
            println!("\nFull result written to: {}", path.display());
        }
    } else {
        let result = analyzer.recommend_deal_cost(&inputs)?;
        print_recommendation(&result);
        if let Some(path) = &args.output {
            let file = File::create(path)
                .with_context(|| format!("creating {}", path.display()))?;
            serde_json::to_writer_pretty(file, &result)?;
            println!("\nFull result written to: {}", path.display());
        }
    }

    Ok(())
}

fn print_recommendation(result: &RecommendationResult) {
    println!("Year 1 Revenue:");
    println!("  Audio: ${:>14.2}", result.year1_audio_revenue);
    println!("  Video: ${:>14.2}", result.year1_video_revenue);
    println!("  Total: ${:>14.2}", result.year1_total_revenue);
    println!(
        "  Blended audio rate: ${:.5}/stream, video rate: ${:.5}/stream",
        result.blended_audio_rate, result.video_rate
    );

    println!("\nMarket Mix:");
    for slice in &result.market_breakdown.markets {
        println!(
            "  {:<24} share {:>5.1}%  rate ${:.5}",
            slice.country,
            slice.share * 100.0,
            slice.audio_rate
        );
    }
    println!(
        "  {:<24} share {:>5.1}%  rate ${:.5}",
        "Rest of world",
        result.market_breakdown.rest_of_world_share * 100.0,
        result.market_breakdown.rest_of_world_rate
    );

    let payback = &result.payback;
    println!(
        "\nPayback Recommendation ({} weeks):",
        payback.horizon_weeks
    );
    println!("  Max cost:  ${:>14.2}", payback.max_total_cost);
    println!("  Advance:   ${:>14.2}", payback.suggested_advance);
    println!("  Marketing: ${:>14.2}", payback.suggested_marketing);
    match payback.implied_irr {
        Some(irr) => println!("  Implied IRR: {:.2}%", irr * 100.0),
        None => println!("  Implied IRR: n/a"),
    }
    match payback.recoup_week {
        Some(week) => println!("  Recoups in week {}", week),
        None => println!("  Never recoups"),
    }

    println!("\nIRR Recommendations:");
    for rec in &result.irr_recommendations {
        println!(
            "  {:>5.1}% target: max cost ${:>14.2}  advance ${:>14.2}  NPV@10% ${:>12.2}",
            rec.target_irr * 100.0,
            rec.max_total_cost,
            rec.suggested_advance,
            rec.npv_at_discount
        );
    }

    println!("\nProjection at the recommended cost:");
    println!(
        "{:>4} {:>8} {:>14} {:>14} {:>14} {:>14}",
        "Year", "Mult", "Gross", "Label In", "Artist Pay", "Disc. Label"
    );
    println!("{}", "-".repeat(74));
    for row in &result.cash_flow {
        println!(
            "{:>4} {:>8.4} {:>14.2} {:>14.2} {:>14.2} {:>14.2}",
            row.year, row.multiplier, row.gross, row.label_in, row.artist_out,
            row.discounted_label_in
        );
    }

    let metrics = &result.label_metrics;
    println!("\nLabel metrics at the recommended cost:");
    println!("  Investment: ${:.2}", metrics.investment);
    println!("  NPV:        ${:.2}", metrics.npv);
    if let Some(irr) = metrics.irr {
        println!("  IRR:        {:.2}%", irr * 100.0);
    }
    if let Some(moic) = metrics.moic {
        println!("  MOIC:       {:.2}x", moic);
    }
    if let Some(year) = metrics.payback_year {
        println!("  Payback:    year {}", year);
    }

    for warning in &result.warnings {
        println!("\nWarning: {}", warning);
    }
}

fn print_viability(result: &ViabilityResult) {
    println!("Deal terms:");
    println!("  Advance:    ${:>14.2}", result.advance);
    println!("  Marketing:  ${:>14.2}", result.marketing);
    println!("  Total:      ${:>14.2}", result.total_investment);
    println!("  Label share of gross: {:.1}%", result.label_share * 100.0);

    println!("\nYear 1 Revenue: ${:.2}", result.year1_total_revenue);

    println!("\nProjection:");
    println!(
        "{:>4} {:>8} {:>14} {:>14} {:>14}",
        "Year", "Mult", "Gross", "Label In", "Artist Pay"
    );
    println!("{}", "-".repeat(60));
    for row in &result.cash_flow {
        println!(
            "{:>4} {:>8.4} {:>14.2} {:>14.2} {:>14.2}",
            row.year, row.multiplier, row.gross, row.label_in, row.artist_out
        );
    }

    let label = &result.label_metrics;
    println!("\nLabel metrics (discount {:.1}%):", result.discount_rate * 100.0);
    println!("  NPV:  ${:.2}", label.npv);
    match label.irr {
        Some(irr) => println!("  IRR:  {:.2}%", irr * 100.0),
        None => println!("  IRR:  n/a"),
    }
    match label.moic {
        Some(moic) => println!("  MOIC: {:.2}x", moic),
        None => println!("  MOIC: n/a"),
    }
    match label.payback_year {
        Some(year) => println!("  Payback year: {}", year),
        None => println!("  Payback year: never"),
    }

    let artist = &result.artist_metrics;
    println!("\nArtist metrics:");
    println!("  NPV incl. advance:   ${:.2}", artist.npv_incl_advance);
    println!("  Total incl. advance: ${:.2}", artist.total_cash_incl_advance);
    match artist.breakeven_year {
        Some(year) => println!("  Royalty breakeven: year {}", year),
        None => println!("  Royalty breakeven: never"),
    }

    for warning in &result.warnings {
        println!("\nWarning: {}", warning);
    }
}
