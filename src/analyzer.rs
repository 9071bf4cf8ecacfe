//! Deal analysis orchestrator
//!
//! Glues the rate table, decay calibration, cash-flow engine, and valuation
//! solvers into the two public operations: `recommend_deal_cost` and
//! `evaluate_deal_viability`. The analyzer owns the immutable calibration
//! data; every operation is a pure function of its inputs, so a single
//! analyzer can serve concurrent analyses.

use crate::cashflow::{
    artist_payouts, label_inflows, weekly_gross_series, CashFlowEngine, YearlyCashFlow,
};
use crate::deal::{DealInputs, DealType, DecayMode, EngineConfig};
use crate::decay::{
    project_shifted, project_tracks, CalibrationTable, LevelCurve, PROJECTION_YEARS,
};
use crate::error::{EngineError, Result};
use crate::rates::{MarketBreakdown, RateTable};
use crate::valuation::{
    artist_metrics, label_metrics, recommend_irr, recommend_payback, ArtistMetrics,
    IrrRecommendation, LabelMetrics, PaybackRecommendation,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::OnceLock;

/// Result of `recommend_deal_cost`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationResult {
    pub year1_audio_revenue: f64,
    pub year1_video_revenue: f64,
    pub year1_total_revenue: f64,
    pub blended_audio_rate: f64,
    pub video_rate: f64,
    /// Per-country composition of the blended audio rate
    pub market_breakdown: MarketBreakdown,
    /// Max cost recoupable within the payback horizon
    pub payback: PaybackRecommendation,
    /// Max cost per target IRR, ascending by target
    pub irr_recommendations: Vec<IrrRecommendation>,
    /// Projection rows at the highest-target IRR cost, recoupment applied
    pub cash_flow: Vec<YearlyCashFlow>,
    /// Label valuation at the highest-target IRR cost
    pub label_metrics: LabelMetrics,
    /// Non-fatal degradations encountered during the analysis
    pub warnings: Vec<String>,
}

/// Result of `evaluate_deal_viability`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViabilityResult {
    pub total_investment: f64,
    pub advance: f64,
    pub marketing: f64,
    pub discount_rate: f64,
    /// Label's base share of gross implied by the deal terms
    pub label_share: f64,
    pub year1_audio_revenue: f64,
    pub year1_video_revenue: f64,
    pub year1_total_revenue: f64,
    pub blended_audio_rate: f64,
    pub video_rate: f64,
    pub cash_flow: Vec<YearlyCashFlow>,
    pub label_metrics: LabelMetrics,
    pub artist_metrics: ArtistMetrics,
    pub warnings: Vec<String>,
}

/// Ten-year revenue basis shared by both operations
struct ProjectionBasis {
    year1_audio: f64,
    year1_video: f64,
    year1_total: f64,
    multipliers: [f64; PROJECTION_YEARS],
    blended_audio_rate: f64,
    video_rate: f64,
    warnings: Vec<String>,
}

/// Process-wide analyzer for the bundled calibration files
static SHARED: OnceLock<Result<DealAnalyzer>> = OnceLock::new();

/// Deal analysis engine over an immutable rate table and decay calibration
#[derive(Debug, Clone)]
pub struct DealAnalyzer {
    rates: RateTable,
    calibrations: CalibrationTable,
    config: EngineConfig,
}

impl DealAnalyzer {
    /// Create an analyzer from pre-loaded tables.
    pub fn new(rates: RateTable, calibrations: CalibrationTable, config: EngineConfig) -> Self {
        Self {
            rates,
            calibrations,
            config,
        }
    }

    /// Load the analyzer from the bundled calibration files.
    pub fn from_csv() -> Result<Self> {
        Ok(Self::new(
            RateTable::from_csv()?,
            CalibrationTable::from_csv()?,
            EngineConfig::default(),
        ))
    }

    /// Load the analyzer from specific calibration files.
    pub fn from_csv_paths(
        rates_path: &Path,
        decay_path: &Path,
        config: EngineConfig,
    ) -> Result<Self> {
        Ok(Self::new(
            RateTable::from_csv_path(rates_path)?,
            CalibrationTable::from_csv_path(decay_path)?,
            config,
        ))
    }

    /// Process-wide shared analyzer over the bundled files.
    ///
    /// The first caller performs the load; concurrent first calls block on
    /// that one load rather than racing their own. A load failure is
    /// replayed to every caller.
    pub fn shared() -> Result<&'static DealAnalyzer> {
        SHARED
            .get_or_init(DealAnalyzer::from_csv)
            .as_ref()
            .map_err(|e| e.clone())
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn rates(&self) -> &RateTable {
        &self.rates
    }

    pub fn calibrations(&self) -> &CalibrationTable {
        &self.calibrations
    }

    /// Resolve rates and project the ten-year revenue basis for a request.
    fn projection_basis(&self, inputs: &DealInputs) -> Result<ProjectionBasis> {
        inputs.validate()?;

        let calibration = self.calibrations.calibration(&inputs.genre)?;
        let blended_audio_rate = self
            .rates
            .blend_audio(&inputs.market_mix, self.config.row_mode)?;
        let video_rate = self.rates.average_video();
        let weekly_rates = calibration.weekly_rates.as_deref();

        let mut warnings = Vec::new();

        let track_level = inputs.use_track_level
            && inputs.tracks.as_ref().is_some_and(|tracks| !tracks.is_empty());

        if track_level {
            log::debug!("projecting {} tracks individually", inputs.tracks.as_ref().map_or(0, Vec::len));
            let mut curve = LevelCurve::build(weekly_rates, &calibration.annual_multipliers)?;
            let tracks = inputs.tracks.as_deref().unwrap_or(&[]);
            let projection = project_tracks(
                &mut curve,
                tracks,
                inputs.extra_tracks,
                blended_audio_rate,
                video_rate,
            );
            if !curve.converged() {
                warnings.push("decay curve solve exhausted its bracket; projections degraded".to_string());
                log::warn!("decay curve for '{}' did not fully converge", calibration.genre);
            }

            return Ok(ProjectionBasis {
                year1_audio: projection.annual_audio[0],
                year1_video: projection.annual_video[0],
                year1_total: projection.annual_totals[0],
                multipliers: projection
                    .multipliers
                    .unwrap_or(calibration.annual_multipliers),
                blended_audio_rate,
                video_rate,
                warnings,
            });
        }

        let eff_audio = inputs.effective_weekly_audio();
        let eff_video = inputs.effective_weekly_video();

        match inputs.decay_mode {
            DecayMode::Annual => {
                // Cumulative multipliers applied to a flat annualized year 1
                let year1_audio = eff_audio * 52.0 * blended_audio_rate;
                let year1_video = eff_video * 52.0 * video_rate;
                Ok(ProjectionBasis {
                    year1_audio,
                    year1_video,
                    year1_total: year1_audio + year1_video,
                    multipliers: calibration.annual_multipliers,
                    blended_audio_rate,
                    video_rate,
                    warnings,
                })
            }
            DecayMode::Weekly => {
                let mut curve = LevelCurve::build(weekly_rates, &calibration.annual_multipliers)?;
                let projection = project_shifted(
                    &mut curve,
                    inputs.weeks_post_peak,
                    eff_audio,
                    eff_video,
                    blended_audio_rate,
                    video_rate,
                );
                if !curve.converged() {
                    warnings.push("decay curve solve exhausted its bracket; projections degraded".to_string());
                    log::warn!("decay curve for '{}' did not fully converge", calibration.genre);
                }

                let multipliers = if projection.annual_totals[0] > 0.0 {
                    projection.multipliers
                } else {
                    calibration.annual_multipliers
                };
                Ok(ProjectionBasis {
                    year1_audio: projection.annual_audio[0],
                    year1_video: projection.annual_video[0],
                    year1_total: projection.annual_totals[0],
                    multipliers,
                    blended_audio_rate,
                    video_rate,
                    warnings,
                })
            }
        }
    }

    /// Recommend the maximum deal cost under the payback and target-IRR
    /// criteria, with the projection rows at the highest-target cost.
    pub fn recommend_deal_cost(&self, inputs: &DealInputs) -> Result<RecommendationResult> {
        let basis = self.projection_basis(inputs)?;
        let label_share = inputs.label_share();

        let engine = CashFlowEngine::new(
            basis.year1_total,
            basis.multipliers,
            label_share,
            inputs.deal_type,
            self.config.display_discount_rate,
        );
        let weekly_gross = weekly_gross_series(basis.year1_total, &basis.multipliers);

        let payback = recommend_payback(
            &weekly_gross,
            inputs.deal_type,
            label_share,
            inputs.advance_share,
            inputs.marketing_recoupable,
            self.config.payback_horizon_weeks,
        );

        let irr_recommendations: Vec<IrrRecommendation> = self
            .config
            .irr_targets
            .iter()
            .map(|target| {
                recommend_irr(
                    &engine,
                    &weekly_gross,
                    *target,
                    label_share,
                    inputs.advance_share,
                    inputs.marketing_recoupable,
                    self.config.discount_rate,
                )
            })
            .collect();

        // Illustrate the waterfall at the most conservative (highest-target)
        // recommended cost
        let display_cost = irr_recommendations
            .last()
            .map(|rec| rec.max_total_cost)
            .unwrap_or(0.0);
        let cash_flow =
            engine.flows_for_deal(display_cost, inputs.advance_share, inputs.marketing_recoupable);
        let label = label_metrics(
            &label_inflows(&cash_flow),
            display_cost,
            self.config.discount_rate,
        );

        Ok(RecommendationResult {
            year1_audio_revenue: basis.year1_audio,
            year1_video_revenue: basis.year1_video,
            year1_total_revenue: basis.year1_total,
            blended_audio_rate: basis.blended_audio_rate,
            video_rate: basis.video_rate,
            market_breakdown: self
                .rates
                .market_breakdown(&inputs.market_mix, self.config.row_mode)?,
            payback,
            irr_recommendations,
            cash_flow,
            label_metrics: label,
            warnings: basis.warnings,
        })
    }

    /// Evaluate the financial viability of user-supplied deal terms.
    pub fn evaluate_deal_viability(
        &self,
        inputs: &DealInputs,
        advance: f64,
        marketing: f64,
        discount_rate: f64,
    ) -> Result<ViabilityResult> {
        if !advance.is_finite() || advance < 0.0 {
            return Err(EngineError::InvalidInput(format!(
                "advance must be >= 0, got {}",
                advance
            )));
        }
        if !marketing.is_finite() || marketing < 0.0 {
            return Err(EngineError::InvalidInput(format!(
                "marketing must be >= 0, got {}",
                marketing
            )));
        }

        let basis = self.projection_basis(inputs)?;
        let label_share = inputs.label_share();
        let total_investment = advance + marketing;

        let engine = CashFlowEngine::new(
            basis.year1_total,
            basis.multipliers,
            label_share,
            inputs.deal_type,
            self.config.display_discount_rate,
        );

        // Recoupment / expense base per deal type: profit split expenses the
        // full cost, distribution recoups the advance (plus marketing when
        // recoupable), royalty recovers nothing in-stream
        let recoup_base = match inputs.deal_type {
            DealType::Royalty => 0.0,
            DealType::ProfitSplit => total_investment,
            DealType::Distribution => {
                if inputs.marketing_recoupable {
                    total_investment
                } else {
                    advance
                }
            }
        };
        let cash_flow = engine.flows_with_recoup(recoup_base);

        let label = label_metrics(
            &label_inflows(&cash_flow),
            total_investment,
            discount_rate,
        );
        let artist = artist_metrics(&artist_payouts(&cash_flow), advance, discount_rate);

        Ok(ViabilityResult {
            total_investment,
            advance,
            marketing,
            discount_rate,
            label_share,
            year1_audio_revenue: basis.year1_audio,
            year1_video_revenue: basis.year1_video,
            year1_total_revenue: basis.year1_total,
            blended_audio_rate: basis.blended_audio_rate,
            video_rate: basis.video_rate,
            cash_flow,
            label_metrics: label,
            artist_metrics: artist,
            warnings: basis.warnings,
        })
    }
}
