//! Command implementations.

use anyhow::Result;
use clap::Args;
use chrono::NaiveDate;

use terrasense_core::AreaOfInterest;
use terrasense_providers::{EarthDataService, MoistureBackend, VegetationBackend};

use crate::output::Output;

// ============================================================================
// Argument Types
// ============================================================================

/// Location and date-range arguments shared by most commands.
#[derive(Debug, Args)]
pub struct RangeArgs {
    /// Latitude in decimal degrees.
    #[arg(long)]
    pub lat: f64,

    /// Longitude in decimal degrees.
    #[arg(long)]
    pub lon: f64,

    /// First day of the window (YYYY-MM-DD).
    #[arg(long)]
    pub start: NaiveDate,

    /// Last day of the window (YYYY-MM-DD).
    #[arg(long)]
    pub end: NaiveDate,
}

/// Arguments for the irrigation command.
#[derive(Debug, Args)]
pub struct IrrigationArgs {
    #[command(flatten)]
    pub range: RangeArgs,

    /// Target volumetric moisture (0.0-1.0).
    #[arg(long, default_value_t = 0.30)]
    pub target: f64,

    /// Field area in hectares.
    #[arg(long, default_value_t = 1.0)]
    pub area: f64,
}

/// Arguments for the grazing command.
#[derive(Debug, Args)]
pub struct GrazingArgs {
    #[command(flatten)]
    pub range: RangeArgs,

    /// Paddock area in hectares.
    #[arg(long, default_value_t = 1.0)]
    pub area: f64,

    /// Number of animals.
    #[arg(long, default_value_t = 10)]
    pub animals: u32,

    /// Daily intake per animal, kg.
    #[arg(long, default_value_t = 12.0)]
    pub intake: f64,
}

/// Arguments for the forecast command.
#[derive(Debug, Args)]
pub struct ForecastArgs {
    #[command(flatten)]
    pub range: RangeArgs,

    /// Forecast rainfall for the coming days, comma-separated mm
    /// (e.g. "12,0,5").
    #[arg(long, value_delimiter = ',')]
    pub rain: Option<Vec<f64>>,
}

// ============================================================================
// Commands
// ============================================================================

/// Fetches and prints a soil-moisture series.
pub async fn moisture<M: MoistureBackend, V: VegetationBackend>(
    service: &EarthDataService<M, V>,
    args: &RangeArgs,
    out: &Output,
) -> Result<()> {
    let series = service
        .get_soil_moisture(args.lat, args.lon, args.start, args.end)
        .await?;

    out.emit(&series, |series| {
        let mut text = format!("Soil moisture ({} points):\n", series.len());
        for p in series {
            text.push_str(&format!(
                "  {}  {:.3}  [{} / {}]\n",
                p.date, p.value, p.quality, p.source_id
            ));
        }
        text
    })
}

/// Fetches and prints a vegetation-index series.
pub async fn vegetation<M: MoistureBackend, V: VegetationBackend>(
    service: &EarthDataService<M, V>,
    args: &RangeArgs,
    out: &Output,
) -> Result<()> {
    let area = AreaOfInterest::point(args.lat, args.lon);
    let observations = service
        .get_vegetation_index(&area, args.start, args.end)
        .await?;

    out.emit(&observations, |observations| {
        let mut text = format!("Vegetation index ({} composites):\n", observations.len());
        for o in observations {
            text.push_str(&format!(
                "  {}  NDVI {:.4}  EVI {:.4}\n",
                o.date, o.ndvi, o.evi
            ));
        }
        text
    })
}

/// Assesses and prints drought conditions.
pub async fn drought<M: MoistureBackend, V: VegetationBackend>(
    service: &EarthDataService<M, V>,
    args: &RangeArgs,
    out: &Output,
) -> Result<()> {
    let assessment = service
        .get_drought_assessment(args.lat, args.lon, args.start, args.end)
        .await?;

    out.emit(&assessment, |a| {
        let average = a
            .average_moisture
            .map_or_else(|| "n/a".to_string(), |m| format!("{m:.3}"));
        let mut text = format!(
            "Drought: {} (severity {}/5)\n  average moisture: {}\n  trend: {:+.1}%/step\n",
            a.level, a.severity, average, a.trend_percent
        );
        for r in &a.recommendations {
            text.push_str(&format!("  - {r}\n"));
        }
        text
    })
}

/// Computes and prints the irrigation requirement.
pub async fn irrigation<M: MoistureBackend, V: VegetationBackend>(
    service: &EarthDataService<M, V>,
    args: &IrrigationArgs,
    out: &Output,
) -> Result<()> {
    let plan = service
        .get_irrigation_plan(
            args.range.lat,
            args.range.lon,
            args.range.start,
            args.range.end,
            args.target,
            args.area,
        )
        .await?;

    out.emit(&plan, |p| {
        if p.needs_irrigation {
            format!(
                "Irrigation needed: {:.1} mm depth, {:.0} L over {:.1} ha (deficit {:.3})\n",
                p.water_depth_mm, p.water_liters, p.area_ha, p.deficit
            )
        } else {
            "No irrigation needed: current moisture meets the target.\n".to_string()
        }
    })
}

/// Derives and prints a grazing-rotation schedule.
pub async fn grazing<M: MoistureBackend, V: VegetationBackend>(
    service: &EarthDataService<M, V>,
    args: &GrazingArgs,
    out: &Output,
) -> Result<()> {
    let area = AreaOfInterest::point(args.range.lat, args.range.lon);
    let plan = service
        .get_grazing_plan(
            &area,
            args.range.start,
            args.range.end,
            args.area,
            args.animals,
            args.intake,
        )
        .await?;

    out.emit(&plan, |p| {
        format!(
            "Grazing plan:\n  biomass: {:.0} kg/ha\n  available forage: {:.0} kg\n  rotate after: {:.1} days\n  rest period: {} days\n",
            p.biomass_kg_per_ha, p.available_forage_kg, p.days_until_rotation, p.rest_period_days
        )
    })
}

/// Predicts and prints the moisture forecast.
pub async fn forecast<M: MoistureBackend, V: VegetationBackend>(
    service: &EarthDataService<M, V>,
    args: &ForecastArgs,
    out: &Output,
) -> Result<()> {
    let predictions = service
        .get_moisture_forecast(
            args.range.lat,
            args.range.lon,
            args.range.start,
            args.range.end,
            args.rain.as_deref(),
        )
        .await?;

    out.emit(&predictions, |predictions| {
        let mut text = "Moisture forecast:\n".to_string();
        for p in predictions {
            text.push_str(&format!(
                "  {}  {:.3}  (confidence {:.0}%)\n",
                p.date,
                p.predicted_moisture,
                p.confidence * 100.0
            ));
        }
        text
    })
}
