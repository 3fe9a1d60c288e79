//! Commands that talk to the recommendation backend

use super::Context;
use crate::BboxArgs;
use anyhow::Result;
use infraplan_api_client::endpoints::AiRecommendRequest;
use infraplan_api_client::{ClientConfig, Fetched, InfraplanClient};
use infraplan_cli::output::{
    format_coords, format_count, format_distance, format_duration, key_value_table, swatch,
    Status,
};
use infraplan_cli::progress;
use infraplan_geo::analysis::population_coverage;
use infraplan_geo::batch::nearest_facility_distances;
use infraplan_geo::{
    score_color, BoundingBox, CoverageStats, Facility, FacilityType, GeoPoint, Scenario,
};
use infraplan_telemetry::Timer;
use serde::Serialize;

fn client(ctx: &Context) -> Result<InfraplanClient> {
    let config = ClientConfig::from_settings(&ctx.config.schema.api).with_env_overrides()?;
    Ok(InfraplanClient::with_config(config)?)
}

fn resolve(ctx: &Context, bbox: &BboxArgs) -> Result<BoundingBox> {
    let bbox = bbox.resolve(ctx.area());
    bbox.validate()?;
    Ok(bbox)
}

/// Spinner on stderr unless the output is JSON
fn spinner(ctx: &Context, message: &str) -> Option<indicatif::ProgressBar> {
    (!ctx.json).then(|| progress::spinner(message))
}

fn finish<T>(pb: Option<indicatif::ProgressBar>, fetched: &Fetched<T>, what: &str) {
    finish_spinner(pb, fetched.is_mock(), what);
}

fn finish_spinner(pb: Option<indicatif::ProgressBar>, generated: bool, what: &str) {
    match pb {
        Some(pb) => {
            let took = format_duration(pb.elapsed());
            if generated {
                let message = format!("Backend unavailable, showing generated {what} ({took})");
                progress::finish_warning(&pb, &message);
            } else {
                progress::finish_success(&pb, &format!("Fetched {what} in {took}"));
            }
        }
        None if generated => {
            Status::warning(&format!("Backend unavailable, showing generated {what}"));
        }
        None => {}
    }
}

pub async fn facilities(ctx: &Context, types: &[FacilityType], bbox: &BboxArgs) -> Result<()> {
    let bbox = resolve(ctx, bbox)?;
    let client = client(ctx)?;

    let pb = spinner(ctx, "Fetching facilities...");
    let fetched = client.facilities().fetch_many_or_mock(types, &bbox).await?;
    finish(pb, &fetched, "facilities");

    ctx.emit(&fetched, || {
        Status::header(&format_count(fetched.data.len(), "facility", "facilities"));
        for f in &fetched.data {
            let profile = ctx.table.profile(f.facility_type);
            println!(
                "{} {:<28} {:<16} {}",
                swatch(profile.color),
                f.name,
                profile.label,
                format_coords(f.latitude, f.longitude)
            );
        }
    })
}

pub async fn population(ctx: &Context, bbox: &BboxArgs) -> Result<()> {
    let bbox = resolve(ctx, bbox)?;
    let client = client(ctx)?;

    let pb = spinner(ctx, "Fetching population density...");
    let fetched = client.population().fetch_or_mock(&bbox).await?;
    finish(pb, &fetched, "population points");

    ctx.emit(&fetched, || {
        let total: f64 = fetched.data.iter().map(|p| p.intensity).sum();
        println!(
            "{}",
            key_value_table(&[
                ("Points", fetched.data.len().to_string()),
                ("Total intensity", format!("{total:.0}")),
            ])
        );
    })
}

pub async fn recommend(
    ctx: &Context,
    facility_type: FacilityType,
    bbox: &BboxArgs,
    ai: bool,
    count: Option<u32>,
) -> Result<()> {
    let bbox = resolve(ctx, bbox)?;
    let client = client(ctx)?;

    let pb = spinner(ctx, "Requesting recommendations...");
    let fetched = if ai {
        let existing = client
            .facilities()
            .fetch_or_mock(facility_type, &bbox)
            .await?
            .data;
        let mut request = AiRecommendRequest::new(facility_type, &bbox, &existing)?;
        if let Some(n) = count {
            request = request.with_count(n);
        }
        client.recommendations().fetch_ai_or_mock(&request).await?
    } else {
        client
            .recommendations()
            .fetch_or_mock(facility_type, &bbox)
            .await?
    };
    finish(pb, &fetched, "recommendations");

    ctx.emit(&fetched, || {
        let label = ctx.table.profile(facility_type).label;
        let sites = format_count(fetched.data.locations.len(), "site", "sites");
        Status::header(&format!("{label}: {sites}"));
        for (i, r) in fetched.data.locations.iter().enumerate() {
            println!(
                "{:>2}. {} {}  score {:.2}",
                i + 1,
                swatch(score_color(r.score)),
                format_coords(r.latitude, r.longitude),
                r.score
            );
            if let Some(reason) = &r.reason {
                println!("    {reason}");
            }
        }
        println!();
        println!("Expected improvement: {:.0}%", fetched.data.improvement_score);
    })
}

/// Population coverage before and after placing proposed facilities
#[derive(Debug, Serialize)]
pub struct AnalysisReport {
    pub facility_type: FacilityType,
    pub bounds: BoundingBox,
    pub existing: usize,
    pub proposed: Vec<Facility>,
    pub coverage_before: CoverageStats,
    pub coverage_after: CoverageStats,
    pub improvement_percent: f64,
    /// Median distance from a population point to its nearest existing facility
    pub median_distance_m: Option<f64>,
    /// Some input was generated because the backend was unavailable
    pub generated_data: bool,
}

/// Fetch facilities and population for `bbox` and score the proposed placements.
pub async fn analysis_report(
    ctx: &Context,
    client: &InfraplanClient,
    facility_type: FacilityType,
    bbox: BoundingBox,
    proposed: &[GeoPoint],
    with_recommendations: bool,
) -> Result<AnalysisReport> {
    let facilities_api = client.facilities();
    let population_api = client.population();
    let (facilities, population) = tokio::try_join!(
        facilities_api.fetch_or_mock(facility_type, &bbox),
        population_api.fetch_or_mock(&bbox),
    )?;
    let recommendations = if with_recommendations {
        Some(
            client
                .recommendations()
                .fetch_or_mock(facility_type, &bbox)
                .await?,
        )
    } else {
        None
    };
    let generated_data = facilities.is_mock()
        || population.is_mock()
        || recommendations.as_ref().is_some_and(Fetched::is_mock);

    let timer = Timer::start("analyze");
    let mut scenario = Scenario::with_table(facilities.data, ctx.table.clone());
    for &at in proposed {
        scenario.add_simulated(facility_type, at);
    }
    if let Some(recs) = &recommendations {
        for r in &recs.data.locations {
            scenario.add_simulated(facility_type, r.location());
        }
    }

    let points = &population.data;
    let existing_layers = ctx.table.derive_all(scenario.existing());
    let coverage_before = population_coverage(points, &existing_layers);
    let coverage_after = population_coverage(points, &scenario.coverage_layers());
    let improvement_percent = scenario.improvement(points);

    let mut distances: Vec<f64> = nearest_facility_distances(points, scenario.existing())
        .iter()
        .map(|n| n.distance)
        .filter(|d| d.is_finite())
        .collect();
    distances.sort_by(f64::total_cmp);
    let median_distance_m = distances.get(distances.len() / 2).copied();
    timer.stop();

    Ok(AnalysisReport {
        facility_type,
        bounds: bbox,
        existing: scenario.existing().len(),
        proposed: scenario.simulated().to_vec(),
        coverage_before,
        coverage_after,
        improvement_percent,
        median_distance_m,
        generated_data,
    })
}

pub async fn analyze(
    ctx: &Context,
    facility_type: FacilityType,
    bbox: &BboxArgs,
    proposed: &[GeoPoint],
    with_recommendations: bool,
) -> Result<()> {
    let bbox = resolve(ctx, bbox)?;
    let client = client(ctx)?;

    let pb = spinner(ctx, "Fetching facilities and population...");
    let report =
        analysis_report(ctx, &client, facility_type, bbox, proposed, with_recommendations).await?;
    finish_spinner(pb, report.generated_data, "analysis input");

    ctx.emit(&report, || {
        let label = ctx.table.profile(facility_type).label;
        Status::header(&format!("{label}: coverage analysis"));
        println!(
            "{}",
            key_value_table(&[
                ("Existing", report.existing.to_string()),
                ("Proposed", report.proposed.len().to_string()),
                (
                    "Covered now",
                    format!("{:.1}%", report.coverage_before.ratio * 100.0)
                ),
                (
                    "Covered with proposed",
                    format!("{:.1}%", report.coverage_after.ratio * 100.0)
                ),
                ("Improvement", format!("{:.1}%", report.improvement_percent)),
                (
                    "Median distance",
                    report
                        .median_distance_m
                        .map_or_else(|| "n/a".to_string(), format_distance),
                ),
            ])
        );
    })
}
