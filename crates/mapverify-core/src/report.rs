//! Markdown rendering of pipeline and integration runs.
//!
//! Both renderers are pure functions of the run document, so a persisted
//! results file can be re-rendered later.
use std::fmt::Write as _;

use crate::grade::Status;
use crate::integration::{IntegrationRun, StageName};
use crate::pipeline::{PipelineRun, RegressionStatus, SuiteName};

/// Renders the full pipeline report.
pub fn render_pipeline(run: &PipelineRun) -> String {
    let mut out = String::new();
    // write! to String is infallible.
    write_pipeline(&mut out, run).ok();
    out
}

/// Renders the integration report.
pub fn render_integration(run: &IntegrationRun) -> String {
    let mut out = String::new();
    write_integration(&mut out, run).ok();
    out
}

fn write_pipeline(out: &mut String, run: &PipelineRun) -> std::fmt::Result {
    writeln!(out, "# Map Verification Report")?;
    writeln!(out)?;
    writeln!(out, "- Pipeline: {} {}", run.pipeline_name, run.pipeline_version)?;
    writeln!(out, "- Execution: {}", run.execution_id)?;
    writeln!(out, "- Started: {}", run.started_at.to_rfc3339())?;
    writeln!(out, "- Status: {}", run.status)?;
    writeln!(
        out,
        "- Overall: {} ({:.1}/100)",
        run.overall_grade, run.overall_score
    )?;
    writeln!(out, "- Duration: {} ms", run.duration_ms)?;
    writeln!(out)?;

    writeln!(out, "## Execution Summary")?;
    writeln!(out)?;
    writeln!(out, "- Completed: {}", run.completed.len())?;
    writeln!(out, "- Failed: {}", run.failed.len())?;
    writeln!(out, "- Skipped: {}", run.skipped.len())?;
    writeln!(out)?;

    for (suite, summary) in &run.summaries {
        writeln!(out, "## {}", suite_title(*suite))?;
        writeln!(out)?;
        writeln!(out, "- Status: {}", summary.status)?;
        writeln!(out, "- Score: {:.1}/100", summary.score)?;
        writeln!(out, "- Execution time: {} ms", summary.execution_time_ms)?;
        if summary.issues.is_empty() {
            writeln!(out, "- Issues: none")?;
        } else {
            writeln!(out, "- Issues: {}", summary.issue_count)?;
            writeln!(out)?;
            for issue in &summary.issues {
                writeln!(out, "  - {issue}")?;
            }
        }
        writeln!(out)?;
    }

    let regression = &run.regression;
    writeln!(out, "## Regression Analysis")?;
    writeln!(out)?;
    writeln!(out, "- Status: {}", regression.status.as_str())?;
    if regression.status == RegressionStatus::NoBaseline {
        writeln!(out, "- No earlier run to compare with.")?;
    } else {
        if let Some(baseline) = &regression.baseline {
            writeln!(out, "- Baseline: {baseline}")?;
        }
        for (suite, cmp) in &regression.score_comparison {
            writeln!(
                out,
                "- {suite}: {:.1} → {:.1} ({:+.1})",
                cmp.historical, cmp.current, cmp.difference
            )?;
        }
        if !regression.regressions.is_empty() {
            writeln!(out)?;
            writeln!(out, "### Regressions")?;
            writeln!(out)?;
            for r in &regression.regressions {
                writeln!(
                    out,
                    "- {}: dropped {:.1} points ({} severity)",
                    r.suite, r.score_drop, r.severity
                )?;
            }
        }
        if !regression.improvements.is_empty() {
            writeln!(out)?;
            writeln!(out, "### Improvements")?;
            writeln!(out)?;
            for i in &regression.improvements {
                writeln!(out, "- {}: up {:.1} points", i.suite, i.score_improvement)?;
            }
        }
    }
    writeln!(out)?;

    if !run.recommendations.is_empty() {
        writeln!(out, "## Recommendations")?;
        writeln!(out)?;
        for (n, rec) in run.recommendations.iter().enumerate() {
            writeln!(out, "### {}. {} ({} priority)", n + 1, rec.suite, rec.priority)?;
            writeln!(out)?;
            writeln!(out, "Issues:")?;
            for issue in &rec.issues {
                writeln!(out, "- {issue}")?;
            }
            writeln!(out)?;
            writeln!(out, "Suggestions:")?;
            for s in &rec.suggestions {
                writeln!(out, "- {s}")?;
            }
            writeln!(out)?;
        }
    }

    if !run.failed.is_empty() {
        writeln!(out, "## Failures")?;
        writeln!(out)?;
        for f in &run.failed {
            let kind = if f.panicked { "panicked" } else { "failed" };
            writeln!(out, "- {} {kind}: {}", f.suite, f.error)?;
        }
        writeln!(out)?;
    }
    Ok(())
}

fn suite_title(suite: SuiteName) -> &'static str {
    match suite {
        SuiteName::Connectivity => "Connectivity",
        SuiteName::CrossRegion => "Cross-Region Connections",
        SuiteName::DataIntegrity => "Data Integrity",
        SuiteName::Performance => "Performance",
    }
}

fn stage_title(stage: StageName) -> &'static str {
    match stage {
        StageName::Setup => "Setup",
        StageName::MapSplitting => "Map Splitting",
        StageName::IntegrationTests => "Pipeline",
        StageName::Validation => "Validation",
        StageName::Performance => "Performance",
    }
}

fn write_integration(out: &mut String, run: &IntegrationRun) -> std::fmt::Result {
    writeln!(out, "# Integration Test Report")?;
    writeln!(out)?;
    writeln!(out, "- Suite: {} {}", run.suite_name, run.version)?;
    writeln!(out, "- Started: {}", run.started_at.to_rfc3339())?;
    writeln!(out, "- Duration: {} ms", run.duration_ms)?;
    writeln!(out, "- Status: {}", run.status)?;
    writeln!(out)?;

    let m = &run.metrics;
    writeln!(out, "## Overview")?;
    writeln!(out)?;
    writeln!(out, "| | expected | actual |")?;
    writeln!(out, "|---|---|---|")?;
    writeln!(out, "| rooms | {} | {} |", m.expected_rooms, m.actual_rooms)?;
    writeln!(out, "| regions | {} | {} |", m.expected_regions, m.actual_regions)?;
    writeln!(
        out,
        "| cross-region connections | {} | {} |",
        m.expected_cross_region_connections, m.actual_cross_region_connections
    )?;
    writeln!(out)?;

    let setup = &run.setup;
    stage_header(out, StageName::Setup, setup.status)?;
    writeln!(out, "- Districts: {}", setup.districts)?;
    writeln!(out, "- Locations: {}", setup.locations)?;
    writeln!(out, "- Rooms: {}", setup.rooms)?;
    bullet_issues(out, &setup.issues)?;
    writeln!(out)?;

    let split = &run.map_splitting;
    stage_header(out, StageName::MapSplitting, split.status)?;
    if let Some(error) = &split.error {
        writeln!(out, "- Error: {error}")?;
    }
    writeln!(out, "- Execution time: {} ms", split.execution_time_ms)?;
    writeln!(out, "- Regions: {}", split.region_count)?;
    writeln!(out, "- Rooms: {}", split.total_rooms)?;
    writeln!(out, "- Locations: {}", split.total_locations)?;
    writeln!(
        out,
        "- Connections: {} ({} cross-region)",
        split.total_connections, split.cross_region_connections
    )?;
    for (region, file) in &split.region_files {
        writeln!(out, "- Region file for {region}: {file}")?;
    }
    bullet_issues(out, &split.issues)?;
    writeln!(out)?;

    if let Some(stage) = &run.integration_tests {
        stage_header(out, StageName::IntegrationTests, stage.status)?;
        if let Some(status) = stage.pipeline_status {
            writeln!(out, "- Pipeline status: {status}")?;
        }
        if let Some(error) = &stage.error {
            writeln!(out, "- Error: {error}")?;
        }
        writeln!(out, "- Execution time: {} ms", stage.execution_time_ms)?;
        if let Some(inner) = &stage.run {
            for (suite, summary) in &inner.summaries {
                writeln!(
                    out,
                    "- {suite}: {} ({:.1}/100)",
                    summary.status, summary.score
                )?;
            }
        }
        for suite in &stage.failed {
            writeln!(out, "- {suite}: did not complete")?;
        }
        writeln!(out)?;
    }

    if let Some(stage) = &run.validation {
        stage_header(out, StageName::Validation, stage.status)?;
        let rc = &stage.room_count;
        writeln!(
            out,
            "- Room count: {} (source {}, split {}, expected {})",
            rc.status, rc.source, rc.split, rc.expected
        )?;
        let c = &stage.connectivity;
        writeln!(
            out,
            "- Connectivity: {} ({} components, {} isolated rooms)",
            c.status, c.components, c.isolated_rooms
        )?;
        if let Some(cr) = &stage.cross_region {
            writeln!(
                out,
                "- Critical connections: {} ({}/{} found)",
                cr.status, cr.found, cr.expected
            )?;
            for missing in &cr.missing {
                writeln!(out, "  - missing {missing}")?;
            }
        }
        let d = &stage.data_integrity;
        writeln!(
            out,
            "- Data integrity: {} ({} errors, {} warnings)",
            d.status, d.errors, d.warnings
        )?;
        writeln!(out)?;
    }

    if let Some(stage) = &run.performance {
        stage_header(out, StageName::Performance, stage.status)?;
        writeln!(out, "- Grade: {} ({:.1}/100)", stage.grade, stage.score)?;
        for (operation, limit) in &stage.limits {
            let mean = limit
                .mean_ms
                .map_or_else(|| "n/a".to_owned(), |m| format!("{m:.2} ms"));
            let verdict = if limit.within { "within" } else { "over" };
            writeln!(
                out,
                "- {operation}: {mean} ({verdict} {:.0} ms)",
                limit.limit_ms
            )?;
        }
        writeln!(out)?;
    }

    if !run.recommendations.is_empty() {
        writeln!(out, "## Recommendations")?;
        writeln!(out)?;
        for (n, rec) in run.recommendations.iter().enumerate() {
            writeln!(out, "### {}. {} ({} priority)", n + 1, rec.stage, rec.priority)?;
            writeln!(out)?;
            writeln!(out, "{}", rec.message)?;
            writeln!(out)?;
            for s in &rec.suggestions {
                writeln!(out, "- {s}")?;
            }
            writeln!(out)?;
        }
    }
    Ok(())
}

fn stage_header(out: &mut String, stage: StageName, status: Status) -> std::fmt::Result {
    writeln!(out, "## {}", stage_title(stage))?;
    writeln!(out)?;
    writeln!(out, "- Status: {status}")
}

fn bullet_issues(out: &mut String, issues: &[String]) -> std::fmt::Result {
    for issue in issues {
        writeln!(out, "- Issue: {issue}")?;
    }
    Ok(())
}
