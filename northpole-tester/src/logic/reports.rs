use anyhow::Result;
use chrono::{DateTime, Utc};
use colored::Colorize;
use std::io::Write;
use std::time::Duration;

use super::{PlayabilityAggregate, PlayabilityRecord, ScenarioResult};

fn success_rate(results: &[ScenarioResult]) -> f64 {
    if results.is_empty() {
        return 0.0;
    }
    let passed = results.iter().filter(|r| r.passed).count();
    #[allow(clippy::cast_precision_loss)]
    let rate = (passed as f64 / results.len() as f64) * 100.0;
    rate
}

pub fn generate_console_report<W: Write + ?Sized>(
    out: &mut W,
    results: &[ScenarioResult],
    aggregates: &[PlayabilityAggregate],
    total_duration: Duration,
) -> Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", "📊 Desk Test Results Summary".bright_cyan().bold())?;
    writeln!(out, "{}", "=============================".cyan())?;

    let total_tests = results.len();
    let passed_tests = results.iter().filter(|r| r.passed).count();
    let failed_tests = total_tests - passed_tests;

    writeln!(out, "Total scenarios: {total_tests}")?;
    writeln!(out, "Passed: {}", passed_tests.to_string().green())?;
    writeln!(out, "Failed: {}", failed_tests.to_string().red())?;
    writeln!(out, "Success rate: {:.1}%", success_rate(results))?;
    writeln!(out, "Total time: {total_duration:?}")?;
    writeln!(out)?;

    for result in results {
        let status = if result.passed {
            "✅ PASS".green()
        } else {
            "❌ FAIL".red()
        };

        writeln!(
            out,
            "{} {} (seed {} / {})",
            status,
            result.scenario_name.bold(),
            result.seed,
            result.shift_code
        )?;
        writeln!(
            out,
            "   Iterations: {}/{} successful",
            result.successful_iterations, result.iterations_run
        )?;
        writeln!(out, "   Average time: {:?}", result.average_duration)?;

        if !result.failures.is_empty() {
            writeln!(out, "   Failures:")?;
            for failure in &result.failures {
                writeln!(out, "     • {}", failure.red())?;
            }
        }
        writeln!(out)?;
    }

    if let (Some(fastest), Some(slowest)) = (
        results.iter().min_by_key(|r| r.average_duration),
        results.iter().max_by_key(|r| r.average_duration),
    ) {
        writeln!(out, "{}", "⚡ Performance Summary".bright_yellow().bold())?;
        writeln!(out, "{}", "=====================".yellow())?;
        writeln!(
            out,
            "Fastest: {} ({:?})",
            fastest.scenario_name.green(),
            fastest.average_duration
        )?;
        writeln!(
            out,
            "Slowest: {} ({:?})",
            slowest.scenario_name.yellow(),
            slowest.average_duration
        )?;
        writeln!(out)?;
    }

    if !aggregates.is_empty() {
        writeln!(out, "{}", "🎄 Playability Summary".bright_green().bold())?;
        writeln!(out, "{}", "======================".green())?;
        for agg in aggregates {
            writeln!(
                out,
                "{}: {} shifts | tickets {:.1}±{:.1} | score {:.0}±{:.0} | stars {:.2} | burnout {:.1}% | stress {:.1} satisfaction {:.1}",
                agg.scenario_name.bold(),
                agg.iterations,
                agg.mean_tickets,
                agg.std_tickets,
                agg.mean_score,
                agg.std_score,
                agg.mean_rating,
                agg.game_over_pct * 100.0,
                agg.mean_final_stress,
                agg.mean_final_satisfaction
            )?;
            writeln!(
                out,
                "   ratings 1★ {:.0}% 2★ {:.0}% 3★ {:.0}% 4★ {:.0}% 5★ {:.0}% | fewest entries seen {}",
                agg.rating_distribution[0] * 100.0,
                agg.rating_distribution[1] * 100.0,
                agg.rating_distribution[2] * 100.0,
                agg.rating_distribution[3] * 100.0,
                agg.rating_distribution[4] * 100.0,
                agg.min_unique_entries
            )?;
        }
    }
    Ok(())
}

pub fn generate_json_report<W: Write + ?Sized>(
    out: &mut W,
    results: &[ScenarioResult],
) -> Result<()> {
    let json_output = serde_json::to_string_pretty(results)?;
    writeln!(out, "{json_output}")?;
    Ok(())
}

pub fn generate_markdown_report<W: Write + ?Sized>(
    out: &mut W,
    results: &[ScenarioResult],
    generated_at: DateTime<Utc>,
) -> Result<()> {
    writeln!(out, "# NorthPole Desk Test Results\n")?;
    writeln!(out, "_Generated {}_\n", generated_at.to_rfc3339())?;

    let total_tests = results.len();
    let passed_tests = results.iter().filter(|r| r.passed).count();
    let failed_tests = total_tests - passed_tests;

    writeln!(out, "## Summary\n")?;
    writeln!(out, "- **Total scenarios**: {total_tests}")?;
    writeln!(out, "- **Passed**: {passed_tests}")?;
    writeln!(out, "- **Failed**: {failed_tests}")?;
    writeln!(out, "- **Success rate**: {:.1}%\n", success_rate(results))?;

    writeln!(out, "## Detailed Results\n")?;

    for result in results {
        let status = if result.passed { "✅" } else { "❌" };

        writeln!(
            out,
            "### {} {} (`{}`)\n",
            status, result.scenario_name, result.shift_code
        )?;
        writeln!(
            out,
            "- **Iterations**: {}/{} successful",
            result.successful_iterations, result.iterations_run
        )?;
        writeln!(out, "- **Average time**: {:?}", result.average_duration)?;

        if !result.failures.is_empty() {
            writeln!(out, "- **Failures**:")?;
            for failure in &result.failures {
                writeln!(out, "  - {failure}")?;
            }
        }
        writeln!(out)?;
    }
    Ok(())
}

pub fn generate_csv_report<W: Write + ?Sized>(
    out: &mut W,
    records: &[PlayabilityRecord],
) -> Result<()> {
    writeln!(
        out,
        "scenario,responder,seed_code,seed_value,tickets_resolved,final_score,final_satisfaction,final_stress,peak_stress,mean_rating,unique_entries,burned_out"
    )?;
    for record in records {
        let m = &record.metrics;
        writeln!(
            out,
            "{},{},{},{},{},{},{},{},{},{:.3},{},{}",
            csv_field(&record.scenario_name),
            record.strategy,
            record.seed_code,
            record.seed_value,
            m.tickets_resolved,
            m.final_score,
            m.final_satisfaction,
            m.final_stress,
            m.peak_stress,
            m.mean_rating(),
            m.unique_entries_seen,
            m.burned_out
        )?;
    }
    Ok(())
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
