use std::fmt::Write;

use crate::models::{Analysis, Dataset, Factor, PredictionResult};

fn quarter_names() -> [&'static str; 4] {
    ["Jan-Mar", "Apr-Jun", "Jul-Sep", "Oct-Dec"]
}

fn write_analysis(output: &mut String, analysis: &Analysis) {
    let _ = writeln!(output);
    let _ = writeln!(output, "## Factor Correlations");
    let _ = writeln!(output, "| Factor | Correlation | Trend (per record) |");
    let _ = writeln!(output, "|---|---|---|");
    for factor in Factor::ALL {
        let _ = writeln!(
            output,
            "| {} | {:.2} | {:.3} |",
            factor.label(),
            analysis.correlation(factor),
            analysis.trends.get(&factor).copied().unwrap_or(0.0)
        );
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## High-Risk Patterns");
    if analysis.risk_patterns.is_empty() {
        let _ = writeln!(output, "No historical records exceeded the high-risk threshold.");
    } else {
        for pattern in analysis.risk_patterns.iter() {
            let _ = writeln!(
                output,
                "- Severity {} (score {:.0}), observed {} times:",
                pattern.severity, pattern.risk_score, pattern.occurrences
            );
            for (factor, range) in pattern.conditions.iter() {
                let _ = writeln!(
                    output,
                    "  - {}: {:.1} to {:.1}",
                    factor.label(),
                    range.min,
                    range.max
                );
            }
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Seasonal Factors");
    for (name, factor) in quarter_names().iter().zip(analysis.seasonal_factors.0.iter()) {
        let _ = writeln!(output, "- {name}: {factor:.2}");
    }
}

pub fn build_report(dataset: &Dataset, result: &PredictionResult) -> String {
    let mut output = String::new();
    let summary = &dataset.summary;

    let _ = writeln!(output, "# Disaster Risk Report");
    let _ = writeln!(
        output,
        "{} risk for {} generated {} from dataset \"{}\"",
        result.disaster,
        result.location,
        result.generated_at.format("%Y-%m-%d %H:%M UTC"),
        dataset.name
    );

    let _ = writeln!(output);
    let _ = writeln!(output, "## Dataset Summary");
    let _ = writeln!(output, "- Records: {}", summary.total_records);
    match &summary.date_range {
        Some(span) => {
            let _ = writeln!(output, "- Date range: {} to {}", span.start, span.end);
        }
        None => {
            let _ = writeln!(output, "- Date range: unknown");
        }
    }
    if summary.locations.is_empty() {
        let _ = writeln!(output, "- Locations: none recorded");
    } else {
        let _ = writeln!(output, "- Locations: {}", summary.locations.join(", "));
    }
    let _ = writeln!(
        output,
        "- Averages: temperature {:.0}, humidity {:.0}, rainfall {:.1}",
        summary.avg_temperature, summary.avg_humidity, summary.avg_rainfall
    );

    let _ = writeln!(output);
    let _ = writeln!(output, "## Prediction");
    let _ = writeln!(
        output,
        "- Risk score: {} ({})",
        result.risk_score,
        result.risk_level().as_str()
    );
    let _ = writeln!(output, "- Confidence: {}%", result.confidence);
    let _ = writeln!(output, "- Expected timeline: {}", result.timeline);
    let _ = writeln!(output, "- Estimated affected population: {}", result.affected_population);
    let _ = writeln!(output, "- Basis: {}", result.source.as_str());

    if let Some(analysis) = &result.analysis {
        write_analysis(&mut output, analysis);
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Recommendations");
    for recommendation in result.recommendations.iter() {
        let _ = writeln!(output, "- {recommendation}");
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Reasoning");
    for line in result.reasoning.iter() {
        let _ = writeln!(output, "- {line}");
    }

    output
}
