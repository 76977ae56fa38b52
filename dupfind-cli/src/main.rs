mod persistence;
mod report;

use std::path::PathBuf;

use anyhow::{Context, Result};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use structopt::StructOpt;

use dupfind_core::{Analyzer, CompiledMetric, DEFAULT_METRIC_EXPR};

/// Count Ur Redundancies: finds maximal repeated line sequences across
/// one or more source files, to guide de-duplication.
#[derive(StructOpt)]
#[structopt(name = "dupfind")]
struct CliArgs {
    /// Source files to analyze
    #[structopt(parse(from_os_str), required = true)]
    files: Vec<PathBuf>,

    /// A severity metric for repeat (c)ount and (l)ength, e.g. "(c-1)*(l-1)-2"
    // Kept in sync with `dupfind_core::DEFAULT_METRIC_EXPR` by
    // `default_metric_literal_matches_core_const` below; structopt's
    // `default_value` needs a string literal, not a const reference.
    #[structopt(short = "m", long = "metric", default_value = "(c-1)*(l-1)-2")]
    metric: String,
}

#[cfg(test)]
mod default_metric_tests {
    use super::*;

    #[test]
    fn default_metric_literal_matches_core_const() {
        assert_eq!("(c-1)*(l-1)-2", DEFAULT_METRIC_EXPR);
    }
}

fn main() -> Result<()> {
    let args = CliArgs::from_args();

    // Metric errors must surface before any file is touched.
    let metric = CompiledMetric::compile(&args.metric)
        .with_context(|| format!("invalid metric expression `{}`", args.metric))?;

    let mut analyzer = Analyzer::with_default_canonicalizer();
    for path in &args.files {
        eprintln!("processing {} ...", path.display());
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("\t{pos} nodes processed"),
        );
        analyzer
            .add_file(path, |n| pb.set_position(n))
            .with_context(|| format!("could not process `{}`", path.display()))?;
        pb.finish_and_clear();
    }

    eprintln!("{}", style("finding maximal repeats (this may take a while)").dim());

    let repeats = analyzer
        .maximal_repeats(&metric)
        .with_context(|| "evaluating the metric against the collected repeats failed")?;

    let mut scored: Vec<(i64, _)> = Vec::with_capacity(repeats.len());
    for repeat in repeats {
        let severity = metric
            .eval(repeat.indices.len() as i64, repeat.length as i64)
            .with_context(|| "evaluating the metric against a collected repeat failed")?;
        scored.push((severity, repeat));
    }
    scored.sort_by(|a, b| b.0.cmp(&a.0));

    let mut total_severity: i64 = 0;
    for (severity, repeat) in &scored {
        let contribution = match &repeat.contains {
            None => *severity,
            Some(contains) => {
                let adjusted_length = repeat.length as i64 - contains.length as i64 + 1;
                let adjusted = metric.eval(repeat.indices.len() as i64, adjusted_length)?;
                adjusted.max(0)
            }
        };
        total_severity += contribution;

        let rendered = analyzer.render(repeat);
        print!("{}", report::format_repeat(*severity, repeat.indices.len(), &rendered));
    }

    let cwd = std::env::current_dir().context("could not determine the current directory")?;
    let previous = persistence::read_previous_run(&cwd)?;

    println!(
        "{}",
        report::format_summary(
            total_severity,
            analyzer.lines_count(),
            previous.map(|p| (p.total_severity, p.total_lines))
        )
    );

    persistence::write_current_run(&cwd, total_severity, analyzer.lines_count())?;

    Ok(())
}
