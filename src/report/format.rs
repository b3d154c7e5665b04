//! Formatted terminal output for estimation runs and sweeps.
//!
//! We keep formatting code in one place so:
//! - the estimation code stays clean and testable
//! - output changes are localized (important for snapshot tests)

use crate::app::pipeline::{RunOutput, SweepRow};
use crate::domain::{Estimate, RunConfig, SweepConfig, theoretical_mean};

/// Format the full run summary (sample stats + estimates + optimizer diagnostics).
pub fn format_run_summary(run: &RunOutput, config: &RunConfig) -> String {
    let mut out = String::new();

    out.push_str("=== betafit - Beta(1/theta, 1) shape estimation ===\n");
    out.push_str(&format!(
        "Sample: n={} | sampler={} | seed={}\n",
        run.sample.len(),
        sampler_label(config),
        config.seed,
    ));
    out.push_str(&format!(
        "True: theta={:.6} alpha={:.6}\n",
        config.theta_true,
        1.0 / config.theta_true
    ));
    out.push_str(&format!(
        "Mean: sample={:.6} | theoretical={:.6}\n",
        run.sample.mean(),
        theoretical_mean(config.theta_true)
    ));

    out.push_str("\nEstimates:\n");
    out.push_str(&estimate_header());
    out.push_str(&estimate_row("method of moments", &run.mom, config.theta_true));
    out.push_str(&estimate_row("closed-form MLE", &run.closed_form, config.theta_true));
    let numerical = Estimate {
        theta: run.numerical.theta_hat,
        alpha: 1.0 / run.numerical.theta_hat,
    };
    let label = format!("numerical MLE ({})", run.numerical.method.display_name());
    out.push_str(&estimate_row(&label, &numerical, config.theta_true));

    let o = &run.numerical;
    out.push_str("\nOptimizer:\n");
    out.push_str(&format!(
        "- {} + {} from theta0={}\n",
        o.method.display_name(),
        o.line_search.display_name(),
        config.theta0
    ));
    out.push_str(&format!(
        "- iterations={} | NLL={:.6} | |grad|={}\n",
        o.iterations,
        o.objective,
        o.grad_norm.map(|g| format!("{g:.3e}")).unwrap_or_else(|| "n/a".to_string())
    ));
    out.push_str(&format!("- termination: {}\n", truncate(&o.termination, 60)));
    out.push_str(&format!(
        "- closed-form vs numerical: rel diff={:.3e} (tol {:.1e})\n",
        run.agreement, config.agreement_tol
    ));

    if let Some((theta, ll)) = run.curve.argmax() {
        out.push_str(&format!(
            "\nLikelihood grid: {} points on [{}, {}] | argmax theta={theta:.6} ll={ll:.3}\n",
            run.curve.points.len(),
            config.grid.start,
            config.grid.stop,
        ));
    }

    out
}

/// Format a convergence sweep as a table (one row per sample size).
pub fn format_sweep(rows: &[SweepRow], config: &SweepConfig) -> String {
    let mut out = String::new();

    out.push_str(&format!(
        "Convergence sweep: theta={} | seeds per size={} (from {})\n",
        config.theta_true, config.seeds, config.base_seed
    ));
    out.push_str("Mean absolute error of theta:\n");
    out.push_str(
        format!(
            "{:>10} {:>6} {:>12} {:>12} {:>12}",
            "n", "runs", "mom", "mle_closed", "mle_numeric"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(format!("{:-<10} {:-<6} {:-<12} {:-<12} {:-<12}", "", "", "", "", "").trim_end());
    out.push('\n');

    for r in rows {
        out.push_str(&format!(
            "{:>10} {:>6} {:>12.6} {:>12.6} {:>12.6}\n",
            r.sample_count, r.runs, r.mom_mae, r.closed_form_mae, r.numerical_mae
        ));
    }

    out
}

fn estimate_header() -> String {
    let mut out = String::new();
    out.push_str(format!("{:<24} {:>12} {:>12} {:>12}", "estimator", "theta", "alpha", "abs_err").trim_end());
    out.push('\n');
    out.push_str(format!("{:-<24} {:-<12} {:-<12} {:-<12}", "", "", "", "").trim_end());
    out.push('\n');
    out
}

fn estimate_row(label: &str, est: &Estimate, theta_true: f64) -> String {
    format!(
        "{:<24} {:>12.6} {:>12.6} {:>12.6}\n",
        truncate(label, 24),
        est.theta,
        est.alpha,
        (est.theta - theta_true).abs()
    )
}

fn sampler_label(config: &RunConfig) -> &'static str {
    match config.sampler {
        crate::domain::SamplerKind::Random => "random",
        crate::domain::SamplerKind::Quantile => "quantile",
        crate::domain::SamplerKind::Mt19937 => "mt19937",
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{GradientMode, LineSearchKind, OptimMethod, SamplerKind};

    #[test]
    fn truncate_keeps_short_and_marks_long() {
        assert_eq!(truncate("abc", 5), "abc");
        assert_eq!(truncate("abcdefgh", 5), "abcd.");
    }

    #[test]
    fn estimate_row_layout() {
        let est = Estimate { theta: 3.0272, alpha: 1.0 / 3.0272 };
        let row = estimate_row("closed-form MLE", &est, 3.0);
        assert!(row.starts_with("closed-form MLE "));
        assert!(row.contains("3.027200"));
        assert!(row.contains("0.027200"));
        assert!(row.ends_with('\n'));
    }

    #[test]
    fn sweep_table_snapshot() {
        let config = SweepConfig {
            theta_true: 3.0,
            sizes: vec![100, 1000],
            seeds: 2,
            base_seed: 5,
            sampler: SamplerKind::Random,
            theta0: 4.0,
            method: OptimMethod::Bfgs,
            line_search: LineSearchKind::MoreThuente,
            gradient: GradientMode::Analytic,
            max_iter: 100,
        };
        let rows = vec![
            SweepRow { sample_count: 100, runs: 2, mom_mae: 0.5, closed_form_mae: 0.25, numerical_mae: 0.25 },
            SweepRow { sample_count: 1000, runs: 2, mom_mae: 0.125, closed_form_mae: 0.0625, numerical_mae: 0.0625 },
        ];
        let txt = format_sweep(&rows, &config);
        let expected = concat!(
            "Convergence sweep: theta=3 | seeds per size=2 (from 5)\n",
            "Mean absolute error of theta:\n",
            "         n   runs          mom   mle_closed  mle_numeric\n",
            "---------- ------ ------------ ------------ ------------\n",
            "       100      2     0.500000     0.250000     0.250000\n",
            "      1000      2     0.125000     0.062500     0.062500\n",
        );
        assert_eq!(txt, expected);
    }
}
