use anyhow::Result;
use landgen_analysis::analysis::{DistanceSummary, IsolationResult};
use serde_json::json;

use crate::config::AnalysisConfig;

pub fn print_config(config: &AnalysisConfig, seed: u64) {
    println!("\n📋 Analysis Configuration");
    println!(
        "  • Database: {} (species {}) [-d, --database]",
        config.model.database.display(),
        config.model.species
    );
    println!("  • Burn-in: {} steps [--burn-in]", config.burn_in);
    println!("  • Timesteps: {} [-T, --timesteps]", config.timesteps);
    println!("  • Sample Size: {} [-n, --sample-size]", config.sample_size);
    if config.seed.is_some() {
        println!("  • Random Seed: {seed} [--seed]");
    } else {
        println!("  • Random Seed: {seed} (random) [--seed]");
    }
    println!("  • Environment Layers: {:?} [--env-layers]", config.env_layers);

    println!("\n📈 Regression");
    println!(
        "  • Intercept: {} [--intercept]",
        if config.intercept { "included" } else { "none" }
    );
    println!("  • Alpha: {} [--alpha]", config.alpha);
    println!(
        "  • Newton Iterations: {} (tol {:.0e}) [--max-iter, --tol]",
        config.max_iter, config.tol
    );
    println!();
}

fn format_summary(label: &str, s: &DistanceSummary) -> String {
    format!(
        "{label:<14} min {:>9.4}  max {:>9.4}  mean {:>9.4}  median {:>9.4}  sd {:>9.4}\n",
        s.min, s.max, s.mean, s.median, s.std_dev
    )
}

/// Render a run summary as pretty text.
pub fn pretty_summary(result: &IsolationResult, sample_size: usize, alpha: f64) -> String {
    let fit = &result.fit;
    let mut out = String::new();
    out.push_str("\n📊 IBD/IBE Summary\n");
    out.push_str("================================\n");
    out.push_str(&format!("Timestep: {}\n", result.timestep));
    out.push_str(&format!("Individuals sampled: {sample_size}\n"));
    out.push_str(&format!("Pairs compared: {}\n", result.n_pairs()));
    out.push_str("\nDistances:\n------------------\n");
    out.push_str(&format_summary("genetic", &result.gen_summary()));
    out.push_str(&format_summary("geographic", &result.geo_summary()));
    out.push_str(&format_summary("environmental", &result.env_summary()));
    out.push_str("\nLogit Regression:\n------------------\n");
    out.push_str(&format!(
        "{:<8} {:>10} {:>10} {:>9} {:>10}\n",
        "", "coef", "std err", "z", "P>|z|"
    ));
    for (i, name) in fit.names.iter().enumerate() {
        out.push_str(&format!(
            "{:<8} {:>10.4} {:>10.4} {:>9.3} {:>10.2e}\n",
            name, fit.params[i], fit.bse[i], fit.zvalues[i], fit.pvalues[i]
        ));
    }
    out.push_str(&format!("Pseudo-R²: {:.4}\n", fit.prsquared));
    out.push_str(&format!(
        "Log-likelihood: {:.4} (null {:.4})\n",
        fit.llf, fit.llnull
    ));
    out.push_str(&format!("Iterations: {}\n", fit.iterations));
    out.push_str(&format!("Significance threshold: {alpha}\n"));
    out
}

/// Render a run summary as JSON.
pub fn json_summary(result: &IsolationResult, sample_size: usize, alpha: f64) -> Result<String> {
    Ok(serde_json::to_string_pretty(&json!({
        "timestep": result.timestep,
        "sample_size": sample_size,
        "pairs": result.n_pairs(),
        "alpha": alpha,
        "distances": {
            "genetic": result.gen_summary(),
            "geographic": result.geo_summary(),
            "environmental": result.env_summary(),
        },
        "regression": result.fit,
    }))?)
}
