use anyhow::{Context, Result};
use landgen_analysis::analysis::IsolationAnalysis;
use landgen_sim::simulation::{Model, RecordedModel, WalkMode};
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;
use tracing::{info, warn};

use crate::args::{AnalyzeArgs, SummaryFormat};
use crate::config::AnalysisConfig;
use crate::printing::{json_summary, pretty_summary, print_config};
use crate::render::{self, Figure, MapPanel};

pub fn run_analysis(args: &AnalyzeArgs) -> Result<()> {
    let config = AnalysisConfig::resolve(args)?;
    let seed = config.seed.unwrap_or_else(|| rand::rng().random());
    // JSON on stdout stays machine-readable
    let chatty = args.format == SummaryFormat::Pretty || args.summary.is_some();

    if chatty {
        println!("🔬 Analyzing isolation by distance and environment");
        print_config(&config, seed);
    }
    info!(seed, database = %config.model.database.display(), "starting analysis");

    let mut model = RecordedModel::from_params(&config.model).with_context(|| {
        format!("Failed to open model from {}", config.model.database.display())
    })?;

    model
        .walk(config.burn_in, WalkMode::Burn)
        .context("Burn-in failed")?;
    let before = model.species().clone();
    if chatty {
        println!(
            "✓ Burn-in complete: {} individuals at timestep {}",
            before.size(),
            model.timestep()
        );
    }

    model
        .walk(config.timesteps, WalkMode::Main)
        .context("Main phase failed")?;
    let after = model.species();
    if chatty {
        println!(
            "✓ Walked {} timesteps: {} individuals at timestep {}",
            config.timesteps,
            after.size(),
            model.timestep()
        );
    }

    if after.size() < config.sample_size {
        warn!(
            requested = config.sample_size,
            available = after.size(),
            "population smaller than sample size, analyzing every individual"
        );
    }
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
    let sample = after.sample(&mut rng, config.sample_size);

    let result = IsolationAnalysis::new(config.isolation())
        .run(&sample)
        .context("Isolation analysis failed")?;
    let p_value = result
        .check_significance(config.alpha)
        .context("Isolation by distance not detected")?;
    if chatty {
        println!("✓ Geographic coefficient significant (p = {p_value:.2e})");
    }

    if !args.no_plot {
        let figure = Figure {
            landscape: model.landscape(),
            env_layer: config.env_layers[0],
            mask_layer: config.mask_layer,
            pca_before: MapPanel {
                title: "genetic PCA, before".to_string(),
                points: render::genetic_pca_points(&before, config.visual_pcs)?,
            },
            phenotype_before: MapPanel {
                title: "phenotype, before".to_string(),
                points: render::phenotype_points(&before, config.phenotype_trait),
            },
            pca_after: MapPanel {
                title: "genetic PCA, after".to_string(),
                points: render::genetic_pca_points(after, config.visual_pcs)?,
            },
            phenotype_after: MapPanel {
                title: "phenotype, after".to_string(),
                points: render::phenotype_points(after, config.phenotype_trait),
            },
            result: &result,
        };
        let path_3d = render::render(&figure, &config.output)
            .with_context(|| format!("Failed to render {}", config.output.display()))?;
        if chatty {
            println!("✓ Figure written to: {}", config.output.display());
            println!("✓ 3-D plot written to: {}", path_3d.display());
        }
    }

    let content = match args.format {
        SummaryFormat::Pretty => pretty_summary(&result, sample.size(), config.alpha),
        SummaryFormat::Json => json_summary(&result, sample.size(), config.alpha)?,
    };

    if let Some(path) = &args.summary {
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write summary to {}", path.display()))?;
        println!("✓ Summary written to: {}", path.display());
    } else {
        println!("{content}");
    }

    Ok(())
}
