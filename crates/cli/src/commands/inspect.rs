use anyhow::{Context, Result};
use landgen_sim::storage::QueryBuilder;
use std::path::Path;

pub fn show_info(database: &Path) -> Result<()> {
    let query = QueryBuilder::new(database).context("Failed to open database")?;
    let run = query
        .get_run_metadata()
        .context("Failed to get run metadata")?;

    println!("\n📊 Run Information");
    println!("{}", "=".repeat(50));
    match &run {
        Some(meta) => {
            println!("Name: {}", meta.name);
            println!(
                "Burn-in: {}",
                if meta.burn_in_complete { "complete" } else { "not recorded" }
            );
            if let Some(steps) = meta.burn_in_steps {
                println!("Burn-in steps: {steps}");
            }
        }
        None => println!("No run metadata recorded."),
    }

    match query.get_landscape().context("Failed to load landscape")? {
        Some(land) => {
            println!("\n🗺️  Landscape: {} x {}", land.rows(), land.cols());
            for (idx, layer) in land.layers().iter().enumerate() {
                println!("  • Layer {idx}: {}", layer.name());
            }
        }
        None => println!("\n🗺️  No landscape recorded."),
    }

    let stats = query.stats().context("Failed to get database stats")?;
    println!(
        "\n💾 Records: {} individuals, {} layers",
        stats.individual_records, stats.landscape_layers
    );

    let species_ids = query
        .get_species_ids()
        .context("Failed to get species")?;
    if species_ids.is_empty() {
        println!("\nNo recorded timesteps found.");
    }
    for species in species_ids {
        let steps = query
            .get_recorded_timesteps(species)
            .context("Failed to get timesteps")?;
        println!("\n📈 Species {species}: {} snapshots", steps.len());
        println!("Timesteps: {steps:?}");
    }

    if let Some(meta) = run
        && !meta.parameters.is_null()
    {
        let params_json = serde_json::to_string_pretty(&meta.parameters)?;
        println!("\nParameters:");
        println!("{params_json}");
    }

    Ok(())
}
