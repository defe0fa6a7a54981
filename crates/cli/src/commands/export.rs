use anyhow::{Context, Result};
use landgen_analysis::analysis::{
    DistanceKind, DistanceLayout, calc_dists, extract_features, normalize_by_max, pair_indices,
};
use landgen_sim::simulation::Species;
use landgen_sim::storage::QueryBuilder;
use std::fmt::Write;

use crate::args::{ExportArgs, ExportKind};

pub fn export_distances(args: &ExportArgs) -> Result<()> {
    let query = QueryBuilder::new(&args.database).context("Failed to open database")?;
    let steps = query
        .get_recorded_timesteps(args.species)
        .context("Failed to get timesteps")?;
    let timestep = match args.timestep {
        Some(t) if steps.contains(&t) => t,
        Some(t) => anyhow::bail!("Timestep {t} not recorded for species {}", args.species),
        None => *steps
            .last()
            .with_context(|| format!("No recorded timesteps for species {}", args.species))?,
    };

    if args.output.is_some() {
        println!("📤 Exporting distances for species {}", args.species);
        println!("Timestep: {timestep}, Kind: {:?}", args.kind);
    }

    let individuals = query
        .get_timestep(args.species, timestep)
        .context("Failed to load timestep")?
        .into_iter()
        .map(|row| row.into_individual())
        .collect::<Result<Vec<_>, _>>()
        .context("Malformed snapshot")?;
    let species = Species::new(format!("spp{}", args.species), timestep, individuals)?;

    let content = if args.matrix {
        matrix_csv(&species, args)?
    } else {
        pairs_csv(&species, args)?
    };

    if let Some(path) = &args.output {
        std::fs::write(path, content)?;
        println!("✓ Data exported to: {}", path.display());
    } else {
        print!("{content}");
    }

    Ok(())
}

fn single_kind(kind: ExportKind) -> Option<DistanceKind> {
    match kind {
        ExportKind::Genetic => Some(DistanceKind::Genetic),
        ExportKind::Geographic => Some(DistanceKind::Geographic),
        ExportKind::Environmental => Some(DistanceKind::Environmental),
        ExportKind::All => None,
    }
}

fn matrix_csv(species: &Species, args: &ExportArgs) -> Result<String> {
    let kind = single_kind(args.kind)
        .context("--matrix needs a single distance kind (genetic, geographic or environmental)")?;
    let features = extract_features(species, &args.env_layers)?;
    let distances = calc_dists(&features, kind, DistanceLayout::Full)?;
    let matrix = distances
        .as_matrix()
        .context("Expected a full distance matrix")?;

    let mut csv = String::from("id");
    for id in &features.ids {
        write!(csv, ",{id}")?;
    }
    csv.push('\n');
    for (i, id) in features.ids.iter().enumerate() {
        write!(csv, "{id}")?;
        for j in 0..features.len() {
            write!(csv, ",{}", matrix[(i, j)])?;
        }
        csv.push('\n');
    }
    Ok(csv)
}

fn pairs_csv(species: &Species, args: &ExportArgs) -> Result<String> {
    let features = extract_features(species, &args.env_layers)?;
    let flat = |kind| -> Result<Vec<f64>> {
        Ok(calc_dists(&features, kind, DistanceLayout::Flat)?.into_flat())
    };

    let columns: Vec<(String, Vec<f64>)> = match single_kind(args.kind) {
        Some(kind) => vec![(kind.to_string(), flat(kind)?)],
        None => {
            let genetic = flat(DistanceKind::Genetic)?;
            let scaled = normalize_by_max(&genetic)?;
            vec![
                (DistanceKind::Genetic.to_string(), genetic),
                (format!("scaled_{}", DistanceKind::Genetic), scaled),
                (
                    DistanceKind::Geographic.to_string(),
                    flat(DistanceKind::Geographic)?,
                ),
                (
                    DistanceKind::Environmental.to_string(),
                    flat(DistanceKind::Environmental)?,
                ),
            ]
        }
    };

    let mut csv = String::from("i,j,id_i,id_j");
    for (name, _) in &columns {
        write!(csv, ",{name}")?;
    }
    csv.push('\n');
    for (k, (i, j)) in pair_indices(features.len()).enumerate() {
        write!(csv, "{i},{j},{},{}", features.ids[i], features.ids[j])?;
        for (_, values) in &columns {
            write!(csv, ",{}", values[k])?;
        }
        csv.push('\n');
    }
    Ok(csv)
}
