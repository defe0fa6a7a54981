//! SVG rendering of an IBD/IBE run.
//!
//! Every drawing function receives the [`DrawingArea`] it draws on, so
//! figures can be rendered to files or to in-memory strings alike.

use anyhow::Result;
use landgen_analysis::analysis::{
    IsolationResult, extract_features, normalize_columns, pca, speciome,
};
use landgen_sim::simulation::{Landscape, Species};
use plotters::coord::Shift;
use plotters::prelude::*;
use std::path::{Path, PathBuf};

type Area<'a> = DrawingArea<SVGBackend<'a>, Shift>;

const FIGURE_SIZE: (u32, u32) = (900, 1200);
const FIGURE_3D_SIZE: (u32, u32) = (800, 700);
const FIT_COLOR: RGBColor = RGBColor(0xC3, 0x3B, 0x3B);
const MASK_COLOR: RGBColor = RGBColor(0x8C, 0x8C, 0x8C);
const MARK_SIZE: i32 = 4;
const CURVE_POINTS: usize = 501;
const SURFACE_STEPS: usize = 30;

/// Red-blue diverging stops, blue at 0.
const RDBU_R: [(f64, f64, f64); 5] = [
    (0.020, 0.188, 0.380),
    (0.573, 0.773, 0.871),
    (0.969, 0.969, 0.969),
    (0.957, 0.647, 0.510),
    (0.404, 0.000, 0.122),
];

/// Plasma-like sequential stops.
const PLASMA: [(f64, f64, f64); 4] = [
    (0.051, 0.031, 0.529),
    (0.612, 0.090, 0.620),
    (0.929, 0.475, 0.325),
    (0.941, 0.976, 0.129),
];

/// An individual drawn on a map.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapPoint {
    pub x: f64,
    pub y: f64,
    pub color: RGBColor,
}

/// One map panel: individuals over the environment raster.
#[derive(Debug, Clone)]
pub struct MapPanel {
    pub title: String,
    pub points: Vec<MapPoint>,
}

/// Data behind the main figure.
pub struct Figure<'a> {
    pub landscape: &'a Landscape,
    /// Layer drawn as the map background
    pub env_layer: usize,
    /// Cells where this layer is zero are greyed out
    pub mask_layer: Option<usize>,
    pub pca_before: MapPanel,
    pub phenotype_before: MapPanel,
    pub pca_after: MapPanel,
    pub phenotype_after: MapPanel,
    pub result: &'a IsolationResult,
}

fn interpolate(stops: &[(f64, f64, f64)], t: f64) -> RGBColor {
    let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.5 };
    let scaled = t * (stops.len() - 1) as f64;
    let idx = (scaled.floor() as usize).min(stops.len() - 2);
    let frac = scaled - idx as f64;
    let (a, b) = (stops[idx], stops[idx + 1]);
    let channel = |from: f64, to: f64| ((from + (to - from) * frac) * 255.0).round() as u8;
    RGBColor(channel(a.0, b.0), channel(a.1, b.1), channel(a.2, b.2))
}

/// Diverging colour for a value in `[0, 1]`.
pub fn diverging(t: f64) -> RGBColor {
    interpolate(&RDBU_R, t)
}

/// Sequential colour for a value in `[0, 1]`.
pub fn sequential(t: f64) -> RGBColor {
    interpolate(&PLASMA, t)
}

/// Colour individuals by their leading genetic principal components.
///
/// The first three components, min-max scaled, give the red, green and blue
/// channels; missing components leave their channel at zero.
pub fn genetic_pca_points(species: &Species, n_pcs: usize) -> Result<Vec<MapPoint>> {
    if species.is_empty() {
        return Ok(Vec::new());
    }
    let features = extract_features(species, &[])?;
    let scores = pca(&speciome(&features.genotypes), Some(n_pcs))?.scores;
    let colors = normalize_columns(&scores);
    let channel = |i: usize, c: usize| {
        if c < colors.ncols() {
            (colors[(i, c)] * 255.0).round() as u8
        } else {
            0
        }
    };

    Ok(species
        .iter()
        .enumerate()
        .map(|(i, ind)| MapPoint {
            x: ind.x(),
            y: ind.y(),
            color: RGBColor(channel(i, 0), channel(i, 1), channel(i, 2)),
        })
        .collect())
}

/// Colour individuals by one phenotype trait; missing values are grey.
pub fn phenotype_points(species: &Species, trait_idx: usize) -> Vec<MapPoint> {
    species
        .iter()
        .map(|ind| MapPoint {
            x: ind.x(),
            y: ind.y(),
            color: ind.trait_value(trait_idx).map_or(MASK_COLOR, diverging),
        })
        .collect()
}

/// Path of the 3-D plot written next to `output`.
pub fn companion_path(output: &Path) -> PathBuf {
    let stem = output
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "figure".to_string());
    output.with_file_name(format!("{stem}_3d.svg"))
}

/// Write the main figure to `path` and the 3-D plot next to it.
///
/// Returns the path of the 3-D plot.
pub fn render(figure: &Figure<'_>, path: &Path) -> Result<PathBuf> {
    {
        let root = SVGBackend::new(path, FIGURE_SIZE).into_drawing_area();
        draw_figure(&root, figure)?;
    }
    let path_3d = companion_path(path);
    {
        let root = SVGBackend::new(&path_3d, FIGURE_3D_SIZE).into_drawing_area();
        draw_3d(&root, figure.result)?;
    }
    Ok(path_3d)
}

/// Draw maps before and after evolution above the IBD and IBE panels.
pub fn draw_figure(root: &Area<'_>, figure: &Figure<'_>) -> Result<()> {
    root.fill(&WHITE)?;
    let (_, height) = root.dim_in_pixel();
    let (maps, fits) = root.split_vertically(height * 2 / 3);

    let panels = [
        &figure.pca_before,
        &figure.phenotype_before,
        &figure.pca_after,
        &figure.phenotype_after,
    ];
    for (area, panel) in maps.split_evenly((2, 2)).iter().zip(panels) {
        draw_map(area, figure, panel)?;
    }

    let result = figure.result;
    let geo_max = axis_max(&result.geo_dists);
    let env_max = axis_max(&result.env_dists);
    let rows: Vec<[f64; 2]> = (0..CURVE_POINTS)
        .map(|i| {
            let t = i as f64 / (CURVE_POINTS - 1) as f64;
            [t * geo_max, t * env_max]
        })
        .collect();
    let predicted = result.fit.predict(&rows)?;

    let fit_areas = fits.split_evenly((1, 2));
    draw_fit_panel(
        &fit_areas[0],
        result,
        FitPanel {
            title: "IBD",
            x_desc: "geographic distance",
            coefficient: "geo",
            xs: &result.geo_dists,
            x_max: geo_max,
            curve: rows.iter().map(|r| r[0]).zip(predicted.iter().copied()).collect(),
        },
    )?;
    draw_fit_panel(
        &fit_areas[1],
        result,
        FitPanel {
            title: "IBE",
            x_desc: "environmental distance",
            coefficient: "env",
            xs: &result.env_dists,
            x_max: env_max,
            curve: rows.iter().map(|r| r[1]).zip(predicted.iter().copied()).collect(),
        },
    )?;

    root.present()?;
    Ok(())
}

fn axis_max(values: &[f64]) -> f64 {
    let max = values.iter().copied().fold(0.0_f64, f64::max);
    if max > 0.0 { max * 1.05 } else { 1.0 }
}

fn draw_map(area: &Area<'_>, figure: &Figure<'_>, panel: &MapPanel) -> Result<()> {
    let land = figure.landscape;
    let mut chart = ChartBuilder::on(area)
        .caption(&panel.title, ("sans-serif", 16))
        .margin(8)
        .build_cartesian_2d(0.0..(land.cols().max(1) as f64), 0.0..(land.rows().max(1) as f64))?;

    let cells = (0..land.rows()).flat_map(|r| (0..land.cols()).map(move |c| (r, c)));
    chart.draw_series(cells.map(|(r, c)| {
        let masked = figure
            .mask_layer
            .and_then(|m| land.value(m, r, c))
            .is_some_and(|v| v == 0.0);
        let color = if masked {
            MASK_COLOR
        } else {
            land.value(figure.env_layer, r, c)
                .map_or(MASK_COLOR, diverging)
        };
        let (x, y) = (c as f64, r as f64);
        Rectangle::new([(x, y), (x + 1.0, y + 1.0)], color.filled())
    }))?;

    chart.draw_series(
        panel
            .points
            .iter()
            .map(|p| Circle::new((p.x, p.y), MARK_SIZE, p.color.filled())),
    )?;
    chart.draw_series(
        panel
            .points
            .iter()
            .map(|p| Circle::new((p.x, p.y), MARK_SIZE, BLACK.stroke_width(1))),
    )?;
    Ok(())
}

struct FitPanel<'a> {
    title: &'a str,
    x_desc: &'a str,
    coefficient: &'a str,
    xs: &'a [f64],
    x_max: f64,
    curve: Vec<(f64, f64)>,
}

fn draw_fit_panel(area: &Area<'_>, result: &IsolationResult, panel: FitPanel<'_>) -> Result<()> {
    let mut chart = ChartBuilder::on(area)
        .caption(panel.title, ("sans-serif", 18))
        .margin(10)
        .x_label_area_size(35)
        .y_label_area_size(45)
        .build_cartesian_2d(0.0..panel.x_max, 0.0..1.0)?;

    chart
        .configure_mesh()
        .disable_mesh()
        .x_desc(panel.x_desc)
        .y_desc("rescaled genetic distance")
        .draw()?;

    chart.draw_series(
        panel
            .xs
            .iter()
            .zip(&result.scaled_gen_dists)
            .map(|(&x, &y)| Circle::new((x, y), 1, BLACK.mix(0.05).filled())),
    )?;
    chart.draw_series(LineSeries::new(panel.curve, FIT_COLOR.stroke_width(2)))?;

    let x_min = panel.xs.iter().copied().fold(f64::INFINITY, f64::min);
    let x_min = if x_min.is_finite() { x_min } else { 0.0 };
    let text_x = x_min + 0.6 * (panel.x_max - x_min);
    let style = TextStyle::from(("sans-serif", 12).into_font()).color(&FIT_COLOR);

    let mut labels = vec![(0.45, format!("Pseudo-R²: {:.4}", result.fit.prsquared))];
    if let Some(coef) = result.fit.coefficient(panel.coefficient) {
        labels.push((0.2, format!("slope: {:.4}", coef.estimate)));
        labels.push((0.05, format!("p-value: {:.2e}", coef.p_value)));
    }
    chart.draw_series(
        labels
            .into_iter()
            .map(|(y, text)| Text::new(text, (text_x, y), style.clone())),
    )?;
    Ok(())
}

/// Draw the pairwise distances in (geo, gen, env) space with the fitted surface.
pub fn draw_3d(root: &Area<'_>, result: &IsolationResult) -> Result<()> {
    root.fill(&WHITE)?;
    let geo_max = axis_max(&result.geo_dists);
    let env_max = axis_max(&result.env_dists);

    let mut chart = ChartBuilder::on(root)
        .caption("gen ~ geo + env (x: geo, y: gen, z: env)", ("sans-serif", 18))
        .margin(20)
        .build_cartesian_3d(0.0..geo_max, 0.0..1.0, 0.0..env_max)?;
    chart.with_projection(|mut pb| {
        pb.yaw = 0.6;
        pb.pitch = 0.25;
        pb.scale = 0.85;
        pb.into_matrix()
    });
    chart.configure_axes().draw()?;

    chart.draw_series(
        result
            .geo_dists
            .iter()
            .zip(&result.env_dists)
            .zip(&result.scaled_gen_dists)
            .map(|((&g, &e), &y)| {
                let shade = sequential((g / geo_max + e / env_max) / 2.0);
                Circle::new((g, y, e), 2, shade.mix(0.5).filled())
            }),
    )?;

    // Fails early if the fit does not take exactly (geo, env).
    result.fit.predict(&[[0.0, 0.0]])?;
    let steps = |max: f64| (0..=SURFACE_STEPS).map(move |i| max * i as f64 / SURFACE_STEPS as f64);
    chart.draw_series(
        SurfaceSeries::xoz(steps(geo_max), steps(env_max), |g, e| {
            result.fit.predict(&[[g, e]]).map_or(0.0, |v| v[0])
        })
        .style(BLACK.mix(0.2).filled()),
    )?;

    root.present()?;
    Ok(())
}
