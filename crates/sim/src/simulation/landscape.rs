//! Raster landscape on which individuals live.

use crate::errors::SnapshotError;

/// One named raster layer, stored row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    name: String,
    raster: Vec<f64>,
}

impl Layer {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Row-major cell values.
    pub fn raster(&self) -> &[f64] {
        &self.raster
    }
}

/// A `rows × cols` grid of unit cells carrying one or more raster layers.
///
/// Cell `(row, col)` covers `x ∈ [col, col + 1)` and `y ∈ [row, row + 1)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Landscape {
    rows: usize,
    cols: usize,
    layers: Vec<Layer>,
}

impl Landscape {
    /// Create an empty landscape with the given grid dimensions.
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            layers: Vec::new(),
        }
    }

    /// Append a layer. The raster must hold exactly `rows * cols` values.
    pub fn add_layer(
        &mut self,
        name: impl Into<String>,
        raster: Vec<f64>,
    ) -> Result<(), SnapshotError> {
        let name = name.into();
        let expected = self.rows * self.cols;
        if raster.len() != expected {
            return Err(SnapshotError::RasterShape {
                layer: name,
                expected,
                actual: raster.len(),
            });
        }
        self.layers.push(Layer { name, raster });
        Ok(())
    }

    /// Builder-style variant of [`Landscape::add_layer`].
    pub fn with_layer(
        mut self,
        name: impl Into<String>,
        raster: Vec<f64>,
    ) -> Result<Self, SnapshotError> {
        self.add_layer(name, raster)?;
        Ok(self)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn n_layers(&self) -> usize {
        self.layers.len()
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn layer(&self, idx: usize) -> Option<&Layer> {
        self.layers.get(idx)
    }

    /// Value of `layer` at `(row, col)`.
    pub fn value(&self, layer: usize, row: usize, col: usize) -> Option<f64> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        self.layers
            .get(layer)
            .map(|l| l.raster[row * self.cols + col])
    }

    /// Spatial extent as `((x_min, x_max), (y_min, y_max))`.
    pub fn extent(&self) -> ((f64, f64), (f64, f64)) {
        ((0.0, self.cols as f64), (0.0, self.rows as f64))
    }

    /// Cell edges along the x axis (`cols + 1` values).
    pub fn cell_bounds_x(&self) -> Vec<f64> {
        (0..=self.cols).map(|c| c as f64).collect()
    }

    /// Cell edges along the y axis (`rows + 1` values).
    pub fn cell_bounds_y(&self) -> Vec<f64> {
        (0..=self.rows).map(|r| r as f64).collect()
    }

    /// Whether `(x, y)` falls inside the landscape.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        let ((x0, x1), (y0, y1)) = self.extent();
        x >= x0 && x <= x1 && y >= y0 && y <= y1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient(rows: usize, cols: usize) -> Vec<f64> {
        (0..rows)
            .flat_map(|_| (0..cols).map(move |c| c as f64 / (cols - 1) as f64))
            .collect()
    }

    #[test]
    fn test_landscape_layers() {
        let land = Landscape::new(3, 4)
            .with_layer("env", gradient(3, 4))
            .unwrap()
            .with_layer("barrier", vec![1.0; 12])
            .unwrap();

        assert_eq!(land.n_layers(), 2);
        assert_eq!(land.layer(0).map(|l| l.name()), Some("env"));
        assert_eq!(land.value(0, 2, 3), Some(1.0));
        assert_eq!(land.value(0, 0, 0), Some(0.0));
        assert_eq!(land.value(1, 1, 1), Some(1.0));
        assert_eq!(land.value(2, 0, 0), None);
        assert_eq!(land.value(0, 3, 0), None);
    }

    #[test]
    fn test_landscape_rejects_bad_raster() {
        let mut land = Landscape::new(2, 2);
        let err = land.add_layer("env", vec![0.0; 3]).unwrap_err();
        assert!(matches!(
            err,
            SnapshotError::RasterShape {
                expected: 4,
                actual: 3,
                ..
            }
        ));
    }

    #[test]
    fn test_landscape_bounds() {
        let land = Landscape::new(2, 3);
        assert_eq!(land.cell_bounds_x(), vec![0.0, 1.0, 2.0, 3.0]);
        assert_eq!(land.cell_bounds_y(), vec![0.0, 1.0, 2.0]);
        assert_eq!(land.extent(), ((0.0, 3.0), (0.0, 2.0)));
        assert!(land.contains(2.5, 1.5));
        assert!(!land.contains(3.5, 1.0));
    }
}
