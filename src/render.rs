//! Drawing of occupancy-grid frames.

use crate::{CellCode, Frame, ScenarioConfig};
use anyhow::{Context, Result};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::path::Path;

/// How many rows nearest the origin each panel shows by default.
const MAX_DISPLAY_ROWS: usize = 20;

/// Pixel size of one per-timestep panel.
const PANEL_WIDTH: u32 = 200;
const PANEL_HEIGHT: u32 = 800;

/// Fill colors for each cell code. The renderer treats this as data and
/// hard-codes no presentation choices of its own.
#[derive(Clone, Copy, Debug)]
pub struct ColorMap {
    pub empty: RGBColor,
    pub ov: RGBColor,
    pub emv: RGBColor,
    pub conflict: RGBColor,
}

impl ColorMap {
    fn color(&self, code: CellCode) -> RGBColor {
        match code {
            CellCode::Empty => self.empty,
            CellCode::Ov => self.ov,
            CellCode::Emv => self.emv,
            CellCode::Conflict => self.conflict,
        }
    }
}

impl Default for ColorMap {
    /// White roadway, black OVs, red EMVs, orange conflicts.
    fn default() -> Self {
        Self {
            empty: WHITE,
            ov: BLACK,
            emv: RED,
            conflict: RGBColor(255, 165, 0),
        }
    }
}

/// Draws frame sequences as horizontal strips of per-timestep panels.
pub struct GridRenderer {
    colors: ColorMap,
    aspect: f64,
    max_disp: usize,
}

impl GridRenderer {
    /// Creates a renderer with the scenario's cell aspect ratio and the
    /// given color table.
    pub fn new(config: &ScenarioConfig, colors: ColorMap) -> Self {
        Self {
            colors,
            aspect: config.cell_aspect(),
            max_disp: MAX_DISPLAY_ROWS,
        }
    }

    /// Limits each panel to the `rows` cells nearest the origin.
    pub fn max_display_rows(mut self, rows: usize) -> Self {
        self.max_disp = rows;
        self
    }

    /// Renders the frames side by side into a PNG at `path`.
    pub fn render_strip(&self, frames: &[Frame], path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if frames.is_empty() {
            log::warn!("no frames to render, skipping {}", path.display());
            return Ok(());
        }

        let width = PANEL_WIDTH * frames.len() as u32;
        let root = BitMapBackend::new(path, (width, PANEL_HEIGHT)).into_drawing_area();
        root.fill(&WHITE).context("clearing the drawing area")?;

        let panels = root.split_evenly((1, frames.len()));
        for (frame, panel) in frames.iter().zip(panels) {
            self.draw_panel(frame, panel)
                .with_context(|| format!("drawing frame t={}", frame.time))?;
        }

        root.present()
            .with_context(|| format!("writing {}", path.display()))?;
        log::info!("wrote {} frames to {}", frames.len(), path.display());
        Ok(())
    }

    /// Draws one timestep: the windowed cell matrix plus its labels.
    fn draw_panel(&self, frame: &Frame, panel: DrawingArea<BitMapBackend, Shift>) -> Result<()> {
        let panel = panel.titled(&format!("t={}", frame.time), ("sans-serif", 18))?;

        let rows = frame.grid.rows();
        let lanes = frame.grid.lanes();
        let shown = rows.min(self.max_disp);
        let first_row = rows - shown;

        let (panel_width, panel_height) = panel.dim_in_pixel();
        let cell_width = panel_width as i32 / lanes as i32;
        let fit_height = (panel_height as i32 / shown.max(1) as i32).max(1);
        let cell_height = ((cell_width as f64 * self.aspect).round() as i32).clamp(1, fit_height);

        for row in 0..shown {
            for col in 0..lanes {
                let code = frame.grid.code_at(first_row + row, col);
                let x0 = col as i32 * cell_width;
                let y0 = row as i32 * cell_height;
                let corners = [(x0, y0), (x0 + cell_width, y0 + cell_height)];
                panel.draw(&Rectangle::new(corners, self.colors.color(code).filled()))?;
                panel.draw(&Rectangle::new(corners, &BLACK))?;
            }
        }

        let text_style = TextStyle::from(("sans-serif", 10).into_font())
            .color(&WHITE)
            .pos(Pos::new(HPos::Center, VPos::Center));
        for label in &frame.labels {
            let (row, col) = frame.grid.locate(label.position, label.lane);
            if row < first_row {
                continue;
            }
            let x = col as i32 * cell_width + cell_width / 2;
            let y = (row - first_row) as i32 * cell_height + cell_height / 2;
            panel.draw(&Text::new(label.text.clone(), (x, y), text_style.clone()))?;
        }

        Ok(())
    }
}
