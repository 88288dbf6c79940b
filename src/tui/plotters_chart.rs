//! Plotters-powered 3D launch chart widget for Ratatui.
//!
//! Axes: mass (x), distance (y, vertical), pull force (z). The fitted plane is
//! drawn as a coarse wireframe, trials and the prediction as colored dots.
//!
//! We render Plotters output into the Ratatui buffer using `plotters-ratatui-backend`.

use plotters::prelude::*;
use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

/// A point in chart space: (mass, distance, force).
pub type Point3 = (f64, f64, f64);

/// Render-only chart description; series and bounds are computed by the caller.
pub struct LaunchChart3d<'a> {
    /// Measured trials.
    pub trials: &'a [Point3],
    /// Polylines of the fitted plane (constant-mass and constant-distance cuts).
    pub wireframe: &'a [Vec<Point3>],
    pub prediction: Option<Point3>,
    pub mass_bounds: [f64; 2],
    pub distance_bounds: [f64; 2],
    pub force_bounds: [f64; 2],
}

impl<'a> Widget for LaunchChart3d<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width < 20 || area.height < 8 {
            buf.set_string(
                area.x,
                area.y,
                "Chart area too small (resize terminal).",
                Style::default().fg(Color::Yellow),
            );
            return;
        }

        let valid = |b: [f64; 2]| b[0].is_finite() && b[1].is_finite() && b[1] > b[0];
        if !(valid(self.mass_bounds) && valid(self.distance_bounds) && valid(self.force_bounds)) {
            return;
        }

        let [x0, x1] = self.mass_bounds;
        let [y0, y1] = self.distance_bounds;
        let [z0, z1] = self.force_bounds;

        let widget = widget_fn(move |root| {
            let mut chart = ChartBuilder::on(&root)
                .margin(1)
                .build_cartesian_3d(x0..x1, y0..y1, z0..z1)?;

            chart.with_projection(|mut pb| {
                pb.yaw = 0.6;
                pb.pitch = 0.25;
                pb.scale = 0.85;
                pb.into_matrix()
            });

            // Panels would paint over the terminal background.
            chart
                .configure_axes()
                .axis_panel_style(TRANSPARENT)
                .light_grid_style(RGBColor(80, 80, 80))
                .bold_grid_style(RGBColor(120, 120, 120))
                .max_light_lines(2)
                .label_style(("sans-serif", 10).into_font().color(&WHITE))
                .draw()?;

            let plane_color = RGBColor(0, 255, 255); // cyan
            let trial_color = RGBColor(255, 165, 0); // orange
            let prediction_color = RGBColor(255, 0, 0); // red

            for line in self.wireframe {
                chart.draw_series(LineSeries::new(line.iter().copied(), &plane_color))?;
            }

            // `Circle` radii are mis-scaled by the ratatui backend; single pixels
            // render as clean dots.
            chart.draw_series(self.trials.iter().map(|&p| Pixel::new(p, trial_color)))?;

            if let Some(p) = self.prediction {
                chart.draw_series(std::iter::once(Pixel::new(p, prediction_color)))?;
            }

            Ok(())
        });

        widget.render(area, buf);
    }
}
