use eframe::egui::{Align2, RichText, Ui, Vec2b};
use egui_plot::{Legend, Line, Plot, PlotPoint, PlotPoints, Points, Text};
use rusty_echem::figure::{Anchor, LineStyle};
use rusty_echem::format::reformat_ticks;

use crate::state::AppState;
use crate::ui::to_color32;

// ---------------------------------------------------------------------------
// Figure plot (central panel)
// ---------------------------------------------------------------------------

/// Render the current figure in the central panel.
pub fn figure_plot(ui: &mut Ui, state: &AppState) {
    let figure = match &state.figure {
        Some(fig) => fig,
        None => {
            ui.centered_and_justified(|ui: &mut Ui| {
                ui.heading("Open a dataset to plot it  (File → Open…)");
            });
            return;
        }
    };

    let mut plot = Plot::new("figure_plot")
        .x_axis_label(figure.x_label.as_str())
        .y_axis_label(figure.y_label.as_str())
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true);

    if figure.legend {
        plot = plot.legend(Legend::default());
    }
    // pinned axes stay at their limits; the rest follow the data
    if let Some((lo, hi)) = figure.view_bounds() {
        if figure.x_limits.is_some() {
            plot = plot.include_x(lo[0]).include_x(hi[0]);
        }
        if figure.y_limits.is_some() {
            plot = plot.include_y(lo[1]).include_y(hi[1]);
        }
    }
    plot = plot.auto_bounds(Vec2b::new(
        figure.x_limits.is_none(),
        figure.y_limits.is_none(),
    ));
    if figure.thousands_ticks {
        plot = plot
            .x_axis_formatter(|mark, _range| reformat_ticks(mark.value))
            .y_axis_formatter(|mark, _range| reformat_ticks(mark.value));
    }

    plot.show(ui, |plot_ui| {
        for spec in &figure.lines {
            let color = to_color32(spec.color);
            let mut line = Line::new(PlotPoints::from(spec.points.clone()))
                .color(color)
                .width(spec.width);
            if let Some(name) = &spec.name {
                line = line.name(name);
            }
            plot_ui.line(line);

            if spec.style == LineStyle::Markers {
                plot_ui.points(
                    Points::new(PlotPoints::from(spec.points.clone()))
                        .color(color)
                        .radius(spec.width + 1.0),
                );
            }
        }

        for text in &figure.texts {
            let anchor = match text.anchor {
                Anchor::TopLeft => Align2::LEFT_TOP,
                Anchor::TopRight => Align2::RIGHT_TOP,
            };
            plot_ui.text(
                Text::new(
                    PlotPoint::new(text.x, text.y),
                    RichText::new(&text.text).size(text.size),
                )
                .anchor(anchor),
            );
        }
    });
}
