//! Chart widget state and in-place dataset updates

use logboard_common::ChartData;
use ratatui::style::Color;

/// Fixed palette for the method chart, assigned by position:
/// the server orders methods alphabetically but the colors do not
/// follow the label, they follow the slot.
const METHOD_PALETTE: [Color; 5] = [
    Color::Green,
    Color::Blue,
    Color::Yellow,
    Color::Red,
    Color::Gray,
];

/// Which chart a widget renders
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartRole {
    Status,
    Method,
}

/// One chart widget: a dataset bound to a render area, mutated in
/// place on update rather than recreated.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartWidget {
    pub role: ChartRole,
    pub labels: Vec<String>,
    pub values: Vec<u64>,
    pub colors: Vec<Color>,
}

/// Color band for a status code: success, redirect/informational,
/// client error, server error. Unparseable labels fall into the
/// failure band, matching how the server-rendered dashboard colored
/// them.
pub fn status_band_color(label: &str) -> Color {
    match label.parse::<u16>() {
        Ok(code) if code < 300 => Color::Green,
        Ok(code) if code < 400 => Color::Cyan,
        Ok(code) if code < 500 => Color::Yellow,
        _ => Color::Red,
    }
}

fn method_palette_colors(count: usize) -> Vec<Color> {
    (0..count)
        .map(|i| METHOD_PALETTE[i % METHOD_PALETTE.len()])
        .collect()
}

/// Owns the two dashboard chart widgets.
///
/// Each widget is created at most once, from whatever initial dataset
/// the bootstrap payload provides; update calls for a role that was
/// never initialized are no-ops.
#[derive(Debug, Default)]
pub struct ChartSync {
    status: Option<ChartWidget>,
    method: Option<ChartWidget>,
}

impl ChartSync {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create the status widget from initial data. Does nothing if the
    /// widget already exists or no initial data was provided.
    pub fn init_status(&mut self, initial: Option<&ChartData>) {
        if self.status.is_some() {
            return;
        }
        if let Some(data) = initial {
            let mut widget = ChartWidget {
                role: ChartRole::Status,
                labels: Vec::new(),
                values: Vec::new(),
                colors: Vec::new(),
            };
            apply_status_data(&mut widget, data);
            self.status = Some(widget);
        }
    }

    /// Create the method widget from initial data. Does nothing if the
    /// widget already exists or no initial data was provided.
    pub fn init_method(&mut self, initial: Option<&ChartData>) {
        if self.method.is_some() {
            return;
        }
        if let Some(data) = initial {
            let mut widget = ChartWidget {
                role: ChartRole::Method,
                labels: Vec::new(),
                values: Vec::new(),
                colors: Vec::new(),
            };
            apply_method_data(&mut widget, data);
            self.method = Some(widget);
        }
    }

    /// Replace the status widget's dataset and recompute the per-label
    /// colors from the status-code band of each new label.
    pub fn update_status(&mut self, data: &ChartData) {
        if let Some(widget) = self.status.as_mut() {
            apply_status_data(widget, data);
        }
    }

    /// Replace the method widget's dataset. Colors stay positional: if
    /// the label order changed since the last update, a method may now
    /// show under a different color. Accepted limitation, do not
    /// recolor by label here without a deliberate design change.
    pub fn update_method(&mut self, data: &ChartData) {
        if let Some(widget) = self.method.as_mut() {
            apply_method_data(widget, data);
        }
    }

    pub fn status_widget(&self) -> Option<&ChartWidget> {
        self.status.as_ref()
    }

    pub fn method_widget(&self) -> Option<&ChartWidget> {
        self.method.as_ref()
    }
}

fn apply_status_data(widget: &mut ChartWidget, data: &ChartData) {
    widget.labels = data.labels.clone();
    widget.values = data.data.clone();
    widget.colors = data.labels.iter().map(|l| status_band_color(l)).collect();
}

fn apply_method_data(widget: &mut ChartWidget, data: &ChartData) {
    widget.labels = data.labels.clone();
    widget.values = data.data.clone();
    widget.colors = method_palette_colors(data.labels.len());
}
