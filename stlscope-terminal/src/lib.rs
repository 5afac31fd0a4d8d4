/// Terminal host for the STL decoder: progress line, decode driver, summary
use anyhow::{Context, Result};
use serde::Serialize;
use stlscope_core::notify::format_byte_size;
use stlscope_core::{
    spawn_decode, BoundingInfo, DecodeOptions, DecodeOutput, Format, InfoKey, Notification,
};

pub mod progress;

pub use progress::ProgressLine;

/// A finished decode plus the advisory messages it produced
#[derive(Debug)]
pub struct Inspection {
    pub output: DecodeOutput,
    pub notices: Vec<String>,
}

/// Decode `bytes` on a worker thread. `on_progress` receives a label naming
/// the detected format and the current percentage.
pub fn inspect(
    bytes: Vec<u8>,
    options: DecodeOptions,
    mut on_progress: impl FnMut(&str, u8),
) -> Result<Inspection> {
    let handle = spawn_decode(bytes, options).context("failed to start decode worker")?;

    let mut label = String::from("decoding");
    let mut notices = Vec::new();
    let output = handle.wait(|notification| match notification {
        Notification::Info {
            prop: InfoKey::Type,
            data,
        } => label = format!("decoding {} STL", data),
        Notification::Progress { percent } => on_progress(&label, percent),
        Notification::Message { data } => notices.push(data),
        Notification::Info { .. } | Notification::ConvertProgress { .. } => {}
    })?;

    Ok(Inspection { output, notices })
}

/// What `stlscope inspect` reports about a decoded file
#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    pub format: Format,
    pub byte_size: u64,
    pub size: String,
    pub facet_count: u32,
    pub colors: bool,
    pub alpha: Option<f32>,
    pub bounds: BoundingInfo,
    pub recentered: bool,
}

impl Summary {
    pub fn from_output(output: &DecodeOutput) -> Self {
        let metadata = output.metadata;
        Self {
            format: metadata.format,
            byte_size: metadata.byte_size,
            size: format_byte_size(metadata.byte_size),
            facet_count: metadata.facet_count,
            colors: output.mesh.has_colors(),
            alpha: output.mesh.alpha,
            bounds: output.bounds,
            recentered: output.recentered,
        }
    }

    pub fn render_text(&self) -> String {
        let b = &self.bounds;
        let extent = b.size();
        let colors = match self.alpha {
            Some(alpha) if self.colors => format!("yes (alpha {:.2})", alpha),
            _ => "no".to_string(),
        };

        let rows = [
            ("format", self.format.to_string()),
            ("size", format!("{} ({} bytes)", self.size, self.byte_size)),
            ("facets", self.facet_count.to_string()),
            ("colors", colors),
            ("min", format!("({:.3}, {:.3}, {:.3})", b.min.x, b.min.y, b.min.z)),
            ("max", format!("({:.3}, {:.3}, {:.3})", b.max.x, b.max.y, b.max.z)),
            (
                "centroid",
                format!("({:.3}, {:.3}, {:.3})", b.centroid.x, b.centroid.y, b.centroid.z),
            ),
            (
                "extent",
                format!("{:.3} x {:.3} x {:.3}", extent.x, extent.y, extent.z),
            ),
            ("recentered", if self.recentered { "yes" } else { "no" }.to_string()),
        ];

        rows.iter()
            .map(|(key, value)| format!("{:<11} {}\n", format!("{}:", key), value))
            .collect()
    }
}
