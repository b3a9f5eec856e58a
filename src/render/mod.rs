//! Render frames and the line protocol for the plotting process.

pub mod gnuplot;

/// How one data series is drawn.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SeriesStyle {
    Lines,
    Points,
    Dots,
}

impl SeriesStyle {
    /// Plot-command clause referencing the next inline data block.
    fn clause(self) -> &'static str {
        match self {
            SeriesStyle::Lines => "\"-\" with lines",
            SeriesStyle::Points => "\"-\" with points",
            SeriesStyle::Dots => "\"-\" with dots",
        }
    }
}

/// One inline data block of newline-separated numeric rows.
#[derive(Debug, Clone)]
pub struct Series {
    style: SeriesStyle,
    rows: String,
}

impl Series {
    pub fn new(style: SeriesStyle) -> Self {
        Self {
            style,
            rows: String::new(),
        }
    }

    /// Append a single-column row, plotted against the row index.
    pub fn push_value(&mut self, value: f64) {
        self.rows.push_str(&format!("{:.6}\n", value));
    }

    /// Append a two-column row.
    pub fn push_pair(&mut self, x: f64, y: f64) {
        self.rows.push_str(&format!("{:.6}\t{:.6}\n", x, y));
    }
}

/// A fully composed frame: header directives plus inline data blocks.
///
/// Transient; built and submitted once per completed window.
#[derive(Debug, Clone, Default)]
pub struct RenderFrame {
    header: String,
    series: Vec<Series>,
}

impl RenderFrame {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one header directive line.
    pub fn directive(&mut self, line: &str) {
        self.header.push_str(line);
        self.header.push('\n');
    }

    pub fn push_series(&mut self, series: Series) {
        self.series.push(series);
    }

    /// Serialize to the text sent to the renderer: header directives,
    /// a plot command listing every series, then each data block
    /// terminated by a line containing only `e`.
    pub fn to_protocol(&self) -> String {
        let mut out = self.header.clone();
        out.push_str("plot ");
        out.push_str(
            &self
                .series
                .iter()
                .map(|series| series.style.clause())
                .collect::<Vec<_>>()
                .join(","),
        );
        out.push('\n');
        for series in &self.series {
            out.push_str(&series.rows);
            out.push_str("e\n");
        }
        out
    }
}

/// Sink for completed frames.
///
/// Submitting must be infallible from the pipeline's point of view:
/// a dead renderer drops frames instead of raising.
pub trait FrameSink {
    /// Write one composed frame to the renderer.
    fn submit(&mut self, frame: &RenderFrame);

    /// Ask the renderer to exit and wait for it.
    fn shutdown(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_serializes_header_plot_command_and_terminated_blocks() {
        let mut frame = RenderFrame::new();
        frame.directive("set key off");
        frame.directive("set yrange [-4:4]");

        let mut lines = Series::new(SeriesStyle::Lines);
        lines.push_value(1.0);
        lines.push_value(-0.5);
        frame.push_series(lines);

        let mut dots = Series::new(SeriesStyle::Dots);
        dots.push_pair(0.25, -3.0);
        frame.push_series(dots);

        assert_eq!(
            frame.to_protocol(),
            "set key off\n\
             set yrange [-4:4]\n\
             plot \"-\" with lines,\"-\" with dots\n\
             1.000000\n\
             -0.500000\n\
             e\n\
             0.250000\t-3.000000\n\
             e\n",
        );
    }

    #[test]
    fn one_series_per_inline_block() {
        let mut frame = RenderFrame::new();
        for _ in 0..3 {
            let mut series = Series::new(SeriesStyle::Points);
            series.push_value(0.0);
            frame.push_series(series);
        }
        let text = frame.to_protocol();
        assert_eq!(text.matches("\"-\" with points").count(), 3);
        assert_eq!(text.matches("\ne\n").count(), 3);
    }
}
