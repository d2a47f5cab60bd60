//! `<Graph>` → pgfplots figure.
//!
//! The `data` attribute is parsed with the safe literal parser; each record
//! contributes one `(x, y)` pair read from the `xKey` / `yKey` fields.

use std::fmt::Write as _;

use serde_json::Value;

use crate::attr::AttrValue;
use crate::error::FragmentError;
use crate::literal::parse_literal;
use crate::node::Element;

use super::escape::escape_with_math;

/// Plot width passed to the axis environment
pub const PLOT_WIDTH: &str = "10cm";
/// Plot height passed to the axis environment
pub const PLOT_HEIGHT: &str = "6cm";

// =============================================================================
// PlotStyle
// =============================================================================

/// Interpolation between data points
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlotStyle {
    /// Straight segments (`linear`, `linearClosed`)
    #[default]
    Linear,
    /// Smoothed curve (`basis*`, `natural`, `monotone*`)
    Smooth,
    /// Value held until the next point (`step`, `stepAfter`)
    StepAfter,
    /// Value jumps at the start of each interval (`stepBefore`)
    StepBefore,
}

impl PlotStyle {
    /// Map a chart `type` attribute to a plot style.
    ///
    /// Unknown types fall back to linear.
    pub fn from_type(ty: &str) -> Self {
        match ty {
            "linear" | "linearClosed" => Self::Linear,
            "basis" | "basisClosed" | "basisOpen" | "natural" | "monotone" | "monotoneX"
            | "monotoneY" => Self::Smooth,
            "step" | "stepAfter" => Self::StepAfter,
            "stepBefore" => Self::StepBefore,
            other => {
                log::warn!("unknown graph type `{other}`, drawing straight segments");
                Self::Linear
            }
        }
    }

    /// pgfplots option selecting the interpolation
    pub fn plot_option(self) -> &'static str {
        match self {
            Self::Linear => "sharp plot",
            Self::Smooth => "smooth",
            Self::StepAfter => "const plot",
            Self::StepBefore => "const plot mark right",
        }
    }
}

// =============================================================================
// GraphSpec
// =============================================================================

/// Everything needed to draw one `<Graph>`
#[derive(Debug, Clone, PartialEq)]
pub struct GraphSpec {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub style: PlotStyle,
    pub points: Vec<(f64, f64)>,
}

impl GraphSpec {
    /// Read a `<Graph>` element's attributes.
    pub fn from_element(elem: &Element) -> Result<Self, FragmentError> {
        let data = match elem.get_attr("data") {
            None => return Err(FragmentError::MissingAttribute("data")),
            Some(AttrValue::Expr(src)) | Some(AttrValue::Str(src)) => src,
            Some(_) => return Err(FragmentError::NotAnExpression("data")),
        };
        let data = parse_literal(data)
            .map_err(|source| FragmentError::MalformedData { attr: "data", source })?;

        let x_key = elem.get_text("xKey").map(|k| k.into_owned()).unwrap_or_else(|| "x".into());
        let y_key = elem.get_text("yKey").map(|k| k.into_owned()).unwrap_or_else(|| "y".into());
        let points = read_points(&data, &x_key, &y_key)?;

        let label = |name: &str, fallback: &str| {
            elem.get_text(name)
                .map(|l| l.into_owned())
                .unwrap_or_else(|| fallback.to_string())
        };

        Ok(Self {
            title: label("title", ""),
            x_label: label("xLabel", &x_key),
            y_label: label("yLabel", &y_key),
            style: elem
                .get_text("type")
                .map(|t| PlotStyle::from_type(&t))
                .unwrap_or_default(),
            points,
        })
    }

    /// Write the figure as a self-contained `tikzpicture` block.
    pub fn write_latex(&self, out: &mut String) {
        out.push_str("\\begin{center}\n\\begin{tikzpicture}\n\\begin{axis}[\n");
        if !self.title.is_empty() {
            let _ = writeln!(out, "    title={{{}}},", escape_with_math(&self.title));
        }
        let _ = writeln!(out, "    xlabel={{{}}},", escape_with_math(&self.x_label));
        let _ = writeln!(out, "    ylabel={{{}}},", escape_with_math(&self.y_label));
        let _ = writeln!(out, "    grid=major,");
        let _ = writeln!(out, "    width={PLOT_WIDTH},");
        let _ = writeln!(out, "    height={PLOT_HEIGHT}");
        out.push_str("]\n");

        let _ = writeln!(
            out,
            "\\addplot[color=blue, mark=*, {}] coordinates {{",
            self.style.plot_option()
        );
        out.push_str("    ");
        for (i, (x, y)) in self.points.iter().enumerate() {
            if i > 0 {
                out.push(' ');
            }
            let _ = write!(out, "({x},{y})");
        }
        out.push_str("\n};\n\\end{axis}\n\\end{tikzpicture}\n\\end{center}\n");
    }
}

/// Render a `<Graph>` element, or explain why it cannot be drawn.
pub fn render_graph(elem: &Element) -> Result<String, FragmentError> {
    let spec = GraphSpec::from_element(elem)?;
    let mut out = String::with_capacity(256 + spec.points.len() * 16);
    spec.write_latex(&mut out);
    Ok(out)
}

fn read_points(data: &Value, x_key: &str, y_key: &str) -> Result<Vec<(f64, f64)>, FragmentError> {
    let records = data.as_array().ok_or(FragmentError::NotARecordList("data"))?;
    records
        .iter()
        .enumerate()
        .map(|(index, record)| {
            let record = record.as_object().ok_or(FragmentError::NotARecordList("data"))?;
            let field = |key: &str| {
                record.get(key).and_then(number).ok_or_else(|| FragmentError::MissingField {
                    index,
                    key: key.to_string(),
                })
            };
            Ok((field(x_key)?, field(y_key)?))
        })
        .collect()
}

/// Numbers, or strings holding a number (`"1.5"`)
fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        _ => None,
    }
}
