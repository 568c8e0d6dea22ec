//! Output formats for lineage graphs.

mod dot;
mod html;
mod json;
mod mermaid;

pub use dot::to_dot;
pub use html::to_html;
pub use json::to_json;
pub use mermaid::to_mermaid;

use std::str::FromStr;

/// Output format for graph export
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Graphviz DOT with one field table per node
    Dot,
    /// Mermaid flowchart
    Mermaid,
    /// The lineage graph model
    Json,
    /// Self-contained page with diagram and field tables
    #[default]
    Html,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "dot" => Ok(OutputFormat::Dot),
            "mermaid" => Ok(OutputFormat::Mermaid),
            "json" => Ok(OutputFormat::Json),
            "html" => Ok(OutputFormat::Html),
            _ => Err(format!(
                "Unknown format: {}. Valid options: dot, mermaid, json, html",
                s
            )),
        }
    }
}

impl OutputFormat {
    /// Detect format from an output file extension.
    ///
    /// Image extensions map to DOT, which is then rendered through Graphviz.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "dot" | "png" | "svg" | "pdf" => Some(OutputFormat::Dot),
            "mmd" => Some(OutputFormat::Mermaid),
            "json" => Some(OutputFormat::Json),
            "html" => Some(OutputFormat::Html),
            _ => None,
        }
    }
}

/// Diagram direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Layout {
    /// Left to right
    #[default]
    LR,
    /// Top to bottom
    TB,
}

impl FromStr for Layout {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "lr" => Ok(Layout::LR),
            "tb" => Ok(Layout::TB),
            _ => Err(format!("Unknown layout: {}. Valid options: lr, tb", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_parse() {
        assert_eq!("DOT".parse::<OutputFormat>().unwrap(), OutputFormat::Dot);
        assert_eq!("mermaid".parse::<OutputFormat>().unwrap(), OutputFormat::Mermaid);
        assert!("svg".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(OutputFormat::from_extension("mmd"), Some(OutputFormat::Mermaid));
        assert_eq!(OutputFormat::from_extension("SVG"), Some(OutputFormat::Dot));
        assert_eq!(OutputFormat::from_extension("csv"), None);
    }

    #[test]
    fn test_layout_parse() {
        assert_eq!("TB".parse::<Layout>().unwrap(), Layout::TB);
        assert!("top-down".parse::<Layout>().is_err());
        assert_eq!(Layout::default(), Layout::LR);
    }
}
