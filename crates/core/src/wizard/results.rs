use serde::Serialize;

pub const NO_RECOMMENDATIONS_NOTICE: &str = "No recommendations returned. Please try again.";
pub const DISCLAIMER: &str = "This is for educational purposes only and is not financial advice.";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommendationBlock {
    /// First line of the block without its bullet marker.
    pub lead: String,
    pub details: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultsView {
    pub blocks: Vec<RecommendationBlock>,
    /// Shown under every block when industries were selected.
    pub alignment_note: Option<String>,
    /// Replaces the block list when generation produced nothing.
    pub notice: Option<String>,
    pub tickers: Vec<String>,
    pub disclaimer: &'static str,
}

impl ResultsView {
    pub fn build(text: &str, industries: &[String], tickers: Vec<String>) -> Self {
        let blocks = parse_blocks(text);
        let notice = blocks
            .is_empty()
            .then(|| NO_RECOMMENDATIONS_NOTICE.to_string());
        let alignment_note = (!industries.is_empty()).then(|| {
            format!(
                "This recommendation aligns with your interest in {}.",
                industries.join(", ")
            )
        });

        Self {
            blocks,
            alignment_note,
            notice,
            tickers,
            disclaimer: DISCLAIMER,
        }
    }

    /// Plain-text rendering, one bullet per block.
    pub fn to_markdown(&self) -> String {
        if let Some(notice) = &self.notice {
            return format!("{notice}\n\n---\n{}\n", self.disclaimer);
        }

        let mut out = String::new();
        for block in &self.blocks {
            out.push_str("- ");
            out.push_str(&block.lead);
            out.push('\n');
            for line in &block.details {
                out.push_str("  ");
                out.push_str(line);
                out.push('\n');
            }
            if let Some(note) = &self.alignment_note {
                out.push_str("  _");
                out.push_str(note);
                out.push_str("_\n");
            }
            out.push('\n');
        }
        out.push_str("---\n");
        out.push_str(self.disclaimer);
        out.push('\n');
        out
    }
}

/// Splits generated text on blank lines. A bare bullet line carries no text and is skipped,
/// so blocks with no visible text are dropped.
pub fn parse_blocks(text: &str) -> Vec<RecommendationBlock> {
    let mut blocks = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in text.lines().map(str::trim).chain(std::iter::once("")) {
        if !line.is_empty() {
            current.push(line);
            continue;
        }

        let mut lines = current
            .drain(..)
            .enumerate()
            .map(|(i, l)| if i == 0 { l.strip_prefix('-').unwrap_or(l).trim() } else { l })
            .filter(|l| !l.is_empty());
        if let Some(lead) = lines.next() {
            blocks.push(RecommendationBlock {
                lead: lead.to_string(),
                details: lines.map(str::to_string).collect(),
            });
        }
    }

    blocks
}
