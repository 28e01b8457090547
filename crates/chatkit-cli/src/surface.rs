//! Terminal rendering of widget surface output.
//!
//! The widget hands the surface a cumulative sanitized fragment on every
//! text update. The terminal shows plain text, so each update is reduced
//! to display text and only the new suffix is printed, giving the usual
//! incremental streaming feel.

use std::io::Write;

use chatkit_core::charts::ChartPayload;
use chatkit_core::session::{SurfaceError, SurfaceHandlers};

#[derive(Default)]
pub struct TerminalSurface {
    /// Display text already printed for the open turn.
    shown: String,
    printed_any: bool,
}

impl TerminalSurface {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SurfaceHandlers for TerminalSurface {
    fn markup_updated(&mut self, html: &str) {
        // Trailing newlines only appear at the fragment end and would break
        // the prefix property between consecutive updates.
        let text = display_text(html).trim_end_matches('\n').to_string();
        if let Some(delta) = text.strip_prefix(self.shown.as_str()) {
            print!("{delta}");
        } else {
            // Content was rewritten rather than appended.
            print!("\n{text}");
        }
        let _ = std::io::stdout().flush();
        self.printed_any = self.printed_any || !text.is_empty();
        self.shown = text;
    }

    fn chart_attached(&mut self, chart: &ChartPayload) {
        println!("\n[chart] {} ({:?}, {} series)", chart.title, chart.kind, chart.series.len());
    }

    fn lock_changed(&mut self, locked: bool) {
        if locked {
            // A new turn is starting; the next update begins from scratch.
            self.shown.clear();
            self.printed_any = false;
        } else if self.printed_any {
            println!();
            self.printed_any = false;
        }
    }

    fn error(&mut self, error: &SurfaceError) {
        eprintln!("error: {}", error.message);
        if let Some(detail) = &error.detail {
            tracing::debug!("error detail: {detail}");
        }
        if error.can_retry {
            eprintln!("(use /retry to resend your last message)");
        }
    }
}

/// Reduces a restricted HTML fragment to terminal text.
fn display_text(html: &str) -> String {
    let structured = html
        .replace("</p>", "\n")
        .replace("<br />", "\n")
        .replace("</li>", "\n")
        .replace("<li>", "- ")
        .replace("</tr>", "\n")
        .replace("</th>", "\t")
        .replace("</td>", "\t");

    let mut text = String::with_capacity(structured.len());
    let mut in_tag = false;
    for ch in structured.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            c if !in_tag => text.push(c),
            _ => {}
        }
    }
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&amp;", "&")
}
