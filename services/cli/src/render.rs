//! Text rendering for the terminal. Colors are applied per call through a
//! [`Palette`]; nothing here touches global terminal state.

use civic_sense::quiz::views::{MatchView, PolicyRowView, PreferenceBarView, QuestionView};
use civic_sense::quiz::{AlignmentTier, ManifestoProfile, ResultsView, ServiceHealth};
use owo_colors::{OwoColorize, Style};
use std::io::{self, IsTerminal, Write};

const BAR_CELLS: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Palette {
    enabled: bool,
}

impl Palette {
    /// Colors only when stdout is a terminal and `NO_COLOR` is unset.
    pub(crate) fn detect() -> Self {
        if io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none() {
            Self { enabled: true }
        } else {
            Self::plain()
        }
    }

    pub(crate) const fn plain() -> Self {
        Self { enabled: false }
    }

    fn tier_style(tier: AlignmentTier) -> Style {
        match tier {
            AlignmentTier::Strong => Style::new().green().bold(),
            AlignmentTier::Good => Style::new().cyan(),
            AlignmentTier::Moderate => Style::new().yellow(),
            AlignmentTier::Weak => Style::new().red(),
        }
    }

    fn paint(&self, text: &str, style: Style) -> String {
        if self.enabled {
            text.style(style).to_string()
        } else {
            text.to_string()
        }
    }

    fn tier(&self, text: &str, tier: AlignmentTier) -> String {
        self.paint(text, Self::tier_style(tier))
    }

    fn heading(&self, text: &str) -> String {
        self.paint(text, Style::new().bold())
    }

    fn muted(&self, text: &str) -> String {
        self.paint(text, Style::new().dimmed())
    }
}

pub(crate) fn question<W: Write>(
    out: &mut W,
    palette: Palette,
    view: &QuestionView,
    total: usize,
) -> io::Result<()> {
    writeln!(out)?;
    writeln!(
        out,
        "{}",
        palette.muted(&format!("Question {} of {}", view.number, total))
    )?;
    writeln!(out, "{}", palette.heading(&view.text))?;
    for option in &view.options {
        let marker = if option.selected { "*" } else { " " };
        writeln!(out, " {marker}[{}] {}", option.value, option.label)?;
    }
    Ok(())
}

pub(crate) fn answer_prompt<W: Write>(out: &mut W, current: Option<u8>) -> io::Result<()> {
    match current {
        Some(value) => write!(out, "Your answer (1-5, Enter keeps {value}): ")?,
        None => write!(out, "Your answer (1-5, Enter for neutral): ")?,
    }
    out.flush()
}

pub(crate) fn results<W: Write>(
    out: &mut W,
    palette: Palette,
    view: &ResultsView,
) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", palette.heading("Your top manifesto matches"))?;
    if view.top_matches.is_empty() {
        writeln!(out, "  No manifestos were scored.")?;
    }
    for entry in &view.top_matches {
        top_match(out, palette, entry)?;
    }

    if !view.preferences.is_empty() {
        writeln!(out)?;
        writeln!(out, "{}", palette.heading("Your policy priorities"))?;
        let label_width = view
            .preferences
            .iter()
            .map(|bar| bar.tag.as_str().len())
            .max()
            .unwrap_or(0);
        for bar in &view.preferences {
            preference(out, bar, label_width)?;
        }
    }
    Ok(())
}

fn top_match<W: Write>(out: &mut W, palette: Palette, entry: &MatchView) -> io::Result<()> {
    writeln!(out)?;
    writeln!(
        out,
        " {:<3}  {}  {}  {}",
        entry.badge_label,
        palette.heading(&entry.name),
        palette.tier(&format!("{}%", entry.alignment), entry.tier),
        palette.tier(entry.quality, entry.tier),
    )?;
    if !entry.summary.is_empty() {
        writeln!(out, "      {}", entry.summary)?;
    }

    if let Some(highlights) = &entry.highlights {
        for agreement in &highlights.agreements {
            writeln!(
                out,
                "      + {}: {}",
                agreement.tag, agreement.explanation
            )?;
        }
        for disagreement in &highlights.disagreements {
            writeln!(
                out,
                "      - {}: {}",
                disagreement.tag, disagreement.explanation
            )?;
        }
    }

    if entry.expanded {
        if entry.policy_rows.is_empty() {
            writeln!(out, "      No policy breakdown available.")?;
        }
        for row in &entry.policy_rows {
            policy_row(out, palette, row)?;
        }
        writeln!(
            out,
            "      {}",
            palette.muted(&format!("[d {}] hide breakdown", entry.rank + 1))
        )?;
    } else if entry.has_breakdown {
        writeln!(
            out,
            "      {}",
            palette.muted(&format!("[d {}] show policy breakdown", entry.rank + 1))
        )?;
    }
    Ok(())
}

fn policy_row<W: Write>(out: &mut W, palette: Palette, row: &PolicyRowView) -> io::Result<()> {
    writeln!(
        out,
        "      {:<16} you {} | manifesto {} | {}",
        row.tag.as_str(),
        row.your_position,
        row.manifesto_position,
        palette.tier(&format!("{}%", row.alignment), row.tier),
    )?;
    if !row.explanation.is_empty() {
        writeln!(out, "        {}", palette.muted(&row.explanation))?;
    }
    Ok(())
}

fn preference<W: Write>(out: &mut W, bar: &PreferenceBarView, label_width: usize) -> io::Result<()> {
    writeln!(
        out,
        "  {:<label_width$}  {:<BAR_CELLS$}  {:.1}/5",
        bar.tag.as_str(),
        "#".repeat(filled_cells(bar.width)),
        bar.score,
    )
}

fn filled_cells(width: f32) -> usize {
    let cells = (width * BAR_CELLS as f32).round();
    if cells.is_nan() || cells <= 0.0 {
        0
    } else {
        (cells as usize).min(BAR_CELLS)
    }
}

pub(crate) fn catalog<W: Write>(
    out: &mut W,
    palette: Palette,
    manifestos: &[ManifestoProfile],
) -> io::Result<()> {
    if manifestos.is_empty() {
        writeln!(out, "No manifestos loaded.")?;
        return Ok(());
    }
    for profile in manifestos {
        writeln!(
            out,
            "{}  {}",
            palette.muted(profile.id.as_str()),
            palette.heading(&profile.display_name())
        )?;
        if !profile.analysis.summary.is_empty() {
            writeln!(out, "    {}", profile.analysis.summary)?;
        }
        for (tag, stance) in &profile.analysis.policy_scores {
            writeln!(out, "    {:<16} {}/5", tag.as_str(), stance.score.get())?;
        }
    }
    Ok(())
}

pub(crate) fn health<W: Write>(out: &mut W, palette: Palette, report: &ServiceHealth) -> io::Result<()> {
    let tier = if report.is_ok() {
        AlignmentTier::Strong
    } else {
        AlignmentTier::Weak
    };
    writeln!(out, "{}  {}", palette.tier(&report.status, tier), report.message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use civic_sense::quiz::{results_view, DetailExpander, ManifestoId, ResultsPayload};
    use serde_json::json;

    fn payload() -> ResultsPayload {
        serde_json::from_value(json!({
            "alignment_results": [
                {
                    "manifesto_id": "A",
                    "name": "Progress Alliance",
                    "alignment": 82,
                    "summary": "Digital first.",
                    "policy_details": {
                        "Technology": {
                            "your_position": 5,
                            "manifesto_position": 4,
                            "alignment": 75,
                            "explanation": "Backs public broadband."
                        }
                    },
                    "top_matching_policies": [
                        { "tag": "Technology", "explanation": "Both favour investment." }
                    ]
                },
                { "manifesto_id": "B", "name": "Rural Front", "alignment": 55, "summary": "" }
            ],
            "user_preferences": [["Technology", 5.0], ["Agriculture", 2.5]]
        }))
        .expect("payload decodes")
    }

    fn render(expanded: Option<&str>) -> String {
        let mut expander = DetailExpander::new();
        if let Some(id) = expanded {
            expander.toggle(&ManifestoId::from(id));
        }
        let view = results_view(&payload(), &expander);
        let mut out = Vec::new();
        results(&mut out, Palette::plain(), &view).expect("render succeeds");
        String::from_utf8(out).expect("utf-8 output")
    }

    #[test]
    fn collapsed_results_offer_the_breakdown() {
        let text = render(None);
        assert!(text.contains(" 1st  Progress Alliance  82%  Excellent Match"));
        assert!(text.contains(" 2nd  Rural Front  55%  Moderate Match"));
        assert!(text.contains("+ Technology: Both favour investment."));
        assert!(text.contains("[d 1] show policy breakdown"));
        assert!(!text.contains("you 5 | manifesto 4"));
    }

    #[test]
    fn expanded_results_list_policy_rows() {
        let text = render(Some("A"));
        assert!(text.contains("you 5 | manifesto 4 | 75%"));
        assert!(text.contains("Backs public broadband."));
        assert!(text.contains("[d 1] hide breakdown"));
    }

    #[test]
    fn preference_bars_scale_to_the_score() {
        let text = render(None);
        assert!(text.contains(&format!("{:<20}  5.0/5", "#".repeat(20))));
        assert!(text.contains(&format!("{:<20}  2.5/5", "#".repeat(10))));
    }

    #[test]
    fn filled_cells_stay_within_the_bar() {
        assert_eq!(filled_cells(1.0), BAR_CELLS);
        assert_eq!(filled_cells(0.0), 0);
        assert_eq!(filled_cells(f32::NAN), 0);
    }
}
