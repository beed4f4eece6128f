//! Terminal rendering of trials and round summaries.

use nback_core::{LevelChange, Modality, RoundReport, Trial};
use nback_store::StoredRound;

pub fn render_trial(
    index: usize,
    total: usize,
    level: usize,
    trial: &Trial,
    grid_size: usize,
) -> String {
    let side = grid_side(grid_size);
    let mut out = format!("[{level}-back] trial {}/{total}\n", index + 1);
    for row in 0..side {
        let cells: Vec<&str> = (0..side)
            .map(|col| row * side + col)
            .filter(|&cell| cell < grid_size)
            .map(|cell| if cell == trial.position { "#" } else { "." })
            .collect();
        out.push_str("  ");
        out.push_str(&cells.join(" "));
        if row == side / 2 {
            out.push_str(&format!("    {}", trial.symbol));
        }
        out.push('\n');
    }
    out
}

fn grid_side(grid_size: usize) -> usize {
    let mut side = 1;
    while side * side < grid_size {
        side += 1;
    }
    side
}

pub fn change_label(change: LevelChange) -> &'static str {
    match change {
        LevelChange::Promote => "promote",
        LevelChange::Hold => "hold",
        LevelChange::Demote => "demote",
    }
}

pub fn format_report(round: u32, report: &RoundReport) -> String {
    let mut line = format!(
        "round {round}: level {} -> {} ({})",
        report.level,
        report.next_level,
        change_label(report.change)
    );
    for modality in Modality::ALL {
        let s = report.stats.get(modality);
        line.push_str(&format!(
            " | {modality} hit/miss/fa {}/{}/{} of {} d'={:.2}",
            s.hits,
            s.misses,
            s.false_alarms,
            report.targets.get(modality),
            report.d_prime.get(modality),
        ));
    }
    line
}

pub fn format_stored(round: &StoredRound) -> String {
    let r = &round.report;
    format!(
        "{}  level {} -> {}  errors {}  d' {:.2}/{:.2}",
        round.played_at,
        r.level,
        r.next_level,
        r.total_errors,
        r.d_prime.position,
        r.d_prime.symbol
    )
}
