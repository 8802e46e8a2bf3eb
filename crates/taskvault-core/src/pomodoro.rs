use crate::config::PomodoroSettings;

pub const BAR_SEGMENTS: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakKind {
    Short,
    Long,
}

/// Picks the break that follows the Nth completed work interval: a long
/// break every `long_break_interval` intervals, a short break otherwise.
pub fn break_after(completed_intervals: u32, settings: &PomodoroSettings) -> BreakKind {
    let interval = settings.long_break_interval;
    if interval > 0 && completed_intervals % interval == 0 {
        BreakKind::Long
    } else {
        BreakKind::Short
    }
}

pub fn break_minutes(kind: BreakKind, settings: &PomodoroSettings) -> u32 {
    match kind {
        BreakKind::Short => settings.short_break_duration.max(1),
        BreakKind::Long => settings.long_break_duration.max(1),
    }
}

pub fn format_clock(remaining_secs: u64) -> String {
    format!("{:02}:{:02}", remaining_secs / 60, remaining_secs % 60)
}

/// Renders one frame of the countdown bar: pellets eaten left to right, a
/// `C`/`c` cursor at the current position.
pub fn render_bar(elapsed_secs: u64, total_secs: u64) -> String {
    let bar_len = BAR_SEGMENTS * 2;
    let mut bar: Vec<char> = "o ".repeat(BAR_SEGMENTS).chars().collect();
    let progress = if total_secs == 0 {
        1.0
    } else {
        elapsed_secs as f64 / total_secs as f64
    };
    let pos = ((progress * bar_len as f64) as usize).min(bar_len);
    for slot in bar.iter_mut().take(pos) {
        *slot = ' ';
    }
    if pos < bar_len {
        bar[pos] = if bar[pos] == ' ' { 'C' } else { 'c' };
    } else {
        for slot in bar.iter_mut() {
            *slot = ' ';
        }
        bar.push('c');
    }
    let rendered: String = bar.into_iter().collect();
    rendered.trim_end().to_string()
}

pub fn render_frame(elapsed_secs: u64, total_secs: u64) -> String {
    let remaining = total_secs.saturating_sub(elapsed_secs);
    format!(
        "[{}] [{}]",
        format_clock(remaining),
        render_bar(elapsed_secs, total_secs)
    )
}
