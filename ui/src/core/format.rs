//! Formatting helpers for presenting values.

/// Compact axis/tooltip form: integers without decimals, otherwise up to two.
pub fn format_value(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        let text = format!("{value:.2}");
        text.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

/// Progress line for pending graph points.
pub fn format_progress(done: usize, total: usize) -> String {
    format!("{done} / {total}")
}
