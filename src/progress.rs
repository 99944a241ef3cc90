//! Progress reporting for long-running rename passes

use indicatif::{ProgressBar, ProgressStyle};

const TEMPLATE: &str = "{prefix:>9.cyan} [{bar:30}] {pos}/{len} {wide_msg}";

/// A bar over `len` steps, or a hidden bar when progress is disabled.
pub fn bar(len: u64, label: &str, enabled: bool) -> ProgressBar {
    if !enabled || len == 0 {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new(len);
    if let Ok(style) = ProgressStyle::with_template(TEMPLATE) {
        bar.set_style(style.progress_chars("=> "));
    }
    bar.set_prefix(label.to_string());
    bar
}
