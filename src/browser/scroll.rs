use super::PageDriver;
use crate::config::TimingConfig;
use std::thread;
use std::time::Duration;

/// Distance scrolled per tick
pub const SCROLL_STEP_PX: u32 = 600;

/// Scrolls a page end to end so lazy-loaded images get requested
#[derive(Debug, Clone)]
pub struct ScrollTrigger {
    snap_top_pause: Duration,
    snap_bottom_pause: Duration,
}

impl Default for ScrollTrigger {
    fn default() -> Self {
        Self::from(&TimingConfig::default())
    }
}

impl From<&TimingConfig> for ScrollTrigger {
    fn from(timings: &TimingConfig) -> Self {
        Self {
            snap_top_pause: Duration::from_millis(timings.snap_top_pause_ms),
            snap_bottom_pause: Duration::from_millis(timings.snap_bottom_pause_ms),
        }
    }
}

impl ScrollTrigger {
    /// Script resolving once the scrolled distance reaches the body height.
    /// The height is re-read every tick since it grows as images load.
    pub fn scroll_script(pause: Duration) -> String {
        format!(
            r#"new Promise((resolve) => {{
    let total = 0;
    const timer = setInterval(() => {{
        window.scrollBy(0, {step});
        total += {step};
        if (total >= document.body.scrollHeight) {{
            clearInterval(timer);
            resolve(total);
        }}
    }}, {pause});
}})"#,
            step = SCROLL_STEP_PX,
            pause = pause.as_millis()
        )
    }

    /// Best-effort; failures are logged and otherwise ignored
    pub fn force_lazy_load<P: PageDriver + ?Sized>(&self, page: &P, pause: Duration) {
        match page.evaluate(&Self::scroll_script(pause), true) {
            Ok(scrolled) => log::debug!("Scrolled {:?}px at {}ms per step", scrolled, pause.as_millis()),
            Err(e) => {
                log::debug!("Scroll pass failed: {}", e);
                return;
            }
        }

        if let Err(e) = page.evaluate("window.scrollTo(0, 0)", false) {
            log::debug!("Snap to top failed: {}", e);
            return;
        }
        thread::sleep(self.snap_top_pause);

        if let Err(e) = page.evaluate("window.scrollTo(0, document.body.scrollHeight)", false) {
            log::debug!("Snap to bottom failed: {}", e);
            return;
        }
        thread::sleep(self.snap_bottom_pause);
    }
}
