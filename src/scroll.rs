use crate::error::Result;
use rand::Rng;
use std::time::Duration;
use tokio::time::Instant;

/// A page that can be scrolled to load more entries
pub trait ScrollTarget {
    /// Scroll to the bottom of the page
    async fn scroll(&mut self) -> Result<()>;

    /// Number of entries currently rendered
    async fn entry_count(&mut self) -> Result<usize>;
}

/// Decides how long the scroll loop runs and how long it waits between scrolls
pub trait WaitPolicy {
    /// Whether to scroll again, given the number of scrolls done so far and
    /// the time since the entry count last changed
    fn should_continue(&mut self, iteration: usize, since_last_change: Duration) -> bool;

    /// Pause after scroll number `iteration`
    fn delay(&mut self, iteration: usize) -> Duration;
}

/// Inclusive range a wait is drawn from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelayRange {
    min: Duration,
    max: Duration,
}

impl DelayRange {
    /// Bounds given in the wrong order are swapped
    pub fn new(min: Duration, max: Duration) -> Self {
        if min <= max {
            Self { min, max }
        } else {
            Self { min: max, max: min }
        }
    }

    pub fn none() -> Self {
        Self::fixed(Duration::ZERO)
    }

    pub fn fixed(delay: Duration) -> Self {
        Self {
            min: delay,
            max: delay,
        }
    }

    /// Draw a delay uniformly from the range, at millisecond resolution
    pub fn sample(&self) -> Duration {
        if self.min == self.max {
            return self.min;
        }
        let low = self.min.as_millis() as u64;
        let high = self.max.as_millis() as u64;
        Duration::from_millis(rand::thread_rng().gen_range(low..=high))
    }
}

/// Scroll a fixed number of times
#[derive(Debug, Clone)]
pub struct FixedScrolls {
    iterations: usize,
    delay: DelayRange,
}

impl FixedScrolls {
    pub fn new(iterations: usize, delay: DelayRange) -> Self {
        Self { iterations, delay }
    }
}

impl WaitPolicy for FixedScrolls {
    fn should_continue(&mut self, iteration: usize, _since_last_change: Duration) -> bool {
        iteration < self.iterations
    }

    fn delay(&mut self, _iteration: usize) -> Duration {
        self.delay.sample()
    }
}

/// Scroll until the entry count stops growing, up to a cap
#[derive(Debug, Clone)]
pub struct UntilStable {
    max_iterations: usize,
    stall_timeout: Duration,
    delay: DelayRange,
}

impl UntilStable {
    pub fn new(max_iterations: usize, stall_timeout: Duration, delay: DelayRange) -> Self {
        Self {
            max_iterations,
            stall_timeout,
            delay,
        }
    }
}

impl WaitPolicy for UntilStable {
    fn should_continue(&mut self, iteration: usize, since_last_change: Duration) -> bool {
        iteration < self.max_iterations && since_last_change < self.stall_timeout
    }

    fn delay(&mut self, _iteration: usize) -> Duration {
        self.delay.sample()
    }
}

/// Policies selectable from configuration
#[derive(Debug, Clone)]
pub enum ScrollPolicy {
    Fixed(FixedScrolls),
    UntilStable(UntilStable),
}

impl WaitPolicy for ScrollPolicy {
    fn should_continue(&mut self, iteration: usize, since_last_change: Duration) -> bool {
        match self {
            ScrollPolicy::Fixed(p) => p.should_continue(iteration, since_last_change),
            ScrollPolicy::UntilStable(p) => p.should_continue(iteration, since_last_change),
        }
    }

    fn delay(&mut self, iteration: usize) -> Duration {
        match self {
            ScrollPolicy::Fixed(p) => p.delay(iteration),
            ScrollPolicy::UntilStable(p) => p.delay(iteration),
        }
    }
}

/// Outcome of a scroll loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollSummary {
    /// Scrolls performed
    pub iterations: usize,
    /// Entry count after the last scroll
    pub entries_seen: usize,
}

/// Scrolls `target` until `policy` says stop
pub async fn scroll_until_done<T, P>(target: &mut T, policy: &mut P) -> Result<ScrollSummary>
where
    T: ScrollTarget,
    P: WaitPolicy,
{
    let mut last_count = target.entry_count().await?;
    let mut last_change = Instant::now();
    let mut iteration = 0;

    while policy.should_continue(iteration, last_change.elapsed()) {
        ::log::info!("Scrolling... {} ({} entries so far)", iteration + 1, last_count);
        target.scroll().await?;

        let delay = policy.delay(iteration);
        if !delay.is_zero() {
            ::log::debug!("Waiting {:.1}s for content to load", delay.as_secs_f64());
            tokio::time::sleep(delay).await;
        }

        let count = target.entry_count().await?;
        if count != last_count {
            ::log::debug!("Entry count changed {} -> {}", last_count, count);
            last_count = count;
            last_change = Instant::now();
        }
        iteration += 1;
    }

    ::log::info!(
        "Finished scrolling after {} iterations, {} entries rendered",
        iteration,
        last_count
    );
    Ok(ScrollSummary {
        iterations: iteration,
        entries_seen: last_count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Page whose entry count follows a script, one value per scroll
    struct ScriptedPage {
        counts: Vec<usize>,
        scrolls: usize,
    }

    impl ScrollTarget for ScriptedPage {
        async fn scroll(&mut self) -> Result<()> {
            self.scrolls += 1;
            Ok(())
        }

        async fn entry_count(&mut self) -> Result<usize> {
            let idx = self.scrolls.min(self.counts.len() - 1);
            Ok(self.counts[idx])
        }
    }

    /// Keeps going only while the count changed during the last wait.
    /// Run under paused time, so `since` is exactly zero right after a
    /// change and exactly one delay otherwise.
    struct StopWhenFlat {
        continues: usize,
    }

    impl WaitPolicy for StopWhenFlat {
        fn should_continue(&mut self, _iteration: usize, since: Duration) -> bool {
            let keep_going = since < Duration::from_millis(25);
            if keep_going {
                self.continues += 1;
            }
            keep_going
        }

        fn delay(&mut self, _iteration: usize) -> Duration {
            Duration::from_millis(50)
        }
    }

    #[test]
    fn test_fixed_scrolls_counts_iterations() {
        let mut policy = FixedScrolls::new(3, DelayRange::none());
        assert!(policy.should_continue(0, Duration::from_secs(1000)));
        assert!(policy.should_continue(2, Duration::ZERO));
        assert!(!policy.should_continue(3, Duration::ZERO));
        assert_eq!(policy.delay(0), Duration::ZERO);
    }

    #[test]
    fn test_until_stable_stops_on_stall_or_cap() {
        let mut policy = UntilStable::new(10, Duration::from_secs(30), DelayRange::none());
        assert!(policy.should_continue(0, Duration::ZERO));
        assert!(policy.should_continue(5, Duration::from_secs(29)));
        assert!(!policy.should_continue(5, Duration::from_secs(30)));
        assert!(!policy.should_continue(10, Duration::ZERO));
    }

    #[test]
    fn test_delay_range_sample_within_bounds() {
        let range = DelayRange::new(Duration::from_millis(15), Duration::from_millis(10));
        for _ in 0..100 {
            let d = range.sample();
            assert!(d >= Duration::from_millis(10) && d <= Duration::from_millis(15));
        }
        assert_eq!(
            DelayRange::fixed(Duration::from_secs(3)).sample(),
            Duration::from_secs(3)
        );
    }

    #[test]
    fn test_scroll_policy_delegates() {
        let mut policy = ScrollPolicy::Fixed(FixedScrolls::new(1, DelayRange::none()));
        assert!(policy.should_continue(0, Duration::ZERO));
        assert!(!policy.should_continue(1, Duration::ZERO));

        let mut policy = ScrollPolicy::UntilStable(UntilStable::new(
            5,
            Duration::from_secs(1),
            DelayRange::none(),
        ));
        assert!(!policy.should_continue(0, Duration::from_secs(2)));
    }

    #[tokio::test]
    async fn test_loop_runs_fixed_iterations() {
        let mut page = ScriptedPage {
            counts: vec![12, 24, 36, 36, 36],
            scrolls: 0,
        };
        let mut policy = FixedScrolls::new(4, DelayRange::none());

        let summary = scroll_until_done(&mut page, &mut policy).await.unwrap();
        assert_eq!(page.scrolls, 4);
        assert_eq!(
            summary,
            ScrollSummary {
                iterations: 4,
                entries_seen: 36
            }
        );
    }

    #[tokio::test]
    async fn test_loop_zero_iterations() {
        let mut page = ScriptedPage {
            counts: vec![7],
            scrolls: 0,
        };
        let mut policy = FixedScrolls::new(0, DelayRange::none());

        let summary = scroll_until_done(&mut page, &mut policy).await.unwrap();
        assert_eq!(page.scrolls, 0);
        assert_eq!(summary.entries_seen, 7);
    }

    #[tokio::test(start_paused = true)]
    async fn test_loop_resets_timer_on_change() {
        // Grows for two scrolls, then stays flat
        let mut page = ScriptedPage {
            counts: vec![1, 2, 3, 3, 3, 3],
            scrolls: 0,
        };
        let mut policy = StopWhenFlat { continues: 0 };

        let start = Instant::now();
        let summary = scroll_until_done(&mut page, &mut policy).await.unwrap();
        assert_eq!(summary.entries_seen, 3);
        assert_eq!(policy.continues, 3);
        // Three waits of 50ms on the virtual clock
        assert_eq!(start.elapsed(), Duration::from_millis(150));
        assert_eq!(summary.iterations, 3);
        assert_eq!(page.scrolls, 3);
    }
}
