//! 轮询工具
//!
//! View Locator 与翻页驱动共用的"等待直到条件成立"原语

use std::future::Future;
use std::time::Duration;
use tokio::time::{sleep, Instant};

/// 轮询终止条件
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollLimit {
    /// 最多检查 n 次
    Attempts(u32),
    /// 超过时长后放弃
    Deadline(Duration),
    /// 不设上限，直到条件成立
    Unbounded,
}

/// 轮询策略：间隔 + 终止条件
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    pub limit: PollLimit,
}

impl PollPolicy {
    pub fn attempts(interval: Duration, attempts: u32) -> Self {
        Self {
            interval,
            limit: PollLimit::Attempts(attempts),
        }
    }

    /// `deadline` 为 `None` 时不限时
    pub fn deadline(interval: Duration, deadline: Option<Duration>) -> Self {
        Self {
            interval,
            limit: deadline.map_or(PollLimit::Unbounded, PollLimit::Deadline),
        }
    }
}

/// 反复执行 `predicate`，直到返回 true 或达到 `policy` 的上限
///
/// 第一次检查不等待。返回最后一次检查的结果。
pub async fn poll_until<F, Fut>(policy: PollPolicy, mut predicate: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    let started = Instant::now();
    let mut attempt: u32 = 0;

    loop {
        attempt += 1;
        if predicate().await {
            return true;
        }

        let exhausted = match policy.limit {
            PollLimit::Attempts(max) => attempt >= max,
            PollLimit::Deadline(limit) => started.elapsed() + policy.interval > limit,
            PollLimit::Unbounded => false,
        };
        if exhausted {
            return false;
        }

        sleep(policy.interval).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[tokio::test]
    async fn stops_as_soon_as_predicate_holds() {
        let calls = Cell::new(0);
        let ok = poll_until(PollPolicy::attempts(Duration::from_millis(1), 10), || {
            calls.set(calls.get() + 1);
            let done = calls.get() == 3;
            async move { done }
        })
        .await;

        assert!(ok);
        assert_eq!(calls.get(), 3);
    }

    #[tokio::test]
    async fn gives_up_after_attempts() {
        let calls = Cell::new(0);
        let ok = poll_until(PollPolicy::attempts(Duration::from_millis(1), 4), || {
            calls.set(calls.get() + 1);
            async { false }
        })
        .await;

        assert!(!ok);
        assert_eq!(calls.get(), 4);
    }

    #[tokio::test]
    async fn deadline_bounds_total_wait() {
        let policy = PollPolicy::deadline(Duration::from_millis(5), Some(Duration::from_millis(30)));
        let started = std::time::Instant::now();
        let ok = poll_until(policy, || async { false }).await;

        assert!(!ok);
        assert!(started.elapsed() < Duration::from_secs(2));
    }

    #[test]
    fn missing_deadline_means_unbounded() {
        let policy = PollPolicy::deadline(Duration::from_millis(200), None);
        assert_eq!(policy.limit, PollLimit::Unbounded);
    }
}
