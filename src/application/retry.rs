//! Resilient Call Executor - 有界重试 + 指数退避
//!
//! 所有外部调用共用同一套重试语义：
//! - 可重试错误在剩余次数内按 `base_delay * 2^attempt_index` 退避后重试
//! - 不可重试错误立即返回，不消耗剩余次数
//! - 次数耗尽返回最后一次错误
//!
//! 退避使用 `tokio::time::sleep`，只挂起当前任务

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

/// 退避指数上限
const MAX_BACKOFF_EXPONENT: u32 = 10;

/// 重试策略
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_millis(1000))
    }
}

impl RetryPolicy {
    /// `max_attempts` 为 0 时按 1 次处理
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    /// 不重试
    pub fn none() -> Self {
        Self::new(1, Duration::ZERO)
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// 第 `attempt_index` 次失败（从 0 开始）后的等待时间
    pub fn delay_for(&self, attempt_index: u32) -> Duration {
        let factor = 1u32 << attempt_index.min(MAX_BACKOFF_EXPONENT);
        self.base_delay.saturating_mul(factor)
    }

    /// 执行 `action`，按 `is_retryable` 决定是否重试
    pub async fn execute<T, E, F, Fut, P>(
        &self,
        operation: &str,
        mut action: F,
        is_retryable: P,
    ) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        P: Fn(&E) -> bool,
        E: Display,
    {
        let mut attempt: u32 = 0;
        loop {
            match action().await {
                Ok(value) => {
                    if attempt > 0 {
                        tracing::info!(
                            operation,
                            attempts = attempt + 1,
                            "Call succeeded after retry"
                        );
                    }
                    return Ok(value);
                }
                Err(error) => {
                    attempt += 1;

                    if !is_retryable(&error) {
                        tracing::debug!(
                            operation,
                            attempt,
                            error = %error,
                            "Non-retryable failure"
                        );
                        return Err(error);
                    }

                    if attempt >= self.max_attempts {
                        tracing::warn!(
                            operation,
                            attempts = attempt,
                            error = %error,
                            "Retry attempts exhausted"
                        );
                        return Err(error);
                    }

                    let delay = self.delay_for(attempt - 1);
                    tracing::warn!(
                        operation,
                        attempt,
                        max_attempts = self.max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %error,
                        "Transient failure, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}
