// LetterCounter - URL本文の取得と文字頻度集計
//
// 取得はロック取得より前に完了させ、集計は1取得につき1回のバッチで行う。

use crate::aggregator::Aggregator;
use crate::core::{ProcessingError, ProcessingResult, UnitOutcome, WorkItem};
use crate::engine::{UnitContext, WorkProcessor};
use crate::fetch::Fetcher;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::trace;

/// 取得した本文のアルファベット出現数を集計する処理系
pub struct LetterCounter<F> {
    fetcher: Arc<F>,
    aggregator: Arc<Aggregator>,
}

impl<F> LetterCounter<F>
where
    F: Fetcher + 'static,
{
    pub fn new(fetcher: Arc<F>, aggregator: Arc<Aggregator>) -> Self {
        Self {
            fetcher,
            aggregator,
        }
    }

    /// 1URL分の取得と集計
    pub async fn fetch_and_count(&self, url: &str, ctx: &UnitContext) -> ProcessingResult<UnitOutcome> {
        if ctx.is_cancelled() {
            return Ok(UnitOutcome::Cancelled);
        }

        let body = self
            .fetcher
            .fetch(url)
            .await
            .map_err(|e| ProcessingError::fetch(url, e))?;
        ctx.report_fetch_completed(body.len()).await;

        let (counted, hold) = self.aggregator.tally_timed(&body)?;
        ctx.report_lock_held(hold).await;
        trace!(
            url,
            bytes = body.len(),
            counted,
            held_us = hold.duration().as_micros() as u64,
            "body tallied"
        );
        Ok(UnitOutcome::Completed)
    }
}

#[async_trait]
impl<F> WorkProcessor for LetterCounter<F>
where
    F: Fetcher + 'static,
{
    fn name(&self) -> &'static str {
        "LetterCounter"
    }

    async fn process(&self, item: &WorkItem, ctx: &UnitContext) -> ProcessingResult<UnitOutcome> {
        match item {
            WorkItem::FetchAndCount(url) => self.fetch_and_count(url, ctx).await,
            other => Err(ProcessingError::unsupported_item(
                other.to_string(),
                self.name(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::MockProgressReporter;
    use crate::engine::WorkerPool;
    use crate::fetch::MockFetcher;
    use crate::services::NoOpProgressReporter;

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_failed_fetch_leaves_table_untouched() {
        let mut fetcher = MockFetcher::new();
        fetcher.expect_fetch().returning(|url| {
            if url.ends_with("ok") {
                Ok(b"abc ABC".to_vec())
            } else {
                Err(anyhow::anyhow!("connection refused"))
            }
        });

        let aggregator = Arc::new(Aggregator::new());
        let counter = Arc::new(LetterCounter::new(Arc::new(fetcher), Arc::clone(&aggregator)));
        let pool = WorkerPool::start(counter, Arc::new(NoOpProgressReporter::new()), 2).unwrap();

        pool.submit(WorkItem::fetch_and_count("mem://ok")).unwrap();
        pool.submit(WorkItem::fetch_and_count("mem://down")).unwrap();
        pool.join().await.unwrap();

        assert_eq!(pool.stats().succeeded(), 1);
        assert_eq!(pool.stats().failed(), 1);
        pool.shutdown().await.unwrap();

        let snapshot = aggregator.snapshot().unwrap();
        assert_eq!(snapshot.frequencies.total(), 6);
        assert_eq!(snapshot.frequencies.get('a'), Some(2));
        // 失敗したユニットはロックを取得しない
        assert_eq!(snapshot.lock_acquisitions, 1);
    }

    #[tokio::test]
    async fn test_reports_fetch_then_lock_hold() {
        let mut fetcher = MockFetcher::new();
        fetcher
            .expect_fetch()
            .returning(|_| Ok(b"abc ABC".to_vec()));

        let mut reporter = MockProgressReporter::new();
        reporter.expect_report_unit_started().return_const(());
        reporter
            .expect_report_fetch_completed()
            .withf(|worker_id, item, bytes| {
                *worker_id == 0 && item.target() == "mem://ok" && *bytes == 7
            })
            .times(1)
            .return_const(());
        reporter
            .expect_report_lock_held()
            .withf(|worker_id, _, hold| *worker_id == 0 && hold.acquired <= hold.released)
            .times(1)
            .return_const(());
        reporter.expect_report_unit_finished().return_const(());

        let aggregator = Arc::new(Aggregator::new());
        let counter = Arc::new(LetterCounter::new(Arc::new(fetcher), Arc::clone(&aggregator)));
        let pool = WorkerPool::start(counter, Arc::new(reporter), 1).unwrap();

        pool.submit(WorkItem::fetch_and_count("mem://ok")).unwrap();
        pool.join().await.unwrap();
        assert_eq!(pool.stats().succeeded(), 1);
        pool.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_cancelled_before_fetch() {
        let counter = Arc::new(LetterCounter::new(
            Arc::new(MockFetcher::new()),
            Arc::new(Aggregator::new()),
        ));
        let pool = WorkerPool::start(counter, Arc::new(NoOpProgressReporter::new()), 1).unwrap();

        pool.cancel();
        pool.submit(WorkItem::fetch_and_count("mem://never")).unwrap();
        pool.join().await.unwrap();

        assert_eq!(pool.stats().cancelled(), 1);
        pool.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_directory_item_is_rejected() {
        let counter = Arc::new(LetterCounter::new(
            Arc::new(MockFetcher::new()),
            Arc::new(Aggregator::new()),
        ));
        let pool = WorkerPool::start(counter, Arc::new(NoOpProgressReporter::new()), 1).unwrap();

        pool.submit(WorkItem::directory_scan("/tmp")).unwrap();
        pool.join().await.unwrap();

        assert_eq!(pool.stats().failed(), 1);
        pool.shutdown().await.unwrap();
    }
}
