//! The batch sync driver.
//!
//! Strictly sequential: one category at a time, one item at a time, in
//! registration/enumeration order. Failure isolation is the central
//! contract -- an item failure never aborts its category, a category's
//! enumeration failure never aborts the run. The engine owns the only
//! mutable state (the accumulating stats) and returns it frozen inside
//! a [`RunReport`].

use std::time::Duration;

use chrono::Utc;
use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::category::Category;
use crate::error::CoreError;
use crate::event::SyncEvent;
use crate::model::{Item, Outcome, TargetHandle};
use crate::provider::ActionError;
use crate::report::{CategoryStats, RunReport};

/// Tuning knobs for a sync run.
#[derive(Debug, Clone)]
pub struct SyncOptions {
    /// Pause between items, as courtesy pacing for the downstream
    /// service. Not functionally required; zero disables it.
    pub item_delay: Duration,
    /// Optional per-item deadline on the distribute call. Expiry is
    /// recorded as an item failure, not a run error.
    pub item_timeout: Option<Duration>,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            item_delay: Duration::from_millis(250),
            item_timeout: None,
        }
    }
}

/// The batch sync driver.
///
/// Construct with [`SyncEngine::new`], optionally attach an event channel
/// and a cancellation token, then call [`run`](SyncEngine::run).
pub struct SyncEngine {
    options: SyncOptions,
    events: Option<UnboundedSender<SyncEvent>>,
    cancel: CancellationToken,
}

impl SyncEngine {
    pub fn new(options: SyncOptions) -> Self {
        Self {
            options,
            events: None,
            cancel: CancellationToken::new(),
        }
    }

    /// Attach a channel for structured progress events.
    pub fn with_events(mut self, events: UnboundedSender<SyncEvent>) -> Self {
        self.events = Some(events);
        self
    }

    /// Attach an external cancellation signal, checked between items.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Run the sync across all registered categories.
    ///
    /// Fails fast only on precondition violations (empty category list);
    /// every runtime failure is recorded in the returned report instead.
    pub async fn run(
        &self,
        categories: &[Category],
        target: &TargetHandle,
    ) -> Result<RunReport, CoreError> {
        if categories.is_empty() {
            return Err(CoreError::NoCategories);
        }

        let started_at = Utc::now();
        info!(target = %target, categories = categories.len(), "starting sync run");

        let mut stats_list: Vec<CategoryStats> = Vec::with_capacity(categories.len());
        let mut cancelled = false;

        for category in categories {
            if self.cancel.is_cancelled() {
                cancelled = true;
                break;
            }
            match self.run_category(category, target).await {
                CategoryRun::Finished(stats) => stats_list.push(stats),
                CategoryRun::Cancelled(stats) => {
                    stats_list.push(stats);
                    cancelled = true;
                    break;
                }
            }
        }

        if cancelled {
            warn!("sync run cancelled -- report reflects partial completion");
            self.emit(SyncEvent::Cancelled);
        }

        let report = RunReport {
            categories: stats_list,
            started_at,
            finished_at: Utc::now(),
            cancelled,
        };
        info!(
            total = report.total_items(),
            success = report.total_success(),
            failed = report.total_failed(),
            "sync run finished"
        );
        Ok(report)
    }

    /// Process one category: enumerate, then distribute each item.
    async fn run_category(&self, category: &Category, target: &TargetHandle) -> CategoryRun {
        let name = category.name();

        let items = match category.provider().enumerate().await {
            Ok(items) => items,
            Err(err) => {
                warn!(category = name, error = %err, "enumeration failed, skipping category");
                self.emit(SyncEvent::EnumerationFailed {
                    category: name.to_owned(),
                    reason: err.to_string(),
                });
                return CategoryRun::Finished(CategoryStats::enumeration_failed(
                    name,
                    err.to_string(),
                ));
            }
        };

        let mut stats = CategoryStats::new(name, items.len());
        debug!(category = name, total = stats.total, "category enumerated");
        self.emit(SyncEvent::CategoryStarted {
            category: name.to_owned(),
            total: stats.total,
        });

        for (index, item) in items.iter().enumerate() {
            // Cancellation is only honored between items, never mid-item.
            if self.cancel.is_cancelled() {
                self.emit(SyncEvent::CategoryFinished {
                    stats: stats.clone(),
                });
                return CategoryRun::Cancelled(stats);
            }
            if index > 0 && !self.options.item_delay.is_zero() {
                tokio::time::sleep(self.options.item_delay).await;
            }

            let outcome = self.apply(category, item, target).await;
            match &outcome {
                Outcome::Success => {
                    info!(category = name, item = %item, "distributed");
                    stats.record_success();
                }
                Outcome::Failure { reason } => {
                    warn!(category = name, item = %item, reason, "distribution failed");
                    stats.record_failure();
                }
            }
            self.emit(SyncEvent::Item {
                category: name.to_owned(),
                item: item.clone(),
                outcome,
            });
        }

        self.emit(SyncEvent::CategoryFinished {
            stats: stats.clone(),
        });
        CategoryRun::Finished(stats)
    }

    /// Apply the distribute action to one item, honoring the per-item
    /// timeout when configured.
    async fn apply(&self, category: &Category, item: &Item, target: &TargetHandle) -> Outcome {
        let action = category.provider().distribute(item, target);
        let result = match self.options.item_timeout {
            Some(limit) => match tokio::time::timeout(limit, action).await {
                Ok(result) => result,
                Err(_) => Err(ActionError::timed_out(limit)),
            },
            None => action.await,
        };
        match result {
            Ok(()) => Outcome::Success,
            Err(err) => Outcome::Failure {
                reason: err.to_string(),
            },
        }
    }

    fn emit(&self, event: SyncEvent) {
        if let Some(ref tx) = self.events {
            // A dropped receiver must not abort the run.
            let _ = tx.send(event);
        }
    }
}

enum CategoryRun {
    Finished(CategoryStats),
    Cancelled(CategoryStats),
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashSet;
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use tokio::sync::mpsc;

    use super::*;
    use crate::provider::{ContentProvider, ProviderError};

    // ── Scripted test double ────────────────────────────────────────

    /// Provider with a fixed item list, a set of item ids that fail,
    /// and a log of every distribute call.
    struct Scripted {
        items: Vec<Item>,
        fail_ids: HashSet<String>,
        enumerate_error: Option<String>,
        applied: Arc<Mutex<Vec<String>>>,
        cancel_after_first: Option<CancellationToken>,
    }

    impl Scripted {
        fn new(items: Vec<Item>) -> Self {
            Self {
                items,
                fail_ids: HashSet::new(),
                enumerate_error: None,
                applied: Arc::new(Mutex::new(Vec::new())),
                cancel_after_first: None,
            }
        }

        fn failing(mut self, id: &str) -> Self {
            self.fail_ids.insert(id.to_owned());
            self
        }

        fn broken_enumeration(reason: &str) -> Self {
            let mut s = Self::new(Vec::new());
            s.enumerate_error = Some(reason.to_owned());
            s
        }

        fn applied_log(&self) -> Arc<Mutex<Vec<String>>> {
            Arc::clone(&self.applied)
        }
    }

    #[async_trait]
    impl ContentProvider for Scripted {
        async fn enumerate(&self) -> Result<Vec<Item>, ProviderError> {
            match &self.enumerate_error {
                Some(reason) => Err(ProviderError::new(reason.clone())),
                None => Ok(self.items.clone()),
            }
        }

        async fn distribute(
            &self,
            item: &Item,
            _target: &TargetHandle,
        ) -> Result<(), ActionError> {
            self.applied.lock().unwrap().push(item.id.clone());
            if let Some(ref token) = self.cancel_after_first {
                token.cancel();
            }
            if self.fail_ids.contains(&item.id) {
                Err(ActionError::new(format!("refused: {}", item.id)))
            } else {
                Ok(())
            }
        }
    }

    fn items(prefix: &str, count: usize) -> Vec<Item> {
        (1..=count)
            .map(|n| Item::new(format!("{prefix}-{n}"), format!("{prefix} item {n}")))
            .collect()
    }

    fn engine() -> SyncEngine {
        SyncEngine::new(SyncOptions {
            item_delay: Duration::ZERO,
            item_timeout: None,
        })
    }

    fn target() -> TargetHandle {
        TargetHandle::new("dp-target").unwrap()
    }

    // ── Preconditions ───────────────────────────────────────────────

    #[tokio::test]
    async fn empty_category_list_is_rejected() {
        let result = engine().run(&[], &target()).await;
        assert!(matches!(result, Err(CoreError::NoCategories)));
    }

    // ── Accounting ──────────────────────────────────────────────────

    #[tokio::test]
    async fn every_item_is_accounted_for() {
        let categories = vec![
            Category::new("Packages", Box::new(Scripted::new(items("pkg", 4)))),
            Category::new(
                "Applications",
                Box::new(Scripted::new(items("app", 3)).failing("app-1").failing("app-3")),
            ),
        ];
        let report = engine().run(&categories, &target()).await.unwrap();

        for stats in &report.categories {
            assert_eq!(stats.success + stats.failed, stats.total, "{}", stats.name);
        }
        assert_eq!(report.total_items(), 7);
        assert_eq!(report.total_success(), 5);
        assert_eq!(report.total_failed(), 2);
    }

    #[tokio::test]
    async fn item_failure_does_not_abort_the_category() {
        let provider = Scripted::new(items("pkg", 3)).failing("pkg-2");
        let applied = provider.applied_log();
        let categories = vec![Category::new("Packages", Box::new(provider))];

        let report = engine().run(&categories, &target()).await.unwrap();

        assert_eq!(report.categories[0].success, 2);
        assert_eq!(report.categories[0].failed, 1);
        // The third item must still have been processed.
        assert_eq!(
            applied.lock().unwrap().as_slice(),
            ["pkg-1", "pkg-2", "pkg-3"]
        );
    }

    #[tokio::test]
    async fn enumeration_failure_skips_category_but_not_run() {
        let second = Scripted::new(items("app", 2));
        let applied = second.applied_log();
        let categories = vec![
            Category::new("Packages", Box::new(Scripted::broken_enumeration("503"))),
            Category::new("Applications", Box::new(second)),
        ];

        let report = engine().run(&categories, &target()).await.unwrap();

        assert_eq!(report.categories[0].total, 0);
        assert_eq!(report.categories[0].enumeration_error.as_deref(), Some("503"));
        assert_eq!(report.categories[1].total, 2);
        assert_eq!(report.categories[1].success, 2);
        assert_eq!(applied.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn zero_item_category_is_complete_not_an_error() {
        let categories = vec![Category::new("Boot Images", Box::new(Scripted::new(vec![])))];
        let report = engine().run(&categories, &target()).await.unwrap();

        let stats = &report.categories[0];
        assert_eq!((stats.total, stats.success, stats.failed), (0, 0, 0));
        assert_eq!(stats.enumeration_error, None);
        assert_eq!(stats.success_rate(), None);
        assert!(report.is_clean());
    }

    /// The concrete scenario from the driver contract: A 3/3, B 1/2,
    /// C 0/0 -- overall 3 of 5, 60%.
    #[tokio::test]
    async fn mixed_run_aggregates_exactly() {
        let categories = vec![
            Category::new("A", Box::new(Scripted::new(items("a", 3)))),
            Category::new("B", Box::new(Scripted::new(items("b", 2)).failing("b-2"))),
            Category::new("C", Box::new(Scripted::new(vec![]))),
        ];
        let report = engine().run(&categories, &target()).await.unwrap();

        assert_eq!(report.total_items(), 5);
        assert_eq!(report.total_success(), 3);
        assert_eq!(report.total_failed(), 1);
        assert_eq!(report.categories[0].success_rate(), Some(1.0));
        assert_eq!(report.categories[1].success_rate(), Some(0.5));
        assert_eq!(report.categories[2].success_rate(), None);
        assert!((report.success_rate() - 0.6).abs() < f64::EPSILON);
        assert!(!report.is_clean());
    }

    #[tokio::test]
    async fn identical_inputs_produce_identical_reports() {
        let build = || {
            vec![
                Category::new("A", Box::new(Scripted::new(items("a", 3)).failing("a-2"))),
                Category::new("B", Box::new(Scripted::new(items("b", 1)))),
            ]
        };
        let first = engine().run(&build(), &target()).await.unwrap();
        let second = engine().run(&build(), &target()).await.unwrap();

        // Identical modulo timestamps.
        assert_eq!(first.categories, second.categories);
        assert_eq!(first.cancelled, second.cancelled);
    }

    // ── Cancellation ────────────────────────────────────────────────

    #[tokio::test]
    async fn cancellation_returns_partial_report() {
        let token = CancellationToken::new();
        let mut provider = Scripted::new(items("pkg", 3));
        provider.cancel_after_first = Some(token.clone());
        let applied = provider.applied_log();

        let categories = vec![
            Category::new("Packages", Box::new(provider)),
            Category::new("Applications", Box::new(Scripted::new(items("app", 2)))),
        ];
        let report = engine()
            .with_cancellation(token)
            .run(&categories, &target())
            .await
            .unwrap();

        assert!(report.cancelled);
        assert!(!report.is_clean());
        // Only the first item ran; the signal is honored between items.
        assert_eq!(applied.lock().unwrap().len(), 1);
        assert_eq!(report.categories.len(), 1);
        assert_eq!(report.categories[0].success, 1);
    }

    // ── Timeout ─────────────────────────────────────────────────────

    struct Hanging;

    #[async_trait]
    impl ContentProvider for Hanging {
        async fn enumerate(&self) -> Result<Vec<Item>, ProviderError> {
            Ok(vec![Item::new("slow-1", "slow item")])
        }

        async fn distribute(
            &self,
            _item: &Item,
            _target: &TargetHandle,
        ) -> Result<(), ActionError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn hung_distribute_maps_to_item_failure() {
        let engine = SyncEngine::new(SyncOptions {
            item_delay: Duration::ZERO,
            item_timeout: Some(Duration::from_secs(5)),
        });
        let categories = vec![Category::new("Packages", Box::new(Hanging))];
        let report = engine.run(&categories, &target()).await.unwrap();

        assert_eq!(report.categories[0].failed, 1);
        assert_eq!(report.categories[0].success, 0);
    }

    // ── Events ──────────────────────────────────────────────────────

    #[tokio::test]
    async fn events_mirror_the_run() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let categories = vec![
            Category::new("A", Box::new(Scripted::new(items("a", 2)).failing("a-2"))),
            Category::new("B", Box::new(Scripted::broken_enumeration("down"))),
        ];
        let report = engine()
            .with_events(tx)
            .run(&categories, &target())
            .await
            .unwrap();
        assert_eq!(report.total_failed(), 1);

        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }

        assert!(matches!(
            &events[0],
            SyncEvent::CategoryStarted { category, total: 2 } if category == "A"
        ));
        assert!(matches!(
            &events[1],
            SyncEvent::Item { outcome: Outcome::Success, .. }
        ));
        assert!(matches!(
            &events[2],
            SyncEvent::Item { outcome: Outcome::Failure { .. }, .. }
        ));
        assert!(matches!(&events[3], SyncEvent::CategoryFinished { stats } if stats.name == "A"));
        assert!(matches!(
            &events[4],
            SyncEvent::EnumerationFailed { category, reason } if category == "B" && reason == "down"
        ));
        assert_eq!(events.len(), 5);
    }

    #[tokio::test]
    async fn dropped_event_receiver_does_not_abort_run() {
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        let categories = vec![Category::new("A", Box::new(Scripted::new(items("a", 2))))];
        let report = engine()
            .with_events(tx)
            .run(&categories, &target())
            .await
            .unwrap();
        assert_eq!(report.total_success(), 2);
    }

    // ── Pacing ──────────────────────────────────────────────────────

    #[tokio::test(start_paused = true)]
    async fn default_pacing_sleeps_between_items() {
        let engine = SyncEngine::new(SyncOptions::default());
        let categories = vec![Category::new("A", Box::new(Scripted::new(items("a", 3))))];
        let before = tokio::time::Instant::now();
        let report = engine.run(&categories, &target()).await.unwrap();
        assert_eq!(report.total_success(), 3);
        // Two inter-item gaps at the default 250ms.
        assert!(before.elapsed() >= Duration::from_millis(500));
    }
}
