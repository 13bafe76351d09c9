//! Shared Model Handles
//!
//! Model backends are expensive to bring up (weights, warmup, network
//! sessions). `ModelPool` constructs each handle once on first use and hands
//! out shared `Arc` clones afterwards; a failed construction is retried on
//! the next request. Handles are passed into the loop explicitly, never
//! reached through globals.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::info;

use segflow_core::{CoreResult, Segmenter};
use segflow_oracle::Oracle;

/// Builds the segmentation backend on demand.
#[async_trait]
pub trait SegmenterFactory: Send + Sync {
    async fn connect(&self) -> CoreResult<Arc<dyn Segmenter>>;
}

/// Builds the oracle backend on demand.
#[async_trait]
pub trait OracleFactory: Send + Sync {
    async fn connect(&self) -> CoreResult<Arc<dyn Oracle>>;
}

/// Lazily initialized shared handles to the two model backends.
pub struct ModelPool {
    segmenter_factory: Arc<dyn SegmenterFactory>,
    oracle_factory: Arc<dyn OracleFactory>,
    segmenter: OnceCell<Arc<dyn Segmenter>>,
    oracle: OnceCell<Arc<dyn Oracle>>,
}

impl ModelPool {
    pub fn new(
        segmenter_factory: Arc<dyn SegmenterFactory>,
        oracle_factory: Arc<dyn OracleFactory>,
    ) -> Self {
        Self {
            segmenter_factory,
            oracle_factory,
            segmenter: OnceCell::new(),
            oracle: OnceCell::new(),
        }
    }

    /// Shared segmenter handle, constructed on first call.
    pub async fn segmenter(&self) -> CoreResult<Arc<dyn Segmenter>> {
        self.segmenter
            .get_or_try_init(|| async {
                info!("constructing segmenter handle");
                self.segmenter_factory.connect().await
            })
            .await
            .cloned()
    }

    /// Shared oracle handle, constructed on first call.
    pub async fn oracle(&self) -> CoreResult<Arc<dyn Oracle>> {
        self.oracle
            .get_or_try_init(|| async {
                info!("constructing oracle handle");
                self.oracle_factory.connect().await
            })
            .await
            .cloned()
    }

    pub fn is_segmenter_ready(&self) -> bool {
        self.segmenter.initialized()
    }

    pub fn is_oracle_ready(&self) -> bool {
        self.oracle.initialized()
    }

    /// Drop both handles; the next request reconstructs them.
    pub fn shutdown(&mut self) {
        self.segmenter = OnceCell::new();
        self.oracle = OnceCell::new();
        info!("model handles released");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use segflow_core::{CoreError, Image, Mask};
    use segflow_oracle::OracleReply;

    struct NullSegmenter;

    #[async_trait]
    impl Segmenter for NullSegmenter {
        async fn segment(&self, _object_label: &str, image: &Image) -> CoreResult<Mask> {
            Ok(Mask::new(image.width(), image.height()))
        }
    }

    struct NullOracle;

    #[async_trait]
    impl Oracle for NullOracle {
        fn name(&self) -> &'static str {
            "null"
        }

        async fn decide(&self, _system_prompt: &str, _context: &str) -> CoreResult<OracleReply> {
            Ok(OracleReply {
                reasoning: String::new(),
                answer: r#"{"tool": "pass", "parameters": {}}"#.to_string(),
            })
        }
    }

    struct CountingSegmenterFactory {
        connects: AtomicUsize,
        fail_first: bool,
    }

    #[async_trait]
    impl SegmenterFactory for CountingSegmenterFactory {
        async fn connect(&self) -> CoreResult<Arc<dyn Segmenter>> {
            let n = self.connects.fetch_add(1, Ordering::SeqCst);
            if self.fail_first && n == 0 {
                return Err(CoreError::internal("backend warming up"));
            }
            Ok(Arc::new(NullSegmenter))
        }
    }

    struct NullOracleFactory;

    #[async_trait]
    impl OracleFactory for NullOracleFactory {
        async fn connect(&self) -> CoreResult<Arc<dyn Oracle>> {
            Ok(Arc::new(NullOracle))
        }
    }

    #[tokio::test]
    async fn test_segmenter_constructed_once() {
        let factory = Arc::new(CountingSegmenterFactory {
            connects: AtomicUsize::new(0),
            fail_first: false,
        });
        let pool = ModelPool::new(factory.clone(), Arc::new(NullOracleFactory));

        assert!(!pool.is_segmenter_ready());
        let a = pool.segmenter().await.unwrap();
        let b = pool.segmenter().await.unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(factory.connects.load(Ordering::SeqCst), 1);
        assert!(pool.is_segmenter_ready());
    }

    #[tokio::test]
    async fn test_failed_construction_retries() {
        let factory = Arc::new(CountingSegmenterFactory {
            connects: AtomicUsize::new(0),
            fail_first: true,
        });
        let pool = ModelPool::new(factory.clone(), Arc::new(NullOracleFactory));

        assert!(pool.segmenter().await.is_err());
        assert!(!pool.is_segmenter_ready());
        assert!(pool.segmenter().await.is_ok());
        assert_eq!(factory.connects.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_shutdown_releases_handles() {
        let factory = Arc::new(CountingSegmenterFactory {
            connects: AtomicUsize::new(0),
            fail_first: false,
        });
        let mut pool = ModelPool::new(factory.clone(), Arc::new(NullOracleFactory));

        pool.segmenter().await.unwrap();
        pool.shutdown();
        assert!(!pool.is_segmenter_ready());
        pool.segmenter().await.unwrap();
        assert_eq!(factory.connects.load(Ordering::SeqCst), 2);
    }
}
