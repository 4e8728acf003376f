use std::sync::atomic::{AtomicU64, Ordering};

/// Counters shared by every worker. Registered once with `web::Data`.
#[derive(Debug, Default)]
pub struct ServerMetrics {
    file_server_hits: AtomicU64,
}

impl ServerMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_hit(&self) {
        self.file_server_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn hits(&self) -> u64 {
        self.file_server_hits.load(Ordering::Relaxed)
    }

    pub fn reset(&self) {
        self.file_server_hits.store(0, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_hits_accumulate_and_reset() {
        let metrics = ServerMetrics::new();
        assert_eq!(metrics.hits(), 0);

        metrics.record_hit();
        metrics.record_hit();
        assert_eq!(metrics.hits(), 2);

        metrics.reset();
        assert_eq!(metrics.hits(), 0);
    }

    #[test]
    fn test_concurrent_hits_are_not_lost() {
        let metrics = Arc::new(ServerMetrics::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let metrics = Arc::clone(&metrics);
                std::thread::spawn(move || {
                    for _ in 0..1000 {
                        metrics.record_hit();
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(metrics.hits(), 8000);
    }
}
