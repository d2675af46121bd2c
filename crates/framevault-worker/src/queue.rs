//! Job queue seam and in-process implementation.

use crate::processor::ProcessVideoHandler;
use anyhow::Result;
use async_trait::async_trait;
use framevault_core::ProcessingJob;
use std::sync::Arc;
use tokio::sync::{mpsc, Semaphore};

/// Producer-side seam between the upload path and job execution.
#[async_trait]
pub trait JobQueue: Send + Sync {
    async fn submit(&self, job: ProcessingJob) -> Result<()>;
}

/// In-process job queue with a bounded channel and a semaphore-limited
/// worker pool. If the queue is full, `submit()` returns an error rather
/// than blocking the request path.
pub struct LocalJobQueue {
    tx: mpsc::Sender<ProcessingJob>,
}

impl LocalJobQueue {
    pub fn new(
        handler: Arc<ProcessVideoHandler>,
        queue_size: usize,
        max_concurrent: usize,
    ) -> Self {
        let queue_size = queue_size.max(1);
        let (tx, rx) = mpsc::channel(queue_size);

        tokio::spawn(async move {
            Self::worker_pool(rx, handler, max_concurrent.max(1)).await;
        });

        tracing::info!(
            queue_size = queue_size,
            max_concurrent = max_concurrent,
            "Job queue initialized with bounded channel"
        );

        Self { tx }
    }

    async fn worker_pool(
        mut rx: mpsc::Receiver<ProcessingJob>,
        handler: Arc<ProcessVideoHandler>,
        max_concurrent: usize,
    ) {
        let semaphore = Arc::new(Semaphore::new(max_concurrent));

        while let Some(job) = rx.recv().await {
            let permit = semaphore.clone().acquire_owned().await;
            let handler = handler.clone();

            tokio::spawn(async move {
                let _permit = permit;
                handler.handle_job(&job).await;
            });
        }
    }
}

#[async_trait]
impl JobQueue for LocalJobQueue {
    async fn submit(&self, job: ProcessingJob) -> Result<()> {
        tracing::info!(video_id = job.video_id, "Enqueuing frame extraction job");
        self.tx.try_send(job).map_err(|e| match &e {
            mpsc::error::TrySendError::Full(_) => {
                tracing::warn!("Job queue is full, rejecting job");
                anyhow::anyhow!("Job queue is full, please try again later")
            }
            _ => anyhow::anyhow!("Failed to submit job: {}", e),
        })?;
        Ok(())
    }
}

impl Clone for LocalJobQueue {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processor::tests::{FakeExtractor, MemoryVideoStore};
    use framevault_core::{Video, VideoStatus};
    use std::time::Duration;

    #[tokio::test]
    async fn test_submitted_job_reaches_terminal_state() {
        let video = Video {
            id: 1,
            user_id: Some(1),
            title: Some("demo".to_string()),
            file_path: Some("uploads/20240101_120000_demo.mp4".to_string()),
            status: VideoStatus::Pending,
        };
        let store = Arc::new(MemoryVideoStore::with_video(video));
        let handler = Arc::new(ProcessVideoHandler::new(
            store.clone(),
            Arc::new(FakeExtractor { fail: false }),
        ));
        let queue = LocalJobQueue::new(handler, 16, 2);

        queue
            .submit(ProcessingJob {
                video_id: 1,
                file_path: "uploads/20240101_120000_demo.mp4".to_string(),
                correlation_id: "20240101_120000".to_string(),
                user_id: Some(1),
            })
            .await
            .unwrap();

        // Poll until the worker pool finishes the job.
        for _ in 0..100 {
            if store.get(1).unwrap().status == VideoStatus::Ready {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("job did not reach a terminal state");
    }
}
