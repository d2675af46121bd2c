//! SQS-backed job queue.
//!
//! Publisher and consumer halves for deployments that run extraction in a
//! separate process. Delivery is at-least-once; the handler is idempotent so
//! redelivered messages are harmless.

use crate::processor::ProcessVideoHandler;
use crate::queue::JobQueue;
use anyhow::Result;
use async_trait::async_trait;
use aws_sdk_sqs::Client;
use framevault_core::ProcessingJob;
use std::sync::Arc;
use std::time::Duration;

/// Publishes jobs to an SQS queue as JSON messages.
pub struct SqsJobQueue {
    client: Client,
    queue_url: String,
}

impl SqsJobQueue {
    pub fn new(client: Client, queue_url: String) -> Self {
        Self { client, queue_url }
    }

    /// Build a client from the ambient AWS environment.
    pub async fn from_env(queue_url: String) -> Self {
        let aws_config = aws_config::load_from_env().await;
        Self::new(Client::new(&aws_config), queue_url)
    }

    pub fn client(&self) -> Client {
        self.client.clone()
    }
}

#[async_trait]
impl JobQueue for SqsJobQueue {
    async fn submit(&self, job: ProcessingJob) -> Result<()> {
        let body = serde_json::to_string(&job)?;

        self.client
            .send_message()
            .queue_url(&self.queue_url)
            .message_body(body)
            .send()
            .await
            .map_err(|e| anyhow::anyhow!("Failed to publish job to SQS: {}", e))?;

        tracing::info!(
            video_id = job.video_id,
            correlation_id = %job.correlation_id,
            "Job published to SQS"
        );
        Ok(())
    }
}

/// Long-polling consumer loop. Each message is handled to a terminal state
/// and then deleted; malformed bodies are logged and deleted so they cannot
/// poison the queue.
pub async fn run_sqs_consumer(client: Client, queue_url: String, handler: Arc<ProcessVideoHandler>) {
    tracing::info!(queue_url = %queue_url, "SQS consumer started");

    loop {
        let received = client
            .receive_message()
            .queue_url(&queue_url)
            .max_number_of_messages(10)
            .wait_time_seconds(20)
            .send()
            .await;

        let output = match received {
            Ok(output) => output,
            Err(e) => {
                tracing::error!(error = %e, "SQS receive failed, backing off");
                tokio::time::sleep(Duration::from_secs(5)).await;
                continue;
            }
        };

        for message in output.messages() {
            if let Some(body) = message.body() {
                match serde_json::from_str::<ProcessingJob>(body) {
                    Ok(job) => handler.handle_job(&job).await,
                    Err(e) => {
                        tracing::warn!(error = %e, "Discarding malformed job message");
                    }
                }
            }

            if let Some(receipt_handle) = message.receipt_handle() {
                if let Err(e) = client
                    .delete_message()
                    .queue_url(&queue_url)
                    .receipt_handle(receipt_handle)
                    .send()
                    .await
                {
                    tracing::error!(error = %e, "Failed to delete SQS message");
                }
            }
        }
    }
}
