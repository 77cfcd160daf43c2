use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use super::registry::{PeerRegistry, PeerSink};
use crate::error::SinkError;
use crate::feature::Transaction;

const DELIVERY_TIMEOUT: Duration = Duration::from_millis(500);
const DELIVERY_ATTEMPTS: usize = 3;

/// Sink backed by an unbounded queue drained by a dedicated sender task.
///
/// One task per peer keeps delivery ordered per peer; `send` only enqueues
/// and fails when the sender task has exited.
struct QueuedPeerSink {
    queue: mpsc::UnboundedSender<Transaction>,
}

impl PeerSink for QueuedPeerSink {
    fn send(&self, tx: &Transaction) -> Result<(), SinkError> {
        self.queue.send(tx.clone()).map_err(|_| SinkError)
    }
}

/// Open a sink to every peer of `node` and register it.
///
/// Each sink posts transactions to the peer's replication ingest route on
/// the shared gateway address. A peer whose deliveries exhaust their retries
/// is evicted from the registry; it is offered a fresh sink on the next
/// startup, when the engine also rebroadcasts its state to catch it up.
pub fn open_peer_sinks(
    registry: &Arc<PeerRegistry>,
    node: &str,
    peers: &[String],
    gateway_addr: SocketAddr,
) {
    for peer in peers {
        let (queue_tx, queue_rx) = mpsc::unbounded_channel();
        registry.add(peer.clone(), Arc::new(QueuedPeerSink { queue: queue_tx }));

        let url = format!("http://{}/{}/replication", gateway_addr, peer);
        tracing::info!("{}: opened replication sink to {}", node, peer);
        tokio::spawn(run_sender(registry.clone(), peer.clone(), url, queue_rx));
    }
}

async fn run_sender(
    registry: Arc<PeerRegistry>,
    peer: String,
    url: String,
    mut queue: mpsc::UnboundedReceiver<Transaction>,
) {
    let client = reqwest::Client::new();
    while let Some(tx) = queue.recv().await {
        if let Err(err) = post_with_retry(&client, &url, &tx).await {
            tracing::error!("Replication to {} failed, evicting: {}", peer, err);
            registry.remove(&peer);
            return;
        }
    }
}

/// POST with bounded exponential backoff and jitter.
async fn post_with_retry<T: serde::Serialize>(
    client: &reqwest::Client,
    url: &str,
    payload: &T,
) -> anyhow::Result<()> {
    let mut delay_ms = 150u64;

    for attempt in 0..DELIVERY_ATTEMPTS {
        let response = client
            .post(url)
            .json(payload)
            .timeout(DELIVERY_TIMEOUT)
            .send()
            .await;

        match response {
            Ok(resp) if resp.status().is_success() => return Ok(()),
            Ok(resp) => {
                if attempt + 1 == DELIVERY_ATTEMPTS {
                    anyhow::bail!("peer rejected transaction: {}", resp.status());
                }
            }
            Err(err) => {
                if attempt + 1 == DELIVERY_ATTEMPTS {
                    return Err(anyhow::anyhow!(err));
                }
            }
        }

        let jitter = rand::random::<u64>() % 50;
        tokio::time::sleep(Duration::from_millis(delay_ms + jitter)).await;
        delay_ms = (delay_ms * 2).min(1200);
    }

    anyhow::bail!("Retry attempts exhausted")
}
