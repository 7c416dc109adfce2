//! JSON-lines transport
//!
//! Stdin carries host events, one per line. Every observer gets its own
//! forwarding task; all output funnels through a single stdout writer so
//! lines never interleave.

use std::collections::HashMap;

use anyhow::Context;
use serde::Serialize;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;

use rewind_core::{
    spawn_recorder, AgentDelivery, AgentEnvelope, Config, ObserverId, OutboundMessage, Recorder,
    RecorderHandle,
};

use crate::wire::{BridgeInput, BridgeOutput};

pub async fn run(config: Config) -> anyhow::Result<()> {
    let (line_tx, line_rx) = mpsc::unbounded_channel::<String>();
    let writer = tokio::spawn(write_lines(line_rx));

    let (agent_tx, agent_rx) = mpsc::unbounded_channel();
    tokio::spawn(relay_agent_deliveries(agent_rx, line_tx.clone()));

    let recorder = Recorder::new(&config).with_agent_outbox(agent_tx);
    let (handle, task) = spawn_recorder(recorder, config.event_queue_capacity);

    let mut observers: HashMap<String, ObserverId> = HashMap::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await.context("failed to read stdin")? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let input: BridgeInput = match serde_json::from_str(line) {
            Ok(input) => input,
            Err(e) => {
                tracing::warn!(error = %e, "Skipping unreadable input line");
                continue;
            }
        };

        if matches!(input, BridgeInput::Shutdown) {
            break;
        }

        dispatch(input, &handle, &mut observers, &line_tx).await?;
    }

    handle.shutdown().await?;
    let recorder = task.await.context("recorder task panicked")?;
    tracing::info!(
        sessions = recorder.store().len(),
        observers = recorder.observers().len(),
        "Bridge closed"
    );

    // Dropping the recorder closes every observer and agent channel, which
    // winds down the forwarding tasks and finally the writer.
    drop(recorder);
    drop(line_tx);
    writer.await.context("stdout writer panicked")??;

    Ok(())
}

async fn dispatch(
    input: BridgeInput,
    handle: &RecorderHandle,
    observers: &mut HashMap<String, ObserverId>,
    line_tx: &mpsc::UnboundedSender<String>,
) -> anyhow::Result<()> {
    match input {
        BridgeInput::Agent {
            tab_id,
            title,
            message,
        } => {
            handle
                .agent_message(AgentEnvelope {
                    tab_id,
                    title,
                    message,
                })
                .await?
        }
        BridgeInput::ObserverConnect { observer } => {
            if let Some(previous) = observers.remove(&observer) {
                handle.disconnect_observer(previous).await?;
            }
            let (id, rx) = handle.connect_observer().await?;
            tokio::spawn(forward_observer(observer.clone(), rx, line_tx.clone()));
            observers.insert(observer, id);
        }
        BridgeInput::ObserverMessage { observer, message } => match observers.get(&observer) {
            Some(&id) => handle.observer_message(id, message).await?,
            None => tracing::warn!(observer = %observer, "Message from unconnected observer"),
        },
        BridgeInput::ObserverDisconnect { observer } => {
            if let Some(id) = observers.remove(&observer) {
                handle.disconnect_observer(id).await?;
            }
        }
        BridgeInput::TabRemoved { tab_id } => handle.tab_removed(tab_id).await?,
        BridgeInput::Shutdown => {}
    }

    Ok(())
}

async fn forward_observer(
    name: String,
    mut rx: mpsc::UnboundedReceiver<OutboundMessage>,
    line_tx: mpsc::UnboundedSender<String>,
) {
    while let Some(message) = rx.recv().await {
        let line = BridgeOutput::Observer {
            observer: &name,
            message: &message,
        };
        if !emit(&line_tx, &line) {
            break;
        }
    }
    tracing::debug!(observer = %name, "Observer stream ended");
}

async fn relay_agent_deliveries(
    mut rx: mpsc::UnboundedReceiver<AgentDelivery>,
    line_tx: mpsc::UnboundedSender<String>,
) {
    while let Some(delivery) = rx.recv().await {
        if !emit(&line_tx, &BridgeOutput::agent(&delivery)) {
            break;
        }
    }
}

/// Queue one output line. Returns `false` once the writer is gone.
fn emit<T: Serialize>(line_tx: &mpsc::UnboundedSender<String>, value: &T) -> bool {
    match serde_json::to_string(value) {
        Ok(json) => line_tx.send(json).is_ok(),
        Err(e) => {
            tracing::error!("Failed to serialize output line: {}", e);
            true
        }
    }
}

async fn write_lines(mut rx: mpsc::UnboundedReceiver<String>) -> std::io::Result<()> {
    let mut stdout = tokio::io::stdout();
    while let Some(line) = rx.recv().await {
        stdout.write_all(line.as_bytes()).await?;
        stdout.write_all(b"\n").await?;
        stdout.flush().await?;
    }
    Ok(())
}
