use std::sync::Arc;
use std::time::Duration;

use pastel_chat::{ChatConfig, ChatError, Message, SessionController};
use pastel_relay::{BroadcastHub, Peer};
use tokio::time::timeout;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

const DELIVERY_TIMEOUT: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = match ChatConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = run(config).await {
        error!(recoverable = e.is_recoverable(), "Demo failed: {}", e);
        std::process::exit(1);
    }
}

async fn run(config: ChatConfig) -> Result<(), ChatError> {
    let hub = Arc::new(BroadcastHub::new(config.channel_name.clone()));
    info!("Broadcast channel {} open", hub.name());

    let mut alice = Peer::join(&hub, "alice", config.clone());
    let mut bob = Peer::join(&hub, "bob", config.clone());
    for peer in [&alice, &bob] {
        info!("{} joined {}", peer.endpoint.id(), hub.name());
    }

    // Public keys are swapped out of band, e.g. pasted by the users
    let alice_key = alice.client.start()?;
    let bob_key = bob.client.start()?;
    info!("alice public key: {}", alice_key);
    info!("bob public key: {}", bob_key);

    alice.client.connect_async(&bob_key).await?;
    bob.client.connect_async(&alice_key).await?;

    // Mallory shares the channel but her session was keyed with someone else
    let mallory = Peer::join(&hub, "mallory", config);
    let mut trent = SessionController::new();
    let trent_key = trent.start()?;
    mallory.client.start()?;
    mallory.client.connect(&trent_key)?;

    alice.client.send_message("hello")?;
    expect_delivery(&mut bob).await?;

    bob.client.send_message("hi alice, keys look good")?;
    expect_delivery(&mut alice).await?;

    mallory.client.send_message("you can't read this")?;
    tokio::time::sleep(Duration::from_millis(50)).await;

    for peer in [&alice, &bob] {
        info!(
            "{} ({:?}) transcript: {} messages",
            peer.name,
            peer.client.state(),
            peer.client.messages().len()
        );
        for message in peer.client.messages() {
            print_message(&peer.name, &message);
        }
    }

    Ok(())
}

async fn expect_delivery(peer: &mut Peer) -> Result<(), ChatError> {
    match timeout(DELIVERY_TIMEOUT, peer.inbox.recv()).await {
        Ok(Some(message)) => {
            print_message(&peer.name, &message);
            Ok(())
        }
        Ok(None) => Err(ChatError::Transport(format!(
            "{} inbound stream closed",
            peer.name
        ))),
        Err(_) => {
            warn!("{} did not receive a message in time", peer.name);
            Err(ChatError::Transport("Delivery timed out".to_string()))
        }
    }
}

fn print_message(owner: &str, message: &Message) {
    println!(
        "[{}] {} {:?}: {}",
        owner, message.timestamp, message.sender, message.content
    );
}
