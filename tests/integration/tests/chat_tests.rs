//! End-to-end chat tests over real TCP connections

use std::collections::HashSet;
use std::time::Duration;

use anyhow::Result;
use chat_core::notices;
use integration_tests::{idle_config, TestServer};

#[tokio::test]
async fn test_join_is_broadcast_to_everyone() -> Result<()> {
    let server = TestServer::start().await?;

    let mut alice = server.connect().await?;
    let bob = server.connect().await?;

    alice.expect(&format!("[{0}] {0}: joined", bob.addr)).await?;
    server.wait_for_online(2).await?;
    Ok(())
}

#[tokio::test]
async fn test_who_lists_every_session_including_self() -> Result<()> {
    let server = TestServer::start().await?;

    let mut alice = server.connect().await?;
    let bob = server.connect().await?;
    alice.expect(&format!("[{0}] {0}: joined", bob.addr)).await?;

    alice.send("who").await?;
    let first = alice.recv().await?;
    let second = alice.recv().await?;

    let listed: HashSet<String> = [first, second].into_iter().collect();
    let expected: HashSet<String> = [
        notices::online_entry(&alice.addr, &alice.addr),
        notices::online_entry(&bob.addr, &bob.addr),
    ]
    .into_iter()
    .collect();
    assert_eq!(listed, expected);
    assert!(alice.drain().await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_rename_then_direct_message() -> Result<()> {
    let server = TestServer::start().await?;

    let mut alice = server.connect().await?;
    let mut bob = server.connect().await?;
    let mut carol = server.connect().await?;
    alice.drain().await?;
    bob.drain().await?;

    bob.send("rename|bob").await?;
    bob.expect(&notices::renamed("bob")).await?;
    assert!(server.state.registry().contains("bob"));

    alice.send("to|bob|hi").await?;
    bob.expect(&notices::direct(&alice.addr, "hi")).await?;

    // Nobody else sees a directed message
    assert!(carol.drain().await?.is_empty());
    assert!(alice.drain().await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_rename_to_taken_name() -> Result<()> {
    let server = TestServer::start().await?;

    let mut alice = server.connect().await?;
    let mut bob = server.connect().await?;
    alice.drain().await?;

    alice.send("rename|bob").await?;
    alice.expect(&notices::renamed("bob")).await?;

    bob.drain().await?;
    bob.send("rename|bob").await?;
    bob.expect(notices::NAME_IN_USE).await?;
    assert!(server.state.registry().contains(&bob.addr));
    Ok(())
}

#[tokio::test]
async fn test_direct_to_unknown_user() -> Result<()> {
    let server = TestServer::start().await?;
    let mut alice = server.connect().await?;

    alice.send("to|nobody|hi").await?;
    alice.expect(&notices::not_online("nobody")).await?;
    Ok(())
}

#[tokio::test]
async fn test_malformed_commands_get_inline_replies() -> Result<()> {
    let server = TestServer::start().await?;
    let mut alice = server.connect().await?;

    alice.send("rename|").await?;
    alice.expect(notices::INVALID_RENAME).await?;

    alice.send("rename|a|b").await?;
    alice.expect(notices::INVALID_RENAME).await?;

    alice.send("to|bob").await?;
    alice.expect(notices::INVALID_DIRECT).await?;

    alice.send("to||hi").await?;
    alice.expect(notices::MISSING_RECIPIENT).await?;

    alice.send("to|bob|").await?;
    alice.expect(notices::MISSING_CONTENT).await?;

    // The session is still usable afterwards
    alice.send("who").await?;
    alice.expect(&notices::online_entry(&alice.addr, &alice.addr)).await?;
    Ok(())
}

#[tokio::test]
async fn test_broadcast_reaches_everyone_in_order() -> Result<()> {
    let server = TestServer::start().await?;

    let mut alice = server.connect().await?;
    let mut bob = server.connect().await?;
    alice.drain().await?;

    for i in 0..20 {
        alice.send(&format!("message {i}")).await?;
    }

    let expected: Vec<String> = (0..20)
        .map(|i| format!("[{0}] {0}: message {i}", alice.addr))
        .collect();
    for client in [&mut alice, &mut bob] {
        let mut received = Vec::new();
        for _ in 0..20 {
            received.push(client.recv().await?);
        }
        assert_eq!(received, expected);
    }
    Ok(())
}

#[tokio::test]
async fn test_pipe_in_plain_text_is_broadcast() -> Result<()> {
    let server = TestServer::start().await?;
    let mut alice = server.connect().await?;

    alice.send("hello|world").await?;
    alice
        .expect(&format!("[{0}] {0}: hello|world", alice.addr))
        .await?;
    Ok(())
}

#[tokio::test]
async fn test_disconnect_broadcasts_left() -> Result<()> {
    let server = TestServer::start().await?;

    let mut alice = server.connect().await?;
    let mut bob = server.connect().await?;
    alice.drain().await?;

    let bob_addr = bob.addr.clone();
    bob.shutdown().await?;
    drop(bob);

    alice.expect(&format!("[{0}] {0}: left", bob_addr)).await?;
    server.wait_for_online(1).await?;
    Ok(())
}

#[tokio::test]
async fn test_idle_session_is_evicted() -> Result<()> {
    let server = TestServer::start_with_config(idle_config(1)).await?;

    let mut idle = server.connect().await?;
    let idle_addr = idle.addr.clone();

    let mut active = server.connect().await?;
    let keepalive = tokio::spawn(async move {
        for _ in 0..15 {
            if active.send("").await.is_err() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(200)).await;
        }
        active
    });

    idle.expect(notices::EVICTED_IDLE).await?;
    idle.expect_closed().await?;

    let mut active = keepalive.await?;
    active.expect(&format!("[{0}] {0}: left", idle_addr)).await?;
    assert!(!server.state.registry().contains(&idle_addr));
    assert!(server.state.registry().contains(&active.addr));
    Ok(())
}

#[tokio::test]
async fn test_concurrent_joins() -> Result<()> {
    let server = TestServer::start().await?;

    let mut joins = Vec::new();
    for _ in 0..16 {
        let addr = server.addr;
        joins.push(tokio::spawn(async move {
            integration_tests::TestClient::connect(addr).await
        }));
    }

    let mut clients = Vec::new();
    for join in joins {
        clients.push(join.await??);
    }

    server.wait_for_online(16).await?;
    let names: HashSet<String> = server
        .state
        .registry()
        .snapshot()
        .iter()
        .map(|session| session.name())
        .collect();
    assert_eq!(names.len(), 16);
    for client in &clients {
        assert!(names.contains(&client.addr));
    }
    Ok(())
}
