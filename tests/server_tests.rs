use std::time::Duration;

use broadside::server::{Registry, Server};
use broadside::transport::Transport;
use broadside::{Coord, Message, OpenGame, TcpTransport};
use tokio::io::AsyncWriteExt;

async fn wait_until<F: Fn() -> bool>(cond: F, what: &str) {
    for _ in 0..200 {
        if cond() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("timed out waiting for {}", what);
}

#[test]
fn registry_tracks_adds_and_removes() {
    let registry = Registry::default();
    let addr1 = "10.0.0.1:1000".parse().unwrap();
    let addr2 = "10.0.0.2:2000".parse().unwrap();

    let id1 = registry.add(addr1);
    let id2 = registry.add(addr2);
    assert_ne!(id1, id2);
    assert_eq!(registry.len(), 2);

    registry.remove(id1);
    assert_eq!(registry.list(), vec![addr2]);
    registry.remove(id2);
    assert!(registry.is_empty());

    // removing an unknown id is harmless
    registry.remove(id1);
    assert!(registry.is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn connections_register_and_release() -> anyhow::Result<()> {
    let server = Server::bind("127.0.0.1:0").await?;
    let addr = server.local_addr()?;
    let registry = server.registry();
    tokio::spawn(server.run());

    let mut c1 = TcpTransport::connect(addr).await?;
    let mut c2 = TcpTransport::connect(addr).await?;
    c1.send(Message::Connect {
        username: "one".into(),
    })
    .await?;
    c2.send(Message::Ping).await?;
    wait_until(|| registry.len() == 2, "both connections registered").await;

    drop(c1);
    wait_until(|| registry.len() == 1, "first connection released").await;
    drop(c2);
    wait_until(|| registry.is_empty(), "all connections released").await;
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn bad_frame_ends_only_that_connection() -> anyhow::Result<()> {
    let server = Server::bind("127.0.0.1:0").await?;
    let addr = server.local_addr()?;
    let registry = server.registry();
    tokio::spawn(server.run());

    let mut healthy = TcpTransport::connect(addr).await?;
    let mut raw = tokio::net::TcpStream::connect(addr).await?;
    wait_until(|| registry.len() == 2, "both connections registered").await;

    // tag 250 names no message kind
    raw.write_all(&0u32.to_be_bytes()).await?;
    raw.write_all(&[250u8]).await?;
    raw.flush().await?;
    wait_until(|| registry.len() == 1, "bad connection released").await;

    // the healthy connection still works
    healthy.send(Message::Ping).await?;
    drop(healthy);
    wait_until(|| registry.is_empty(), "healthy connection released").await;
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn server_decodes_the_whole_catalog_without_replying() -> anyhow::Result<()> {
    let server = Server::bind("127.0.0.1:0").await?;
    let addr = server.local_addr()?;
    let registry = server.registry();
    tokio::spawn(server.run());

    let mut client = TcpTransport::connect(addr).await?;
    let catalog = vec![
        Message::Ping,
        Message::Ok { ok: None },
        Message::Error {
            error: Some("nothing".into()),
        },
        Message::GameMove {
            player: 1,
            x: 4,
            y: 5,
        },
        Message::ChatMessage { msg: "ahoy".into() },
        Message::Connect {
            username: "pico".into(),
        },
        Message::RequestOpenGamesList,
        Message::CreateGame,
        Message::JoinGame { id: 1 },
        Message::AcceptGame { id: 1 },
        Message::RejectGame { id: 1 },
        Message::GameSetPiece {
            piece: 4,
            start: Coord::new(0, 0),
            end: Coord::new(4, 0),
        },
        Message::RequestGameState,
        Message::AbandonGame,
        Message::OpenGamesList {
            games: vec![OpenGame {
                id: 7,
                username: "crow".into(),
            }],
        },
        Message::GamePreGameStatus {
            id: 7,
            opponent: "crow".into(),
        },
        Message::GameState {
            p1: "a".into(),
            p2: "b".into(),
            you: vec![vec![0]],
            opponent: vec![vec![1]],
        },
        Message::GameWon,
        Message::GameLost,
    ];
    for msg in catalog {
        client.send(msg).await?;
    }

    // every kind decodes; the connection stays up and nothing comes back
    wait_until(|| registry.len() == 1, "connection registered").await;
    let reply = tokio::time::timeout(Duration::from_millis(200), client.recv()).await;
    assert!(reply.is_err(), "server should not reply to any message");

    drop(client);
    wait_until(|| registry.is_empty(), "connection released").await;
    Ok(())
}
