use std::collections::HashMap;
use std::time::Duration;

use chain_notify::ChainEvent;
use chain_notify::OutPoint;
use chain_notify::Transaction;
use chain_notify::TxIn;
use chain_notify::TxOut;
use chain_notify::TX_TREE_REGULAR;
use tokio::time::timeout;
use tokio_stream::StreamExt;
use tokio_util::sync::CancellationToken;

use crate::common::hash_of;
use crate::common::header_at;
use crate::common::simulated_client;
use crate::common::NodePush;
use crate::common::NodeSettings;

fn transaction() -> Transaction {
    Transaction {
        version: 1,
        inputs: vec![TxIn {
            previous_outpoint: OutPoint {
                hash: hash_of(1),
                index: 0,
                tree: TX_TREE_REGULAR,
            },
            sequence: u32::MAX,
            value_in: 10,
            block_height: 1,
            block_index: 0,
            signature_script: Vec::new(),
        }],
        outputs: vec![TxOut {
            value: 9,
            version: 0,
            pk_script: vec![0x51],
        }],
        lock_time: 0,
        expiry: 0,
    }
}

#[tokio::test]
async fn test_mixed_notifications_keep_order_per_queue() {
    let (client, push) = simulated_client(NodeSettings::default());
    let general = client.notifications().unwrap();
    let voting = client.voting_notifications().unwrap();
    client.start(&CancellationToken::new(), false).await.unwrap();

    let tx = transaction();
    push.send(NodePush::BlockConnected(10)).unwrap();
    push.send(NodePush::WinningTickets(hash_of(10), 10, vec![hash_of(20)])).unwrap();
    push.send(NodePush::RelevantTx(vec![0xff])).unwrap();
    push.send(NodePush::RelevantTx(tx.serialize().unwrap())).unwrap();
    push.send(NodePush::SpentAndMissed(hash_of(10), 10, HashMap::from([(hash_of(20), true)])))
        .unwrap();
    push.send(NodePush::Reorganization(hash_of(10), 10, hash_of(11), 10)).unwrap();
    push.send(NodePush::BlockDisconnected(10)).unwrap();
    push.send(NodePush::StakeDifficulty(hash_of(11), 10, 42)).unwrap();

    let general: Vec<ChainEvent> = timeout(Duration::from_secs(2), general.take(5).collect())
        .await
        .expect("general events not delivered");
    assert_eq!(
        general,
        vec![
            ChainEvent::BlockConnected {
                header: header_at(10),
                transactions: Vec::new(),
            },
            ChainEvent::RelevantTxAccepted { transaction: tx },
            ChainEvent::Reorganization {
                old_hash: hash_of(10),
                old_height: 10,
                new_hash: hash_of(11),
                new_height: 10,
            },
            ChainEvent::BlockDisconnected { header: header_at(10) },
            ChainEvent::StakeDifficulty {
                block_hash: hash_of(11),
                block_height: 10,
                stake_difficulty: 42,
            },
        ]
    );

    let voting: Vec<ChainEvent> = timeout(Duration::from_secs(2), voting.take(1).collect())
        .await
        .expect("voting events not delivered");
    assert_eq!(
        voting,
        vec![ChainEvent::WinningTickets {
            block_hash: hash_of(10),
            block_height: 10,
            tickets: vec![hash_of(20)],
        }]
    );

    client.stop();
    client.wait_for_shutdown().await;
}

#[tokio::test]
async fn test_voting_not_delayed_by_general_backlog() {
    let (client, push) = simulated_client(NodeSettings::default());
    let _general = client.notifications().unwrap();
    let mut voting = client.voting_notifications().unwrap();
    client.start(&CancellationToken::new(), false).await.unwrap();

    for h in 0..500 {
        push.send(NodePush::BlockConnected(h)).unwrap();
    }
    push.send(NodePush::WinningTickets(hash_of(3), 500, vec![hash_of(4)])).unwrap();

    let event = timeout(Duration::from_secs(2), voting.recv())
        .await
        .expect("winning tickets stuck behind general backlog");
    assert!(matches!(event, Some(ChainEvent::WinningTickets { block_height: 500, .. })));

    client.stop();
    client.wait_for_shutdown().await;
}

#[tokio::test]
async fn test_backlog_survives_stop() {
    let (client, push) = simulated_client(NodeSettings::default());
    let mut general = client.notifications().unwrap();
    client.start(&CancellationToken::new(), false).await.unwrap();

    for h in 0..50 {
        push.send(NodePush::BlockDisconnected(h)).unwrap();
    }
    // Let the reader hand everything over before stopping.
    while client.rpc().handler_calls.load(std::sync::atomic::Ordering::SeqCst) < 50 {
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    tokio::time::sleep(Duration::from_millis(20)).await;

    client.stop();
    client.wait_for_shutdown().await;

    let mut heights = Vec::new();
    while let Some(event) = general.recv().await {
        match event {
            ChainEvent::BlockDisconnected { header } => {
                heights.push(u32::from_le_bytes([header[0], header[1], header[2], header[3]]))
            }
            other => panic!("unexpected event {:?}", other),
        }
    }
    assert_eq!(heights, (0..50).collect::<Vec<_>>());
}
