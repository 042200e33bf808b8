use std::sync::atomic::Ordering;
use std::time::Duration;

use chain_notify::gather_metrics;
use chain_notify::ChainClientConfig;
use chain_notify::CurrencyNet;
use chain_notify::Error;
use chain_notify::RpcClientBuilder;
use chain_notify::Semver;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;

use crate::common::simulated_client;
use crate::common::NodePush;
use crate::common::NodeSettings;
use crate::common::IDLE_WINDOW;

#[tokio::test]
async fn test_session_start_and_orderly_shutdown() {
    let (client, push) = simulated_client(NodeSettings::default());
    let mut general = client.notifications().unwrap();

    client.start(&CancellationToken::new(), true).await.unwrap();
    let info = client.session_info().unwrap();
    assert_eq!(info.net, CurrencyNet::SIM_NET);
    assert_eq!(info.api_version, Semver::new(5, 1, 0));

    push.send(NodePush::BlockConnected(1)).unwrap();
    assert!(general.recv().await.is_some());

    client.stop();
    timeout(Duration::from_secs(2), client.wait_for_shutdown())
        .await
        .expect("shutdown did not complete");

    // Nothing pushed after shutdown reaches the handlers.
    let calls = client.rpc().handler_calls.load(Ordering::SeqCst);
    let _ = push.send(NodePush::BlockConnected(2));
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(client.rpc().handler_calls.load(Ordering::SeqCst), calls);
    assert_eq!(general.recv().await, None);
}

#[tokio::test]
async fn test_wrong_network_rejected() {
    let (client, _push) = simulated_client(NodeSettings {
        net: CurrencyNet::TEST_NET3,
        ..Default::default()
    });

    let err = client
        .start(&CancellationToken::new(), false)
        .await
        .unwrap_err();
    assert!(err.is_protocol());
    assert!(!client.is_started());
    assert!(err.to_string().contains("Mismatched networks"));
}

#[tokio::test]
async fn test_incompatible_api_rejected() {
    let (client, _push) = simulated_client(NodeSettings {
        api: Semver::new(6, 0, 0),
        ..Default::default()
    });

    let err = client
        .start(&CancellationToken::new(), false)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Protocol(_)));
}

#[tokio::test(start_paused = true)]
async fn test_hung_node_ends_session() {
    let (client, _push) = simulated_client(NodeSettings {
        session_delay: IDLE_WINDOW * 10,
        ..Default::default()
    });
    let mut general = client.notifications().unwrap();
    let mut voting = client.voting_notifications().unwrap();

    client.start(&CancellationToken::new(), false).await.unwrap();

    timeout(IDLE_WINDOW * 4, client.wait_for_shutdown())
        .await
        .expect("a hung node should end the session");
    assert!(client.is_stopped());
    assert_eq!(general.recv().await, None);
    assert_eq!(voting.recv().await, None);

    assert!(gather_metrics().contains("outcome=\"timeout\""));
}

#[tokio::test(start_paused = true)]
async fn test_responsive_idle_node_keeps_session() {
    let (client, _push) = simulated_client(NodeSettings::default());
    client.start(&CancellationToken::new(), false).await.unwrap();

    tokio::time::sleep(IDLE_WINDOW * 10).await;

    assert!(!client.is_stopped());
    assert!(client.rpc().session_calls.load(Ordering::SeqCst) >= 8);
    client.stop();
    client.wait_for_shutdown().await;
}

#[tokio::test]
async fn test_builder_from_default_config() {
    let config = ChainClientConfig::default();
    let builder = RpcClientBuilder::from_config(config).unwrap();
    let client = builder
        .build(|_, _| -> chain_notify::Result<crate::common::SimulatedNode> {
            Err(chain_notify::NetworkError::Disconnected.into())
        });
    assert!(client.is_err());
}
