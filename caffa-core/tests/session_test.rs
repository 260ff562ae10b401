use caffa_core::{Session, SessionConfig, SessionError, SessionType, TransportError, Version};
use fake_server::{FakeServer, SESSION_ID, connect, session_config};
use serde_json::json;
use std::{sync::Arc, time::Duration};


#[tokio::test(start_paused = true)]
async fn test_heartbeat_keeps_the_session_alive() {
    let server = Arc::new(FakeServer::demo());
    let mut session = connect(&server).await;

    tokio::time::sleep(Duration::from_millis(350)).await;
    assert_eq!(server.calls("keepalive"), 3);

    session.close().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_no_keepalive_after_close() {
    let server = Arc::new(FakeServer::demo());
    let mut session = connect(&server).await;

    tokio::time::sleep(Duration::from_millis(250)).await;
    assert!(server.calls("keepalive") > 0);

    session.close().await.unwrap();
    let after_close = server.calls("keepalive");
    assert!(!session.is_open());
    assert!(server.is_destroyed());

    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(server.calls("keepalive"), after_close);
}

#[tokio::test(start_paused = true)]
async fn test_dropping_a_session_stops_the_heartbeat() {
    let server = Arc::new(FakeServer::demo());
    let session = connect(&server).await;
    drop(session);

    let after_drop = server.calls("keepalive");
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(server.calls("keepalive"), after_drop);
    assert!(!server.is_destroyed());
}

#[tokio::test]
async fn test_close_twice_is_a_no_op() {
    let server = Arc::new(FakeServer::demo());
    let mut session = connect(&server).await;

    session.close().await.unwrap();
    session.close().await.unwrap();
    assert_eq!(server.calls("destroy_session"), 1);
}

#[tokio::test]
async fn test_requests_after_close_fail() {
    let server = Arc::new(
        FakeServer::demo().with_document("", json!({ "keyword": "DemoObject", "uuid": "obj" })),
    );
    let mut session = connect(&server).await;
    session.close().await.unwrap();

    let result = session.document("").await;
    assert!(matches!(
        result,
        Err(SessionError::Transport(TransportError::SessionClosed))
    ));
    assert_eq!(server.calls("document"), 0);
}

#[tokio::test]
async fn test_session_identity() {
    let server = Arc::new(FakeServer::demo());
    let config = SessionConfig {
        session_type: SessionType::Observing,
        ..session_config()
    };
    let mut session = Session::connect(server.clone(), &config).await.unwrap();

    assert_eq!(session.id(), SESSION_ID);
    assert_eq!(session.session_type(), SessionType::Observing);
    assert_eq!(session.app_info().version(), Version::new(1, 6, 0));
    assert!(session.is_open());

    session.close().await.unwrap();
}

#[tokio::test]
async fn test_unsupported_versions_are_rejected() {
    for version in ["1.4.9", "1.7.0", "2.0.0"] {
        let server = Arc::new(FakeServer::new(version));
        let result = Session::connect(server.clone(), &session_config()).await;

        assert!(
            matches!(result, Err(SessionError::VersionMismatch { found, .. }) if found.to_string() == version),
            "version {version}"
        );
        assert_eq!(server.calls("create_session"), 0);
    }
}

#[tokio::test]
async fn test_version_range_is_inclusive() {
    for version in ["1.5.0", "1.6.99"] {
        let server = Arc::new(FakeServer::new(version));
        let mut session = Session::connect(server.clone(), &session_config())
            .await
            .unwrap();
        session.close().await.unwrap();
    }
}

#[tokio::test(start_paused = true)]
async fn test_connection_setup_is_retried() {
    let server = Arc::new(FakeServer::demo().failing_app_info(2));
    let config = SessionConfig {
        connect_attempts: 3,
        ..session_config()
    };

    let mut session = Session::connect(server.clone(), &config).await.unwrap();
    assert_eq!(server.calls("app_info"), 3);
    session.close().await.unwrap();

    let server = Arc::new(FakeServer::demo().failing_app_info(1));
    let result = Session::connect(server.clone(), &session_config()).await;
    assert!(matches!(
        result,
        Err(SessionError::Transport(TransportError::Request { .. }))
    ));
    assert_eq!(server.calls("app_info"), 1);
}

#[tokio::test]
async fn test_empty_session_id_is_a_failure() {
    let server = Arc::new(FakeServer::demo().with_session_id(""));
    let result = Session::connect(server.clone(), &session_config()).await;

    assert!(matches!(result, Err(SessionError::SessionCreationFailed)));
}

#[tokio::test(start_paused = true)]
async fn test_heartbeat_never_overlaps_foreground_requests() {
    let server = Arc::new(
        FakeServer::demo()
            .with_latency(Duration::from_millis(30))
            .with_document("", json!({ "keyword": "DemoObject", "uuid": "obj-uuid" }))
            .with_object("obj-uuid", json!({ "intField": 1, "stringField": "a" })),
    );
    let mut session = connect(&server).await;
    let object = session.document("").await.unwrap();

    for _ in 0..10 {
        let (int_field, string_field) =
            tokio::join!(object.get("intField"), object.get("stringField"));
        int_field.unwrap();
        string_field.unwrap();
    }

    assert!(server.calls("keepalive") > 0);
    assert_eq!(server.calls("get_field"), 20);
    assert_eq!(server.max_in_flight(), 1);

    session.close().await.unwrap();
}
