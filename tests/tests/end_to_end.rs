#![expect(clippy::unwrap_used, clippy::panic, reason = "test")]

use {
    hyper::StatusCode,
    ironbox_protocol::{ConfigurationError, KeyStrength},
    ironbox_sdk::{
        Error, ErrorKind,
        client::{Client, ClientOptions, encrypted_path},
        crypto::PaddingFileEncrypter,
    },
    ironbox_tests::{CHECK_IN_TOKEN, MockOptions, MockServer},
    serde_json::json,
    std::{
        path::{Path, PathBuf},
        time::Duration,
    },
    tempfile::TempDir,
};

const MIB: usize = 1024 * 1024;

fn client(server: &MockServer) -> Client {
    Client::with_options(
        server.endpoint().unwrap(),
        MockServer::credentials(),
        ClientOptions {
            timeout: Duration::from_secs(30),
            transport_attempts: 1,
            retry_pause: Duration::ZERO,
        },
    )
    .unwrap()
}

fn local_file(dir: &TempDir, name: &str, len: usize) -> (PathBuf, Vec<u8>) {
    let data: Vec<u8> = (0..len).map(|_| rand::random::<u8>()).collect();
    let path = dir.path().join(name);
    fs_err::write(&path, &data).unwrap();
    (path, data)
}

fn encrypt_locally(server: &MockServer, data: &[u8]) -> Vec<u8> {
    let encrypter = PaddingFileEncrypter::new(&server.cipher_spec().unwrap()).unwrap();
    let mut encrypted = Vec::new();
    encrypter.encrypt(data, &mut encrypted).unwrap();
    encrypted
}

fn calls(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| (*name).to_owned()).collect()
}

fn assert_no_encrypted_copy(path: &Path) {
    assert!(!encrypted_path(path).exists());
}

#[tokio::test(flavor = "multi_thread")]
async fn uploads_encrypted_file_in_blocks() {
    let server = MockServer::start(MockOptions::default()).await.unwrap();
    let dir = tempfile::tempdir().unwrap();
    let (path, data) = local_file(&dir, "report.bin", 9 * MIB + 100);

    client(&server)
        .upload_file_to_container(&path, "report.bin")
        .await
        .unwrap();

    assert_eq!(
        server.calls(),
        calls(&[
            "Ping",
            "ContainerKeyData",
            "CreateEntityContainerBlob",
            "CheckOutEntityContainerBlob",
            "block",
            "block",
            "block",
            "blockList",
            "CheckInEntityContainerBlob",
        ])
    );
    let committed = server.committed_blob().unwrap();
    assert_eq!(committed.len(), 9 * MIB + 1024);
    assert_eq!(committed.as_ref(), encrypt_locally(&server, &data).as_slice());

    let check_in = server.last_form("CheckInEntityContainerBlob").unwrap();
    assert_eq!(check_in["BlobIDName"], "blob-report.bin");
    assert_eq!(check_in["BlobSizeBytes"], data.len().to_string());
    assert_eq!(check_in["BlobCheckInToken"], CHECK_IN_TOKEN);
    let create = server.last_form("CreateEntityContainerBlob").unwrap();
    assert_eq!(create["BlobName"], "report.bin");

    assert_no_encrypted_copy(&path);
    assert_eq!(fs_err::read(&path).unwrap(), data);
}

#[tokio::test]
async fn uploads_with_aes128() {
    let server = MockServer::start(MockOptions {
        key_strength: 1,
        ..MockOptions::default()
    })
    .await
    .unwrap();
    assert_eq!(
        server.cipher_spec().unwrap().key_strength(),
        KeyStrength::Aes128
    );
    let dir = tempfile::tempdir().unwrap();
    let (path, data) = local_file(&dir, "small.txt", 5000);

    client(&server)
        .upload_file_to_container(&path, "small.txt")
        .await
        .unwrap();

    let committed = server.committed_blob().unwrap();
    assert_eq!(committed.len(), 5120);
    assert_eq!(committed.as_ref(), encrypt_locally(&server, &data).as_slice());
    assert_no_encrypted_copy(&path);
}

#[tokio::test]
async fn empty_file_is_one_padding_chunk() {
    let server = MockServer::start(MockOptions::default()).await.unwrap();
    let dir = tempfile::tempdir().unwrap();
    let (path, _) = local_file(&dir, "empty", 0);

    client(&server)
        .upload_file_to_container(&path, "empty")
        .await
        .unwrap();

    let calls = server.calls();
    assert_eq!(calls.iter().filter(|name| *name == "block").count(), 1);
    assert_eq!(server.committed_blob().unwrap().len(), 1024);
    assert_eq!(
        server.last_form("CheckInEntityContainerBlob").unwrap()["BlobSizeBytes"],
        "0"
    );
}

#[tokio::test]
async fn failed_block_stops_upload() {
    let server = MockServer::start(MockOptions {
        fail_block: Some((1, StatusCode::INTERNAL_SERVER_ERROR)),
        ..MockOptions::default()
    })
    .await
    .unwrap();
    let dir = tempfile::tempdir().unwrap();
    let (path, _) = local_file(&dir, "big.bin", 10 * MIB);

    let err = client(&server)
        .upload_file_to_container(&path, "big.bin")
        .await
        .unwrap_err();

    match &err {
        Error::BlockUpload { block_id, status } => {
            assert_eq!(block_id.as_str(), "block00000001");
            assert_eq!(*status, StatusCode::INTERNAL_SERVER_ERROR);
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(err.kind(), ErrorKind::RemoteTransport);
    let calls = server.calls();
    assert_eq!(calls.iter().filter(|name| *name == "block").count(), 2);
    assert!(!calls.iter().any(|name| name == "blockList"));
    assert!(!calls.iter().any(|name| name == "CheckInEntityContainerBlob"));
    assert!(server.committed_blob().is_none());
    assert_no_encrypted_copy(&path);
}

#[tokio::test]
async fn failed_commit_skips_check_in() {
    let server = MockServer::start(MockOptions {
        fail_commit: Some(StatusCode::SERVICE_UNAVAILABLE),
        ..MockOptions::default()
    })
    .await
    .unwrap();
    let dir = tempfile::tempdir().unwrap();
    let (path, _) = local_file(&dir, "a.txt", 3000);

    let err = client(&server)
        .upload_file_to_container(&path, "a.txt")
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        Error::CommitBlockList {
            status: StatusCode::SERVICE_UNAVAILABLE
        }
    ));
    assert_eq!(err.to_string(), "unable to upload blob (status 503 Service Unavailable)");
    assert_eq!(server.calls().last().unwrap(), "blockList");
    assert_no_encrypted_copy(&path);
}

#[tokio::test]
async fn unsupported_key_strength_fails_before_blob_creation() {
    let server = MockServer::start(MockOptions {
        key_strength: 3,
        ..MockOptions::default()
    })
    .await
    .unwrap();
    let dir = tempfile::tempdir().unwrap();
    let (path, _) = local_file(&dir, "a.txt", 10);

    let err = client(&server)
        .upload_file_to_container(&path, "a.txt")
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        Error::Configuration(ConfigurationError::InvalidKeyStrength(3))
    ));
    assert_eq!(err.kind(), ErrorKind::Configuration);
    assert_eq!(server.calls(), calls(&["Ping", "ContainerKeyData"]));
    assert_no_encrypted_copy(&path);
}

#[tokio::test]
async fn malformed_key_data_is_invalid_response() {
    let server = MockServer::start(MockOptions {
        key_data: Some(json!({ "SessionKeyBase64": "AAAA", "SymmetricKeyStrength": 2 })),
        ..MockOptions::default()
    })
    .await
    .unwrap();
    let dir = tempfile::tempdir().unwrap();
    let (path, _) = local_file(&dir, "a.txt", 10);

    let err = client(&server)
        .upload_file_to_container(&path, "a.txt")
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        Error::InvalidResponse {
            endpoint: "ContainerKeyData",
            ..
        }
    ));
    assert_eq!(err.kind(), ErrorKind::ProtocolData);
}

#[tokio::test]
async fn incomplete_check_out_lists_missing_fields() {
    let server = MockServer::start(MockOptions {
        omit_checkout_fields: vec!["CheckInToken", "StorageUri"],
        ..MockOptions::default()
    })
    .await
    .unwrap();
    let dir = tempfile::tempdir().unwrap();
    let (path, _) = local_file(&dir, "a.txt", 10);

    let err = client(&server)
        .upload_file_to_container(&path, "a.txt")
        .await
        .unwrap_err();

    match err {
        Error::Configuration(ConfigurationError::MissingFields(fields)) => {
            assert_eq!(fields, ["check_in_token", "storage_uri"]);
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(!server.calls().iter().any(|name| name == "block"));
    assert_no_encrypted_copy(&path);
}

#[tokio::test]
async fn missing_local_file_sends_nothing() {
    let server = MockServer::start(MockOptions::default()).await.unwrap();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.txt");

    let err = client(&server)
        .upload_file_to_container(&path, "absent.txt")
        .await
        .unwrap_err();

    assert!(matches!(&err, Error::FileNotFound(missing) if *missing == path));
    assert_eq!(err.kind(), ErrorKind::LocalIo);
    assert!(server.calls().is_empty());
}

#[tokio::test]
async fn rejected_credentials() {
    let server = MockServer::start(MockOptions::default()).await.unwrap();
    let mut credentials = MockServer::credentials();
    credentials.entity_password = "wrong".into();
    let client = Client::new(server.endpoint().unwrap(), credentials).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let (path, _) = local_file(&dir, "a.txt", 10);

    let err = client
        .upload_file_to_container(&path, "a.txt")
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        Error::ServiceUnavailable {
            endpoint: "ContainerKeyData",
            status: StatusCode::UNAUTHORIZED
        }
    ));
}

#[tokio::test]
async fn failing_api_endpoint() {
    let server = MockServer::start(MockOptions {
        fail_endpoint: Some(("CreateEntityContainerBlob", StatusCode::INTERNAL_SERVER_ERROR)),
        ..MockOptions::default()
    })
    .await
    .unwrap();
    let dir = tempfile::tempdir().unwrap();
    let (path, _) = local_file(&dir, "a.txt", 10);

    let err = client(&server)
        .upload_file_to_container(&path, "a.txt")
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        Error::ServiceUnavailable {
            endpoint: "CreateEntityContainerBlob",
            ..
        }
    ));
    assert_no_encrypted_copy(&path);
}

#[tokio::test]
async fn unconfirmed_check_in() {
    let server = MockServer::start(MockOptions {
        check_in_response: false,
        ..MockOptions::default()
    })
    .await
    .unwrap();
    let dir = tempfile::tempdir().unwrap();
    let (path, _) = local_file(&dir, "a.txt", 10);

    let err = client(&server)
        .upload_file_to_container(&path, "a.txt")
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        Error::InvalidResponse {
            endpoint: "CheckInEntityContainerBlob",
            ..
        }
    ));
    assert!(server.committed_blob().is_some());
    assert_no_encrypted_copy(&path);
}

#[tokio::test]
async fn ping() {
    let server = MockServer::start(MockOptions::default()).await.unwrap();
    client(&server).ping().await.unwrap();
    assert_eq!(server.calls(), calls(&["Ping"]));

    let server = MockServer::start(MockOptions {
        fail_endpoint: Some(("Ping", StatusCode::BAD_GATEWAY)),
        ..MockOptions::default()
    })
    .await
    .unwrap();
    let err = client(&server).ping().await.unwrap_err();
    assert!(matches!(
        err,
        Error::ServiceUnavailable {
            endpoint: "Ping",
            status: StatusCode::BAD_GATEWAY
        }
    ));
}
