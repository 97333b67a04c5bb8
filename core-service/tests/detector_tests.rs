//! Tests for database variant detection and the service bootstrap

mod common;

use async_trait::async_trait;
use bridge_traits::error::{BridgeError, Result as BridgeResult};
use bridge_traits::DeviceStorage;
use bytes::Bytes;
use common::{database_bytes, sample_folders};
use core_runtime::config::CoreConfig;
use core_service::{detect, open_device, CoreError, CoreService, DatabaseKind};
use mockall::mock;
use std::path::Path;
use std::sync::Arc;

mock! {
    pub Storage {}

    #[async_trait]
    impl DeviceStorage for Storage {
        async fn directory_exists(&self, path: &Path) -> BridgeResult<bool>;
        async fn ensure_directory(&self, path: &Path) -> BridgeResult<()>;
        async fn read_file(&self, path: &Path) -> BridgeResult<Bytes>;
        async fn write_file(&self, path: &Path, data: Bytes) -> BridgeResult<()>;
        async fn delete_file(&self, path: &Path) -> BridgeResult<()>;
    }
}

fn storage_with_dirs(present: &'static [&'static str]) -> MockStorage {
    let mut storage = MockStorage::new();
    storage
        .expect_directory_exists()
        .returning(move |path| Ok(present.iter().any(|dir| path == Path::new(dir))));
    storage
}

fn config(storage: MockStorage) -> CoreConfig {
    CoreConfig::builder()
        .storage(Arc::new(storage))
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_esys_is_probed_first() {
    let mut storage = MockStorage::new();
    storage
        .expect_directory_exists()
        .withf(|path| path == Path::new("ESYS"))
        .times(1)
        .returning(|_| Ok(true));

    let config = config(storage);
    let kind = detect(config.storage.as_ref(), &config.layout).await.unwrap();
    assert_eq!(kind, DatabaseKind::Esys);
}

#[tokio::test]
async fn test_esys_wins_when_both_exist() {
    let config = config(storage_with_dirs(&["ESYS", "OMGAUDIO"]));
    let kind = detect(config.storage.as_ref(), &config.layout).await.unwrap();
    assert_eq!(kind, DatabaseKind::Esys);
}

#[tokio::test]
async fn test_omgaudio_is_not_implemented() {
    let config = config(storage_with_dirs(&["OMGAUDIO"]));

    let kind = detect(config.storage.as_ref(), &config.layout).await.unwrap();
    assert_eq!(kind, DatabaseKind::OmgAudio);

    let err = open_device(&config).await.err().unwrap();
    assert!(matches!(err, CoreError::NotImplemented(_)));
}

#[tokio::test]
async fn test_no_marker_is_invalid_folder() {
    let config = config(storage_with_dirs(&["MUSIC"]));

    let err = detect(config.storage.as_ref(), &config.layout)
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::InvalidFolder(_)));
    assert!(err.to_string().contains("ESYS"));
}

#[tokio::test]
async fn test_probe_failure_is_reported() {
    let mut storage = MockStorage::new();
    storage
        .expect_directory_exists()
        .returning(|_| Err(BridgeError::NotAvailable("device unplugged".to_string())));

    let config = config(storage);
    let err = detect(config.storage.as_ref(), &config.layout)
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Bridge(BridgeError::NotAvailable(_))));
}

#[tokio::test]
async fn test_open_device_loads_esys_database() {
    let mut storage = storage_with_dirs(&["ESYS"]);
    let data = Bytes::from(database_bytes(&sample_folders()));
    storage
        .expect_read_file()
        .withf(|path| path == Path::new("ESYS/PBLIST1.DAT"))
        .times(1)
        .returning(move |_| Ok(data.clone()));

    let database = open_device(&config(storage)).await.unwrap();
    assert_eq!(database.kind(), DatabaseKind::Esys);

    let folders = database.folders().await.unwrap();
    assert_eq!(folders.len(), 3);
    assert_eq!(folders[0].name, "Rock");
}

#[tokio::test]
async fn test_core_service_opens_database() {
    let mut storage = storage_with_dirs(&["ESYS"]);
    let data = Bytes::from(database_bytes(&[]));
    storage
        .expect_read_file()
        .returning(move |_| Ok(data.clone()));

    let service = CoreService::new(config(storage));
    assert_eq!(service.detect().await.unwrap(), DatabaseKind::Esys);

    let mut database = service.open_database().await.unwrap();
    assert!(database.folders().await.unwrap().is_empty());
    assert_eq!(database.next_track_id().await.unwrap().get(), 1);
}
