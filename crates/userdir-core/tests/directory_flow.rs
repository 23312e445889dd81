//! End-to-end directory flows against a mock HTTP server and a real
//! on-disk mirror

use std::num::NonZeroUsize;
use std::time::Duration;

use tempfile::TempDir;
use userdir_core::{
    ApiClient, CacheManager, DirectoryError, MirrorStore, NewUser, Origin, UserDirectory,
};

fn users_body(n: u64) -> String {
    let users: Vec<serde_json::Value> = (1..=n)
        .map(|id| {
            serde_json::json!({
                "id": id,
                "name": format!("User {}", id),
                "username": format!("user{}", id),
                "email": format!("user{}@example.com", id),
                "phone": "555-0100",
                "website": format!("user{}.org", id),
            })
        })
        .collect();
    serde_json::to_string(&users).unwrap()
}

fn client(server: &mockito::ServerGuard) -> ApiClient {
    ApiClient::new(server.url(), Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn test_cache_miss_populates_mirror_and_second_session_skips_remote() {
    let mut server = mockito::Server::new_async().await;
    let fetch = server
        .mock("GET", "/users")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(users_body(10))
        .expect(1)
        .create_async()
        .await;

    let dir = TempDir::new().unwrap();
    let cache = CacheManager::new(dir.path().to_path_buf()).unwrap();

    let first = UserDirectory::new(client(&server), cache.clone());
    assert_eq!(first.initialize().await.unwrap(), Origin::Remote);
    assert_eq!(first.len().await, 10);
    assert_eq!(cache.load().unwrap().unwrap().data.len(), 10);

    let second = UserDirectory::new(client(&server), cache);
    assert_eq!(second.initialize().await.unwrap(), Origin::Mirror);
    assert_eq!(second.users().await, first.users().await);

    fetch.assert_async().await;
}

#[tokio::test]
async fn test_delete_round_trips_to_remote_then_mirror() {
    let mut server = mockito::Server::new_async().await;
    let _fetch = server
        .mock("GET", "/users")
        .with_status(200)
        .with_body(users_body(7))
        .create_async()
        .await;
    let delete = server
        .mock("DELETE", "/users/5")
        .with_status(200)
        .with_body("{}")
        .create_async()
        .await;
    let _refused = server
        .mock("DELETE", "/users/6")
        .with_status(500)
        .with_body("nope")
        .create_async()
        .await;

    let tmp = TempDir::new().unwrap();
    let cache = CacheManager::new(tmp.path().to_path_buf()).unwrap();
    let directory = UserDirectory::new(client(&server), cache.clone());
    directory.initialize().await.unwrap();

    assert!(directory.delete(5).await.unwrap());
    delete.assert_async().await;
    assert!(cache.load().unwrap().unwrap().data.iter().all(|u| u.id != 5));

    let err = directory.delete(6).await.unwrap_err();
    assert!(matches!(err, DirectoryError::OperationFailed(_)));
    assert!(directory.get(6).await.is_some());
    assert_eq!(directory.len().await, 6);
}

#[tokio::test]
async fn test_remote_outage_on_first_run() {
    let mut server = mockito::Server::new_async().await;
    let _fetch = server
        .mock("GET", "/users")
        .with_status(502)
        .create_async()
        .await;

    let tmp = TempDir::new().unwrap();
    let cache = CacheManager::new(tmp.path().to_path_buf()).unwrap();
    let directory = UserDirectory::new(client(&server), cache.clone());

    let err = directory.initialize().await.unwrap_err();
    assert!(matches!(err, DirectoryError::SourceUnavailable(_)));
    assert!(cache.load().unwrap().is_none());
}

#[tokio::test]
async fn test_added_users_page_first() {
    let mut server = mockito::Server::new_async().await;
    let _fetch = server
        .mock("GET", "/users")
        .with_status(200)
        .with_body(users_body(10))
        .create_async()
        .await;

    let tmp = TempDir::new().unwrap();
    let cache = CacheManager::new(tmp.path().to_path_buf()).unwrap();
    let directory = UserDirectory::new(client(&server), cache)
        .with_page_size(NonZeroUsize::new(6).unwrap());
    directory.initialize().await.unwrap();

    let added = directory
        .add(NewUser {
            name: "Kurtis Weissnat".to_string(),
            username: "Elwyn.Skiles".to_string(),
            email: "Telly.Hoeger@billy.biz".to_string(),
            website: "elvis.io".to_string(),
        })
        .await
        .unwrap();

    let page = directory.page(1).await.unwrap();
    assert_eq!(page.items[0], added);
    assert_eq!(page.total_pages, 2);
    assert_eq!(page.label(), "Page 1 of 2");
}
