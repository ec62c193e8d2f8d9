mod common;

use common::{MemoryRemote, fast_cryptor, seeded_store};
use swftx_core::sync::SyncError;
use swftx_core::{Entry, EntryCipher, Envelope, SyncClient, Vault};

#[tokio::test]
async fn initialize_on_unconfigured_provider_fails() {
    let cryptor = fast_cryptor("pw");
    let mut client = SyncClient::new(MemoryRemote::default());
    assert!(!client.is_configured());
    assert!(matches!(
        client.initialize(&cryptor, None).await,
        Err(SyncError::NotConfigured)
    ));
}

#[tokio::test]
async fn initialize_issues_tokens_once_and_binds_key() {
    let cryptor = fast_cryptor("pw");
    let mut client = SyncClient::new(MemoryRemote::configured());

    let first = client.initialize(&cryptor, None).await.unwrap();
    let second = client.initialize(&cryptor, None).await.unwrap();
    assert_eq!(first, second, "re-initialization must not reissue tokens");
    assert_eq!(client.provider().key_id, Some(cryptor.key_id()));
}

#[tokio::test]
async fn push_current_uploads_the_live_blob() {
    let cryptor = fast_cryptor("pw");
    let (_dir, store) = seeded_store(&cryptor, &["secret"]);
    let mut client = SyncClient::new(MemoryRemote::configured());
    client.initialize(&cryptor, None).await.unwrap();

    client.push_current(&store).await.unwrap();
    assert_eq!(client.provider().blob.as_deref(), Some(store.read().unwrap().as_slice()));
}

#[tokio::test]
async fn failed_push_does_not_mutate_local_state() {
    let cryptor = fast_cryptor("pw");
    let (_dir, store) = seeded_store(&cryptor, &["secret"]);
    let before = store.read().unwrap();

    let mut remote = MemoryRemote::configured();
    remote.fail_push = true;
    let mut client = SyncClient::new(remote);
    client.initialize(&cryptor, None).await.unwrap();

    assert!(matches!(
        client.push_current(&store).await,
        Err(SyncError::Transport(_))
    ));
    assert_eq!(store.read().unwrap(), before);
}

#[tokio::test]
async fn pull_replaces_local_vault_wholesale() {
    let cryptor = fast_cryptor("pw");
    let (_dir, store) = seeded_store(&cryptor, &["local-secret"]);

    // A diverged remote copy under the same key generation.
    let remote_vault = Vault {
        entries: vec![
            cryptor.obscure(Entry::new("remote", "user", "remote-secret")).unwrap(),
        ],
    };
    let remote_blob = cryptor.encrypt_data(&remote_vault).unwrap();

    let mut remote = MemoryRemote::configured();
    remote.blob = Some(remote_blob.clone());
    let mut client = SyncClient::new(remote);
    client.initialize(&cryptor, None).await.unwrap();

    let reconciled = client.perform(&store, &cryptor).await.unwrap();
    assert_eq!(reconciled, remote_vault);
    // Replace-on-pull: the local blob is now the remote blob.
    assert_eq!(store.read().unwrap(), remote_blob);
}

#[tokio::test]
async fn undecryptable_remote_blob_leaves_local_untouched() {
    let cryptor = fast_cryptor("pw");
    let (_dir, store) = seeded_store(&cryptor, &["local-secret"]);
    let before = store.read().unwrap();

    // Remote was rotated under a different key generation.
    let other = fast_cryptor("other");
    let foreign_blob = other.encrypt_data(&Vault::empty()).unwrap();

    let mut remote = MemoryRemote::configured();
    remote.blob = Some(foreign_blob);
    let mut client = SyncClient::new(remote);
    client.initialize(&cryptor, None).await.unwrap();

    assert!(matches!(
        client.perform(&store, &cryptor).await,
        Err(SyncError::RemoteUndecryptable(_))
    ));
    assert_eq!(store.read().unwrap(), before);
}

#[tokio::test]
async fn pull_of_empty_remote_is_reported() {
    let cryptor = fast_cryptor("pw");
    let (_dir, store) = seeded_store(&cryptor, &["secret"]);

    let mut client = SyncClient::new(MemoryRemote::configured());
    client.initialize(&cryptor, None).await.unwrap();

    assert!(matches!(
        client.perform(&store, &cryptor).await,
        Err(SyncError::RemoteEmpty)
    ));
}
