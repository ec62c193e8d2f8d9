mod common;

use secrecy::SecretString;

use common::{MemoryRemote, fast_cryptor, seeded_store};
use swftx_core::rotation::{RotationError, RotationState, SyncOutcome};
use swftx_core::sync::SyncTokens;
use swftx_core::{Envelope, EntryCipher, RotationCoordinator, SyncClient};

fn unconfigured_client() -> SyncClient<MemoryRemote> {
    SyncClient::new(MemoryRemote::default())
}

#[tokio::test]
async fn wrong_current_password_never_mutates_disk() {
    let cryptor = fast_cryptor("right");
    let (_dir, store) = seeded_store(&cryptor, &["p@ss1", "p@ss2"]);
    let before = std::fs::read(store.path()).unwrap();

    let mut sync = unconfigured_client();
    let mut coordinator = RotationCoordinator::new(&store, &mut sync);
    let result = coordinator
        .rotate(SecretString::from("wrong"), SecretString::from("new"))
        .await;

    assert!(matches!(result, Err(RotationError::CurrentPasswordInvalid)));
    assert_eq!(coordinator.state(), RotationState::Failed);
    assert_eq!(
        std::fs::read(store.path()).unwrap(),
        before,
        "on-disk blob must be byte-for-byte unchanged"
    );
}

#[tokio::test]
async fn rotation_on_pristine_vault_is_rejected() {
    let dir = tempfile::TempDir::new().unwrap();
    let store = swftx_core::VaultStore::new(dir.path().join("vault.swftx"));

    let mut sync = unconfigured_client();
    let result = RotationCoordinator::new(&store, &mut sync)
        .rotate(SecretString::from("any"), SecretString::from("new"))
        .await;

    assert!(matches!(result, Err(RotationError::CurrentPasswordInvalid)));
    assert!(!store.vault_exists());
}

#[tokio::test]
async fn rotation_rekeys_every_entry_and_preserves_order() {
    let old_cryptor = fast_cryptor("old");
    let (_dir, store) = seeded_store(&old_cryptor, &["p@ss1", "p@ss2"]);
    let old_blob = store.read().unwrap();
    let old_vault = old_cryptor.decrypt_data(&old_blob).unwrap();

    let mut sync = unconfigured_client();
    let (session, report) = RotationCoordinator::new(&store, &mut sync)
        .rotate(SecretString::from("old"), SecretString::from("new"))
        .await
        .unwrap();

    assert_eq!(report.entries, 2);
    assert!(matches!(report.sync, SyncOutcome::NotConfigured));

    let new_blob = store.read().unwrap();
    assert_ne!(new_blob, old_blob, "persisted blob must differ");

    // Decryptable only by the new key generation.
    assert!(old_cryptor.decrypt_data(&new_blob).is_err());
    let new_vault = session.cryptor().decrypt_data(&new_blob).unwrap();

    assert_eq!(new_vault.entries.len(), old_vault.entries.len());
    for (old_entry, new_entry) in old_vault.entries.iter().zip(&new_vault.entries) {
        // Identity preserved, secret ciphertext changed.
        assert_eq!(new_entry.id, old_entry.id);
        assert_eq!(new_entry.title, old_entry.title);
        assert_ne!(new_entry.secret, old_entry.secret);
    }

    // Plaintext secrets survive the re-keying.
    let secrets: Vec<String> = new_vault
        .entries
        .iter()
        .map(|e| session.cryptor().expose(e.clone()).unwrap().secret)
        .collect();
    assert_eq!(secrets, vec!["p@ss1", "p@ss2"]);
}

#[tokio::test]
async fn rotation_preserves_sync_tokens_and_pushes() {
    let cryptor = fast_cryptor("old");
    let (_dir, store) = seeded_store(&cryptor, &["p@ss1"]);

    let issued = SyncTokens::issue();
    let mut remote = MemoryRemote::configured();
    remote.tokens = Some(issued.clone());
    let mut sync = SyncClient::new(remote);

    let (session, report) = RotationCoordinator::new(&store, &mut sync)
        .rotate(SecretString::from("old"), SecretString::from("new"))
        .await
        .unwrap();

    assert!(matches!(report.sync, SyncOutcome::Pushed));
    assert_eq!(
        sync.read_tokens(),
        Some(issued),
        "previously issued credentials must survive rotation"
    );
    // The remote copy is the new generation's blob.
    let pushed = sync.provider().blob.clone().unwrap();
    assert!(session.cryptor().decrypt_data(&pushed).is_ok());
    assert_eq!(sync.provider().key_id.as_deref(), Some(session.key_id().as_str()));
}

#[tokio::test]
async fn rotation_survives_provider_that_wipes_tokens_on_rebind() {
    let cryptor = fast_cryptor("old");
    let (_dir, store) = seeded_store(&cryptor, &["p@ss1"]);

    let issued = SyncTokens::issue();
    let mut remote = MemoryRemote::configured();
    remote.tokens = Some(issued.clone());
    remote.wipe_tokens_on_bind = true;
    let mut sync = SyncClient::new(remote);

    let (_session, report) = RotationCoordinator::new(&store, &mut sync)
        .rotate(SecretString::from("old"), SecretString::from("new"))
        .await
        .unwrap();

    // The snapshot taken before the rebind is what got restored.
    assert!(matches!(report.sync, SyncOutcome::Pushed));
    assert_eq!(sync.read_tokens(), Some(issued));
}

#[tokio::test]
async fn failed_sync_reinit_still_returns_the_new_session() {
    let cryptor = fast_cryptor("old");
    let (_dir, store) = seeded_store(&cryptor, &["p@ss1"]);

    let mut remote = MemoryRemote::configured();
    remote.tokens = Some(SyncTokens::issue());
    remote.fail_ensure_tokens = true;
    let mut sync = SyncClient::new(remote);

    // The local re-encryption already happened by the time the sync
    // session fails, so the caller must still receive the new session;
    // dropping it would strand the user behind a password they are told
    // did not change.
    let (session, report) = RotationCoordinator::new(&store, &mut sync)
        .rotate(SecretString::from("old"), SecretString::from("new"))
        .await
        .unwrap();

    assert!(matches!(report.sync, SyncOutcome::ReinitFailed(_)));
    let local = store.read().unwrap();
    assert!(cryptor.decrypt_data(&local).is_err(), "old key must be out");
    assert!(session.cryptor().decrypt_data(&local).is_ok());
    // Nothing was pushed; the remote copy is stale and local wins.
    assert!(sync.provider().blob.is_none());
}

#[tokio::test]
async fn failed_push_still_leaves_local_rotation_durable() {
    let cryptor = fast_cryptor("old");
    let (_dir, store) = seeded_store(&cryptor, &["p@ss1"]);
    let old_blob = store.read().unwrap();

    let mut remote = MemoryRemote::configured();
    remote.tokens = Some(SyncTokens::issue());
    remote.fail_push = true;
    let mut sync = SyncClient::new(remote);

    let (session, report) = RotationCoordinator::new(&store, &mut sync)
        .rotate(SecretString::from("old"), SecretString::from("new"))
        .await
        .unwrap();

    assert!(matches!(report.sync, SyncOutcome::PushFailed(_)));
    // Local state is rotated and authoritative.
    let local = store.read().unwrap();
    assert_ne!(local, old_blob);
    assert!(session.cryptor().decrypt_data(&local).is_ok());
    // The remote side never received anything.
    assert!(sync.provider().blob.is_none());
}
