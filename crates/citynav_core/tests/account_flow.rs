use citynav_core::locations::store::storage_key;
use citynav_core::{
    AccountError, AccountService, Catalog, KeyValueStore, LocationStore, MemoryKeyValueStore,
};

#[test]
fn register_then_login_succeeds() {
    let kv = MemoryKeyValueStore::new();
    let accounts = AccountService::new(&kv);

    accounts.register("alice", "s3cret").unwrap();
    accounts.login("alice", "s3cret").unwrap();
    assert_eq!(accounts.last_account().unwrap().as_deref(), Some("alice"));
}

#[test]
fn register_rejects_existing_username_and_empty_credentials() {
    let kv = MemoryKeyValueStore::new();
    let accounts = AccountService::new(&kv);

    accounts.register("alice", "s3cret").unwrap();
    assert!(matches!(
        accounts.register("alice", "other"),
        Err(AccountError::UsernameTaken(name)) if name == "alice"
    ));
    assert!(matches!(
        accounts.register("  ", "pw"),
        Err(AccountError::EmptyCredentials)
    ));
    assert!(matches!(
        accounts.register("bob", ""),
        Err(AccountError::EmptyCredentials)
    ));
}

#[test]
fn login_rejects_unknown_user_and_wrong_password() {
    let kv = MemoryKeyValueStore::new();
    let accounts = AccountService::new(&kv);

    assert!(matches!(
        accounts.login("ghost", "pw"),
        Err(AccountError::InvalidCredentials)
    ));

    accounts.register("alice", "s3cret").unwrap();
    assert!(matches!(
        accounts.login("alice", "wrong"),
        Err(AccountError::InvalidCredentials)
    ));
    // Failed logins never establish the quick-login memory.
    assert_eq!(accounts.last_account().unwrap(), None);
}

#[test]
fn logout_clears_only_the_remembered_username() {
    let kv = MemoryKeyValueStore::new();
    let accounts = AccountService::new(&kv);

    accounts.register("alice", "s3cret").unwrap();
    accounts.login("alice", "s3cret").unwrap();
    accounts.logout().unwrap();

    assert_eq!(accounts.last_account().unwrap(), None);
    // Credentials survive; the user can log straight back in.
    accounts.login("alice", "s3cret").unwrap();
}

#[test]
fn register_seeds_an_empty_location_slot() {
    let kv = MemoryKeyValueStore::new();
    let accounts = AccountService::new(&kv);
    accounts.register("alice", "s3cret").unwrap();

    assert_eq!(
        kv.get(&storage_key("alice")).unwrap().as_deref(),
        Some(&b"[]"[..])
    );

    let mut store = LocationStore::new(Catalog::default_seed(), &kv);
    store.activate("alice");
    assert_eq!(store.snapshot().len(), 4);
}

#[test]
fn credentials_are_trimmed_consistently() {
    let kv = MemoryKeyValueStore::new();
    let accounts = AccountService::new(&kv);

    accounts.register(" alice ", " s3cret ").unwrap();
    accounts.login("alice", "s3cret").unwrap();
}
