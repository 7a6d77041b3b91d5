use tempfile::TempDir;
use vax_dashboard::auth::hash_password;
use vax_dashboard::{AuthError, DashboardError, Session, UserStore};

fn auth_error(result: vax_dashboard::Result<impl std::fmt::Debug>) -> AuthError {
    match result {
        Err(DashboardError::Auth(e)) => e,
        other => panic!("Expected an auth error, got {:?}", other),
    }
}

#[test]
fn test_sign_up_and_authenticate() {
    let mut users = UserStore::in_memory();
    users.sign_up("alice", "secret", "secret").unwrap();

    assert!(users.exists("alice"));
    assert_eq!(users.len(), 1);
    assert!(users.authenticate("alice", "secret").is_ok());
    assert_eq!(
        auth_error(users.authenticate("alice", "wrong")),
        AuthError::InvalidCredentials
    );
    assert_eq!(
        auth_error(users.authenticate("bob", "secret")),
        AuthError::InvalidCredentials
    );
}

#[test]
fn test_sign_up_errors() {
    let mut users = UserStore::in_memory();

    assert_eq!(
        auth_error(users.sign_up("alice", "one", "two")),
        AuthError::PasswordMismatch
    );
    assert_eq!(
        auth_error(users.sign_up("   ", "pw", "pw")),
        AuthError::EmptyUsername
    );

    users.sign_up("alice", "pw", "pw").unwrap();
    assert_eq!(
        auth_error(users.sign_up("alice", "other", "other")),
        AuthError::UsernameTaken("alice".to_string())
    );
    assert!(users.authenticate("alice", "pw").is_ok());
}

#[test]
fn test_users_persist_between_opens() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("users.json");

    {
        let mut users = UserStore::open(&path).unwrap();
        assert!(users.is_empty());
        users.sign_up("carol", "pw", "pw").unwrap();
    }

    let contents = std::fs::read_to_string(&path).unwrap();
    assert!(contents.contains(&hash_password("pw")));
    assert!(!contents.contains("\"pw\""));

    let users = UserStore::open(&path).unwrap();
    assert!(users.exists("carol"));
    assert!(users.authenticate("carol", "pw").is_ok());
}

#[test]
fn test_corrupt_users_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("users.json");
    std::fs::write(&path, "not json").unwrap();

    assert!(matches!(UserStore::open(&path), Err(DashboardError::Json(_))));
}

#[test]
fn test_session_login() {
    let mut users = UserStore::in_memory();
    users.sign_up("dave", "pw", "pw").unwrap();

    let session = Session::login(&users, "dave", "pw").unwrap();
    assert!(session.is_authenticated());
    assert_eq!(session.username(), Some("dave"));

    assert!(Session::login(&users, "dave", "nope").is_err());
    assert!(!Session::anonymous().is_authenticated());
}
