//! Tests for sandboxed path resolution and the decision logic

mod common;

use common::Site;
use tokio::io::AsyncReadExt;
use waypost::http::parser::ParseState;
use waypost::http::request::Request;
use waypost::http::response::StatusCode;
use waypost::resolve::{Decision, Lookup, RedirectTable, Resolver, Sandbox};

fn resolver(site: &Site, table: &str) -> Resolver {
    Resolver::new(Sandbox::new(site.root()).unwrap(), RedirectTable::parse(table))
}

#[test]
fn test_sandbox_requires_existing_directory() {
    let site = Site::new("sandbox-new");

    assert!(Sandbox::new(site.root()).is_ok());
    assert!(Sandbox::new(site.root().join("missing")).is_err());
    assert!(Sandbox::new(site.root().join("a")).is_err());
}

#[test]
fn test_sandbox_root_is_absolute() {
    let site = Site::new("sandbox-abs");
    let sandbox = Sandbox::new(site.root().join("dir/..")).unwrap();

    assert!(sandbox.root().is_absolute());
    assert!(sandbox.root().ends_with("www"));
}

#[test]
fn test_sandboxed_path_stays_inside_root() {
    let site = Site::new("sandbox-path");
    let sandbox = Sandbox::new(site.root()).unwrap();

    let path = sandbox.sandboxed_path("/dir/nested-1.txt").unwrap();
    assert!(path.starts_with(sandbox.root()));

    assert_eq!(sandbox.sandboxed_path("/../secret"), None);
    assert_eq!(sandbox.sandboxed_path("/dir/../../secret"), None);
    assert_eq!(sandbox.sandboxed_path("/."), None);
    assert_eq!(sandbox.sandboxed_path("/a%2F..%2Fsecret"), None);
}

#[tokio::test]
async fn test_open_existing_file() {
    let site = Site::new("sandbox-open");
    let sandbox = Sandbox::new(site.root()).unwrap();

    match sandbox.open("/a").await {
        Lookup::Found { mut file, size } => {
            assert_eq!(size, 13);
            let mut contents = Vec::new();
            file.read_to_end(&mut contents).await.unwrap();
            assert_eq!(contents, b"hello from a\n");
        }
        other => panic!("expected Found, got {:?}", other),
    }
}

#[tokio::test]
async fn test_open_missing_and_invalid() {
    let site = Site::new("sandbox-missing");
    let sandbox = Sandbox::new(site.root()).unwrap();

    assert!(matches!(sandbox.open("/nope").await, Lookup::NotFound));
    assert!(matches!(sandbox.open("/subdir").await, Lookup::NotFound));
    assert!(matches!(sandbox.open("/../secret").await, Lookup::InvalidPath));
    assert!(matches!(sandbox.open("/a/").await, Lookup::InvalidPath));
    assert!(matches!(sandbox.open("/a b").await, Lookup::InvalidPath));
}

#[cfg(unix)]
#[tokio::test]
async fn test_fifo_is_not_found() {
    let site = Site::new("sandbox-fifo");
    let fifo = site.root().join("pipe");
    let status = std::process::Command::new("mkfifo")
        .arg(&fifo)
        .status()
        .unwrap();
    assert!(status.success());

    let sandbox = Sandbox::new(site.root()).unwrap();
    let lookup = tokio::time::timeout(std::time::Duration::from_secs(5), sandbox.open("/pipe"))
        .await
        .expect("opening a fifo must not block");

    assert!(matches!(lookup, Lookup::NotFound));
}

#[tokio::test]
async fn test_empty_file_is_found() {
    let site = Site::new("sandbox-empty");
    let sandbox = Sandbox::new(site.root()).unwrap();

    assert!(matches!(
        sandbox.open("/empty").await,
        Lookup::Found { size: 0, .. }
    ));
}

#[tokio::test]
async fn test_decision_found() {
    let site = Site::new("decide-found");
    let resolver = resolver(&site, "");

    let resolved = resolver.resolve_target("/dir/nested-1.txt").await;
    assert_eq!(resolved.decision, Decision::Found { size: 11 });
    assert_eq!(resolved.decision.status(), StatusCode::Ok);
    assert!(resolved.file.is_some());
}

#[tokio::test]
async fn test_decision_local_file_wins_over_redirect() {
    let site = Site::new("decide-local");
    let resolver = resolver(&site, "/a 10.0.0.2 8080");

    let resolved = resolver.resolve_target("/a").await;
    assert_eq!(resolved.decision, Decision::Found { size: 13 });
}

#[tokio::test]
async fn test_decision_redirect() {
    let site = Site::new("decide-redirect");
    let resolver = resolver(&site, "/remote 127.0.0.1 2567\n");

    let resolved = resolver.resolve_target("/remote").await;
    assert_eq!(
        resolved.decision,
        Decision::Moved {
            location: "http://127.0.0.1:2567/remote".to_string()
        }
    );
    assert_eq!(resolved.decision.location(), Some("http://127.0.0.1:2567/remote"));
    assert!(resolved.file.is_none());
}

#[tokio::test]
async fn test_decision_not_found() {
    let site = Site::new("decide-404");
    let resolver = resolver(&site, "/remote 127.0.0.1 2567");

    let resolved = resolver.resolve_target("/ThisFileShouldNotExist").await;
    assert_eq!(resolved.decision, Decision::NotFound);
    assert_eq!(resolved.decision.file_size(), None);
}

#[tokio::test]
async fn test_traversal_never_serves_outside_file() {
    let site = Site::new("decide-traversal");
    let resolver = resolver(&site, "");

    for target in ["/../secret", "/dir/../../secret", "/..", "/%2e%2e/secret"] {
        let resolved = resolver.resolve_target(target).await;
        assert_eq!(resolved.decision, Decision::NotFound, "{}", target);
    }
}

#[tokio::test]
async fn test_invalid_path_may_still_redirect() {
    let site = Site::new("decide-invalid-redirect");
    let resolver = resolver(&site, "/x_y peer.example 80");

    let resolved = resolver.resolve_target("/x_y").await;
    assert_eq!(resolved.decision.status(), StatusCode::Found);
}

#[tokio::test]
async fn test_parse_failures_skip_resolution() {
    let site = Site::new("decide-rejected");
    let resolver = resolver(&site, "");

    let mut request = Request::new();
    request.target = "/a".to_string();
    request.fail(StatusCode::NotImplemented);

    let resolved = resolver.resolve(ParseState::Failed, &request).await;
    assert_eq!(resolved.decision, Decision::Rejected(StatusCode::NotImplemented));
    assert!(resolved.file.is_none());
}

#[tokio::test]
async fn test_resolution_is_idempotent() {
    let site = Site::new("decide-idempotent");
    let resolver = resolver(&site, "/remote 127.0.0.1 2567");

    for target in ["/a", "/remote", "/missing", "/../secret"] {
        let first = resolver.resolve_target(target).await.decision;
        let second = resolver.resolve_target(target).await.decision;
        assert_eq!(first, second);
    }
}
