//! End-to-end behaviour of the extension manager against in-memory
//! collaborators that record every call they receive.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use quay_store::{
    Command, ExtensionGallery, ExtensionManagement, ExtensionManager, ExtensionManifest,
    GalleryExtension, GalleryPage, GalleryQuery, InstallSource, InstalledExtension, Outcome,
    RecordingReporter, Result, StoreError, TransportError,
};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Call {
    ListInstalled,
    InstallPath(PathBuf),
    InstallGallery(String),
    Uninstall(String),
    Query(Vec<String>),
}

type CallLog = Arc<Mutex<Vec<Call>>>;

fn installed(id: &str, version: &str) -> InstalledExtension {
    let (publisher, name) = id.split_once('.').unwrap();
    InstalledExtension::new(
        ExtensionManifest::new(publisher, name, version),
        PathBuf::from(format!("/extensions/{}-{}", id, version)),
        InstallSource::Package {
            path: PathBuf::from(format!("{}-{}.vsix", id, version)),
        },
    )
}

fn candidate(id: &str, version: &str) -> GalleryExtension {
    let (publisher, name) = id.split_once('.').unwrap();
    GalleryExtension {
        publisher: publisher.to_string(),
        name: name.to_string(),
        version: version.to_string(),
        download_url: format!("https://cdn.example.com/{}-{}.vsix", id, version),
        display_name: None,
    }
}

struct FakeManagement {
    installed: Mutex<Vec<InstalledExtension>>,
    fail_paths: Vec<String>,
    calls: CallLog,
}

#[async_trait]
impl ExtensionManagement for FakeManagement {
    async fn list_installed(&self) -> Result<Vec<InstalledExtension>> {
        self.calls.lock().unwrap().push(Call::ListInstalled);
        Ok(self.installed.lock().unwrap().clone())
    }

    async fn install(&self, path: &Path) -> Result<InstalledExtension> {
        self.calls
            .lock()
            .unwrap()
            .push(Call::InstallPath(path.to_path_buf()));
        let file_name = path.file_name().unwrap().to_string_lossy().to_string();
        if self.fail_paths.contains(&file_name) {
            return Err(StoreError::InvalidPackage {
                path: path.to_path_buf(),
                reason: "corrupt archive".to_string(),
            });
        }
        Ok(installed("local.pkg", "1.0.0"))
    }

    async fn install_from_gallery(
        &self,
        extension: &GalleryExtension,
    ) -> Result<InstalledExtension> {
        self.calls
            .lock()
            .unwrap()
            .push(Call::InstallGallery(extension.identity().to_string()));
        let record = installed(&extension.identity().to_string(), &extension.version);
        self.installed.lock().unwrap().push(record.clone());
        Ok(record)
    }

    async fn uninstall(&self, extension: &InstalledExtension) -> Result<()> {
        let id = extension.identity().to_string();
        self.calls.lock().unwrap().push(Call::Uninstall(id.clone()));
        self.installed
            .lock()
            .unwrap()
            .retain(|ext| ext.identity().to_string() != id);
        Ok(())
    }
}

enum QueryResponse {
    Page(Vec<GalleryExtension>),
    Fail(TransportError),
}

struct FakeGallery {
    responses: HashMap<String, QueryResponse>,
    page_sizes: Mutex<Vec<Option<usize>>>,
    calls: CallLog,
}

#[async_trait]
impl ExtensionGallery for FakeGallery {
    async fn query(&self, query: &GalleryQuery) -> Result<GalleryPage> {
        self.calls
            .lock()
            .unwrap()
            .push(Call::Query(query.names.clone()));
        self.page_sizes.lock().unwrap().push(query.page_size);
        match query.names.first().and_then(|name| self.responses.get(name)) {
            Some(QueryResponse::Page(entries)) => Ok(GalleryPage::new(entries.clone())),
            Some(QueryResponse::Fail(error)) => Err(StoreError::Transport(error.clone())),
            None => Ok(GalleryPage::default()),
        }
    }
}

struct Harness {
    manager: ExtensionManager,
    reporter: Arc<RecordingReporter>,
    management: Arc<FakeManagement>,
    gallery: Arc<FakeGallery>,
    calls: CallLog,
}

impl Harness {
    fn new(installed_set: Vec<InstalledExtension>) -> Self {
        Self::with(installed_set, HashMap::new(), Vec::new())
    }

    fn with(
        installed_set: Vec<InstalledExtension>,
        responses: HashMap<String, QueryResponse>,
        fail_paths: Vec<&str>,
    ) -> Self {
        let calls: CallLog = Arc::new(Mutex::new(Vec::new()));
        let management = Arc::new(FakeManagement {
            installed: Mutex::new(installed_set),
            fail_paths: fail_paths.into_iter().map(String::from).collect(),
            calls: calls.clone(),
        });
        let gallery = Arc::new(FakeGallery {
            responses,
            page_sizes: Mutex::new(Vec::new()),
            calls: calls.clone(),
        });
        let reporter = Arc::new(RecordingReporter::new());
        let manager = ExtensionManager::new(
            management.clone(),
            gallery.clone(),
            reporter.clone(),
            PathBuf::from("/work"),
        );

        Self {
            manager,
            reporter,
            management,
            gallery,
            calls,
        }
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn queries(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|call| matches!(call, Call::Query(_)))
            .collect()
    }

    fn installed_ids(&self) -> Vec<String> {
        self.management
            .installed
            .lock()
            .unwrap()
            .iter()
            .map(|ext| ext.identity().to_string())
            .collect()
    }
}

fn tokens(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[tokio::test]
async fn test_already_installed_skips_gallery() {
    let harness = Harness::new(vec![installed("acme.foo", "1.0.0")]);

    harness
        .manager
        .run(Some(Command::Install(tokens(&["acme.foo"]))))
        .await
        .unwrap();

    assert_eq!(
        harness.reporter.outcomes(),
        vec![Outcome::AlreadyInstalled {
            id: "acme.foo".to_string()
        }]
    );
    assert!(harness.queries().is_empty());
    assert!(!harness
        .calls()
        .iter()
        .any(|call| matches!(call, Call::InstallGallery(_))));
}

#[tokio::test]
async fn test_unknown_name_fails_not_found() {
    let harness = Harness::new(Vec::new());

    let err = harness
        .manager
        .install(&tokens(&["bar"]))
        .await
        .unwrap_err();

    assert!(matches!(err, StoreError::ExtensionNotFound(ref id) if id == "bar"));
    assert!(err.to_string().contains("full extension ID"));
    assert!(harness.reporter.outcomes().is_empty());
}

#[tokio::test]
async fn test_gallery_install_reports_version() {
    let mut responses = HashMap::new();
    responses.insert(
        "acme.foo".to_string(),
        QueryResponse::Page(vec![candidate("acme.foo", "1.2.0")]),
    );
    let harness = Harness::with(Vec::new(), responses, Vec::new());

    harness.manager.install(&tokens(&["acme.foo"])).await.unwrap();

    assert_eq!(
        harness.reporter.lines(),
        vec!["Extension 'acme.foo' v1.2.0 was successfully installed!"]
    );
    assert_eq!(harness.installed_ids(), vec!["acme.foo"]);
}

#[tokio::test]
async fn test_first_entry_of_first_page_wins() {
    let mut responses = HashMap::new();
    responses.insert(
        "foo".to_string(),
        QueryResponse::Page(vec![
            candidate("zed.foo", "0.0.1"),
            candidate("acme.foo", "9.9.9"),
            candidate("other.foo", "3.0.0"),
        ]),
    );
    let harness = Harness::with(Vec::new(), responses, Vec::new());

    harness.manager.install(&tokens(&["foo"])).await.unwrap();

    let gallery_installs: Vec<Call> = harness
        .calls()
        .into_iter()
        .filter(|call| matches!(call, Call::InstallGallery(_)))
        .collect();
    assert_eq!(gallery_installs, vec![Call::InstallGallery("zed.foo".to_string())]);
    assert_eq!(*harness.gallery.page_sizes.lock().unwrap(), vec![Some(1)]);
    assert_eq!(
        harness.reporter.outcomes(),
        vec![Outcome::InstalledFromGallery {
            id: "foo".to_string(),
            version: "0.0.1".to_string()
        }]
    );
}

#[tokio::test]
async fn test_paths_and_names_never_cross() {
    let mut responses = HashMap::new();
    responses.insert(
        "acme.foo".to_string(),
        QueryResponse::Page(vec![candidate("acme.foo", "1.0.0")]),
    );
    responses.insert(
        "acme.bar".to_string(),
        QueryResponse::Page(vec![candidate("acme.bar", "2.0.0")]),
    );
    let harness = Harness::with(Vec::new(), responses, Vec::new());

    harness
        .manager
        .install(&tokens(&[
            "acme.foo",
            "dist/one.VSIX",
            "acme.bar",
            "/abs/two.vsix",
        ]))
        .await
        .unwrap();

    let calls = harness.calls();
    let path_installs: Vec<&Call> = calls
        .iter()
        .filter(|call| matches!(call, Call::InstallPath(_)))
        .collect();
    assert_eq!(
        path_installs,
        vec![
            &Call::InstallPath(PathBuf::from("/work/dist/one.VSIX")),
            &Call::InstallPath(PathBuf::from("/abs/two.vsix")),
        ]
    );
    assert_eq!(
        harness.queries(),
        vec![
            Call::Query(vec!["acme.foo".to_string()]),
            Call::Query(vec!["acme.bar".to_string()]),
        ]
    );

    // All package installs run before any gallery work.
    let last_path = calls
        .iter()
        .rposition(|call| matches!(call, Call::InstallPath(_)))
        .unwrap();
    let first_query = calls
        .iter()
        .position(|call| matches!(call, Call::Query(_)))
        .unwrap();
    assert!(last_path < first_query);

    assert_eq!(
        harness.reporter.lines(),
        vec![
            "Extension 'one.VSIX' was successfully installed!",
            "Extension 'two.vsix' was successfully installed!",
            "Extension 'acme.foo' v1.0.0 was successfully installed!",
            "Extension 'acme.bar' v2.0.0 was successfully installed!",
        ]
    );
}

#[tokio::test]
async fn test_failure_aborts_remaining_installs() {
    let mut responses = HashMap::new();
    responses.insert(
        "acme.later".to_string(),
        QueryResponse::Page(vec![candidate("acme.later", "1.0.0")]),
    );
    let harness = Harness::with(Vec::new(), responses, vec!["broken.vsix"]);

    let err = harness
        .manager
        .install(&tokens(&["ok.vsix", "broken.vsix", "after.vsix", "acme.later"]))
        .await
        .unwrap_err();

    assert!(matches!(err, StoreError::InvalidPackage { .. }));
    assert_eq!(
        harness.calls(),
        vec![
            Call::InstallPath(PathBuf::from("/work/ok.vsix")),
            Call::InstallPath(PathBuf::from("/work/broken.vsix")),
        ]
    );
    assert_eq!(
        harness.reporter.lines(),
        vec!["Extension 'ok.vsix' was successfully installed!"]
    );
}

#[tokio::test]
async fn test_transport_error_uses_server_message() {
    let mut responses = HashMap::new();
    responses.insert(
        "acme.foo".to_string(),
        QueryResponse::Fail(
            TransportError::new("HTTP 429 Too Many Requests")
                .with_status(429)
                .with_response_text(r#"{"message":"quota exceeded"}"#),
        ),
    );
    let harness = Harness::with(Vec::new(), responses, Vec::new());

    let err = harness
        .manager
        .install(&tokens(&["acme.foo"]))
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "quota exceeded");
}

#[tokio::test]
async fn test_transport_error_without_json_passes_through() {
    let original = TransportError::new("HTTP 502 Bad Gateway")
        .with_status(502)
        .with_response_text("not json");
    let mut responses = HashMap::new();
    responses.insert("acme.foo".to_string(), QueryResponse::Fail(original.clone()));
    let harness = Harness::with(Vec::new(), responses, Vec::new());

    let err = harness
        .manager
        .install(&tokens(&["acme.foo"]))
        .await
        .unwrap_err();

    match err {
        StoreError::Transport(transport) => assert_eq!(transport, original),
        other => panic!("expected transport error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_uninstall_stops_at_missing_id() {
    let harness = Harness::new(vec![
        installed("acme.foo", "1.0.0"),
        installed("acme.tail", "1.0.0"),
    ]);

    let err = harness
        .manager
        .run(Some(Command::Uninstall(tokens(&[
            "acme.foo",
            "ghost.ext",
            "acme.tail",
        ]))))
        .await
        .unwrap_err();

    assert!(matches!(err, StoreError::ExtensionNotInstalled(ref id) if id == "ghost.ext"));
    assert!(err.to_string().contains("full extension ID"));
    assert_eq!(
        harness.reporter.lines(),
        vec!["Extension 'acme.foo' was successfully uninstalled!"]
    );
    assert_eq!(harness.installed_ids(), vec!["acme.tail"]);
    assert!(!harness
        .calls()
        .contains(&Call::Uninstall("acme.tail".to_string())));
}

#[tokio::test]
async fn test_uninstall_matching_is_case_sensitive() {
    let harness = Harness::new(vec![installed("acme.foo", "1.0.0")]);

    let err = harness
        .manager
        .uninstall(&tokens(&["ACME.foo"]))
        .await
        .unwrap_err();

    assert!(matches!(err, StoreError::ExtensionNotInstalled(_)));
    assert_eq!(harness.installed_ids(), vec!["acme.foo"]);
}

#[tokio::test]
async fn test_list_reports_in_enumeration_order() {
    let harness = Harness::new(vec![
        installed("zeta.one", "1.0.0"),
        installed("alpha.two", "2.1.0"),
    ]);

    harness
        .manager
        .run(Some(Command::List {
            show_versions: false,
        }))
        .await
        .unwrap();
    assert_eq!(harness.reporter.lines(), vec!["zeta.one", "alpha.two"]);

    let versioned = Harness::new(vec![installed("alpha.two", "2.1.0")]);
    versioned.manager.list(true).await.unwrap();
    assert_eq!(versioned.reporter.lines(), vec!["alpha.two@2.1.0"]);
}

#[tokio::test]
async fn test_no_command_is_silent_noop() {
    let harness = Harness::new(vec![installed("acme.foo", "1.0.0")]);

    harness.manager.run(None).await.unwrap();

    assert!(harness.reporter.outcomes().is_empty());
    assert!(harness.calls().is_empty());
}

#[tokio::test]
async fn test_repeated_name_installs_once() {
    let mut responses = HashMap::new();
    responses.insert(
        "acme.foo".to_string(),
        QueryResponse::Page(vec![candidate("acme.foo", "1.0.0")]),
    );
    let harness = Harness::with(Vec::new(), responses, Vec::new());

    harness
        .manager
        .install(&tokens(&["acme.foo", "acme.foo"]))
        .await
        .unwrap();

    assert_eq!(harness.queries().len(), 1);
    assert_eq!(
        harness.reporter.lines(),
        vec![
            "Extension 'acme.foo' v1.0.0 was successfully installed!",
            "Extension 'acme.foo' is already installed.",
        ]
    );
}
