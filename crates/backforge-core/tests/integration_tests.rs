//! Integration tests for backforge-core, wired to the real adapters.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use backforge_adapters::{BuiltinCatalog, LocalFilesystem, MemoryFilesystem, SimpleRenderer};
use backforge_core::{
    application::{AuditIssue, ApplicationError, ports::Filesystem, services::load_routes},
    domain::manifests::ROUTES_FILE,
    prelude::*,
    routing::{
        Controller, Flow, HttpMethod, MethodTable, Principal, RequestContext, Response,
        RoleGuard, RouteIssue, RouterError,
    },
};
use tempfile::TempDir;

// ── Routing ───────────────────────────────────────────────────────────────────

fn admin_table() -> RouterConfig {
    RouteBuilder::new()
        .default_middleware("logging")
        .get("/public", "pages.home")
        .without(["logging"])
        .get("/admin", "admin.stats")
        .with(["auth"])
        .roles(["admin"])
        .get("/users/:id", "users.show")
        .with(["auth"])
        .build()
        .unwrap()
}

fn admin_router(log: Arc<Mutex<Vec<String>>>) -> DeclarativeRouter {
    let logged = Arc::clone(&log);
    DeclarativeRouter::new(admin_table())
        .register_middleware("logging", move |req: &mut RequestContext| {
            logged.lock().unwrap().push(req.path().to_string());
            Flow::Next
        })
        .register_middleware("auth", |req: &mut RequestContext| {
            match req.header("x-user").map(str::to_string) {
                Some(user) => {
                    let roles = req.header("x-roles").unwrap_or_default().to_string();
                    req.set_principal(Principal::new(user, roles.split(',').filter(|r| !r.is_empty())));
                    Flow::Next
                }
                None => Flow::Respond(Response::unauthorized()),
            }
        })
        .register_role_check(RoleGuard)
        .register_controller(
            "pages",
            Controller::new().method("home", |_: &RequestContext| Response::ok("home")),
        )
        .register_controller(
            "admin",
            Controller::new().method("stats", |_: &RequestContext| Response::ok("stats")),
        )
        .register_controller(
            "users",
            Controller::new().method("show", |req: &RequestContext| {
                Response::ok(req.param("id").unwrap_or_default())
            }),
        )
}

#[test]
fn test_router_dispatches_composed_chains() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let table = admin_router(Arc::clone(&log))
        .apply_to(MethodTable::new())
        .unwrap();

    assert_eq!(
        table.entries(),
        [("GET", "/public"), ("GET", "/admin"), ("GET", "/users/:id")]
    );

    let public = table.dispatch(RequestContext::new(HttpMethod::Get, "/public"));
    assert_eq!(public, Response::ok("home"));

    let anonymous = table.dispatch(RequestContext::new(HttpMethod::Get, "/admin"));
    assert_eq!(anonymous.status, 401);

    let viewer = table.dispatch(
        RequestContext::new(HttpMethod::Get, "/admin")
            .with_header("X-User", "bo")
            .with_header("X-Roles", "viewer"),
    );
    assert_eq!(viewer.status, 403);

    let admin = table.dispatch(
        RequestContext::new(HttpMethod::Get, "/admin")
            .with_header("X-User", "al")
            .with_header("X-Roles", "viewer,admin"),
    );
    assert_eq!(admin, Response::ok("stats"));

    let user = table.dispatch(
        RequestContext::new(HttpMethod::Get, "/users/42").with_header("X-User", "al"),
    );
    assert_eq!(user, Response::ok("42"));

    assert_eq!(
        table.dispatch(RequestContext::new(HttpMethod::Post, "/public")).status,
        404
    );

    // /public disables logging; every other dispatch logged once.
    assert_eq!(log.lock().unwrap().as_slice(), ["/admin", "/admin", "/admin", "/users/42"]);
}

#[test]
fn test_router_refuses_incomplete_registries() {
    let router = DeclarativeRouter::new(admin_table())
        .register_middleware("logging", |_: &mut RequestContext| Flow::Next)
        .register_controller(
            "pages",
            Controller::new().method("home", |_: &RequestContext| Response::ok("home")),
        );

    let Err(RouterError::InvalidRouteTable(report)) = router.apply_to(MethodTable::new()) else {
        panic!("expected the table to be refused");
    };

    let issues = report.into_issues();
    assert!(issues.iter().any(|i| matches!(
        i,
        RouteIssue::UnregisteredMiddleware { name, path, .. } if name == "auth" && path == "/admin"
    )));
    assert!(issues.iter().any(|i| matches!(
        i,
        RouteIssue::UnregisteredMiddleware { name, .. } if name == "roleCheck"
    )));
    assert!(issues.iter().any(|i| matches!(
        i,
        RouteIssue::UnregisteredController { name, .. } if name == "users"
    )));
}

#[test]
fn test_route_table_survives_json() {
    let table = admin_table();
    let json = table.to_json_pretty().unwrap();
    assert!(json.contains("\"disableMiddlewares\""));
    assert_eq!(RouterConfig::from_json(&json).unwrap(), table);
}

// ── Scaffolding ───────────────────────────────────────────────────────────────

fn scaffold_service(fs: &MemoryFilesystem) -> ScaffoldService {
    ScaffoldService::new(
        Box::new(BuiltinCatalog),
        Box::new(SimpleRenderer),
        Box::new(fs.clone()),
    )
}

fn component_service(fs: &MemoryFilesystem) -> ComponentService {
    ComponentService::new(
        Box::new(BuiltinCatalog),
        Box::new(SimpleRenderer),
        Box::new(fs.clone()),
    )
}

fn auth_config() -> ProjectConfig {
    ProjectConfig::builder()
        .name("shop-api")
        .database(Database::Postgres)
        .auth(AuthStrategy::Jwt)
        .lock(LockBackend::Redis)
        .feature(Feature::Docker)
        .build()
        .unwrap()
}

fn generated(config: &ProjectConfig) -> (MemoryFilesystem, PathBuf) {
    let fs = MemoryFilesystem::new();
    let root = PathBuf::from("/work").join(config.name());
    scaffold_service(&fs)
        .scaffold(config, &root, WriteMode::CreateNew)
        .unwrap();
    (fs, root)
}

#[test]
fn test_full_scaffold_workflow() {
    let config = auth_config();
    let (fs, root) = generated(&config);

    for file in [
        "package.json",
        "tsconfig.json",
        "backforge.json",
        ".env.example",
        "Dockerfile",
        "src/server.ts",
        "src/routes/registry.ts",
        "src/routes/routes.json",
        "src/middleware/authenticate.ts",
        "src/middleware/role-check.ts",
        "src/db/client.ts",
        "src/lock/index.ts",
    ] {
        assert!(fs.exists(&root.join(file)), "missing {file}");
    }
    assert!(!fs.exists(&root.join("src/queue/index.ts")));

    let package = fs.read_file(&root.join("package.json")).unwrap();
    assert!(package.contains("\"name\": \"shop-api\""));
    assert!(package.contains("\"jsonwebtoken\""));
    assert!(package.contains("\"pg\""));

    let table = load_routes(&fs, &root).unwrap();
    assert_eq!(table.routes().len(), 3);
}

#[test]
fn test_scaffold_refuses_existing_directory() {
    let config = auth_config();
    let (fs, root) = generated(&config);

    let err = scaffold_service(&fs)
        .scaffold(&config, &root, WriteMode::CreateNew)
        .unwrap_err();
    assert!(matches!(
        err,
        ForgeError::Application(ApplicationError::ProjectExists { .. })
    ));

    let fs_with_stray = fs.clone();
    fs_with_stray
        .write_file(&root.join("stray.txt"), "left over")
        .unwrap();
    scaffold_service(&fs)
        .scaffold(&config, &root, WriteMode::Overwrite)
        .unwrap();
    assert!(!fs.exists(&root.join("stray.txt")));
}

#[test]
fn test_scaffold_to_disk() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().join("disk-api");
    let config = ProjectConfig::builder()
        .name("disk-api")
        .framework(Framework::Hono)
        .language(Language::JavaScript)
        .build()
        .unwrap();

    let service = ScaffoldService::new(
        Box::new(BuiltinCatalog),
        Box::new(SimpleRenderer),
        Box::new(LocalFilesystem::new()),
    );
    let report = service.scaffold(&config, &root, WriteMode::CreateNew).unwrap();

    assert_eq!(report.root, root);
    assert!(root.join("src/app.js").is_file());
    assert!(!root.join("tsconfig.json").exists());
    let app = std::fs::read_to_string(root.join("src/app.js")).unwrap();
    assert!(app.contains("from 'hono'"));
    assert!(!app.contains("express"));
}

#[test]
fn test_generated_projects_audit_clean() {
    for framework in Framework::ALL {
        for language in Language::ALL {
            for auth in [AuthStrategy::None, AuthStrategy::ApiKey] {
                let config = ProjectConfig::builder()
                    .name("audit-me")
                    .framework(framework)
                    .language(language)
                    .auth(auth)
                    .features(Feature::ALL)
                    .build()
                    .unwrap();
                let (fs, root) = generated(&config);

                let report = AuditService::new(Box::new(fs)).audit(&root).unwrap();
                assert!(report.is_clean(), "{config}: {:?}", report.errors());
                assert!(report.files_scanned > 5);
            }
        }
    }
}

// ── Components ────────────────────────────────────────────────────────────────

fn spec(kind: ComponentKind, name: &str) -> ComponentSpec {
    ComponentSpec::new(kind, ComponentName::parse(name).unwrap())
}

#[test]
fn test_add_route_extends_table_and_index() {
    let config = auth_config();
    let (fs, root) = generated(&config);

    let report = component_service(&fs)
        .add(&root, &spec(ComponentKind::Route, "order-items"))
        .unwrap();

    assert_eq!(report.created, ["src/controllers/order-items.controller.ts"]);
    assert_eq!(
        report.modified,
        ["src/controllers/index.ts", ROUTES_FILE]
    );
    assert_eq!(report.routes_added.len(), 5);
    assert_eq!(report.routes_added[0], "GET /order-items");

    let index = fs.read_file(&root.join("src/controllers/index.ts")).unwrap();
    assert!(index.contains("import { orderItemsController } from './order-items.controller.js';"));
    assert!(index.contains("registerController('orderItems', orderItemsController);"));

    let table = load_routes(&fs, &root).unwrap();
    assert_eq!(table.routes().len(), 8);
    assert!(table.declares(HttpMethod::Delete, "/order-items/:id"));

    let audit = AuditService::new(Box::new(fs)).audit(&root).unwrap();
    assert!(audit.is_clean(), "{:?}", audit.errors());
}

#[test]
fn test_add_service_and_middleware() {
    let config = ProjectConfig::builder()
        .name("plain")
        .language(Language::JavaScript)
        .build()
        .unwrap();
    let (fs, root) = generated(&config);
    let service = component_service(&fs);

    let report = service.add(&root, &spec(ComponentKind::Service, "billing")).unwrap();
    assert_eq!(report.created, ["src/services/billing.service.js"]);
    assert!(report.routes_added.is_empty());
    let services = fs.read_file(&root.join("src/services/index.js")).unwrap();
    assert!(services.contains("// backforge:services\nexport * from './billing.service.js';"));

    service.add(&root, &spec(ComponentKind::Middleware, "audit-trail")).unwrap();
    let middleware = fs.read_file(&root.join("src/middleware/index.js")).unwrap();
    assert!(middleware.contains("import { auditTrail } from './audit-trail.js';"));
    assert!(middleware.contains("registerMiddleware('auditTrail', auditTrail);"));

    let audit = AuditService::new(Box::new(fs)).audit(&root).unwrap();
    assert!(audit.is_clean(), "{:?}", audit.errors());
}

#[test]
fn test_add_refuses_existing_component_or_route() {
    let config = auth_config();
    let (fs, root) = generated(&config);
    let service = component_service(&fs);

    service.add(&root, &spec(ComponentKind::Service, "billing")).unwrap();
    let err = service
        .add(&root, &spec(ComponentKind::Service, "billing"))
        .unwrap_err();
    assert!(matches!(
        err,
        ForgeError::Application(ApplicationError::ComponentExists { .. })
    ));

    // A controller whose base path collides with /me.
    let clash = spec(ComponentKind::Route, "profile").with_base_path("/me").unwrap();
    let before = fs.read_file(&root.join("src/controllers/index.ts")).unwrap();
    let err = service.add(&root, &clash).unwrap_err();
    assert!(matches!(
        err,
        ForgeError::Application(ApplicationError::DuplicateRoute { .. })
    ));
    assert_eq!(
        fs.read_file(&root.join("src/controllers/index.ts")).unwrap(),
        before
    );
    assert!(!fs.exists(&root.join("src/controllers/profile.controller.ts")));
}

/// Delegates to memory but refuses writes to one path.
struct FailingWrites {
    inner: MemoryFilesystem,
    refused: PathBuf,
}

impl Filesystem for FailingWrites {
    fn create_dir_all(&self, path: &Path) -> ForgeResult<()> {
        self.inner.create_dir_all(path)
    }

    fn write_file(&self, path: &Path, content: &str) -> ForgeResult<()> {
        if path == self.refused {
            return Err(ApplicationError::FilesystemError {
                path: path.to_path_buf(),
                reason: "disk full".into(),
            }
            .into());
        }
        self.inner.write_file(path, content)
    }

    fn read_to_string(&self, path: &Path) -> ForgeResult<String> {
        self.inner.read_to_string(path)
    }

    fn set_permissions(&self, path: &Path, executable: bool) -> ForgeResult<()> {
        self.inner.set_permissions(path, executable)
    }

    fn remove_file(&self, path: &Path) -> ForgeResult<()> {
        self.inner.remove_file(path)
    }

    fn exists(&self, path: &Path) -> bool {
        self.inner.exists(path)
    }

    fn remove_dir_all(&self, path: &Path) -> ForgeResult<()> {
        self.inner.remove_dir_all(path)
    }

    fn list_files(&self, root: &Path) -> ForgeResult<Vec<PathBuf>> {
        self.inner.list_files(root)
    }
}

#[test]
fn test_failed_add_write_restores_project() {
    let config = auth_config();
    let (fs, root) = generated(&config);
    let controller = root.join("src/controllers/orders.controller.ts");
    let index = root.join("src/controllers/index.ts");
    let routes = root.join(ROUTES_FILE);
    let index_before = fs.read_file(&index).unwrap();
    let routes_before = fs.read_file(&routes).unwrap();

    for refused in [index.clone(), routes.clone()] {
        let service = ComponentService::new(
            Box::new(BuiltinCatalog),
            Box::new(SimpleRenderer),
            Box::new(FailingWrites {
                inner: fs.clone(),
                refused,
            }),
        );
        let err = service
            .add(&root, &spec(ComponentKind::Route, "orders"))
            .unwrap_err();
        assert!(err.to_string().contains("disk full"), "{err}");

        assert!(!fs.exists(&controller));
        assert_eq!(fs.read_file(&index).unwrap(), index_before);
        assert_eq!(fs.read_file(&routes).unwrap(), routes_before);
    }

    // Nothing is left behind to block a retry.
    component_service(&fs)
        .add(&root, &spec(ComponentKind::Route, "orders"))
        .unwrap();
    assert!(fs.exists(&controller));
}

#[test]
fn test_add_outside_a_project_fails() {
    let fs = MemoryFilesystem::new();
    let err = component_service(&fs)
        .add(Path::new("/nowhere"), &spec(ComponentKind::Route, "orders"))
        .unwrap_err();
    assert!(matches!(
        err,
        ForgeError::Application(ApplicationError::ProjectNotFound { .. })
    ));
}

// ── Audit ─────────────────────────────────────────────────────────────────────

#[test]
fn test_audit_reports_broken_projects() {
    let config = auth_config();
    let (fs, root) = generated(&config);

    fs.write_file(
        &root.join("src/app.ts"),
        "import { gone } from './gone.js';\nexport const app = gone;\n",
    )
    .unwrap();

    let routes = r#"{
  "defaultMiddlewares": ["requestLogger", "compression"],
  "routes": [
    { "method": "GET", "path": "/health", "handler": "health.check" },
    { "method": "GET", "path": "/me", "handler": "account.whoami" }
  ]
}"#;
    fs.write_file(&root.join(ROUTES_FILE), routes).unwrap();

    let report = AuditService::new(Box::new(fs)).audit(&root).unwrap();
    let errors = report.errors();

    assert!(errors.contains(&"src/app.ts: cannot resolve import './gone.js'".to_string()));
    assert!(report.issues.iter().any(|i| matches!(
        i,
        AuditIssue::Route(RouteIssue::UnregisteredMiddleware { name, .. }) if name == "compression"
    )));
    assert!(report.issues.iter().any(|i| matches!(
        i,
        AuditIssue::Route(RouteIssue::UnregisteredMethod { name, .. }) if name == "whoami"
    )));
    // Missing names are reported once per route.
    let compression = report
        .issues
        .iter()
        .filter(|i| i.to_string().contains("'compression'"))
        .count();
    assert_eq!(compression, 2);
}

#[test]
fn test_audit_reports_unreadable_route_table() {
    let config = auth_config();
    let (fs, root) = generated(&config);
    fs.write_file(&root.join(ROUTES_FILE), "{ not json").unwrap();

    let report = AuditService::new(Box::new(fs)).audit(&root).unwrap();
    assert!(matches!(report.issues.as_slice(), [AuditIssue::RouteTable(_)]));
}

#[test]
fn test_project_detected_without_descriptor() {
    let config = auth_config();
    let (generated_fs, root) = generated(&config);
    let package = generated_fs.read_file(&root.join("package.json")).unwrap();

    // Same project without backforge.json.
    let fs = MemoryFilesystem::new()
        .with_file(root.join("package.json"), package)
        .with_file(root.join("tsconfig.json"), "{}")
        .with_file(root.join("src/middleware/authenticate.ts"), "")
        .with_file(root.join("Dockerfile"), "");

    let detected = backforge_core::application::services::load_project(&fs, &root).unwrap();
    assert_eq!(detected.name(), "shop-api");
    assert_eq!(detected.auth(), AuthStrategy::Jwt);
    assert_eq!(detected.database(), Database::Postgres);
    assert_eq!(detected.language(), Language::TypeScript);
    assert!(detected.has_feature(Feature::Docker));
}

// ── Route plans ───────────────────────────────────────────────────────────────

#[test]
fn test_route_plan_of_generated_project() {
    let config = auth_config();
    let (fs, root) = generated(&config);

    let plans = RoutePlanService::new(Box::new(fs)).plan(&root).unwrap();
    let rendered: Vec<String> = plans
        .iter()
        .map(|p| format!("{} {} {}", p.method, p.path, p.chain))
        .collect();

    assert_eq!(
        rendered,
        [
            "GET /health [cors]",
            "GET /me [requestLogger, cors, authenticate]",
            "GET /admin/stats [requestLogger, cors, authenticate, roleCheck(admin)]",
        ]
    );
}
