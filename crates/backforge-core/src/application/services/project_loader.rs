//! Reading an existing generated project back.
//!
//! `backforge.json` is authoritative. Projects without one (hand-created or
//! older) are recognised from `package.json`, `tsconfig.json` and the
//! middleware files that exist.

use std::path::Path;

use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::application::{ApplicationError, ports::Filesystem};
use crate::domain::{
    AuthStrategy, Database, Feature, Framework, Language, LockBackend, ProjectConfig,
    ProjectFile, Queue,
    capabilities::{AUTHENTICATE, FEATURE_REGISTRY},
    manifests::{PACKAGE_FILE, PROJECT_FILE, ROUTES_FILE, TSCONFIG_FILE},
};
use crate::error::ForgeResult;
use crate::routing::RouterConfig;

#[instrument(skip_all, fields(root = %root.display()))]
pub fn load_project(fs: &dyn Filesystem, root: &Path) -> ForgeResult<ProjectConfig> {
    let descriptor = root.join(PROJECT_FILE);
    if fs.exists(&descriptor) {
        let text = fs.read_to_string(&descriptor)?;
        let file = ProjectFile::from_json(&text)?;
        debug!(generator = %file.generator_version, "loaded project descriptor");
        return Ok(file.project);
    }

    if fs.exists(&root.join(PACKAGE_FILE)) {
        warn!("{PROJECT_FILE} missing, detecting settings from package.json");
        return detect(fs, root);
    }

    Err(ApplicationError::ProjectNotFound {
        path: root.to_path_buf(),
    }
    .into())
}

pub fn load_routes(fs: &dyn Filesystem, root: &Path) -> ForgeResult<RouterConfig> {
    let path = root.join(ROUTES_FILE);
    if !fs.exists(&path) {
        return Err(ApplicationError::ProjectConfigMissing {
            path: root.to_path_buf(),
            reason: format!("{ROUTES_FILE} does not exist"),
        }
        .into());
    }
    let text = fs.read_to_string(&path)?;
    RouterConfig::from_json(&text).map_err(|e| {
        ApplicationError::RouteTableInvalid {
            reason: e.to_string(),
        }
        .into()
    })
}

/// Pretty JSON in the shape [`load_routes`] reads back.
pub fn routes_text(routes: &RouterConfig) -> ForgeResult<String> {
    routes.to_json_pretty().map_err(|e| {
        ApplicationError::RouteTableInvalid {
            reason: e.to_string(),
        }
        .into()
    })
}

fn detect(fs: &dyn Filesystem, root: &Path) -> ForgeResult<ProjectConfig> {
    let missing = |reason: String| ApplicationError::ProjectConfigMissing {
        path: root.to_path_buf(),
        reason,
    };

    let text = fs.read_to_string(&root.join(PACKAGE_FILE))?;
    let package: Value =
        serde_json::from_str(&text).map_err(|e| missing(format!("{PACKAGE_FILE}: {e}")))?;

    let name = package["name"]
        .as_str()
        .map(str::to_string)
        .or_else(|| root.file_name().map(|n| n.to_string_lossy().into_owned()))
        .ok_or_else(|| missing("package.json has no name".into()))?;

    let deps = |key: &str| package["dependencies"].get(key).is_some();

    let language = if fs.exists(&root.join(TSCONFIG_FILE)) {
        Language::TypeScript
    } else {
        Language::JavaScript
    };
    let ext = language.file_extension();
    let has_middleware = |stem: &str| fs.exists(&root.join(format!("src/middleware/{stem}.{ext}")));

    let framework = if deps("hono") {
        Framework::Hono
    } else {
        Framework::Express
    };

    let database = [
        ("pg", Database::Postgres),
        ("mysql2", Database::Mysql),
        ("mongodb", Database::Mongodb),
        ("better-sqlite3", Database::Sqlite),
    ]
    .into_iter()
    .find(|(pkg, _)| deps(*pkg))
    .map_or(Database::None, |(_, db)| db);

    let auth = if deps("jsonwebtoken") {
        AuthStrategy::Jwt
    } else if deps("express-session") {
        AuthStrategy::Session
    } else if has_middleware(AUTHENTICATE.stem) {
        AuthStrategy::ApiKey
    } else {
        AuthStrategy::None
    };

    let queue = if deps("bullmq") {
        Queue::BullMq
    } else if deps("amqplib") {
        Queue::RabbitMq
    } else {
        Queue::None
    };

    let lock = if deps("proper-lockfile") {
        LockBackend::File
    } else if deps("ioredis") {
        LockBackend::Redis
    } else {
        LockBackend::None
    };

    let mut features: Vec<Feature> = FEATURE_REGISTRY
        .iter()
        .filter(|def| def.middleware.is_some_and(|m| has_middleware(m.stem)))
        .map(|def| def.feature)
        .collect();
    if fs.exists(&root.join("Dockerfile")) {
        features.push(Feature::Docker);
    }

    let config = ProjectConfig::builder()
        .name(name)
        .framework(framework)
        .language(language)
        .database(database)
        .auth(auth)
        .queue(queue)
        .lock(lock)
        .without_default_features()
        .features(features)
        .build()?;

    info!(project = %config, "detected project settings");
    Ok(config)
}
