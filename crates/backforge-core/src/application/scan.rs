//! Regex scanning of generated JavaScript/TypeScript sources.
//!
//! Recovers what a project registers (middleware, role check, controllers)
//! and which relative modules it imports, without parsing JS. Lines that
//! start as comments are ignored.

use std::sync::LazyLock;

use regex::Regex;

static RELATIVE_IMPORT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?:\bfrom\s*|\bimport\s*\(?\s*|\brequire\s*\(\s*)['"](\.{1,2}/[^'"]*)['"]"#)
        .expect("relative import regex should be valid")
});

static REGISTER_MIDDLEWARE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\bregisterMiddleware\(\s*['"]([^'"]+)['"]"#)
        .expect("middleware regex should be valid")
});

static REGISTER_ROLE_CHECK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*registerRoleCheck\s*\(").expect("role check regex should be valid")
});

static REGISTER_CONTROLLER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\bregisterController\(\s*['"]([^'"]+)['"]\s*,\s*([A-Za-z_$][\w$]*)"#)
        .expect("controller regex should be valid")
});

static NAMED_IMPORT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"import\s*\{([^}]*)\}\s*from\s*['"]([^'"]+)['"]"#)
        .expect("named import regex should be valid")
});

static OBJECT_MEMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^  (?:async\s+)?([A-Za-z_$][\w$]*)\s*[(:]")
        .expect("member regex should be valid")
});

fn code_lines(source: &str) -> impl Iterator<Item = &str> {
    source.lines().filter(|line| {
        let t = line.trim_start();
        !(t.starts_with("//") || t.starts_with("/*") || t.starts_with('*'))
    })
}

/// Relative module specifiers (`./x`, `../y.js`) in import order.
pub fn relative_imports(source: &str) -> Vec<String> {
    code_lines(source)
        .flat_map(|line| RELATIVE_IMPORT.captures_iter(line))
        .map(|c| c[1].to_string())
        .collect()
}

/// Names passed to `registerMiddleware('<name>', ...)`.
pub fn registered_middlewares(source: &str) -> Vec<String> {
    code_lines(source)
        .flat_map(|line| REGISTER_MIDDLEWARE.captures_iter(line))
        .map(|c| c[1].to_string())
        .collect()
}

pub fn registers_role_check(source: &str) -> bool {
    code_lines(source).any(|line| REGISTER_ROLE_CHECK.is_match(line))
}

/// A `registerController('<name>', <identifier>)` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerRegistration {
    pub name: String,
    pub identifier: String,
}

pub fn registered_controllers(source: &str) -> Vec<ControllerRegistration> {
    code_lines(source)
        .flat_map(|line| REGISTER_CONTROLLER.captures_iter(line))
        .map(|c| ControllerRegistration {
            name: c[1].to_string(),
            identifier: c[2].to_string(),
        })
        .collect()
}

/// Where a local binding comes from: `import { imported as local } from 'specifier'`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportBinding {
    pub imported: String,
    pub specifier: String,
}

/// The named import that introduces `local`, if any.
pub fn import_binding(source: &str, local: &str) -> Option<ImportBinding> {
    NAMED_IMPORT.captures_iter(source).find_map(|c| {
        c[1].split(',').find_map(|item| {
            let (imported, bound) = match item.split_once(" as ") {
                Some((imported, alias)) => (imported.trim(), alias.trim()),
                None => (item.trim(), item.trim()),
            };
            (bound == local).then(|| ImportBinding {
                imported: imported.to_string(),
                specifier: c[2].to_string(),
            })
        })
    })
}

/// Members of `export const <identifier> = { ... }`, as generated for
/// controllers: two-space indented methods or properties.
pub fn object_members(source: &str, identifier: &str) -> Vec<String> {
    let header = format!(r"export\s+const\s+{}\b[^=]*=\s*\{{", regex::escape(identifier));
    let Ok(header) = Regex::new(&header) else {
        return Vec::new();
    };
    let Some(found) = header.find(source) else {
        return Vec::new();
    };

    source[found.end()..]
        .lines()
        .skip(1)
        .take_while(|line| !line.starts_with('}'))
        .filter_map(|line| OBJECT_MEMBER.captures(line).map(|c| c[1].to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONTROLLERS_INDEX: &str = r#"
import { registerController } from '../routes/registry.js';
import { healthController } from './health.controller.js';
import { accountController as account } from './account.controller.js';

// backforge:controllers
registerController('health', healthController);
registerController('account', account);
// registerController('legacy', legacyController);
"#;

    #[test]
    fn finds_relative_imports_only() {
        let src = r#"
import express from 'express';
import { a } from './a.js';
export * from "../b";
import './side-effect.js';
const lazy = await import('./lazy.js');
const c = require('./c');
// import { gone } from './gone.js';
"#;
        assert_eq!(
            relative_imports(src),
            ["./a.js", "../b", "./side-effect.js", "./lazy.js", "./c"]
        );
    }

    #[test]
    fn finds_registrations() {
        let src = "registerMiddleware('cors', cors);\nregisterMiddleware(\"rateLimit\", rl);\nregisterRoleCheck(roleCheck);\n";
        assert_eq!(registered_middlewares(src), ["cors", "rateLimit"]);
        assert!(registers_role_check(src));
        assert!(!registers_role_check("// registerRoleCheck(roleCheck);\n"));
        assert!(!registers_role_check(
            "export function registerRoleCheck(factory: RoleCheckFactory): void {\n"
        ));

        let controllers = registered_controllers(CONTROLLERS_INDEX);
        assert_eq!(controllers.len(), 2);
        assert_eq!(controllers[1].name, "account");
        assert_eq!(controllers[1].identifier, "account");
    }

    #[test]
    fn resolves_import_bindings_with_aliases() {
        let health = import_binding(CONTROLLERS_INDEX, "healthController").unwrap();
        assert_eq!(health.imported, "healthController");
        assert_eq!(health.specifier, "./health.controller.js");

        let account = import_binding(CONTROLLERS_INDEX, "account").unwrap();
        assert_eq!(account.imported, "accountController");
        assert_eq!(account.specifier, "./account.controller.js");

        assert_eq!(import_binding(CONTROLLERS_INDEX, "accountController"), None);
    }

    #[test]
    fn lists_controller_members() {
        let src = r#"
import type { Request, Response } from 'express';

export const ordersController = {
  list(_req: Request, res: Response) {
    res.json({ items: [] });
  },
  async get(req: Request, res: Response) {
    res.json({ id: req.params.id });
  },
  remove: (_req: Request, res: Response) => {
    res.status(204).end();
  },
};

export const other = {
  hidden() {},
};
"#;
        assert_eq!(object_members(src, "ordersController"), ["list", "get", "remove"]);
        assert!(object_members(src, "missing").is_empty());
    }
}
