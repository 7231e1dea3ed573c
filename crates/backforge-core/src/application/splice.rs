//! Line-based edits of generated source files.
//!
//! Best effort by nature: these functions only understand the layout
//! backforge generates. Every function is idempotent; a line already present
//! (ignoring surrounding whitespace) is never added twice.

/// Marks the registration block in `src/middleware/index.*`.
pub const MIDDLEWARE_ANCHOR: &str = "// backforge:middleware";
/// Marks the registration block in `src/controllers/index.*`.
pub const CONTROLLER_ANCHOR: &str = "// backforge:controllers";
/// Marks the export block in `src/services/index.*`.
pub const SERVICE_ANCHOR: &str = "// backforge:services";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Spliced {
    Changed(String),
    Unchanged,
}

impl Spliced {
    /// The resulting text, given the text that went in.
    pub fn into_text(self, original: &str) -> String {
        match self {
            Self::Changed(text) => text,
            Self::Unchanged => original.to_string(),
        }
    }

    pub fn is_changed(&self) -> bool {
        matches!(self, Self::Changed(_))
    }
}

fn contains_line(source: &str, line: &str) -> bool {
    let wanted = line.trim();
    source.lines().any(|l| l.trim() == wanted)
}

fn is_import(line: &str) -> bool {
    let line = line.trim_start();
    line.starts_with("import ") || line.starts_with("import{")
}

/// Insert `line` after the last top-level import, or at the top of the file
/// when there is none.
pub fn insert_import(source: &str, line: &str) -> Spliced {
    if contains_line(source, line) {
        return Spliced::Unchanged;
    }

    let lines: Vec<&str> = source.lines().collect();
    let at = lines
        .iter()
        .rposition(|l| is_import(l))
        .map_or(0, |i| i + 1);

    Spliced::Changed(rebuild(source, &lines, at, line))
}

/// Append `line` to the block of non-blank lines directly below `anchor`.
///
/// Returns `None` when no line equals `anchor` (after trimming).
pub fn insert_after_anchor(source: &str, anchor: &str, line: &str) -> Option<Spliced> {
    let lines: Vec<&str> = source.lines().collect();
    let anchor_at = lines.iter().position(|l| l.trim() == anchor.trim())?;

    if contains_line(source, line) {
        return Some(Spliced::Unchanged);
    }

    let block_end = lines[anchor_at + 1..]
        .iter()
        .position(|l| l.trim().is_empty())
        .map_or(lines.len(), |offset| anchor_at + 1 + offset);

    Some(Spliced::Changed(rebuild(source, &lines, block_end, line)))
}

fn rebuild(source: &str, lines: &[&str], at: usize, line: &str) -> String {
    let mut out = String::with_capacity(source.len() + line.len() + 1);
    for (i, existing) in lines.iter().enumerate() {
        if i == at {
            out.push_str(line);
            out.push('\n');
        }
        out.push_str(existing);
        out.push('\n');
    }
    if at >= lines.len() {
        out.push_str(line);
        out.push('\n');
    }
    if !source.ends_with('\n') && !source.is_empty() {
        out.pop();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const INDEX: &str = "\
import { registerMiddleware } from '../routes/registry.js';
import { cors } from './cors.js';

// backforge:middleware
registerMiddleware('cors', cors);

export {};
";

    #[test]
    fn import_goes_after_last_import() {
        let out = insert_import(INDEX, "import { audit } from './audit.js';").into_text(INDEX);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[2], "import { audit } from './audit.js';");
        assert_eq!(lines[3], "");
    }

    #[test]
    fn import_into_file_without_imports_goes_first() {
        let out = insert_import("export {};\n", "import a from './a.js';").into_text("");
        assert_eq!(out, "import a from './a.js';\nexport {};\n");
    }

    #[test]
    fn registrations_append_in_order() {
        let once = insert_after_anchor(INDEX, MIDDLEWARE_ANCHOR, "registerMiddleware('audit', audit);")
            .unwrap()
            .into_text(INDEX);
        let twice = insert_after_anchor(&once, MIDDLEWARE_ANCHOR, "registerMiddleware('zeta', zeta);")
            .unwrap()
            .into_text(&once);

        let block: Vec<&str> = twice
            .lines()
            .skip_while(|l| *l != MIDDLEWARE_ANCHOR)
            .skip(1)
            .take_while(|l| !l.is_empty())
            .collect();
        assert_eq!(
            block,
            [
                "registerMiddleware('cors', cors);",
                "registerMiddleware('audit', audit);",
                "registerMiddleware('zeta', zeta);",
            ]
        );
        assert!(twice.ends_with("export {};\n"));
    }

    #[test]
    fn splicing_is_idempotent() {
        let line = "registerMiddleware('cors', cors);";
        assert_eq!(
            insert_after_anchor(INDEX, MIDDLEWARE_ANCHOR, line),
            Some(Spliced::Unchanged)
        );
        assert_eq!(
            insert_import(INDEX, "  import { cors } from './cors.js';"),
            Spliced::Unchanged
        );
    }

    #[test]
    fn missing_anchor_is_reported() {
        assert_eq!(insert_after_anchor("export {};\n", CONTROLLER_ANCHOR, "x"), None);
    }

    #[test]
    fn anchor_at_end_of_file_without_newline() {
        let src = "// backforge:services";
        let out = insert_after_anchor(src, SERVICE_ANCHOR, "export * from './a.service.js';")
            .unwrap()
            .into_text(src);
        assert_eq!(out, "// backforge:services\nexport * from './a.service.js';");
    }
}
