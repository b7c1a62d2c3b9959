//! Lightweight Go source reader.
//!
//! Collects just enough structure for annotation parsing and schema
//! resolution: package clause, import aliases, type declarations (with
//! their doc comments and struct fields), and the doc-comment blocks
//! attached to functions. This is a line scanner, not a Go parser;
//! generics and anonymous interface embedding are out of scope.

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;

static PACKAGE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^package\s+(\w+)").unwrap());

static IMPORT_BLOCK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"import\s+\(\s*((?:[^()]*\n)+?)\s*\)").unwrap());

static SINGLE_IMPORT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?m)^import\s+(?:([A-Za-z0-9_.]+)\s+)?"([^"]+)""#).unwrap());

static IMPORT_LINE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"^\s*(?:([A-Za-z0-9_.]+)\s+)?"([^"]+)""#).unwrap());

static TYPE_DECL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^type\s+(\w+)\s+(.+)$").unwrap());

static FUNC_DECL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^func\s+(?:\(\s*\w+\s+\*?(\w+)\s*\)\s*)?(\w+)\s*\(").unwrap());

static ARRAY_BRACKETS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[\w*\]").unwrap());

static MODULE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^module\s+(\S+)").unwrap());

static REQUIRE_BLOCK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)require\s+\(\s*(.*?)\)").unwrap());

static REQUIRE_LINE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*([^\s(]+)\s+(v\S+)").unwrap());

static SINGLE_REQUIRE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^require\s+([^\s(]+)\s+(v\S+)").unwrap());

/// One import declaration: the alias it is usable under and its canonical path.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GoImport {
    pub alias: String,
    pub path: String,
}

/// A single struct field. `names` is empty for embedded fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GoField {
    pub names: Vec<String>,
    pub type_name: String,
    pub tag: Option<String>,
}

/// Declared shape of a named type.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeShape {
    Struct(Vec<GoField>),
    Array(String),
    Map(String),
    Alias(String),
    Interface,
}

/// A type declaration keyed by its bare name, or by a composite
/// `func@Name` / `Recv@func@Name` key for function- and method-local types.
#[derive(Debug, Clone, PartialEq)]
pub struct GoTypeDecl {
    pub key: String,
    pub name: String,
    pub shape: TypeShape,
    pub doc: Vec<String>,
}

/// Everything collected from one source file.
#[derive(Debug, Clone, Default)]
pub struct GoFileInfo {
    pub package: String,
    pub imports: Vec<GoImport>,
    pub types: Vec<GoTypeDecl>,
    /// Doc-comment blocks attached to function declarations, in file order.
    pub func_docs: Vec<Vec<String>>,
    /// Every contiguous `//` comment block in the file, in file order.
    pub comment_blocks: Vec<Vec<String>>,
}

/// Normalizes a Go type expression the way annotation values are written:
/// pointers dropped, array brackets collapsed to `[]`, map keys collapsed
/// to `map[]`.
pub fn normalize_go_type(raw: &str) -> String {
    let no_ptr = raw.replace('*', "");
    ARRAY_BRACKETS_RE.replace_all(&no_ptr, "[]").into_owned()
}

/// Reads the module path out of a go.mod file.
pub fn module_name(go_mod: &str) -> Option<String> {
    MODULE_RE
        .captures(go_mod)
        .map(|c| c.get(1).unwrap().as_str().to_string())
}

/// Collects `(path, version)` pairs from the require directives of a go.mod.
pub fn module_requires(go_mod: &str) -> Vec<(String, String)> {
    let mut requires = Vec::new();
    if let Some(caps) = REQUIRE_BLOCK_RE.captures(go_mod) {
        for line in caps.get(1).unwrap().as_str().lines() {
            if let Some(m) = REQUIRE_LINE_RE.captures(line) {
                requires.push((m[1].to_string(), m[2].to_string()));
            }
        }
    }
    for caps in SINGLE_REQUIRE_RE.captures_iter(go_mod) {
        requires.push((caps[1].to_string(), caps[2].to_string()));
    }
    requires
}

/// Encodes a module path the way the Go module cache stores it: every
/// uppercase letter becomes `!` followed by its lowercase form.
pub fn escape_module_path(path: &str) -> String {
    let mut escaped = String::with_capacity(path.len());
    for c in path.chars() {
        if c.is_uppercase() {
            escaped.push('!');
            escaped.extend(c.to_lowercase());
        } else {
            escaped.push(c);
        }
    }
    escaped
}

/// Checks whether a source text is the module's main file.
pub fn is_main_file(src: &str) -> bool {
    src.contains("package main") && src.contains("func main(")
}

/// Reader for Go struct tags: space-separated `key:"value"` pairs inside
/// the backtick literal, value escapes `\"` and `\\` unquoted.
#[derive(Debug, Clone)]
pub struct StructTag<'a>(&'a str);

impl<'a> StructTag<'a> {
    pub fn new(raw: &'a str) -> Self {
        Self(raw)
    }

    pub fn get(&self, key: &str) -> Option<String> {
        let mut rest = self.0.trim();
        while !rest.is_empty() {
            let colon = rest.find(':')?;
            let (k, after) = rest.split_at(colon);
            let k = k.trim();
            let after = after.strip_prefix(':')?;
            let after = after.strip_prefix('"')?;
            let mut value = String::new();
            let mut chars = after.char_indices();
            let mut end = None;
            while let Some((i, c)) = chars.next() {
                match c {
                    '\\' => {
                        if let Some((_, escaped)) = chars.next() {
                            value.push(escaped);
                        }
                    }
                    '"' => {
                        end = Some(i);
                        break;
                    }
                    _ => value.push(c),
                }
            }
            let end = end?;
            if k == key {
                return Some(value);
            }
            rest = after[end + 1..].trim_start();
        }
        None
    }

    pub fn has(&self, key: &str) -> bool {
        self.get(key).is_some()
    }
}

/// Extracts import declarations, both grouped and single-line.
pub fn extract_imports(src: &str) -> Vec<GoImport> {
    let mut imports = Vec::new();
    if let Some(caps) = IMPORT_BLOCK_RE.captures(src) {
        for line in caps.get(1).unwrap().as_str().lines() {
            if let Some(m) = IMPORT_LINE_RE.captures(line) {
                imports.push(import_from_captures(&m));
            }
        }
    }
    for caps in SINGLE_IMPORT_RE.captures_iter(src) {
        imports.push(import_from_captures(&caps));
    }
    imports
}

fn import_from_captures(caps: &regex::Captures) -> GoImport {
    let path = caps.get(2).unwrap().as_str().to_string();
    let alias = match caps.get(1) {
        Some(a) if a.as_str() != "_" && a.as_str() != "." => a.as_str().to_string(),
        _ => path.rsplit('/').next().unwrap_or(&path).to_string(),
    };
    GoImport { alias, path }
}

fn brace_delta(line: &str) -> i32 {
    let code = line.split("//").next().unwrap_or(line);
    code.chars().fold(0, |acc, c| match c {
        '{' => acc + 1,
        '}' => acc - 1,
        _ => acc,
    })
}

fn parse_field_line(line: &str) -> Option<GoField> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with("//") {
        return None;
    }
    let (head, tag) = match trimmed.find('`') {
        Some(start) => {
            let tag = trimmed
                .rfind('`')
                .filter(|end| *end > start)
                .map(|end| trimmed[start + 1..end].to_string());
            (trimmed[..start].trim(), tag)
        }
        None => (trimmed.split("//").next().unwrap_or(trimmed).trim(), None),
    };
    let tokens: Vec<&str> = head.split_whitespace().collect();
    if tokens.is_empty() {
        return None;
    }
    if tokens.len() == 1 {
        // embedded field
        return Some(GoField {
            names: Vec::new(),
            type_name: normalize_go_type(tokens[0]),
            tag,
        });
    }
    let mut names = Vec::new();
    let mut i = 0;
    while i < tokens.len() - 1 && tokens[i].ends_with(',') {
        names.push(tokens[i].trim_end_matches(',').to_string());
        i += 1;
    }
    names.push(tokens[i].to_string());
    i += 1;
    if i >= tokens.len() {
        return None;
    }
    let type_token = tokens[i];
    if type_token.contains('(') || type_token.starts_with("chan") {
        // func- and chan-typed fields have no schema representation
        return None;
    }
    Some(GoField {
        names,
        type_name: normalize_go_type(type_token),
        tag,
    })
}

fn shape_from_type_expr(expr: &str) -> Option<TypeShape> {
    let expr = expr.trim();
    if expr.starts_with("interface") {
        return Some(TypeShape::Interface);
    }
    if let Some(rest) = expr.strip_prefix("map[") {
        let close = rest.find(']')?;
        return Some(TypeShape::Map(normalize_go_type(rest[close + 1..].trim())));
    }
    if expr.starts_with('[') {
        let close = expr.find(']')?;
        return Some(TypeShape::Array(normalize_go_type(expr[close + 1..].trim())));
    }
    let token = expr.split_whitespace().next()?;
    if token.contains('(') || token.starts_with("chan") || token == "struct" {
        return None;
    }
    Some(TypeShape::Alias(normalize_go_type(token)))
}

struct PendingStruct {
    key: String,
    name: String,
    doc: Vec<String>,
    fields: Vec<GoField>,
}

/// Scans one Go source file.
pub fn scan_file(src: &str) -> GoFileInfo {
    let mut info = GoFileInfo {
        imports: extract_imports(src),
        ..Default::default()
    };

    let mut pending_comment: Vec<String> = Vec::new();
    let mut cur_struct: Option<PendingStruct> = None;
    let mut func_ctx: Option<(String, i32)> = None;
    let mut iface_depth: i32 = 0;
    let mut in_import = false;
    let mut in_type_group = false;

    let flush = |pending: &mut Vec<String>, blocks: &mut Vec<Vec<String>>| {
        if !pending.is_empty() {
            blocks.push(std::mem::take(pending));
        }
    };

    for line in src.lines() {
        let trimmed = line.trim();

        if cur_struct.is_some() {
            if trimmed.starts_with('}') {
                let st = cur_struct.take().unwrap();
                info.types.push(GoTypeDecl {
                    key: st.key,
                    name: st.name,
                    shape: TypeShape::Struct(st.fields),
                    doc: st.doc,
                });
                continue;
            }
            if let Some(field) = parse_field_line(trimmed) {
                cur_struct.as_mut().unwrap().fields.push(field);
            }
            continue;
        }

        if iface_depth > 0 {
            iface_depth += brace_delta(trimmed);
            continue;
        }

        if in_import {
            if trimmed.starts_with(')') {
                in_import = false;
            }
            continue;
        }

        if func_ctx.is_some() {
            if trimmed.starts_with("//") {
                continue;
            }
            // function- and method-local type declarations
            if let Some(caps) = TYPE_DECL_RE.captures(trimmed) {
                let name = caps[1].to_string();
                let key = format!("{}@{}", func_ctx.as_ref().unwrap().0, name);
                let expr = caps[2].trim();
                if expr.starts_with("struct") {
                    if expr.contains('}') {
                        info.types.push(GoTypeDecl {
                            key,
                            name,
                            shape: TypeShape::Struct(Vec::new()),
                            doc: Vec::new(),
                        });
                    } else {
                        cur_struct = Some(PendingStruct {
                            key,
                            name,
                            doc: Vec::new(),
                            fields: Vec::new(),
                        });
                    }
                    continue;
                }
                if let Some(shape) = shape_from_type_expr(expr) {
                    info.types.push(GoTypeDecl {
                        key,
                        name,
                        shape,
                        doc: Vec::new(),
                    });
                }
                continue;
            }
            let depth = {
                let ctx = func_ctx.as_mut().unwrap();
                ctx.1 += brace_delta(trimmed);
                ctx.1
            };
            if depth <= 0 {
                func_ctx = None;
            }
            continue;
        }

        if trimmed.starts_with("//") {
            pending_comment.push(trimmed.to_string());
            continue;
        }

        if trimmed.is_empty() {
            flush(&mut pending_comment, &mut info.comment_blocks);
            continue;
        }

        if in_type_group {
            if trimmed.starts_with(')') {
                in_type_group = false;
                flush(&mut pending_comment, &mut info.comment_blocks);
                continue;
            }
            if let Some(space) = trimmed.find(char::is_whitespace) {
                let (name, expr) = trimmed.split_at(space);
                let name = name.to_string();
                let expr = expr.trim();
                let doc = pending_comment.clone();
                flush(&mut pending_comment, &mut info.comment_blocks);
                if expr.starts_with("struct") && !expr.contains('}') {
                    cur_struct = Some(PendingStruct {
                        key: name.clone(),
                        name,
                        doc,
                        fields: Vec::new(),
                    });
                } else if let Some(shape) = shape_from_type_expr(expr) {
                    info.types.push(GoTypeDecl {
                        key: name.clone(),
                        name,
                        shape,
                        doc,
                    });
                }
            }
            continue;
        }

        if let Some(caps) = PACKAGE_RE.captures(trimmed) {
            info.package = caps[1].to_string();
            flush(&mut pending_comment, &mut info.comment_blocks);
            continue;
        }

        if trimmed.starts_with("import (") || trimmed == "import(" {
            in_import = true;
            flush(&mut pending_comment, &mut info.comment_blocks);
            continue;
        }
        if trimmed.starts_with("import ") {
            flush(&mut pending_comment, &mut info.comment_blocks);
            continue;
        }

        if trimmed == "type (" {
            in_type_group = true;
            flush(&mut pending_comment, &mut info.comment_blocks);
            continue;
        }

        if let Some(caps) = TYPE_DECL_RE.captures(trimmed) {
            let name = caps[1].to_string();
            let expr = caps[2].trim();
            let doc = pending_comment.clone();
            flush(&mut pending_comment, &mut info.comment_blocks);
            if expr.starts_with("struct") {
                if expr.contains('}') {
                    info.types.push(GoTypeDecl {
                        key: name.clone(),
                        name,
                        shape: TypeShape::Struct(Vec::new()),
                        doc,
                    });
                } else {
                    cur_struct = Some(PendingStruct {
                        key: name.clone(),
                        name,
                        doc,
                        fields: Vec::new(),
                    });
                }
            } else if expr.starts_with("interface") {
                info.types.push(GoTypeDecl {
                    key: name.clone(),
                    name,
                    shape: TypeShape::Interface,
                    doc,
                });
                let depth = brace_delta(trimmed);
                if depth > 0 {
                    iface_depth = depth;
                }
            } else if let Some(shape) = shape_from_type_expr(expr) {
                info.types.push(GoTypeDecl {
                    key: name.clone(),
                    name,
                    shape,
                    doc,
                });
            } else {
                debug!("skipping unsupported type declaration: {}", trimmed);
            }
            continue;
        }

        if let Some(caps) = FUNC_DECL_RE.captures(trimmed) {
            if !pending_comment.is_empty() {
                info.comment_blocks.push(pending_comment.clone());
                info.func_docs.push(std::mem::take(&mut pending_comment));
            }
            let name = caps[2].to_string();
            let prefix = match caps.get(1) {
                Some(recv) => format!("{}@{}", recv.as_str(), name),
                None => name,
            };
            let depth = brace_delta(trimmed);
            if depth > 0 {
                func_ctx = Some((prefix, depth));
            }
            continue;
        }

        flush(&mut pending_comment, &mut info.comment_blocks);
    }

    // trailing comment block with no following declaration
    if !pending_comment.is_empty() {
        info.comment_blocks.push(pending_comment);
    }

    // a struct left open at EOF still counts
    if let Some(st) = cur_struct {
        info.types.push(GoTypeDecl {
            key: st.key,
            name: st.name,
            shape: TypeShape::Struct(st.fields),
            doc: st.doc,
        });
    }

    info
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_normalize_go_type() {
        assert_eq!(normalize_go_type("*User"), "User");
        assert_eq!(normalize_go_type("[]User"), "[]User");
        assert_eq!(normalize_go_type("[5]User"), "[]User");
        assert_eq!(normalize_go_type("map[string]User"), "map[]User");
        assert_eq!(normalize_go_type("[]*pkg.User"), "[]pkg.User");
        assert_eq!(normalize_go_type("interface{}"), "interface{}");
    }

    #[test]
    fn test_struct_tag_reader() {
        let tag = StructTag::new(r#"json:"kind" oneOf:"test.Citrus,test.Banana" discriminator:"kind""#);
        assert_eq!(tag.get("json"), Some("kind".to_string()));
        assert_eq!(tag.get("oneOf"), Some("test.Citrus,test.Banana".to_string()));
        assert_eq!(tag.get("discriminator"), Some("kind".to_string()));
        assert_eq!(tag.get("missing"), None);

        let escaped = StructTag::new(r#"example:"{\"orange\":{\"kind\":\"citrus\"}}""#);
        assert_eq!(
            escaped.get("example"),
            Some(r#"{"orange":{"kind":"citrus"}}"#.to_string())
        );
    }

    #[test]
    fn test_struct_tag_has() {
        let tag = StructTag::new(r#"json:"name" required:"true""#);
        assert!(tag.has("required"));
        assert!(!tag.has("description"));
    }

    #[test]
    fn test_extract_imports_block_and_aliases() {
        let src = r#"
package main

import (
	"fmt"
	alias "github.com/acme/storage"
	_ "github.com/acme/driver"
	"github.com/acme/models"
)
"#;
        let imports = extract_imports(src);
        assert_eq!(imports.len(), 4);
        assert_eq!(imports[0], GoImport { alias: "fmt".into(), path: "fmt".into() });
        assert_eq!(
            imports[1],
            GoImport { alias: "alias".into(), path: "github.com/acme/storage".into() }
        );
        // blank imports fall back to the last path segment
        assert_eq!(imports[2].alias, "driver");
        assert_eq!(imports[3].alias, "models");
    }

    #[test]
    fn test_extract_single_import() {
        let imports = extract_imports("package x\n\nimport m \"github.com/acme/models\"\n");
        assert_eq!(
            imports,
            vec![GoImport { alias: "m".into(), path: "github.com/acme/models".into() }]
        );
    }

    #[test]
    fn test_scan_struct_with_fields_and_tags() {
        let src = r#"
package models

// User an account holder
// @Title User account
type User struct {
	ID        int64    `json:"id"`
	Name      string   `json:"name" required:"true"`
	Addresses []string `json:"addresses"`
	Meta      map[string]string `json:"meta"`
}
"#;
        let info = scan_file(src);
        assert_eq!(info.package, "models");
        assert_eq!(info.types.len(), 1);
        let decl = &info.types[0];
        assert_eq!(decl.name, "User");
        assert_eq!(decl.doc.len(), 2);
        let TypeShape::Struct(fields) = &decl.shape else {
            panic!("expected struct shape");
        };
        assert_eq!(fields.len(), 4);
        assert_eq!(fields[0].names, vec!["ID"]);
        assert_eq!(fields[0].type_name, "int64");
        assert_eq!(fields[2].type_name, "[]string");
        assert_eq!(fields[3].type_name, "map[]string");
        assert_eq!(fields[1].tag.as_deref(), Some(r#"json:"name" required:"true""#));
    }

    #[test]
    fn test_scan_embedded_and_pointer_fields() {
        let src = r#"
package models

type Account struct {
	Base
	*Audit
	Owner *User `json:"owner"`
}
"#;
        let info = scan_file(src);
        let TypeShape::Struct(fields) = &info.types[0].shape else {
            panic!("expected struct shape");
        };
        assert!(fields[0].names.is_empty());
        assert_eq!(fields[0].type_name, "Base");
        assert!(fields[1].names.is_empty());
        assert_eq!(fields[1].type_name, "Audit");
        assert_eq!(fields[2].names, vec!["Owner"]);
        assert_eq!(fields[2].type_name, "User");
    }

    #[test]
    fn test_scan_array_map_alias_decls() {
        let src = r#"
package models

type Names []string
type Ratings map[string]float64
type Identifier int64
"#;
        let info = scan_file(src);
        assert_eq!(info.types[0].shape, TypeShape::Array("string".into()));
        assert_eq!(info.types[1].shape, TypeShape::Map("float64".into()));
        assert_eq!(info.types[2].shape, TypeShape::Alias("int64".into()));
    }

    #[test]
    fn test_scan_function_local_types() {
        let src = r#"
package handlers

// GetUser returns one user
// @Route /users/{id} [get]
func GetUser(w http.ResponseWriter, r *http.Request) {
	type payload struct {
		ID int64 `json:"id"`
	}
	_ = payload{}
}

func (s *Server) List(w http.ResponseWriter) {
	type row struct {
		Name string `json:"name"`
	}
	_ = row{}
}
"#;
        let info = scan_file(src);
        let keys: Vec<&str> = info.types.iter().map(|t| t.key.as_str()).collect();
        assert_eq!(keys, vec!["GetUser@payload", "Server@List@row"]);
        assert_eq!(info.func_docs.len(), 1);
        assert_eq!(info.func_docs[0][1], "// @Route /users/{id} [get]");
    }

    #[test]
    fn test_scan_comment_blocks() {
        let src = r#"
// @Title Sample API
// @Version 1.0.0

package main

// @Route / [get]
func index() {}
"#;
        let info = scan_file(src);
        assert_eq!(info.comment_blocks.len(), 2);
        assert_eq!(info.comment_blocks[0][0], "// @Title Sample API");
        assert_eq!(info.func_docs.len(), 1);
    }

    #[test]
    fn test_scan_type_group() {
        let src = "package m\n\ntype (\n\tA []string\n\tB map[string]int\n)\n";
        let info = scan_file(src);
        assert_eq!(info.types.len(), 2);
        assert_eq!(info.types[0].shape, TypeShape::Array("string".into()));
        assert_eq!(info.types[1].shape, TypeShape::Map("int".into()));
    }

    #[test]
    fn test_module_name_and_requires() {
        let go_mod = r#"
module github.com/acme/petstore

go 1.21

require (
	github.com/google/uuid v1.3.0
	github.com/Masterminds/semver v3.2.1
)

require github.com/pkg/errors v0.9.1
"#;
        assert_eq!(module_name(go_mod), Some("github.com/acme/petstore".into()));
        let requires = module_requires(go_mod);
        assert_eq!(
            requires,
            vec![
                ("github.com/google/uuid".to_string(), "v1.3.0".to_string()),
                ("github.com/Masterminds/semver".to_string(), "v3.2.1".to_string()),
                ("github.com/pkg/errors".to_string(), "v0.9.1".to_string()),
            ]
        );
    }

    #[test]
    fn test_escape_module_path() {
        assert_eq!(
            escape_module_path("github.com/Masterminds/semver"),
            "github.com/!masterminds/semver"
        );
        assert_eq!(escape_module_path("github.com/pkg/errors"), "github.com/pkg/errors");
    }

    #[test]
    fn test_is_main_file() {
        assert!(is_main_file("package main\n\nfunc main() {}\n"));
        assert!(!is_main_file("package models\n\nfunc helper() {}\n"));
    }
}
