// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 deda contributors

//! Minimal Python syntax tree for DAG files
//!
//! Only the constructs an Airflow DAG module needs. Rendering is
//! deterministic: keyword arguments keep their insertion order, string
//! literals are always double-quoted and fully escaped.

use std::fmt::Write;

const INDENT: &str = "    ";

/// A Python expression
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Str(String),
    Int(i64),
    Bool(bool),
    None,
    /// A bare identifier
    Name(String),
    /// `value.attr`
    Attr(Box<Expr>, String),
    Call {
        func: Box<Expr>,
        args: Vec<Expr>,
        kwargs: Vec<(String, Expr)>,
    },
    List(Vec<Expr>),
    Dict(Vec<(Expr, Expr)>),
}

impl Expr {
    pub fn str(value: impl Into<String>) -> Self {
        Self::Str(value.into())
    }

    pub fn name(ident: impl Into<String>) -> Self {
        Self::Name(ident.into())
    }

    /// `func(args...)` with no keyword arguments
    pub fn call(func: Expr, args: Vec<Expr>) -> Self {
        Self::Call {
            func: Box::new(func),
            args,
            kwargs: Vec::new(),
        }
    }

    /// `func(key=value, ...)`
    pub fn call_kw(func: Expr, kwargs: Vec<(&str, Expr)>) -> Self {
        Self::Call {
            func: Box::new(func),
            args: Vec::new(),
            kwargs: kwargs.into_iter().map(|(k, v)| (k.to_string(), v)).collect(),
        }
    }

    /// `self.attr`
    pub fn attr(self, attr: impl Into<String>) -> Self {
        Self::Attr(Box::new(self), attr.into())
    }

    /// Whether this expression spans several lines when rendered
    fn is_multiline(&self) -> bool {
        match self {
            Self::Call { args, kwargs, .. } => {
                !kwargs.is_empty() || args.iter().any(Expr::is_multiline)
            }
            Self::List(items) => items.iter().any(Expr::is_multiline),
            Self::Dict(entries) => !entries.is_empty(),
            _ => false,
        }
    }

    fn render(&self, out: &mut String, depth: usize) {
        match self {
            Self::Str(s) => out.push_str(&quote(s)),
            Self::Int(i) => {
                let _ = write!(out, "{}", i);
            }
            Self::Bool(true) => out.push_str("True"),
            Self::Bool(false) => out.push_str("False"),
            Self::None => out.push_str("None"),
            Self::Name(ident) => out.push_str(ident),
            Self::Attr(value, attr) => {
                value.render(out, depth);
                out.push('.');
                out.push_str(attr);
            }
            Self::Call { func, args, kwargs } => {
                func.render(out, depth);
                out.push('(');
                if self.is_multiline() {
                    out.push('\n');
                    for arg in args {
                        push_indent(out, depth + 1);
                        arg.render(out, depth + 1);
                        out.push_str(",\n");
                    }
                    for (key, value) in kwargs {
                        push_indent(out, depth + 1);
                        out.push_str(key);
                        out.push('=');
                        value.render(out, depth + 1);
                        out.push_str(",\n");
                    }
                    push_indent(out, depth);
                } else {
                    for (i, arg) in args.iter().enumerate() {
                        if i > 0 {
                            out.push_str(", ");
                        }
                        arg.render(out, depth);
                    }
                }
                out.push(')');
            }
            Self::List(items) => {
                out.push('[');
                if self.is_multiline() {
                    out.push('\n');
                    for item in items {
                        push_indent(out, depth + 1);
                        item.render(out, depth + 1);
                        out.push_str(",\n");
                    }
                    push_indent(out, depth);
                } else {
                    for (i, item) in items.iter().enumerate() {
                        if i > 0 {
                            out.push_str(", ");
                        }
                        item.render(out, depth);
                    }
                }
                out.push(']');
            }
            Self::Dict(entries) => {
                out.push('{');
                if !entries.is_empty() {
                    out.push('\n');
                    for (key, value) in entries {
                        push_indent(out, depth + 1);
                        key.render(out, depth + 1);
                        out.push_str(": ");
                        value.render(out, depth + 1);
                        out.push_str(",\n");
                    }
                    push_indent(out, depth);
                }
                out.push('}');
            }
        }
    }
}

/// A top-level Python statement
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// `# text`; control characters are flattened to spaces
    Comment(String),
    Blank,
    /// `from module import a, b`
    FromImport { module: String, names: Vec<String> },
    /// `target = value`
    Assign { target: String, value: Expr },
    Expr(Expr),
}

/// A Python module: an ordered list of statements
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Module {
    body: Vec<Stmt>,
}

impl Module {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, stmt: Stmt) {
        self.body.push(stmt);
    }

    pub fn comment(&mut self, text: impl Into<String>) {
        self.push(Stmt::Comment(text.into()));
    }

    pub fn blank(&mut self) {
        self.push(Stmt::Blank);
    }

    pub fn from_import(&mut self, module: &str, names: &[&str]) {
        self.push(Stmt::FromImport {
            module: module.to_string(),
            names: names.iter().map(|n| n.to_string()).collect(),
        });
    }

    pub fn assign(&mut self, target: impl Into<String>, value: Expr) {
        self.push(Stmt::Assign {
            target: target.into(),
            value,
        });
    }

    pub fn expr(&mut self, value: Expr) {
        self.push(Stmt::Expr(value));
    }

    /// Render the module as source text, one trailing newline
    pub fn render(&self) -> String {
        let mut out = String::new();

        for stmt in &self.body {
            match stmt {
                Stmt::Comment(text) => {
                    let flat: String = text
                        .chars()
                        .map(|c| if c.is_control() { ' ' } else { c })
                        .collect();
                    out.push_str("# ");
                    out.push_str(&flat);
                }
                Stmt::Blank => {}
                Stmt::FromImport { module, names } => {
                    let _ = write!(out, "from {} import {}", module, names.join(", "));
                }
                Stmt::Assign { target, value } => {
                    debug_assert!(is_identifier(target), "invalid assignment target {target:?}");
                    out.push_str(target);
                    out.push_str(" = ");
                    value.render(&mut out, 0);
                }
                Stmt::Expr(value) => value.render(&mut out, 0),
            }
            out.push('\n');
        }

        out
    }
}

fn push_indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str(INDENT);
    }
}

/// Quote a string as a double-quoted Python literal
pub fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() && (c as u32) <= 0xff => {
                let _ = write!(out, "\\x{:02x}", c as u32);
            }
            c if c.is_control() => {
                let _ = write!(out, "\\u{:04x}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// ASCII Python identifier check (`[A-Za-z_][A-Za-z0-9_]*`)
pub fn is_identifier(ident: &str) -> bool {
    let mut chars = ident.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_escapes() {
        assert_eq!(quote("plain"), r#""plain""#);
        assert_eq!(quote(r#"say "hi""#), r#""say \"hi\"""#);
        assert_eq!(quote(r"C:\tools"), r#""C:\\tools""#);
        assert_eq!(quote("a\nb\tc"), r#""a\nb\tc""#);
        assert_eq!(quote("nul\0bell\x07"), r#""nul\x00bell\x07""#);
        assert_eq!(quote("\u{85}"), r#""\x85""#);
        assert_eq!(quote("µm ✓"), "\"µm ✓\"");
    }

    #[test]
    fn test_quote_never_leaves_raw_quote_or_newline() {
        let nasty = "\"\"\"); import os; os.system(\"rm -rf /\")\n#";
        let quoted = quote(nasty);
        let inner = &quoted[1..quoted.len() - 1];

        assert!(!inner.contains('\n'));
        let mut escaped = false;
        for c in inner.chars() {
            if c == '"' {
                assert!(escaped, "unescaped quote in {}", quoted);
            }
            escaped = c == '\\' && !escaped;
        }
    }

    #[test]
    fn test_inline_and_multiline_calls() {
        let mut module = Module::new();
        module.assign(
            "start",
            Expr::call(Expr::name("datetime"), vec![Expr::Int(2024), Expr::Int(1), Expr::Int(1)]),
        );
        module.assign(
            "op",
            Expr::call_kw(
                Expr::name("Op"),
                vec![
                    ("flag", Expr::Bool(false)),
                    ("tags", Expr::List(vec![Expr::str("a"), Expr::str("b")])),
                    ("empty", Expr::Dict(vec![])),
                    ("opts", Expr::Dict(vec![(Expr::str("k"), Expr::None)])),
                ],
            ),
        );
        module.expr(Expr::call(Expr::name("op").attr("run"), vec![]));

        assert_eq!(
            module.render(),
            "start = datetime(2024, 1, 1)\n\
             op = Op(\n    flag=False,\n    tags=[\"a\", \"b\"],\n    empty={},\n    opts={\n        \"k\": None,\n    },\n)\n\
             op.run()\n"
        );
    }

    #[test]
    fn test_nested_multiline_list() {
        let expr = Expr::List(vec![Expr::call_kw(Expr::name("M"), vec![("x", Expr::Int(1))])]);
        let mut module = Module::new();
        module.assign("v", expr);

        assert_eq!(module.render(), "v = [\n    M(\n        x=1,\n    ),\n]\n");
    }

    #[test]
    fn test_comment_flattens_newlines() {
        let mut module = Module::new();
        module.comment("line one\nimport os");
        module.blank();

        assert_eq!(module.render(), "# line one import os\n\n");
    }

    #[test]
    fn test_is_identifier() {
        assert!(is_identifier("task_a_b"));
        assert!(is_identifier("_x9"));
        assert!(!is_identifier("9x"));
        assert!(!is_identifier("a-b"));
        assert!(!is_identifier(""));
    }
}
