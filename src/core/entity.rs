//! Entity names as they appear in dependency graph files.
//!
//! An entity identifies a class member through a qualified-name string of
//! the form `<package>_<Class>.java/[CN]/<ClassName>/.../<member>(<params>)`.
//! All analysis components compare entities through their canonical query
//! string, which this module derives.

use once_cell::sync::Lazy;
use regex::Regex;

static FILE_NAME_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"_([^.]+)\.java/\[CN\]/").unwrap());

static PATH_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"([^.]+)\.java/\[CN\]/").unwrap());

static CLASS_NAME_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r".+\.java/\[CN\]/([^\[]+)/").unwrap());

/// A borrowed view over a raw qualified-name string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Entity<'a>(&'a str);

impl<'a> Entity<'a> {
    pub fn new(raw: &'a str) -> Self {
        Entity(raw)
    }

    pub fn raw(&self) -> &'a str {
        self.0
    }

    /// Canonical form used as a lookup key everywhere.
    ///
    /// Strips the `/body` and `/parameters` suffix markers, cuts the package
    /// prefix at the last underscore before the file marker, collapses nested
    /// class-name segments to the first and last, removes generics, and
    /// reduces each parameter type to its last dotted segment.
    ///
    /// Returns the empty string when the file marker is absent; callers must
    /// treat that as "no information", not as a valid name.
    pub fn query_string(&self) -> String {
        let mut q = self
            .0
            .trim()
            .replace("/body", "")
            .replace("/parameters", "");
        let marker = match q.find(".java/") {
            Some(idx) => idx,
            None => return String::new(),
        };
        let start = q[..marker].rfind('_').unwrap_or(0);
        q = q[start..].to_string();
        let segments: Vec<&str> = q.split("/[CN]/").collect();
        if segments.len() > 2 {
            q = format!("{}/[CN]/{}", segments[0], segments[segments.len() - 1]);
        }
        q = remove_generics(&q);
        if let Some(open) = q.find('(') {
            let inner = q.get(open + 1..q.len().saturating_sub(1)).unwrap_or("");
            let simplified = inner
                .split(',')
                .map(|t| last_segment(t, '.'))
                .collect::<Vec<_>>()
                .join(",");
            q = format!("{}({})", &q[..open], simplified);
        }
        q
    }

    /// The file (class) token, or the empty string when unavailable.
    pub fn filename(&self) -> String {
        query_string_filename(&self.query_string())
    }

    /// The package path token taken from the raw string.
    pub fn path(&self) -> String {
        match PATH_RE.captures(self.0) {
            Some(caps) => caps[1].to_string(),
            None => String::new(),
        }
    }

    /// The class name segment of the canonical form.
    pub fn classname(&self) -> String {
        match CLASS_NAME_RE.captures(&self.query_string()) {
            Some(caps) => caps[1].to_string(),
            None => String::new(),
        }
    }

    /// The bare member name, without the parameter list.
    pub fn name(&self) -> String {
        let qs = self.query_string();
        let tail = match qs.rfind('/') {
            Some(idx) => &qs[idx + 1..],
            None => qs.as_str(),
        };
        match tail.find('(') {
            Some(open) => tail[..open].to_string(),
            None => tail.to_string(),
        }
    }

    /// The simplified parameter types, or `None` when the entity is a field.
    pub fn parameters(&self) -> Option<Vec<String>> {
        let qs = self.query_string();
        let open = qs.find('(')?;
        let inner = qs.get(open + 1..qs.len().saturating_sub(1)).unwrap_or("");
        if inner.is_empty() {
            return Some(Vec::new());
        }
        Some(inner.split(',').map(str::to_string).collect())
    }
}

/// Extracts the file token from an already canonical query string.
pub fn query_string_filename(qs: &str) -> String {
    match FILE_NAME_RE.captures(qs) {
        Some(caps) => caps[1].to_string(),
        None => String::new(),
    }
}

/// Removes generic-type parameter lists, keeping nesting balanced.
pub fn remove_generics(s: &str) -> String {
    let mut depth = 0usize;
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '<' => depth += 1,
            '>' if depth > 0 => depth -= 1,
            _ if depth == 0 => out.push(c),
            _ => {}
        }
    }
    out
}

/// Converts a Java-style qualified member name, `pkg.Class.member(args)`,
/// into the entity form used by dependency files. Returns the empty string
/// when the name has no class segment.
pub fn java_to_hr(s: &str) -> String {
    let s = s.trim();
    let (head, params) = match s.find('(') {
        Some(open) => {
            let close = s.rfind(')').unwrap_or(s.len());
            (&s[..open], Some(&s[open + 1..close]))
        }
        None => (s, None),
    };
    let head = remove_generics(head);
    let segments: Vec<&str> = head.split('.').collect();
    if segments.len() < 2 {
        return String::new();
    }
    let member = segments[segments.len() - 1];
    let class = segments[segments.len() - 2];
    let package = segments[..segments.len() - 2].join(".");
    match params {
        Some(p) => {
            let list = if p.trim().is_empty() {
                String::new()
            } else {
                p.split(',').map(str::trim).collect::<Vec<_>>().join(",")
            };
            format!("{package}_{class}.java/[CN]/{class}/[MT]/{member}({list})")
        }
        None => format!("{package}_{class}.java/[CN]/{class}/[FE]/{member}"),
    }
}

fn last_segment(s: &str, sep: char) -> String {
    s.trim()
        .rsplit(sep)
        .next()
        .unwrap_or_default()
        .to_string()
}
