//! Run configuration.
//!
//! Everything a run needs is collected once, at the entry point, into an
//! immutable [`RunConfig`] and passed by reference to discovery, planning and
//! the driver. There is no ambient or global state.
//!
//! Converter properties ([`ConverterConfig`]) are opaque here: they are
//! forwarded verbatim to the external converter. The CLI reads them from a
//! TOML settings file ([`load_settings`]) plus `-c key=value` overrides, and
//! [`render_properties`] hands them to converter programs.

use crate::error::Spec2MarkupError;
use crate::progress::ProgressCallback;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// String key/value settings forwarded verbatim to the converter.
///
/// Ordered so debug output and generated properties files are stable.
pub type ConverterConfig = BTreeMap<String, String>;

/// Configuration for one run.
///
/// # Example
/// ```rust
/// use spec2markup::RunConfig;
///
/// let config = RunConfig::builder("src/docs/swagger")
///     .output_dir("target/asciidoc")
///     .property("swagger2markup.markupLanguage", "ASCIIDOC")
///     .build()
///     .unwrap();
/// assert!(!config.skip);
/// ```
#[derive(Clone)]
pub struct RunConfig {
    /// Local file, local directory, or HTTP(S) URL.
    pub input: String,

    /// Write every document into this file (or, with `output_dir`, a file of
    /// this name inside each mirrored directory).
    pub output_file: Option<PathBuf>,

    /// Root of the per-document output directories.
    pub output_dir: Option<PathBuf>,

    /// Return immediately without touching the filesystem. Default: false.
    pub skip: bool,

    /// Converter settings, forwarded untouched.
    pub properties: ConverterConfig,

    /// Optional per-job progress events.
    pub progress_callback: Option<ProgressCallback>,
}

impl fmt::Debug for RunConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunConfig")
            .field("input", &self.input)
            .field("output_file", &self.output_file)
            .field("output_dir", &self.output_dir)
            .field("skip", &self.skip)
            .field("properties", &self.properties)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn RunProgressCallback>"),
            )
            .finish()
    }
}

impl RunConfig {
    /// Create a new builder for the given input specification.
    pub fn builder(input: impl Into<String>) -> RunConfigBuilder {
        RunConfigBuilder {
            config: RunConfig {
                input: input.into(),
                output_file: None,
                output_dir: None,
                skip: false,
                properties: ConverterConfig::new(),
                progress_callback: None,
            },
        }
    }
}

/// Builder for [`RunConfig`].
#[derive(Debug)]
pub struct RunConfigBuilder {
    config: RunConfig,
}

impl RunConfigBuilder {
    pub fn output_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.output_file = Some(path.into());
        self
    }

    pub fn output_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.output_dir = Some(path.into());
        self
    }

    pub fn skip(mut self, skip: bool) -> Self {
        self.config.skip = skip;
        self
    }

    pub fn property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.properties.insert(key.into(), value.into());
        self
    }

    /// Merge `properties` over the ones already set.
    pub fn properties(mut self, properties: ConverterConfig) -> Self {
        self.config.properties.extend(properties);
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    ///
    /// A skipped run accepts any settings. Output settings are never checked
    /// here; the driver validates them once it knows it will run.
    pub fn build(self) -> Result<RunConfig, Spec2MarkupError> {
        let c = &self.config;
        if c.skip {
            return Ok(self.config);
        }
        if c.input.trim().is_empty() {
            return Err(Spec2MarkupError::InvalidConfig(
                "input must not be empty".into(),
            ));
        }
        if let Some(key) = c.properties.keys().find(|k| k.trim().is_empty()) {
            return Err(Spec2MarkupError::InvalidConfig(format!(
                "empty property key (value '{}')",
                c.properties[key]
            )));
        }
        Ok(self.config)
    }
}

// ── Settings files ───────────────────────────────────────────────────────

/// Parse a TOML settings file into converter properties.
///
/// Nested tables flatten into dotted keys, so `[swagger2markup]` followed by
/// `markupLanguage = "ASCIIDOC"` is the same entry as
/// `"swagger2markup.markupLanguage" = "ASCIIDOC"`. Strings are kept as-is;
/// integers, floats, booleans and datetimes use their TOML spelling. Arrays
/// have no string form and are rejected.
pub fn parse_settings(text: &str) -> Result<ConverterConfig, Spec2MarkupError> {
    let table: toml::Table = toml::from_str(text)
        .map_err(|e| Spec2MarkupError::InvalidConfig(format!("invalid TOML: {}", e)))?;

    let mut properties = ConverterConfig::new();
    flatten_table("", &table, &mut properties)?;
    Ok(properties)
}

fn flatten_table(
    prefix: &str,
    table: &toml::Table,
    out: &mut ConverterConfig,
) -> Result<(), Spec2MarkupError> {
    for (name, value) in table {
        let key = if prefix.is_empty() {
            name.clone()
        } else {
            format!("{prefix}.{name}")
        };
        let rendered = match value {
            toml::Value::String(s) => s.clone(),
            toml::Value::Integer(i) => i.to_string(),
            toml::Value::Float(f) => f.to_string(),
            toml::Value::Boolean(b) => b.to_string(),
            toml::Value::Datetime(d) => d.to_string(),
            toml::Value::Table(nested) => {
                flatten_table(&key, nested, out)?;
                continue;
            }
            toml::Value::Array(_) => {
                return Err(Spec2MarkupError::InvalidConfig(format!(
                    "'{key}': arrays are not supported, use a string"
                )))
            }
        };
        out.insert(key, rendered);
    }
    Ok(())
}

/// Read and parse a TOML settings file.
pub fn load_settings(path: &Path) -> Result<ConverterConfig, Spec2MarkupError> {
    let text = std::fs::read_to_string(path).map_err(|e| {
        Spec2MarkupError::InvalidConfig(format!(
            "cannot read settings file '{}': {}",
            path.display(),
            e
        ))
    })?;
    parse_settings(&text).map_err(|e| match e {
        Spec2MarkupError::InvalidConfig(reason) => {
            Spec2MarkupError::InvalidConfig(format!("{}: {}", path.display(), reason))
        }
        other => other,
    })
}

/// Split a `key=value` override at the first `=`. Values may contain `=`.
pub fn split_property(pair: &str) -> Option<(&str, &str)> {
    let (key, value) = pair.split_once('=')?;
    let key = key.trim();
    if key.is_empty() {
        return None;
    }
    Some((key, value.trim()))
}

// ── Converter properties ─────────────────────────────────────────────────

/// Render properties in `java.util.Properties` text form.
///
/// Keys and values are escaped the way `Properties.store` does it, so the
/// converter reads back exactly the strings it was given: backslash,
/// separators, comment markers, line breaks, leading blanks and anything
/// outside printable ASCII (as `\uXXXX`).
pub fn render_properties(properties: &ConverterConfig) -> String {
    let mut out = String::new();
    for (key, value) in properties {
        escape_into(&mut out, key, true);
        out.push('=');
        escape_into(&mut out, value, false);
        out.push('\n');
    }
    out
}

fn escape_into(out: &mut String, text: &str, is_key: bool) {
    for (idx, ch) in text.chars().enumerate() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\x0c' => out.push_str("\\f"),
            '=' | ':' | '#' | '!' => {
                out.push('\\');
                out.push(ch);
            }
            // Keys end at a blank; values only lose leading ones.
            ' ' if is_key || idx == 0 => out.push_str("\\ "),
            ' '..='~' => out.push(ch),
            _ => {
                for unit in ch.encode_utf16(&mut [0; 2]) {
                    out.push_str(&format!("\\u{:04X}", unit));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_defaults() {
        let c = RunConfig::builder("specs").build().unwrap();
        assert_eq!(c.input, "specs");
        assert!(c.output_file.is_none());
        assert!(c.output_dir.is_none());
        assert!(!c.skip);
        assert!(c.properties.is_empty());
    }

    #[test]
    fn builder_rejects_empty_input() {
        assert!(matches!(
            RunConfig::builder("  ").build(),
            Err(Spec2MarkupError::InvalidConfig(_))
        ));
    }

    #[test]
    fn skipped_builder_accepts_anything() {
        let c = RunConfig::builder("").skip(true).build().unwrap();
        assert!(c.skip);
    }

    #[test]
    fn builder_merges_properties() {
        let mut extra = ConverterConfig::new();
        extra.insert("b".into(), "2".into());
        extra.insert("a".into(), "override".into());
        let c = RunConfig::builder("a.yaml")
            .property("a", "1")
            .properties(extra)
            .build()
            .unwrap();
        assert_eq!(c.properties["a"], "override");
        assert_eq!(c.properties["b"], "2");
    }

    #[test]
    fn settings_flatten_nested_tables() {
        let text = r#"
"swagger2markup.markupLanguage" = "MARKDOWN"

[swagger2markup]
pathsGroupedBy = "TAGS"
interDocumentCrossReferencesPrefix = ""
generatedExamplesEnabled = true
pageBreakLocations = 3

[swagger2markup.extensions.dynamicOverview]
contentPath = 'C:\docs\overview'
"#;
        let props = parse_settings(text).unwrap();
        assert_eq!(props.len(), 6);
        assert_eq!(props["swagger2markup.markupLanguage"], "MARKDOWN");
        assert_eq!(props["swagger2markup.pathsGroupedBy"], "TAGS");
        assert_eq!(props["swagger2markup.interDocumentCrossReferencesPrefix"], "");
        assert_eq!(props["swagger2markup.generatedExamplesEnabled"], "true");
        assert_eq!(props["swagger2markup.pageBreakLocations"], "3");
        assert_eq!(
            props["swagger2markup.extensions.dynamicOverview.contentPath"],
            "C:\\docs\\overview"
        );
    }

    #[test]
    fn settings_reject_arrays() {
        let err = parse_settings("tags = [\"a\", \"b\"]\n").unwrap_err();
        assert!(err.to_string().contains("'tags'"), "got: {err}");
    }

    #[test]
    fn settings_report_toml_errors() {
        let err = parse_settings("a = 1\nbroken line\n").unwrap_err();
        assert!(matches!(err, Spec2MarkupError::InvalidConfig(_)));
        assert!(err.to_string().contains("TOML"), "got: {err}");
    }

    #[test]
    fn load_settings_missing_file() {
        let err = load_settings(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(err.to_string().contains("here.toml"));
    }

    #[test]
    fn load_settings_names_the_file_on_parse_errors() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("s2m.toml");
        std::fs::write(&path, "= nope").unwrap();
        let err = load_settings(&path).unwrap_err();
        assert!(err.to_string().contains("s2m.toml"), "got: {err}");
    }

    #[test]
    fn split_property_uses_first_equals() {
        assert_eq!(
            split_property("url=https://example.com/a=b"),
            Some(("url", "https://example.com/a=b"))
        );
        assert_eq!(split_property("host:port=1"), Some(("host:port", "1")));
        assert_eq!(split_property("k="), Some(("k", "")));
        assert_eq!(split_property("=v"), None);
        assert_eq!(split_property("no separator"), None);
    }

    /// Reads the `java.util.Properties` lines [`render_properties`] writes.
    fn read_back(text: &str) -> ConverterConfig {
        text.lines()
            .map(|line| {
                let (key, rest) = unescape(line, true);
                let (value, _) = unescape(rest, false);
                (key, value)
            })
            .collect()
    }

    /// Undo escapes; a key stops at the first unescaped `=`.
    fn unescape(s: &str, is_key: bool) -> (String, &str) {
        let mut units: Vec<u16> = Vec::new();
        let mut chars = s.char_indices();
        while let Some((idx, ch)) = chars.next() {
            match ch {
                '=' if is_key => return (String::from_utf16(&units).unwrap(), &s[idx + 1..]),
                '\\' => match chars.next().unwrap().1 {
                    'n' => units.push(0x0a),
                    'r' => units.push(0x0d),
                    't' => units.push(0x09),
                    'f' => units.push(0x0c),
                    'u' => {
                        let hex: String = (0..4).map(|_| chars.next().unwrap().1).collect();
                        units.push(u16::from_str_radix(&hex, 16).unwrap());
                    }
                    other => units.extend(other.encode_utf16(&mut [0; 2]).iter()),
                },
                other => units.extend(other.encode_utf16(&mut [0; 2]).iter()),
            }
        }
        (String::from_utf16(&units).unwrap(), "")
    }

    fn props(entries: &[(&str, &str)]) -> ConverterConfig {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn render_plain_entries() {
        let p = props(&[("k1", "v1"), ("k2", "")]);
        assert_eq!(render_properties(&p), "k1=v1\nk2=\n");
        assert_eq!(read_back(&render_properties(&p)), p);
    }

    #[test]
    fn render_escapes_separators_in_keys() {
        let p = props(&[("a:b", "c"), ("x=y", "z=1")]);
        let text = render_properties(&p);
        assert_eq!(text, "a\\:b=c\nx\\=y=z\\=1\n");
        assert_eq!(read_back(&text), p);
    }

    #[test]
    fn render_keeps_multiline_values_on_one_line() {
        let p = props(&[("multi", "l1\nl2\r\n\tl3")]);
        let text = render_properties(&p);
        assert_eq!(text.lines().count(), 1);
        assert_eq!(read_back(&text), p);
    }

    #[test]
    fn render_keeps_backslashes() {
        let p = props(&[("contentPath", "C:\\specs\\api.yaml")]);
        let text = render_properties(&p);
        assert_eq!(text, "contentPath=C\\:\\\\specs\\\\api.yaml\n");
        assert_eq!(read_back(&text), p);
    }

    #[test]
    fn render_escapes_blanks_and_comment_markers() {
        let p = props(&[("  padded key", "  padded value "), ("#not-a-comment", "!x")]);
        let text = render_properties(&p);
        assert!(text.contains("\\ \\ padded\\ key=\\  padded value \n"), "got: {text}");
        assert!(text.contains("\\#not-a-comment=\\!x\n"), "got: {text}");
        assert_eq!(read_back(&text), p);
    }

    #[test]
    fn render_escapes_non_ascii() {
        let p = props(&[("title", "Café 🚀")]);
        let text = render_properties(&p);
        assert_eq!(text, "title=Caf\\u00E9 \\uD83D\\uDE80\n");
        assert_eq!(read_back(&text), p);
    }
}
