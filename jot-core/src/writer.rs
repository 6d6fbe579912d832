//! Format-controlled serialization of the node tree.
//!
//! One recursive core renders a node; three sinks (buffered stream,
//! generic text sink, fixed-capacity buffer) receive identical UTF-8
//! fragments, so their output is byte for byte the same. Scalars render
//! through per-document printf-style templates; pretty-printing is
//! controlled by the pad string alone.

use std::fmt;
use std::io;

use crate::tree::{Node, NodeKind};

// ============================================================================
// Format templates
// ============================================================================

/// Error raised when a format template is rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatError {
    reason: &'static str,
    template: String,
}

impl FormatError {
    /// Why the template was rejected.
    pub fn reason(&self) -> &'static str {
        self.reason
    }

    /// The offending template text.
    pub fn template(&self) -> &str {
        &self.template
    }
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid format template {:?}: {}", self.template, self.reason)
    }
}

impl std::error::Error for FormatError {}

/// Which value class a template renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TemplateKind {
    Int,
    Float,
    Str,
}

/// The conversion character classes the writer understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConvKind {
    Dec,
    Hex,
    HexUpper,
    Fixed,
    Exp,
    ExpUpper,
    Str,
}

/// Flags, width and precision of one conversion.
#[derive(Debug, Clone, Copy)]
struct Conv {
    left: bool,
    plus: bool,
    zero: bool,
    width: usize,
    precision: Option<usize>,
    kind: ConvKind,
}

/// A validated printf-style template: literal prefix, one conversion,
/// literal suffix. `%%` escapes are unescaped into the literals.
#[derive(Debug, Clone)]
struct Template {
    text: String,
    prefix: String,
    suffix: String,
    conv: Conv,
}

impl Template {
    /// Parse and validate a template against the expected value class.
    fn parse(text: &str, kind: TemplateKind) -> Result<Self, FormatError> {
        let reject = |reason: &'static str| FormatError {
            reason,
            template: text.to_string(),
        };

        let bytes = text.as_bytes();
        let mut conv: Option<Conv> = None;
        let mut prefix = String::new();
        let mut lit = String::new();
        let mut run = 0;
        let mut i = 0;

        while i < bytes.len() {
            if bytes[i] != b'%' {
                i += 1;
                continue;
            }
            // '%' is ASCII, so slicing here stays on char boundaries
            lit.push_str(&text[run..i]);
            if bytes.get(i + 1) == Some(&b'%') {
                lit.push('%');
                i += 2;
                run = i;
                continue;
            }
            if conv.is_some() {
                return Err(reject("more than one conversion"));
            }

            i += 1;
            let mut c = Conv {
                left: false,
                plus: false,
                zero: false,
                width: 0,
                precision: None,
                kind: ConvKind::Dec,
            };
            while let Some(&flag) = bytes.get(i) {
                match flag {
                    b'-' => c.left = true,
                    b'+' => c.plus = true,
                    b'0' => c.zero = true,
                    _ => break,
                }
                i += 1;
            }
            while let Some(&(digit @ b'0'..=b'9')) = bytes.get(i) {
                c.width = c.width * 10 + (digit - b'0') as usize;
                i += 1;
            }
            if bytes.get(i) == Some(&b'.') {
                i += 1;
                let mut precision = 0;
                while let Some(&(digit @ b'0'..=b'9')) = bytes.get(i) {
                    precision = precision * 10 + (digit - b'0') as usize;
                    i += 1;
                }
                c.precision = Some(precision);
            }
            let Some(&spec) = bytes.get(i) else {
                return Err(reject("missing conversion character"));
            };
            c.kind = match (spec, kind) {
                (b'd' | b'i', TemplateKind::Int) => ConvKind::Dec,
                (b'x', TemplateKind::Int) => ConvKind::Hex,
                (b'X', TemplateKind::Int) => ConvKind::HexUpper,
                (b'f' | b'F', TemplateKind::Float) => ConvKind::Fixed,
                (b'e', TemplateKind::Float) => ConvKind::Exp,
                (b'E', TemplateKind::Float) => ConvKind::ExpUpper,
                (b's', TemplateKind::Str) => ConvKind::Str,
                _ => return Err(reject("conversion does not match the value type")),
            };
            i += 1;

            prefix = std::mem::take(&mut lit);
            conv = Some(c);
            run = i;
        }
        lit.push_str(&text[run..]);

        let Some(conv) = conv else {
            return Err(reject("missing conversion"));
        };
        Ok(Template {
            text: text.to_string(),
            prefix,
            suffix: lit,
            conv,
        })
    }

    /// Built-in default; never goes through validation.
    fn plain(text: &str, kind: ConvKind) -> Self {
        Template {
            text: text.to_string(),
            prefix: String::new(),
            suffix: String::new(),
            conv: Conv {
                left: false,
                plus: false,
                zero: false,
                width: 0,
                precision: None,
                kind,
            },
        }
    }

    fn render_int(&self, value: i32, out: &mut String) {
        out.push_str(&self.prefix);
        let core = match self.conv.kind {
            ConvKind::Hex => format!("{value:x}"),
            ConvKind::HexUpper => format!("{value:X}"),
            _ => {
                let mut s = value.to_string();
                if self.conv.plus && value >= 0 {
                    s.insert(0, '+');
                }
                s
            }
        };
        push_padded(out, &core, &self.conv, true);
        out.push_str(&self.suffix);
    }

    fn render_float(&self, value: f32, out: &mut String) {
        out.push_str(&self.prefix);
        let precision = self.conv.precision.unwrap_or(6);
        let mut core = match self.conv.kind {
            ConvKind::Exp => exp_notation(value, precision),
            ConvKind::ExpUpper => exp_notation(value, precision).to_uppercase(),
            _ => format!("{value:.precision$}"),
        };
        if self.conv.plus && !core.starts_with('-') {
            core.insert(0, '+');
        }
        push_padded(out, &core, &self.conv, true);
        out.push_str(&self.suffix);
    }

    fn render_str(&self, value: &str, out: &mut String) {
        out.push_str(&self.prefix);
        let truncated = match self.conv.precision {
            Some(precision) => truncate_chars(value, precision),
            None => value,
        };
        push_padded(out, truncated, &self.conv, false);
        out.push_str(&self.suffix);
    }
}

/// Apply width padding; zero padding only applies to right-aligned
/// numeric conversions and goes after the sign.
fn push_padded(out: &mut String, core: &str, conv: &Conv, numeric: bool) {
    let len = core.chars().count();
    if len >= conv.width {
        out.push_str(core);
        return;
    }
    let pad = conv.width - len;
    if conv.left {
        out.push_str(core);
        for _ in 0..pad {
            out.push(' ');
        }
    } else if conv.zero && numeric {
        let (sign, rest) = if let Some(rest) = core.strip_prefix('-') {
            ("-", rest)
        } else if let Some(rest) = core.strip_prefix('+') {
            ("+", rest)
        } else {
            ("", core)
        };
        out.push_str(sign);
        for _ in 0..pad {
            out.push('0');
        }
        out.push_str(rest);
    } else {
        for _ in 0..pad {
            out.push(' ');
        }
        out.push_str(core);
    }
}

/// printf `%e` form: mantissa with fixed precision, sign and at least
/// two exponent digits.
fn exp_notation(value: f32, precision: usize) -> String {
    let s = format!("{value:.precision$e}");
    match s.find('e') {
        Some(pos) => {
            let (mantissa, exp) = s.split_at(pos);
            let exp = &exp[1..];
            let (sign, digits) = match exp.strip_prefix('-') {
                Some(digits) => ('-', digits),
                None => ('+', exp),
            };
            format!("{mantissa}e{sign}{digits:0>2}")
        }
        None => s, // inf and NaN carry no exponent
    }
}

fn truncate_chars(value: &str, max: usize) -> &str {
    match value.char_indices().nth(max) {
        Some((index, _)) => &value[..index],
        None => value,
    }
}

/// Per-document scalar format templates.
///
/// Defaults mirror printf: `%d` integers, `%f` floats, `%s` strings (the
/// string template is additionally wrapped in quotes by the writer).
/// Setters validate the template once; a rejected template leaves the
/// previous one in place.
#[derive(Debug, Clone)]
pub struct WriterConfig {
    int_format: Template,
    float_format: Template,
    str_format: Template,
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            int_format: Template::plain("%d", ConvKind::Dec),
            float_format: Template::plain("%f", ConvKind::Fixed),
            str_format: Template::plain("%s", ConvKind::Str),
        }
    }
}

impl WriterConfig {
    /// Set the integer template (`%d`, `%i`, `%x`, `%X`).
    pub fn set_int_format(&mut self, template: &str) -> Result<(), FormatError> {
        self.int_format = Template::parse(template, TemplateKind::Int)?;
        Ok(())
    }

    /// Set the float template (`%f`, `%F`, `%e`, `%E`).
    pub fn set_float_format(&mut self, template: &str) -> Result<(), FormatError> {
        self.float_format = Template::parse(template, TemplateKind::Float)?;
        Ok(())
    }

    /// Set the string template (`%s`).
    pub fn set_str_format(&mut self, template: &str) -> Result<(), FormatError> {
        self.str_format = Template::parse(template, TemplateKind::Str)?;
        Ok(())
    }

    /// Current integer template text.
    pub fn int_format(&self) -> &str {
        &self.int_format.text
    }

    /// Current float template text.
    pub fn float_format(&self) -> &str {
        &self.float_format.text
    }

    /// Current string template text.
    pub fn str_format(&self) -> &str {
        &self.str_format.text
    }
}

// ============================================================================
// Sinks
// ============================================================================

/// Destination abstraction; fragments arrive whole or not at all, so a
/// full fixed buffer never holds half a fragment.
trait Out {
    fn put(&mut self, s: &str) -> Result<(), SinkError>;
}

enum SinkError {
    Io(io::Error),
    Fmt,
    Full,
}

struct IoOut<'w, W: io::Write> {
    inner: &'w mut W,
}

impl<W: io::Write> Out for IoOut<'_, W> {
    fn put(&mut self, s: &str) -> Result<(), SinkError> {
        self.inner.write_all(s.as_bytes()).map_err(SinkError::Io)
    }
}

struct FmtOut<'w, W: fmt::Write> {
    inner: &'w mut W,
}

impl<W: fmt::Write> Out for FmtOut<'_, W> {
    fn put(&mut self, s: &str) -> Result<(), SinkError> {
        self.inner.write_str(s).map_err(|_| SinkError::Fmt)
    }
}

/// Fixed-capacity in-memory text target.
///
/// Rendering into a full buffer fails with [`BufferFull`] and leaves the
/// already-written prefix intact.
pub struct FixedBuf<'a> {
    buf: &'a mut [u8],
    len: usize,
}

impl<'a> FixedBuf<'a> {
    /// Wrap a caller-provided buffer.
    pub fn new(buf: &'a mut [u8]) -> Self {
        Self { buf, len: 0 }
    }

    /// Bytes written so far.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if nothing has been written.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The written prefix of the buffer.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.len]
    }

    /// The written prefix as text.
    pub fn as_str(&self) -> &str {
        // fragments are written whole, so the prefix is valid UTF-8
        std::str::from_utf8(self.as_bytes()).unwrap_or_default()
    }
}

impl Out for FixedBuf<'_> {
    fn put(&mut self, s: &str) -> Result<(), SinkError> {
        let bytes = s.as_bytes();
        if self.len + bytes.len() > self.buf.len() {
            return Err(SinkError::Full);
        }
        self.buf[self.len..self.len + bytes.len()].copy_from_slice(bytes);
        self.len += bytes.len();
        Ok(())
    }
}

/// Error from writing into a [`FixedBuf`] that ran out of space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferFull;

impl fmt::Display for BufferFull {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("output buffer full")
    }
}

impl std::error::Error for BufferFull {}

// ============================================================================
// Render core
// ============================================================================

fn put<O: Out>(out: &mut O, s: &str) -> Result<usize, SinkError> {
    out.put(s)?;
    Ok(s.len())
}

/// Recursively render one node.
///
/// Pretty iff `pad` is non-empty: `level` copies of pad before the node,
/// a newline after every child, and matching indentation before the
/// closing bracket. Returns the number of bytes emitted.
fn write_node<O: Out>(
    out: &mut O,
    node: Node<'_>,
    pad: &str,
    level: usize,
) -> Result<usize, SinkError> {
    let pretty = !pad.is_empty();
    let mut written = 0;

    if pretty {
        for _ in 0..level {
            written += put(out, pad)?;
        }
    }

    if let Some(name) = node.name().filter(|name| !name.is_empty()) {
        written += put(out, "\"")?;
        written += put(out, name)?;
        written += put(out, "\"")?;
        written += put(out, if pretty { " : " } else { ":" })?;
    }

    let formats = node.doc().formats();
    match node.kind() {
        NodeKind::Null => written += put(out, "null")?,
        NodeKind::Bool(true) => written += put(out, "true")?,
        NodeKind::Bool(false) => written += put(out, "false")?,
        NodeKind::Int(value) => {
            let mut s = String::new();
            formats.int_format.render_int(*value, &mut s);
            written += put(out, &s)?;
        }
        NodeKind::Float(value) => {
            let mut s = String::new();
            formats.float_format.render_float(*value, &mut s);
            written += put(out, &s)?;
        }
        NodeKind::Str(value) => {
            let mut s = String::from("\"");
            formats.str_format.render_str(value, &mut s);
            s.push('"');
            written += put(out, &s)?;
        }
        NodeKind::Array | NodeKind::Object => {
            let array = matches!(node.kind(), NodeKind::Array);
            written += put(out, if array { "[" } else { "{" })?;
            if node.child_count() > 0 {
                if pretty {
                    written += put(out, "\n")?;
                }
                let count = node.child_count();
                for (index, child) in node.children().enumerate() {
                    written += write_node(out, child, pad, level + 1)?;
                    if index + 1 < count {
                        written += put(out, ",")?;
                    }
                    if pretty {
                        written += put(out, "\n")?;
                    }
                }
                if pretty {
                    for _ in 0..level {
                        written += put(out, pad)?;
                    }
                }
            }
            written += put(out, if array { "]" } else { "}" })?;
        }
    }

    Ok(written)
}

impl<'doc> Node<'doc> {
    /// Serialize into an IO stream (wrap it in a `BufWriter` for
    /// buffered output). Returns the number of bytes written.
    pub fn write_to<W: io::Write>(&self, writer: &mut W, pad: &str) -> io::Result<usize> {
        let mut out = IoOut { inner: writer };
        write_node(&mut out, *self, pad, 0).map_err(|err| match err {
            SinkError::Io(err) => err,
            _ => io::Error::new(io::ErrorKind::Other, "sink failure"),
        })
    }

    /// Serialize into any text sink. Returns the number of bytes written.
    pub fn write_str<W: fmt::Write>(&self, sink: &mut W, pad: &str) -> Result<usize, fmt::Error> {
        let mut out = FmtOut { inner: sink };
        write_node(&mut out, *self, pad, 0).map_err(|_| fmt::Error)
    }

    /// Serialize into a fixed-capacity buffer. Returns the number of
    /// bytes written.
    pub fn write_buf(&self, buf: &mut FixedBuf<'_>, pad: &str) -> Result<usize, BufferFull> {
        write_node(buf, *self, pad, 0).map_err(|_| BufferFull)
    }

    /// Serialize to a fresh string.
    pub fn to_json(&self, pad: &str) -> String {
        let mut out = String::new();
        // a String sink cannot fail
        let _ = self.write_str(&mut out, pad);
        out
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::Document;

    fn compact(input: &str) -> String {
        let mut doc = Document::new();
        doc.parse(input.as_bytes()).unwrap();
        doc.root().unwrap().to_json("")
    }

    #[test]
    fn test_compact_output() {
        assert_eq!(
            compact(r#"{ "a" : 1 , "b" : [ true , null ] }"#),
            r#"{"a":1,"b":[true,null]}"#
        );
    }

    #[test]
    fn test_empty_containers_have_no_inner_newline() {
        assert_eq!(compact(r#"{"a": {}, "b": []}"#), r#"{"a":{},"b":[]}"#);

        let mut doc = Document::new();
        doc.parse(br#"{"a": {}, "b": []}"#).unwrap();
        let pretty = doc.root().unwrap().to_json("  ");
        assert_eq!(pretty, "{\n  \"a\" : {},\n  \"b\" : []\n}");
    }

    #[test]
    fn test_empty_root_object() {
        assert_eq!(compact("{}"), "{}");
        let mut doc = Document::new();
        doc.parse(b"{}").unwrap();
        assert_eq!(doc.root().unwrap().to_json("  "), "{}");
    }

    #[test]
    fn test_pretty_output() {
        let mut doc = Document::new();
        doc.parse(br#"{"a":1,"b":[1,2]}"#).unwrap();
        let expected = "{\n  \"a\" : 1,\n  \"b\" : [\n    1,\n    2\n  ]\n}";
        assert_eq!(doc.root().unwrap().to_json("  "), expected);
    }

    #[test]
    fn test_pretty_pad_is_arbitrary() {
        let mut doc = Document::new();
        doc.parse(br#"{"a":1}"#).unwrap();
        assert_eq!(doc.root().unwrap().to_json("\t"), "{\n\t\"a\" : 1\n}");
    }

    #[test]
    fn test_float_default_template() {
        assert_eq!(compact(r#"{"f": 1.5}"#), r#"{"f":1.500000}"#);
    }

    #[test]
    fn test_string_written_raw() {
        // escapes were decoded at parse time and are not re-encoded
        let mut doc = Document::new();
        doc.parse(br#"{"s": "a\tb"}"#).unwrap();
        assert_eq!(doc.root().unwrap().to_json(""), "{\"s\":\"a\tb\"}");
    }

    #[test]
    fn test_all_sinks_agree() {
        let mut doc = Document::new();
        doc.parse(br#"{"a": [1, 2.5, "x"], "b": {"c": true}}"#).unwrap();
        let root = doc.root().unwrap();

        for pad in ["", "  ", "\t"] {
            let expected = root.to_json(pad);

            let mut stream = Vec::new();
            let stream_len = root.write_to(&mut stream, pad).unwrap();
            assert_eq!(stream, expected.as_bytes());
            assert_eq!(stream_len, expected.len());

            let mut storage = [0u8; 256];
            let mut fixed = FixedBuf::new(&mut storage);
            let fixed_len = root.write_buf(&mut fixed, pad).unwrap();
            assert_eq!(fixed.as_str(), expected);
            assert_eq!(fixed_len, expected.len());
            assert_eq!(fixed.len(), expected.len());
        }
    }

    #[test]
    fn test_fixed_buffer_overflow() {
        let mut doc = Document::new();
        doc.parse(br#"{"a": "a long enough string value"}"#).unwrap();

        let mut storage = [0u8; 8];
        let mut fixed = FixedBuf::new(&mut storage);
        let err = doc.root().unwrap().write_buf(&mut fixed, "").unwrap_err();
        assert_eq!(err, BufferFull);
    }

    #[test]
    fn test_write_subtree() {
        let mut doc = Document::new();
        doc.parse(br#"{"a": [1, 2]}"#).unwrap();
        let array = doc.root().unwrap().member("a").unwrap();
        // a named node keeps its name when written directly
        assert_eq!(array.to_json(""), r#""a":[1,2]"#);
    }

    #[test]
    fn test_custom_int_template() {
        let mut doc = Document::new();
        doc.parse(br#"{"a": 42, "b": -7}"#).unwrap();
        doc.formats_mut().set_int_format("%05d").unwrap();
        assert_eq!(doc.root().unwrap().to_json(""), r#"{"a":00042,"b":-0007}"#);

        doc.formats_mut().set_int_format("%x").unwrap();
        assert_eq!(doc.root().unwrap().member("a").unwrap().to_json(""), r#""a":2a"#);
    }

    #[test]
    fn test_custom_float_template() {
        let mut doc = Document::new();
        doc.parse(br#"{"f": 1.5}"#).unwrap();

        doc.formats_mut().set_float_format("%.2f").unwrap();
        assert_eq!(doc.root().unwrap().to_json(""), r#"{"f":1.50}"#);

        doc.formats_mut().set_float_format("%e").unwrap();
        assert_eq!(doc.root().unwrap().to_json(""), r#"{"f":1.500000e+00}"#);
    }

    #[test]
    fn test_custom_str_template() {
        let mut doc = Document::new();
        doc.parse(br#"{"s": "abcdef"}"#).unwrap();

        doc.formats_mut().set_str_format("%.3s").unwrap();
        assert_eq!(doc.root().unwrap().to_json(""), r#"{"s":"abc"}"#);

        doc.formats_mut().set_str_format("%-8s").unwrap();
        assert_eq!(doc.root().unwrap().to_json(""), r#"{"s":"abcdef  "}"#);
    }

    #[test]
    fn test_template_with_literal_text() {
        let mut doc = Document::new();
        doc.parse(br#"{"a": 42}"#).unwrap();
        doc.formats_mut().set_int_format("%d%%").unwrap();
        assert_eq!(doc.root().unwrap().to_json(""), r#"{"a":42%}"#);
    }

    #[test]
    fn test_template_validation() {
        let mut config = WriterConfig::default();

        assert!(config.set_int_format("%s").is_err());
        assert!(config.set_int_format("no conversion").is_err());
        assert!(config.set_int_format("%d and %d").is_err());
        assert!(config.set_int_format("%").is_err());
        assert!(config.set_float_format("%d").is_err());
        assert!(config.set_str_format("%f").is_err());

        // a rejected template leaves the previous one in place
        assert_eq!(config.int_format(), "%d");

        assert!(config.set_int_format("%+d").is_ok());
        assert!(config.set_float_format("%010.3f").is_ok());
        assert!(config.set_str_format("%-12.4s").is_ok());
    }

    #[test]
    fn test_plus_flag() {
        let mut doc = Document::new();
        doc.parse(br#"{"a": 42, "b": -7}"#).unwrap();
        doc.formats_mut().set_int_format("%+d").unwrap();
        assert_eq!(doc.root().unwrap().to_json(""), r#"{"a":+42,"b":-7}"#);
    }

    #[test]
    fn test_exp_notation_helper() {
        assert_eq!(exp_notation(1.5, 6), "1.500000e+00");
        assert_eq!(exp_notation(-250.0, 2), "-2.50e+02");
        assert_eq!(exp_notation(0.001, 1), "1.0e-03");
    }

    #[test]
    fn test_written_length_counts_everything() {
        let mut doc = Document::new();
        doc.parse(br#"{"name": "value"}"#).unwrap();
        let root = doc.root().unwrap();

        for pad in ["", "  "] {
            let text = root.to_json(pad);
            let mut sink = String::new();
            let len = root.write_str(&mut sink, pad).unwrap();
            assert_eq!(len, text.len());
        }
    }
}
