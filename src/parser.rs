//! The Class Parser / Front End: a small recursive-descent reader that
//! turns already macro-expanded header text into the raw `ClassRecord`
//! tree of the data model.
//!
//! Grounded on the declaration shapes `vtkParseExtras.c`'s helpers assume
//! the real wrapper generator has already produced. This is deliberately
//! not a preprocessor: conditional compilation and macro bodies are out of
//! scope, matching the system's non-goals.

use crate::arena::StringArena;
use crate::class::{Access, ClassRecord, FunctionRecord, TemplateArgs, TemplateParam, Value};
use crate::error::ParseError;
use crate::lexer::name_length;
use crate::types::parse_value;

/// Parses every top-level `class`/`struct` declaration in `text`.
///
/// A malformed member declaration does not abort the whole file: it is
/// recorded in the returned diagnostics list and the offending function is
/// marked `array_failure` instead, so every other declaration in the class
/// still comes back.
pub fn parse_source<'a>(
    arena: &'a StringArena,
    text: &str,
) -> Result<(Vec<ClassRecord<'a>>, Vec<ParseError>), ParseError> {
    let mut classes = Vec::new();
    let mut diagnostics = Vec::new();
    let bytes = text.as_bytes();
    let mut i = 0usize;

    while i < bytes.len() {
        let rest = &text[i..];
        let template = if rest.trim_start().starts_with("template") {
            let (params, consumed) = parse_template_header(rest);
            i += consumed;
            params
        } else {
            None
        };

        let rest = &text[i..];
        let trimmed = rest.trim_start();
        let skip = rest.len() - trimmed.len();

        let keyword = if trimmed.starts_with("class") {
            Some("class")
        } else if trimmed.starts_with("struct") {
            Some("struct")
        } else {
            None
        };

        let Some(kw) = keyword else {
            i += 1;
            continue;
        };

        let default_access = if kw == "struct" { Access::Public } else { Access::Private };
        i += skip + kw.len();

        let (class, consumed) = parse_class(arena, &text[i..], template, default_access, &mut diagnostics)?;
        i += consumed;
        if let Some(class) = class {
            classes.push(class);
        }
    }

    Ok((classes, diagnostics))
}

fn parse_template_header(text: &str) -> (Option<TemplateArgs<'_>>, usize) {
    let trimmed = text.trim_start();
    let skip = text.len() - trimmed.len();
    let Some(after_kw) = trimmed.strip_prefix("template") else {
        return (None, 0);
    };
    let after_kw_trimmed = after_kw.trim_start();
    let Some(after_angle) = after_kw_trimmed.strip_prefix('<') else {
        return (None, 0);
    };
    let Some(close) = after_angle.find('>') else {
        return (None, 0);
    };
    let inner = &after_angle[..close];
    let mut params = Vec::new();
    for part in inner.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        let (default, body) = match part.split_once('=') {
            Some((b, d)) => (Some(d.trim()), b.trim()),
            None => (None, part),
        };
        let is_type = body.starts_with("typename") || body.starts_with("class");
        let name = body.rsplit(char::is_whitespace).next().unwrap_or(body);
        params.push(TemplateParam { name, is_type, default });
    }

    let consumed_after_kw = (after_kw.len() - after_kw_trimmed.len()) + 1 + close + 1;
    let total_consumed = skip + "template".len() + consumed_after_kw;
    (Some(TemplateArgs { params }), total_consumed)
}

/// Parses one `NAME [: access Base, ...] { ... } ;` class body, assuming
/// the `class`/`struct` keyword has already been consumed.
fn parse_class<'a, 's>(
    arena: &'a StringArena,
    text: &'s str,
    template: Option<TemplateArgs<'a>>,
    default_access: Access,
    diagnostics: &mut Vec<ParseError>,
) -> Result<(Option<ClassRecord<'a>>, usize), ParseError> {
    let mut i = 0usize;
    let bytes = text.as_bytes();

    while bytes.get(i).is_some_and(u8::is_ascii_whitespace) {
        i += 1;
    }
    let n = name_length(&text[i..]);
    if n == 0 {
        // A forward declaration or non-class use of the keyword; skip to `;`.
        let end = text.find(';').map_or(text.len(), |p| p + 1);
        return Ok((None, end));
    }
    let class_name = arena.copy_range(&text[i..], n);
    i += n;

    let mut superclasses = Vec::new();
    while bytes.get(i).is_some_and(u8::is_ascii_whitespace) {
        i += 1;
    }
    if bytes.get(i) == Some(&b':') {
        i += 1;
        loop {
            while bytes.get(i).is_some_and(|&b| b.is_ascii_whitespace() || b == b',') {
                i += 1;
            }
            for kw in ["public", "protected", "private"] {
                if text[i..].starts_with(kw) {
                    i += kw.len();
                }
            }
            while bytes.get(i).is_some_and(u8::is_ascii_whitespace) {
                i += 1;
            }
            let n = name_length(&text[i..]);
            if n == 0 {
                break;
            }
            superclasses.push(arena.copy_range(&text[i..], n));
            i += n;
            while bytes.get(i).is_some_and(u8::is_ascii_whitespace) {
                i += 1;
            }
            if bytes.get(i) == Some(&b',') {
                continue;
            }
            break;
        }
    }

    while bytes.get(i).is_some_and(u8::is_ascii_whitespace) {
        i += 1;
    }
    if bytes.get(i) != Some(&b'{') {
        let end = text.find(';').map_or(text.len(), |p| p + 1);
        return Ok((None, end));
    }
    i += 1;
    let body_start = i;
    let mut depth = 1i32;
    while i < bytes.len() && depth > 0 {
        match bytes[i] {
            b'{' => depth += 1,
            b'}' => depth -= 1,
            _ => {}
        }
        i += 1;
    }
    if depth != 0 {
        return Err(ParseError::UnterminatedBlock { class_name: class_name.to_string() });
    }
    let body = &text[body_start..i - 1];

    if let Some(semi) = text[i..].find(';') {
        i += semi + 1;
    }

    let mut class = ClassRecord::new(class_name);
    class.superclasses = superclasses;
    class.template = template;
    parse_members(arena, body, class_name, default_access, &mut class, diagnostics)?;

    Ok((Some(class), i))
}

fn parse_members<'a, 's>(
    arena: &'a StringArena,
    body: &'s str,
    class_name: &'a str,
    default_access: Access,
    class: &mut ClassRecord<'a>,
    diagnostics: &mut Vec<ParseError>,
) -> Result<(), ParseError> {
    let bytes = body.as_bytes();
    let mut i = 0usize;
    let mut stmt_start = 0usize;
    let mut access = default_access;
    let mut depth_paren = 0i32;

    while i < bytes.len() {
        match bytes[i] {
            b'(' => {
                depth_paren += 1;
                i += 1;
            }
            b')' => {
                depth_paren -= 1;
                i += 1;
            }
            b'{' if depth_paren == 0 => {
                // An inline method body: the declaration up to here is a
                // complete statement even without a trailing `;`.
                let stmt = body[stmt_start..i].trim();
                if !stmt.is_empty() {
                    parse_member(arena, access, stmt, class_name, class, diagnostics);
                }
                let mut d = 1i32;
                i += 1;
                while i < bytes.len() && d > 0 {
                    match bytes[i] {
                        b'{' => d += 1,
                        b'}' => d -= 1,
                        _ => {}
                    }
                    i += 1;
                }
                stmt_start = i;
            }
            b':' if depth_paren == 0 && body.as_bytes().get(i + 1) != Some(&b':') => {
                let candidate = body[stmt_start..i].trim();
                if matches!(candidate, "public" | "protected" | "private") {
                    access = match candidate {
                        "public" => Access::Public,
                        "protected" => Access::Protected,
                        _ => Access::Private,
                    };
                    i += 1;
                    stmt_start = i;
                } else {
                    i += 1;
                }
            }
            b';' if depth_paren == 0 => {
                let stmt = body[stmt_start..i].trim();
                if !stmt.is_empty() {
                    parse_member(arena, access, stmt, class_name, class, diagnostics);
                }
                i += 1;
                stmt_start = i;
            }
            _ => i += 1,
        }
    }

    // Anything left over ran off the end of the class body without a
    // terminating `;` — typically a declaration with a mismatched paren.
    // Flush it through the same malformed-declaration path rather than
    // dropping it silently.
    let trailing = body[stmt_start..].trim();
    if !trailing.is_empty() {
        parse_member(arena, access, trailing, class_name, class, diagnostics);
    }

    Ok(())
}

fn parse_member<'a, 's>(
    arena: &'a StringArena,
    access: Access,
    stmt: &'s str,
    class_name: &'a str,
    class: &mut ClassRecord<'a>,
    diagnostics: &mut Vec<ParseError>,
) {
    let mut stmt = stmt.trim();
    let mut comment = None;
    if let Some(idx) = stmt.find("//") {
        comment = Some(arena.intern(stmt[idx + 2..].trim()));
        stmt = stmt[..idx].trim();
    }
    if stmt.is_empty() {
        return;
    }

    if let Some(rest) = stmt.strip_prefix("typedef") {
        let rest = rest.trim();
        let (_, mut v) = parse_value(arena, rest);
        v.is_typedef = true;
        class.typedefs.push(v);
        return;
    }

    if let Some(open) = find_top_level_paren(stmt) {
        let (name_start, is_operator) = find_function_name_start(stmt, open);
        let name = arena.copy_range(&stmt[name_start..open], open - name_start);

        let close = match stmt.rfind(')') {
            Some(close) if close >= open => close,
            _ => {
                diagnostics.push(ParseError::MalformedDeclaration {
                    class_name: class_name.to_string(),
                    text: stmt.to_string(),
                });
                let mut func = FunctionRecord::new(
                    name,
                    Value::new(crate::types::Type::new(crate::types::BaseKind::Void)),
                );
                func.access = access;
                func.comment = comment;
                func.array_failure = true;
                class.functions.push(func);
                return;
            }
        };
        let args_text = &stmt[open + 1..close];
        let tail = stmt[close + 1..].trim();

        let prefix = stmt[..name_start].trim();
        let is_virtual = has_word(prefix, "virtual");
        let is_static = has_word(prefix, "static");
        let is_pure_virtual = tail.contains("= 0") || tail.contains("=0");

        let ret_text = prefix
            .trim_start_matches("virtual")
            .trim_start_matches("static")
            .trim();
        let (_, return_value) = if ret_text.is_empty() {
            (0, Value::new(crate::types::Type::new(crate::types::BaseKind::Void)))
        } else {
            parse_value(arena, ret_text)
        };

        let mut func = FunctionRecord::new(name, return_value);
        func.comment = comment;
        func.access = access;
        func.is_virtual = is_virtual;
        func.is_pure_virtual = is_pure_virtual;
        func.is_static = is_static;
        func.is_operator = is_operator;

        for arg in split_top_level(args_text, ',') {
            let arg = arg.trim();
            if arg.is_empty() {
                continue;
            }
            let (_, v) = parse_value(arena, arg);
            func.arguments.push(v);
        }

        class.functions.push(func);
        return;
    }

    let (_, v) = parse_value(arena, stmt);
    class.variables.push(v);
}

fn find_top_level_paren(stmt: &str) -> Option<usize> {
    let bytes = stmt.as_bytes();
    let mut depth_angle = 0i32;
    for (i, &b) in bytes.iter().enumerate() {
        match b {
            b'<' => depth_angle += 1,
            b'>' if depth_angle > 0 => depth_angle -= 1,
            b'(' if depth_angle == 0 => return Some(i),
            _ => {}
        }
    }
    None
}

fn find_function_name_start(stmt: &str, open: usize) -> (usize, bool) {
    let prefix = &stmt[..open];
    if let Some(idx) = prefix.rfind("operator") {
        return (idx, true);
    }
    let mut start = open;
    let bytes = prefix.as_bytes();
    let mut i = start;
    while i > 0 {
        let c = bytes[i - 1];
        if c.is_ascii_alphanumeric() || c == b'_' || c == b'~' {
            i -= 1;
        } else {
            break;
        }
    }
    start = i;
    (start, false)
}

fn has_word(text: &str, word: &str) -> bool {
    text.split(|c: char| c.is_whitespace()).any(|w| w == word)
}

fn split_top_level(text: &str, sep: char) -> Vec<&str> {
    let mut out = Vec::new();
    let mut depth = 0i32;
    let mut start = 0usize;
    for (i, c) in text.char_indices() {
        match c {
            '<' | '(' | '[' => depth += 1,
            '>' | ')' | ']' => depth -= 1,
            c if c == sep && depth == 0 => {
                out.push(&text[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    if start <= text.len() {
        out.push(&text[start..]);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_class_with_superclass() {
        let arena = StringArena::new();
        let src = "class vtkFoo : public vtkObject { public: void SetRadius(double v); double GetRadius(); };";
        let (classes, diagnostics) = parse_source(&arena, src).unwrap();
        assert!(diagnostics.is_empty());
        assert_eq!(classes.len(), 1);
        let c = &classes[0];
        assert_eq!(c.class_name, "vtkFoo");
        assert_eq!(c.superclasses, vec!["vtkObject"]);
        assert_eq!(c.functions.len(), 2);
        assert!(c.functions.iter().all(|f| matches!(f.access, Access::Public)));
    }

    #[test]
    fn access_specifiers_partition_members() {
        let arena = StringArena::new();
        let src = "class vtkFoo { public: void Pub(); protected: void Prot(); private: void Priv(); };";
        let (classes, _) = parse_source(&arena, src).unwrap();
        let c = &classes[0];
        let access_of = |n: &str| c.functions.iter().find(|f| f.name == n).unwrap().access;
        assert!(matches!(access_of("Pub"), Access::Public));
        assert!(matches!(access_of("Prot"), Access::Protected));
        assert!(matches!(access_of("Priv"), Access::Private));
    }

    #[test]
    fn struct_defaults_to_public() {
        let arena = StringArena::new();
        let src = "struct vtkPoint { double X; double Y; };";
        let (classes, _) = parse_source(&arena, src).unwrap();
        let c = &classes[0];
        assert_eq!(c.variables.len(), 2);
    }

    #[test]
    fn pure_virtual_detected() {
        let arena = StringArena::new();
        let src = "class vtkFoo { public: virtual void Execute() = 0; };";
        let (classes, _) = parse_source(&arena, src).unwrap();
        let f = &classes[0].functions[0];
        assert!(f.is_virtual);
        assert!(f.is_pure_virtual);
    }

    #[test]
    fn typedef_recognized() {
        let arena = StringArena::new();
        let src = "class vtkFoo { public: typedef double ValueType; };";
        let (classes, _) = parse_source(&arena, src).unwrap();
        assert_eq!(classes[0].typedefs.len(), 1);
    }

    #[test]
    fn inline_method_body_is_skipped() {
        let arena = StringArena::new();
        let src = "class vtkFoo { public: int Two() { return 2; } void SetX(int v); };";
        let (classes, _) = parse_source(&arena, src).unwrap();
        assert_eq!(classes[0].functions.len(), 2);
    }

    #[test]
    fn malformed_declaration_is_isolated_via_array_failure() {
        let arena = StringArena::new();
        let src = "class vtkFoo { public: void SetRadius(double v); void Broken(double v; };";
        let (classes, diagnostics) = parse_source(&arena, src).unwrap();
        assert_eq!(diagnostics.len(), 1);
        let c = &classes[0];
        let setter = c.functions.iter().find(|f| f.name == "SetRadius").unwrap();
        assert!(!setter.array_failure);
        let broken = c.functions.iter().find(|f| f.name == "Broken").unwrap();
        assert!(broken.array_failure);
    }
}
