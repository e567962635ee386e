//! The type codec: parsing and rendering the packed C++ type descriptor.
//!
//! Grounded on `vtkParse_BasicTypeFromString` / `vtkParse_ValueInfoFromString`
//! in `vtkParseExtras.c`. The original packs base kind, qualifiers, and a
//! pointer stack into a single `unsigned int`; here the same information is
//! carried as an `enum BaseKind` plus a `Qualifiers` bitflags value plus an
//! explicit pointer stack, per the redesign note in the spec.

use crate::arena::StringArena;
use crate::class::Value;
use crate::lexer::name_length;
use bitflags::bitflags;

/// The base type of a value, before qualifiers or indirection are applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BaseKind {
    Void,
    Bool,
    Char,
    SignedChar,
    Int,
    Short,
    Long,
    LongLong,
    Int64,
    Float,
    Double,
    IdType,
    SizeT,
    SsizeT,
    String,
    UnicodeString,
    IStream,
    OStream,
    /// A VTK-derived class (name starts with `vtk`, no `::`).
    Object,
    /// A Qt object or enum.
    QObject,
    TypedInt8,
    TypedUInt8,
    TypedInt16,
    TypedUInt16,
    TypedInt32,
    TypedUInt32,
    TypedInt64,
    TypedUInt64,
    TypedFloat32,
    TypedFloat64,
    /// Anything else: an unrecognized class, enum, or typedef name.
    Unknown,
}

impl BaseKind {
    /// Whether this kind carries a `class_name` side channel.
    #[must_use]
    pub fn has_class_name(self) -> bool {
        matches!(
            self,
            BaseKind::Object
                | BaseKind::QObject
                | BaseKind::Unknown
                | BaseKind::String
                | BaseKind::UnicodeString
                | BaseKind::IStream
                | BaseKind::OStream
                | BaseKind::TypedInt8
                | BaseKind::TypedUInt8
                | BaseKind::TypedInt16
                | BaseKind::TypedUInt16
                | BaseKind::TypedInt32
                | BaseKind::TypedUInt32
                | BaseKind::TypedInt64
                | BaseKind::TypedUInt64
                | BaseKind::TypedFloat32
                | BaseKind::TypedFloat64
        )
    }

    /// Whether `unsigned` is a meaningful qualifier for this kind.
    #[must_use]
    pub fn can_be_unsigned(self) -> bool {
        matches!(
            self,
            BaseKind::Char
                | BaseKind::Short
                | BaseKind::Int
                | BaseKind::Long
                | BaseKind::LongLong
                | BaseKind::Int64
        )
    }

    fn canonical_name(self) -> &'static str {
        match self {
            BaseKind::Void => "void",
            BaseKind::Bool => "bool",
            BaseKind::Char => "char",
            BaseKind::SignedChar => "signed char",
            BaseKind::Int => "int",
            BaseKind::Short => "short",
            BaseKind::Long => "long",
            BaseKind::LongLong => "long long",
            BaseKind::Int64 => "__int64",
            BaseKind::Float => "float",
            BaseKind::Double => "double",
            BaseKind::IdType => "vtkIdType",
            BaseKind::SizeT => "size_t",
            BaseKind::SsizeT => "ssize_t",
            BaseKind::String => "string",
            BaseKind::UnicodeString => "vtkUnicodeString",
            BaseKind::IStream => "istream",
            BaseKind::OStream => "ostream",
            BaseKind::Object | BaseKind::QObject | BaseKind::Unknown => "",
            BaseKind::TypedInt8 => "vtkTypeInt8",
            BaseKind::TypedUInt8 => "vtkTypeUInt8",
            BaseKind::TypedInt16 => "vtkTypeInt16",
            BaseKind::TypedUInt16 => "vtkTypeUInt16",
            BaseKind::TypedInt32 => "vtkTypeInt32",
            BaseKind::TypedUInt32 => "vtkTypeUInt32",
            BaseKind::TypedInt64 => "vtkTypeInt64",
            BaseKind::TypedUInt64 => "vtkTypeUInt64",
            BaseKind::TypedFloat32 => "vtkTypeFloat32",
            BaseKind::TypedFloat64 => "vtkTypeFloat64",
        }
    }
}

bitflags! {
    /// Single-bit qualifiers orthogonal to base kind and indirection.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Qualifiers: u8 {
        const UNSIGNED = 0b0001;
        const CONST    = 0b0010;
        const STATIC   = 0b0100;
        const REF      = 0b1000;
    }
}

/// One level of the pointer stack, innermost first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerCode {
    Pointer,
    ConstPointer,
    /// Only ever the outermost code, and only when there is more than one
    /// array dimension.
    Array,
}

/// A fully decoded C++ type: base kind, qualifiers, pointer stack, and an
/// optional class name side channel.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Type<'a> {
    pub base: Option<BaseKind>,
    pub qualifiers: Qualifiers,
    /// Innermost pointer level first, matching the original's low-end-innermost
    /// packed representation.
    pub pointers: Vec<PointerCode>,
    pub class_name: Option<&'a str>,
}

impl<'a> Type<'a> {
    #[must_use]
    pub fn new(base: BaseKind) -> Self {
        Type {
            base: Some(base),
            qualifiers: Qualifiers::empty(),
            pointers: Vec::new(),
            class_name: None,
        }
    }

    #[must_use]
    pub fn is_unsigned(&self) -> bool {
        self.qualifiers.contains(Qualifiers::UNSIGNED)
    }

    #[must_use]
    pub fn is_const(&self) -> bool {
        self.qualifiers.contains(Qualifiers::CONST)
    }

    #[must_use]
    pub fn is_static(&self) -> bool {
        self.qualifiers.contains(Qualifiers::STATIC)
    }

    #[must_use]
    pub fn is_ref(&self) -> bool {
        self.qualifiers.contains(Qualifiers::REF)
    }

    #[must_use]
    pub fn is_pointer(&self) -> bool {
        matches!(
            self.pointers.last(),
            Some(PointerCode::Pointer | PointerCode::ConstPointer | PointerCode::Array)
        )
    }

    /// True if the outermost level is a plain, non-const pointer.
    #[must_use]
    pub fn is_plain_pointer(&self) -> bool {
        matches!(self.pointers.last(), Some(PointerCode::Pointer))
    }

    #[must_use]
    pub fn is_indirect(&self) -> bool {
        self.is_pointer() || self.is_ref()
    }

    /// Strips `const`/`static` qualifiers, keeping base kind, `ref`, and
    /// pointer stack as-is.
    #[must_use]
    pub fn without_cv(&self) -> Type<'a> {
        Type {
            base: self.base,
            qualifiers: self.qualifiers & !(Qualifiers::CONST | Qualifiers::STATIC),
            pointers: self.pointers.clone(),
            class_name: self.class_name,
        }
    }

    /// Strips `ref` (and turns a `pointer + ref` into a plain `pointer`).
    #[must_use]
    pub fn without_ref(&self) -> Type<'a> {
        let mut t = self.clone();
        t.qualifiers.remove(Qualifiers::REF);
        t
    }

    /// Pushes one pointer level, promoting a value to a pointer and a
    /// pointer to a pointer-to-pointer.
    #[must_use]
    pub fn pointer_promoted(&self) -> Type<'a> {
        let mut t = self.without_ref();
        t.pointers.push(PointerCode::Pointer);
        t
    }

    /// The type with base kind forced to plain `int` and all indirection
    /// dropped: used for boolean/enumerated/`AsString` promotion.
    #[must_use]
    pub fn as_promoted_int() -> Type<'a> {
        Type::new(BaseKind::Int)
    }
}

/// Maps a fixed-width VTK alias id to its canonical `BaseKind`.
///
/// A closed table: VTK's fixed-width aliases are part of the toolkit's
/// convention, not something a host application substitutes.
#[must_use]
pub fn map_vtk_type(alias: &str) -> Option<BaseKind> {
    Some(match alias {
        "vtkIdType" => BaseKind::IdType,
        "vtkStdString" => BaseKind::String,
        "vtkUnicodeString" => BaseKind::UnicodeString,
        "vtkTypeInt8" => BaseKind::TypedInt8,
        "vtkTypeUInt8" => BaseKind::TypedUInt8,
        "vtkTypeInt16" => BaseKind::TypedInt16,
        "vtkTypeUInt16" => BaseKind::TypedUInt16,
        "vtkTypeInt32" => BaseKind::TypedInt32,
        "vtkTypeUInt32" => BaseKind::TypedUInt32,
        "vtkTypeInt64" => BaseKind::TypedInt64,
        "vtkTypeUInt64" => BaseKind::TypedUInt64,
        "vtkTypeFloat32" => BaseKind::TypedFloat32,
        "vtkTypeFloat64" => BaseKind::TypedFloat64,
        _ => return None,
    })
}

fn std_typedef(name: &str) -> Option<BaseKind> {
    Some(match name {
        "size_t" => BaseKind::SizeT,
        "ssize_t" => BaseKind::SsizeT,
        "ostream" => BaseKind::OStream,
        "istream" => BaseKind::IStream,
        "string" => BaseKind::String,
        _ => return None,
    })
}

/// Parses the basic-type prefix of `text` (qualifiers and base kind, no
/// indirection or name), returning the number of bytes consumed and the
/// decoded type.
///
/// Grounded on `vtkParse_BasicTypeFromString`.
#[must_use]
pub fn parse_basic_type<'a>(arena: &'a StringArena, text: &str) -> (usize, Type<'a>) {
    let mut cp = 0usize;
    let bytes = text.as_bytes();
    let skip_ws = |cp: &mut usize| {
        while matches!(bytes.get(*cp), Some(b' ' | b'\t')) {
            *cp += 1;
        }
    };
    skip_ws(&mut cp);

    let mut qualifiers = Qualifiers::empty();
    let mut base: Option<BaseKind> = None;
    let mut class_name: Option<&str> = None;

    let is_name_start = |c: u8| c.is_ascii_alphabetic() || c == b'_';

    loop {
        let at = cp;
        let starts = matches!(bytes.get(at), Some(&b) if is_name_start(b))
            || (bytes.get(at) == Some(&b':') && bytes.get(at + 1) == Some(&b':'));
        if !starts {
            break;
        }
        let n = name_length(&text[at..]);
        if n == 0 {
            break;
        }
        let tok = &text[at..at + n];

        match tok {
            "auto" | "register" | "volatile" => {}
            "static" => qualifiers.insert(Qualifiers::STATIC),
            "const" => qualifiers.insert(Qualifiers::CONST),
            "unsigned" => {
                qualifiers.insert(Qualifiers::UNSIGNED);
                if base.is_none() {
                    class_name = Some("int");
                    base = Some(BaseKind::Int);
                }
            }
            "signed" => {
                if base == Some(BaseKind::Char) {
                    class_name = Some("signed char");
                    base = Some(BaseKind::SignedChar);
                } else {
                    class_name = Some("int");
                    base = Some(BaseKind::Int);
                }
            }
            "int" => {
                if base.is_none() {
                    class_name = Some("int");
                    base = Some(BaseKind::Int);
                }
            }
            "long" => {
                if base == Some(BaseKind::Long) {
                    class_name = Some("long long");
                    base = Some(BaseKind::LongLong);
                } else {
                    class_name = Some("long");
                    base = Some(BaseKind::Long);
                }
            }
            "short" => {
                class_name = Some("short");
                base = Some(BaseKind::Short);
            }
            "char" => {
                if base == Some(BaseKind::Int) && !qualifiers.contains(Qualifiers::UNSIGNED) {
                    class_name = Some("signed char");
                    base = Some(BaseKind::SignedChar);
                } else {
                    class_name = Some("char");
                    base = Some(BaseKind::Char);
                }
            }
            "float" => {
                class_name = Some("float");
                base = Some(BaseKind::Float);
            }
            "double" => {
                class_name = Some("double");
                base = Some(BaseKind::Double);
            }
            "bool" => {
                class_name = Some("bool");
                base = Some(BaseKind::Bool);
            }
            "void" => {
                class_name = Some("void");
                base = Some(BaseKind::Void);
            }
            "__int64" => {
                class_name = Some("__int64");
                base = Some(BaseKind::Int64);
            }
            _ => {
                if base.is_some() {
                    break;
                }

                let mut found = None;
                if let Some(rest) = tok.strip_prefix("vtk") {
                    // Guard against a namespaced name merely starting with "vtk".
                    if !tok.contains("::") {
                        found = map_vtk_type(tok).or({
                            let _ = rest;
                            None
                        });
                    }
                }

                if found.is_none() {
                    let (m, bare) = if let Some(b) = tok.strip_prefix("::") {
                        (2, b)
                    } else if let Some(b) = tok.strip_prefix("std::") {
                        (5, b)
                    } else if let Some(b) = tok.strip_prefix("vtkstd::") {
                        (8, b)
                    } else {
                        (0, tok)
                    };
                    if let Some(k) = std_typedef(bare) {
                        found = Some(k);
                        class_name = Some(if m > 0 { arena.intern(tok) } else { bare });
                    }
                }

                base = match found {
                    Some(k) => {
                        if class_name.is_none() {
                            class_name = Some(tok);
                        }
                        Some(k)
                    }
                    None => {
                        let name = arena.intern(tok);
                        class_name = Some(name);
                        if name.starts_with("vtk") && !name.contains("::") {
                            Some(BaseKind::Object)
                        } else if name.as_bytes().first() == Some(&b'Q')
                            && (name.as_bytes().get(1).is_some_and(u8::is_ascii_uppercase)
                                || name.starts_with("Qt::"))
                        {
                            Some(BaseKind::QObject)
                        } else {
                            Some(BaseKind::Unknown)
                        }
                    }
                };
            }
        }

        cp = at + n;
        skip_ws(&mut cp);
    }

    let unsigned = qualifiers.contains(Qualifiers::UNSIGNED);
    let base_kind = base.unwrap_or(BaseKind::Int);
    if unsigned && !base_kind.can_be_unsigned() {
        if let Some(name) = class_name {
            class_name = Some(arena.concat(&["unsigned ", name]));
        }
    }

    let class_name = if base_kind.has_class_name() {
        class_name
    } else {
        None
    };

    (
        cp,
        Type {
            base: Some(base_kind),
            qualifiers,
            pointers: Vec::new(),
            class_name,
        },
    )
}

/// Renders a decoded type back to the canonical spelling used by the
/// round-trip property in the spec (modulo whitespace).
#[must_use]
pub fn render(ty: &Type<'_>, name: Option<&str>, dimensions: &[String]) -> String {
    let mut out = String::new();
    if ty.is_static() {
        out.push_str("static ");
    }
    if ty.is_const() {
        out.push_str("const ");
    }
    if ty.is_unsigned() && !ty.base.is_some_and(BaseKind::can_be_unsigned) {
        out.push_str("unsigned ");
    } else if ty.is_unsigned() {
        out.push_str("unsigned ");
    }

    match ty.base {
        Some(BaseKind::Object | BaseKind::QObject | BaseKind::Unknown) => {
            out.push_str(ty.class_name.unwrap_or(""));
        }
        Some(other) => out.push_str(other.canonical_name()),
        None => {}
    }

    for p in ty.pointers.iter().rev() {
        match p {
            PointerCode::Pointer => out.push('*'),
            PointerCode::ConstPointer => out.push_str("* const"),
            PointerCode::Array => {}
        }
    }
    if ty.is_ref() {
        out.push('&');
    }
    if let Some(n) = name {
        out.push(' ');
        out.push_str(n);
    }
    for d in dimensions {
        out.push('[');
        out.push_str(d);
        out.push(']');
    }
    out
}

/// Parses a literal integer array dimension, accepting an optional
/// trailing `u`/`l`/`U`/`L` suffix run, as C++ integer literals allow.
fn parse_literal_dimension(text: &str) -> Option<i64> {
    let trimmed = text.trim();
    let digits_end = trimmed
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(trimmed.len());
    if digits_end == 0 {
        return None;
    }
    let (digits, suffix) = trimmed.split_at(digits_end);
    if !suffix.chars().all(|c| matches!(c, 'u' | 'U' | 'l' | 'L')) {
        return None;
    }
    digits.parse().ok()
}

/// Recomputes `count` as the product of `dimensions`, or `0` if there are
/// no dimensions at all or any dimension is not a literal integer.
fn recount(dimensions: &[&str]) -> u64 {
    if dimensions.is_empty() {
        return 0;
    }
    let mut total: u64 = 1;
    for d in dimensions {
        match parse_literal_dimension(d) {
            Some(n) if n >= 0 => total = total.saturating_mul(n as u64),
            _ => return 0,
        }
    }
    total
}

/// Parses a full value declaration: basic type, indirection, optional name,
/// optional array dimensions.
///
/// Grounded on `vtkParse_ValueInfoFromString`.
#[must_use]
pub fn parse_value<'a>(arena: &'a StringArena, text: &str) -> (usize, Value<'a>) {
    let (mut cp, mut ty) = parse_basic_type(arena, text);
    let bytes = text.as_bytes();

    let skip_ws = |cp: &mut usize| {
        while matches!(bytes.get(*cp), Some(b' ' | b'\t')) {
            *cp += 1;
        }
    };
    skip_ws(&mut cp);

    while bytes.get(cp) == Some(&b'*') {
        cp += 1;
        skip_ws(&mut cp);
        let rest = &text[cp..];
        if rest.starts_with("const")
            && rest[5..]
                .chars()
                .next()
                .is_none_or(|c| !c.is_alphanumeric() && c != '_')
        {
            ty.pointers.push(PointerCode::ConstPointer);
            cp += 5;
        } else {
            ty.pointers.push(PointerCode::Pointer);
        }
        skip_ws(&mut cp);
    }

    if bytes.get(cp) == Some(&b'&') {
        ty.qualifiers.insert(Qualifiers::REF);
        cp += 1;
        skip_ws(&mut cp);
    }

    let mut name = None;
    let n = name_length(&text[cp..]);
    if n > 0 {
        name = Some(arena.copy_range(&text[cp..], n));
        cp += n;
    }
    skip_ws(&mut cp);

    let mut dimensions = Vec::new();
    while bytes.get(cp) == Some(&b'[') {
        cp += 1;
        let start = cp;
        while bytes.get(cp).is_some_and(|&b| b != b']') {
            cp += 1;
        }
        dimensions.push(arena.copy_range(&text[start..cp], cp - start));
        if bytes.get(cp) == Some(&b']') {
            cp += 1;
        }
        skip_ws(&mut cp);
    }

    if dimensions.len() > 1 {
        ty.pointers.push(PointerCode::Array);
    } else if dimensions.len() == 1 {
        ty.pointers.push(PointerCode::Pointer);
    }

    let count = recount(&dimensions);
    let mut value = Value::new(ty);
    value.name = name;
    value.count = count;
    value.dimensions = dimensions;
    (cp, value)
}

/// Replaces every occurrence of a substituted identifier token in `text`,
/// honoring identifier boundaries (no partial-token replacement).
///
/// Grounded on `vtkParse_Replace`.
#[must_use]
pub fn substitute_identifiers<'a>(
    arena: &'a StringArena,
    text: &str,
    subs: &[(&str, &str)],
) -> &'a str {
    if subs.is_empty() || text.is_empty() {
        return arena.intern(text);
    }
    let bytes = text.as_bytes();
    let mut out = String::with_capacity(text.len());
    let mut i = 0usize;
    while i < bytes.len() {
        let n = name_length(&text[i..]);
        if n > 0 {
            let tok = &text[i..i + n];
            if let Some((_, replacement)) = subs.iter().find(|(from, _)| *from == tok) {
                out.push_str(replacement);
            } else {
                out.push_str(tok);
            }
            i += n;
        } else {
            out.push(bytes[i] as char);
            i += 1;
        }
    }
    arena.intern(&out)
}

/// Rewrites `value.ty.class_name`, `value.value`, and every dimension by
/// textual substitution, then recomputes `count`.
///
/// Grounded on `vtkParse_ExpandValues`.
pub fn expand_value<'a>(arena: &'a StringArena, value: &mut Value<'a>, subs: &[(&str, &str)]) {
    if let Some(cn) = value.ty.class_name {
        value.ty.class_name = Some(substitute_identifiers(arena, cn, subs));
    }
    if let Some(v) = value.value {
        value.value = Some(substitute_identifiers(arena, v, subs));
    }
    for d in &mut value.dimensions {
        *d = substitute_identifiers(arena, d, subs);
    }
    value.count = recount(&value.dimensions);
}

/// Folds a typedef's underlying type into `value`, per the pointer-stack
/// and array-dimension composition rules in the type codec design.
///
/// Grounded on `vtkParse_ExpandTypedef`.
pub fn expand_typedef<'a>(arena: &'a StringArena, value: &mut Value<'a>, typedef: &Value<'a>) {
    let typedef_was_const = typedef.ty.is_const();
    let typedef_innermost = typedef.ty.pointers.first().copied();

    if value.ty.is_const() {
        match typedef_innermost {
            Some(PointerCode::Pointer) => {
                value.ty.pointers.insert(0, PointerCode::ConstPointer);
                value.ty.qualifiers.remove(Qualifiers::CONST);
            }
            None => {
                // keep the const bit
            }
            _ => {}
        }
    }
    if typedef_was_const {
        value.ty.qualifiers.insert(Qualifiers::CONST);
    }

    let mut reversed: Vec<PointerCode> = value.ty.pointers.drain(..).rev().collect();
    let mut new_dims: Vec<&'a str> = Vec::new();

    if typedef_innermost == Some(PointerCode::Array) {
        for _ in reversed.drain(..) {
            new_dims.push(arena.intern(""));
        }
    } else {
        value.ty.pointers.append(&mut reversed);
    }

    value.ty.pointers.extend(typedef.ty.pointers.iter().copied());
    value.ty.base = typedef.ty.base;
    value.ty.class_name = typedef.ty.class_name;

    new_dims.extend(value.dimensions.iter().copied());
    new_dims.extend(typedef.dimensions.iter().copied());
    value.dimensions = new_dims;

    if value.dimensions.len() > 1 {
        value.ty.pointers.push(PointerCode::Array);
    }

    value.count = recount(&value.dimensions);
}
