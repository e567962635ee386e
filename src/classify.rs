//! The Method Classifier: turns a raw function declaration into
//! `MethodAttributes` plus a `Category` code, recognizing the accessor
//! naming grammar (`SetX`, `GetX`, `AddX`, `RemoveX`, `XOn`/`XOff`,
//! `SetXToEnum`, `GetNumberOfXs`, ...).
//!
//! Grounded on the predicate table and `methodCategory` switch in
//! `vtkParseVariables.c`.

use crate::class::{Access, FunctionRecord, Value};
use crate::types::{BaseKind, Type};
use num_enum::{IntoPrimitive, TryFromPrimitive};
use std::fmt;

/// The 25 recognized accessor shapes.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive)]
pub enum Category {
    BasicGet = 0,
    BasicSet = 1,
    MultiGet = 2,
    MultiSet = 3,
    IndexGet = 4,
    IndexSet = 5,
    NthGet = 6,
    NthSet = 7,
    RhsGet = 8,
    IndexRhsGet = 9,
    NthRhsGet = 10,
    EnumGet = 11,
    EnumSet = 12,
    BoolOn = 13,
    BoolOff = 14,
    MinGet = 15,
    MaxGet = 16,
    GetNum = 17,
    SetNum = 18,
    BasicAdd = 19,
    MultiAdd = 20,
    IndexAdd = 21,
    BasicRem = 22,
    IndexRem = 23,
    RemoveAll = 24,
}

impl Category {
    /// The bit-exact name rendered in the emitted XML.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Category::BasicGet => "BASIC_GET",
            Category::BasicSet => "BASIC_SET",
            Category::MultiGet => "MULTI_GET",
            Category::MultiSet => "MULTI_SET",
            Category::IndexGet => "INDEX_GET",
            Category::IndexSet => "INDEX_SET",
            Category::NthGet => "NTH_GET",
            Category::NthSet => "NTH_SET",
            Category::RhsGet => "RHS_GET",
            Category::IndexRhsGet => "INDEX_RHS_GET",
            Category::NthRhsGet => "NTH_RHS_GET",
            Category::EnumGet => "ENUM_GET",
            Category::EnumSet => "ENUM_SET",
            Category::BoolOn => "BOOL_ON",
            Category::BoolOff => "BOOL_OFF",
            Category::MinGet => "MIN_GET",
            Category::MaxGet => "MAX_GET",
            Category::GetNum => "GET_NUM",
            Category::SetNum => "SET_NUM",
            Category::BasicAdd => "BASIC_ADD",
            Category::MultiAdd => "MULTI_ADD",
            Category::IndexAdd => "INDEX_ADD",
            Category::BasicRem => "BASIC_REM",
            Category::IndexRem => "INDEX_REM",
            Category::RemoveAll => "REMOVEALL",
        }
    }

    const ALL: [Category; 25] = [
        Category::BasicGet,
        Category::BasicSet,
        Category::MultiGet,
        Category::MultiSet,
        Category::IndexGet,
        Category::IndexSet,
        Category::NthGet,
        Category::NthSet,
        Category::RhsGet,
        Category::IndexRhsGet,
        Category::NthRhsGet,
        Category::EnumGet,
        Category::EnumSet,
        Category::BoolOn,
        Category::BoolOff,
        Category::MinGet,
        Category::MaxGet,
        Category::GetNum,
        Category::SetNum,
        Category::BasicAdd,
        Category::MultiAdd,
        Category::IndexAdd,
        Category::BasicRem,
        Category::IndexRem,
        Category::RemoveAll,
    ];
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A bitmap over the 25 `Category` values, one per access level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CategorySet(u32);

impl CategorySet {
    #[must_use]
    pub fn empty() -> Self {
        CategorySet(0)
    }

    pub fn insert(&mut self, c: Category) {
        self.0 |= 1 << (u8::from(c) as u32);
    }

    #[must_use]
    pub fn contains(self, c: Category) -> bool {
        self.0 & (1 << (u8::from(c) as u32)) != 0
    }

    #[must_use]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Renders as `|`-joined category names in declaration order, the
    /// stable contract the XML layer relies on.
    #[must_use]
    pub fn render(self) -> String {
        Category::ALL
            .iter()
            .filter(|&&c| self.contains(c))
            .map(|c| c.name())
            .collect::<Vec<_>>()
            .join("|")
    }
}

/// A function reduced to its accessor shape, ready for clustering into a
/// `VariableAttributes` by the synthesizer.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodAttributes<'a> {
    pub name: &'a str,
    pub ty: Type<'a>,
    pub count: u64,
    pub comment: Option<&'a str>,
    pub access: Access,
    pub is_legacy: bool,
    pub is_hinted: bool,
    pub is_multi_value: bool,
    pub is_indexed: bool,
    pub is_enumerated: bool,
    pub is_boolean: bool,
}

fn is_upper_or_digit(b: u8) -> bool {
    b.is_ascii_uppercase() || b.is_ascii_digit()
}

fn strip_shape<'a>(name: &'a str, prefix: &str) -> Option<&'a str> {
    let rest = name.strip_prefix(prefix)?;
    if rest.as_bytes().first().is_some_and(|&b| is_upper_or_digit(b)) {
        Some(rest)
    } else {
        None
    }
}

#[must_use]
pub fn is_set(name: &str) -> bool {
    strip_shape(name, "Set").is_some()
}
#[must_use]
pub fn is_set_nth(name: &str) -> bool {
    strip_shape(name, "SetNth").is_some()
}
#[must_use]
pub fn is_get(name: &str) -> bool {
    strip_shape(name, "Get").is_some()
}
#[must_use]
pub fn is_get_nth(name: &str) -> bool {
    strip_shape(name, "GetNth").is_some()
}
#[must_use]
pub fn is_add(name: &str) -> bool {
    strip_shape(name, "Add").is_some()
}

fn is_bulk_shape(name: &str, prefix: &str) -> bool {
    match strip_shape(name, prefix) {
        Some(rest) => rest.len() > 1 && rest.ends_with('s'),
        None => false,
    }
}

#[must_use]
pub fn is_set_number_of(name: &str) -> bool {
    is_bulk_shape(name, "SetNumberOf")
}
#[must_use]
pub fn is_get_number_of(name: &str) -> bool {
    is_bulk_shape(name, "GetNumberOf")
}
#[must_use]
pub fn is_remove_all(name: &str) -> bool {
    is_bulk_shape(name, "RemoveAll")
}

#[must_use]
pub fn is_remove(name: &str) -> bool {
    strip_shape(name, "Remove").is_some() && !is_remove_all(name)
}

#[must_use]
pub fn is_boolean(name: &str) -> bool {
    (name.len() > 2 && name.ends_with("On")) || (name.len() > 3 && name.ends_with("Off"))
}

/// Finds the index of a `To<Upper>` split at or after `from`, the shape
/// `is_enumerated` requires.
fn find_to_split(name: &str, from: usize) -> Option<usize> {
    let bytes = name.as_bytes();
    if from >= name.len() {
        return None;
    }
    let mut i = from;
    while i + 2 <= bytes.len() {
        if i > from
            && &bytes[i..i + 2] == b"To"
            && bytes.get(i + 2).is_some_and(u8::is_ascii_uppercase)
        {
            return Some(i);
        }
        i += 1;
    }
    None
}

#[must_use]
pub fn is_enumerated(name: &str) -> bool {
    is_set(name) && find_to_split(name, 3).is_some()
}

#[must_use]
pub fn is_as_string(name: &str) -> bool {
    is_get(name) && name.ends_with("AsString")
}
#[must_use]
pub fn is_min_value(name: &str) -> bool {
    is_get(name) && name.ends_with("MinValue")
}
#[must_use]
pub fn is_max_value(name: &str) -> bool {
    is_get(name) && name.ends_with("MaxValue")
}

/// Strips the recognized prefix and suffix, leaving the core logical name
/// (`X` in `SetX`, `GetNumberOfXs`, `XOn`, ...).
///
/// Grounded on `nameWithoutPrefix`.
#[must_use]
pub fn name_without_prefix(name: &str) -> &str {
    let mut s = name;
    for prefix in ["SetNth", "GetNth", "SetNumberOf", "GetNumberOf", "Set", "Get", "Add", "RemoveAll", "Remove"] {
        if let Some(rest) = s.strip_prefix(prefix) {
            s = rest;
            break;
        }
    }
    if let Some(stripped) = s.strip_suffix("AsString") {
        return stripped;
    }
    if let Some(stripped) = s.strip_suffix("MinValue") {
        return stripped;
    }
    if let Some(stripped) = s.strip_suffix("MaxValue") {
        return stripped;
    }
    if let Some(idx) = find_to_split(name, 3) {
        return &name[3..idx];
    }
    if let Some(stripped) = s.strip_suffix("On") {
        return stripped;
    }
    if let Some(stripped) = s.strip_suffix("Off") {
        return stripped;
    }
    if name.len() != s.len() && s.ends_with('s') && s.len() > 1 {
        // SetNumberOf/GetNumberOf/RemoveAll bulk forms: drop the trailing plural `s`.
        return &s[..s.len() - 1];
    }
    s
}

fn arg_is_int(v: &Value<'_>) -> bool {
    matches!(v.ty.base, Some(BaseKind::Int | BaseKind::IdType))
        && v.ty.pointers.is_empty()
        && !v.ty.is_ref()
}

fn all_same_type(args: &[Value<'_>]) -> bool {
    args.len() > 1
        && args
            .windows(2)
            .all(|w| w[0].ty.base == w[1].ty.base && w[0].ty.class_name == w[1].ty.class_name)
}

fn is_sized_out_buffer(v: &Value<'_>) -> bool {
    v.ty.is_plain_pointer() && v.count > 0 && !v.ty.is_const()
}

fn base_attrs<'a>(f: &FunctionRecord<'a>, ty: Type<'a>, count: u64) -> MethodAttributes<'a> {
    MethodAttributes {
        name: f.name,
        ty,
        count,
        comment: f.comment,
        access: f.access,
        is_legacy: f.is_legacy,
        is_hinted: f.have_hint,
        is_multi_value: false,
        is_indexed: false,
        is_enumerated: false,
        is_boolean: false,
    }
}

/// Reduces a function declaration to `MethodAttributes` if its signature
/// matches one of the recognized accessor shapes.
///
/// Grounded on `getMethodAttributes`.
#[must_use]
pub fn extract_attributes<'a>(f: &FunctionRecord<'a>) -> Option<MethodAttributes<'a>> {
    if f.array_failure {
        return None;
    }
    let name = f.name;
    let args = &f.arguments;

    if is_boolean(name) {
        let mut a = base_attrs(f, Type::new(BaseKind::Int), 0);
        a.is_boolean = true;
        return Some(a);
    }

    if is_enumerated(name) && args.is_empty() {
        let mut a = base_attrs(f, Type::new(BaseKind::Int), 0);
        a.is_enumerated = true;
        return Some(a);
    }

    if is_remove_all(name) && args.is_empty() {
        return Some(base_attrs(f, Type::default(), 0));
    }

    if is_set_number_of(name) && args.len() == 1 && arg_is_int(&args[0]) {
        return Some(base_attrs(f, args[0].ty.clone(), 0));
    }
    if is_get_number_of(name) && args.is_empty() {
        return Some(base_attrs(f, f.return_value.ty.clone(), 0));
    }

    if is_add(name) || is_remove(name) {
        return match args.len() {
            1 => Some(base_attrs(f, args[0].ty.clone(), args[0].count)),
            2 if arg_is_int(&args[0]) => {
                let mut a = base_attrs(f, args[1].ty.clone(), args[1].count);
                a.is_indexed = true;
                Some(a)
            }
            _ => None,
        };
    }

    if is_set(name) {
        let nth = is_set_nth(name);
        return match args.len() {
            1 => Some(base_attrs(f, args[0].ty.clone(), args[0].count)),
            2 if nth || (arg_is_int(&args[0]) && !all_same_type(args)) => {
                let mut a = base_attrs(f, args[1].ty.clone(), args[1].count);
                a.is_indexed = true;
                Some(a)
            }
            n if n >= 2 && all_same_type(args) => {
                let mut a = base_attrs(f, args[0].ty.clone(), args.len() as u64);
                a.is_multi_value = true;
                Some(a)
            }
            _ => None,
        };
    }

    if is_get(name) {
        let nth = is_get_nth(name);
        return match args.len() {
            0 => Some(base_attrs(f, f.return_value.ty.clone(), f.return_value.count)),
            1 if is_sized_out_buffer(&args[0]) => {
                Some(base_attrs(f, args[0].ty.clone(), args[0].count))
            }
            1 if nth || arg_is_int(&args[0]) => {
                let mut a = base_attrs(f, f.return_value.ty.clone(), f.return_value.count);
                a.is_indexed = true;
                Some(a)
            }
            2 if (nth || arg_is_int(&args[0])) && is_sized_out_buffer(&args[1]) => {
                let mut a = base_attrs(f, args[1].ty.clone(), args[1].count);
                a.is_indexed = true;
                Some(a)
            }
            n if n >= 2 && all_same_type(args) && args.iter().all(|a| a.ty.is_ref()) => {
                let mut a = base_attrs(f, args[0].ty.clone(), args.len() as u64);
                a.is_multi_value = true;
                Some(a)
            }
            _ => None,
        };
    }

    None
}

/// Assigns a `Category` to an already-extracted `MethodAttributes`.
///
/// `short_form` folds suffix-bearing variants (`AsString`, `MinValue`,
/// `MaxValue`, `NumberOfXs`) into their basic category, as used when a
/// method is being considered as a *seed* rather than clustered.
///
/// Grounded on `methodCategory`.
#[must_use]
pub fn method_category(attrs: &MethodAttributes<'_>, short_form: bool) -> Category {
    let name = attrs.name;

    if attrs.is_boolean {
        return if name.ends_with("On") {
            Category::BoolOn
        } else {
            Category::BoolOff
        };
    }
    if attrs.is_enumerated {
        return if is_set(name) {
            Category::EnumSet
        } else {
            Category::EnumGet
        };
    }
    if is_remove_all(name) {
        return Category::RemoveAll;
    }
    if is_set_number_of(name) {
        return Category::SetNum;
    }
    if is_get_number_of(name) {
        return Category::GetNum;
    }
    if is_add(name) {
        if attrs.is_indexed {
            return Category::IndexAdd;
        }
        if attrs.is_multi_value {
            return Category::MultiAdd;
        }
        return Category::BasicAdd;
    }
    if is_remove(name) {
        if attrs.is_indexed {
            return Category::IndexRem;
        }
        return Category::BasicRem;
    }
    if is_set(name) {
        if attrs.is_indexed {
            return if is_set_nth(name) {
                Category::NthSet
            } else {
                Category::IndexSet
            };
        }
        if attrs.is_multi_value {
            return Category::MultiSet;
        }
        return Category::BasicSet;
    }
    if is_get(name) {
        if !short_form {
            if is_min_value(name) {
                return Category::MinGet;
            }
            if is_max_value(name) {
                return Category::MaxGet;
            }
            if is_as_string(name) {
                return Category::EnumGet;
            }
        }
        if attrs.is_indexed {
            return if attrs.ty.is_ref() {
                if is_get_nth(name) {
                    Category::NthRhsGet
                } else {
                    Category::IndexRhsGet
                }
            } else if is_get_nth(name) {
                Category::NthGet
            } else {
                Category::IndexGet
            };
        }
        if attrs.is_multi_value {
            return if attrs.ty.is_ref() {
                Category::RhsGet
            } else {
                Category::MultiGet
            };
        }
        return Category::BasicGet;
    }
    Category::BasicGet
}

fn shape_matches(a: &MethodAttributes<'_>, b: &MethodAttributes<'_>) -> bool {
    a.name == b.name
        && a.ty.is_indirect() == b.ty.is_indirect()
        && a.access == b.access
        && a.is_hinted == b.is_hinted
        && a.is_multi_value == b.is_multi_value
        && a.is_indexed == b.is_indexed
        && a.is_enumerated == b.is_enumerated
        && a.is_boolean == b.is_boolean
}

/// Inserts `new` into `list`, suppressing near-duplicate overloads (a
/// `float` vs `double` pair, a shorter legacy variant) per the priority
/// rule in the spec.
///
/// Grounded on `searchForRepeatedMethods`.
pub fn push_deduped<'a>(list: &mut Vec<MethodAttributes<'a>>, new: MethodAttributes<'a>) {
    if let Some(existing) = list.iter_mut().find(|e| shape_matches(e, &new)) {
        let keep_existing = (existing.ty.base == Some(BaseKind::Double)
            && new.ty.base == Some(BaseKind::Float))
            || existing.count >= new.count
            || (new.is_legacy && !existing.is_legacy);
        if !keep_existing {
            *existing = new;
        }
        return;
    }
    list.push(new);
}
