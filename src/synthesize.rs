//! The Variable Synthesizer: clusters `MethodAttributes` records into
//! `VariableAttributes` by name/type/count matching.
//!
//! Grounded on `categorizeVariables`, `findAllMatches`, and
//! `methodMatchesVariable` in `vtkParseVariables.c`.

use crate::arena::StringArena;
use crate::class::Access;
use crate::classify::{
    is_add, is_as_string, is_get, is_get_number_of, is_max_value, is_min_value, is_remove,
    is_remove_all, is_set, is_set_number_of, method_category, name_without_prefix, Category,
    CategorySet, MethodAttributes,
};
use crate::types::{BaseKind, Type};

/// A synthesized logical instance variable and its capability bitfields.
#[derive(Debug, Clone)]
pub struct VariableAttributes<'a> {
    pub name: &'a str,
    pub ty: Type<'a>,
    pub count: u64,
    pub enum_constants: Vec<&'a str>,
    pub public: CategorySet,
    pub protected: CategorySet,
    pub private: CategorySet,
    pub legacy: CategorySet,
}

impl<'a> VariableAttributes<'a> {
    fn bucket_mut(&mut self, access: Access) -> &mut CategorySet {
        match access {
            Access::Public => &mut self.public,
            Access::Protected => &mut self.protected,
            Access::Private => &mut self.private,
        }
    }

    fn has_any(&self, cats: &[Category]) -> bool {
        cats.iter().any(|&c| {
            self.public.contains(c) || self.protected.contains(c) || self.private.contains(c)
        })
    }

    fn push_enum_constant(&mut self, arena: &'a StringArena, literal: &str) {
        let interned = arena.intern(literal);
        if !self.enum_constants.contains(&interned) {
            self.enum_constants.push(interned);
        }
    }
}

fn is_seed_set(m: &MethodAttributes<'_>) -> bool {
    is_set(m.name) && !m.is_enumerated && !is_set_number_of(m.name)
}
fn is_seed_set_number_of(m: &MethodAttributes<'_>) -> bool {
    is_set_number_of(m.name)
}
fn is_seed_get(m: &MethodAttributes<'_>) -> bool {
    is_get(m.name) && !is_as_string(m.name) && !is_get_number_of(m.name)
}
fn is_seed_get_number_of(m: &MethodAttributes<'_>) -> bool {
    is_get_number_of(m.name)
}
fn is_seed_add(m: &MethodAttributes<'_>) -> bool {
    is_add(m.name)
}

/// Builds the initial variable record from a chosen seed method.
///
/// Grounded on `initializeVariableAttributes`.
fn initialize_variable<'a>(arena: &'a StringArena, seed: &MethodAttributes<'a>) -> VariableAttributes<'a> {
    let name = arena.intern(name_without_prefix(seed.name));
    let mut ty = seed.ty.without_cv().without_ref();
    if seed.is_multi_value {
        ty = ty.pointer_promoted();
    }
    if seed.is_boolean || seed.is_enumerated {
        ty = Type::new(BaseKind::Int);
    }

    let mut var = VariableAttributes {
        name,
        ty,
        count: seed.count,
        enum_constants: Vec::new(),
        public: CategorySet::empty(),
        protected: CategorySet::empty(),
        private: CategorySet::empty(),
        legacy: CategorySet::empty(),
    };

    let cat = method_category(seed, false);
    var.bucket_mut(seed.access).insert(cat);
    if seed.is_legacy {
        var.legacy.insert(cat);
    }
    var
}

/// The type a method's value is normalized to for comparison against a
/// variable's type, mirroring the promotions `initialize_variable` applies
/// to a seed.
fn normalized_type<'a>(meth: &MethodAttributes<'a>) -> Type<'a> {
    let mut ty = meth.ty.without_cv().without_ref();
    if meth.is_multi_value {
        ty = ty.pointer_promoted();
    }
    if meth.is_boolean || meth.is_enumerated || is_as_string(meth.name) {
        ty = Type::new(BaseKind::Int);
    }
    ty
}

fn types_compatible(a: &Type<'_>, b: &Type<'_>) -> bool {
    if a.base != b.base {
        return false;
    }
    if matches!(
        a.base,
        Some(BaseKind::Object | BaseKind::QObject | BaseKind::Unknown)
    ) && a.class_name != b.class_name
    {
        return false;
    }
    a.is_pointer() == b.is_pointer()
}

/// Tests whether `meth` belongs to `var`, returning `Some(long_match)` on a
/// hit. `long_match` is `true` when the method's full suffix (`MinValue`,
/// `MaxValue`, `AsString`, `NumberOfXs`) should be categorized distinctly
/// rather than folded into its basic category.
///
/// Grounded on `methodMatchesVariable`.
fn method_matches(var: &VariableAttributes<'_>, meth: &MethodAttributes<'_>) -> Option<bool> {
    let stripped = name_without_prefix(meth.name);
    if stripped != var.name {
        return None;
    }

    if is_remove_all(meth.name) {
        return if var.has_any(&[Category::BasicAdd, Category::MultiAdd, Category::IndexAdd]) {
            Some(false)
        } else {
            None
        };
    }

    if is_get_number_of(meth.name) || is_set_number_of(meth.name) {
        let int_like = matches!(meth.ty.base, Some(BaseKind::Int | BaseKind::IdType));
        if int_like
            && var.has_any(&[
                Category::IndexGet,
                Category::NthGet,
                Category::IndexRhsGet,
                Category::NthRhsGet,
                Category::IndexSet,
                Category::NthSet,
            ])
        {
            return Some(true);
        }
        return None;
    }

    let long_match = is_min_value(meth.name) || is_as_string(meth.name) || is_max_value(meth.name);

    let mty = normalized_type(meth);
    if !types_compatible(&var.ty, &mty) {
        return None;
    }

    let is_collection = matches!(
        var.ty.base,
        Some(BaseKind::Object | BaseKind::QObject | BaseKind::Unknown)
    ) && var.ty.is_pointer();
    let count_ok = var.count == meth.count
        || is_collection
        || is_add(meth.name)
        || is_remove(meth.name)
        || is_remove_all(meth.name);
    if !count_ok {
        return None;
    }

    Some(long_match)
}

fn enum_literal<'a>(var_name: &str, meth_name: &'a str) -> Option<&'a str> {
    meth_name
        .strip_prefix("Set")
        .and_then(|r| r.strip_prefix(var_name))
        .and_then(|r| r.strip_prefix("To"))
        .filter(|lit| !lit.is_empty())
}

fn apply_match<'a>(
    arena: &'a StringArena,
    var: &mut VariableAttributes<'a>,
    meth: &MethodAttributes<'a>,
    long_match: bool,
) {
    let cat = method_category(meth, !long_match);
    var.bucket_mut(meth.access).insert(cat);
    if meth.is_legacy {
        var.legacy.insert(cat);
    }
    if crate::classify::is_enumerated(meth.name) {
        if let Some(lit) = enum_literal(var.name, meth.name) {
            var.push_enum_constant(arena, lit);
        }
    }
}

/// Clusters `methods` into synthesized variables.
///
/// Grounded on `categorizeVariables` / `findAllMatches`.
#[must_use]
pub fn synthesize_variables<'a>(
    arena: &'a StringArena,
    methods: &[MethodAttributes<'a>],
) -> Vec<VariableAttributes<'a>> {
    let mut claimed = vec![false; methods.len()];
    let mut vars: Vec<VariableAttributes<'a>> = Vec::new();

    let passes: [fn(&MethodAttributes<'_>) -> bool; 5] = [
        is_seed_set,
        is_seed_set_number_of,
        is_seed_get,
        is_seed_get_number_of,
        is_seed_add,
    ];

    // Each freshly seeded variable immediately sweeps the whole method list
    // to a fixpoint before the next seed is considered, so a later pass
    // (e.g. plain `Get`) never re-seeds a variable an earlier pass already
    // created (e.g. plain `Set`) — it gets claimed as a match instead.
    for pass in &passes {
        for i in 0..methods.len() {
            if claimed[i] || !pass(&methods[i]) {
                continue;
            }
            claimed[i] = true;
            let mut var = initialize_variable(arena, &methods[i]);
            sweep_matches(arena, &mut var, methods, &mut claimed);
            vars.push(var);
        }
    }

    // A final global pass: earlier variables may now match methods that
    // only became eligible once a later variable (e.g. from the Add pass)
    // had already claimed its own seed, via the RemoveAll/NumberOf
    // cross-match rules.
    loop {
        let mut progressed = false;
        for var in &mut vars {
            if sweep_matches(arena, var, methods, &mut claimed) {
                progressed = true;
            }
        }
        if !progressed {
            break;
        }
    }

    vars
}

fn sweep_matches<'a>(
    arena: &'a StringArena,
    var: &mut VariableAttributes<'a>,
    methods: &[MethodAttributes<'a>],
    claimed: &mut [bool],
) -> bool {
    let mut any = false;
    loop {
        let mut progressed = false;
        for (i, m) in methods.iter().enumerate() {
            if claimed[i] {
                continue;
            }
            if let Some(long_match) = method_matches(var, m) {
                claimed[i] = true;
                progressed = true;
                any = true;
                apply_match(arena, var, m, long_match);
            }
        }
        if !progressed {
            break;
        }
    }
    any
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::class::FunctionRecord;
    use crate::classify::extract_attributes;
    use crate::types::parse_value;

    fn func<'a>(arena: &'a StringArena, name: &'a str, ret: &str, args: &[&str]) -> FunctionRecord<'a> {
        let (_, rv) = parse_value(arena, ret);
        let mut f = FunctionRecord::new(name, rv);
        for a in args {
            let (_, v) = parse_value(arena, a);
            f.arguments.push(v);
        }
        f
    }

    fn methods_for<'a>(
        arena: &'a StringArena,
        sigs: &[(&'a str, &str, &[&str])],
    ) -> Vec<MethodAttributes<'a>> {
        let mut out = Vec::new();
        for (name, ret, args) in sigs {
            let f = func(arena, name, ret, args);
            if let Some(a) = extract_attributes(&f) {
                out.push(a);
            }
        }
        out
    }

    #[test]
    fn s1_basic_get_set() {
        let arena = StringArena::new();
        let methods = methods_for(
            &arena,
            &[("SetRadius", "void", &["double v"]), ("GetRadius", "double", &[])],
        );
        let vars = synthesize_variables(&arena, &methods);
        assert_eq!(vars.len(), 1);
        assert_eq!(vars[0].name, "Radius");
        assert!(vars[0].public.contains(Category::BasicGet));
        assert!(vars[0].public.contains(Category::BasicSet));
    }

    #[test]
    fn s2_boolean() {
        let arena = StringArena::new();
        let methods = methods_for(
            &arena,
            &[
                ("DebugOn", "void", &[]),
                ("DebugOff", "void", &[]),
                ("SetDebug", "void", &["int v"]),
                ("GetDebug", "int", &[]),
            ],
        );
        let vars = synthesize_variables(&arena, &methods);
        assert_eq!(vars.len(), 1);
        assert_eq!(vars[0].name, "Debug");
        for c in [Category::BasicGet, Category::BasicSet, Category::BoolOn, Category::BoolOff] {
            assert!(vars[0].public.contains(c), "missing {c:?}");
        }
    }

    #[test]
    fn s3_enumerated() {
        let arena = StringArena::new();
        let methods = methods_for(
            &arena,
            &[
                ("SetModeToFast", "void", &[]),
                ("SetModeToSlow", "void", &[]),
                ("SetMode", "void", &["int v"]),
                ("GetMode", "int", &[]),
                ("GetModeAsString", "const char*", &[]),
            ],
        );
        let vars = synthesize_variables(&arena, &methods);
        assert_eq!(vars.len(), 1);
        assert_eq!(vars[0].name, "Mode");
        assert_eq!(vars[0].enum_constants, vec!["Fast", "Slow"]);
        assert!(vars[0].public.contains(Category::EnumGet));
        assert!(vars[0].public.contains(Category::EnumSet));
    }

    #[test]
    fn s4_indexed_collection() {
        let arena = StringArena::new();
        let methods = methods_for(
            &arena,
            &[
                ("SetNumberOfPoints", "void", &["int n"]),
                ("GetNumberOfPoints", "int", &[]),
                ("SetPoint", "void", &["int i", "double x"]),
                ("GetPoint", "double", &["int i"]),
            ],
        );
        let vars = synthesize_variables(&arena, &methods);
        assert_eq!(vars.len(), 1);
        assert_eq!(vars[0].name, "Point");
        for c in [Category::IndexGet, Category::IndexSet, Category::GetNum, Category::SetNum] {
            assert!(vars[0].public.contains(c), "missing {c:?}");
        }
    }

    #[test]
    fn s6_add_remove() {
        let arena = StringArena::new();
        let methods = methods_for(
            &arena,
            &[
                ("AddInput", "void", &["vtkDataObject* o"]),
                ("RemoveInput", "void", &["vtkDataObject* o"]),
                ("RemoveAllInputs", "void", &[]),
            ],
        );
        let vars = synthesize_variables(&arena, &methods);
        assert_eq!(vars.len(), 1);
        assert_eq!(vars[0].name, "Input");
        for c in [Category::BasicAdd, Category::BasicRem, Category::RemoveAll] {
            assert!(vars[0].public.contains(c), "missing {c:?}");
        }
    }

    #[test]
    fn category_bits_never_disappear_as_more_methods_are_added() {
        let arena = StringArena::new();
        let base = methods_for(
            &arena,
            &[("SetRadius", "void", &["double v"]), ("GetRadius", "double", &[])],
        );
        let before = synthesize_variables(&arena, &base);
        let before_bits = before[0].public;

        let mut extended = base.clone();
        extended.extend(methods_for(&arena, &[("RadiusOn", "void", &[]), ("RadiusOff", "void", &[])]));
        let after = synthesize_variables(&arena, &extended);
        let after_bits = after[0].public;

        for cat in [Category::BasicGet, Category::BasicSet] {
            assert!(before_bits.contains(cat));
            assert!(after_bits.contains(cat), "bit {cat:?} was lost once more methods were added");
        }
        assert!(after_bits.contains(Category::BoolOn));
        assert!(after_bits.contains(Category::BoolOff));
    }

    #[test]
    fn synthesis_is_deterministic_across_runs() {
        let arena = StringArena::new();
        let methods = methods_for(
            &arena,
            &[
                ("SetModeToFast", "void", &[]),
                ("SetModeToSlow", "void", &[]),
                ("SetMode", "void", &["int v"]),
                ("GetMode", "int", &[]),
                ("GetModeAsString", "const char*", &[]),
            ],
        );
        let first = synthesize_variables(&arena, &methods);
        let second = synthesize_variables(&arena, &methods);

        assert_eq!(first.len(), second.len());
        for (a, b) in first.iter().zip(second.iter()) {
            assert_eq!(a.name, b.name);
            assert_eq!(a.public, b.public);
            assert_eq!(a.protected, b.protected);
            assert_eq!(a.private, b.private);
            assert_eq!(a.enum_constants, b.enum_constants);
        }
    }
}
