//! The Template Substitution Engine: specializes a templated class against
//! a list of actual arguments.
//!
//! Grounded on `vtkParse_SpecializeTemplatedClass`, `func_substitution`,
//! `value_substitution`, and `class_substitution` in `vtkParseExtras.c`.

use crate::arena::StringArena;
use crate::class::{ClassRecord, FunctionRecord, Value};
use crate::error::TemplateError;
use crate::types::{expand_typedef, expand_value, parse_value, substitute_identifiers, BaseKind};

/// One resolved formal: the substitution text, and — for type-kind
/// formals — a synthetic typedef value used to fold pointer/array/const
/// structure into every value of that type.
struct Resolved<'a> {
    name: &'a str,
    text: &'a str,
    is_type: bool,
    typedef: Option<Value<'a>>,
}

fn resolve_actuals<'a>(
    arena: &'a StringArena,
    class: &ClassRecord<'a>,
    actuals: &[&str],
) -> Result<Vec<Resolved<'a>>, TemplateError> {
    let template = class
        .template
        .as_ref()
        .ok_or_else(|| TemplateError::NotTemplated { class_name: class.class_name.to_string() })?;

    if actuals.len() > template.params.len() {
        return Err(TemplateError::TooManyActuals {
            class_name: class.class_name.to_string(),
            expected: template.params.len(),
            got: actuals.len(),
        });
    }

    let mut resolved = Vec::with_capacity(template.params.len());
    for (i, param) in template.params.iter().enumerate() {
        let text = if let Some(&a) = actuals.get(i) {
            arena.intern(a)
        } else if let Some(default) = param.default {
            default
        } else {
            return Err(TemplateError::TooFewActuals {
                class_name: class.class_name.to_string(),
                missing: param.name.to_string(),
            });
        };

        let typedef = if param.is_type {
            Some(parse_value(arena, text).1)
        } else {
            None
        };

        resolved.push(Resolved { name: param.name, text, is_type: param.is_type, typedef });
    }
    Ok(resolved)
}

fn substitute_value<'a>(arena: &'a StringArena, value: &mut Value<'a>, subs: &[Resolved<'a>]) {
    // A type-formal match is decided on the *original* class name: once
    // `expand_value` runs its textual substitution, the formal's name is
    // already gone from `class_name`.
    let type_match = if matches!(value.ty.base, Some(BaseKind::Object | BaseKind::Unknown)) {
        value
            .ty
            .class_name
            .and_then(|cn| subs.iter().find(|r| r.is_type && r.name == cn))
    } else {
        None
    };

    let text_subs: Vec<(&str, &str)> = subs.iter().map(|r| (r.name, r.text)).collect();
    expand_value(arena, value, &text_subs);

    if let Some(r) = type_match {
        if let Some(typedef) = &r.typedef {
            expand_typedef(arena, value, typedef);
        }
    }

    if let Some(func) = &mut value.function {
        substitute_function(arena, func, subs);
    }
}

fn substitute_function<'a>(arena: &'a StringArena, func: &mut FunctionRecord<'a>, subs: &[Resolved<'a>]) {
    let text_subs: Vec<(&str, &str)> = subs.iter().map(|r| (r.name, r.text)).collect();
    if let Some(sig) = func.signature {
        func.signature = Some(substitute_identifiers(arena, sig, &text_subs));
    }
    for arg in &mut func.arguments {
        substitute_value(arena, arg, subs);
    }
    substitute_value(arena, &mut func.return_value, subs);

    if func.return_value.dimensions.len() == 1 && func.return_value.count > 0 {
        func.have_hint = true;
        func.hint_size = func.return_value.count;
    }
}

fn substitute_class<'a>(arena: &'a StringArena, class: &mut ClassRecord<'a>, subs: &[Resolved<'a>]) {
    let text_subs: Vec<(&str, &str)> = subs.iter().map(|r| (r.name, r.text)).collect();

    for sc in &mut class.superclasses {
        *sc = substitute_identifiers(arena, sc, &text_subs);
    }
    for c in &mut class.constants {
        substitute_value(arena, c, subs);
    }
    for v in &mut class.variables {
        substitute_value(arena, v, subs);
    }
    for t in &mut class.typedefs {
        substitute_value(arena, t, subs);
    }
    for f in &mut class.functions {
        substitute_function(arena, f, subs);
    }
    for nested in &mut class.nested_classes {
        substitute_class(arena, nested, subs);
    }
}

/// Specializes `class` in place against `actuals`, then clears its
/// template marker. Fails if there are more actuals than formals, or a
/// trailing formal with no actual and no default.
///
/// Grounded on `vtkParse_SpecializeTemplatedClass`.
pub fn specialize_class<'a>(
    arena: &'a StringArena,
    class: &mut ClassRecord<'a>,
    actuals: &[&str],
) -> Result<(), TemplateError> {
    let resolved = resolve_actuals(arena, class, actuals)?;
    substitute_class(arena, class, &resolved);
    class.template = None;
    Ok(())
}

/// Splits `Name<A, B, ...>` into the bare class name and its actual
/// argument list.
///
/// Grounded on `vtkParse_DecomposeTemplatedType`.
#[must_use]
pub fn decompose_templated_type(text: &str) -> (&str, Vec<&str>) {
    let Some(open) = text.find('<') else {
        return (text, Vec::new());
    };
    let Some(close) = text.rfind('>') else {
        return (text, Vec::new());
    };
    if close <= open {
        return (text, Vec::new());
    }
    let name = &text[..open];
    let inner = &text[open + 1..close];

    let mut args = Vec::new();
    let mut depth = 0i32;
    let mut start = 0usize;
    let bytes = inner.as_bytes();
    for (i, &b) in bytes.iter().enumerate() {
        match b {
            b'<' => depth += 1,
            b'>' => depth -= 1,
            b',' if depth == 0 => {
                args.push(inner[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    if start < inner.len() {
        args.push(inner[start..].trim());
    }
    (name, args)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::class::TemplateArgs;
    use crate::class::TemplateParam;

    #[test]
    fn decompose_simple() {
        let (name, args) = decompose_templated_type("vtkVector<double, 3>");
        assert_eq!(name, "vtkVector");
        assert_eq!(args, vec!["double", "3"]);
    }

    #[test]
    fn decompose_nested() {
        let (name, args) = decompose_templated_type("Foo<Bar<int>, double>");
        assert_eq!(name, "Foo");
        assert_eq!(args, vec!["Bar<int>", "double"]);
    }

    #[test]
    fn decompose_no_template() {
        let (name, args) = decompose_templated_type("vtkObject");
        assert_eq!(name, "vtkObject");
        assert!(args.is_empty());
    }

    #[test]
    fn specialize_substitutes_field_type() {
        let arena = StringArena::new();
        let mut class = ClassRecord::new(arena.intern("vtkBox"));
        class.template = Some(TemplateArgs {
            params: vec![TemplateParam { name: arena.intern("T"), is_type: true, default: None }],
        });
        let (_, mut field) = parse_value(&arena, "T");
        field.ty.base = Some(BaseKind::Unknown);
        field.ty.class_name = Some("T");
        field.name = Some(arena.intern("Value"));
        class.variables.push(field);

        specialize_class(&arena, &mut class, &["double"]).unwrap();

        assert!(class.template.is_none());
        assert_eq!(class.variables[0].ty.base, Some(BaseKind::Double));
    }

    #[test]
    fn specializing_an_already_specialized_class_is_a_no_op() {
        // Once a class is specialized its template marker is cleared, so a
        // second specialize_class call can't silently re-substitute the
        // already-resolved fields; it fails loudly instead of mutating them
        // further, which is what makes specialization idempotent in effect.
        let arena = StringArena::new();
        let mut class = ClassRecord::new(arena.intern("vtkBox"));
        class.template = Some(TemplateArgs {
            params: vec![TemplateParam { name: arena.intern("T"), is_type: true, default: None }],
        });
        let (_, mut field) = parse_value(&arena, "T");
        field.ty.base = Some(BaseKind::Unknown);
        field.ty.class_name = Some("T");
        field.name = Some(arena.intern("Value"));
        class.variables.push(field);

        specialize_class(&arena, &mut class, &["double"]).unwrap();
        let base_after_first = class.variables[0].ty.base;

        let err = specialize_class(&arena, &mut class, &["double"]).unwrap_err();
        assert!(matches!(err, TemplateError::NotTemplated { .. }));
        assert_eq!(class.variables[0].ty.base, base_after_first);
    }

    #[test]
    fn specialize_too_few_actuals_without_default_fails() {
        let arena = StringArena::new();
        let mut class = ClassRecord::new(arena.intern("vtkBox"));
        class.template = Some(TemplateArgs {
            params: vec![TemplateParam { name: arena.intern("T"), is_type: true, default: None }],
        });
        let err = specialize_class(&arena, &mut class, &[]).unwrap_err();
        assert!(matches!(err, TemplateError::TooFewActuals { .. }));
    }
}
