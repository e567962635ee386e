//! The Serializer: renders a fully specialized, variable-synthesized
//! `ClassRecord` to XML via `quick_xml`'s event writer.
//!
//! Functions and variables are emitted in lexicographic order by name
//! (§4.7); category bitfields are rendered as `|`-joined names, never raw
//! integers, since the names are the stable contract with downstream
//! consumers.

use crate::class::ClassRecord;
use crate::synthesize::VariableAttributes;
use crate::types::render as render_type;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::writer::Writer;
use std::io::Write;

/// Writes one `<Class>` element, with its functions and the synthesized
/// variables nested inside, sorted by name.
pub fn write_class<W: Write>(
    writer: &mut Writer<W>,
    class: &ClassRecord<'_>,
    variables: &[VariableAttributes<'_>],
) -> Result<(), quick_xml::Error> {
    let mut functions: Vec<_> = class.functions.iter().collect();
    functions.sort_by(|a, b| a.name.cmp(b.name));
    let mut vars: Vec<_> = variables.iter().collect();
    vars.sort_by(|a, b| a.name.cmp(b.name));

    let mut class_start = BytesStart::new("Class");
    class_start.push_attribute(("name", class.class_name));
    class_start.push_attribute(("abstract", if class.is_abstract { "1" } else { "0" }));
    writer.write_event(Event::Start(class_start))?;

    for sc in &class.superclasses {
        writer.write_event(Event::Start(BytesStart::new("Superclass")))?;
        writer.write_event(Event::Text(BytesText::new(sc)))?;
        writer.write_event(Event::End(BytesEnd::new("Superclass")))?;
    }

    for f in functions {
        let mut el = BytesStart::new("Function");
        el.push_attribute(("name", f.name));
        el.push_attribute(("access", f.access.as_str()));
        if f.is_virtual {
            el.push_attribute(("virtual", "1"));
        }
        if f.is_pure_virtual {
            el.push_attribute(("abstract", "1"));
        }
        if f.is_static {
            el.push_attribute(("static", "1"));
        }
        if let Some(comment) = f.comment {
            el.push_attribute(("comment", comment));
        }
        writer.write_event(Event::Empty(el))?;
    }

    for v in vars {
        let mut el = BytesStart::new("Variable");
        el.push_attribute(("name", v.name));
        let type_str = render_type(&v.ty, None, &[]);
        el.push_attribute(("type", type_str.as_str()));
        if v.count > 0 {
            el.push_attribute(("count", v.count.to_string().as_str()));
        }
        if !v.enum_constants.is_empty() {
            el.push_attribute(("enum_constants", v.enum_constants.join(",").as_str()));
        }
        if !v.public.is_empty() {
            el.push_attribute(("public", v.public.render().as_str()));
        }
        if !v.protected.is_empty() {
            el.push_attribute(("protected", v.protected.render().as_str()));
        }
        if !v.private.is_empty() {
            el.push_attribute(("private", v.private.render().as_str()));
        }
        writer.write_event(Event::Empty(el))?;
    }

    writer.write_event(Event::End(BytesEnd::new("Class")))?;
    Ok(())
}

/// Renders `class` to a standalone XML document.
pub fn to_string(class: &ClassRecord<'_>, variables: &[VariableAttributes<'_>]) -> Result<String, quick_xml::Error> {
    let mut buf = Vec::new();
    {
        let mut writer = Writer::new_with_indent(&mut buf, b' ', 2);
        write_class(&mut writer, class, variables)?;
    }
    Ok(String::from_utf8(buf).expect("quick_xml only ever writes valid UTF-8"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::StringArena;
    use crate::class::{Access, FunctionRecord};
    use crate::classify::{Category, CategorySet};
    use crate::types::{BaseKind, Type};

    #[test]
    fn renders_function_and_variable() {
        let arena = StringArena::new();
        let mut class = ClassRecord::new(arena.intern("vtkFoo"));
        class.superclasses.push(arena.intern("vtkObject"));
        let mut f = FunctionRecord::new(arena.intern("GetRadius"), value_double());
        f.access = Access::Public;
        class.functions.push(f);

        let mut public = CategorySet::empty();
        public.insert(Category::BasicGet);
        let var = VariableAttributes {
            name: arena.intern("Radius"),
            ty: Type::new(BaseKind::Double),
            count: 0,
            enum_constants: Vec::new(),
            public,
            protected: CategorySet::empty(),
            private: CategorySet::empty(),
            legacy: CategorySet::empty(),
        };

        let xml = to_string(&class, &[var]).unwrap();
        assert!(xml.contains("<Class name=\"vtkFoo\""));
        assert!(xml.contains("<Superclass>vtkObject</Superclass>"));
        assert!(xml.contains("name=\"GetRadius\""));
        assert!(xml.contains("public=\"BASIC_GET\""));
    }

    fn value_double<'a>() -> crate::class::Value<'a> {
        crate::class::Value::new(Type::new(BaseKind::Double))
    }
}
