//! The Driver: orchestrates one wrapping job end to end.
//!
//! One job owns exactly one [`StringArena`] for its whole lifetime (§5):
//! load the class tree, apply hints, specialize templates, merge inherited
//! members, classify and synthesize variables, then serialize.

use crate::arena::StringArena;
use crate::class::ClassRecord;
use crate::classify::{extract_attributes, push_deduped, MethodAttributes};
use crate::error::Error;
use crate::hints::{HintFile, SuperclassResolver};
use crate::parser::parse_source;
use crate::synthesize::{synthesize_variables, VariableAttributes};
use crate::template::specialize_class;
use crate::xml;
use tracing::{debug, warn};

/// Inputs for one job, beyond the header text itself.
pub struct JobConfig<'a> {
    pub hints: Option<&'a HintFile>,
    pub template_args: &'a [&'a str],
    pub resolver: &'a dyn SuperclassResolver<'a>,
}

impl<'a> JobConfig<'a> {
    #[must_use]
    pub fn new(resolver: &'a dyn SuperclassResolver<'a>) -> Self {
        JobConfig { hints: None, template_args: &[], resolver }
    }
}

/// One class with its classified functions clustered into variables.
pub struct WrappedClass<'a> {
    pub class: ClassRecord<'a>,
    pub variables: Vec<VariableAttributes<'a>>,
}

/// Runs the full pipeline over one header's worth of already-read text.
pub fn run_job<'a>(
    arena: &'a StringArena,
    header_text: &str,
    config: &JobConfig<'a>,
) -> Result<Vec<WrappedClass<'a>>, Error> {
    let (mut classes, diagnostics) = parse_source(arena, header_text)?;
    debug!(count = classes.len(), "parsed classes");
    for d in &diagnostics {
        warn!(error = %d, "malformed declaration");
    }

    for class in &mut classes {
        if let Some(hints) = config.hints {
            hints.apply(class);
        }
        if class.template.is_some() && !config.template_args.is_empty() {
            specialize_class(arena, class, config.template_args)?;
        }
        merge_superclass_members(class, config.resolver);
    }

    Ok(classes.into_iter().map(|class| classify_and_synthesize(arena, class)).collect())
}

/// Pulls inherited functions/variables from already-resolved superclasses,
/// skipping any name the class already declares itself.
fn merge_superclass_members<'a>(class: &mut ClassRecord<'a>, resolver: &dyn SuperclassResolver<'a>) {
    let superclasses = class.superclasses.clone();
    for sc_name in superclasses {
        let Some(sc) = resolver.resolve(sc_name) else {
            warn!(superclass = sc_name, class = class.class_name, "superclass not resolved");
            continue;
        };
        for f in &sc.functions {
            if !class.functions.iter().any(|existing| existing.name == f.name) {
                class.functions.push(f.clone());
            }
        }
        for v in &sc.variables {
            if !class.variables.iter().any(|existing| existing.name == v.name) {
                class.variables.push(v.clone());
            }
        }
    }
}

fn classify_and_synthesize<'a>(arena: &'a StringArena, class: ClassRecord<'a>) -> WrappedClass<'a> {
    let mut methods: Vec<MethodAttributes<'a>> = Vec::new();
    for f in &class.functions {
        if let Some(attrs) = extract_attributes(f) {
            push_deduped(&mut methods, attrs);
        }
    }
    let variables = synthesize_variables(arena, &methods);
    debug!(class = class.class_name, variables = variables.len(), "synthesized variables");
    WrappedClass { class, variables }
}

/// Renders every wrapped class in `job` to one XML document.
pub fn serialize_job(job: &[WrappedClass<'_>]) -> Result<String, Error> {
    let mut out = String::new();
    for w in job {
        out.push_str(&xml::to_string(&w.class, &w.variables)?);
        out.push('\n');
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hints::NoSuperclasses;

    #[test]
    fn runs_basic_get_set_end_to_end() {
        let arena = StringArena::new();
        let resolver = NoSuperclasses;
        let config = JobConfig::new(&resolver);
        let src = "class vtkSphere : public vtkObject { public: void SetRadius(double v); double GetRadius(); };";
        let jobs = run_job(&arena, src, &config).unwrap();
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].variables.len(), 1);
        assert_eq!(jobs[0].variables[0].name, "Radius");
    }

    #[test]
    fn serializes_job_to_xml() {
        let arena = StringArena::new();
        let resolver = NoSuperclasses;
        let config = JobConfig::new(&resolver);
        let src = "class vtkSphere { public: void SetRadius(double v); double GetRadius(); };";
        let jobs = run_job(&arena, src, &config).unwrap();
        let xml = serialize_job(&jobs).unwrap();
        assert!(xml.contains("vtkSphere"));
        assert!(xml.contains("public=\"BASIC_GET|BASIC_SET\""));
    }
}
