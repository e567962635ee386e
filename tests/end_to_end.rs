//! End-to-end pipeline tests: header text in, XML out, exercising the
//! scenarios in the testable-properties section against the full
//! parse → classify → synthesize → serialize pipeline rather than any one
//! component in isolation.

use vtk_wrap_introspect::arena::StringArena;
use vtk_wrap_introspect::driver::{run_job, serialize_job, JobConfig};
use vtk_wrap_introspect::hints::NoSuperclasses;

fn run(src: &str) -> String {
    let arena = StringArena::new();
    let resolver = NoSuperclasses;
    let config = JobConfig::new(&resolver);
    let jobs = run_job(&arena, src, &config).expect("pipeline should not fail on valid input");
    serialize_job(&jobs).expect("serialization should not fail")
}

#[test]
fn s1_basic_get_set_round_trips_through_xml() {
    let xml = run("class vtkSphere : public vtkObject { public: void SetRadius(double v); double GetRadius(); };");
    assert!(xml.contains("name=\"vtkSphere\""));
    assert!(xml.contains("<Superclass>vtkObject</Superclass>"));
    assert!(xml.contains("name=\"Radius\""));
    assert!(xml.contains("public=\"BASIC_GET|BASIC_SET\""));
}

#[test]
fn s2_boolean_round_trips_through_xml() {
    let xml = run(
        "class vtkFoo { public: void DebugOn(); void DebugOff(); void SetDebug(int v); int GetDebug(); };",
    );
    assert!(xml.contains("name=\"Debug\""));
    assert!(xml.contains("BOOL_ON"));
    assert!(xml.contains("BOOL_OFF"));
    assert!(xml.contains("BASIC_GET"));
    assert!(xml.contains("BASIC_SET"));
}

#[test]
fn s3_enumerated_round_trips_through_xml() {
    let xml = run(
        "class vtkFoo { public: \
         void SetModeToFast(); void SetModeToSlow(); void SetMode(int v); \
         int GetMode(); const char* GetModeAsString(); };",
    );
    assert!(xml.contains("name=\"Mode\""));
    assert!(xml.contains("ENUM_GET"));
    assert!(xml.contains("ENUM_SET"));
    assert!(xml.contains("enum_constants=\"Fast,Slow\""));
}

#[test]
fn s4_indexed_collection_round_trips_through_xml() {
    let xml = run(
        "class vtkFoo { public: \
         void SetNumberOfPoints(int n); int GetNumberOfPoints(); \
         void SetPoint(int i, double x); double GetPoint(int i); };",
    );
    assert!(xml.contains("name=\"Point\""));
    assert!(xml.contains("INDEX_GET"));
    assert!(xml.contains("INDEX_SET"));
    assert!(xml.contains("GET_NUM"));
    assert!(xml.contains("SET_NUM"));
}

#[test]
fn s5_multi_value_drops_the_float_overload_as_a_near_duplicate() {
    let xml = run(
        "class vtkFoo { public: \
         void SetColor(float r, float g, float b); \
         void SetColor(double r, double g, double b); \
         void GetColor(double& r, double& g, double& b); };",
    );
    assert!(xml.contains("name=\"Color\""));
    assert!(xml.contains("type=\"double*\""));
    assert!(xml.contains("count=\"3\""));
    assert!(xml.contains("MULTI_SET"));
    assert!(xml.contains("MULTI_GET"));
}

#[test]
fn s6_add_remove_round_trips_through_xml() {
    let xml = run(
        "class vtkFoo { public: \
         void AddInput(vtkDataObject* o); void RemoveInput(vtkDataObject* o); \
         void RemoveAllInputs(); };",
    );
    assert!(xml.contains("name=\"Input\""));
    assert!(xml.contains("BASIC_ADD"));
    assert!(xml.contains("BASIC_REM"));
    assert!(xml.contains("REMOVEALL"));
}

#[test]
fn parser_resilience_keeps_valid_declarations_around_a_malformed_one() {
    // A method whose closing paren is missing is malformed; the class
    // record still comes back with the well-formed declaration around it,
    // plus a diagnostic for the bad one, rather than the whole class
    // failing to parse.
    let arena = StringArena::new();
    let src = "class vtkFoo { public: void SetRadius(double v); void Broken(double v; };";
    let (classes, diagnostics) =
        vtk_wrap_introspect::parser::parse_source(&arena, src).unwrap();
    assert_eq!(diagnostics.len(), 1);
    let c = &classes[0];
    let setter = c.functions.iter().find(|f| f.name == "SetRadius").unwrap();
    assert!(!setter.array_failure);
    let broken = c.functions.iter().find(|f| f.name == "Broken").unwrap();
    assert!(broken.array_failure);
}

#[test]
fn multiple_classes_in_one_header_each_get_their_own_variables() {
    let xml = run(
        "class vtkA { public: void SetX(int v); int GetX(); }; \
         class vtkB { public: void SetY(double v); double GetY(); };",
    );
    assert!(xml.contains("name=\"vtkA\""));
    assert!(xml.contains("name=\"vtkB\""));
    assert!(xml.contains("name=\"X\""));
    assert!(xml.contains("name=\"Y\""));
}
