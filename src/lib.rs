//! Synthesizes logical instance variables from VTK-style C++ accessor
//! naming conventions (`SetX`/`GetX`/`AddX`/`XOn`/`XOff`/...) and emits an
//! XML description of each class's interface.
//!
//! The pipeline, leaves first: [`arena`] backs every interned string,
//! [`types`] and [`class`] are the data model, [`parser`] builds a raw
//! [`class::ClassRecord`] tree, [`template`] specializes it, [`classify`]
//! and [`synthesize`] derive the synthesized variables, and [`xml`] emits
//! the result. [`driver`] wires the pipeline together for one job;
//! [`config`] and the `vtkwrap` binary (`src/main.rs`) are the CLI shell
//! around it.

pub mod arena;
pub mod class;
pub mod classify;
pub mod config;
pub mod driver;
pub mod error;
pub mod hints;
pub mod lexer;
pub mod parser;
pub mod synthesize;
pub mod template;
pub mod types;
pub mod xml;

pub use error::{Error, Result};
