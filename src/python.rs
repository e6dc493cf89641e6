//! Python bindings, built with `--features python`.
//!
//! The module mirrors the `bfexec` Python package: a base
//! `BFError`, `BracketMismatch` for compile failures and `RunTimeError` for
//! failures while running.

use pyo3::create_exception;
use pyo3::exceptions::PyException;
use pyo3::prelude::*;
use pyo3::types::PyBytes;

use crate::error::Error;

create_exception!(bfexec, BFError, PyException);
create_exception!(bfexec, BracketMismatch, BFError);
create_exception!(bfexec, RunTimeError, BFError);

impl From<Error> for PyErr {
    fn from(err: Error) -> PyErr {
        match err {
            // Raised as BracketMismatch(index, bracket_type).
            Error::Compile(e) => BracketMismatch::new_err((e.position, e.bracket.to_string())),
            Error::Run(e) => RunTimeError::new_err(e.to_string()),
        }
    }
}

/// Compile `source` into a list of `(kind, value, offset)` tuples.
#[pyfunction]
fn compile(source: &str) -> PyResult<Vec<(String, isize, isize)>> {
    let prog = crate::compiler::compile(source).map_err(Error::from)?;
    Ok(prog
        .iter()
        .map(|inst| (format!("{:?}", inst.cmd), inst.value, inst.offset))
        .collect())
}

/// Compile and run `source`, feeding it `input` and returning everything it
/// wrote.
#[pyfunction]
#[pyo3(signature = (source, input = None))]
fn run<'py>(
    py: Python<'py>,
    source: &str,
    input: Option<&Bound<'py, PyBytes>>,
) -> PyResult<Bound<'py, PyBytes>> {
    let input = input.map(|bytes| bytes.as_bytes()).unwrap_or_default();
    let mut output = Vec::new();
    crate::execute(source, input, &mut output)?;
    Ok(PyBytes::new(py, &output))
}

#[pymodule]
fn bfexec(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(compile, m)?)?;
    m.add_function(wrap_pyfunction!(run, m)?)?;
    m.add("BFError", m.py().get_type::<BFError>())?;
    m.add("BracketMismatch", m.py().get_type::<BracketMismatch>())?;
    m.add("RunTimeError", m.py().get_type::<RunTimeError>())?;
    Ok(())
}
