//! # cbd-python
//!
//! Python bindings for the CBD codec, built with PyO3.
//!
//! Exposes the following functions to Python as the `cbd_format` module:
//!
//! - `serialize(obj)` -- Python object -> `bytes`
//! - `deserialize(data, strict=True)` -- `bytes` -> Python object
//! - `json_to_cbd(json)` -- JSON string -> `bytes`
//! - `cbd_to_json(data)` -- `bytes` -> JSON string
//!
//! Accepted inputs are `None`, `bool`, `int`, `float`, `str`, `list`,
//! `tuple` and `dict` with `str` keys. Everything else raises `ValueError`.

use cbd_core::format::DEFAULT_MAX_DEPTH;
use cbd_core::{CbdError, DecodeOptions, Value};
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use pyo3::types::{PyBool, PyBytes, PyDict, PyFloat, PyInt, PyList, PyString, PyTuple};

fn to_py_err(e: CbdError) -> PyErr {
    PyValueError::new_err(e.to_string())
}

fn type_name(obj: &Bound<'_, PyAny>) -> String {
    obj.get_type()
        .name()
        .map(|n| n.to_string())
        .unwrap_or_else(|_| "<unknown>".to_string())
}

/// Convert a Python object tree into a [`Value`].
///
/// Containers count toward the depth limit, which also stops
/// self-referencing lists.
fn from_py(obj: &Bound<'_, PyAny>, depth: usize) -> Result<Value, CbdError> {
    if obj.is_none() {
        return Ok(Value::Null);
    }
    // bool subclasses int; check it first.
    if let Ok(b) = obj.downcast::<PyBool>() {
        return Ok(Value::Bool(b.is_true()));
    }
    if obj.is_instance_of::<PyInt>() {
        if let Ok(n) = obj.extract::<u64>() {
            return Ok(Value::from(n));
        }
        if let Ok(n) = obj.extract::<i64>() {
            return Ok(Value::from(n));
        }
        return Err(if obj.lt(0).unwrap_or(false) {
            CbdError::NegativeValue(obj.to_string())
        } else {
            CbdError::NumberOutOfRange(obj.to_string())
        });
    }
    if let Ok(f) = obj.downcast::<PyFloat>() {
        return Ok(Value::from(f.value()));
    }
    if let Ok(s) = obj.downcast::<PyString>() {
        let s = s
            .to_str()
            .map_err(|_| CbdError::UnsupportedType("str that is not valid UTF-8".to_string()))?;
        return Ok(Value::String(s.to_string()));
    }

    if depth >= DEFAULT_MAX_DEPTH {
        return Err(CbdError::DepthLimitExceeded {
            limit: DEFAULT_MAX_DEPTH,
        });
    }
    if let Ok(list) = obj.downcast::<PyList>() {
        return list
            .iter()
            .map(|item| from_py(&item, depth + 1))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array);
    }
    if let Ok(tuple) = obj.downcast::<PyTuple>() {
        return tuple
            .iter()
            .map(|item| from_py(&item, depth + 1))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array);
    }
    if let Ok(dict) = obj.downcast::<PyDict>() {
        let mut pairs = Vec::with_capacity(dict.len());
        for (key, value) in dict.iter() {
            let key = key.downcast::<PyString>().map_err(|_| {
                CbdError::UnsupportedType(format!("dict key of type {}", type_name(&key)))
            })?;
            let key = key
                .to_str()
                .map_err(|_| CbdError::UnsupportedType("str that is not valid UTF-8".to_string()))?
                .to_string();
            pairs.push((key, from_py(&value, depth + 1)?));
        }
        return Ok(Value::Object(pairs));
    }

    Err(CbdError::UnsupportedType(type_name(obj)))
}

/// Convert a decoded [`Value`] back into Python objects.
fn to_py(py: Python<'_>, value: &Value) -> PyResult<PyObject> {
    Ok(match value {
        Value::Null => py.None(),
        Value::Bool(b) => PyBool::new(py, *b).to_owned().into_any().unbind(),
        Value::Number(n) => match (n.as_u64(), n.as_i64()) {
            (Some(u), _) => u.into_pyobject(py)?.into_any().unbind(),
            (None, Some(i)) => i.into_pyobject(py)?.into_any().unbind(),
            (None, None) => PyFloat::new(py, n.as_f64()).into_any().unbind(),
        },
        Value::String(s) => PyString::new(py, s).into_any().unbind(),
        Value::Array(items) => {
            let list = PyList::empty(py);
            for item in items {
                list.append(to_py(py, item)?)?;
            }
            list.into_any().unbind()
        }
        Value::Object(pairs) => {
            let dict = PyDict::new(py);
            for (key, item) in pairs {
                dict.set_item(key, to_py(py, item)?)?;
            }
            dict.into_any().unbind()
        }
    })
}

/// Serialize a Python object into a CBD document.
///
/// Args:
///     obj: None, bool, int, float, str, list, tuple or dict with str keys,
///         nested arbitrarily.
///
/// Returns:
///     The CBD-encoded bytes. Floats are truncated toward zero.
///
/// Raises:
///     ValueError: On unsupported types, non-str dict keys, negative
///         numbers, or more than 255 distinct keys.
#[pyfunction]
fn serialize(obj: &Bound<'_, PyAny>) -> PyResult<Py<PyBytes>> {
    let value = from_py(obj, 0).map_err(to_py_err)?;
    let bytes = cbd_core::serialize(&value).map_err(to_py_err)?;
    tracing::debug!(bytes = bytes.len(), "serialized python object");
    Ok(PyBytes::new(obj.py(), &bytes).unbind())
}

/// Deserialize a CBD document into Python objects.
///
/// Args:
///     data: CBD-encoded bytes.
///     strict: Reject bytes left after the root value (default True).
///
/// Returns:
///     The decoded object. Objects become dicts in key order and numbers
///     become ints.
///
/// Raises:
///     ValueError: If the header is invalid or the buffer is malformed.
#[pyfunction]
#[pyo3(signature = (data, strict=true))]
fn deserialize(py: Python<'_>, data: &[u8], strict: bool) -> PyResult<PyObject> {
    let options = DecodeOptions::default().strict(strict);
    let value = cbd_core::deserialize_with(data, &options).map_err(to_py_err)?;
    to_py(py, &value)
}

/// Encode a JSON string into a CBD document.
///
/// Args:
///     json: A valid JSON string.
///
/// Returns:
///     The CBD-encoded bytes.
///
/// Raises:
///     ValueError: If the input is not valid JSON or encoding fails.
#[pyfunction]
fn json_to_cbd(py: Python<'_>, json: &str) -> PyResult<Py<PyBytes>> {
    let bytes = cbd_core::json_to_cbd(json).map_err(to_py_err)?;
    Ok(PyBytes::new(py, &bytes).unbind())
}

/// Decode a CBD document into compact JSON.
///
/// Args:
///     data: CBD-encoded bytes.
///
/// Returns:
///     The JSON string.
///
/// Raises:
///     ValueError: If the buffer is not a valid CBD document.
#[pyfunction]
fn cbd_to_json(data: &[u8]) -> PyResult<String> {
    cbd_core::cbd_to_json(data).map_err(to_py_err)
}

/// The `cbd_format` Python module, implemented in Rust via PyO3.
#[pymodule]
fn cbd_format(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(serialize, m)?)?;
    m.add_function(wrap_pyfunction!(deserialize, m)?)?;
    m.add_function(wrap_pyfunction!(json_to_cbd, m)?)?;
    m.add_function(wrap_pyfunction!(cbd_to_json, m)?)?;
    Ok(())
}
