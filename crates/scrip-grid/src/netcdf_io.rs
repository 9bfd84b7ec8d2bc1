//! Shared helpers around the native netcdf library.

use std::sync::Once;

use netcdf::AttributeValue;

use crate::error::{Result, ScripError};

/// Silence HDF5's automatic error printing to stderr.
///
/// The HDF5 C library prints diagnostics even for conditions the Rust side
/// handles, such as probing for an attribute that is not there. Safe to call
/// more than once; only the first call does anything. Call it before the
/// first NetCDF operation in the process.
pub fn silence_hdf5_errors() {
    static INIT: Once = Once::new();

    INIT.call_once(|| {
        // SAFETY: H5Eset_auto2 is thread-safe and null handlers are a
        // documented way to disable error output.
        unsafe {
            hdf5_metno_sys::h5e::H5Eset_auto2(
                hdf5_metno_sys::h5e::H5E_DEFAULT,
                None,
                std::ptr::null_mut(),
            );
        }
    });
}

/// Check if a variable has an attribute with the given name without
/// triggering an HDF5 lookup error.
pub(crate) fn has_attr(var: &netcdf::Variable, name: &str) -> bool {
    var.attributes().any(|attr| attr.name() == name)
}

/// String attribute of a variable.
pub(crate) fn get_str_attr(var: &netcdf::Variable, name: &str) -> Option<String> {
    if !has_attr(var, name) {
        return None;
    }
    match var.attribute_value(name)?.ok()? {
        AttributeValue::Str(s) => Some(s),
        _ => None,
    }
}

/// String global attribute of a file.
pub(crate) fn get_global_str_attr(file: &netcdf::File, name: &str) -> Option<String> {
    if !file.attributes().any(|attr| attr.name() == name) {
        return None;
    }
    match file.attribute(name)?.value().ok()? {
        AttributeValue::Str(s) => Some(s),
        _ => None,
    }
}

/// Look up a variable or report it as missing.
pub fn require_variable<'f>(
    file: &'f netcdf::File,
    name: &str,
) -> Result<netcdf::Variable<'f>> {
    file.variable(name)
        .ok_or_else(|| ScripError::missing(format!("{} variable", name)))
}

/// Length of a named dimension or report it as missing.
pub fn require_dimension(file: &netcdf::File, name: &str) -> Result<usize> {
    file.dimension(name)
        .map(|d| d.len())
        .ok_or_else(|| ScripError::missing(format!("{} dimension", name)))
}

/// Dimension lengths of a variable, slowest first.
pub fn variable_shape(var: &netcdf::Variable) -> Vec<usize> {
    var.dimensions().iter().map(|d| d.len()).collect()
}

/// Read a numeric variable as f64 whether it is stored as double or float.
pub fn read_as_f64(var: &netcdf::Variable) -> Result<Vec<f64>> {
    read_extents_as_f64(var, ..)
}

/// Read a hyperslab of a numeric variable as f64, double or float storage.
pub fn read_extents_as_f64<E>(var: &netcdf::Variable, extents: E) -> Result<Vec<f64>>
where
    E: TryInto<netcdf::Extents> + Clone,
    E::Error: Into<netcdf::Error>,
{
    match var.get_values::<f64, _>(extents.clone()) {
        Ok(values) => Ok(values),
        Err(_) => Ok(var
            .get_values::<f32, _>(extents)?
            .into_iter()
            .map(f64::from)
            .collect()),
    }
}
