//! PyO3 Python bindings for L0 gradient smoothing.
//!
//! This crate provides thin Python bindings for the l0_core library.
//! All algorithm logic is in l0_core; this crate only handles
//! Python/NumPy type conversions.

use ndarray::Axis;
use numpy::{
    Complex64, PyArray2, PyArray3, PyArrayDyn, PyReadonlyArray2, PyReadonlyArray3,
    PyReadonlyArrayDyn, ToPyArray,
};
use pyo3::prelude::*;

use l0_core::{as_signal, l0_smooth, l0_smooth_u8, L0Config, L0Error};

fn to_py_err(e: L0Error) -> PyErr {
    pyo3::exceptions::PyValueError::new_err(e.to_string())
}

/// Smooth an 8-bit image. Accepts (rows, cols) or (rows, cols, channels).
#[pyfunction]
#[pyo3(signature = (image, lambd=2e-2, kappa=2.0))]
pub fn l0_smoothing<'py>(
    py: Python<'py>,
    image: PyReadonlyArrayDyn<u8>,
    lambd: f64,
    kappa: f64,
) -> PyResult<&'py PyArrayDyn<u8>> {
    let view = image.as_array();
    let config = L0Config::<f64>::new().with_lambda(lambd).with_kappa(kappa);

    let output = match view.ndim() {
        2 => {
            let grey = view.insert_axis(Axis(2));
            let signal = as_signal(grey.view()).map_err(to_py_err)?;
            l0_smooth_u8(signal, &config)
                .map_err(to_py_err)?
                .remove_axis(Axis(2))
                .into_dyn()
        }
        _ => {
            let signal = as_signal(view).map_err(to_py_err)?;
            l0_smooth_u8(signal, &config).map_err(to_py_err)?.into_dyn()
        }
    };
    Ok(output.to_pyarray(py))
}

/// Smooth a float64 (rows, cols, channels) signal with values in [0, 1].
#[pyfunction]
#[pyo3(signature = (signal, lambd=2e-2, kappa=2.0, beta_max=1e5))]
pub fn l0_smoothing_float<'py>(
    py: Python<'py>,
    signal: PyReadonlyArray3<f64>,
    lambd: f64,
    kappa: f64,
    beta_max: f64,
) -> PyResult<&'py PyArray3<f64>> {
    let config = L0Config::new()
        .with_lambda(lambd)
        .with_kappa(kappa)
        .with_beta_max(beta_max);
    let output = l0_smooth(signal.as_array(), &config).map_err(to_py_err)?;
    Ok(output.to_pyarray(py))
}

/// Transfer function of a small kernel at the given output size.
#[pyfunction]
pub fn psf2otf<'py>(
    py: Python<'py>,
    psf: PyReadonlyArray2<f64>,
    rows: usize,
    cols: usize,
) -> PyResult<&'py PyArray2<Complex64>> {
    let otf = l0_core::psf2otf(psf.as_array(), (rows, cols)).map_err(to_py_err)?;
    Ok(otf.to_pyarray(py))
}

#[pymodule]
fn l0smooth_rust(_py: Python, m: &PyModule) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(l0_smoothing, m)?)?;
    m.add_function(wrap_pyfunction!(l0_smoothing_float, m)?)?;
    m.add_function(wrap_pyfunction!(psf2otf, m)?)?;
    Ok(())
}
