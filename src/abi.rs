//! C-ABI boundary for a foreign `mll` function.
//!
//! The generated function (see [`Dag::llvm`](crate::graph::Dag::llvm)) has
//! the C signature
//!
//! ```c
//! void mll(double* restrict in, double* restrict out);
//! ```
//!
//! It receives no lengths. [`RawTransform`] adapts such a function pointer to
//! the [`Transform`] trait; the pointer pair never leaves this module.
//!
//! With the `extern-mll` feature, [`extern_mll`] returns a `RawTransform`
//! bound to the linked `mll` symbol:
//!   MLL_LIB_DIR=/path/to/lib cargo build --release --features extern-mll

use std::os::raw::c_double;

use crate::harness::Transform;

/// C signature of the transformation.
pub type MllFn = unsafe extern "C" fn(input: *const c_double, output: *mut c_double);

/// A foreign function used as the harness transformation.
///
/// The function is trusted to read no more inputs and write no more outputs
/// than the harness allocated; nothing here can check that.
#[derive(Clone, Copy)]
pub struct RawTransform {
    func: MllFn,
}

impl RawTransform {
    /// # Safety
    /// `func` must only read `input[..n]` and write `output[..m]` where `n`
    /// and `m` are the lengths of the slices it is later applied to.
    pub unsafe fn new(func: MllFn) -> Self {
        RawTransform { func }
    }
}

impl core::fmt::Debug for RawTransform {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RawTransform").field("func", &(self.func as *const ())).finish()
    }
}

impl Transform for RawTransform {
    fn apply(&mut self, input: &[f64], output: &mut [f64]) {
        // SAFETY: the buffer-size contract was accepted in `RawTransform::new`.
        unsafe { (self.func)(input.as_ptr(), output.as_mut_ptr()) }
    }
}

#[cfg(feature = "extern-mll")]
extern "C" {
    /// The linked transformation (see build.rs for how it is located).
    fn mll(input: *const c_double, output: *mut c_double);
}

/// Transformation backed by the linked `mll` symbol.
#[cfg(feature = "extern-mll")]
pub fn extern_mll() -> RawTransform {
    // SAFETY: the linked function follows the harness contract by assumption;
    // it is generated for exactly this buffer layout.
    unsafe { RawTransform::new(mll) }
}
