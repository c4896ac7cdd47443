//! Kernel registration table
//!
//! One ordered sequence of [`Kernel`] records; the sweep visits kernels in
//! registration order and result rows follow the same order.

use crate::axpy;
use crate::peak;
use crate::timed::roof_thread;
use roofline_core::{Error, Kernel, Result};

/// Ordered set of benchmark kernels.
#[derive(Debug, Clone, Default)]
pub struct KernelRegistry {
    kernels: Vec<Kernel>,
}

impl KernelRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in kernels: peak compute first, then the axpy family.
    pub fn standard() -> Self {
        let mut registry = Self::new();
        registry
            .register(Kernel::new("peak_add", peak::peak_add))
            .register(Kernel::new("peak_mac", peak::peak_mac))
            .register(Kernel::with_roof("copy", roof_thread, axpy::COPY))
            .register(Kernel::with_roof("ax", roof_thread, axpy::AX))
            .register(Kernel::with_roof("xpx", roof_thread, axpy::XPX))
            .register(Kernel::with_roof("xpy", roof_thread, axpy::XPY))
            .register(Kernel::with_roof("axpy", roof_thread, axpy::AXPY))
            .register(Kernel::with_roof("axpby", roof_thread, axpy::AXPBY))
            .register(Kernel::with_roof("diff1", roof_thread, axpy::DIFF1))
            .register(Kernel::with_roof("diff8", roof_thread, axpy::DIFF8));
        registry
    }

    /// Append a kernel.
    pub fn register(&mut self, kernel: Kernel) -> &mut Self {
        self.kernels.push(kernel);
        self
    }

    /// Kernels whose names appear in `names`, in registration order.
    ///
    /// An empty `names` selects everything.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] for a name that matches no kernel.
    pub fn select(&self, names: &[String]) -> Result<Self> {
        if names.is_empty() {
            return Ok(self.clone());
        }
        if let Some(unknown) = names.iter().find(|n| self.get(n).is_none()) {
            return Err(Error::invalid_config(format!(
                "unknown kernel '{}', expected one of: {}",
                unknown,
                self.names().join(", ")
            )));
        }
        let kernels = self
            .kernels
            .iter()
            .filter(|k| names.contains(&k.name))
            .cloned()
            .collect();
        Ok(KernelRegistry { kernels })
    }

    /// Look up a kernel by name.
    pub fn get(&self, name: &str) -> Option<&Kernel> {
        self.kernels.iter().find(|k| k.name == name)
    }

    /// Kernel names in order.
    pub fn names(&self) -> Vec<&str> {
        self.kernels.iter().map(|k| k.name.as_str()).collect()
    }

    /// Iterate in registration order.
    pub fn iter(&self) -> std::slice::Iter<'_, Kernel> {
        self.kernels.iter()
    }

    /// Number of kernels
    pub fn len(&self) -> usize {
        self.kernels.len()
    }

    /// Whether no kernel is registered
    pub fn is_empty(&self) -> bool {
        self.kernels.is_empty()
    }
}

impl<'a> IntoIterator for &'a KernelRegistry {
    type Item = &'a Kernel;
    type IntoIter = std::slice::Iter<'a, Kernel>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
