#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::panic)]

//! Scheme Registry
//!
//! Maps a scheme identifier to a factory producing a fresh [`Scheme`].
//! Which implementation the harness exercises is decided when the harness is
//! configured, from a plain string such as `ml-kem-768`.

use crate::error::RegistryError;
use crate::scheme::Scheme;
use crate::schemes::{MlDsa44, MlDsa65, MlDsa87, MlKem512, MlKem768, MlKem1024};
use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;

/// Constructor for a registered scheme.
pub type SchemeFactory = fn() -> Scheme;

/// Identifier-to-scheme lookup table.
#[derive(Default, Clone)]
pub struct SchemeRegistry {
    factories: BTreeMap<String, SchemeFactory>,
}

impl SchemeRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding the FIPS 203 and FIPS 204 adapters.
    #[must_use]
    pub fn with_builtin() -> Self {
        let builtin: [(&str, SchemeFactory); 6] = [
            ("ml-kem-512", || Scheme::Kem(Box::new(MlKem512))),
            ("ml-kem-768", || Scheme::Kem(Box::new(MlKem768))),
            ("ml-kem-1024", || Scheme::Kem(Box::new(MlKem1024))),
            ("ml-dsa-44", || Scheme::Signature(Box::new(MlDsa44))),
            ("ml-dsa-65", || Scheme::Signature(Box::new(MlDsa65))),
            ("ml-dsa-87", || Scheme::Signature(Box::new(MlDsa87))),
        ];
        let factories = builtin.into_iter().map(|(id, factory)| (id.to_string(), factory)).collect();
        Self { factories }
    }

    /// Registers `factory` under `id`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Duplicate`] if `id` is already taken.
    pub fn register(&mut self, id: impl Into<String>, factory: SchemeFactory) -> Result<(), RegistryError> {
        let id = id.into();
        if self.factories.contains_key(&id) {
            return Err(RegistryError::Duplicate(id));
        }
        debug!(scheme = %id, "Registered scheme");
        self.factories.insert(id, factory);
        Ok(())
    }

    /// Instantiates the scheme registered under `id`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Unknown`] if nothing is registered under `id`.
    pub fn resolve(&self, id: &str) -> Result<Scheme, RegistryError> {
        self.factories.get(id).map(|factory| factory()).ok_or_else(|| RegistryError::Unknown(id.to_string()))
    }

    /// Registered identifiers in sorted order.
    #[must_use]
    pub fn identifiers(&self) -> Vec<&str> {
        self.factories.keys().map(String::as_str).collect()
    }

    /// Number of registered schemes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    /// Whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

impl fmt::Debug for SchemeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.factories.keys()).finish()
    }
}
