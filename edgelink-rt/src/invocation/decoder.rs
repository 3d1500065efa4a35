//! Server-side invocation unpacking.

// Layer 1: Standard library imports
use std::sync::Arc;

// Layer 2: Third-party crate imports
// (none)

// Layer 3: Internal module imports
use super::data::InvocationData;
use super::error::InvocationError;
use crate::serialization::{
    Manifest, SerializationError, SerializationRegistry, TypeDescriptor, TypeRegistry, WireType,
};

/// Consumes a decoded [`InvocationData`] argument by argument.
///
/// The dispatcher inspects [`argument_manifests`](Self::argument_manifests)
/// to resolve parameter types before invoking the method, checks arity
/// with [`expect_arity`](Self::expect_arity), then decodes each argument
/// in positional order.
pub struct InvocationDecoder {
    serialization: Arc<SerializationRegistry>,
    data: InvocationData,
    next_argument: usize,
}

impl InvocationDecoder {
    pub(crate) fn new(serialization: Arc<SerializationRegistry>, data: InvocationData) -> Self {
        Self {
            serialization,
            data,
            next_argument: 0,
        }
    }

    /// Decode the next positional argument into its declared type.
    ///
    /// # Errors
    ///
    /// `ArgumentMissing` past the end of the sequence;
    /// `ArgumentDecodeFailed` when the payload bytes do not decode;
    /// manifest resolution failures pass through from the serialization
    /// layer.
    pub fn decode_next_argument<T: WireType>(&mut self) -> Result<T, InvocationError> {
        let index = self.next_argument;
        let argument = self
            .data
            .arguments
            .get(index)
            .ok_or(InvocationError::ArgumentMissing { index })?;

        let value = self
            .serialization
            .deserialize::<T>(&argument.data, &argument.manifest)
            .map_err(|e| match e {
                SerializationError::Corrupt { detail, .. } => {
                    InvocationError::ArgumentDecodeFailed { index, detail }
                }
                other => InvocationError::Serialization(other),
            })?;

        self.next_argument += 1;
        Ok(value)
    }

    /// Resolve the recorded generic substitutions to local descriptors.
    ///
    /// # Errors
    ///
    /// `UnknownType` for any hint that does not resolve.
    pub fn decode_generic_substitutions(&self) -> Result<Vec<TypeDescriptor>, InvocationError> {
        self.data
            .generic_substitutions
            .iter()
            .map(|hint| {
                TypeRegistry::global().resolve(hint).ok_or_else(|| {
                    InvocationError::Serialization(SerializationError::UnknownType {
                        hint: hint.clone(),
                    })
                })
            })
            .collect()
    }

    /// Pre-flight view of every argument's manifest, in order.
    pub fn argument_manifests(&self) -> Vec<&Manifest> {
        self.data.arguments.iter().map(|a| &a.manifest).collect()
    }

    /// Total number of arguments carried by the invocation.
    pub fn argument_count(&self) -> usize {
        self.data.arguments.len()
    }

    /// Arguments not yet decoded.
    pub fn remaining(&self) -> usize {
        self.data.arguments.len() - self.next_argument
    }

    /// Whether the caller recorded a void return.
    pub fn is_void_return(&self) -> bool {
        self.data.is_void
    }

    /// Fail fast when the carried argument count disagrees with the
    /// method's arity.
    pub fn expect_arity(&self, expected: usize) -> Result<(), InvocationError> {
        let actual = self.data.arguments.len();
        if actual == expected {
            Ok(())
        } else {
            Err(InvocationError::ArityMismatch { expected, actual })
        }
    }
}
