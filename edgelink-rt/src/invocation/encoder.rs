//! Client-side invocation recording.

// Layer 1: Standard library imports
use std::fmt::{self, Display};
use std::sync::Arc;

// Layer 2: Third-party crate imports
// (none)

// Layer 3: Internal module imports
use super::data::{InvocationArgument, InvocationData};
use super::error::InvocationError;
use crate::serialization::{SerializationRegistry, SerializerId, WireType};

/// Encoder lifecycle states. Transitions are one-way:
/// `Recording → Done → Finalized`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncoderState {
    /// Accepting arguments, substitutions, and type records
    Recording,
    /// Recording closed; ready to drain into an envelope
    Done,
    /// Drained; no further use permitted
    Finalized,
}

impl Display for EncoderState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Recording => f.write_str("Recording"),
            Self::Done => f.write_str("Done"),
            Self::Finalized => f.write_str("Finalized"),
        }
    }
}

/// Records one typed method call for transfer.
///
/// Stubs record generic substitutions, arguments (in parameter order),
/// and the return and error types while the encoder is `Recording`, then
/// call [`done_recording`](Self::done_recording). The runtime drains the
/// encoder exactly once while building the Invocation envelope.
///
/// Each argument is serialized immediately at record time, so the stored
/// manifest reflects the static type used at the call site rather than
/// any runtime subtype.
pub struct InvocationEncoder {
    state: EncoderState,
    serialization: Arc<SerializationRegistry>,
    arguments: Vec<InvocationArgument>,
    generic_substitutions: Vec<String>,
    is_void: bool,
    return_hint: Option<String>,
    error_hint: Option<String>,
}

impl InvocationEncoder {
    /// A fresh encoder in the `Recording` state.
    pub fn new(serialization: Arc<SerializationRegistry>) -> Self {
        Self {
            state: EncoderState::Recording,
            serialization,
            arguments: Vec::new(),
            generic_substitutions: Vec::new(),
            is_void: false,
            return_hint: None,
            error_hint: None,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> EncoderState {
        self.state
    }

    /// Record the next positional argument.
    ///
    /// # Errors
    ///
    /// `InvalidEncoderState` outside `Recording`; serialization failures
    /// pass through.
    pub fn record_argument<T: WireType>(&mut self, value: &T) -> Result<(), InvocationError> {
        self.ensure(EncoderState::Recording)?;
        let (data, manifest) = self.serialization.serialize(value)?;
        self.arguments.push(InvocationArgument {
            data: data.to_vec(),
            manifest,
        });
        Ok(())
    }

    /// Record the next generic substitution by its wire name.
    pub fn record_generic_substitution<T: WireType>(&mut self) -> Result<(), InvocationError> {
        self.ensure(EncoderState::Recording)?;
        self.generic_substitutions.push(T::WIRE_NAME.to_string());
        Ok(())
    }

    /// Record the declared return type; `()` marks the call void.
    pub fn record_return_type<T: WireType>(&mut self) -> Result<(), InvocationError> {
        self.ensure(EncoderState::Recording)?;
        self.return_hint = Some(T::WIRE_NAME.to_string());
        self.is_void = T::serializer_id() == SerializerId::void();
        Ok(())
    }

    /// Record the declared error type.
    pub fn record_error_type<T: WireType>(&mut self) -> Result<(), InvocationError> {
        self.ensure(EncoderState::Recording)?;
        self.error_hint = Some(T::WIRE_NAME.to_string());
        Ok(())
    }

    /// Close recording: `Recording → Done`.
    pub fn done_recording(&mut self) -> Result<(), InvocationError> {
        self.ensure(EncoderState::Recording)?;
        self.state = EncoderState::Done;
        Ok(())
    }

    /// The recorded return type hint, if any.
    pub fn return_type_hint(&self) -> Option<&str> {
        self.return_hint.as_deref()
    }

    /// The recorded error type hint, if any.
    pub fn error_type_hint(&self) -> Option<&str> {
        self.error_hint.as_deref()
    }

    /// Drain the recorded call into its wire form: `Done → Finalized`.
    pub(crate) fn finalize(&mut self) -> Result<InvocationData, InvocationError> {
        self.ensure(EncoderState::Done)?;
        self.state = EncoderState::Finalized;
        Ok(InvocationData {
            arguments: std::mem::take(&mut self.arguments),
            generic_substitutions: std::mem::take(&mut self.generic_substitutions),
            is_void: self.is_void,
        })
    }

    fn ensure(&self, expected: EncoderState) -> Result<(), InvocationError> {
        if self.state == expected {
            Ok(())
        } else {
            Err(InvocationError::InvalidEncoderState {
                state: self.state.to_string(),
            })
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn encoder() -> InvocationEncoder {
        InvocationEncoder::new(Arc::new(SerializationRegistry::new()))
    }

    #[test]
    fn test_initial_state_is_recording() {
        assert_eq!(encoder().state(), EncoderState::Recording);
    }

    #[test]
    fn test_record_and_finalize() {
        let mut enc = encoder();
        enc.record_generic_substitution::<String>().unwrap();
        enc.record_argument(&"hello".to_string()).unwrap();
        enc.record_argument(&42u32).unwrap();
        enc.record_return_type::<String>().unwrap();
        enc.done_recording().unwrap();

        let data = enc.finalize().unwrap();
        assert_eq!(data.arguments.len(), 2);
        assert_eq!(data.generic_substitutions, vec!["String".to_string()]);
        assert!(!data.is_void);
        assert_eq!(enc.state(), EncoderState::Finalized);
    }

    #[test]
    fn test_void_return_sets_flag() {
        let mut enc = encoder();
        enc.record_return_type::<()>().unwrap();
        enc.done_recording().unwrap();

        let data = enc.finalize().unwrap();
        assert!(data.is_void);
    }

    #[test]
    fn test_argument_order_is_positional() {
        let mut enc = encoder();
        enc.record_argument(&1u8).unwrap();
        enc.record_argument(&2u8).unwrap();
        enc.record_argument(&3u8).unwrap();
        enc.done_recording().unwrap();

        let data = enc.finalize().unwrap();
        let bytes: Vec<u8> = data.arguments.iter().map(|a| a.data[0]).collect();
        assert_eq!(bytes, vec![1, 2, 3]);
    }

    #[test]
    fn test_record_after_done_is_rejected() {
        let mut enc = encoder();
        enc.done_recording().unwrap();

        let err = enc.record_argument(&1u32).unwrap_err();
        assert!(matches!(err, InvocationError::InvalidEncoderState { .. }));
    }

    #[test]
    fn test_finalize_before_done_is_rejected() {
        let mut enc = encoder();
        let err = enc.finalize().unwrap_err();
        assert!(matches!(err, InvocationError::InvalidEncoderState { .. }));
    }

    #[test]
    fn test_double_finalize_is_rejected() {
        let mut enc = encoder();
        enc.done_recording().unwrap();
        enc.finalize().unwrap();

        let err = enc.finalize().unwrap_err();
        assert!(matches!(err, InvocationError::InvalidEncoderState { .. }));
    }

    #[test]
    fn test_double_done_is_rejected() {
        let mut enc = encoder();
        enc.done_recording().unwrap();
        assert!(enc.done_recording().is_err());
    }

    #[test]
    fn test_manifest_reflects_static_type() {
        let mut enc = encoder();
        enc.record_argument(&"hi".to_string()).unwrap();
        enc.done_recording().unwrap();

        let data = enc.finalize().unwrap();
        assert_eq!(data.arguments[0].manifest.hint(), Some("String"));
    }
}
