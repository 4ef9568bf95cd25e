//! `formkeep` - Signup form engine with local persistence
//!
//! This library provides the form data model, field validation, draft and
//! submission persistence over a key-value store, and storage of captured
//! images into an application-owned directory.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod camera;
pub mod cli;
pub mod config;
pub mod error;
pub mod form;
pub mod logging;
pub mod notify;
pub mod storage;

pub use camera::{CameraSession, CameraState, CapturedImage};
pub use config::Config;
pub use error::{Error, Result};
pub use form::{
    DraftForm, ErrorMap, Field, FieldValue, FormController, FormState, SubmitOutcome,
    SubmittedForm, ValidationError, ValidationErrorKind, Validator,
};
pub use logging::init_logging;
pub use notify::{Notifier, Toast, ToastKind};
pub use storage::{FileStore, FormDataStore, FormStats, ImageStore, KeyValueStore};
