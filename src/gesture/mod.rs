//! Touch gesture recognition.
//!
//! Raw pointer events go in, [`GestureAction`]s come out. The recognizer
//! never touches the viewport; the caller applies the actions.

mod pointer;
mod recognizer;
mod velocity;

pub use pointer::{Pointer, PointerId, PointerRegistry};
pub use recognizer::{GestureAction, GestureRecognizer, MainState, TouchEvent};
pub use velocity::VelocityTracker;
