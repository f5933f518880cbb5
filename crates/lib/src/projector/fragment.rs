//! The rendering collaborator.

use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::theme::SolarMode;

/// The piece of UI a surface owns.
///
/// Implementations use interior mutability: a fragment is shared between the
/// projector and its event listeners.
pub trait Fragment: Send + Sync + Debug {
    /// Set the text content of `element`.
    fn set_text(&self, element: &str, text: &str);

    /// Set the value of input control `element`.
    fn set_input(&self, element: &str, value: &str);

    /// The input control that currently has focus.
    fn focused(&self) -> Option<String>;

    /// The current value of input control `element`.
    fn input_value(&self, element: &str) -> Option<String>;

    /// Apply a theme mode to the fragment.
    fn apply_theme(&self, mode: SolarMode);
}

#[derive(Debug, Default)]
struct FragmentState {
    texts: HashMap<String, String>,
    inputs: HashMap<String, String>,
    focus: Option<String>,
    theme: Option<SolarMode>,
}

/// A [`Fragment`] held in memory, for headless hosts and tests.
#[derive(Debug, Default)]
pub struct MemoryFragment {
    state: Mutex<FragmentState>,
}

impl MemoryFragment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Give `element` input focus.
    pub fn focus(&self, element: &str) {
        self.lock().focus = Some(element.to_string());
    }

    /// Remove input focus.
    pub fn blur(&self) {
        self.lock().focus = None;
    }

    /// Simulate the user typing `value` into `element`.
    pub fn type_into(&self, element: &str, value: &str) {
        self.lock()
            .inputs
            .insert(element.to_string(), value.to_string());
    }

    /// Text content of `element`.
    pub fn text(&self, element: &str) -> Option<String> {
        self.lock().texts.get(element).cloned()
    }

    /// Value of input `element`.
    pub fn input(&self, element: &str) -> Option<String> {
        self.lock().inputs.get(element).cloned()
    }

    /// Last applied theme.
    pub fn theme(&self) -> Option<SolarMode> {
        self.lock().theme
    }

    fn lock(&self) -> MutexGuard<'_, FragmentState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Fragment for MemoryFragment {
    fn set_text(&self, element: &str, text: &str) {
        self.lock()
            .texts
            .insert(element.to_string(), text.to_string());
    }

    fn set_input(&self, element: &str, value: &str) {
        self.type_into(element, value);
    }

    fn focused(&self) -> Option<String> {
        self.lock().focus.clone()
    }

    fn input_value(&self, element: &str) -> Option<String> {
        self.input(element)
    }

    fn apply_theme(&self, mode: SolarMode) {
        self.lock().theme = Some(mode);
    }
}
