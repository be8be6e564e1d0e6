//! Device selection and equalizer mode.
//!
//! A [`MixerContext`] decides which device flags go on the next mixer
//! invocation and which control index resolves ids. Temporary changes go
//! through [`MixerContext::scoped`], whose guard restores the previous
//! context when dropped, on every exit path.

use std::fmt;
use std::ops::{Deref, DerefMut};

use crate::types::SOFTWARE_DEVICE_ID;

/// Which device the mixer utility should address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeviceSelection {
    /// No device flag; the utility picks the system default.
    #[default]
    SystemDefault,
    /// Hardware card by number.
    Card(u32),
    /// The software audio server.
    SoftwareServer,
}

impl DeviceSelection {
    /// Map an API device id to a selection. [`SOFTWARE_DEVICE_ID`] is reserved.
    pub fn from_id(id: u32) -> Self {
        if id == SOFTWARE_DEVICE_ID {
            Self::SoftwareServer
        } else {
            Self::Card(id)
        }
    }

    /// API device id, `None` for the system default.
    pub fn id(&self) -> Option<u32> {
        match self {
            Self::SystemDefault => None,
            Self::Card(n) => Some(*n),
            Self::SoftwareServer => Some(SOFTWARE_DEVICE_ID),
        }
    }
}

/// Which control index an id belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    Standard,
    Equalizer,
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Standard => f.write_str("standard"),
            Self::Equalizer => f.write_str("equalizer"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MixerContext {
    device: DeviceSelection,
    equalizer: bool,
}

impl MixerContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn device(&self) -> DeviceSelection {
        self.device
    }

    pub fn equalizer_mode(&self) -> bool {
        self.equalizer
    }

    /// The index that ids resolve against right now.
    pub fn scope(&self) -> Scope {
        if self.equalizer {
            Scope::Equalizer
        } else {
            Scope::Standard
        }
    }

    pub fn select_device(&mut self, id: u32) {
        self.device = DeviceSelection::from_id(id);
    }

    pub fn clear_device(&mut self) {
        self.device = DeviceSelection::SystemDefault;
    }

    pub fn enter_equalizer(&mut self) {
        self.equalizer = true;
    }

    pub fn exit_equalizer(&mut self) {
        self.equalizer = false;
    }

    /// Borrow the context for temporary changes that are undone on drop.
    pub fn scoped(&mut self) -> ContextGuard<'_> {
        let saved = *self;
        ContextGuard {
            context: self,
            saved,
        }
    }
}

/// Restores the saved context when dropped.
#[derive(Debug)]
pub struct ContextGuard<'a> {
    context: &'a mut MixerContext,
    saved: MixerContext,
}

impl Deref for ContextGuard<'_> {
    type Target = MixerContext;

    fn deref(&self) -> &MixerContext {
        self.context
    }
}

impl DerefMut for ContextGuard<'_> {
    fn deref_mut(&mut self) -> &mut MixerContext {
        self.context
    }
}

impl Drop for ContextGuard<'_> {
    fn drop(&mut self) {
        *self.context = self.saved;
    }
}
