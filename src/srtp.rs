//! # SRTP Key-Exchange Negotiation
//!
//! Per-media-kind table of the secure-control instances negotiated for a
//! session. Each media kind carries at most one control per key-exchange
//! mechanism; selection among populated slots follows a fixed
//! interoperability priority so the outcome never depends on the order
//! negotiation happened to populate them.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use strum_macros::EnumString;
use tracing::warn;

/// Stream category as distinguished by the media pipeline.
#[derive(
    Deserialize,
    Serialize,
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    strum_macros::Display,
    EnumString,
)]
pub enum MediaKind {
    #[strum(serialize = "audio")]
    Audio,
    #[strum(serialize = "video")]
    Video,
}

/// The closed set of SRTP key-exchange mechanisms a session can negotiate.
#[derive(
    Deserialize,
    Serialize,
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    strum_macros::Display,
    EnumString,
)]
pub enum SrtpMechanism {
    #[strum(serialize = "zrtp")]
    Zrtp,
    #[strum(serialize = "dtls-srtp")]
    DtlsSrtp,
    #[strum(serialize = "mikey")]
    Mikey,
    #[strum(serialize = "sdes")]
    Sdes,
}

impl SrtpMechanism {
    /// Selection order. Interactive key agreement is tried ahead of the
    /// transport-bound handshake; signaling-carried keying comes last.
    pub const PRIORITY: [SrtpMechanism; 4] = [
        SrtpMechanism::Zrtp,
        SrtpMechanism::DtlsSrtp,
        SrtpMechanism::Mikey,
        SrtpMechanism::Sdes,
    ];
}

/// A key-exchange engine for one media stream. Opaque to the registry
/// apart from the mechanism it implements.
pub trait SrtpControl: Send + Sync {
    fn mechanism(&self) -> SrtpMechanism;
}

/// Media-service collaborator that builds controls on demand. Returns
/// `None` for mechanisms this deployment does not support.
pub trait SrtpControlFactory: Send + Sync {
    fn create_control(
        &self,
        mechanism: SrtpMechanism,
        local_id: &str,
    ) -> Option<Arc<dyn SrtpControl>>;
}

/// Lazily-populated `(media kind, mechanism)` table of secure controls.
///
/// Entries appear on first negotiation need and live until renegotiation
/// or teardown removes them. Shared across the session-setup and teardown
/// contexts; one mutex serializes the table, so concurrent `get_or_create`
/// calls for the same slot construct at most once.
pub struct SrtpControlRegistry {
    factory: Arc<dyn SrtpControlFactory>,
    controls: Mutex<HashMap<(MediaKind, SrtpMechanism), Arc<dyn SrtpControl>>>,
}

impl SrtpControlRegistry {
    pub fn new(factory: Arc<dyn SrtpControlFactory>) -> Self {
        Self {
            factory,
            controls: Mutex::new(HashMap::new()),
        }
    }

    /// Look up the control cached for `(media, mechanism)`, constructing
    /// nothing.
    pub fn get(
        &self,
        media: MediaKind,
        mechanism: SrtpMechanism,
    ) -> Option<Arc<dyn SrtpControl>> {
        self.controls.lock().get(&(media, mechanism)).cloned()
    }

    /// Return the cached control for `(media, mechanism)`, asking the
    /// factory for one if the slot is empty.
    ///
    /// An unsupported mechanism is not cached as a failure: every call
    /// with no intervening success asks the factory again.
    pub fn get_or_create(
        &self,
        media: MediaKind,
        mechanism: SrtpMechanism,
        local_id: &str,
    ) -> Option<Arc<dyn SrtpControl>> {
        // The lock is held across construction so two racing calls for
        // the same empty slot can't both build a control.
        let mut controls = self.controls.lock();
        if let Some(control) = controls.get(&(media, mechanism)) {
            return Some(control.clone());
        }

        match self.factory.create_control(mechanism, local_id) {
            Some(control) => {
                controls.insert((media, mechanism), control.clone());
                Some(control)
            }
            None => {
                warn!(%media, %mechanism, "srtp control unavailable");
                None
            }
        }
    }

    /// Walk the fixed priority order and return the first populated slot
    /// for `media`. Constructs nothing.
    pub fn find_first(&self, media: MediaKind) -> Option<Arc<dyn SrtpControl>> {
        let controls = self.controls.lock();
        SrtpMechanism::PRIORITY
            .iter()
            .find_map(|mechanism| controls.get(&(media, *mechanism)).cloned())
    }

    /// Store `control` under the mechanism it reports, replacing any
    /// previous occupant of that slot.
    pub fn set(&self, media: MediaKind, control: Arc<dyn SrtpControl>) {
        self.controls
            .lock()
            .insert((media, control.mechanism()), control);
    }

    /// Clear the `(media, mechanism)` slot, returning what was there.
    pub fn remove(
        &self,
        media: MediaKind,
        mechanism: SrtpMechanism,
    ) -> Option<Arc<dyn SrtpControl>> {
        self.controls.lock().remove(&(media, mechanism))
    }
}
