//! # Media Support Core
//!
//! Resource- and protocol-state core shared by the call/conferencing media
//! pipeline. Three independent components, composed by the enclosing media
//! session:
//!
//! - **sample_pool**: reuse cache for 16-bit sample buffers, keeping the
//!   per-frame processing path allocation free. Backing storage can be
//!   dropped under memory pressure and refills on demand.
//! - **srtp**: per-media-kind registry of negotiated SRTP key-exchange
//!   controls (ZRTP, DTLS-SRTP, MIKEY, SDES) with deterministic priority
//!   selection and lazy, retry-until-success construction.
//! - **feedback** / **rtcp**: capability-dispatch contract for RTCP
//!   feedback packets (NACK, REMB, sender reports, transport-wide CC) and
//!   the parser that routes raw feedback to it.
//!
//! None of the components spawns its own execution context; each runs
//! synchronously on whatever context calls it (media processing for the
//! pool, session setup for the registry, packet receive for feedback
//! dispatch). All three are `Send + Sync` values meant to be owned by the
//! session object, not process-wide singletons.

pub mod feedback;
pub mod rtcp;
pub mod sample_pool;
pub mod srtp;

pub use feedback::{NullFeedbackSink, RtcpFeedbackSink};
pub use rtcp::RtcpFeedback;
pub use sample_pool::{SampleHolder, SamplePool};
pub use srtp::{
    MediaKind, SrtpControl, SrtpControlFactory, SrtpControlRegistry, SrtpMechanism,
};
