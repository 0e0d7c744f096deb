//! # RTCP Feedback Sink
//!
//! Capability contract for consumers of RTCP feedback. The parser calls
//! the handler matching each packet kind; every handler has a default
//! empty body, so an implementation overrides only the kinds it consumes
//! and ignores the rest.
//!
//! Handlers run inline on the packet-receive context and must stay
//! bounded in latency. Anything that needs retries or backpressure (a
//! retransmission scheduler reacting to a NACK, a rate controller
//! reacting to feedback) belongs behind the handler, not in it.

use rtcp::payload_feedbacks::receiver_estimated_maximum_bitrate::ReceiverEstimatedMaximumBitrate;
use rtcp::sender_report::SenderReport;
use rtcp::transport_feedbacks::transport_layer_cc::TransportLayerCc;
use rtcp::transport_feedbacks::transport_layer_nack::TransportLayerNack;

pub trait RtcpFeedbackSink: Send + Sync {
    /// Negative acknowledgement: the remote is missing the listed packets.
    fn on_nack(&self, _nack: &TransportLayerNack) {}

    /// Receiver-estimated maximum bitrate (REMB).
    fn on_bandwidth_estimate(&self, _estimate: &ReceiverEstimatedMaximumBitrate) {}

    /// Sender report carrying remote timing and send counters.
    fn on_sender_report(&self, _report: &SenderReport) {}

    /// Transport-wide congestion control feedback.
    fn on_transport_cc(&self, _feedback: &TransportLayerCc) {}
}

/// Sink that consumes nothing. Useful as a placeholder while a stream has
/// no feedback consumers wired up.
pub struct NullFeedbackSink;

impl RtcpFeedbackSink for NullFeedbackSink {}
