//! # RTCP Feedback Parsing
//!
//! Turns raw RTCP feedback packets into the typed values the
//! [`RtcpFeedbackSink`] consumes and routes each one to the matching
//! handler. Only the kinds with a feedback consumer are parsed here;
//! everything else is reported as unsupported for the caller to skip.

use anyhow::{anyhow, Result};
use bytes::Buf;
use rtcp::{
    header::{Header, PacketType, FORMAT_REMB, FORMAT_TCC, FORMAT_TLN},
    payload_feedbacks::receiver_estimated_maximum_bitrate::ReceiverEstimatedMaximumBitrate,
    sender_report::SenderReport,
    transport_feedbacks::{
        transport_layer_cc::TransportLayerCc, transport_layer_nack::TransportLayerNack,
    },
};
use webrtc_util::Unmarshal;

use crate::feedback::RtcpFeedbackSink;

/// One parsed RTCP feedback packet.
#[derive(Clone, Debug)]
pub enum RtcpFeedback {
    SenderReport(SenderReport),
    Nack(TransportLayerNack),
    TransportCc(TransportLayerCc),
    BandwidthEstimate(ReceiverEstimatedMaximumBitrate),
}

impl RtcpFeedback {
    /// Parse a single RTCP packet from a buffer into a typed value.
    /// Returns `unsupported rtcp type` for packet kinds without a
    /// feedback handler.
    pub fn unmarshal<B: Buf + Clone>(buf: &mut B) -> Result<RtcpFeedback> {
        let header = Header::unmarshal(&mut buf.clone())?;
        let feedback = match header.packet_type {
            PacketType::SenderReport => {
                let report = SenderReport::unmarshal(buf)?;
                RtcpFeedback::SenderReport(report)
            }
            PacketType::TransportSpecificFeedback => match header.count {
                FORMAT_TLN => {
                    let nack = TransportLayerNack::unmarshal(buf)?;
                    RtcpFeedback::Nack(nack)
                }
                FORMAT_TCC => {
                    let feedback = TransportLayerCc::unmarshal(buf)?;
                    RtcpFeedback::TransportCc(feedback)
                }
                _ => {
                    return Err(anyhow!("unsupported rtcp type"));
                }
            },
            PacketType::PayloadSpecificFeedback => match header.count {
                FORMAT_REMB => {
                    let estimate =
                        ReceiverEstimatedMaximumBitrate::unmarshal(buf)?;
                    RtcpFeedback::BandwidthEstimate(estimate)
                }
                _ => {
                    return Err(anyhow!("unsupported rtcp type"));
                }
            },
            _ => {
                return Err(anyhow!("unsupported rtcp type"));
            }
        };
        Ok(feedback)
    }

    /// Hand the parsed value to the handler matching its kind.
    pub fn dispatch(&self, sink: &dyn RtcpFeedbackSink) {
        match self {
            RtcpFeedback::SenderReport(report) => sink.on_sender_report(report),
            RtcpFeedback::Nack(nack) => sink.on_nack(nack),
            RtcpFeedback::TransportCc(feedback) => sink.on_transport_cc(feedback),
            RtcpFeedback::BandwidthEstimate(estimate) => {
                sink.on_bandwidth_estimate(estimate)
            }
        }
    }
}
