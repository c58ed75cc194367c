//! Distributed tracing support.
//!
//! # Responsibilities
//! - Extract trace context from incoming requests
//! - Propagate trace context on outbound calls (cascades, trace-test)
//! - Generate span identifiers per hop
//!
//! # Design Decisions
//! - W3C Trace Context (`traceparent`) as the only wire format
//! - A missing or malformed header starts a new trace
//! - Spans themselves are `tracing` spans; IDs ride along as fields

use std::fmt;

/// W3C trace context header name.
pub const TRACEPARENT: &str = "traceparent";

/// Trace and span identifiers for one hop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceContext {
    trace_id: u128,
    span_id: u64,
    parent_span_id: Option<u64>,
    sampled: bool,
}

impl TraceContext {
    /// Start a new trace rooted at this hop.
    pub fn new_root() -> Self {
        Self {
            trace_id: non_zero_u128(),
            span_id: non_zero_u64(),
            parent_span_id: None,
            sampled: true,
        }
    }

    /// Continue the trace from an inbound `traceparent`, or start a new one.
    pub fn from_traceparent(header: Option<&str>) -> Self {
        match header.and_then(parse_traceparent) {
            Some((trace_id, parent, sampled)) => Self {
                trace_id,
                span_id: non_zero_u64(),
                parent_span_id: Some(parent),
                sampled,
            },
            None => Self::new_root(),
        }
    }

    /// A child context for an outbound call made from this hop.
    pub fn child(&self) -> Self {
        Self {
            trace_id: self.trace_id,
            span_id: non_zero_u64(),
            parent_span_id: Some(self.span_id),
            sampled: self.sampled,
        }
    }

    /// Header value announcing this hop as the parent.
    pub fn traceparent(&self) -> String {
        format!(
            "00-{:032x}-{:016x}-{:02x}",
            self.trace_id,
            self.span_id,
            u8::from(self.sampled)
        )
    }

    pub fn trace_id(&self) -> String {
        format!("{:032x}", self.trace_id)
    }

    pub fn span_id(&self) -> String {
        format!("{:016x}", self.span_id)
    }

    pub fn parent_span_id(&self) -> Option<String> {
        self.parent_span_id.map(|id| format!("{:016x}", id))
    }
}

impl fmt::Display for TraceContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.traceparent())
    }
}

fn parse_traceparent(value: &str) -> Option<(u128, u64, bool)> {
    let mut parts = value.trim().split('-');
    let version = parts.next()?;
    let trace_id = parts.next()?;
    let parent_id = parts.next()?;
    let flags = parts.next()?;

    if version.len() != 2 || version == "ff" || trace_id.len() != 32 || parent_id.len() != 16 || flags.len() != 2 {
        return None;
    }
    // Version 00 has exactly four fields.
    if version == "00" && parts.next().is_some() {
        return None;
    }

    let trace_id = u128::from_str_radix(trace_id, 16).ok()?;
    let parent_id = u64::from_str_radix(parent_id, 16).ok()?;
    let flags = u8::from_str_radix(flags, 16).ok()?;
    if trace_id == 0 || parent_id == 0 {
        return None;
    }
    Some((trace_id, parent_id, flags & 0x01 == 0x01))
}

fn non_zero_u128() -> u128 {
    fastrand::u128(1..)
}

fn non_zero_u64() -> u64 {
    fastrand::u64(1..)
}
