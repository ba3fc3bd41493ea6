//! Protocol engine
//!
//! Once per cycle the engine runs a bounded receive pass over the serial
//! link and a transmit pass that sends queued replies followed by the state
//! report. Neither pass blocks: the receive pass stops when the link runs
//! dry or the per-cycle byte budget is spent, and the transmit pass stops
//! when the link is not ready. Whatever was not sent is dropped, so output
//! never backs up by more than one cycle.

pub mod args;
pub mod receiver;
pub mod reply;

pub use args::CommandArgs;
pub use receiver::{CommandFrame, Receiver, RxEvent, RxState};
pub use reply::{ReplyBuffer, ReplyOverflow, REPLY_CAPACITY};

use heapless::Vec;
use openshoe_hal::SerialLink;
use openshoe_protocol::{encode_block, MAX_BLOCK_FRAME, MAX_BLOCK_PAYLOAD, STATE_REPORT_HEADER};

use crate::config::RuntimeConfig;
use crate::registry::{Command, CommandTable, IdSet, StateTable};
use crate::state::{SoftFault, SystemState};

/// Transmit buffer size: queued replies plus one full state report
pub const TX_CAPACITY: usize = REPLY_CAPACITY + MAX_BLOCK_FRAME;

/// Receiver of accepted commands
pub trait CommandHandler {
    /// Run `command` with its payload fields
    ///
    /// The acknowledgement is already queued in `replies`. If any reply to
    /// the command does not fit, the engine drops the acknowledgement along
    /// with the replies that did fit.
    fn handle(&mut self, command: Command, args: &CommandArgs<'_>, replies: &mut ReplyBuffer);

    /// Record a fault noticed by the engine itself
    fn raise(&mut self, fault: SoftFault);
}

/// Link traffic counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LinkStats {
    /// Bytes taken from the link
    pub rx_bytes: u32,
    /// Bytes dropped while looking for a header
    pub skipped_bytes: u32,
    /// Frames acknowledged
    pub commands: u32,
    /// Frames rejected on checksum
    pub checksum_failures: u32,
    /// Partial frames dropped after silence
    pub timeouts: u32,
    /// Bytes handed to the link
    pub tx_bytes: u32,
    /// Bytes dropped because the link was not ready
    pub tx_discarded: u32,
}

/// Receive and transmit passes over one serial link
#[derive(Debug)]
pub struct ProtocolEngine {
    receiver: Receiver,
    replies: ReplyBuffer,
    tx: Vec<u8, TX_CAPACITY>,
    stats: LinkStats,
}

impl Default for ProtocolEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ProtocolEngine {
    pub const fn new() -> Self {
        Self {
            receiver: Receiver::new(),
            replies: ReplyBuffer::new(),
            tx: Vec::new(),
            stats: LinkStats {
                rx_bytes: 0,
                skipped_bytes: 0,
                commands: 0,
                checksum_failures: 0,
                timeouts: 0,
                tx_bytes: 0,
                tx_discarded: 0,
            },
        }
    }

    /// Process at most `config.rx_bytes_per_cycle` received bytes
    ///
    /// Accepted frames are acknowledged and handed to `handler`; frames with
    /// a bad checksum are answered with a nak. A detached link resets the
    /// receiver. `now` is the trigger timestamp of the current cycle.
    pub fn receive<L, H>(
        &mut self,
        link: &mut L,
        now: u32,
        commands: &CommandTable,
        handler: &mut H,
        config: &RuntimeConfig,
    ) where
        L: SerialLink,
        H: CommandHandler,
    {
        if !link.is_attached() {
            self.receiver.reset();
            return;
        }

        for _ in 0..config.rx_bytes_per_cycle {
            let Some(byte) = link.read_byte() else {
                break;
            };
            self.stats.rx_bytes = self.stats.rx_bytes.wrapping_add(1);

            match self.receiver.feed(byte, now, commands) {
                RxEvent::Buffered => {}
                RxEvent::Skipped => {
                    self.stats.skipped_bytes = self.stats.skipped_bytes.wrapping_add(1);
                }
                RxEvent::Accepted(frame) => {
                    self.stats.commands = self.stats.commands.wrapping_add(1);
                    log_debug!("command {=u8:#x} accepted", frame.header());
                    self.dispatch(&frame, handler);
                }
                RxEvent::Rejected => {
                    self.stats.checksum_failures = self.stats.checksum_failures.wrapping_add(1);
                    log_warn!("command checksum mismatch");
                    if self.replies.push_nak().is_err() {
                        handler.raise(SoftFault::ReplyOverflow);
                    }
                }
            }
        }

        if self.receiver.expire(now, config.rx_timeout_ticks) {
            self.stats.timeouts = self.stats.timeouts.wrapping_add(1);
            log_warn!("partial command dropped after timeout");
        }
    }

    fn dispatch<H: CommandHandler>(&mut self, frame: &CommandFrame, handler: &mut H) {
        let mark = self.replies.len();
        let overflows = self.replies.overflows();

        if self.replies.push_ack(frame.header()).is_err() {
            handler.raise(SoftFault::ReplyOverflow);
        }
        match CommandArgs::split(frame.payload(), frame.descriptor.field_widths) {
            Some(args) => handler.handle(frame.descriptor.command, &args, &mut self.replies),
            None => handler.raise(SoftFault::MalformedArguments),
        }

        // All replies to one command, ack included, or none of them
        if self.replies.overflows() != overflows {
            self.replies.truncate(mark);
        }
    }

    /// Send queued replies, then a report of the `due` states
    ///
    /// The report is left out when nothing is due. Bytes the link cannot take
    /// this cycle are dropped.
    pub fn transmit<L: SerialLink>(
        &mut self,
        link: &mut L,
        due: &IdSet,
        states: &StateTable,
        state: &mut SystemState,
    ) {
        self.tx.clear();
        if self.tx.extend_from_slice(self.replies.as_slice()).is_err() {
            state.faults.raise(SoftFault::ReplyOverflow);
        }
        self.replies.clear();

        if !due.is_empty() && self.append_report(due, states, state) {
            state.faults.raise(SoftFault::ReportTruncated);
        }

        let mut sent = 0;
        for &byte in self.tx.iter() {
            if !link.tx_ready() {
                break;
            }
            if link.write_byte(byte).is_err() {
                state.faults.raise(SoftFault::TransmitFailed);
                break;
            }
            sent += 1;
        }

        let discarded = self.tx.len() - sent;
        self.stats.tx_bytes = self.stats.tx_bytes.wrapping_add(sent as u32);
        if discarded > 0 {
            self.stats.tx_discarded = self.stats.tx_discarded.wrapping_add(discarded as u32);
            log_trace!("link stalled, {=usize} bytes dropped", discarded);
        }
        self.tx.clear();
    }

    // Returns true if some due state did not fit
    fn append_report(&mut self, due: &IdSet, states: &StateTable, state: &SystemState) -> bool {
        let mut payload: Vec<u8, MAX_BLOCK_PAYLOAD> = Vec::new();
        let mut truncated = false;

        for id in due.iter() {
            let Some(descriptor) = states.lookup(id) else {
                continue;
            };
            let start = payload.len();
            let end = start + descriptor.size as usize;
            if payload.resize(end, 0).is_err() {
                truncated = true;
                continue;
            }
            descriptor.variable.encode(state, &mut payload[start..end]);
        }

        if payload.is_empty() {
            return truncated;
        }

        let mut frame = [0u8; MAX_BLOCK_FRAME];
        match encode_block(STATE_REPORT_HEADER, &payload, &mut frame) {
            Ok(len) => self.tx.extend_from_slice(&frame[..len]).is_err() || truncated,
            Err(_) => true,
        }
    }

    /// Replies waiting for the next transmit pass
    pub fn replies(&self) -> &ReplyBuffer {
        &self.replies
    }

    /// Mutable access for replies raised outside command handling
    pub fn replies_mut(&mut self) -> &mut ReplyBuffer {
        &mut self.replies
    }

    /// Current receive state
    pub fn rx_state(&self) -> RxState {
        self.receiver.state()
    }

    pub fn stats(&self) -> &LinkStats {
        &self.stats
    }
}
