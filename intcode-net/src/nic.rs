use std::collections::VecDeque;

use intcode_vm::{Program, VmError, VM};
use log::{trace, warn};

use crate::packet::Packet;
use crate::settings::NetworkConfig;

/// What a node did during one service slice
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Activity {
    pub received: usize,
    pub sent: usize,
    pub halted: bool,
    /// The slice ended on the output limit, not on input or STOP
    pub preempted: bool,
}

impl Activity {
    pub fn is_idle(&self) -> bool {
        self.received == 0 && self.sent == 0 && !self.preempted
    }
}

/// A network node: one VM plus its packet queues
#[derive(Debug)]
pub struct Nic {
    address: i64,
    vm: VM,
    inbox: VecDeque<Packet>,
    outbox: Vec<Packet>,
    // Output values not yet forming a full packet
    partial: Vec<i64>,
    idle_value: i64,
    output_limit: usize,
}

impl Nic {
    pub fn new(program: &Program, address: i64, config: &NetworkConfig) -> Self {
        let vm_config = config.vm.with_suspend_on_output(true);
        Self {
            address,
            vm: VM::with_config(program, Some(address), vm_config),
            inbox: VecDeque::new(),
            outbox: Vec::new(),
            partial: Vec::with_capacity(3),
            idle_value: config.idle_value,
            output_limit: config.slice_output_limit.max(1),
        }
    }

    pub fn address(&self) -> i64 {
        self.address
    }

    pub fn vm(&self) -> &VM {
        &self.vm
    }

    pub fn is_halted(&self) -> bool {
        self.vm.is_halted()
    }

    pub fn inbox_len(&self) -> usize {
        self.inbox.len()
    }

    /// Queue a packet; it reaches the VM on the next service slice
    pub fn deliver(&mut self, packet: Packet) {
        self.inbox.push_back(packet);
    }

    /// Packets produced since the last call, in emission order
    pub fn take_outbox(&mut self) -> Vec<Packet> {
        std::mem::take(&mut self.outbox)
    }

    /// Feed queued packets to the VM and run it until it waits for input again.
    ///
    /// A node with nothing queued reads the idle value once before the slice ends.
    /// A node that keeps emitting without reading is preempted after
    /// `slice_output_limit` values and resumes in the next round.
    pub fn service(&mut self) -> Result<Activity, VmError> {
        let mut activity = Activity {
            received: self.inbox.len(),
            ..Activity::default()
        };
        if self.vm.is_halted() {
            if !self.inbox.is_empty() {
                warn!("nic {}: halted, dropping {} packets", self.address, self.inbox.len());
                self.inbox.clear();
            }
            activity.halted = true;
            return Ok(activity);
        }

        for packet in self.inbox.drain(..) {
            self.vm.feed_input(packet.x);
            self.vm.feed_input(packet.y);
        }

        let mut idle_fed = activity.received > 0;
        let mut emitted = 0;
        loop {
            match self.vm.run(None) {
                Ok(result) if result.is_halted() => {
                    activity.halted = true;
                    break;
                }
                Ok(_) => {
                    emitted += 1;
                    if emitted >= self.output_limit {
                        activity.preempted = true;
                        trace!("nic {}: preempted after {} outputs", self.address, emitted);
                        break;
                    }
                }
                Err(VmError::InputStarved { .. }) if !idle_fed => {
                    self.vm.feed_input(self.idle_value);
                    idle_fed = true;
                }
                Err(VmError::InputStarved { .. }) => break,
                Err(e) => return Err(e),
            }
            activity.sent += self.collect_packets();
        }
        activity.sent += self.collect_packets();

        trace!(
            "nic {}: received {} sent {} halted {}",
            self.address,
            activity.received,
            activity.sent,
            activity.halted
        );
        Ok(activity)
    }

    fn collect_packets(&mut self) -> usize {
        let mut sent = 0;
        for value in self.vm.take_output() {
            self.partial.push(value);
            if self.partial.len() == 3 {
                let triple = [self.partial[0], self.partial[1], self.partial[2]];
                self.outbox.push(Packet::from_triple(triple));
                self.partial.clear();
                sent += 1;
            }
        }
        sent
    }
}
