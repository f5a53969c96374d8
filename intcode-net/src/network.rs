use intcode_vm::{Program, VmError};
use log::{debug, info, warn};
use rayon::prelude::*;

use crate::error::NetworkError;
use crate::nic::{Activity, Nic};
use crate::packet::{Packet, Route};
use crate::settings::NetworkConfig;

/// Totals for one round of servicing every node
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RoundSummary {
    pub received: usize,
    pub sent: usize,
    pub halted: usize,
    pub preempted: usize,
    pub idle: bool,
}

/// Returned once the network goes idle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkReport {
    /// Rounds run by this call
    pub rounds: usize,
    /// Packets routed by this call
    pub packets: usize,
    pub halted_nodes: usize,
    pub last_monitored: Option<Packet>,
}

/// A set of NICs running copies of one program, plus the router between them
#[derive(Debug)]
pub struct Network {
    nics: Vec<Nic>,
    config: NetworkConfig,
    monitor: Vec<Packet>,
    undeliverable: Vec<Packet>,
    rounds: usize,
}

impl Network {
    pub fn new(program: &Program, config: NetworkConfig) -> Self {
        let nics = (0..config.nodes)
            .map(|address| Nic::new(program, address as i64, &config))
            .collect();

        Self {
            nics,
            config,
            monitor: Vec::new(),
            undeliverable: Vec::new(),
            rounds: 0,
        }
    }

    pub fn config(&self) -> &NetworkConfig {
        &self.config
    }

    pub fn len(&self) -> usize {
        self.nics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nics.is_empty()
    }

    pub fn nic(&self, address: i64) -> Option<&Nic> {
        usize::try_from(address).ok().and_then(|i| self.nics.get(i))
    }

    /// Packets addressed to the monitor, in arrival order
    pub fn monitor(&self) -> &[Packet] {
        &self.monitor
    }

    pub fn last_monitored(&self) -> Option<Packet> {
        self.monitor.last().copied()
    }

    /// Packets addressed to nothing
    pub fn undeliverable(&self) -> &[Packet] {
        &self.undeliverable
    }

    /// Rounds run since construction
    pub fn total_rounds(&self) -> usize {
        self.rounds
    }

    /// Inject a packet from outside the network
    pub fn send(&mut self, packet: Packet) -> Route {
        self.route(packet)
    }

    fn route(&mut self, packet: Packet) -> Route {
        if packet.destination == self.config.monitor_address {
            info!("monitor received {packet}");
            self.monitor.push(packet);
            return Route::Monitor;
        }

        match usize::try_from(packet.destination) {
            Ok(index) if index < self.nics.len() => {
                self.nics[index].deliver(packet);
                Route::Node(index)
            }
            _ => {
                warn!("dropping undeliverable packet {packet}");
                self.undeliverable.push(packet);
                Route::Undeliverable
            }
        }
    }

    /// Service every node once, then route what they sent.
    ///
    /// Packets are routed in node order and, per node, in emission order, so a
    /// node always sees packets from one sender in the order they were sent.
    pub fn step_round(&mut self) -> Result<RoundSummary, NetworkError> {
        let activities: Vec<Result<Activity, VmError>> = if self.config.parallel && self.nics.len() > 1 {
            self.nics.par_iter_mut().map(|nic| nic.service()).collect()
        } else {
            self.nics.iter_mut().map(|nic| nic.service()).collect()
        };

        let mut summary = RoundSummary::default();
        let mut all_idle = true;
        for (nic, activity) in self.nics.iter().zip(activities) {
            let activity = activity.map_err(|source| NetworkError::Node {
                address: nic.address(),
                source,
            })?;
            summary.received += activity.received;
            summary.sent += activity.sent;
            if activity.halted {
                summary.halted += 1;
            }
            if activity.preempted {
                summary.preempted += 1;
            }
            all_idle &= activity.is_idle();
        }

        let packets: Vec<Packet> = self
            .nics
            .iter_mut()
            .flat_map(|nic| nic.take_outbox())
            .collect();
        for packet in packets {
            self.route(packet);
        }

        self.rounds += 1;
        summary.idle = all_idle && self.nics.iter().all(|nic| nic.inbox_len() == 0);

        debug!(
            "round {}: received {} sent {} halted {}",
            self.rounds, summary.received, summary.sent, summary.halted
        );
        Ok(summary)
    }

    /// Run rounds until no node sends or receives and nothing is queued
    pub fn run_until_idle(&mut self) -> Result<NetworkReport, NetworkError> {
        let mut report = NetworkReport {
            rounds: 0,
            packets: 0,
            halted_nodes: 0,
            last_monitored: None,
        };

        loop {
            if report.rounds >= self.config.max_rounds {
                return Err(NetworkError::RoundLimit { rounds: report.rounds });
            }

            let summary = self.step_round()?;
            report.rounds += 1;
            report.packets += summary.sent;
            report.halted_nodes = summary.halted;

            if summary.idle {
                report.last_monitored = self.last_monitored();
                info!("network idle after {} rounds", report.rounds);
                return Ok(report);
            }
        }
    }

    /// Wake the idle network by forwarding the last monitored packet to
    /// `wake_address`, until the same y value would be forwarded twice in a
    /// row. Returns that packet, or `None` if the monitor never saw one.
    pub fn run_with_nat(&mut self, wake_address: i64) -> Result<Option<Packet>, NetworkError> {
        let mut last_y = None;

        loop {
            self.run_until_idle()?;
            let Some(packet) = self.last_monitored() else {
                return Ok(None);
            };

            let wake = Packet::new(wake_address, packet.x, packet.y);
            if last_y == Some(wake.y) {
                return Ok(Some(wake));
            }
            last_y = Some(wake.y);

            debug!("waking network with {wake}");
            self.send(wake);
        }
    }
}
