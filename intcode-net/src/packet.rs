use std::fmt;

/// One `(destination, x, y)` output triple
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Packet {
    pub destination: i64,
    pub x: i64,
    pub y: i64,
}

impl Packet {
    pub fn new(destination: i64, x: i64, y: i64) -> Self {
        Self { destination, x, y }
    }

    /// Build a packet from three consecutive output values
    pub fn from_triple(values: [i64; 3]) -> Self {
        let [destination, x, y] = values;
        Self { destination, x, y }
    }
}

impl fmt::Display for Packet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "-> {} (x={}, y={})", self.destination, self.x, self.y)
    }
}

/// Where the router put a packet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Node(usize),
    Monitor,
    Undeliverable,
}
