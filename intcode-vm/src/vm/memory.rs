/// Lazily grown cell storage.
///
/// Reads past the written region return 0. Writes extend the backing vector on
/// demand, up to `limit` cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Memory {
    cells: Vec<i64>,
    limit: usize,
}

impl Memory {
    pub fn new(image: &[i64], headroom: usize) -> Self {
        Self {
            cells: image.to_vec(),
            limit: image.len().saturating_add(headroom),
        }
    }

    /// Number of addressable cells
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Number of cells currently backed by storage
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn contains(&self, address: usize) -> bool {
        address < self.limit
    }

    /// Caller must check `contains` first; unbacked cells read as 0
    pub fn get(&self, address: usize) -> i64 {
        self.cells.get(address).copied().unwrap_or(0)
    }

    /// Caller must check `contains` first
    pub fn set(&mut self, address: usize, value: i64) {
        if address >= self.cells.len() {
            if value == 0 {
                return;
            }
            self.cells.resize(address + 1, 0);
        }
        self.cells[address] = value;
    }

    /// Backed cells, in address order
    pub fn as_slice(&self) -> &[i64] {
        &self.cells
    }

    /// Restore the image and drop every cell written past it
    pub fn reload(&mut self, image: &[i64]) {
        self.cells.clear();
        self.cells.extend_from_slice(image);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_past_image_are_zero() {
        let memory = Memory::new(&[1, 2, 3], 10);
        assert_eq!(memory.get(2), 3);
        assert_eq!(memory.get(3), 0);
        assert_eq!(memory.get(12), 0);
        assert!(memory.contains(12));
        assert!(!memory.contains(13));
    }

    #[test]
    fn test_writes_grow_on_demand() {
        let mut memory = Memory::new(&[1, 2, 3], 1_000);
        memory.set(500, 0);
        assert_eq!(memory.len(), 3);

        memory.set(500, 7);
        assert_eq!(memory.len(), 501);
        assert_eq!(memory.get(500), 7);
        assert_eq!(memory.get(499), 0);
    }

    #[test]
    fn test_reload() {
        let mut memory = Memory::new(&[1, 2], 10);
        memory.set(0, 9);
        memory.set(8, 9);
        memory.reload(&[1, 2]);
        assert_eq!(memory.as_slice(), &[1, 2]);
    }
}
