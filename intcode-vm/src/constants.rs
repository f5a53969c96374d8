//! Central configuration and constants for the IntCode VM

// Cells addressable past the end of the program image
pub const DEFAULT_MEMORY_HEADROOM: usize = 1_000_000;

// Highest output value rendered as a character in ASCII mode
pub const ASCII_MAX: i64 = 127;

// Debug output configuration
pub const DEBUG_MEMORY_DISPLAY_WORDS: usize = 32; // Number of memory cells to display in state dumps
pub const DEBUG_MEMORY_WORDS_PER_LINE: usize = 8; // Cells per line in memory dumps
