//! Size-unit rounding for the `-size` predicate: "Size comparisons
//! round UP to the configured unit scale before comparing."

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeUnit {
    Bytes,
    TwoByteWords,
    Blocks512,
    KiB,
    MiB,
    GiB,
    TiB,
    PiB,
}

impl SizeUnit {
    pub fn byte_scale(self) -> u64 {
        match self {
            SizeUnit::Bytes => 1,
            SizeUnit::TwoByteWords => 2,
            SizeUnit::Blocks512 => 512,
            SizeUnit::KiB => 1024,
            SizeUnit::MiB => 1024 * 1024,
            SizeUnit::GiB => 1024 * 1024 * 1024,
            SizeUnit::TiB => 1024 * 1024 * 1024 * 1024,
            SizeUnit::PiB => 1024 * 1024 * 1024 * 1024 * 1024,
        }
    }

    pub fn from_suffix(suffix: char) -> Option<SizeUnit> {
        match suffix {
            'c' => Some(SizeUnit::Bytes),
            'w' => Some(SizeUnit::TwoByteWords),
            'b' => Some(SizeUnit::Blocks512),
            'k' => Some(SizeUnit::KiB),
            'M' => Some(SizeUnit::MiB),
            'G' => Some(SizeUnit::GiB),
            'T' => Some(SizeUnit::TiB),
            'P' => Some(SizeUnit::PiB),
            _ => None,
        }
    }
}

/// `ceil(size / unit_scale)`, as an exact integer without floating point.
pub fn round_up(size: u64, unit: SizeUnit) -> u64 {
    let scale = unit.byte_scale();
    size.div_ceil(scale)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_up_partial_blocks() {
        assert_eq!(round_up(1, SizeUnit::KiB), 1);
        assert_eq!(round_up(1024, SizeUnit::KiB), 1);
        assert_eq!(round_up(1025, SizeUnit::KiB), 2);
        assert_eq!(round_up(0, SizeUnit::KiB), 0);
    }

    #[test]
    fn bytes_unit_is_identity() {
        assert_eq!(round_up(12345, SizeUnit::Bytes), 12345);
    }
}
