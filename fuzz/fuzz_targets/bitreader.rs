#![no_main]

//! Fuzz target for BitReader edge cases.
//!
//! Drives BitReader with arbitrary sequences of operations, checking that
//! position bookkeeping stays consistent and reads never pass the end.

use arbitrary::Arbitrary;
use bootpng_core::{BitReader, BitWriter};
use libfuzzer_sys::fuzz_target;

#[derive(Arbitrary, Debug)]
struct BitstreamInput {
    data: Vec<u8>,
    operations: Vec<BitOperation>,
    writer_operations: Vec<WriteOperation>,
    test_mode: TestMode,
}

#[derive(Arbitrary, Debug, Clone)]
enum TestMode {
    /// Test BitReader only
    Reader,
    /// Test roundtrip (write then read)
    Roundtrip,
}

#[derive(Arbitrary, Debug, Clone)]
enum BitOperation {
    ReadBit,
    ReadBits(u8),
    ReadAlignedBytes(u8),
    ReadU16Le,
    ReadU32Be,
    AlignToByte,
}

#[derive(Arbitrary, Debug, Clone)]
enum WriteOperation {
    WriteBit(bool),
    WriteBits { value: u32, n: u8 },
    WriteCode { code: u32, n: u8 },
    AlignToByte,
    WriteBytes(Vec<u8>),
}

fn apply_write(writer: &mut BitWriter, op: &WriteOperation, log: &mut Vec<(u32, u8)>) {
    match op {
        WriteOperation::WriteBit(bit) => {
            writer.write_bit(*bit);
            log.push((*bit as u32, 1));
        }
        WriteOperation::WriteBits { value, n } => {
            let n = n % 33;
            writer.write_bits(*value, n);
            if n > 0 {
                let mask = if n == 32 { u32::MAX } else { (1u32 << n) - 1 };
                log.push((value & mask, n));
            }
        }
        WriteOperation::WriteCode { code, n } => {
            // MSB-first codes don't read back LSB-first; just exercise them.
            writer.write_code(*code, n % 16);
            log.clear();
        }
        WriteOperation::AlignToByte => {
            writer.align_to_byte();
            log.clear();
        }
        WriteOperation::WriteBytes(bytes) => {
            writer.write_bytes(bytes);
            log.clear();
        }
    }
}

fuzz_target!(|input: BitstreamInput| {
    // Limit operations to prevent DoS
    if input.operations.len() > 10000 || input.writer_operations.len() > 10000 {
        return;
    }

    match input.test_mode {
        TestMode::Reader => {
            let mut reader = BitReader::new(&input.data);
            let total = reader.total_bits();

            for op in input.operations.iter().take(1000) {
                let before = reader.position();
                let result = match op {
                    BitOperation::ReadBit => reader.read_bit().map(|_| ()),
                    BitOperation::ReadBits(n) => reader.read_bits(*n).map(|_| ()),
                    BitOperation::ReadAlignedBytes(n) => {
                        reader.read_aligned_bytes(*n as usize).map(|_| ())
                    }
                    BitOperation::ReadU16Le => reader.read_u16_le().map(|_| ()),
                    BitOperation::ReadU32Be => reader.read_u32_be().map(|_| ()),
                    BitOperation::AlignToByte => {
                        reader.align_to_byte();
                        Ok(())
                    }
                };

                assert!(reader.position() <= total);
                assert!(reader.position() >= before);
                assert_eq!(reader.remaining_bits(), total - reader.position());
                if result.is_err() && reader.is_eof() {
                    break;
                }
            }
        }
        TestMode::Roundtrip => {
            // Only the trailing run of plain LSB-first writes is checked.
            let mut writer = BitWriter::new();
            let mut log = Vec::new();

            for op in input.writer_operations.iter().take(100) {
                apply_write(&mut writer, op, &mut log);
                if writer.data().len() > 64 * 1024 {
                    return;
                }
            }

            let logged_bits: usize = log.iter().map(|(_, n)| *n as usize).sum();
            let mut reader = BitReader::new(writer.data());
            for _ in 0..writer.position() - logged_bits {
                if reader.read_bit().is_err() {
                    return;
                }
            }
            for (value, n) in log {
                assert_eq!(reader.read_bits(n).ok(), Some(value));
            }
        }
    }
});
