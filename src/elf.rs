//! elf.rs - minimal ELF32 loader: `PT_LOAD` segments only (spec.md's expanded scope,
//! §4.7 "BootSequencer" supplies images by byte offset/size, this is where those bytes
//! actually come from for an ELF-packaged firmware image rather than a raw binary).
//!
//! Only the handful of fields a loader needs are parsed: the program header table and
//! each `PT_LOAD` entry's file offset/size, virtual address, and memory size (for
//! `.bss`-style zero-fill beyond the file image). Section headers, relocations, symbol
//! tables, and every other ELF feature are intentionally unread here; `tracer::SymbolTable`
//! parses `.symtab` separately, only when symbolication is requested.

use crate::error::SimFault;

const EI_MAG: [u8; 4] = [0x7f, b'E', b'L', b'F'];
const ELFCLASS32: u8 = 1;
const PT_LOAD: u32 = 1;

#[derive(Debug, Clone, Copy)]
pub struct LoadSegment {
    pub vaddr: u32,
    pub file_offset: u32,
    pub file_size: u32,
    pub mem_size: u32,
}

#[derive(Debug, Clone)]
pub struct ElfImage {
    pub entry: u32,
    pub segments: Vec<LoadSegment>,
}

fn read_u32(buf: &[u8], off: usize) -> Option<u32> {
    buf.get(off..off + 4).map(|b| u32::from_le_bytes(b.try_into().unwrap()))
}

fn read_u16(buf: &[u8], off: usize) -> Option<u16> {
    buf.get(off..off + 2).map(|b| u16::from_le_bytes(b.try_into().unwrap()))
}

impl ElfImage {
    /// Parse an ELF32 little-endian image, collecting its `PT_LOAD` segments.
    pub fn parse(buf: &[u8]) -> Result<ElfImage, SimFault> {
        if buf.len() < 52 || buf[0..4] != EI_MAG {
            return Err(SimFault::BadElf("missing ELF magic".into()));
        }
        if buf[4] != ELFCLASS32 {
            return Err(SimFault::BadElf("only ELF32 images are supported".into()));
        }
        let entry = read_u32(buf, 24).ok_or_else(|| SimFault::BadElf("truncated header".into()))?;
        let phoff = read_u32(buf, 28).ok_or_else(|| SimFault::BadElf("truncated header".into()))? as usize;
        let phentsize = read_u16(buf, 42).ok_or_else(|| SimFault::BadElf("truncated header".into()))? as usize;
        let phnum = read_u16(buf, 44).ok_or_else(|| SimFault::BadElf("truncated header".into()))? as usize;

        let mut segments = Vec::new();
        for i in 0..phnum {
            let base = phoff + i * phentsize;
            let p_type = read_u32(buf, base).ok_or_else(|| SimFault::BadElf("truncated program header".into()))?;
            if p_type != PT_LOAD {
                continue;
            }
            let file_offset = read_u32(buf, base + 4).ok_or_else(|| SimFault::BadElf("truncated PT_LOAD".into()))?;
            let vaddr = read_u32(buf, base + 8).ok_or_else(|| SimFault::BadElf("truncated PT_LOAD".into()))?;
            let file_size = read_u32(buf, base + 16).ok_or_else(|| SimFault::BadElf("truncated PT_LOAD".into()))?;
            let mem_size = read_u32(buf, base + 20).ok_or_else(|| SimFault::BadElf("truncated PT_LOAD".into()))?;
            segments.push(LoadSegment {
                vaddr,
                file_offset,
                file_size,
                mem_size,
            });
        }
        Ok(ElfImage { entry, segments })
    }

    /// Copy every segment's file bytes into `ram` at `segment.vaddr`, zero-filling the
    /// `mem_size - file_size` tail (the `.bss` case).
    pub fn load_into(&self, file: &[u8], ram: &mut [u8]) -> Result<(), SimFault> {
        for seg in &self.segments {
            let start = seg.vaddr as usize;
            let end = start + seg.mem_size as usize;
            if end > ram.len() {
                return Err(SimFault::OutOfMemory(format!(
                    "segment at {:#x} (size {}) exceeds RAM of {} bytes",
                    seg.vaddr,
                    seg.mem_size,
                    ram.len()
                )));
            }
            let file_start = seg.file_offset as usize;
            let file_end = file_start + seg.file_size as usize;
            let src = file
                .get(file_start..file_end)
                .ok_or_else(|| SimFault::BadElf("segment file range out of bounds".into()))?;
            ram[start..start + src.len()].copy_from_slice(src);
            for b in &mut ram[start + src.len()..end] {
                *b = 0;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_elf(entry: u32, segments: &[(u32, u32, u32, u32)]) -> Vec<u8> {
        let phoff = 52u32;
        let phentsize = 32u16;
        let phnum = segments.len() as u16;
        let mut buf = vec![0u8; phoff as usize + segments.len() * phentsize as usize];
        buf[0..4].copy_from_slice(&EI_MAG);
        buf[4] = ELFCLASS32;
        buf[24..28].copy_from_slice(&entry.to_le_bytes());
        buf[28..32].copy_from_slice(&phoff.to_le_bytes());
        buf[42..44].copy_from_slice(&phentsize.to_le_bytes());
        buf[44..46].copy_from_slice(&phnum.to_le_bytes());
        for (i, &(vaddr, file_offset, file_size, mem_size)) in segments.iter().enumerate() {
            let base = phoff as usize + i * phentsize as usize;
            buf[base..base + 4].copy_from_slice(&PT_LOAD.to_le_bytes());
            buf[base + 4..base + 8].copy_from_slice(&file_offset.to_le_bytes());
            buf[base + 8..base + 12].copy_from_slice(&vaddr.to_le_bytes());
            buf[base + 16..base + 20].copy_from_slice(&file_size.to_le_bytes());
            buf[base + 20..base + 24].copy_from_slice(&mem_size.to_le_bytes());
        }
        buf
    }

    #[test]
    fn rejects_bad_magic() {
        let buf = vec![0u8; 64];
        assert!(ElfImage::parse(&buf).is_err());
    }

    #[test]
    fn parses_entry_and_single_load_segment() {
        let buf = minimal_elf(0x1000, &[(0, 52 + 32, 4, 4)]);
        let img = ElfImage::parse(&buf).unwrap();
        assert_eq!(img.entry, 0x1000);
        assert_eq!(img.segments.len(), 1);
    }

    #[test]
    fn load_into_zero_fills_bss_tail() {
        let mut buf = minimal_elf(0, &[(0, 52 + 32, 2, 4)]);
        let data_off = (52 + 32) as usize;
        buf[data_off] = 0xAA;
        buf[data_off + 1] = 0xBB;
        let img = ElfImage::parse(&buf).unwrap();
        let mut ram = vec![0xFFu8; 4];
        img.load_into(&buf, &mut ram).unwrap();
        assert_eq!(ram, vec![0xAA, 0xBB, 0x00, 0x00]);
    }
}
