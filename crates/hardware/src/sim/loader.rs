//! Program Loader.
//!
//! This module places program images into the memory environment. It performs:
//! 1. **ELF loading:** Parses 32-bit little-endian RISC-V ELF images with the `object`
//!    crate, copies every `PT_LOAD` segment to its physical address and zero-fills
//!    the remainder of the segment's memory size.
//! 2. **Raw binaries:** Copies a flat image to a caller-chosen address.
//!
//! Both loaders write through [`MemoryBus::load_bytes`], so an image that does not
//! fit in RAM is reported as [`SimError::Load`] rather than truncated.

use std::fs;
use std::path::Path;

use object::elf::{EM_RISCV, PT_LOAD};
use object::read::elf::{ElfFile32, FileHeader, ProgramHeader};
use object::{Endian, Endianness};
use tracing::debug;

use crate::common::SimError;
use crate::soc::MemoryBus;

/// Reads a whole file.
///
/// # Errors
///
/// [`SimError::Io`] naming the path.
pub fn read_image(path: &Path) -> Result<Vec<u8>, SimError> {
    fs::read(path).map_err(|source| SimError::Io {
        path: path.display().to_string(),
        source,
    })
}

/// Loads an ELF image held in memory.
///
/// # Arguments
///
/// * `bus` - Memory environment receiving the segments.
/// * `image` - The raw ELF file.
///
/// # Returns
///
/// The entry point.
///
/// # Errors
///
/// [`SimError::Elf`] for a malformed file, [`SimError::Load`] for a file that is
/// not a little-endian RISC-V image or whose segments fall outside RAM.
pub fn load_elf(bus: &mut MemoryBus, image: &[u8]) -> Result<u32, SimError> {
    let elf = ElfFile32::<Endianness>::parse(image)?;
    let endian = elf.endian();
    let header = elf.elf_header();
    if !endian.is_little_endian() {
        return Err(SimError::Load("big-endian ELF images are not supported".into()));
    }
    if header.e_machine(endian) != EM_RISCV {
        return Err(SimError::Load(format!(
            "ELF machine {} is not RISC-V",
            header.e_machine(endian)
        )));
    }

    for phdr in elf.elf_program_headers() {
        if phdr.p_type(endian) != PT_LOAD {
            continue;
        }
        let addr = phdr.p_paddr(endian);
        let memsz = phdr.p_memsz(endian) as usize;
        let data = phdr
            .data(endian, image)
            .map_err(|()| SimError::Load(format!("segment at {addr:#010x} extends past end of file")))?;
        if data.len() > memsz {
            return Err(SimError::Load(format!(
                "segment at {addr:#010x} has file size larger than memory size"
            )));
        }
        let mut bytes = data.to_vec();
        bytes.resize(memsz, 0);
        if !bus.load_bytes(addr, &bytes) {
            return Err(SimError::Load(format!(
                "segment {addr:#010x}+{memsz:#x} does not fit in RAM"
            )));
        }
        debug!(addr = format_args!("{addr:#010x}"), filesz = data.len(), memsz, "loaded segment");
    }

    let entry = header.e_entry(endian);
    debug!(entry = format_args!("{entry:#010x}"), "ELF image loaded");
    Ok(entry)
}

/// Loads an ELF image from disk. See [`load_elf`].
///
/// # Errors
///
/// As [`load_elf`], plus [`SimError::Io`] if the file cannot be read.
pub fn load_elf_file(bus: &mut MemoryBus, path: &Path) -> Result<u32, SimError> {
    let image = read_image(path)?;
    load_elf(bus, &image)
}

/// Loads a raw binary from disk at `addr`.
///
/// # Returns
///
/// Number of bytes written.
///
/// # Errors
///
/// [`SimError::Io`] if the file cannot be read and [`SimError::Load`] if it
/// does not fit in RAM at `addr`.
pub fn load_binary(bus: &mut MemoryBus, path: &Path, addr: u32) -> Result<usize, SimError> {
    let image = read_image(path)?;
    if !bus.load_bytes(addr, &image) {
        return Err(SimError::Load(format!(
            "{} ({} bytes) does not fit in RAM at {addr:#010x}",
            path.display(),
            image.len()
        )));
    }
    debug!(path = %path.display(), addr = format_args!("{addr:#010x}"), len = image.len(), "loaded binary");
    Ok(image.len())
}
