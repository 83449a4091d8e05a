/*!
boot/mod.rs - `BootSequencer`: the ordered steps that take a set of firmware images
from disk to a running thread 0 on tile 0 (spec §4.7 "Boot sequence").

A multi-image XE/ELF bundle can carry more than one image per tile (a debug stub
followed by the real application, for instance); boot runs three utility passes over
that image list before the ordered step pipeline: `erase_all_but_last_image` (keep only
the final image per tile, discarding earlier ones the bundle carried for a two-stage
loader), `set_entry_point_to_rom` (tiles with no image of their own start executing
their mask ROM instead), and `set_load_images` (install the surviving per-tile images).
The pipeline then runs, in order: `ElfStep` (parse + copy each image's segments into its
tile's RAM), `ScheduleStep` (install initial thread state: `pc` at the image entry point,
`sp` at the top of RAM, routing tables per `node::links_for_route`), `RunStep` (release the
scheduler to begin simulation).
*/

use crate::core_tile::Core;
use crate::elf::ElfImage;
use crate::error::SimFault;

/// One firmware image bound for a specific tile.
#[derive(Debug, Clone)]
pub struct Image {
    pub node: u16,
    pub tile: u8,
    pub bytes: Vec<u8>,
}

/// A step in the boot pipeline (spec §4.7 names these as the fixed sequence
/// `ElfStep -> ScheduleStep -> RunStep`).
pub trait BootStep {
    fn run(&mut self, images: &[Image], cores: &mut [Core]) -> Result<(), SimFault>;
}

/// Keep only the last image destined for each `(node, tile)`, matching how a two-stage
/// XE bundle's final image supersedes any loader stub ahead of it.
pub fn erase_all_but_last_image(images: Vec<Image>) -> Vec<Image> {
    use std::collections::HashMap;
    let mut last: HashMap<(u16, u8), Image> = HashMap::new();
    for img in images {
        last.insert((img.node, img.tile), img);
    }
    last.into_values().collect()
}

/// Tiles with no surviving image start executing their mask ROM at reset (spec §4.7).
pub fn set_entry_point_to_rom(core: &mut Core) {
    let rom_base_words = (core.ram.len() / 4) as u32;
    let slot = core.cache.slot_for_addr(rom_base_words);
    core.threads[0].regs.pc = slot;
}

/// Install the surviving per-tile images' segments into their RAM.
pub fn set_load_images(images: &[Image], cores: &mut [Core], node_of: impl Fn(&Core) -> (u16, u8)) -> Result<(), SimFault> {
    for core in cores.iter_mut() {
        let (node, tile) = node_of(core);
        if let Some(img) = images.iter().find(|i| i.node == node && i.tile == tile) {
            let elf = ElfImage::parse(&img.bytes)?;
            elf.load_into(&img.bytes, &mut core.ram)?;
        } else {
            set_entry_point_to_rom(core);
        }
    }
    Ok(())
}

pub struct ElfStep;
impl BootStep for ElfStep {
    fn run(&mut self, images: &[Image], cores: &mut [Core]) -> Result<(), SimFault> {
        set_load_images(images, cores, |c| (c.node, c.tile))
    }
}

pub struct ScheduleStep;
impl BootStep for ScheduleStep {
    fn run(&mut self, images: &[Image], cores: &mut [Core]) -> Result<(), SimFault> {
        for core in cores.iter_mut() {
            let has_image = images.iter().any(|i| i.node == core.node && i.tile == core.tile);
            if has_image {
                let img = images.iter().find(|i| i.node == core.node && i.tile == core.tile).unwrap();
                let elf = ElfImage::parse(&img.bytes)?;
                let slot = core.cache.slot_for_addr(elf.entry / 4);
                core.threads[0].regs.pc = slot;
                core.threads[0].regs.sp = core.ram.len() as u32;
                core.threads[0].running = true;
            }
        }
        Ok(())
    }
}

pub struct RunStep;
impl BootStep for RunStep {
    fn run(&mut self, _images: &[Image], cores: &mut [Core]) -> Result<(), SimFault> {
        for core in cores.iter_mut() {
            if !core.threads.is_empty() {
                core.threads[0].running = true;
            }
        }
        Ok(())
    }
}

/// Runs the fixed `ElfStep -> ScheduleStep -> RunStep` pipeline over a prepared image
/// set and the engine's cores.
pub struct BootSequencer {
    steps: Vec<Box<dyn BootStep>>,
}

impl BootSequencer {
    pub fn standard() -> Self {
        Self {
            steps: vec![Box::new(ElfStep), Box::new(ScheduleStep), Box::new(RunStep)],
        }
    }

    pub fn run(&mut self, images: Vec<Image>, cores: &mut [Core]) -> Result<(), SimFault> {
        let images = erase_all_but_last_image(images);
        for step in &mut self.steps {
            step.run(&images, cores)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn erase_all_but_last_image_keeps_only_final_per_tile() {
        let images = vec![
            Image {
                node: 0,
                tile: 0,
                bytes: vec![1],
            },
            Image {
                node: 0,
                tile: 0,
                bytes: vec![2],
            },
        ];
        let kept = erase_all_but_last_image(images);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].bytes, vec![2]);
    }

    #[test]
    fn tile_with_no_image_falls_back_to_rom_entry() {
        let mut core = Core::new(0, 0, 4, 4, 1);
        set_entry_point_to_rom(&mut core);
        assert_eq!(core.threads[0].regs.pc, core.cache.slot_for_addr(4));
    }
}
