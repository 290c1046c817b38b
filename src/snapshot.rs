//! Video Snapshots
//!
//! A snapshot is a raw dump of the video state: VRAM (one or two 8KB banks),
//! 160 bytes of OAM, the twelve registers 0xFF40-0xFF4B and, for CGB dumps,
//! 64 bytes each of background and object palette RAM.

use std::fs;
use std::path::Path;

use crate::bus::{Bus, MemoryBus};
use crate::config::Model;
use crate::error::{Error, Result};
use crate::ppu::vram::{OAM_SIZE, VRAM_BANK_SIZE};

const REGISTER_COUNT: usize = 12;
const PALETTE_SIZE: usize = 64;

const DMG_SIZE: usize = VRAM_BANK_SIZE + OAM_SIZE + REGISTER_COUNT;
const CGB_SIZE: usize = 2 * VRAM_BANK_SIZE + OAM_SIZE + REGISTER_COUNT;
const CGB_PALETTE_SIZE: usize = CGB_SIZE + 2 * PALETTE_SIZE;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    /// VRAM bank contents, one entry per bank
    pub vram: Vec<Vec<u8>>,
    pub oam: Vec<u8>,
    /// 0xFF40-0xFF4B
    pub registers: [u8; REGISTER_COUNT],
    /// Background and object palette RAM
    pub palettes: Option<(Vec<u8>, Vec<u8>)>,
}

impl Snapshot {
    /// Load a snapshot file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = fs::read(path.as_ref())?;
        let snapshot = Self::from_bytes(&data)?;
        log::info!(
            "Loaded {:?} snapshot from {}",
            snapshot.model(),
            path.as_ref().display()
        );
        Ok(snapshot)
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let banks = match data.len() {
            DMG_SIZE => 1,
            CGB_SIZE | CGB_PALETTE_SIZE => 2,
            size => return Err(Error::SnapshotSize(size)),
        };

        let (vram, rest) = data.split_at(banks * VRAM_BANK_SIZE);
        let (oam, rest) = rest.split_at(OAM_SIZE);
        let (registers, rest) = rest.split_at(REGISTER_COUNT);

        let palettes = if rest.is_empty() {
            None
        } else {
            let (bg, obj) = rest.split_at(PALETTE_SIZE);
            Some((bg.to_vec(), obj.to_vec()))
        };

        let mut regs = [0; REGISTER_COUNT];
        regs.copy_from_slice(registers);

        Ok(Self {
            vram: vram.chunks(VRAM_BANK_SIZE).map(<[u8]>::to_vec).collect(),
            oam: oam.to_vec(),
            registers: regs,
            palettes,
        })
    }

    /// Capture the video state of `bus`
    pub fn capture(bus: &Bus) -> Self {
        let cgb = bus.ppu.config().model.is_cgb();
        let banks = if cgb { 2 } else { 1 };
        let vram = (0..banks)
            .map(|bank| bus.ppu.vram.bank_bytes(bank).to_vec())
            .collect();
        let oam = (0..OAM_SIZE as u16)
            .map(|i| bus.ppu.vram.oam_read(0xFE00 + i))
            .collect();

        let mut registers = [0; REGISTER_COUNT];
        for (i, reg) in registers.iter_mut().enumerate() {
            *reg = bus.ppu.lcd.read(0xFF40 + i as u16);
        }
        registers[6] = bus.oam_dma.read();

        let palettes = cgb.then(|| {
            (
                bus.ppu.lcd.bg_palettes.to_bytes().to_vec(),
                bus.ppu.lcd.obj_palettes.to_bytes().to_vec(),
            )
        });

        Self { vram, oam, registers, palettes }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut data: Vec<u8> = self.vram.concat();
        data.extend_from_slice(&self.oam);
        data.extend_from_slice(&self.registers);
        if let Some((bg, obj)) = &self.palettes {
            data.extend_from_slice(bg);
            data.extend_from_slice(obj);
        }
        data
    }

    /// Hardware model the snapshot was taken from
    pub fn model(&self) -> Model {
        if self.vram.len() > 1 {
            Model::Cgb
        } else {
            Model::Dmg
        }
    }

    /// Copy the snapshot into `bus`.
    ///
    /// LY and the DMA register are skipped so loading never starts a DMA or
    /// moves the beam.
    pub fn apply(&self, bus: &mut Bus) {
        for (bank, data) in self.vram.iter().enumerate() {
            bus.ppu.vram.load_bank(bank as u8, data);
        }
        bus.ppu.vram.load_oam(&self.oam);

        for (i, &value) in self.registers.iter().enumerate() {
            let address = 0xFF40 + i as u16;
            if address != 0xFF44 && address != 0xFF46 {
                bus.write(address, value);
            }
        }

        if let Some((bg, obj)) = &self.palettes {
            bus.ppu.lcd.bg_palettes.load_bytes(bg);
            bus.ppu.lcd.obj_palettes.load_bytes(obj);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PpuConfig;

    fn dmg_bytes() -> Vec<u8> {
        let mut data = vec![0; DMG_SIZE];
        data[0] = 0x3C;
        data[VRAM_BANK_SIZE] = 0x50; // OAM 0 Y
        let regs = VRAM_BANK_SIZE + OAM_SIZE;
        data[regs] = 0x93; // LCDC
        data[regs + 2] = 0x20; // SCY
        data[regs + 4] = 0x99; // LY
        data[regs + 7] = 0xE4; // BGP
        data
    }

    #[test]
    fn test_from_bytes_dmg() {
        let snapshot = Snapshot::from_bytes(&dmg_bytes()).unwrap();
        assert_eq!(snapshot.model(), Model::Dmg);
        assert_eq!(snapshot.vram.len(), 1);
        assert_eq!(snapshot.oam[0], 0x50);
        assert_eq!(snapshot.registers[0], 0x93);
        assert!(snapshot.palettes.is_none());
    }

    #[test]
    fn test_from_bytes_rejects_bad_size() {
        let err = Snapshot::from_bytes(&[0; 100]).unwrap_err();
        assert!(matches!(err, Error::SnapshotSize(100)));
    }

    #[test]
    fn test_apply() {
        let snapshot = Snapshot::from_bytes(&dmg_bytes()).unwrap();
        let mut bus = Bus::default();
        snapshot.apply(&mut bus);

        assert_eq!(bus.read(0x8000), 0x3C);
        assert_eq!(bus.read(0xFE00), 0x50);
        assert_eq!(bus.ppu.lcd.lcdc, 0x93);
        assert_eq!(bus.ppu.lcd.scy, 0x20);
        assert_eq!(bus.ppu.lcd.bgp, 0xE4);
        assert_eq!(bus.ppu.ly(), 0);
        assert!(!bus.oam_dma.is_active());
    }

    #[test]
    fn test_cgb_palettes_survive_capture() {
        let mut bus = Bus::new(PpuConfig::cgb());
        bus.write(0xFF68, 0x80);
        bus.write(0xFF69, 0x1F);
        bus.write(0xFF69, 0x00);
        bus.write(0xFF4F, 1);
        bus.write(0x9800, 0x08);

        let data = Snapshot::capture(&bus).to_bytes();
        assert_eq!(data.len(), CGB_PALETTE_SIZE);

        let mut restored = Bus::new(PpuConfig::cgb());
        Snapshot::from_bytes(&data).unwrap().apply(&mut restored);
        assert_eq!(restored.ppu.lcd.bg_palettes.color(0, 0), 0x001F);
        assert_eq!(restored.ppu.vram.read_banked(1, 0x9800), 0x08);
    }

    #[test]
    fn test_load_missing_file() {
        let err = Snapshot::load("/nonexistent/video.snap").unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
