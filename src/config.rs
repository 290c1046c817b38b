//! PPU Configuration
//!
//! Hardware model selection and host-side colour choices.

/// Hardware generation being emulated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Model {
    /// Original monochrome Game Boy
    #[default]
    Dmg,
    /// Game Boy Color (second VRAM bank, attribute maps, colour palettes)
    Cgb,
}

impl Model {
    pub fn is_cgb(self) -> bool {
        self == Model::Cgb
    }
}

/// Colours used for the four monochrome shades
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DmgShades {
    /// White, light gray, dark gray, black
    #[default]
    Grayscale,
    /// Classic green LCD tint
    Green,
}

impl DmgShades {
    /// ARGB8888 colour of shade 0-3
    pub fn argb(self, shade: u8) -> u32 {
        match self {
            DmgShades::Grayscale => match shade & 0x03 {
                0 => 0xFFFFFFFF,
                1 => 0xFFAAAAAA,
                2 => 0xFF555555,
                _ => 0xFF000000,
            },
            DmgShades::Green => match shade & 0x03 {
                0 => 0xFF9BBC0F, // Lightest
                1 => 0xFF8BAC0F,
                2 => 0xFF306230,
                _ => 0xFF0F380F, // Darkest
            },
        }
    }
}

/// PPU construction options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PpuConfig {
    /// Hardware generation
    pub model: Model,
    /// Monochrome shade colours
    pub shades: DmgShades,
    /// Block bus access to VRAM during mode 3 and to OAM during modes 2 and 3
    pub access_locking: bool,
}

impl PpuConfig {
    /// Default configuration for a Game Boy Color
    pub fn cgb() -> Self {
        Self {
            model: Model::Cgb,
            ..Self::default()
        }
    }
}
