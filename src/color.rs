// src/color.rs

//! Pixel type, integer color mixing, and the colorspace registry.
//!
//! Two layers live here. The bottom layer is `RgbPixel`, a packed
//! `0x00RRGGBB` dword matching the 32-bit DIB layout the surface renders
//! into, plus the integer mixing routine the benchmark uses for translucent
//! strokes. The top layer is a small registry-driven colorspace framework:
//! each colorspace describes its colorants and supplies conversion entry
//! points, and a `ColorSpec` is a single variant color resolved against a
//! `ColorManager`.
//!
//! Conversions here are structural plumbing, not colorimetry — accurate
//! gamut mapping between spaces is explicitly out of scope.

use bitflags::bitflags;
use log::debug;
use once_cell::sync::Lazy;
use std::fmt;

/// Packed RGB pixel, `0x00RRGGBB`. Chosen over a struct so a pixel row is a
/// plain `&[u32]` the surface can fill with `slice::fill`.
pub type RgbPixel = u32;

/// Extracts the red channel.
#[inline]
pub fn red(p: RgbPixel) -> u8 {
    ((p & 0x00FF_0000) >> 16) as u8
}

/// Extracts the green channel.
#[inline]
pub fn green(p: RgbPixel) -> u8 {
    ((p & 0x0000_FF00) >> 8) as u8
}

/// Extracts the blue channel.
#[inline]
pub fn blue(p: RgbPixel) -> u8 {
    (p & 0x0000_00FF) as u8
}

/// Packs three channels into a pixel.
#[inline]
pub fn rgb(r: u8, g: u8, b: u8) -> RgbPixel {
    ((r as u32) << 16) | ((g as u32) << 8) | (b as u32)
}

/// Integer color mix: blends `a` over `b` by the fraction `f / f_max`,
/// per channel, truncating. `f` is clamped into `0..=f_max`.
#[inline]
pub fn mix(f: u32, f_max: u32, a: RgbPixel, b: RgbPixel) -> RgbPixel {
    debug_assert!(f_max > 0);
    let f = f.min(f_max);
    let rest = f_max - f;
    let channel = |ca: u8, cb: u8| -> u8 {
        ((f * ca as u32 + rest * cb as u32) / f_max) as u8
    };
    rgb(
        channel(red(a), red(b)),
        channel(green(a), green(b)),
        channel(blue(a), blue(b)),
    )
}

/// Identifies a registered colorspace. 0 is reserved for the invalid space.
pub type ColorSpaceId = u8;

/// The always-registered invalid colorspace: conversions fail, fast RGB is
/// black.
pub const CS_INVALID: ColorSpaceId = 0;

/// Plain RGB, colorants stored as 0..=1 floats in R, G, B order.
pub const CS_RGB: ColorSpaceId = 1;

/// Outcome of a colorspace conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversionResult {
    InGamut,
    OutOfGamut,
    Failed,
}

/// Maximum colorants a single color may carry, system-wide.
pub const MAX_COLORANTS: usize = 8;

const DATA_BYTES: usize = MAX_COLORANTS * 4;

/// Raw storage for one color: 32 bytes every colorspace interprets as it
/// sees fit, through explicit typed views instead of overlapping storage.
///
/// The colorant view spans all 32 bytes as 8 little-endian `f32`s, indexed in
/// the order the owning colorspace lists them, nominally in the 0..=1 range
/// (out-of-range means out of gamut; no bounds are enforced on the value).
/// The byte/word/dword views cover the first 8 bytes, for colorspaces that
/// store something other than colorants there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ColorData {
    bytes: [u8; DATA_BYTES],
}

impl ColorData {
    /// All-zero color data.
    pub fn zeroed() -> Self {
        Self::default()
    }

    /// Reads colorant `i` (0..8) as an `f32`.
    pub fn colorant(&self, i: usize) -> f32 {
        assert!(i < MAX_COLORANTS, "colorant index {} out of range", i);
        let at = i * 4;
        f32::from_le_bytes(self.bytes[at..at + 4].try_into().unwrap())
    }

    /// Writes colorant `i` (0..8).
    pub fn set_colorant(&mut self, i: usize, value: f32) {
        assert!(i < MAX_COLORANTS, "colorant index {} out of range", i);
        let at = i * 4;
        self.bytes[at..at + 4].copy_from_slice(&value.to_le_bytes());
    }

    /// Reads byte `i` (0..8) of the raw data area.
    pub fn byte(&self, i: usize) -> u8 {
        assert!(i < 8, "byte index {} out of range", i);
        self.bytes[i]
    }

    /// Writes byte `i` (0..8) of the raw data area.
    pub fn set_byte(&mut self, i: usize, value: u8) {
        assert!(i < 8, "byte index {} out of range", i);
        self.bytes[i] = value;
    }

    /// Reads word `i` (0..4) of the raw data area, little-endian.
    pub fn word(&self, i: usize) -> u16 {
        assert!(i < 4, "word index {} out of range", i);
        let at = i * 2;
        u16::from_le_bytes(self.bytes[at..at + 2].try_into().unwrap())
    }

    /// Writes word `i` (0..4) of the raw data area.
    pub fn set_word(&mut self, i: usize, value: u16) {
        assert!(i < 4, "word index {} out of range", i);
        let at = i * 2;
        self.bytes[at..at + 2].copy_from_slice(&value.to_le_bytes());
    }

    /// Reads dword `i` (0..2) of the raw data area, little-endian.
    pub fn dword(&self, i: usize) -> u32 {
        assert!(i < 2, "dword index {} out of range", i);
        let at = i * 4;
        u32::from_le_bytes(self.bytes[at..at + 4].try_into().unwrap())
    }

    /// Writes dword `i` (0..2) of the raw data area.
    pub fn set_dword(&mut self, i: usize, value: u32) {
        assert!(i < 2, "dword index {} out of range", i);
        let at = i * 4;
        self.bytes[at..at + 4].copy_from_slice(&value.to_le_bytes());
    }
}

/// Display metadata for one colorant of a colorspace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorantInfo {
    pub abbreviation: String,
    pub long_name: String,
    pub description: String,
}

impl ColorantInfo {
    pub fn new(abbreviation: &str, long_name: &str, description: &str) -> Self {
        Self {
            abbreviation: abbreviation.to_string(),
            long_name: long_name.to_string(),
            description: description.to_string(),
        }
    }
}

bitflags! {
    /// Capability flags of a colorspace.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ColorSpaceFlags: u8 {
        /// The colorspace stores ordered colorants in the `ColorData`
        /// colorant view. Special spaces (invalid, palettes) leave this unset
        /// and use the raw views instead.
        const USES_COLORANTS = 1 << 0;
    }
}

/// Fast conversion to the pixel format, for rendering paths.
pub type ToRgbFastFn = fn(&ColorData) -> RgbPixel;
/// Conversion of the data in place toward a destination colorspace.
pub type ConvertToFn = fn(ColorSpaceId, &mut ColorData) -> ConversionResult;
/// Initialization of a freshly created color.
pub type InitNewFn = fn(&mut ColorData);

/// Everything the manager needs to know about one colorspace.
#[derive(Debug, Clone)]
pub struct ColorSpaceDescriptor {
    pub id: ColorSpaceId,
    pub name: String,
    pub description: String,
    pub flags: ColorSpaceFlags,
    pub colorants: Vec<ColorantInfo>,
    pub to_rgb_fast: ToRgbFastFn,
    pub convert_to: ConvertToFn,
    pub init_new: InitNewFn,
}

impl ColorSpaceDescriptor {
    pub fn colorant_count(&self) -> usize {
        self.colorants.len()
    }

    pub fn uses_colorants(&self) -> bool {
        self.flags.contains(ColorSpaceFlags::USES_COLORANTS)
    }
}

/// Registry errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorError {
    /// A colorspace with this id is already registered.
    DuplicateColorSpace(ColorSpaceId),
    /// No colorspace with this id is registered.
    UnknownColorSpace(ColorSpaceId),
}

impl fmt::Display for ColorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColorError::DuplicateColorSpace(id) => {
                write!(f, "colorspace id {} is already registered", id)
            }
            ColorError::UnknownColorSpace(id) => {
                write!(f, "no colorspace registered under id {}", id)
            }
        }
    }
}

impl std::error::Error for ColorError {}

fn invalid_init_new(data: &mut ColorData) {
    data.set_dword(0, 0);
}

fn invalid_convert_to(_dest: ColorSpaceId, _data: &mut ColorData) -> ConversionResult {
    ConversionResult::Failed
}

fn invalid_to_rgb_fast(_data: &ColorData) -> RgbPixel {
    rgb(0, 0, 0)
}

fn invalid_descriptor() -> ColorSpaceDescriptor {
    ColorSpaceDescriptor {
        id: CS_INVALID,
        name: "Invalid".to_string(),
        description: "Invalid".to_string(),
        flags: ColorSpaceFlags::empty(),
        colorants: Vec::new(),
        to_rgb_fast: invalid_to_rgb_fast,
        convert_to: invalid_convert_to,
        init_new: invalid_init_new,
    }
}

fn rgb_init_new(data: &mut ColorData) {
    for i in 0..3 {
        data.set_colorant(i, 0.0);
    }
}

fn rgb_convert_to(dest: ColorSpaceId, _data: &mut ColorData) -> ConversionResult {
    // RGB knows no other space; identity is the only in-gamut conversion.
    if dest == CS_RGB {
        ConversionResult::InGamut
    } else {
        ConversionResult::Failed
    }
}

fn rgb_to_rgb_fast(data: &ColorData) -> RgbPixel {
    let scale = |c: f32| -> u8 { (c.clamp(0.0, 1.0) * 255.0) as u8 };
    rgb(
        scale(data.colorant(0)),
        scale(data.colorant(1)),
        scale(data.colorant(2)),
    )
}

/// Descriptor for the built-in RGB colorspace.
pub fn rgb_descriptor() -> ColorSpaceDescriptor {
    ColorSpaceDescriptor {
        id: CS_RGB,
        name: "RGB".to_string(),
        description: "Additive red/green/blue, colorants 0..=1".to_string(),
        flags: ColorSpaceFlags::USES_COLORANTS,
        colorants: vec![
            ColorantInfo::new("R", "Red", "Red component"),
            ColorantInfo::new("G", "Green", "Green component"),
            ColorantInfo::new("B", "Blue", "Blue component"),
        ],
        to_rgb_fast: rgb_to_rgb_fast,
        convert_to: rgb_convert_to,
        init_new: rgb_init_new,
    }
}

/// Registry of colorspace descriptors. Individual colors (`ColorSpec`) call
/// back into it to convert and to describe themselves.
#[derive(Debug, Clone)]
pub struct ColorManager {
    spaces: Vec<ColorSpaceDescriptor>,
}

impl ColorManager {
    /// A manager pre-seeded with the invalid colorspace.
    pub fn new() -> Self {
        Self {
            spaces: vec![invalid_descriptor()],
        }
    }

    /// Registers a colorspace. Ids are unique; a duplicate is rejected
    /// without replacing the existing registration.
    pub fn register(&mut self, descriptor: ColorSpaceDescriptor) -> Result<(), ColorError> {
        if self.find(descriptor.id).is_some() {
            return Err(ColorError::DuplicateColorSpace(descriptor.id));
        }
        debug!(
            "registered colorspace {} ('{}', {} colorants)",
            descriptor.id,
            descriptor.name,
            descriptor.colorant_count()
        );
        self.spaces.push(descriptor);
        Ok(())
    }

    /// Looks up a registered colorspace by id.
    pub fn find(&self, id: ColorSpaceId) -> Option<&ColorSpaceDescriptor> {
        self.spaces.iter().find(|s| s.id == id)
    }
}

impl Default for ColorManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Process-wide manager with the built-in spaces registered; the benchmark
/// resolves its palette through this.
pub static DEFAULT_MANAGER: Lazy<ColorManager> = Lazy::new(|| {
    let mut manager = ColorManager::new();
    manager
        .register(rgb_descriptor())
        .expect("built-in RGB colorspace registers exactly once");
    manager
});

/// A variant color: one `ColorData` interpreted by whichever colorspace it
/// was last initialized to or converted into.
#[derive(Debug, Clone)]
pub struct ColorSpec<'m> {
    manager: &'m ColorManager,
    id: ColorSpaceId,
    data: ColorData,
}

impl<'m> ColorSpec<'m> {
    /// A new spec in the invalid colorspace.
    pub fn new(manager: &'m ColorManager) -> Self {
        Self {
            manager,
            id: CS_INVALID,
            data: ColorData::zeroed(),
        }
    }

    /// Reinitializes this spec as a fresh color of colorspace `id`.
    pub fn init_new(&mut self, id: ColorSpaceId) -> Result<(), ColorError> {
        let descriptor = self
            .manager
            .find(id)
            .ok_or(ColorError::UnknownColorSpace(id))?;
        (descriptor.init_new)(&mut self.data);
        self.id = descriptor.id;
        Ok(())
    }

    /// Converts the color toward colorspace `dest`, in place. On any result
    /// other than `Failed` the spec is retagged to `dest`.
    pub fn convert_to(&mut self, dest: ColorSpaceId) -> ConversionResult {
        if self.manager.find(dest).is_none() {
            return ConversionResult::Failed;
        }
        let current = match self.manager.find(self.id) {
            Some(d) => d,
            None => return ConversionResult::Failed,
        };
        let result = (current.convert_to)(dest, &mut self.data);
        if result != ConversionResult::Failed {
            self.id = dest;
        }
        result
    }

    pub fn colorspace_id(&self) -> ColorSpaceId {
        self.id
    }

    fn descriptor(&self) -> &'m ColorSpaceDescriptor {
        // The id was vetted when it was assigned; the manager is immutable
        // for the spec's lifetime.
        self.manager
            .find(self.id)
            .unwrap_or_else(|| self.manager.find(CS_INVALID).expect("invalid space is seeded"))
    }

    pub fn colorspace_name(&self) -> &'m str {
        &self.descriptor().name
    }

    pub fn colorspace_description(&self) -> &'m str {
        &self.descriptor().description
    }

    pub fn colorant_count(&self) -> usize {
        self.descriptor().colorant_count()
    }

    pub fn uses_colorants(&self) -> bool {
        self.descriptor().uses_colorants()
    }

    pub fn colorant_info(&self, i: usize) -> &'m ColorantInfo {
        &self.descriptor().colorants[i]
    }

    pub fn colorant(&self, i: usize) -> f32 {
        self.data.colorant(i)
    }

    pub fn set_colorant(&mut self, i: usize, value: f32) {
        self.data.set_colorant(i, value);
    }

    /// Fast conversion to the pixel format via the colorspace's entry point.
    pub fn to_rgb_fast(&self) -> RgbPixel {
        (self.descriptor().to_rgb_fast)(&self.data)
    }
}
